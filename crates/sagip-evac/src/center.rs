//! Evacuation center capacity model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::EvacError;

/// Occupancy band of a center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    /// Below 70% full.
    #[default]
    Normal,
    /// 70% full or more.
    Warning,
    /// 90% full or more.
    Critical,
}

impl OccupancyStatus {
    /// Classify an occupancy.
    ///
    /// A zero capacity counts as critical.
    pub fn classify(occupants: u32, capacity: u32) -> Self {
        let occupants = u64::from(occupants) * 100;
        let capacity = u64::from(capacity);
        if occupants >= capacity * 90 {
            OccupancyStatus::Critical
        } else if occupants >= capacity * 70 {
            OccupancyStatus::Warning
        } else {
            OccupancyStatus::Normal
        }
    }

    /// Display color.
    pub fn color(&self) -> &'static str {
        match self {
            OccupancyStatus::Normal => "#10b981",
            OccupancyStatus::Warning => "#f59e0b",
            OccupancyStatus::Critical => "#ef4444",
        }
    }

    /// Display label.
    pub fn text(&self) -> &'static str {
        match self {
            OccupancyStatus::Normal => "Available",
            OccupancyStatus::Warning => "Nearly Full",
            OccupancyStatus::Critical => "Critical",
        }
    }

    /// Machine-readable level.
    pub fn level(&self) -> &'static str {
        match self {
            OccupancyStatus::Normal => "normal",
            OccupancyStatus::Warning => "warning",
            OccupancyStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.level())
    }
}

/// Map position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Supply stock as percentages of target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyLevels {
    pub food: u8,
    pub water: u8,
    pub medicine: u8,
    pub blankets: u8,
}

impl SupplyLevels {
    pub fn new(food: u8, water: u8, medicine: u8, blankets: u8) -> Self {
        Self {
            food,
            water,
            medicine,
            blankets,
        }
    }

    /// Supplies by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u8)> {
        [
            ("food", self.food),
            ("water", self.water),
            ("medicine", self.medicine),
            ("blankets", self.blankets),
        ]
        .into_iter()
    }

    /// The scarcest supply. Ties go to the first in `iter` order.
    pub fn lowest(&self) -> (&'static str, u8) {
        self.iter()
            .fold(("food", self.food), |low, cur| if cur.1 < low.1 { cur } else { low })
    }
}

/// An evacuation center and its current load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationCenter {
    pub id: u64,
    pub name: String,
    pub municipality: String,
    pub coordinates: Coordinates,
    pub capacity: u32,
    pub occupants: u32,
    pub supplies: SupplyLevels,
    /// Status as last reported by the center.
    pub status: OccupancyStatus,
    pub contact: String,
    #[serde(with = "last_update_format")]
    pub last_update: NaiveDateTime,
}

impl EvacuationCenter {
    /// Create an empty center.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        municipality: impl Into<String>,
        capacity: u32,
    ) -> Result<Self, EvacError> {
        let name = name.into();
        if capacity == 0 {
            return Err(EvacError::InvalidCapacity { name, capacity });
        }
        Ok(Self {
            id,
            name,
            municipality: municipality.into(),
            coordinates: Coordinates::default(),
            capacity,
            occupants: 0,
            supplies: SupplyLevels::default(),
            status: OccupancyStatus::Normal,
            contact: String::new(),
            last_update: NaiveDateTime::default(),
        })
    }

    /// Set occupants; the reported status follows the new load.
    pub fn with_occupants(mut self, occupants: u32) -> Self {
        self.occupants = occupants;
        self.status = OccupancyStatus::classify(occupants, self.capacity);
        self
    }

    /// Override the reported status.
    pub fn with_status(mut self, status: OccupancyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.coordinates = Coordinates::new(lat, lon);
        self
    }

    pub fn with_supplies(mut self, supplies: SupplyLevels) -> Self {
        self.supplies = supplies;
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_last_update(mut self, at: NaiveDateTime) -> Self {
        self.last_update = at;
        self
    }

    /// Check invariants of a center that did not come from [`new`](Self::new).
    pub fn validate(&self) -> Result<(), EvacError> {
        if self.capacity == 0 {
            return Err(EvacError::InvalidCapacity {
                name: self.name.clone(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Status computed from the current load.
    pub fn occupancy_status(&self) -> OccupancyStatus {
        OccupancyStatus::classify(self.occupants, self.capacity)
    }

    pub fn status_color(&self) -> &'static str {
        self.occupancy_status().color()
    }

    pub fn status_text(&self) -> &'static str {
        self.occupancy_status().text()
    }

    pub fn status_level(&self) -> &'static str {
        self.occupancy_status().level()
    }

    /// Load as a percentage of capacity. May exceed 100.
    pub fn occupancy_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 100.0;
        }
        f64::from(self.occupants) * 100.0 / f64::from(self.capacity)
    }

    /// Free places left.
    pub fn available_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants)
    }
}

mod last_update_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&at.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| raw.parse::<NaiveDateTime>())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn center(occupants: u32, capacity: u32) -> EvacuationCenter {
        EvacuationCenter::new(1, "Test Hall", "Calapan City", capacity)
            .unwrap()
            .with_occupants(occupants)
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(center(95, 100).occupancy_status(), OccupancyStatus::Critical);
        assert_eq!(center(90, 100).occupancy_status(), OccupancyStatus::Critical);
        assert_eq!(center(75, 100).occupancy_status(), OccupancyStatus::Warning);
        assert_eq!(center(70, 100).occupancy_status(), OccupancyStatus::Warning);
        assert_eq!(center(69, 100).occupancy_status(), OccupancyStatus::Normal);
        assert_eq!(center(50, 100).occupancy_status(), OccupancyStatus::Normal);
        assert_eq!(center(0, 100).occupancy_status(), OccupancyStatus::Normal);
        assert_eq!(center(130, 100).occupancy_status(), OccupancyStatus::Critical);
    }

    #[test]
    fn test_status_presentation() {
        let critical = center(95, 100);
        assert_eq!(critical.status_color(), "#ef4444");
        assert_eq!(critical.status_text(), "Critical");
        assert_eq!(critical.status_level(), "critical");

        let warning = center(75, 100);
        assert_eq!(warning.status_color(), "#f59e0b");
        assert_eq!(warning.status_text(), "Nearly Full");
        assert_eq!(warning.status_level(), "warning");

        let normal = center(50, 100);
        assert_eq!(normal.status_color(), "#10b981");
        assert_eq!(normal.status_text(), "Available");
        assert_eq!(normal.status_level(), "normal");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EvacuationCenter::new(9, "Nowhere", "Baco", 0).unwrap_err();
        assert!(matches!(err, EvacError::InvalidCapacity { capacity: 0, .. }));
    }

    #[test]
    fn test_derived_numbers() {
        let c = center(88, 90);
        assert_eq!(c.available_slots(), 2);
        assert!((c.occupancy_percent() - 97.777).abs() < 0.01);
        assert_eq!(center(120, 100).available_slots(), 0);
    }

    #[test]
    fn test_reported_status_can_differ() {
        let c = center(80, 80).with_status(OccupancyStatus::Warning);
        assert_eq!(c.status, OccupancyStatus::Warning);
        assert_eq!(c.occupancy_status(), OccupancyStatus::Critical);
    }

    #[test]
    fn test_lowest_supply() {
        assert_eq!(SupplyLevels::new(30, 25, 40, 60).lowest(), ("water", 25));
        assert_eq!(SupplyLevels::new(50, 50, 50, 50).lowest(), ("food", 50));
        assert_eq!(SupplyLevels::new(95, 90, 85, 80).lowest(), ("blankets", 80));
    }

    #[test]
    fn test_json_shape() {
        let at = NaiveDateTime::parse_from_str("2024-01-15 14:30", "%Y-%m-%d %H:%M").unwrap();
        let c = center(50, 120)
            .with_coordinates(13.411, 121.18)
            .with_contact("09123456789")
            .with_last_update(at);
        let value = serde_json::to_value(&c).unwrap();

        assert_eq!(value["lastUpdate"], "2024-01-15 14:30");
        assert_eq!(value["status"], "normal");
        assert_eq!(value["coordinates"], json!({"lat": 13.411, "lon": 121.18}));

        let back: EvacuationCenter = serde_json::from_value(value).unwrap();
        assert_eq!(back, c);
    }
}
