//! Hazard report service.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sagip_client::ApiClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::decimal;
use crate::EvacError;

const HAZARDS_PATH: &str = "hazards/";

/// Kind of hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardType {
    Flood,
    Landslide,
    Fire,
    /// Fallen tree.
    Tree,
    RoadDamage,
    BuildingDamage,
    /// Downed lines, leaks and similar.
    Utility,
    Other,
}

impl HazardType {
    pub const ALL: [HazardType; 8] = [
        HazardType::Flood,
        HazardType::Landslide,
        HazardType::Fire,
        HazardType::Tree,
        HazardType::RoadDamage,
        HazardType::BuildingDamage,
        HazardType::Utility,
        HazardType::Other,
    ];

    /// Backend code.
    pub fn code(&self) -> &'static str {
        match self {
            HazardType::Flood => "FLOOD",
            HazardType::Landslide => "LANDSLIDE",
            HazardType::Fire => "FIRE",
            HazardType::Tree => "TREE",
            HazardType::RoadDamage => "ROAD_DAMAGE",
            HazardType::BuildingDamage => "BUILDING_DAMAGE",
            HazardType::Utility => "UTILITY",
            HazardType::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HazardType::Flood => "Flood",
            HazardType::Landslide => "Landslide",
            HazardType::Fire => "Fire",
            HazardType::Tree => "Fallen Tree",
            HazardType::RoadDamage => "Road Damage",
            HazardType::BuildingDamage => "Building Damage",
            HazardType::Utility => "Utility Hazard",
            HazardType::Other => "Other",
        }
    }
}

impl FromStr for HazardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase().replace('-', "_");
        HazardType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| format!("unknown hazard type: {}", s))
    }
}

/// How dangerous a hazard is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Review state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    /// Submitted, not yet reviewed.
    #[default]
    Reported,
    Pending,
    Approved,
    Dismissed,
}

/// Photo attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardPhoto {
    pub id: u64,
    pub image: String,
}

/// A hazard report as stored on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardReport {
    pub id: u64,
    #[serde(default)]
    pub user: Option<u64>,
    pub municipality: u64,
    pub hazard_type: HazardType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub latitude: f64,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub longitude: f64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub photos: Vec<HazardPhoto>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

/// A hazard to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHazardReport {
    pub hazard_type: HazardType,
    pub severity: Severity,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Taken from the reporter's account when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<u64>,
    pub contact_name: String,
    pub contact_phone: String,
}

impl NewHazardReport {
    pub fn new(hazard_type: HazardType, title: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            hazard_type,
            severity: Severity::default(),
            title: title.into(),
            description: None,
            address: String::new(),
            latitude: lat,
            longitude: lon,
            municipality: None,
            contact_name: String::new(),
            contact_phone: String::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_municipality(mut self, id: u64) -> Self {
        self.municipality = Some(id);
        self
    }

    pub fn with_contact(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.contact_name = name.into();
        self.contact_phone = phone.into();
        self
    }
}

/// Hazard report endpoints.
#[derive(Debug, Clone)]
pub struct HazardReportService {
    client: ApiClient,
}

impl HazardReportService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// File a report. The endpoint takes form data.
    pub async fn submit(&self, report: &NewHazardReport) -> Result<HazardReport, EvacError> {
        let created: HazardReport = self.client.post_form(HAZARDS_PATH, report).await?;
        info!(id = created.id, hazard = created.hazard_type.code(), "hazard reported");
        Ok(created)
    }
}
