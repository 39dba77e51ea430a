//! Demonstration dataset.

use chrono::NaiveDate;

use crate::center::{EvacuationCenter, OccupancyStatus, SupplyLevels};

struct Row {
    id: u64,
    name: &'static str,
    municipality: &'static str,
    lat: f64,
    lon: f64,
    capacity: u32,
    occupants: u32,
    supplies: [u8; 4],
    status: OccupancyStatus,
    contact: &'static str,
    updated: (u32, u32),
}

const ROWS: [Row; 5] = [
    Row {
        id: 1,
        name: "Calapan Central School",
        municipality: "Calapan City",
        lat: 13.411,
        lon: 121.18,
        capacity: 120,
        occupants: 50,
        supplies: [85, 90, 70, 95],
        status: OccupancyStatus::Normal,
        contact: "09123456789",
        updated: (14, 30),
    },
    Row {
        id: 2,
        name: "Naujan Evacuation Hall",
        municipality: "Naujan",
        lat: 13.325,
        lon: 121.31,
        capacity: 100,
        occupants: 95,
        supplies: [30, 25, 40, 60],
        status: OccupancyStatus::Critical,
        contact: "09123456790",
        updated: (13, 45),
    },
    Row {
        id: 3,
        name: "Baco Barangay Center",
        municipality: "Baco",
        lat: 13.346,
        lon: 121.13,
        capacity: 80,
        occupants: 80,
        supplies: [50, 45, 60, 70],
        status: OccupancyStatus::Warning,
        contact: "09123456791",
        updated: (15, 20),
    },
    Row {
        id: 4,
        name: "Puerto Galera Gymnasium",
        municipality: "Puerto Galera",
        lat: 13.502,
        lon: 120.954,
        capacity: 150,
        occupants: 45,
        supplies: [95, 90, 85, 80],
        status: OccupancyStatus::Normal,
        contact: "09123456792",
        updated: (12, 15),
    },
    Row {
        id: 5,
        name: "Roxas Memorial Center",
        municipality: "Roxas",
        lat: 12.589,
        lon: 121.522,
        capacity: 90,
        occupants: 88,
        supplies: [35, 40, 25, 50],
        status: OccupancyStatus::Critical,
        contact: "09123456793",
        updated: (16, 0),
    },
];

/// Five Oriental Mindoro centers as reported on 2024-01-15.
///
/// `status` is the value the centers reported, which can lag the load
/// (Baco is full but still reports a warning).
pub fn demo_centers() -> Vec<EvacuationCenter> {
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default();

    ROWS.iter()
        .map(|row| {
            let [food, water, medicine, blankets] = row.supplies;
            EvacuationCenter {
                id: row.id,
                name: row.name.to_string(),
                municipality: row.municipality.to_string(),
                coordinates: crate::Coordinates::new(row.lat, row.lon),
                capacity: row.capacity,
                occupants: row.occupants,
                supplies: SupplyLevels::new(food, water, medicine, blankets),
                status: row.status,
                contact: row.contact.to_string(),
                last_update: day
                    .and_hms_opt(row.updated.0, row.updated.1, 0)
                    .unwrap_or_default(),
            }
        })
        .collect()
}
