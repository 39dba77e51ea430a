//! Evacuation domain for Sagip.
//!
//! Capacity tracking for evacuation centers, the demonstration dataset, and
//! services for the backend's evacuation log, center registry, hazard
//! report and congestion analytics endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use sagip_evac::{demo_centers, EvacuationLogService, LogFilter};
//!
//! for center in demo_centers() {
//!     println!("{}: {}", center.name, center.status_text());
//! }
//!
//! let logs = EvacuationLogService::new(client.clone())
//!     .list(&LogFilter::center(3))
//!     .await?;
//! ```

mod center;
mod demo;
mod error;
pub mod services;

pub use center::{Coordinates, EvacuationCenter, OccupancyStatus, SupplyLevels};
pub use demo::demo_centers;
pub use error::EvacError;
pub use services::{
    AnalyticsService, CongestionRisk, EvacCenterService, EvacuationLog, EvacuationLogService,
    HazardReport, HazardReportService, HazardType, LogFilter, NewEvacuationLog, NewHazardReport,
    RiskLevel, Severity,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        demo_centers, EvacError, EvacuationCenter, EvacuationLogService, HazardReportService,
        OccupancyStatus,
    };
}
