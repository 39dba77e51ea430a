//! Congestion analytics service.

use sagip_client::{ApiClient, ApiRequest};
use serde::{Deserialize, Serialize};

use crate::EvacError;

/// Congestion risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Short-term congestion forecast for a center.
///
/// Occupancy values are fractions of capacity, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionRisk {
    pub center_id: u64,
    pub capacity: u32,
    #[serde(default)]
    pub latest_log_time: Option<String>,
    pub current_total: u32,
    pub occupancy: f64,
    pub window_minutes: u32,
    pub horizon_minutes: u32,
    pub total_in_window: i64,
    pub total_out_window: i64,
    pub net_rate_per_min: f64,
    pub predicted_total: i64,
    pub predicted_occupancy: f64,
    pub vulnerable_total: u32,
    pub vulnerability_ratio: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

/// Analytics endpoints.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    client: ApiClient,
}

impl AnalyticsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Congestion risk with the server's default one-hour window and horizon.
    pub async fn congestion_risk(&self, center_id: u64) -> Result<CongestionRisk, EvacError> {
        self.congestion_risk_with(center_id, None, None).await
    }

    /// Congestion risk over a custom look-back window and forecast horizon,
    /// in minutes. The server clamps both.
    pub async fn congestion_risk_with(
        &self,
        center_id: u64,
        window: Option<u32>,
        horizon: Option<u32>,
    ) -> Result<CongestionRisk, EvacError> {
        let request = ApiRequest::get(format!("analytics/centers/{}/congestion-risk/", center_id))
            .query_opt("window", window)
            .query_opt("horizon", horizon);
        Ok(self.client.send_json(request).await?)
    }
}
