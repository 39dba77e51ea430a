//! Evacuation center registry service.

use chrono::{DateTime, Utc};
use sagip_client::ApiClient;
use serde::{Deserialize, Serialize};

use super::{decimal, ListBody};
use crate::EvacError;

const CENTERS_PATH: &str = "evac_centers/evac-centers/";

/// Hazard susceptibility of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Susceptibility {
    #[default]
    Low,
    Medium,
    High,
}

/// Whether a site is a dedicated center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CenterKind {
    Permanent,
    #[default]
    Temporary,
}

/// An evacuation center as registered on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub province: Option<String>,
    /// Municipality ID.
    pub municipality: u64,
    pub name: String,
    /// Barangay ID.
    #[serde(default)]
    pub barangay: Option<u64>,
    #[serde(default)]
    pub fund_source: Option<String>,
    #[serde(default)]
    pub family_capacity_max: u32,
    #[serde(default)]
    pub individual_capacity_max: u32,
    #[serde(default)]
    pub used_for_covid: bool,
    #[serde(default, deserialize_with = "decimal::deserialize_opt")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "decimal::deserialize_opt")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub flood_susceptibility: Susceptibility,
    #[serde(default)]
    pub landslide_susceptibility: Susceptibility,
    #[serde(default)]
    pub status: CenterKind,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CenterRecord {
    /// A new center to register.
    pub fn new(name: impl Into<String>, municipality: u64) -> Self {
        Self {
            name: name.into(),
            municipality,
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, families: u32, individuals: u32) -> Self {
        self.family_capacity_max = families;
        self.individual_capacity_max = individuals;
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lon);
        self
    }
}

/// Evacuation center endpoints.
#[derive(Debug, Clone)]
pub struct EvacCenterService {
    client: ApiClient,
}

impl EvacCenterService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn item_path(id: u64) -> String {
        format!("{}{}/", CENTERS_PATH, id)
    }

    /// All registered centers.
    pub async fn list(&self) -> Result<Vec<CenterRecord>, EvacError> {
        let body: ListBody<CenterRecord> = self.client.get_json(CENTERS_PATH).await?;
        Ok(body.into_vec())
    }

    pub async fn get(&self, id: u64) -> Result<CenterRecord, EvacError> {
        Ok(self.client.get_json(&Self::item_path(id)).await?)
    }

    pub async fn create(&self, center: &CenterRecord) -> Result<CenterRecord, EvacError> {
        Ok(self.client.post_json(CENTERS_PATH, center).await?)
    }

    /// Change some fields of a center.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        id: u64,
        patch: &P,
    ) -> Result<CenterRecord, EvacError> {
        Ok(self.client.patch_json(&Self::item_path(id), patch).await?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), EvacError> {
        Ok(self.client.delete(&Self::item_path(id)).await?)
    }
}
