//! Backend resource services.
//!
//! Each service is a thin set of path builders over the shared
//! [`ApiClient`](sagip_client::ApiClient); authentication and token
//! refresh happen in the client.

mod analytics;
mod centers;
mod hazards;
mod logs;

pub use analytics::{AnalyticsService, CongestionRisk, RiskLevel};
pub use centers::{CenterKind, CenterRecord, EvacCenterService, Susceptibility};
pub use hazards::{HazardPhoto, HazardReport, HazardReportService, HazardType, NewHazardReport, ReportStatus, Severity};
pub use logs::{EvacuationLog, EvacuationLogService, LogFilter, NewEvacuationLog};

use serde::Deserialize;

/// A list endpoint's body, paginated or not.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Page { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Page { results } => results,
            ListBody::Plain(items) => items,
        }
    }
}

/// Decimal fields arrive as strings (`"13.4110000"`) or numbers.
mod decimal {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<f64, E> {
        match raw {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        parse(Raw::deserialize(d)?)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_shapes() {
        let plain: ListBody<u32> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2]);

        let page: ListBody<u32> =
            serde_json::from_value(json!({"count": 1, "next": null, "results": [7]})).unwrap();
        assert_eq!(page.into_vec(), vec![7]);
    }

    #[test]
    fn test_decimal_accepts_strings_and_numbers() {
        #[derive(Deserialize)]
        struct Point {
            #[serde(deserialize_with = "decimal::deserialize")]
            lat: f64,
            #[serde(default, deserialize_with = "decimal::deserialize_opt")]
            lon: Option<f64>,
        }

        let p: Point = serde_json::from_value(json!({"lat": "13.4110000", "lon": 121.18})).unwrap();
        assert_eq!(p.lat, 13.411);
        assert_eq!(p.lon, Some(121.18));

        let p: Point = serde_json::from_value(json!({"lat": 1, "lon": null})).unwrap();
        assert_eq!(p.lon, None);
    }
}
