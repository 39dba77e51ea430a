//! Evacuation log service.

use chrono::{DateTime, Utc};
use sagip_client::{ApiClient, ApiRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ListBody;
use crate::EvacError;

const LOGS_PATH: &str = "evac_centers/evacuation-logs/";

/// A head count recorded at a center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvacuationLog {
    pub id: u64,
    pub center: u64,
    #[serde(default)]
    pub reporting_staff: Option<u64>,
    pub date_recorded: DateTime<Utc>,
    #[serde(default)]
    pub families_in: u32,
    #[serde(default)]
    pub individuals_in: u32,
    #[serde(default)]
    pub families_out: u32,
    #[serde(default)]
    pub individuals_out: u32,
    #[serde(default)]
    pub vulnerable_individuals: u32,
    /// Individuals in the center after this entry; computed by the server.
    #[serde(default)]
    pub total_current: u32,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// A head count to record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewEvacuationLog {
    pub center: u64,
    /// Defaults to the server's clock when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_recorded: Option<DateTime<Utc>>,
    pub families_in: u32,
    pub individuals_in: u32,
    pub families_out: u32,
    pub individuals_out: u32,
    pub vulnerable_individuals: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl NewEvacuationLog {
    pub fn new(center: u64) -> Self {
        Self {
            center,
            ..Default::default()
        }
    }

    /// Arrivals.
    pub fn arrived(mut self, families: u32, individuals: u32) -> Self {
        self.families_in = families;
        self.individuals_in = individuals;
        self
    }

    /// Departures.
    pub fn departed(mut self, families: u32, individuals: u32) -> Self {
        self.families_out = families;
        self.individuals_out = individuals;
        self
    }

    pub fn with_vulnerable(mut self, count: u32) -> Self {
        self.vulnerable_individuals = count;
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.date_recorded = Some(at);
        self
    }
}

/// Query parameters for listing logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub center: Option<u64>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl LogFilter {
    /// Logs of one center.
    pub fn center(center: u64) -> Self {
        Self {
            center: Some(center),
            ..Default::default()
        }
    }

    fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .query_opt("center", self.center)
            .query_opt("ordering", self.ordering.as_deref())
            .query_opt("page", self.page)
    }
}

/// Evacuation log endpoints.
#[derive(Debug, Clone)]
pub struct EvacuationLogService {
    client: ApiClient,
}

impl EvacuationLogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn item_path(id: u64) -> String {
        format!("{}{}/", LOGS_PATH, id)
    }

    /// List logs.
    pub async fn list(&self, filter: &LogFilter) -> Result<Vec<EvacuationLog>, EvacError> {
        let request = filter.apply(ApiRequest::get(LOGS_PATH));
        let body: ListBody<EvacuationLog> = self.client.send_json(request).await?;
        let logs = body.into_vec();
        debug!(count = logs.len(), "listed evacuation logs");
        Ok(logs)
    }

    /// Record a head count.
    pub async fn create(&self, log: &NewEvacuationLog) -> Result<EvacuationLog, EvacError> {
        Ok(self.client.post_json(LOGS_PATH, log).await?)
    }

    /// Change some fields of a log.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        id: u64,
        patch: &P,
    ) -> Result<EvacuationLog, EvacError> {
        Ok(self.client.patch_json(&Self::item_path(id), patch).await?)
    }

    /// Delete a log.
    pub async fn delete(&self, id: u64) -> Result<(), EvacError> {
        Ok(self.client.delete(&Self::item_path(id)).await?)
    }

    /// Per-staff totals. The shape is defined by the server.
    pub async fn staff_summary(&self) -> Result<Value, EvacError> {
        Ok(self
            .client
            .get_json(&format!("{}staff_summary/", LOGS_PATH))
            .await?)
    }

    /// Most recent log of a center, if any.
    pub async fn latest_by_center(&self, center: u64) -> Result<Option<EvacuationLog>, EvacError> {
        let request =
            ApiRequest::get(format!("{}latest_by_center/", LOGS_PATH)).query("center", center);
        match self.client.send_json::<Option<EvacuationLog>>(request).await {
            Ok(log) => Ok(log),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body, client};
    use sagip_client::{Method, Response};
    use serde_json::json;

    fn log_json(id: u64, center: u64, total: u32) -> Value {
        json!({
            "id": id,
            "center": center,
            "reporting_staff": 4,
            "date_recorded": "2024-01-15T14:30:00+08:00",
            "families_in": 3,
            "individuals_in": 12,
            "families_out": 0,
            "individuals_out": 0,
            "vulnerable_individuals": 2,
            "total_current": total,
            "remarks": null
        })
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let (client, transport) = client(|_| {
            Ok(Response::with_json(
                200,
                &json!({"count": 1, "results": [log_json(1, 3, 12)]}),
            ))
        });
        let service = EvacuationLogService::new(client);

        let logs = service.list(&LogFilter::center(3)).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].total_current, 12);
        assert_eq!(logs[0].date_recorded.to_rfc3339(), "2024-01-15T06:30:00+00:00");

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "http://api.test/api/evac_centers/evacuation-logs/");
        assert_eq!(sent.query, vec![("center".to_string(), "3".to_string())]);
        assert_eq!(sent.bearer_token(), Some("acc"));
    }

    #[tokio::test]
    async fn test_create_update_delete_paths() {
        let (client, transport) = client(|request| {
            Ok(match request.method {
                Method::Delete => Response::new(204, Default::default(), Vec::new()),
                _ => Response::with_json(201, &log_json(8, 3, 12)),
            })
        });
        let service = EvacuationLogService::new(client);

        let created = service
            .create(&NewEvacuationLog::new(3).arrived(3, 12).with_vulnerable(2))
            .await
            .unwrap();
        assert_eq!(created.id, 8);

        service
            .update(8, &json!({"remarks": "generator down"}))
            .await
            .unwrap();
        service.delete(8).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(body(&sent[0])["individuals_in"], 12);
        assert!(body(&sent[0]).get("date_recorded").is_none());
        assert_eq!(sent[1].method, Method::Patch);
        assert_eq!(sent[1].url, "http://api.test/api/evac_centers/evacuation-logs/8/");
        assert_eq!(sent[2].method, Method::Delete);
        assert_eq!(sent[2].url, "http://api.test/api/evac_centers/evacuation-logs/8/");
    }

    #[tokio::test]
    async fn test_summary_and_latest() {
        let (client, transport) = client(|request| {
            Ok(if request.url.ends_with("staff_summary/") {
                Response::with_json(200, &json!([{"staff": 4, "logs": 10}]))
            } else if request.query.iter().any(|(_, v)| v == "3") {
                Response::with_json(200, &log_json(9, 3, 40))
            } else {
                Response::with_json(404, &json!({"detail": "Not found."}))
            })
        });
        let service = EvacuationLogService::new(client);

        let summary = service.staff_summary().await.unwrap();
        assert_eq!(summary[0]["logs"], 10);

        let latest = service.latest_by_center(3).await.unwrap().unwrap();
        assert_eq!(latest.total_current, 40);
        assert!(service.latest_by_center(5).await.unwrap().is_none());

        let sent = transport.requests();
        assert_eq!(
            sent[1].url,
            "http://api.test/api/evac_centers/evacuation-logs/latest_by_center/"
        );
        assert_eq!(sent[1].query, vec![("center".to_string(), "3".to_string())]);
    }
}
