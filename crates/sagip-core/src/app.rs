//! SagipApp configuration and setup.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sagip_auth::AuthService;
use sagip_client::{ApiClient, ClientConfig, SessionExpired, Transport};
use sagip_evac::{AnalyticsService, EvacCenterService, EvacuationLogService, HazardReportService};
use sagip_router::{Navigation, Navigator, RouteTable, LOGIN_PATH};
use sagip_session::{Session, SessionContext};
use sagip_store::{MemoryStore, Store};
use tracing::{debug, warn};

use crate::SagipError;

/// Configuration for a Sagip client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Application name, used in logs.
    pub name: String,
    /// API base URL.
    pub base_url: String,
    /// Token refresh endpoint, relative to the base URL.
    pub refresh_path: String,
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            name: "sagip".to_string(),
            base_url: client.base_url,
            refresh_path: client.refresh_path,
            timeout: client.timeout,
        }
    }
}

impl AppConfig {
    /// Create a configuration for an API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the application name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the token refresh endpoint.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the configuration before wiring a client.
    pub fn validate(&self) -> Result<(), SagipError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SagipError::Config(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.refresh_path.trim().is_empty() {
            return Err(SagipError::Config("refresh path is empty".to_string()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(SagipError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            refresh_path: self.refresh_path.clone(),
            timeout: self.timeout,
        }
    }
}

/// Sagip application builder.
///
/// # Example
///
/// ```rust,ignore
/// let app = SagipApp::builder(AppConfig::new("https://sagip.example/api/"))
///     .with_store(Store::new(FileStore::open(path)?))
///     .build()?;
///
/// app.auth().login(&Credentials::new(email, password)).await?;
/// ```
pub struct SagipAppBuilder {
    config: AppConfig,
    store: Option<Store>,
    transport: Option<Arc<dyn Transport>>,
    routes: Option<RouteTable>,
}

impl SagipAppBuilder {
    /// Persist the session in `store`. Defaults to memory.
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    /// Send requests through `transport`. Defaults to HTTP.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom route table. Defaults to the built-in one.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Wire everything together.
    pub fn build(self) -> Result<SagipApp, SagipError> {
        self.config.validate()?;

        let store = self.store.unwrap_or_else(|| Store::new(MemoryStore::new()));
        let session = SessionContext::new(store);
        let client_config = self.config.client_config();
        let client = match self.transport {
            Some(transport) => ApiClient::with_transport(client_config, session.clone(), transport),
            None => ApiClient::new(client_config, session.clone())?,
        };

        let expired = Arc::new(Mutex::new(None));
        let sink = expired.clone();
        client.on_session_expired(move |notice: SessionExpired| {
            warn!(reason = %notice.reason, "session ended, redirecting to {}", LOGIN_PATH);
            *sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(notice);
        });

        debug!(name = %self.config.name, base_url = %self.config.base_url, "app wired");

        Ok(SagipApp {
            auth: AuthService::new(client.clone()),
            navigator: Navigator::new(self.routes.unwrap_or_else(RouteTable::default_routes)),
            config: self.config,
            session,
            client,
            expired,
        })
    }
}

/// A wired Sagip client.
pub struct SagipApp {
    config: AppConfig,
    session: SessionContext,
    client: ApiClient,
    auth: AuthService,
    navigator: Navigator,
    expired: Arc<Mutex<Option<SessionExpired>>>,
}

impl std::fmt::Debug for SagipApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SagipApp")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SagipApp {
    /// Start building an app.
    pub fn builder(config: AppConfig) -> SagipAppBuilder {
        SagipAppBuilder {
            config,
            store: None,
            transport: None,
            routes: None,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared session.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Authenticated API client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Sign-in service.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Navigator over the app's routes.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn logs(&self) -> EvacuationLogService {
        EvacuationLogService::new(self.client.clone())
    }

    pub fn centers(&self) -> EvacCenterService {
        EvacCenterService::new(self.client.clone())
    }

    pub fn hazards(&self) -> HazardReportService {
        HazardReportService::new(self.client.clone())
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.client.clone())
    }

    /// Resolve a navigation against the stored session.
    pub fn navigate(&self, path: &str) -> Result<Navigation, SagipError> {
        let session: Session = self.session.load()?;
        Ok(self.navigator.navigate(path, &session)?)
    }

    /// Take the pending redirect left by an ended session, if any.
    ///
    /// Returns the login path once per session expiry.
    pub fn take_redirect(&self) -> Option<&'static str> {
        self.expired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(|_| LOGIN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagip_client::testing::MockTransport;
    use sagip_client::Response;
    use sagip_session::TokenPair;
    use serde_json::json;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.name, "sagip");
        assert_eq!(config.base_url, "http://127.0.0.1:8000/api/");
        assert_eq!(config.refresh_path, "auth/refresh/");
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_validate() {
        assert!(AppConfig::new("ftp://x").validate().is_err());
        assert!(AppConfig::default().with_refresh_path(" ").validate().is_err());
        assert!(AppConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(AppConfig::default()
            .with_timeout(Duration::from_secs(10))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_build_rejects_bad_config() {
        let err = SagipApp::builder(AppConfig::new("localhost:8000"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SagipError::Config(_)));
    }

    #[test]
    fn test_navigate_uses_stored_session() {
        let app = SagipApp::builder(AppConfig::default()).build().unwrap();
        assert_eq!(app.navigate("/admin/dashboard").unwrap().path, "/auth/login");

        app.session().begin(&TokenPair::new("a", "r")).unwrap();
        assert_eq!(app.navigate("/auth/login").unwrap().path, "/user/dashboard");
    }

    #[tokio::test]
    async fn test_expired_session_leaves_redirect() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(Response::with_json(401, &json!({"detail": "Token is invalid or expired"})))
        }));
        let app = SagipApp::builder(AppConfig::new("http://api.test/api/"))
            .with_transport(transport.clone())
            .build()
            .unwrap();
        app.session().begin(&TokenPair::new("a", "r")).unwrap();

        let err = app.logs().staff_summary().await.unwrap_err();
        assert!(SagipError::from(err).is_session_expired());

        assert_eq!(app.take_redirect(), Some("/auth/login"));
        assert_eq!(app.take_redirect(), None);
        assert!(!app.session().load().unwrap().is_authenticated);
        assert_eq!(transport.calls("auth/refresh/"), 1);
    }
}
