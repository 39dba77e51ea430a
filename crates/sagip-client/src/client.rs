//! Authenticated API client.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use sagip_session::{SessionContext, TokenPair};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExpiredReason;
use crate::request::join_url;
use crate::transport::{ReqwestTransport, Transport};
use crate::{ApiRequest, RequestError, Response};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Default token refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "auth/refresh/";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every relative path is joined onto.
    pub base_url: String,
    /// Token refresh endpoint.
    pub refresh_path: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the refresh endpoint.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Absolute URL for a path.
    pub fn url_for(&self, path: &str) -> Result<String, RequestError> {
        join_url(&self.base_url, path)
    }
}

/// Notice delivered to hooks when the client ends a session.
///
/// Receivers are expected to send the user to the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpired {
    pub reason: ExpiredReason,
}

type SessionExpiredHook = Arc<dyn Fn(SessionExpired) + Send + Sync>;
type Hooks = Arc<RwLock<Vec<SessionExpiredHook>>>;
type RefreshFuture = Shared<BoxFuture<'static, Result<String, ExpiredReason>>>;

#[derive(Default)]
struct RefreshSlot {
    generation: u64,
    in_flight: Option<(u64, RefreshFuture)>,
}

struct ClientInner {
    config: ClientConfig,
    session: SessionContext,
    transport: Arc<dyn Transport>,
    hooks: Hooks,
    refresh: Mutex<RefreshSlot>,
}

/// HTTP client for the Sagip API.
///
/// Attaches the stored access token to every request. A 401 triggers one
/// token refresh and one resend; concurrent 401s share a single refresh
/// call. When the session cannot be renewed it is cleared and the
/// registered hooks are told.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client that talks HTTP through `reqwest`.
    pub fn new(config: ClientConfig, session: SessionContext) -> Result<Self, RequestError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        session: SessionContext,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                session,
                transport,
                hooks: Arc::new(RwLock::new(Vec::new())),
                refresh: Mutex::new(RefreshSlot::default()),
            }),
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Session the client reads tokens from.
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Register a hook called whenever the client ends the session.
    pub fn on_session_expired<F>(&self, hook: F)
    where
        F: Fn(SessionExpired) + Send + Sync + 'static,
    {
        self.inner
            .hooks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(hook));
    }

    /// Send a request.
    ///
    /// Non-2xx responses come back as [`RequestError::Http`].
    pub async fn send(&self, request: ApiRequest) -> Result<Response, RequestError> {
        let request = request.resolve(&self.inner.config.base_url)?;

        if request.anonymous {
            debug!(method = %request.method, url = %request.url, "anonymous request");
            return self.inner.transport.send(&request).await?.error_for_status();
        }

        let sent_token = self.inner.session.access_token()?;
        let request = match &sent_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!(method = %request.method, url = %request.url, "request");
        let resp = self.inner.transport.send(&request).await?;
        if !resp.is_unauthorized() || request.retried {
            return resp.error_for_status();
        }

        debug!(url = %request.url, "unauthorized, renewing access token");
        let token = self.renew_access_token(sent_token.as_deref()).await?;

        let mut retry = request.bearer_auth(token);
        retry.retried = true;
        self.inner.transport.send(&retry).await?.error_for_status()
    }

    /// Send a request and parse the JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, RequestError> {
        self.send(request).await?.json()
    }

    /// GET a path and parse the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    /// POST a URL-encoded form and parse the JSON response.
    pub async fn post_form<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).form(body)?).await
    }

    /// PUT a JSON body and parse the JSON response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    /// PATCH a JSON body and parse the JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::patch(path).json(body)?).await
    }

    /// DELETE a path, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), RequestError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Get an access token newer than `stale`.
    ///
    /// Joins a refresh already in flight, reuses a token another request
    /// stored meanwhile, or starts a refresh.
    async fn renew_access_token(&self, stale: Option<&str>) -> Result<String, RequestError> {
        let (generation, refresh) = {
            let mut slot = lock(&self.inner.refresh);

            let current = self.inner.session.access_token()?;
            if let Some(current) = &current {
                if Some(current.as_str()) != stale {
                    debug!("access token renewed by another request");
                    return Ok(current.clone());
                }
            }

            match slot.in_flight.clone() {
                Some(in_flight) => in_flight,
                None => {
                    let Some(refresh_token) = self.inner.session.refresh_token()? else {
                        drop(slot);
                        // Sent with a token that is gone now: another request
                        // already ended the session and told the hooks.
                        if stale.is_some() && current.is_none() {
                            debug!("session already ended by another request");
                            return Err(RequestError::SessionExpired(
                                ExpiredReason::NoRefreshToken,
                            ));
                        }
                        expire(
                            &self.inner.session,
                            &self.inner.hooks,
                            ExpiredReason::NoRefreshToken,
                        );
                        return Err(RequestError::SessionExpired(ExpiredReason::NoRefreshToken));
                    };

                    slot.generation += 1;
                    let generation = slot.generation;
                    let refresh = refresh_tokens(
                        self.inner.transport.clone(),
                        self.inner.session.clone(),
                        self.inner.hooks.clone(),
                        self.inner.config.url_for(&self.inner.config.refresh_path)?,
                        refresh_token,
                    )
                    .boxed()
                    .shared();
                    slot.in_flight = Some((generation, refresh.clone()));
                    (generation, refresh)
                }
            }
        };

        let outcome = refresh.await;

        let mut slot = lock(&self.inner.refresh);
        if slot.in_flight.as_ref().map(|(g, _)| *g) == Some(generation) {
            slot.in_flight = None;
        }
        drop(slot);

        outcome.map_err(RequestError::SessionExpired)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn expire(session: &SessionContext, hooks: &Hooks, reason: ExpiredReason) {
    warn!(%reason, "session expired, signing out");
    session.clear();

    let hooks = hooks.read().unwrap_or_else(|e| e.into_inner()).clone();
    for hook in hooks {
        hook(SessionExpired { reason });
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

async fn request_refresh(
    transport: &dyn Transport,
    url: String,
    refresh_token: &str,
) -> Result<TokenPair, RequestError> {
    let request = ApiRequest::post(url).json(&RefreshRequest {
        refresh: refresh_token,
    })?;
    transport.send(&request).await?.error_for_status()?.json()
}

async fn refresh_tokens(
    transport: Arc<dyn Transport>,
    session: SessionContext,
    hooks: Hooks,
    url: String,
    refresh_token: String,
) -> Result<String, ExpiredReason> {
    info!("refreshing access token");

    match request_refresh(transport.as_ref(), url, &refresh_token).await {
        Ok(tokens) => {
            if let Err(e) = session.replace_tokens(&tokens) {
                warn!(error = %e, "could not persist refreshed tokens");
            }
            Ok(tokens.access)
        }
        Err(e) => {
            warn!(error = %e, "token refresh failed");
            expire(&session, &hooks, ExpiredReason::RefreshFailed);
            Err(ExpiredReason::RefreshFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use sagip_session::{Session, UserProfile};
    use sagip_store::{MemoryStore, Store};
    use serde_json::{json, Value};

    /// Accepts the token "fresh" on `data/` and trades refresh token "r1"
    /// for it.
    fn server(request: &ApiRequest) -> Result<Response, RequestError> {
        if request.url.ends_with(DEFAULT_REFRESH_PATH) {
            let body: Value =
                serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap();
            return Ok(if body["refresh"] == "r1" {
                Response::with_json(200, &json!({"access": "fresh"}))
            } else {
                Response::with_json(401, &json!({"detail": "Token is invalid or expired"}))
            });
        }
        if request.url.ends_with("public/") || request.bearer_token() == Some("fresh") {
            return Ok(Response::with_json(200, &json!({"ok": true})));
        }
        Ok(Response::with_json(401, &json!({"detail": "Given token not valid"})))
    }

    fn session_with(tokens: Option<TokenPair>) -> SessionContext {
        let session = SessionContext::new(Store::new(MemoryStore::new()));
        if let Some(tokens) = tokens {
            session.begin(&tokens).unwrap();
            session
                .set_profile(&UserProfile::new(Default::default(), "ana@example.com"))
                .unwrap();
        }
        session
    }

    fn client(session: &SessionContext, transport: &Arc<MockTransport>) -> ApiClient {
        ApiClient::with_transport(
            ClientConfig::new("http://api.test/api/"),
            session.clone(),
            transport.clone(),
        )
    }

    fn expiry_counter(client: &ApiClient) -> Arc<Mutex<Vec<ExpiredReason>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        client.on_session_expired(move |notice| sink.lock().unwrap().push(notice.reason));
        seen
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000/api/");
        assert_eq!(
            config.url_for(&config.refresh_path).unwrap(),
            "http://127.0.0.1:8000/api/auth/refresh/"
        );
        assert!(config.timeout.is_none());
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let session = session_with(Some(TokenPair::new("fresh", "r1")));
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);

        let value: Value = client.get_json("data/").await.unwrap();
        assert_eq!(value["ok"], true);

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://api.test/api/data/");
        assert_eq!(sent[0].bearer_token(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_signed_out_request_has_no_bearer() {
        let session = session_with(None);
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);

        let _: Value = client.get_json("public/").await.unwrap();
        assert_eq!(transport.requests()[0].bearer_token(), None);
    }

    #[tokio::test]
    async fn test_refreshes_and_retries_once() {
        let session = session_with(Some(TokenPair::new("stale", "r1")));
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);
        let expired = expiry_counter(&client);

        let value: Value = client.get_json("data/").await.unwrap();
        assert_eq!(value["ok"], true);

        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 1);
        assert_eq!(transport.calls("data/"), 2);
        let sent = transport.requests();
        assert_eq!(sent[1].bearer_token(), None);
        assert_eq!(sent[2].bearer_token(), Some("fresh"));
        assert!(sent[2].is_retry());

        assert_eq!(session.access_token().unwrap().as_deref(), Some("fresh"));
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("r1"));
        assert!(session.load().unwrap().is_authenticated);
        assert!(expired.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_clears_session() {
        let session = session_with(Some(TokenPair {
            access: "stale".into(),
            refresh: None,
        }));
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);
        let expired = expiry_counter(&client);

        let err = client.get_json::<Value>("data/").await.unwrap_err();
        assert!(matches!(
            err,
            RequestError::SessionExpired(ExpiredReason::NoRefreshToken)
        ));

        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
        assert_eq!(session.load().unwrap(), Session::anonymous());
        assert_eq!(*expired.lock().unwrap(), vec![ExpiredReason::NoRefreshToken]);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_session() {
        let session = session_with(Some(TokenPair::new("stale", "revoked")));
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);
        let expired = expiry_counter(&client);

        let err = client.get_json::<Value>("data/").await.unwrap_err();
        assert!(err.is_session_expired());

        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 1);
        assert_eq!(transport.calls("data/"), 1);
        assert_eq!(session.load().unwrap(), Session::anonymous());
        assert_eq!(*expired.lock().unwrap(), vec![ExpiredReason::RefreshFailed]);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_returned() {
        let session = session_with(Some(TokenPair::new("stale", "r1")));
        let transport = Arc::new(MockTransport::new(|request: &ApiRequest| {
            if request.url.ends_with(DEFAULT_REFRESH_PATH) {
                return server(request);
            }
            Ok(Response::with_json(401, &json!({"detail": "nope"})))
        }));
        let client = client(&session, &transport);

        let err = client.get_json::<Value>("data/").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 1);
        assert_eq!(transport.calls("data/"), 2);
        assert_eq!(session.access_token().unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_share_one_refresh() {
        let session = session_with(Some(TokenPair::new("stale", "r1")));
        let transport = Arc::new(
            MockTransport::new(server)
                .with_delay(DEFAULT_REFRESH_PATH, Duration::from_millis(20)),
        );
        let client = client(&session, &transport);

        let (a, b, c) = tokio::join!(
            client.get_json::<Value>("data/"),
            client.get_json::<Value>("data/"),
            client.get_json::<Value>("data/"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 1);
        assert_eq!(transport.calls("data/"), 6);
    }

    #[tokio::test]
    async fn test_late_unauthorized_after_rejected_refresh_expires_once() {
        let session = session_with(Some(TokenPair::new("stale", "revoked")));
        let transport = Arc::new(
            MockTransport::new(server)
                .with_delay(DEFAULT_REFRESH_PATH, Duration::from_millis(20))
                .with_delay("slow/", Duration::from_millis(60)),
        );
        let client = client(&session, &transport);
        let expired = expiry_counter(&client);

        let (a, b, late) = tokio::join!(
            client.get_json::<Value>("data/"),
            client.get_json::<Value>("data/"),
            client.get_json::<Value>("slow/"),
        );
        assert!(a.unwrap_err().is_session_expired());
        assert!(b.unwrap_err().is_session_expired());
        assert!(late.unwrap_err().is_session_expired());

        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 1);
        assert_eq!(session.load().unwrap(), Session::anonymous());
        assert_eq!(*expired.lock().unwrap(), vec![ExpiredReason::RefreshFailed]);
    }

    #[tokio::test]
    async fn test_token_renewed_elsewhere_skips_refresh() {
        let session = session_with(Some(TokenPair::new("stale", "r1")));
        let other = session.clone();
        let transport = Arc::new(MockTransport::new(move |request: &ApiRequest| {
            if request.bearer_token() == Some("stale") {
                other.replace_tokens(&TokenPair::new("fresh", "r1")).unwrap();
            }
            server(request)
        }));
        let client = client(&session, &transport);

        let _: Value = client.get_json("data/").await.unwrap();
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
        assert_eq!(transport.calls("data/"), 2);
    }

    #[tokio::test]
    async fn test_anonymous_request_never_refreshes() {
        let session = session_with(Some(TokenPair::new("stale", "r1")));
        let transport = Arc::new(MockTransport::new(server));
        let client = client(&session, &transport);

        let request = ApiRequest::post("auth/login/")
            .json(&json!({"email": "a@b.c", "password": "x"}))
            .unwrap()
            .anonymous();
        let err = client.send(request).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
        assert_eq!(transport.requests()[0].bearer_token(), None);
        assert!(session.load().unwrap().is_authenticated);
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let session = session_with(Some(TokenPair::new("fresh", "r1")));
        let transport = Arc::new(MockTransport::new(|request: &ApiRequest| {
            if request.url.ends_with("down/") {
                return Err(RequestError::Network("connection refused".into()));
            }
            Ok(Response::with_json(
                400,
                &json!({"capacity": ["Ensure this value is greater than 0."]}),
            ))
        }));
        let client = client(&session, &transport);

        let err = client
            .post_json::<_, Value>("centers/", &json!({"capacity": 0}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.payload().is_some());

        let err = client.delete("down/").await.unwrap_err();
        assert!(matches!(err, RequestError::Network(_)));
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
    }
}
