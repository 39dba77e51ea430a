//! Auth service.

use sagip_client::{ApiClient, ApiRequest};
use sagip_session::{Session, SessionContext, TokenPair, UserProfile};
use tracing::{info, warn};

use crate::{AuthError, Credentials, ProfileRecord, Registration};

/// Login endpoint.
pub const LOGIN_PATH: &str = "auth/login/";
/// Registration endpoint.
pub const REGISTER_PATH: &str = "auth/register/";
/// Current-user profile endpoint.
pub const PROFILE_PATH: &str = "user/profile/";

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_FAILED: &str = "Could not load profile";

/// Signs users in and out.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Create an auth service over a client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Session the service writes to.
    pub fn session(&self) -> &SessionContext {
        self.client.session()
    }

    /// Sign in.
    ///
    /// Stores the issued tokens, then fetches and caches the profile. A
    /// failed profile fetch does not fail the sign-in; the session then
    /// reports the citizen role until the profile is loaded.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let request = ApiRequest::post(LOGIN_PATH).json(credentials)?.anonymous();
        let tokens: TokenPair = self
            .client
            .send(request)
            .await
            .map_err(|e| AuthError::from_response(e, LOGIN_FAILED))?
            .json()?;

        let session = self.session().begin(&tokens)?;
        info!(email = %credentials.email, "signed in");

        match self.get_user_profile().await {
            Ok(profile) => {
                self.session().set_profile(&profile)?;
                Ok(session.with_profile(profile))
            }
            Err(e) => {
                warn!(error = %e, "signed in without a profile");
                Ok(session)
            }
        }
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<ProfileRecord, AuthError> {
        let request = ApiRequest::post(REGISTER_PATH)
            .json(registration)?
            .anonymous();
        let record: ProfileRecord = self
            .client
            .send(request)
            .await
            .map_err(|e| AuthError::from_response(e, REGISTRATION_FAILED))?
            .json()?;

        info!(email = %registration.email, role = ?record.role, "registered account");
        Ok(record)
    }

    /// Sign out locally.
    pub fn logout(&self) {
        self.session().clear();
        info!("signed out");
    }

    /// Fetch the signed-in user's profile.
    pub async fn get_user_profile(&self) -> Result<UserProfile, AuthError> {
        self.client
            .get_json(PROFILE_PATH)
            .await
            .map_err(|e| AuthError::from_response(e, PROFILE_FAILED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagip_client::testing::MockTransport;
    use sagip_client::{ClientConfig, RequestError, Response, DEFAULT_REFRESH_PATH};
    use sagip_session::{keys, Role};
    use sagip_store::{KvStore, MemoryStore, Store};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn service(
        handler: impl Fn(&ApiRequest) -> Result<Response, RequestError> + Send + Sync + 'static,
    ) -> (AuthService, Arc<MockTransport>, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let session = SessionContext::new(Store::new(backend.clone()));
        let transport = Arc::new(MockTransport::new(handler));
        let client = ApiClient::with_transport(
            ClientConfig::new("http://api.test/api/"),
            session,
            transport.clone(),
        );
        (AuthService::new(client), transport, backend)
    }

    fn backend(request: &ApiRequest) -> Result<Response, RequestError> {
        let body: Value = request
            .body
            .as_deref()
            .map(|b| serde_json::from_slice(b).unwrap())
            .unwrap_or(Value::Null);

        let resp = if request.url.ends_with(LOGIN_PATH) {
            if body["password"] == "correct" {
                Response::with_json(200, &json!({"access": "acc", "refresh": "ref"}))
            } else {
                Response::with_json(
                    401,
                    &json!({"detail": "No active account found with the given credentials"}),
                )
            }
        } else if request.url.ends_with(PROFILE_PATH) {
            if request.bearer_token() == Some("acc") {
                Response::with_json(
                    200,
                    &json!({
                        "email": "admin@example.com",
                        "first_name": "Ana",
                        "last_name": "Cruz",
                        "role": "PROVINCIAL_ADMIN",
                        "contact_number": null
                    }),
                )
            } else {
                Response::with_json(401, &json!({"detail": "Authentication credentials were not provided."}))
            }
        } else if request.url.ends_with(REGISTER_PATH) {
            if body["email"] == "taken@example.com" {
                Response::with_json(
                    400,
                    &json!({"email": ["custom user with this email already exists."]}),
                )
            } else {
                Response::with_json(
                    200,
                    &json!({"message": "User created successfully", "user_id": 7, "role": "CITIZEN"}),
                )
            }
        } else {
            Response::new(404, Default::default(), Vec::new())
        };
        Ok(resp)
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_profile() {
        let (auth, transport, store) = service(backend);

        let session = auth
            .login(&Credentials::new("admin@example.com", "correct"))
            .await
            .unwrap();

        assert!(session.is_authenticated);
        assert_eq!(session.role(), Role::Admin);
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("acc"));
        assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("ref"));
        assert_eq!(store.get(keys::IS_AUTHENTICATED).unwrap().as_deref(), Some("true"));
        assert!(store.get(keys::USER_DATA).unwrap().is_some());
        assert_eq!(auth.session().load().unwrap(), session);

        let sent = transport.requests();
        assert_eq!(sent[0].bearer_token(), None);
        assert_eq!(
            serde_json::from_slice::<Value>(sent[0].body.as_deref().unwrap()).unwrap(),
            json!({"email": "admin@example.com", "password": "correct"})
        );
        assert_eq!(sent[1].bearer_token(), Some("acc"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (auth, transport, store) = service(backend);

        let err = auth
            .login(&Credentials::new("admin@example.com", "wrong"))
            .await
            .unwrap_err();

        match &err {
            AuthError::Rejected { message, payload } => {
                assert_eq!(message, "No active account found with the given credentials");
                assert!(payload.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
        assert!(store.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_without_body_uses_fallback() {
        let (auth, _, _) = service(|_: &ApiRequest| Ok(Response::new(500, Default::default(), Vec::new())));

        let err = auth
            .login(&Credentials::new("a@b.c", "correct"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
        assert!(err.payload().is_none());
    }

    #[tokio::test]
    async fn test_login_survives_profile_failure() {
        let (auth, _, store) = service(|request: &ApiRequest| {
            if request.url.ends_with(PROFILE_PATH) {
                return Ok(Response::new(500, Default::default(), Vec::new()));
            }
            backend(request)
        });

        let session = auth
            .login(&Credentials::new("admin@example.com", "correct"))
            .await
            .unwrap();

        assert!(session.is_authenticated);
        assert!(session.user_profile.is_none());
        assert_eq!(session.role(), Role::Citizen);
        assert!(store.get(keys::USER_DATA).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_relogin_does_not_inherit_previous_role() {
        let (auth, _, store) = service(|request: &ApiRequest| {
            if request.url.ends_with(PROFILE_PATH) {
                return Ok(Response::new(500, Default::default(), Vec::new()));
            }
            backend(request)
        });
        store.set(keys::IS_AUTHENTICATED, "true").unwrap();
        store
            .set(keys::USER_DATA, r#"{"role":"admin","email":"admin@x"}"#)
            .unwrap();

        let session = auth
            .login(&Credentials::new("citizen@example.com", "correct"))
            .await
            .unwrap();

        assert_eq!(session.role(), Role::Citizen);
        assert!(session.user_profile.is_none());
        assert_eq!(auth.session().load().unwrap().role(), Role::Citizen);
    }

    #[tokio::test]
    async fn test_register() {
        let (auth, transport, store) = service(backend);

        let record = auth
            .register(&Registration::new("new@example.com", "pw", "Ana", "Cruz"))
            .await
            .unwrap();
        assert_eq!(record.message.as_deref(), Some("User created successfully"));
        assert_eq!(record.role.as_deref(), Some("CITIZEN"));
        assert_eq!(transport.requests()[0].bearer_token(), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_field_error() {
        let (auth, _, _) = service(backend);

        let err = auth
            .register(&Registration::new("taken@example.com", "pw", "Ana", "Cruz"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "email: custom user with this email already exists."
        );
        assert_eq!(
            err.payload().unwrap()["email"][0],
            "custom user with this email already exists."
        );
    }

    #[tokio::test]
    async fn test_logout_clears_session_keys_only() {
        let (auth, transport, store) = service(backend);
        auth.login(&Credentials::new("admin@example.com", "correct"))
            .await
            .unwrap();
        store.set("theme", "dark").unwrap();

        auth.logout();

        assert_eq!(store.keys().unwrap(), vec!["theme".to_string()]);
        assert_eq!(auth.session().load().unwrap(), Session::anonymous());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_profile_when_signed_out_expires_session() {
        let (auth, transport, _) = service(backend);

        let err = auth.get_user_profile().await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(transport.calls(DEFAULT_REFRESH_PATH), 0);
    }
}
