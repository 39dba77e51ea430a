//! Shared session context.

use std::sync::{Arc, Mutex, MutexGuard};

use sagip_store::Store;
use tracing::{debug, info, warn};

use crate::session::{keys, Session, TokenPair};
use crate::{SessionError, UserProfile};

const TRUE: &str = "true";

/// Handle to the one session of this client.
///
/// Cloning is cheap and every clone sees the same state. Each operation
/// takes the context lock for its whole read-modify-write, so a token
/// refresh cannot interleave with a logout.
///
/// # Example
///
/// ```rust,ignore
/// use sagip_session::{SessionContext, TokenPair};
/// use sagip_store::{MemoryStore, Store};
///
/// let ctx = SessionContext::new(Store::new(MemoryStore::new()));
/// ctx.begin(&TokenPair::new("access", "refresh"))?;
///
/// let session = ctx.load()?;
/// assert!(session.is_authenticated);
///
/// ctx.clear();
/// ```
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    store: Store,
    lock: Mutex<()>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Create a context over a store.
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                lock: Mutex::new(()),
            }),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no torn state.
        self.inner.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot the current session.
    pub fn load(&self) -> Result<Session, SessionError> {
        let _guard = self.guard();
        self.read()
    }

    fn read(&self) -> Result<Session, SessionError> {
        let store = &self.inner.store;
        let is_authenticated = store.get(keys::IS_AUTHENTICATED)?.as_deref() == Some(TRUE);

        let user_profile = match store.get_json::<UserProfile>(keys::USER_DATA) {
            Ok(profile) => profile,
            Err(sagip_store::StoreError::Serialization(e)) => {
                warn!(error = %e, "ignoring unreadable stored profile");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Session {
            is_authenticated,
            access_token: store.get(keys::ACCESS_TOKEN)?,
            refresh_token: store.get(keys::REFRESH_TOKEN)?,
            user_profile,
        })
    }

    fn write(&self, session: &Session) -> Result<(), SessionError> {
        let store = &self.inner.store;

        match &session.access_token {
            Some(token) => store.set(keys::ACCESS_TOKEN, token)?,
            None => store.remove(keys::ACCESS_TOKEN)?,
        }
        match &session.refresh_token {
            Some(token) => store.set(keys::REFRESH_TOKEN, token)?,
            None => store.remove(keys::REFRESH_TOKEN)?,
        }
        if session.is_authenticated {
            store.set(keys::IS_AUTHENTICATED, TRUE)?;
        } else {
            store.remove(keys::IS_AUTHENTICATED)?;
        }
        match &session.user_profile {
            Some(profile) => store.set_json(keys::USER_DATA, profile)?,
            None => store.remove(keys::USER_DATA)?,
        }
        Ok(())
    }

    /// Start a session from a freshly issued token pair.
    ///
    /// Any cached profile belongs to the previous sign-in and is dropped.
    pub fn begin(&self, tokens: &TokenPair) -> Result<Session, SessionError> {
        let _guard = self.guard();
        let store = &self.inner.store;

        store.remove(keys::USER_DATA)?;
        store.set(keys::ACCESS_TOKEN, &tokens.access)?;
        match &tokens.refresh {
            Some(refresh) => store.set(keys::REFRESH_TOKEN, refresh)?,
            None => store.remove(keys::REFRESH_TOKEN)?,
        }
        store.set(keys::IS_AUTHENTICATED, TRUE)?;

        info!("session started");
        self.read()
    }

    /// Cache the user profile.
    pub fn set_profile(&self, profile: &UserProfile) -> Result<(), SessionError> {
        let _guard = self.guard();
        self.inner.store.set_json(keys::USER_DATA, profile)?;
        debug!(role = %profile.role, "stored user profile");
        Ok(())
    }

    /// Current access token.
    pub fn access_token(&self) -> Result<Option<String>, SessionError> {
        let _guard = self.guard();
        Ok(self.inner.store.get(keys::ACCESS_TOKEN)?)
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Result<Option<String>, SessionError> {
        let _guard = self.guard();
        Ok(self.inner.store.get(keys::REFRESH_TOKEN)?)
    }

    /// Store tokens returned by a refresh.
    ///
    /// The refresh token is only replaced when the server rotated it.
    pub fn replace_tokens(&self, tokens: &TokenPair) -> Result<(), SessionError> {
        let _guard = self.guard();
        let store = &self.inner.store;

        store.set(keys::ACCESS_TOKEN, &tokens.access)?;
        if let Some(refresh) = &tokens.refresh {
            store.set(keys::REFRESH_TOKEN, refresh)?;
        }
        debug!(rotated = tokens.refresh.is_some(), "replaced access token");
        Ok(())
    }

    /// Read-modify-write the whole session under the lock.
    pub fn update<F>(&self, f: F) -> Result<Session, SessionError>
    where
        F: FnOnce(&mut Session),
    {
        let _guard = self.guard();
        let mut session = self.read()?;
        f(&mut session);
        self.write(&session)?;
        Ok(session)
    }

    /// Remove the four session keys.
    ///
    /// Other keys in the store are left alone. Store failures are logged
    /// and the remaining keys are still attempted.
    pub fn clear(&self) {
        let _guard = self.guard();
        for key in keys::ALL {
            if let Err(e) = self.inner.store.remove(key) {
                warn!(key, error = %e, "failed to remove session key");
            }
        }
        info!("session cleared");
    }
}
