//! PIN-gated session with a single armed expiry task.
//!
//! The PIN is a shared-secret gate, not a credential. The stored blob is
//! base64-obscured JSON; obscured, not encrypted, so never a security
//! boundary. Validity requires the token to still be in the allow-list,
//! which invalidates old sessions when the list rotates.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{error::PortalError, storage::SessionStorage};

pub const VALID_PINS: [&str; 3] = ["123456", "654321", "99001199"];

/// Default session lifetime.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeReason {
    Expired,
    Logout,
    Invalid,
}

impl RevokeReason {
    /// Shown on the locked screen after the session ends.
    pub fn message(self) -> &'static str {
        match self {
            RevokeReason::Expired => "La sesión expiró. Ingresa el PIN nuevamente.",
            RevokeReason::Logout => "Sesión cerrada.",
            RevokeReason::Invalid => "Sesión no válida. Ingresa el PIN nuevamente.",
        }
    }
}

struct SessionState {
    session: Option<Session>,
    // at most one armed expiry task; re-arming aborts the previous one
    expiry_task: Option<JoinHandle<()>>,
    last_revocation: Option<RevokeReason>,
}

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    allowed: Arc<Vec<String>>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_allowed(storage, VALID_PINS.iter().map(|pin| pin.to_string()).collect())
    }

    pub fn with_allowed(storage: Arc<dyn SessionStorage>, allowed: Vec<String>) -> Self {
        Self {
            storage,
            allowed: Arc::new(allowed),
            state: Arc::new(Mutex::new(SessionState {
                session: None,
                expiry_task: None,
                last_revocation: None,
            })),
        }
    }

    /// Creates a session for `lifetime` if `pin` is allowed, persisting it
    /// and (re)arming the expiry task.
    pub fn issue(&self, pin: &str, lifetime: Duration) -> Result<(), PortalError> {
        if !self.allowed.iter().any(|allowed| allowed == pin) {
            return Err(PortalError::InvalidCredential);
        }

        let now = Utc::now();
        let session = Session {
            token: pin.to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::milliseconds(lifetime.as_millis() as i64),
        };

        self.storage.write(&encode(&session));

        let mut state = self.state.lock().unwrap();
        state.session = Some(session);
        state.last_revocation = None;
        if let Some(task) = state.expiry_task.take() {
            task.abort();
        }
        state.expiry_task = Some(self.arm_expiry(lifetime));

        info!("session issued for {lifetime:?}");
        Ok(())
    }

    /// True iff a session exists, is unexpired and its token is still in
    /// the allow-list.
    pub fn is_valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        match &state.session {
            Some(session) => {
                Utc::now() < session.expires_at
                    && self.allowed.iter().any(|allowed| *allowed == session.token)
            }
            None => false,
        }
    }

    /// Clears the session and cancels any pending expiry task.
    pub fn revoke(&self, reason: RevokeReason) {
        let mut state = self.state.lock().unwrap();
        state.session = None;
        state.last_revocation = Some(reason);
        if let Some(task) = state.expiry_task.take() {
            task.abort();
        }
        drop(state);

        self.storage.clear();
        info!("session revoked: {}", reason.message());
    }

    /// Time left, zero when absent or already expired. Display only.
    pub fn remaining_time(&self) -> Duration {
        let state = self.state.lock().unwrap();
        match &state.session {
            Some(session) => (session.expires_at - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    pub fn last_revocation(&self) -> Option<RevokeReason> {
        self.state.lock().unwrap().last_revocation
    }

    /// Hydrates from storage. Malformed, expired or no-longer-allowed blobs
    /// are cleared and treated as absent.
    pub fn restore(&self) -> bool {
        let Some(blob) = self.storage.read() else {
            return false;
        };

        match decode(&blob) {
            Some(session)
                if Utc::now() < session.expires_at
                    && self.allowed.iter().any(|allowed| *allowed == session.token) =>
            {
                let remaining = (session.expires_at - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::ZERO);

                let mut state = self.state.lock().unwrap();
                state.session = Some(session);
                state.last_revocation = None;
                if let Some(task) = state.expiry_task.take() {
                    task.abort();
                }
                state.expiry_task = Some(self.arm_expiry(remaining));

                true
            }
            _ => {
                warn!("Stored session malformed or stale, clearing");
                self.storage.clear();
                false
            }
        }
    }

    fn arm_expiry(&self, lifetime: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            store.revoke(RevokeReason::Expired);
        })
    }
}

fn encode(session: &Session) -> String {
    STANDARD.encode(serde_json::to_vec(session).unwrap_or_default())
}

fn decode(blob: &str) -> Option<Session> {
    let bytes = STANDARD.decode(blob.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn unknown_pin_is_rejected_and_nothing_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        let result = store.issue("000000", SESSION_LIFETIME);

        assert!(matches!(result, Err(PortalError::InvalidCredential)));
        assert!(!store.is_valid());
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn issued_session_is_valid_and_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        store.issue("123456", SESSION_LIFETIME).unwrap();

        assert!(store.is_valid());
        assert!(store.remaining_time() > Duration::ZERO);

        let session = decode(&storage.read().unwrap()).unwrap();
        assert_eq!(session.token, "123456");
        assert!(session.expires_at > session.created_at);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_task_revokes_the_session() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        store.issue("123456", Duration::from_secs(60)).unwrap();
        assert!(store.is_valid());

        // paused clock auto-advances: the expiry task fires at t=60
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(!store.is_valid());
        assert_eq!(store.last_revocation(), Some(RevokeReason::Expired));
        assert!(storage.read().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reissuing_disarms_the_previous_expiry_task() {
        let store = store();

        store.issue("123456", Duration::from_secs(60)).unwrap();
        store.issue("654321", Duration::from_secs(3600)).unwrap();

        // past the first lifetime, within the second
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(store.is_valid());
        assert_eq!(store.last_revocation(), None);
    }

    #[tokio::test]
    async fn revoke_clears_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());

        store.issue("123456", SESSION_LIFETIME).unwrap();
        store.revoke(RevokeReason::Logout);

        assert!(!store.is_valid());
        assert_eq!(store.remaining_time(), Duration::ZERO);
        assert_eq!(store.last_revocation(), Some(RevokeReason::Logout));
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn restore_rejects_malformed_blob_and_clears_it() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write("esto no es base64 válido!!");

        let store = SessionStore::new(storage.clone());

        assert!(!store.restore());
        assert!(!store.is_valid());
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn restore_accepts_a_live_session() {
        let storage = Arc::new(MemoryStorage::new());
        let now = Utc::now();
        storage.write(&encode(&Session {
            token: "123456".into(),
            created_at: now,
            expires_at: now + chrono::Duration::minutes(10),
        }));

        let store = SessionStore::new(storage);

        assert!(store.restore());
        assert!(store.is_valid());
    }

    #[tokio::test]
    async fn restore_rejects_expired_session() {
        let storage = Arc::new(MemoryStorage::new());
        let now = Utc::now();
        storage.write(&encode(&Session {
            token: "123456".into(),
            created_at: now - chrono::Duration::hours(2),
            expires_at: now - chrono::Duration::hours(1),
        }));

        let store = SessionStore::new(storage.clone());

        assert!(!store.restore());
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn restore_rejects_token_no_longer_allowed() {
        let storage = Arc::new(MemoryStorage::new());
        let now = Utc::now();
        storage.write(&encode(&Session {
            token: "123456".into(),
            created_at: now,
            expires_at: now + chrono::Duration::minutes(10),
        }));

        let store = SessionStore::with_allowed(storage.clone(), vec!["999999".into()]);

        assert!(!store.restore());
        assert!(storage.read().is_none());
    }
}
