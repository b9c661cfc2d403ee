use crate::controllers::dashboard::DashboardState;
use crate::controllers::report::ReportState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_cookies::{Cookie, Cookies};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "portal_session";

/// Everything one browser sees across the dashboard and report pages.
#[derive(Debug, Default)]
pub struct ClientState {
    pub dashboard: DashboardState,
    pub report: ReportState,
}

struct SessionEntry {
    state: Arc<Mutex<ClientState>>,
    last_seen: Instant,
}

/// In-memory client states keyed by the session cookie. Nothing survives a
/// restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for the cookie's session, creating the session (and cookie) when
    /// missing or unknown.
    pub fn get_or_create(&self, cookies: &Cookies) -> Arc<Mutex<ClientState>> {
        let current = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());
        let (id, state, created) = self.resolve(current.as_deref());

        if created {
            let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
                .http_only(true)
                .path("/");
            cookies.add(cookie.into());
        }

        state
    }

    /// Looks up a session id, creating a new session when it is missing,
    /// malformed or expired. The flag tells whether a session was created.
    pub fn resolve(&self, session_id: Option<&str>) -> (Uuid, Arc<Mutex<ClientState>>, bool) {
        if let Some(id) = session_id.and_then(|v| Uuid::parse_str(v).ok()) {
            if let Some(entry) = self.sessions.write().get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, Arc::clone(&entry.state), false);
            }
        }

        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(ClientState::default()));
        self.sessions.write().insert(
            id,
            SessionEntry {
                state: Arc::clone(&state),
                last_seen: Instant::now(),
            },
        );
        debug!("New client session {}", id);

        (id, state, true)
    }

    /// Drops sessions idle for longer than `idle`. Returns how many went.
    pub fn prune(&self, idle: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < idle);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_same_state() {
        let store = SessionStore::new();

        let (id, first, created) = store.resolve(None);
        assert!(created);
        let (again, second, created) = store.resolve(Some(&id.to_string()));

        assert!(!created);
        assert_eq!(id, again);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_or_malformed_ids_get_fresh_sessions() {
        let store = SessionStore::new();

        let (id, _, created) = store.resolve(Some("not-a-uuid"));
        assert!(created);
        let stranger = Uuid::new_v4().to_string();
        let (other, _, created) = store.resolve(Some(&stranger));
        assert!(created);
        assert_ne!(other.to_string(), stranger);
        assert_ne!(id, other);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn prune_drops_idle_sessions() {
        let store = SessionStore::new();
        store.resolve(None);
        store.resolve(None);

        assert_eq!(store.prune(Duration::from_secs(3600)), 0);
        assert_eq!(store.prune(Duration::ZERO), 2);
        assert_eq!(store.len(), 0);
    }
}
