// ── Session manager ──
//
// Process-wide registry of running pollers keyed by dashboard name.
// The registry lock guards only map operations; it is never held across
// poller I/O or joins.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dashboard::Dashboard;
use crate::engine::poller::Poller;
use crate::engine::snapshot::{SessionInfo, Snapshot};
use crate::engine::stream::EventStream;
use crate::error::CoreError;
use crate::identity::Provider;
use flowatch_snmp::SnmpConnector;

struct Session {
    poller: Arc<Poller>,
    handle: JoinHandle<()>,
}

/// Coordinates one [`Poller`] per dashboard.
pub struct SessionManager {
    connector: Arc<dyn SnmpConnector>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn SnmpConnector>) -> Self {
        Self {
            connector,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Validate the dashboard, create its poller, and launch it.
    pub async fn start(
        &self,
        mut dash: Dashboard,
        provider: Arc<dyn Provider>,
    ) -> Result<(), CoreError> {
        dash.normalize();
        dash.validate()?;

        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&dash.name) {
            return Err(CoreError::SessionExists {
                name: dash.name.clone(),
            });
        }

        let name = dash.name.clone();
        let poller = Arc::new(Poller::new(dash, provider, Arc::clone(&self.connector)));
        let handle = tokio::spawn(Arc::clone(&poller).run());
        sessions.insert(name.clone(), Session { poller, handle });

        info!(session = %name, "session started");
        Ok(())
    }

    /// Stop the named session and wait for its loop to acknowledge.
    pub async fn stop(&self, name: &str) -> Result<(), CoreError> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions.remove(name).ok_or_else(|| CoreError::SessionNotFound {
                name: name.to_string(),
            })?
        };

        session.poller.stop();
        let _ = session.handle.await;
        info!(session = %name, "session stopped");
        Ok(())
    }

    /// Point-in-time snapshot of the named session.
    pub async fn snapshot(&self, name: &str) -> Result<Snapshot, CoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(name)
            .map(|session| session.poller.snapshot())
            .ok_or_else(|| CoreError::SessionNotFound {
                name: name.to_string(),
            })
    }

    /// Subscribe to the named session's poll-cycle events. The stream
    /// delivers at most the latest event; slow consumers lose
    /// intermediate events, never block the poller.
    pub async fn subscribe(&self, name: &str) -> Result<EventStream, CoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(name)
            .map(|session| session.poller.subscribe())
            .ok_or_else(|| CoreError::SessionNotFound {
                name: name.to_string(),
            })
    }

    /// Summary info for every running session, ordered by name.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.lock().await;
        let mut infos: Vec<SessionInfo> = sessions
            .values()
            .map(|session| session.poller.info())
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Stop every session and wait for each. Cancellation is signalled to
    /// all pollers before any join, so the waits overlap.
    pub async fn stop_all(&self) {
        let drained: Vec<(String, Session)> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain().collect()
        };

        for (_, session) in &drained {
            session.poller.stop();
        }
        for (name, session) in drained {
            let _ = session.handle.await;
            debug!(session = %name, "session joined");
        }
    }
}
