use crate::protocol::{ProtocolSession, SessionConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{info, warn};

/// Reconnect delay schedule: doubles after each failed attempt up to a
/// ceiling, resets to the initial delay after a successful connect.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    fn next(&self, current: Duration) -> Duration {
        (current * 2).min(self.max)
    }
}

struct SessionSlot {
    /// Bumped on every successful connect. Lets a caller that observed a
    /// fault tell whether someone else already replaced the session.
    generation: u64,
    session: Option<Arc<ProtocolSession>>,
}

/// Keeps a logical stream alive across transient connection faults.
///
/// Single writer for the current session: both client paths read the
/// slot before each operation, only the supervisor replaces it. Retries
/// are never abandoned due to count — only a shutdown signal stops them.
pub struct ReconnectSupervisor {
    endpoint: String,
    session_config: SessionConfig,
    policy: BackoffPolicy,
    slot: RwLock<SessionSlot>,
    reconnect_lock: Mutex<()>,
    stop: watch::Receiver<bool>,
}

impl ReconnectSupervisor {
    pub fn new(
        endpoint: String,
        session_config: SessionConfig,
        policy: BackoffPolicy,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            endpoint,
            session_config,
            policy,
            slot: RwLock::new(SessionSlot {
                generation: 0,
                session: None,
            }),
            reconnect_lock: Mutex::new(()),
            stop,
        }
    }

    /// The current session and its generation, if one is connected.
    pub async fn current(&self) -> Option<(u64, Arc<ProtocolSession>)> {
        let slot = self.slot.read().await;
        slot.session
            .as_ref()
            .map(|session| (slot.generation, session.clone()))
    }

    /// Establish the initial session. The first attempt is immediate;
    /// failures then follow the backoff schedule. Returns `None` only if
    /// shutdown was signalled first.
    pub async fn start(&self) -> Option<(u64, Arc<ProtocolSession>)> {
        match ProtocolSession::connect(&self.endpoint, &self.session_config).await {
            Ok(session) => Some(self.publish(session).await),
            Err(err) => {
                warn!("Connection failed: {}", err);
                self.backoff_connect().await
            }
        }
    }

    /// Replace a session observed faulted at `failed_generation`.
    ///
    /// Concurrent callers are serialized; if another caller already
    /// published a newer session, it is returned without reconnecting.
    /// Returns `None` only on shutdown.
    pub async fn reconnect(&self, failed_generation: u64) -> Option<(u64, Arc<ProtocolSession>)> {
        let _guard = self.reconnect_lock.lock().await;

        {
            let slot = self.slot.read().await;
            if slot.generation > failed_generation {
                if let Some(session) = &slot.session {
                    return Some((slot.generation, session.clone()));
                }
            }
        }

        // Drop the faulted session before dialing a new one; chunks sent
        // during the outage are dropped, not buffered.
        let old = { self.slot.write().await.session.take() };
        if let Some(old) = old {
            old.close().await;
        }

        self.backoff_connect().await
    }

    async fn backoff_connect(&self) -> Option<(u64, Arc<ProtocolSession>)> {
        let mut stop = self.stop.clone();
        let mut delay = self.policy.initial;

        loop {
            if *stop.borrow() {
                return None;
            }

            info!("Reconnecting in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return None;
                    }
                    continue;
                }
            }

            match ProtocolSession::connect(&self.endpoint, &self.session_config).await {
                Ok(session) => return Some(self.publish(session).await),
                Err(err) => {
                    warn!("Reconnect failed: {}", err);
                    delay = self.policy.next(delay);
                }
            }
        }
    }

    async fn publish(&self, session: ProtocolSession) -> (u64, Arc<ProtocolSession>) {
        let session = Arc::new(session);
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.session = Some(session.clone());
        (slot.generation, session)
    }
}
