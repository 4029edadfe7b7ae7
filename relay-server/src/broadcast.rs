//! Broadcast engine
//!
//! Fans serialized lines out to registered sessions, recording them in the
//! history cache. A session whose connection is gone is removed and a
//! disconnect notice for it is broadcast in turn.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use relay_protocol::ServerMessage;

use crate::history::HistoryCache;
use crate::notice;
use crate::observability::Metrics;
use crate::registry::{Session, SessionId, SessionRegistry};

/// One queued fan-out
struct Pending {
    payload: String,
    exclude: Option<SessionId>,
    record: bool,
}

/// Delivers lines to sessions and keeps the history
pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
    history: Arc<HistoryCache>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>, history: Arc<HistoryCache>) -> Self {
        Self { registry, history }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &Arc<HistoryCache> {
        &self.history
    }

    /// Broadcast an envelope to every session except `exclude`
    ///
    /// Returns the number of sessions the line was delivered to, counting
    /// any disconnect notices this broadcast caused.
    pub async fn broadcast(
        &self,
        message: &ServerMessage,
        exclude: Option<SessionId>,
        record_in_history: bool,
    ) -> usize {
        self.broadcast_line(message.to_line(), exclude, record_in_history)
            .await
    }

    /// Broadcast a pre-serialized line
    ///
    /// Recipients are taken from a registry snapshot, so sessions joining or
    /// leaving mid-broadcast never disturb the iteration. Failed recipients
    /// are removed after the current fan-out and their disconnect notices are
    /// queued behind it.
    pub async fn broadcast_line(
        &self,
        payload: String,
        exclude: Option<SessionId>,
        record_in_history: bool,
    ) -> usize {
        let mut queue = VecDeque::from([Pending {
            payload,
            exclude,
            record: record_in_history,
        }]);
        let mut delivered = 0;

        while let Some(Pending {
            payload,
            exclude,
            record,
        }) = queue.pop_front()
        {
            if record {
                self.history.record(payload.clone());
            }
            Metrics::global().record_broadcast();

            let recipients: Vec<Session> = self
                .registry
                .list()
                .into_iter()
                .filter(|s| Some(s.id) != exclude)
                .collect();

            debug!(
                "Broadcasting to {} sessions (except {:?})",
                recipients.len(),
                exclude
            );

            for session in recipients {
                if deliver(&session, payload.clone()).await {
                    delivered += 1;
                } else if let Some(gone) = self.condemn(session.id) {
                    queue.push_back(Pending {
                        payload: notice::disconnected(&gone.name).to_line(),
                        exclude: None,
                        record: true,
                    });
                }
            }
        }

        delivered
    }

    /// Send a line to a single session
    ///
    /// Same history and failure rules as a broadcast. Returns `false` if the
    /// session is unknown or its connection is gone.
    pub async fn send_direct(
        &self,
        session_id: SessionId,
        payload: String,
        record_in_history: bool,
    ) -> bool {
        let Some(session) = self.registry.get(session_id) else {
            return false;
        };

        if record_in_history {
            self.history.record(payload.clone());
        }

        if deliver(&session, payload).await {
            return true;
        }

        if let Some(gone) = self.condemn(session_id) {
            self.broadcast(&notice::disconnected(&gone.name), None, true)
                .await;
        }
        false
    }

    /// Remove a session whose connection ended and announce it
    ///
    /// Safe to call from several paths for the same session: only the call
    /// that actually removes it broadcasts the notice. Returns whether this
    /// call did the removal.
    pub async fn disconnect(&self, session_id: SessionId) -> bool {
        let Some(gone) = self.registry.remove(session_id) else {
            debug!("{} already removed", session_id);
            return false;
        };

        Metrics::global().record_session_closed();
        info!("Session disconnected: {} ({})", gone.name, session_id);

        let name = gone.name.clone();
        // Close the connection handle before telling the others
        drop(gone);

        self.broadcast(&notice::disconnected(&name), None, true)
            .await;
        true
    }

    /// Drop a session after a failed delivery
    fn condemn(&self, session_id: SessionId) -> Option<Session> {
        let gone = self.registry.remove(session_id)?;
        Metrics::global().record_session_closed();
        warn!(
            "Delivery to {} ({}) failed, removing session",
            gone.name, session_id
        );
        Some(gone)
    }
}

async fn deliver(session: &Session, payload: String) -> bool {
    match session.handle.send(payload).await {
        Ok(()) => {
            Metrics::global().record_delivery();
            true
        }
        Err(_) => {
            Metrics::global().record_delivery_failure();
            false
        }
    }
}
