//! Message handlers for client requests
//!
//! Routes each decoded `ClientRequest` to its handler. Handlers decide what
//! should go out as a [`HandlerResult`]; [`HandlerContext::dispatch`] then
//! carries it out through the broadcaster.

mod chat;
mod query;

use std::sync::Arc;

use tracing::{debug, info};

use relay_protocol::{ClientRequest, ServerMessage};

use crate::broadcast::Broadcaster;
use crate::observability::Metrics;
use crate::registry::{SessionId, SessionRegistry};

/// Context for message handlers
///
/// Provides access to the shared state needed to handle one session's
/// requests.
pub struct HandlerContext {
    /// Session registry, for names and rosters
    pub registry: Arc<SessionRegistry>,
    /// Broadcast engine (also owns the history cache)
    pub broadcaster: Arc<Broadcaster>,
    /// The session making this request
    pub session_id: SessionId,
}

/// Result of handling a request
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// Broadcast to all sessions except `exclude`, recorded in history
    Broadcast {
        message: ServerMessage,
        exclude: Option<SessionId>,
    },
    /// Lines sent to the requester only, not recorded
    Reply(Vec<String>),
    /// Nothing goes out
    NoResponse,
}

impl HandlerContext {
    /// Create a new handler context
    pub fn new(broadcaster: Arc<Broadcaster>, session_id: SessionId) -> Self {
        Self {
            registry: Arc::clone(broadcaster.registry()),
            broadcaster,
            session_id,
        }
    }

    /// Route a client request to the appropriate handler
    pub fn route_message(&self, request: ClientRequest) -> HandlerResult {
        Metrics::global().record_request(request.tag());

        match request {
            ClientRequest::Message { data } => self.handle_message(data),
            ClientRequest::SetName { name } => self.handle_set_name(name),
            ClientRequest::History => self.handle_history(),
            ClientRequest::Users => self.handle_users(),
            ClientRequest::Unknown(value) => self.handle_unknown(value),
        }
    }

    /// Route a request and carry out the result
    pub async fn dispatch(&self, request: ClientRequest) {
        let result = self.route_message(request);
        self.apply(result).await;
    }

    /// Carry out a handler result
    pub async fn apply(&self, result: HandlerResult) {
        match result {
            HandlerResult::Broadcast { message, exclude } => {
                self.broadcaster.broadcast(&message, exclude, true).await;
            }
            HandlerResult::Reply(lines) => {
                for line in lines {
                    if !self
                        .broadcaster
                        .send_direct(self.session_id, line, false)
                        .await
                    {
                        debug!("Reply to {} abandoned, session gone", self.session_id);
                        break;
                    }
                }
            }
            HandlerResult::NoResponse => {}
        }
    }

    /// Current display name of the requesting session
    pub(crate) fn requester_name(&self) -> String {
        self.registry
            .get(self.session_id)
            .map(|s| s.name)
            .unwrap_or_default()
    }

    /// Unrecognized or malformed input: observed, never answered
    fn handle_unknown(&self, value: serde_json::Value) -> HandlerResult {
        Metrics::global().record_unknown_request();
        info!("({}): {}", self.requester_name(), value);
        HandlerResult::NoResponse
    }
}
