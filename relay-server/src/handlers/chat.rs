//! Chat handlers
//!
//! Handles: message, set-name

use tracing::info;

use relay_protocol::ServerMessage;

use crate::notice;
use super::{HandlerContext, HandlerResult};

impl HandlerContext {
    /// Relay a chat message to everyone but the sender
    pub fn handle_message(&self, data: String) -> HandlerResult {
        let source = self.requester_name();
        info!("{}: {}", source, data);

        HandlerResult::Broadcast {
            message: ServerMessage::from_session(source, data),
            exclude: Some(self.session_id),
        }
    }

    /// Rename the sender and announce it to everyone, sender included
    pub fn handle_set_name(&self, name: String) -> HandlerResult {
        let Some(old) = self.registry.rename(self.session_id, name.clone()) else {
            return HandlerResult::NoResponse;
        };

        let message = notice::renamed(&old, &name);
        info!("{}", message.message());

        HandlerResult::Broadcast {
            message,
            exclude: None,
        }
    }
}
