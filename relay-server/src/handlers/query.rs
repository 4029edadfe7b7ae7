//! Query handlers
//!
//! Handles: history, users. Replies go to the requester only and are never
//! recorded.

use tracing::debug;

use crate::notice;
use super::{HandlerContext, HandlerResult};

impl HandlerContext {
    /// Replay the cached history, oldest first
    pub fn handle_history(&self) -> HandlerResult {
        let lines: Vec<String> = self.broadcaster.history().snapshot().collect();
        debug!("History request from {}: {} entries", self.session_id, lines.len());
        HandlerResult::Reply(lines)
    }

    /// List the display names of every registered session
    pub fn handle_users(&self) -> HandlerResult {
        let names = self.registry.names();
        debug!("Users request from {}: {} sessions", self.session_id, names.len());
        HandlerResult::Reply(vec![notice::roster(&names).to_line()])
    }
}
