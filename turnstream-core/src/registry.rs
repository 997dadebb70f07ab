//! Conversation-keyed registry of live turns.
//!
//! Maps conversation id → the cancellation token of the turn currently
//! streaming into it. The stop action and the driver share a registry
//! by explicit injection; there is deliberately no process-global
//! instance.

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct TurnRegistry {
    live: DashMap<String, CancellationToken>,
}

impl TurnRegistry {
    pub fn new() -> Self {
        TurnRegistry {
            live: DashMap::new(),
        }
    }

    /// Mints the token for a starting turn and stores it under the
    /// conversation id, replacing any stale entry for that key.
    pub fn begin(&self, conversation_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        self.live
            .insert(conversation_id.to_string(), token.clone());
        token
    }

    /// Signals the live turn for this conversation, if any. Returns
    /// true only when this call did the stopping: a second press, or a
    /// press with no turn in flight, is a no-op.
    pub fn stop(&self, conversation_id: &str) -> bool {
        match self.live.get(conversation_id) {
            Some(entry) if !entry.is_cancelled() => {
                entry.cancel();
                true
            }
            _ => false,
        }
    }

    /// Removes the entry once its turn has finalized. A cleared key
    /// means "no turn in flight, nothing to stop."
    pub fn clear(&self, conversation_id: &str) {
        self.live.remove(conversation_id);
    }

    pub fn is_live(&self, conversation_id: &str) -> bool {
        self.live.contains_key(conversation_id)
    }
}
