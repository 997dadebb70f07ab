use async_trait::async_trait;

use crate::model::{MessageUpdate, TurnTarget};

/// Consumer of incremental message state.
///
/// The driver applies updates in arrival order and awaits each one, so
/// implementations see a monotonic sequence: optional origin label,
/// cumulative text per chunk, then exactly one `in_progress = false`.
/// The `touch` flag is part of the callback shape for consumers that
/// re-sort on edit; this core always passes false.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn apply(&self, target: &TurnTarget, update: MessageUpdate, touch: bool);
}

/// A sink that drops every update.
/// Useful for tests or as a placeholder.
pub struct NullSink;

#[async_trait]
impl MessageSink for NullSink {
    async fn apply(&self, _target: &TurnTarget, _update: MessageUpdate, _touch: bool) {}
}
