use serde::Serialize;

use crate::model::Termination;

/// Structured record of one finalized turn.
/// Every turn produces exactly one, whatever path ended it.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TurnReport {
    /// Conversation the turn streamed into.
    pub conversation_id: Option<String>,

    /// Message the partial updates were applied to.
    pub message_id: Option<String>,

    /// Model identifier the caller asked for.
    pub model: Option<String>,

    /// Origin label reported by the stream's metadata packet, if any.
    pub origin_label: Option<String>,

    /// How the turn ended: completed, cancelled, or failed.
    pub termination: Option<Termination>,

    /// Characters of reply text held at finalization.
    pub chars_streamed: Option<u64>,

    /// Elapsed time from dispatch to finalization in milliseconds.
    pub latency_ms: Option<u64>,

    /// Optional error metadata for absorbed transport failures.
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

impl TurnReport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn conversation_id(mut self, v: &str) -> Self {
        self.conversation_id = Some(v.to_string());
        self
    }
    pub fn message_id(mut self, v: &str) -> Self {
        self.message_id = Some(v.to_string());
        self
    }
    pub fn model(mut self, v: &str) -> Self {
        self.model = Some(v.to_string());
        self
    }
    pub fn origin_label_opt(mut self, v: Option<&str>) -> Self {
        self.origin_label = v.map(|s| s.to_string());
        self
    }
    pub fn termination(mut self, v: Termination) -> Self {
        self.termination = Some(v);
        self
    }
    pub fn chars_streamed(mut self, v: u64) -> Self {
        self.chars_streamed = Some(v);
        self
    }
    pub fn latency_ms(mut self, v: u64) -> Self {
        self.latency_ms = Some(v);
        self
    }
    pub fn error_kind(mut self, v: &str) -> Self {
        self.error_kind = Some(v.to_string());
        self
    }
    pub fn error_message(mut self, v: &str) -> Self {
        self.error_message = Some(v.to_string());
        self
    }
}
