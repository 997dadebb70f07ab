/// Span/Log attribute keys for turn lifecycle records.
/// Keep these stable; changing them is a breaking change for dashboards.
pub const KEY_CONVERSATION_ID: &str = "conv.id";
pub const KEY_MESSAGE_ID: &str = "msg.id";
pub const KEY_MODEL: &str = "llm.model";
pub const KEY_ORIGIN_LABEL: &str = "llm.origin";

pub const KEY_TERMINATION: &str = "turn.termination";
pub const KEY_CHARS_STREAMED: &str = "turn.chars";
pub const KEY_LATENCY_MS: &str = "latency.ms";

/// Error-related (if applicable)
pub const KEY_ERROR_KIND: &str = "error.kind";
pub const KEY_ERROR_MESSAGE: &str = "error.message";
