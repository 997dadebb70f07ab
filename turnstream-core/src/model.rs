use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, TurnStreamError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// History entry as the upstream call sees it: role + content, nothing else.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Opaque identifiers naming the message a turn streams into.
/// Immutable for the lifetime of the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TurnTarget {
    pub conversation_id: String,
    pub message_id: String,
}

/// The optional structured record prepended to a reply stream,
/// delimited by its first top-level closing brace. Any JSON object is
/// accepted; the origin label itself may be missing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetadataPacket {
    pub model: Option<String>,
}

/// Partial-state record handed to the message sink. Absent fields mean
/// "unchanged"; serialized keys match the wire names consumers expect.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress: Option<bool>,
}

impl MessageUpdate {
    pub fn origin(label: impl Into<String>) -> Self {
        MessageUpdate {
            origin_label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        MessageUpdate {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// The one update that turns the in-progress indicator off.
    pub fn finalized() -> Self {
        MessageUpdate {
            in_progress: Some(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeakPolicy {
    Off,
    FirstParagraph,
}

impl Default for SpeakPolicy {
    fn default() -> Self {
        SpeakPolicy::Off
    }
}

/// Sampling options as resolved from model configuration. All three are
/// required before dispatch; `resolve` is the fail-fast gate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ModelOptions {
    pub model_ref: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl ModelOptions {
    pub fn resolve(&self, model_id: &str) -> CoreResult<ResolvedOptions> {
        match (&self.model_ref, self.temperature, self.max_output_tokens) {
            (Some(model_ref), Some(temperature), Some(max_output_tokens)) => {
                Ok(ResolvedOptions {
                    model_ref: model_ref.clone(),
                    temperature,
                    max_output_tokens,
                })
            }
            _ => Err(TurnStreamError::Config(format!(
                "options for model {model_id} are incomplete \
                 (model_ref, temperature and max_output_tokens are required)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub model_ref: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Upstream API access settings forwarded verbatim inside the request
/// body. Keys stay wrapped until the serialization boundary.
#[derive(Debug, Clone, Default)]
pub struct ApiAccess {
    pub host: Option<String>,
    pub key: Option<SecretString>,
    pub org_id: Option<String>,
    pub routing_key: Option<SecretString>,
}

/// Everything one turn needs: where the reply lands, what to ask the
/// model, and the per-turn speech policy.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub target: TurnTarget,
    pub model_id: String,
    pub options: ModelOptions,
    pub history: Vec<ChatMessage>,
    pub access: ApiAccess,
    pub speak: SpeakPolicy,
}

/// How a turn ended. `Failed` is still a clean finalize; the error text
/// travels through the report sink, not the return path.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Completed,
    Cancelled,
    Failed,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Completed => "completed",
            Termination::Cancelled => "cancelled",
            Termination::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub termination: Termination,
    pub text: String,
    pub origin_label: Option<String>,
}
