//! Turn lifecycle.
//!
//! `run_turn` owns one assistant turn end to end: validate, open the
//! reply stream, pump chunks through the session, finalize. Stream-time
//! failures never cross the return boundary; they pick the termination
//! and travel through the report sink. The only `Err` a caller sees is
//! a precondition failure raised before any state is touched.

use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{CoreResult, TurnStreamError};
use crate::http_client::{ByteStream, HttpClient};
use crate::model::{ChatMessage, MessageUpdate, Termination, TurnOutcome, TurnRequest};
use crate::normalize::{normalize_history, normalize_options};
use crate::registry::TurnRegistry;
use crate::session::StreamSession;
use crate::sink::MessageSink;
use crate::speech::SpeechSynthesizer;
use crate::telemetry::{self, TurnReport};

pub struct StreamDriver {
    http: HttpClient,
    endpoint: String,
    registry: Arc<TurnRegistry>,
    sink: Arc<dyn MessageSink>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl StreamDriver {
    pub fn new(
        http: HttpClient,
        endpoint: impl Into<String>,
        sink: Arc<dyn MessageSink>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            registry: Arc::new(TurnRegistry::new()),
            sink,
            speech,
        }
    }

    pub fn from_config(
        cfg: &Config,
        sink: Arc<dyn MessageSink>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> CoreResult<Self> {
        let http = HttpClient::from_cfg(&cfg.http)?;
        Ok(Self::new(http, cfg.upstream.endpoint.clone(), sink, speech))
    }

    /// Shared handle to the per-conversation cancellation registry.
    pub fn registry(&self) -> Arc<TurnRegistry> {
        Arc::clone(&self.registry)
    }

    /// Request cancellation of the live turn for a conversation.
    /// Returns true if this call did the stopping.
    pub fn stop_turn(&self, conversation_id: &str) -> bool {
        self.registry.stop(conversation_id)
    }

    /// Run one assistant turn to completion, cancellation, or failure.
    ///
    /// Whatever ends the stream, the message is finalized exactly once
    /// and the conversation's registry entry is cleared before this
    /// returns. An `Err` means the turn never started.
    pub async fn run_turn(&self, req: TurnRequest) -> CoreResult<TurnOutcome> {
        // Fail fast: incomplete options surface before any turn state exists.
        let resolved = req.options.resolve(&req.model_id)?;
        let resolved = normalize_options(resolved);
        let history = normalize_history(req.history);

        let target = req.target.clone();
        let mut session = StreamSession::new(req.target, req.speak);
        let token = self.registry.begin(&target.conversation_id);

        let payload = TurnWire {
            api: ApiWire {
                api_host: req.access.host.as_deref(),
                api_key: req.access.key.as_ref().map(|k| k.expose_secret()),
                api_organization_id: req.access.org_id.as_deref(),
                helicone_key: req.access.routing_key.as_ref().map(|k| k.expose_secret()),
            },
            model: &resolved.model_ref,
            messages: &history,
            temperature: resolved.temperature,
            max_tokens: resolved.max_output_tokens,
        };

        let started = Instant::now();
        // Nothing else observes the token until the first chunk, so the
        // dispatch await is raced against it too: a stop while the
        // upstream is still negotiating finalizes without waiting it out.
        let (termination, stream_error) = tokio::select! {
            biased;
            _ = token.cancelled() => {
                session.mark_cancelled();
                (Termination::Cancelled, None)
            }
            dispatched = self.http.post_stream(&self.endpoint, &payload) => match dispatched {
                Ok(stream) => self.pump(stream, &mut session, &token).await,
                Err(err) => {
                    tracing::warn!(
                        conversation = %target.conversation_id,
                        error = %err,
                        "turn dispatch failed"
                    );
                    (Termination::Failed, Some(err))
                }
            },
        };

        self.sink
            .apply(&target, MessageUpdate::finalized(), false)
            .await;
        self.registry.clear(&target.conversation_id);

        let origin_label = session.origin_label().map(|s| s.to_string());
        let text = session.into_text();

        let mut report = TurnReport::new()
            .conversation_id(&target.conversation_id)
            .message_id(&target.message_id)
            .model(&req.model_id)
            .origin_label_opt(origin_label.as_deref())
            .termination(termination)
            .chars_streamed(text.chars().count() as u64)
            .latency_ms(started.elapsed().as_millis() as u64);
        if let Some(err) = &stream_error {
            report = report.error_kind(err.kind()).error_message(&err.to_string());
        }
        telemetry::emit(report);

        Ok(TurnOutcome {
            termination,
            text,
            origin_label,
        })
    }

    /// Read loop for one open reply stream. Classifies how the stream
    /// ended; finalization belongs to the caller.
    async fn pump(
        &self,
        mut stream: ByteStream,
        session: &mut StreamSession,
        token: &CancellationToken,
    ) -> (Termination, Option<TurnStreamError>) {
        loop {
            tokio::select! {
                // Cancellation wins when both are ready.
                biased;
                _ = token.cancelled() => {
                    session.mark_cancelled();
                    return (Termination::Cancelled, None);
                }
                next = stream.next() => match next {
                    Some(Ok(chunk)) => {
                        let effects = session.ingest(&chunk);
                        if let Some(label) = effects.origin_label {
                            self.sink
                                .apply(session.target(), MessageUpdate::origin(label), false)
                                .await;
                        }
                        self.sink
                            .apply(session.target(), MessageUpdate::text(session.text()), false)
                            .await;
                        if let Some(text) = effects.speak {
                            let speech = Arc::clone(&self.speech);
                            tokio::spawn(async move {
                                if let Err(err) = speech.speak(&text).await {
                                    tracing::warn!(error = %err, "speech synthesis failed");
                                }
                            });
                        }
                    }
                    Some(Err(err)) => {
                        // A read aborted by our own token and a transport
                        // that reports the abort itself are the same
                        // expected termination.
                        if token.is_cancelled() || err.is_cancellation() {
                            session.mark_cancelled();
                            return (Termination::Cancelled, None);
                        }
                        tracing::warn!(
                            conversation = %session.target().conversation_id,
                            error = %err,
                            "reply stream failed mid-turn"
                        );
                        return (Termination::Failed, Some(err));
                    }
                    None => return (Termination::Completed, None),
                }
            }
        }
    }
}

// ---- Wire structs (minimal) ----
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_host: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_organization_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    helicone_key: Option<&'a str>,
}

#[derive(Serialize)]
struct TurnWire<'a> {
    api: ApiWire<'a>,
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}
