use async_trait::async_trait;

use crate::error::CoreResult;

/// Speech-synthesis collaborator fed the first paragraph of a reply.
///
/// The driver invokes this on a detached task: the call is never
/// awaited by the read loop, never shares the turn's cancellation
/// token, and its error is logged and dropped.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    async fn speak(&self, text: &str) -> CoreResult<()>;
}

/// A synthesizer that says nothing.
pub struct NullSpeech;

#[async_trait]
impl SpeechSynthesizer for NullSpeech {
    async fn speak(&self, _text: &str) -> CoreResult<()> {
        Ok(())
    }
}
