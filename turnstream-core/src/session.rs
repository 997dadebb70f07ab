//! Per-turn session state.
//!
//! One `StreamSession` exists per assistant turn, owned by the driver.
//! The buffer only accumulates; the single sanctioned removal is the
//! one-time leading metadata packet. `metadata_extracted` and
//! `first_boundary_sent` are one-way flags: once set, the concern they
//! gate never runs again for this session.

use crate::boundary;
use crate::decode::ChunkDecoder;
use crate::model::{SpeakPolicy, TurnTarget};
use crate::packet::{self, PacketScan};

pub struct StreamSession {
    target: TurnTarget,
    speak: SpeakPolicy,
    decoder: ChunkDecoder,
    buffer: String,
    metadata_extracted: bool,
    first_boundary_sent: bool,
    origin_label: Option<String>,
    cancelled: bool,
}

/// Side effects one chunk asks the driver to perform, beyond the
/// unconditional cumulative text update.
#[derive(Debug, Default)]
pub struct ChunkEffects {
    /// Origin label extracted this chunk, published before the text.
    pub origin_label: Option<String>,
    /// First-paragraph text for the fire-and-forget speech call.
    pub speak: Option<String>,
}

impl StreamSession {
    pub fn new(target: TurnTarget, speak: SpeakPolicy) -> Self {
        StreamSession {
            target,
            speak,
            decoder: ChunkDecoder::new(),
            buffer: String::new(),
            metadata_extracted: false,
            first_boundary_sent: false,
            origin_label: None,
            cancelled: false,
        }
    }

    /// Decode one chunk and run the per-chunk pipeline: metadata
    /// extraction while still pending, then the one-shot paragraph
    /// boundary check.
    pub fn ingest(&mut self, chunk: &[u8]) -> ChunkEffects {
        let decoded = self.decoder.feed(chunk);
        self.buffer.push_str(&decoded);

        let mut effects = ChunkEffects::default();
        if !self.metadata_extracted {
            match packet::scan_packet(&self.buffer) {
                PacketScan::Extracted { packet, consumed } => {
                    self.buffer.drain(..consumed);
                    self.metadata_extracted = true;
                    self.origin_label = packet.model;
                    effects.origin_label = self.origin_label.clone();
                }
                PacketScan::Unparsed => {
                    tracing::debug!(
                        buffered = self.buffer.len(),
                        "leading packet delimited but unparseable, retrying on next chunk"
                    );
                }
                PacketScan::Absent | PacketScan::Incomplete => {}
            }
        }

        if self.metadata_extracted
            && !self.first_boundary_sent
            && self.speak == SpeakPolicy::FirstParagraph
        {
            if let Some(cut) = boundary::cut_point(&self.buffer) {
                self.first_boundary_sent = true;
                effects.speak = Some(self.buffer[..cut].to_string());
            }
        }

        effects
    }

    pub fn target(&self) -> &TurnTarget {
        &self.target
    }

    /// The cumulative reply text as the sink should currently see it.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn origin_label(&self) -> Option<&str> {
        self.origin_label.as_deref()
    }

    pub fn metadata_extracted(&self) -> bool {
        self.metadata_extracted
    }

    pub fn first_boundary_sent(&self) -> bool {
        self.first_boundary_sent
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Consumes the session at finalization.
    pub fn into_text(self) -> String {
        self.buffer
    }
}
