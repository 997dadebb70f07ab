//! Leading metadata-packet detection.
//!
//! A reply stream may open with one JSON object naming the responding
//! model. It ends at the first top-level `}`; everything after it is
//! plain reply text. Scanning is pure so it can be tested without a
//! session or transport.

use crate::model::MetadataPacket;

/// Result of scanning the cumulative buffer for the leading packet.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketScan {
    /// Buffer does not open with `{`; nothing to extract this round.
    /// Once plain text has begun the first character never changes,
    /// so this becomes permanent on its own.
    Absent,
    /// Opening brace seen but its top-level close has not arrived.
    Incomplete,
    /// A candidate was delimited but did not parse; retried when the
    /// buffer has grown.
    Unparsed,
    /// Packet parsed; `consumed` bytes of the buffer belong to it.
    Extracted {
        packet: MetadataPacket,
        consumed: usize,
    },
}

pub fn scan_packet(buffer: &str) -> PacketScan {
    if !buffer.starts_with('{') {
        return PacketScan::Absent;
    }
    let Some(close) = top_level_close(buffer) else {
        return PacketScan::Incomplete;
    };
    let consumed = close + 1;
    match serde_json::from_str::<MetadataPacket>(&buffer[..consumed]) {
        Ok(packet) => PacketScan::Extracted { packet, consumed },
        Err(_) => PacketScan::Unparsed,
    }
}

/// Byte index of the first `}` at brace depth zero relative to the end
/// of the object opened by the leading `{`. Braces inside JSON string
/// literals (escapes included) do not count.
pub fn top_level_close(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => match depth {
                0 | 1 => return Some(idx),
                _ => depth -= 1,
            },
            _ => {}
        }
    }
    None
}
