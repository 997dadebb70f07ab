//! Incremental UTF-8 decoding for reply streams.
//!
//! Contract:
//! - chunks may split a multi-byte character anywhere; the undecoded tail
//!   is carried into the next `feed` call,
//! - invalid sequences decode to U+FFFD instead of failing the stream,
//! - a tail still incomplete when the stream ends is never flushed.

/// Stateful chunk decoder. One per session; `feed` returns the text newly
/// decoded from this chunk (possibly empty while a character is pending).
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    carry: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        ChunkDecoder { carry: Vec::new() }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> String {
        if self.carry.is_empty() {
            return self.decode(chunk);
        }
        let mut joined = std::mem::take(&mut self.carry);
        joined.extend_from_slice(chunk);
        self.decode(&joined)
    }

    fn decode(&mut self, mut input: &[u8]) -> String {
        let mut out = String::with_capacity(input.len());
        while !input.is_empty() {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        // Invalid sequence: replace and keep going.
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[bad..];
                        }
                        // Truncated sequence: wait for the next chunk.
                        None => {
                            self.carry = rest.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}
