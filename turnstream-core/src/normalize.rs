use crate::model::{ChatMessage, ResolvedOptions};
use unicode_normalization::UnicodeNormalization;

fn clean_text(s: &str) -> String {
    // Unicode NFC normalization + BOM strip + CRLF -> LF + trim
    let mut t = s.nfc().collect::<String>();
    if t.starts_with('\u{FEFF}') {
        // Byte Order Mark
        t.remove(0);
    }
    if t.contains("\r\n") {
        t = t.replace("\r\n", "\n");
    }
    t.trim().to_string()
}

fn clamp_round_f32(x: f32, lo: f32, hi: f32, dp: u32) -> f32 {
    let clamped = x.clamp(lo, hi);
    let p = 10f32.powi(dp as i32);
    (clamped * p).round() / p
}

/// Cleans message content before it goes on the wire. Message order and
/// count are preserved; only the text is touched.
pub fn normalize_history(mut history: Vec<ChatMessage>) -> Vec<ChatMessage> {
    for msg in &mut history {
        msg.content = clean_text(&msg.content);
    }
    history
}

/// Clamps sampling parameters into upstream-acceptable ranges.
pub fn normalize_options(mut opts: ResolvedOptions) -> ResolvedOptions {
    opts.temperature = clamp_round_f32(opts.temperature, 0.0, 2.0, 3);
    if opts.max_output_tokens > 100_000 {
        opts.max_output_tokens = 100_000;
    }
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn mk_history(msgs: Vec<(&'static str, &'static str)>) -> Vec<ChatMessage> {
        msgs.into_iter()
            .map(|(role, content)| ChatMessage {
                role: match role {
                    "assistant" => Role::Assistant,
                    "system" => Role::System,
                    _ => Role::User,
                },
                content: content.to_string(),
            })
            .collect()
    }

    fn mk_options(temperature: f32, max_output_tokens: u32) -> ResolvedOptions {
        ResolvedOptions {
            model_ref: "gpt-4o".to_string(),
            temperature,
            max_output_tokens,
        }
    }

    #[test]
    fn trims_message_content() {
        let out = normalize_history(mk_history(vec![("user", "  Hello world   ")]));
        assert_eq!(out[0].content, "Hello world");
    }

    #[test]
    fn keeps_message_order_and_count() {
        let out = normalize_history(mk_history(vec![
            ("system", "be brief"),
            ("user", ""),
            ("assistant", "ok"),
        ]));
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].content, "");
    }

    #[test]
    fn unicode_nfc_and_crlf_normalization() {
        // "e" + combining acute accent should normalize to "é"
        let out = normalize_history(mk_history(vec![("user", "e\u{301}")]));
        assert_eq!(out[0].content, "é");

        // CRLF becomes LF
        let out2 = normalize_history(mk_history(vec![("user", "line1\r\nline2")]));
        assert_eq!(out2[0].content, "line1\nline2");
    }

    #[test]
    fn clamps_temperature() {
        let out = normalize_options(mk_options(2.0000002, 1024));
        assert_eq!(out.temperature, 2.0);
        let out = normalize_options(mk_options(-0.5, 1024));
        assert_eq!(out.temperature, 0.0);
    }

    #[test]
    fn caps_max_output_tokens() {
        let out = normalize_options(mk_options(0.7, 200_000));
        assert_eq!(out.max_output_tokens, 100_000);
    }
}
