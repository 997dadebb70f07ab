//! First-paragraph boundary detection for auto-speech.

/// Leading text shorter than this is not worth speaking yet.
const MIN_LEAD_CHARS: usize = 100;
/// Leading text at least this long has missed the window.
const MAX_LEAD_CHARS: usize = 400;

/// Byte index of the cut ending the speakable first paragraph, if the
/// buffer currently offers one: the last newline, else the last ". ".
/// The cut is accepted only when the text before it is strictly between
/// 100 and 400 characters; otherwise the caller retries on a longer
/// buffer. A newline outside the window is not rescued by a ". "
/// inside it.
pub fn cut_point(text: &str) -> Option<usize> {
    let cut = text.rfind('\n').or_else(|| text.rfind(". "))?;
    let lead = text[..cut].chars().count();
    (lead > MIN_LEAD_CHARS && lead < MAX_LEAD_CHARS).then_some(cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        "a".repeat(n)
    }

    #[test]
    fn newline_inside_window_is_cut() {
        let text = format!("{}\nmore text", filler(150));
        assert_eq!(cut_point(&text), Some(150));
    }

    #[test]
    fn last_newline_wins() {
        let text = format!("{}\n{}\ntail", filler(120), filler(100));
        assert_eq!(cut_point(&text), Some(221));
    }

    #[test]
    fn short_lead_is_rejected() {
        let text = format!("{}\nrest", filler(90));
        assert_eq!(cut_point(&text), None);
    }

    #[test]
    fn window_bounds_are_exclusive() {
        assert_eq!(cut_point(&format!("{}\nx", filler(100))), None);
        assert_eq!(cut_point(&format!("{}\nx", filler(101))), Some(101));
        assert_eq!(cut_point(&format!("{}\nx", filler(399))), Some(399));
        assert_eq!(cut_point(&format!("{}\nx", filler(400))), None);
    }

    #[test]
    fn sentence_break_is_the_fallback() {
        let text = format!("{}. And the story went on", filler(200));
        assert_eq!(cut_point(&text), Some(200));
    }

    #[test]
    fn newline_out_of_window_blocks_sentence_fallback() {
        // The newline at 50 is authoritative even though a ". " sits
        // inside the window.
        let text = format!("{}\n{}. More", filler(50), filler(150));
        assert_eq!(cut_point(&text), None);
    }

    #[test]
    fn window_counts_chars_not_bytes() {
        // 150 two-byte chars put the newline at byte 300, char 150.
        let text = format!("{}\nrest", "é".repeat(150));
        assert_eq!(cut_point(&text), Some(300));
    }

    #[test]
    fn no_boundary_found() {
        assert_eq!(cut_point("short"), None);
        assert_eq!(cut_point(&filler(250)), None);
    }
}
