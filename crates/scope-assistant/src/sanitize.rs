//! Post-processing of raw backend answers into user-safe text.

/// Substituted when the backend returns nothing usable.
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "I processed your request but don't have a specific response to provide.";

const FENCE: &str = "```";

/// Clean a raw backend answer.
///
/// Empty or whitespace-only input becomes the fixed fallback sentence. A
/// single wrapping code fence (opening fence line, optionally with a
/// language tag, and/or a trailing fence) is stripped; the interior is
/// preserved. Text without fence markers passes through unchanged, so the
/// function is idempotent.
pub fn clean_response(raw: &str) -> String {
    if raw.trim().is_empty() {
        return EMPTY_RESPONSE_FALLBACK.to_string();
    }
    if !raw.trim_start().starts_with(FENCE) {
        return raw.to_string();
    }

    // Drop the opening fence line ("```" or "```markdown").
    let mut text = raw.trim();
    text = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => "", // the whole answer was a bare fence line
    };

    // Drop a matching trailing fence.
    let trimmed = text.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(FENCE) {
        text = stripped;
    }

    let inner = text.trim();
    if inner.is_empty() {
        EMPTY_RESPONSE_FALLBACK.to_string()
    } else {
        inner.to_string()
    }
}
