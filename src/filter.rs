//! Post-processing for local reasoning models.
//!
//! Models like QwQ emit their chain of thought inside a
//! `<think>...</think>` region before the final answer. Downstream
//! consumers only want the answer.

use regex::Regex;

/// Remove every `<think>...</think>` region from `text`.
///
/// Only acts when both the opening and closing tag are present; otherwise
/// the text is returned unchanged. Removal is non-greedy and spans
/// newlines; blank-line runs left behind by the removal are collapsed to a
/// single blank line, and the result is trimmed of surrounding whitespace.
#[must_use]
pub fn strip_reasoning(text: &str) -> String {
    if !(text.contains("<think>") && text.contains("</think>")) {
        return text.to_string();
    }

    let (Ok(think_re), Ok(blank_re)) = (
        Regex::new(r"(?s)<think>.*?</think>"),
        Regex::new(r"\n{3,}"),
    ) else {
        return text.to_string();
    };

    let cleaned = think_re.replace_all(text, "");
    blank_re.replace_all(&cleaned, "\n\n").trim().to_string()
}
