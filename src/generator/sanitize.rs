//! Recovery of bare HTML from a model reply.
//!
//! Models are told to answer with HTML only but often wrap it in markdown fences or lead with
//! prose. Cleanup is best-effort: text with no HTML markers at all is returned trimmed and
//! otherwise untouched.

const HTML_FENCE: &str = "```html";
const FENCE: &str = "```";
const DOCTYPE_MARKER: &str = "<!DOCTYPE";
const ROOT_MARKER: &str = "<html";

/// Extract the HTML document from raw model output.
pub fn clean_code_response(raw: &str) -> String {
    let code = if let Some(inner) = fenced_after(raw, HTML_FENCE) {
        inner
    } else if let Some(inner) = fenced_after(raw, FENCE) {
        inner
    } else {
        raw
    };

    let code = code.trim();
    if starts_with_marker(code) {
        return code.to_string();
    }

    let start = code
        .find(DOCTYPE_MARKER)
        .or_else(|| code.find(ROOT_MARKER));
    match start {
        Some(idx) => code[idx..].to_string(),
        None => code.to_string(),
    }
}

/// Whether `code` already begins with a doctype or root tag.
pub fn starts_with_marker(code: &str) -> bool {
    code.starts_with(DOCTYPE_MARKER) || code.starts_with(ROOT_MARKER)
}

/// Text between the first `opener` and the next closing fence. An unclosed fence runs to the end.
fn fenced_after<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let rest = &text[start..];
    Some(match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    })
}
