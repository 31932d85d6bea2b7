//! Pull the first JSON object out of free-form completion text.
//!
//! Completion backends rarely return bare JSON even when told to: the object
//! usually arrives wrapped in a fenced code block, prose, or both. This is
//! the most failure-prone boundary in the engine, so the scraping lives in
//! one small, heavily tested function.

/// Extract the first JSON object from `text`.
///
/// Strategy, in order:
/// 1. A fenced code block (```json or plain ```): return its contents.
/// 2. The span from the first `{` to the last `}` in the raw text.
/// 3. `None` when neither is present.
///
/// The returned slice is not guaranteed to parse; callers own the
/// deserialization error.
pub fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(block) = fenced_block(text) {
        return Some(block);
    }
    brace_span(text)
}

/// Contents of the first fenced code block, tag line stripped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];

    // Skip an optional language tag ("json", "JSON", ...) up to the first
    // newline; the fence may also open directly onto the payload.
    let body_start = match after_fence.find('\n') {
        Some(nl) if after_fence[..nl].trim().chars().all(char::is_alphanumeric) => nl + 1,
        _ => 0,
    };
    let body = &after_fence[body_start..];

    let close = body.find("```")?;
    let content = body[..close].trim();
    (!content.is_empty()).then_some(content)
}

/// First `{` through last `}` of the raw text.
fn brace_span(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| &text[open..=close])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json_block() {
        let text = "Here is your plan:\n```json\n{\"prep\": []}\n```\nEnjoy!";
        assert_eq!(extract_json_object(text), Some("{\"prep\": []}"));
    }

    #[test]
    fn extracts_untagged_fenced_block() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn extracts_bare_object_span() {
        let text = "Sure! {\"a\": {\"b\": 2}} -- done.";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn bare_span_runs_first_open_to_last_close() {
        // Two sibling objects: the greedy span covers both. The downstream
        // parse failure triggers the fallback, which is the intended
        // handling for malformed multi-object responses.
        let text = "{\"a\":1} and {\"b\":2}";
        assert_eq!(extract_json_object(text), Some("{\"a\":1} and {\"b\":2}"));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn unclosed_brace_returns_none() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
    }

    #[test]
    fn empty_fence_falls_through_to_brace_span() {
        let text = "```\n```\n{\"a\": 1}";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn fenced_block_with_leading_prose_inside() {
        let text = "```json\n  {\"tasks\": []}  \n```";
        assert_eq!(extract_json_object(text), Some("{\"tasks\": []}"));
    }
}
