//! Candidate-object extraction from raw model output.
//!
//! The model is asked for JSON only but routinely wraps its answer in
//! prose or code fences. A balanced-depth scan (honoring string literals
//! and escapes) delimits the object opening at the first `{`, so brace
//! pairs in trailing text cannot corrupt the result.

use crate::error::ApiError;

/// Isolate the JSON object candidate embedded in `raw`.
///
/// The candidate is anchored at the first `{`: when a balanced object
/// opens there it is returned exactly, and when it never closes
/// (output truncated mid-plan) the remainder from that `{` is returned
/// so the parse stage reports what the model actually sent. Nested
/// objects inside a truncated plan are never promoted to the candidate;
/// a lone complete item must not turn a cut-off plan into a success.
/// Fails with [`ApiError::Extraction`] only when the text contains no
/// `{` at all.
pub fn extract_json_object(raw: &str) -> Result<&str, ApiError> {
    let start = raw.find('{').ok_or(ApiError::Extraction)?;
    match balanced_object_len(&raw.as_bytes()[start..]) {
        Some(len) => Ok(&raw[start..start + len]),
        None => Ok(raw[start..].trim_end()),
    }
}

/// Length in bytes of the balanced object starting at `bytes[0]` (which
/// must be `b'{'`), or `None` if it never closes.
fn balanced_object_len(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_embedded_in_prose() {
        let raw = "here is the result: {\"a\":1} thanks";
        assert_eq!(extract_json_object(raw).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extracts_bare_object() {
        let raw = r#"{"userStories":[],"engineeringTasks":[],"risks":[]}"#;
        assert_eq!(extract_json_object(raw).unwrap(), raw);
    }

    #[test]
    fn extracts_nested_object() {
        let raw = "output: {\"a\":{\"b\":{\"c\":1}},\"d\":2} done";
        assert_eq!(
            extract_json_object(raw).unwrap(),
            "{\"a\":{\"b\":{\"c\":1}},\"d\":2}"
        );
    }

    #[test]
    fn braces_inside_string_literals_do_not_close_the_object() {
        let raw = r#"{"story":"use {} placeholders"}"#;
        assert_eq!(extract_json_object(raw).unwrap(), raw);
    }

    #[test]
    fn escaped_quotes_inside_strings_are_honored() {
        let raw = r#"{"story":"she said \"hi {there}\""} trailing"#;
        assert_eq!(
            extract_json_object(raw).unwrap(),
            r#"{"story":"she said \"hi {there}\""}"#
        );
    }

    #[test]
    fn trailing_unrelated_braces_do_not_extend_the_candidate() {
        // The greedy first-to-last heuristic would capture through the
        // second object; the balanced scan stops at the first.
        let raw = "{\"a\":1} and for example {\"b\":2}";
        assert_eq!(extract_json_object(raw).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn code_fences_are_ignored() {
        let raw = "```json\n{\"risks\":[]}\n```";
        assert_eq!(extract_json_object(raw).unwrap(), "{\"risks\":[]}");
    }

    #[test]
    fn no_braces_at_all_fails_extraction() {
        let err = extract_json_object("the model refused to answer").unwrap_err();
        assert!(matches!(err, ApiError::Extraction));
    }

    #[test]
    fn empty_input_fails_extraction() {
        assert!(matches!(
            extract_json_object("").unwrap_err(),
            ApiError::Extraction
        ));
    }

    #[test]
    fn truncated_object_is_passed_through_for_parsing() {
        // Never completes; the parse stage reports the malformed JSON.
        let candidate = extract_json_object("{not valid json").unwrap();
        assert_eq!(candidate, "{not valid json");
    }

    #[test]
    fn truncated_plan_with_complete_inner_item_is_not_salvaged() {
        // Cut off mid-plan right after a complete item object. Promoting
        // the inner item would make the request succeed with an empty
        // plan; the whole unbalanced tail must go to the parser instead.
        let raw = r#"{"userStories":[{"id":1,"story":"a"}"#;
        let candidate = extract_json_object(raw).unwrap();
        assert_eq!(candidate, raw);
        assert!(matches!(
            crate::spec::normalize_plan(candidate).unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
    }
}
