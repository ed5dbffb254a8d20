use serde_json::Value;

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Extract the first balanced JSON object or array from a model response.
///
/// Handles code fences and any commentary before or after the value. Bracket
/// matching is string and escape aware, and a balanced span that is not valid
/// JSON (e.g. `[see below]`) is skipped in favour of the next candidate.
pub fn extract_json(response: &str) -> Option<Value> {
    let stripped = strip_code_blocks(response);
    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        if value.is_object() || value.is_array() {
            return Some(value);
        }
    }

    let mut search_from = 0;
    while let Some(offset) = response[search_from..].find(['{', '[']) {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&response[start..]) {
            if let Ok(value) = serde_json::from_str::<Value>(&response[start..start + end]) {
                return Some(value);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Byte length of the balanced bracket span starting at the first byte of `s`.
fn balanced_end(s: &str) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
