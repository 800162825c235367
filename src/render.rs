//! JSON rendering of result bundles.
//!
//! Bundles are pretty-printed, then arrays made up only of numbers are
//! folded onto one line so long `history.data` runs stay readable.

use crate::error::{BridgeError, Result};
use crate::models::ResultBundle;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

pub fn render_bundle(bundle: &ResultBundle) -> Result<String> {
    // ---
    let pretty =
        serde_json::to_string_pretty(bundle).map_err(|e| BridgeError::Render(e.to_string()))?;
    Ok(compact_numeric_arrays(&pretty))
}

/// Normalize whitespace around commas to `", "` inside every array whose
/// elements are all numbers.
///
/// Whitespace right after `[` and right before `]` is kept, as is everything
/// inside string literals. Arrays holding `null`, strings or nested values
/// are left as they are.
pub fn compact_numeric_arrays(input: &str) -> String {
    // ---
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' => {
                if let Some((inner, close)) = numeric_array_at(input, i) {
                    out.push_str(&input[copied..=i]);
                    out.push_str(&compact_inner(inner));
                    out.push(']');
                    copied = close + 1;
                    i = close + 1;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&input[copied..]);
    out
}

/// If the array opening at `open` contains only numbers, return its inner
/// text and the index of its closing bracket.
fn numeric_array_at(input: &str, open: usize) -> Option<(&str, usize)> {
    // ---
    let start = open + 1;
    let len = input[start..]
        .bytes()
        .take_while(|b| b.is_ascii_digit() || b.is_ascii_whitespace() || b",.-+eE".contains(b))
        .count();
    let close = start + len;
    if input.as_bytes().get(close) != Some(&b']') {
        return None;
    }

    let inner = &input[start..close];
    let all_numbers = inner.split(',').all(|token| is_number(token.trim()));
    all_numbers.then_some((inner, close))
}

fn is_number(token: &str) -> bool {
    let starts_ok = token
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || b == b'-');
    starts_ok && token.parse::<f64>().is_ok()
}

fn compact_inner(inner: &str) -> String {
    // ---
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    let values: Vec<&str> = inner.split(',').map(str::trim).collect();
    format!("{}{}{}", leading, values.join(", "), trailing)
}
