//! Salvaging a structured response out of model text.
//!
//! The prompts demand a bare JSON object, but models routinely wrap it
//! in prose or code fences, or emit broken JSON. Extraction runs in
//! two stages: parse the widest `{...}` window as JSON, and when that
//! fails, salvage individual fields with regexes. As a last resort the
//! raw text (capped) becomes the output so the user never sees an
//! empty reflection for a response that did arrive.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use prometheus_core::chat::{ChatResponse, OutputText, SigilData};

/// Cap on raw text promoted to `output` when no field could be
/// salvaged.
const RAW_OUTPUT_CAP: usize = 300;

static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"output"\s*:\s*(?:"([^"]*)"|\[(.*?)\])"#).expect("valid regex")
});
static ECO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"eco"\s*:\s*\[(.*?)\]"#).expect("valid regex"));
static CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""frase_finale"\s*:\s*"([^"]*)""#).expect("valid regex"));
static SIGIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"sigillo"\s*:\s*(\{.*?\})"#).expect("valid regex"));

/// Extract a [`ChatResponse`] from raw model text. Never fails: the
/// worst case is the capped raw text as output with everything else
/// empty.
pub fn extract_response(text: &str) -> ChatResponse {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return normalize(value);
            }
        }
    }
    salvage(text)
}

// ---------------------------------------------------------------------------
// Parsed-JSON path
// ---------------------------------------------------------------------------

/// Normalize a parsed JSON object into a [`ChatResponse`], tolerating
/// the shape drift models produce (output as list, eco as scalar,
/// sigil as embedded JSON string).
fn normalize(value: Value) -> ChatResponse {
    let output = match value.get("output") {
        Some(Value::String(s)) => OutputText::Single(s.clone()),
        Some(Value::Array(items)) => lines_to_output(values_to_strings(items)),
        _ => OutputText::default(),
    };

    let eco = match value.get("eco") {
        Some(Value::Array(items)) => values_to_strings(items),
        Some(Value::Null) | None => vec![],
        Some(other) => vec![value_to_string(other)],
    };

    let closing_phrase = value
        .get("frase_finale")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let sigil = match value.get("sigillo") {
        Some(Value::Object(_)) => {
            serde_json::from_value(value["sigillo"].clone()).ok()
        }
        // Some models emit the sigil as a JSON string.
        Some(Value::String(s)) => serde_json::from_str::<SigilData>(s).ok(),
        _ => None,
    };

    ChatResponse {
        output,
        eco,
        closing_phrase,
        sigil,
    }
}

/// A single-element list collapses to a string, matching what the
/// frontend expects; an empty list collapses to an empty string.
fn lines_to_output(mut lines: Vec<String>) -> OutputText {
    match lines.len() {
        0 => OutputText::default(),
        1 => OutputText::Single(lines.remove(0)),
        _ => OutputText::Lines(lines),
    }
}

fn values_to_strings(items: &[Value]) -> Vec<String> {
    items.iter().map(value_to_string).collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Regex salvage path
// ---------------------------------------------------------------------------

/// Field-by-field salvage when the brace window is not valid JSON.
fn salvage(text: &str) -> ChatResponse {
    let output = OUTPUT_RE.captures(text).and_then(|caps| {
        if let Some(single) = caps.get(1) {
            Some(OutputText::Single(single.as_str().to_string()))
        } else {
            caps.get(2).map(|list| salvage_list(list.as_str()))
        }
    });

    let eco = ECO_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|inner| match salvage_list(inner.as_str()) {
            OutputText::Single(s) if s.is_empty() => vec![],
            OutputText::Single(s) => vec![s],
            OutputText::Lines(lines) => lines,
        })
        .unwrap_or_default();

    let closing_phrase = CLOSING_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let sigil = SIGIL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| serde_json::from_str::<SigilData>(m.as_str()).ok());

    ChatResponse {
        output: output.unwrap_or_else(|| OutputText::Single(truncated_raw(text))),
        eco,
        closing_phrase,
        sigil,
    }
}

/// Parse the inside of a bracketed list; falls back to treating it as
/// one bare string with quotes stripped.
fn salvage_list(inner: &str) -> OutputText {
    if let Ok(lines) = serde_json::from_str::<Vec<String>>(&format!("[{inner}]")) {
        lines_to_output(lines)
    } else {
        OutputText::Single(inner.trim().trim_matches('"').to_string())
    }
}

/// The raw text, trimmed and capped at [`RAW_OUTPUT_CAP`] characters.
fn truncated_raw(text: &str) -> String {
    text.trim().chars().take(RAW_OUTPUT_CAP).collect()
}
