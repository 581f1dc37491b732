//! Defensive parsing of raw insight provider output.
//!
//! Providers wrap JSON in prose or code fences and routinely get field types wrong.
//! Every field is read on its own; a bad field is dropped, never fatal. Only a reply
//! without any JSON object is reported as malformed.

use serde_json::{Map, Value};

use super::{ActionItem, Insight, InsightError, Priority};

/// Returns the first balanced `{ ... }` substring of `text`, honouring JSON string
/// escapes so braces inside string literals do not affect nesting.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses raw provider text into an `Insight`, dropping every invalid field.
pub fn parse_insight(raw: &str) -> Result<Insight, InsightError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| InsightError::Malformed("no JSON object in provider output".to_string()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| InsightError::Malformed(format!("invalid JSON: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(InsightError::Malformed("top-level value is not an object".to_string()));
    };

    Ok(Insight {
        role_match_score: score_field(&obj, &["roleMatchScore", "role_match_score"]),
        project_relevance_score: score_field(
            &obj,
            &["projectRelevanceScore", "project_relevance_score"],
        ),
        summary: field(&obj, &["summary"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        strengths: string_list(&obj, &["strengths"]),
        weaknesses: string_list(&obj, &["weaknesses"]),
        recommendations: string_list(&obj, &["recommendations"]),
        action_plan: action_plan(&obj),
        focus_topics: string_list(&obj, &["focusTopics", "focus_topics"]),
        ..Insight::default()
    })
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

/// Accepts numbers and numeric strings; anything non-finite or outside [0, 100] is dropped.
fn score_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u8> {
    let raw = match field(obj, keys)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_finite() && (0.0..=100.0).contains(&raw) {
        Some(raw.round() as u8)
    } else {
        None
    }
}

fn string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    field(obj, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn action_plan(obj: &Map<String, Value>) -> Vec<ActionItem> {
    let Some(items) = field(obj, &["actionPlan", "action_plan"]).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let action = item.get("action")?.as_str()?.trim();
            if action.is_empty() {
                return None;
            }
            let priority = item
                .get("priority")
                .and_then(Value::as_str)
                .and_then(Priority::parse)
                .unwrap_or(Priority::Medium);
            let timeline = item
                .get("timeline")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            Some(ActionItem {
                action: action.to_string(),
                priority,
                timeline,
            })
        })
        .collect()
}
