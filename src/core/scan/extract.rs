//! Field extraction from document sources
//!
//! Walks a document's structured body recursively and collects every leaf
//! string value paired with its structural path (`a.b[2].c`). Non-string
//! leaves (numbers, booleans, null) are ignored.

use serde_json::Value;

/// Extract all (field path, text value) pairs from a document source
pub fn extract_text_fields(source: &Value) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    walk(source, "", &mut fields);
    fields
}

fn walk(value: &Value, path: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(s) => {
            out.push((path.to_string(), s.clone()));
        }
        Value::Object(map) => {
            for (key, val) in map {
                let new_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(val, &new_path, out);
            }
        }
        Value::Array(arr) => {
            for (idx, val) in arr.iter().enumerate() {
                let new_path = format!("{path}[{idx}]");
                walk(val, &new_path, out);
            }
        }
        _ => {}
    }
}
