//! Loose readers for CONTENTdm JSON values
//!
//! Record fields arrive as strings, numbers or lists depending on the
//! collection schema; these helpers flatten them to trimmed text.

use serde_json::Value;

/// Render a JSON scalar (or list of scalars) as trimmed text.
///
/// Returns `None` for null, objects, and values that are blank after trimming.
pub fn text(value: Option<&Value>) -> Option<String> {
    let rendered = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| text(Some(item)))
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null | Value::Object(_) => return None,
    };

    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

/// Text of `key` in `object`, if present and non-blank.
pub fn field(object: &Value, key: &str) -> Option<String> {
    text(object.get(key))
}

/// First key in `keys` that yields non-blank text.
pub fn first_field(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field(object, key))
}

/// First non-blank candidate, trimmed.
pub fn first_nonempty<I, S>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    candidates.into_iter().flatten().find_map(|candidate| {
        let trimmed = candidate.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Top-level key names of a JSON object, for diagnostics.
pub fn keys(object: &Value) -> Vec<String> {
    object
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_scalars() {
        assert_eq!(text(Some(&json!("  Jean Ritchie "))), Some("Jean Ritchie".to_string()));
        assert_eq!(text(Some(&json!(1234))), Some("1234".to_string()));
        assert_eq!(text(Some(&json!("   "))), None);
        assert_eq!(text(Some(&Value::Null)), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_text_list_and_object() {
        assert_eq!(
            text(Some(&json!(["Folk music", "", "Ballads"]))),
            Some("Folk music; Ballads".to_string())
        );
        assert_eq!(text(Some(&json!({"a": 1}))), None);
    }

    #[test]
    fn test_first_field_skips_blank() {
        let meta = json!({"creator": "", "contributor": "Bill Monroe"});
        assert_eq!(
            first_field(&meta, &["creator", "contributor"]),
            Some("Bill Monroe".to_string())
        );
        assert_eq!(first_field(&meta, &["publisher"]), None);
    }

    #[test]
    fn test_first_nonempty() {
        assert_eq!(
            first_nonempty([None, Some(" "), Some(" x ")]),
            Some("x".to_string())
        );
        assert_eq!(first_nonempty::<_, &str>([None, None]), None);
    }
}
