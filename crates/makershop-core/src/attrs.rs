//! Free-form product attribute maps and their merge rule.
//!
//! Attributes travel as JSON objects end to end (staging row → canonical
//! `products.attributes` column), but the merge rule is a plain function so
//! it can be tested without a database. The SQL-side `jsonb ||` used by the
//! bulk upsert has the same semantics.

use serde_json::Value;

use crate::num::parse_flexible_number;

/// Arbitrary key/value product attributes, JSON-object shaped.
pub type AttributeMap = serde_json::Map<String, Value>;

/// Merge `incoming` attributes into `existing` by key union.
///
/// Existing keys are preserved unless the incoming payload explicitly carries
/// the key, in which case the incoming value wins. This keeps manually
/// curated attributes intact across partial re-imports.
#[must_use]
pub fn merge_attributes(existing: &AttributeMap, incoming: &AttributeMap) -> AttributeMap {
    let mut merged = existing.clone();
    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Read an attribute as a number, accepting both JSON numbers and the
/// locale-tolerant string forms staging rows carry (`"12,5"`, `"1 299"`).
#[must_use]
pub fn attr_f64(attrs: &AttributeMap, key: &str) -> Option<f64> {
    match attrs.get(key)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_flexible_number(s),
        _ => None,
    }
}

/// Read an attribute as a non-empty trimmed string.
#[must_use]
pub fn attr_str<'a>(attrs: &'a AttributeMap, key: &str) -> Option<&'a str> {
    match attrs.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        _ => None,
    }
}

/// Read an attribute as a boolean, accepting `true`/`"true"`/`"1"`/`"yes"`.
#[must_use]
pub fn attr_bool(attrs: &AttributeMap, key: &str) -> bool {
    match attrs.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> AttributeMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn merge_adds_new_keys_and_keeps_existing() {
        let existing = map(json!({"color": "red", "finish": "matte"}));
        let incoming = map(json!({"material": "PLA"}));
        let merged = merge_attributes(&existing, &incoming);
        assert_eq!(merged["color"], "red");
        assert_eq!(merged["finish"], "matte");
        assert_eq!(merged["material"], "PLA");
    }

    #[test]
    fn merge_incoming_key_wins_on_conflict() {
        let existing = map(json!({"material": "ABS", "color": "red"}));
        let incoming = map(json!({"material": "PLA"}));
        let merged = merge_attributes(&existing, &incoming);
        assert_eq!(merged["material"], "PLA");
        assert_eq!(merged["color"], "red");
    }

    #[test]
    fn merge_of_empty_incoming_is_identity() {
        let existing = map(json!({"color": "red"}));
        let merged = merge_attributes(&existing, &AttributeMap::new());
        assert_eq!(merged, existing);
    }

    #[test]
    fn attr_f64_reads_numbers_and_tolerant_strings() {
        let attrs = map(json!({"grams": 50, "ml": "12,5", "bad": "abc", "list": [1]}));
        assert_eq!(attr_f64(&attrs, "grams"), Some(50.0));
        assert_eq!(attr_f64(&attrs, "ml"), Some(12.5));
        assert_eq!(attr_f64(&attrs, "bad"), None);
        assert_eq!(attr_f64(&attrs, "list"), None);
        assert_eq!(attr_f64(&attrs, "missing"), None);
    }

    #[test]
    fn attr_bool_accepts_common_truthy_forms() {
        let attrs = map(json!({
            "a": true, "b": "yes", "c": "1", "d": 1, "e": "no", "f": false
        }));
        assert!(attr_bool(&attrs, "a"));
        assert!(attr_bool(&attrs, "b"));
        assert!(attr_bool(&attrs, "c"));
        assert!(attr_bool(&attrs, "d"));
        assert!(!attr_bool(&attrs, "e"));
        assert!(!attr_bool(&attrs, "f"));
        assert!(!attr_bool(&attrs, "missing"));
    }

    #[test]
    fn attr_str_trims_and_rejects_empty() {
        let attrs = map(json!({"material": "  PLA ", "empty": "   ", "num": 5}));
        assert_eq!(attr_str(&attrs, "material"), Some("PLA"));
        assert_eq!(attr_str(&attrs, "empty"), None);
        assert_eq!(attr_str(&attrs, "num"), None);
    }
}
