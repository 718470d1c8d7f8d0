//! Dynamic value helpers
//!
//! Attribute values are `serde_json::Value`s. The rules here decide what
//! counts as "set", "true" or "equal" for a value, and how a value reads
//! when substituted into a message.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A model's attribute map as stored on the model (possibly nested).
pub type Attributes = Map<String, Value>;

/// A flattened attribute map: nested objects become dot-joined keys.
pub type Snapshot = BTreeMap<String, Value>;

/// Whether a value counts as logically true.
///
/// `null`, `false`, `0`, `NaN` and the empty string are false; everything
/// else, including empty arrays and objects, is true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a value is "present" for the purposes of `required`.
///
/// Absent values are `null`, strings that are empty after trimming, and
/// empty arrays.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Strict equality: numbers compare by numeric value, everything else
/// structurally.
#[must_use]
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Renders a value the way it appears inside a message.
///
/// Strings are inserted raw, integral numbers without a fraction, arrays as
/// their elements joined by `,`, and objects as `[object Object]`.
#[must_use]
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 && f.abs() < 1e21 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

/// Spreads a value into a placeholder list: arrays contribute their
/// elements, any other value contributes itself.
pub(crate) fn spread_into(out: &mut Vec<Value>, value: &Value) {
    match value {
        Value::Array(items) => out.extend(items.iter().cloned()),
        other => out.push(other.clone()),
    }
}

/// Flattens nested attribute objects into dot-joined keys.
///
/// Only JSON objects are descended into; arrays and scalars are leaves.
///
/// ```
/// use serde_json::json;
/// use verity_validator::foundation::flatten;
///
/// let attrs = json!({"name": "x", "address": {"city": "Oslo"}});
/// let flat = flatten(attrs.as_object().unwrap());
/// assert_eq!(flat["address.city"], json!("Oslo"));
/// assert!(!flat.contains_key("address"));
/// ```
#[must_use]
pub fn flatten(attrs: &Attributes) -> Snapshot {
    let mut out = Snapshot::new();
    flatten_into(attrs, "", &mut out);
    out
}

fn flatten_into(attrs: &Attributes, prefix: &str, out: &mut Snapshot) {
    for (key, value) in attrs {
        match value {
            Value::Object(nested) => flatten_into(nested, &format!("{prefix}{key}."), out),
            other => {
                out.insert(format!("{prefix}{key}"), other.clone());
            }
        }
    }
}

/// Looks up an attribute by its flattened name in a nested attribute map.
///
/// A direct key wins; otherwise the name is walked as a dot path.
#[must_use]
pub fn lookup<'a>(attrs: &'a Attributes, name: &str) -> Option<&'a Value> {
    if let Some(value) = attrs.get(name) {
        return Some(value);
    }
    let mut parts = name.split('.');
    let mut current = attrs.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(false), false)]
    #[case(json!(0), false)]
    #[case(json!(""), false)]
    #[case(json!(true), true)]
    #[case(json!(1), true)]
    #[case(json!("no"), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    fn truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(""), false)]
    #[case(json!("   "), false)]
    #[case(json!([]), false)]
    #[case(json!(0), true)]
    #[case(json!(false), true)]
    #[case(json!(" a "), true)]
    #[case(json!([1]), true)]
    #[case(json!({}), true)]
    fn presence(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_present(&value), expected);
    }

    #[test]
    fn display_matches_message_rendering() {
        assert_eq!(display(&json!(42)), "42");
        assert_eq!(display(&json!(42.0)), "42");
        assert_eq!(display(&json!(1.5)), "1.5");
        assert_eq!(display(&json!("text")), "text");
        assert_eq!(display(&json!([1, "a", null])), "1,a,");
        assert_eq!(display(&json!({"a": 1})), "[object Object]");
        assert_eq!(display(&json!(null)), "null");
    }

    #[test]
    fn strict_eq_compares_numbers_numerically() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(strict_eq(&json!("a"), &json!("a")));
    }

    #[test]
    fn flatten_descends_only_into_objects() {
        let attrs = json!({
            "name": "n",
            "address": {"city": "c", "geo": {"lat": 1}},
            "tags": [{"x": 1}],
        });
        let flat = flatten(attrs.as_object().unwrap());
        let keys: Vec<_> = flat.keys().cloned().collect();
        assert_eq!(keys, ["address.city", "address.geo.lat", "name", "tags"]);
        assert_eq!(flat["tags"], json!([{"x": 1}]));
    }

    #[test]
    fn lookup_walks_dot_paths() {
        let attrs = json!({"address": {"city": "c"}, "a.b": 1});
        let attrs = attrs.as_object().unwrap();
        assert_eq!(lookup(attrs, "address.city"), Some(&json!("c")));
        assert_eq!(lookup(attrs, "a.b"), Some(&json!(1)));
        assert_eq!(lookup(attrs, "address.zip"), None);
    }
}
