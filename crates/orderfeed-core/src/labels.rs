//! Display labels for boolean-like values.
//!
//! Values coming out of stored documents or filter options are loosely typed:
//! a flag may be a JSON boolean or the string `"true"`. [`yes_no_key`] maps
//! such a value to a translation key, and [`yes_no_label`] resolves the key
//! to its English text.

use serde_json::Value;

pub const YES_KEY: &str = "ADMIN.FILTER_OPTIONS.YES";
pub const NO_KEY: &str = "ADMIN.FILTER_OPTIONS.NO";

/// Returns `true` only for the boolean `true` or the exact string `"true"`.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Translation key for a boolean-like value.
#[must_use]
pub fn yes_no_key(value: &Value) -> &'static str {
    if is_truthy(value) {
        YES_KEY
    } else {
        NO_KEY
    }
}

/// Resolves a translation key to English text.
#[must_use]
pub fn translate(key: &str) -> Option<&'static str> {
    match key {
        YES_KEY => Some("Yes"),
        NO_KEY => Some("No"),
        _ => None,
    }
}

/// Translated "Yes"/"No" label for a boolean-like value.
#[must_use]
pub fn yes_no_label(value: &Value) -> &'static str {
    let key = yes_no_key(value);
    translate(key).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_true_maps_to_yes() {
        assert_eq!(yes_no_key(&json!(true)), YES_KEY);
        assert_eq!(yes_no_label(&json!(true)), "Yes");
    }

    #[test]
    fn string_true_maps_to_yes() {
        assert_eq!(yes_no_key(&json!("true")), YES_KEY);
    }

    #[test]
    fn everything_else_maps_to_no() {
        for value in [
            json!(false),
            json!("false"),
            json!("True"),
            json!("yes"),
            json!(1),
            json!(null),
            json!({}),
        ] {
            assert_eq!(yes_no_key(&value), NO_KEY, "value {value} should be No");
        }
        assert_eq!(yes_no_label(&json!(null)), "No");
    }

    #[test]
    fn unknown_key_has_no_translation() {
        assert!(translate("ADMIN.FILTER_OPTIONS.MAYBE").is_none());
    }
}
