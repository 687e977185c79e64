//! Coercion and comparison rules shared by both languages.
//!
//! Every comparison first turns the answer into a list of strings so scalar
//! and multi-value fields compare the same way: absent is `[""]`, a list is
//! taken element by element, and anything else is a one-element list.

use super::value::Value;

/// Coerce a value to the strings it is compared as
pub fn comparable_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Absent | Value::Object(_) => vec![String::new()],
        Value::Bool(b) => vec![b.to_string()],
        Value::String(s) => vec![s.clone()],
        Value::List(items) => items.clone(),
    }
}

/// Any element contains `needle`, ignoring case
pub fn any_contains_ignore_case(value: &Value, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    comparable_strings(value)
        .iter()
        .any(|s| s.to_lowercase().contains(&needle))
}

/// Any element contains `needle` exactly
pub fn any_contains(value: &Value, needle: &str) -> bool {
    comparable_strings(value).iter().any(|s| s.contains(needle))
}

/// Any element equals `expected`, ignoring case
pub fn any_equals_ignore_case(value: &Value, expected: &str) -> bool {
    let expected = expected.to_lowercase();
    comparable_strings(value)
        .iter()
        .any(|s| s.to_lowercase() == expected)
}

/// Loose equality: some element of `left` equals some element of `right`,
/// ignoring case
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    let right: Vec<String> = comparable_strings(right)
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    comparable_strings(left)
        .iter()
        .any(|l| right.contains(&l.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparable_strings() {
        assert_eq!(comparable_strings(&Value::Absent), vec![""]);
        assert_eq!(comparable_strings(&Value::Bool(true)), vec!["true"]);
        assert_eq!(comparable_strings(&Value::from("x")), vec!["x"]);
        assert_eq!(
            comparable_strings(&Value::from(vec!["a", "b"])),
            vec!["a", "b"]
        );
        assert!(comparable_strings(&Value::List(vec![])).is_empty());
    }

    #[test]
    fn test_contains_variants() {
        let tags = Value::from(vec!["Yes", "Maybe"]);
        assert!(any_contains_ignore_case(&tags, "yes"));
        assert!(any_contains_ignore_case(&tags, "AYB"));
        assert!(!any_contains(&tags, "yes"));
        assert!(any_contains(&tags, "Yes"));
    }

    #[test]
    fn test_absent_matches_empty_string() {
        assert!(any_equals_ignore_case(&Value::Absent, ""));
        assert!(any_contains(&Value::Absent, ""));
        assert!(!any_equals_ignore_case(&Value::Absent, "x"));
    }

    #[test]
    fn test_loosely_equal() {
        assert!(loosely_equal(&Value::from("Unemployed"), &Value::from("unemployed")));
        assert!(loosely_equal(&Value::from(vec!["a", "B"]), &Value::from("b")));
        assert!(loosely_equal(&Value::Bool(true), &Value::from("TRUE")));
        assert!(loosely_equal(&Value::Absent, &Value::from("")));
        assert!(!loosely_equal(&Value::from("a"), &Value::from("b")));
        assert!(!loosely_equal(&Value::List(vec![]), &Value::from("")));
    }
}
