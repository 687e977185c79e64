//! Runtime values and the answer state expressions are evaluated against.
//!
//! Values cross the JSON/YAML boundary through `serde_json::Value`.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::{ExprError, ExprResult};
use crate::parser::ast::VarPath;

static ABSENT: Value = Value::Absent;

/// A field answer, or the result of a value expression
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No answer
    #[default]
    Absent,
    Bool(bool),
    String(String),
    /// Multi-value answer (checkboxes, multi-selects)
    List(Vec<String>),
    /// Nested answer (lookups, subforms); only reachable through paths
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// String form used by concatenation: absent is empty, lists join with
    /// commas, objects have no text form
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Absent | Value::Object(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => items.join(","),
        }
    }

    /// Convert to serde_json::Value
    pub fn to_serde_json(&self) -> serde_json::Value {
        match self {
            Value::Absent => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            Value::Object(obj) => {
                let map: serde_json::Map<String, serde_json::Value> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_serde_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }

    /// Convert from serde_json::Value. Numbers keep their textual form and
    /// list elements are stringified.
    pub fn from_serde_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Absent,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::String(n.to_string()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::List(
                arr.into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => Value::from_serde_json(other).to_display_string(),
                    })
                    .collect(),
            ),
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from_serde_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_serde_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from_serde_json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<String>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Object(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// Current answers keyed by field data name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    entries: IndexMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an answer; missing keys read as [`Value::Absent`]
    pub fn get(&self, key: &str) -> &Value {
        self.entries.get(key).unwrap_or(&ABSENT)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set an answer, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Value {
        self.entries
            .insert(key.into(), value.into())
            .unwrap_or_default()
    }

    pub fn remove(&mut self, key: &str) -> Value {
        self.entries.shift_remove(key).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Follow a variable path. Each segment is a property lookup on the
    /// previous object; an optional `:accessor` is looked up only when the
    /// segment resolved to an object. Anything unresolvable is absent.
    pub fn resolve(&self, path: &VarPath) -> &Value {
        let mut current: Option<&Value> = None;

        for segment in &path.segments {
            if segment.key.is_empty() {
                return &ABSENT;
            }

            let next = match current {
                None => self.entries.get(&segment.key),
                Some(Value::Object(map)) => map.get(&segment.key),
                Some(_) => None,
            };
            let mut value = next.unwrap_or(&ABSENT);

            if let (Some(accessor), Value::Object(map)) = (&segment.accessor, value) {
                value = map.get(accessor).unwrap_or(&ABSENT);
            }

            current = Some(value);
        }

        current.unwrap_or(&ABSENT)
    }

    /// Build a state from a JSON object
    pub fn from_serde_json(json: serde_json::Value) -> ExprResult<Self> {
        match Value::from_serde_json(json) {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ExprError::invalid_state(format!(
                "expected an object of answers, found {}",
                other.type_name()
            ))),
        }
    }

    pub fn from_json(text: &str) -> ExprResult<Self> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ExprError::invalid_state(e.to_string()))?;
        Self::from_serde_json(json)
    }

    pub fn from_yaml(text: &str) -> ExprResult<Self> {
        let json: serde_json::Value =
            serde_yaml::from_str(text).map_err(|e| ExprError::invalid_state(e.to_string()))?;
        Self::from_serde_json(json)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_serde_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Absent.type_name(), "absent");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::String("hello".into()).type_name(), "string");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Object(IndexMap::new()).type_name(), "object");
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Value::Absent.to_display_string(), "");
        assert_eq!(Value::Bool(false).to_display_string(), "false");
        assert_eq!(Value::from("hi").to_display_string(), "hi");
        assert_eq!(Value::from(vec!["a", "b"]).to_display_string(), "a,b");
        assert_eq!(Value::Object(IndexMap::new()).to_display_string(), "");
    }

    #[test]
    fn test_from_serde_json() {
        assert_eq!(Value::from_serde_json(json!(null)), Value::Absent);
        assert_eq!(Value::from_serde_json(json!(42)), Value::from("42"));
        assert_eq!(Value::from_serde_json(json!(1.5)), Value::from("1.5"));
        assert_eq!(
            Value::from_serde_json(json!(["a", 1, true, null])),
            Value::from(vec!["a", "1", "true", ""])
        );
        let obj = Value::from_serde_json(json!({"display": "1 High St"}));
        assert_eq!(obj.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_state_get_missing_is_absent() {
        let state = State::new();
        assert!(state.get("nope").is_absent());
    }

    #[test]
    fn test_state_set_returns_previous() {
        let mut state = State::new();
        assert_eq!(state.set("a", "1"), Value::Absent);
        assert_eq!(state.set("a", "2"), Value::from("1"));
        assert_eq!(state.get("a"), &Value::from("2"));
        assert_eq!(state.remove("a"), Value::from("2"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_resolve_nested_path() {
        let state = State::from_serde_json(json!({
            "applicant": {
                "address": {"display": "1 High St", "postcode": "AB1 2CD"},
                "name": "Jane"
            }
        }))
        .unwrap();

        assert_eq!(
            state.resolve(&VarPath::parse("applicant/name")),
            &Value::from("Jane")
        );
        assert_eq!(
            state.resolve(&VarPath::parse(" applicant / address:display ")),
            &Value::from("1 High St")
        );
        assert!(state
            .resolve(&VarPath::parse("applicant/missing/deeper"))
            .is_absent());
        assert!(state.resolve(&VarPath::parse("applicant//name")).is_absent());
        assert!(state.resolve(&VarPath::parse("")).is_absent());
    }

    #[test]
    fn test_accessor_ignored_on_non_objects() {
        let state: State = [("name", "Jane")].into_iter().collect();
        assert_eq!(
            state.resolve(&VarPath::parse("name:display")),
            &Value::from("Jane")
        );
    }

    #[test]
    fn test_state_json_roundtrip_shape() {
        let state = State::from_json(r#"{"a": "x", "b": ["1", "2"], "c": true, "d": null}"#)
            .unwrap();
        assert_eq!(
            state.to_json(),
            json!({"a": "x", "b": ["1", "2"], "c": true, "d": null})
        );
    }

    #[test]
    fn test_state_from_yaml() {
        let state = State::from_yaml("first: Jane\ntags:\n  - Yes\n  - Maybe\nage: 30\n").unwrap();
        assert_eq!(state.get("first"), &Value::from("Jane"));
        assert_eq!(state.get("tags"), &Value::from(vec!["Yes", "Maybe"]));
        assert_eq!(state.get("age"), &Value::from("30"));
    }

    #[test]
    fn test_state_must_be_object() {
        assert!(matches!(
            State::from_json("[1, 2]"),
            Err(ExprError::InvalidState { .. })
        ));
        assert!(State::from_json("{not json").is_err());
    }
}
