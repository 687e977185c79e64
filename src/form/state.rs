//! Initial answer state and answer updates.

use super::{FieldKind, Form};
use crate::evaluator::{Evaluator, State, Value};

/// Seed the state from every field's default value, in schema order.
/// Each default sees the answers seeded before it.
pub fn create_form_state(form: &Form) -> State {
    create_form_state_with(form, &Evaluator::new())
}

pub fn create_form_state_with(form: &Form, evaluator: &Evaluator) -> State {
    let mut state = State::new();

    for field in form.fields() {
        let value = match field.default_value.as_deref() {
            Some(expr) if !expr.is_empty() => evaluator.value(expr, &state),
            _ => Value::String(String::new()),
        };

        let value = match field.kind {
            FieldKind::Select { allow_multiple, .. } => normalize_select(value, allow_multiple),
            _ => value,
        };

        state.set(field.data_name.clone(), value);
    }

    state
}

fn normalize_select(value: Value, allow_multiple: bool) -> Value {
    match (allow_multiple, value) {
        (true, Value::List(items)) => Value::List(items),
        (true, other) => Value::List(vec![other.to_display_string()]),
        (false, Value::List(items)) => items.into_iter().next().map(Value::String).unwrap_or_default(),
        (false, other) => other,
    }
}

/// Record an answer, returning the one it replaces
pub fn apply_answer(state: &mut State, data_name: &str, value: impl Into<Value>) -> Value {
    let value = value.into();
    log::debug!("answer {} = {:?}", data_name, value);
    state.set(data_name, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(fields: &str) -> Form {
        Form::from_json(&format!(
            r#"{{"title": "t", "sections": [{{"id": "s", "title": "S", "fields": [{}]}}]}}"#,
            fields
        ))
        .unwrap()
    }

    #[test]
    fn test_defaults_see_earlier_fields() {
        let form = form(
            r#"
            {"id": "a", "type": "text", "dataName": "first", "defaultValue": "Jane"},
            {"id": "b", "type": "text", "dataName": "greeting", "defaultValue": "'Hi ' + {first}"},
            {"id": "c", "type": "text", "dataName": "early", "defaultValue": "{later}"},
            {"id": "d", "type": "text", "dataName": "later", "defaultValue": "x"}
            "#,
        );
        let state = create_form_state(&form);
        assert_eq!(state.get("first"), &Value::from("Jane"));
        assert_eq!(state.get("greeting"), &Value::from("Hi Jane"));
        assert!(state.get("early").is_absent());
        assert_eq!(state.get("later"), &Value::from("x"));
    }

    #[test]
    fn test_missing_default_is_empty_string() {
        let form = form(r#"{"id": "a", "type": "date", "dataName": "dob"}"#);
        let state = create_form_state(&form);
        assert_eq!(state.get("dob"), &Value::from(""));
        assert!(state.contains_key("dob"));
    }

    #[test]
    fn test_select_normalization() {
        let form = form(
            r#"
            {"id": "a", "type": "select", "dataName": "many", "allowMultiple": true, "defaultValue": "red"},
            {"id": "b", "type": "select", "dataName": "one", "allowMultiple": false, "defaultValue": "blue"}
            "#,
        );
        let state = create_form_state(&form);
        assert_eq!(state.get("many"), &Value::from(vec!["red"]));
        assert_eq!(state.get("one"), &Value::from("blue"));

        assert_eq!(
            normalize_select(Value::from(vec!["x", "y"]), false),
            Value::from("x")
        );
        assert!(normalize_select(Value::List(vec![]), false).is_absent());
        assert_eq!(
            normalize_select(Value::from(vec!["x", "y"]), true),
            Value::from(vec!["x", "y"])
        );
    }

    #[test]
    fn test_apply_answer() {
        let mut state = State::new();
        assert!(apply_answer(&mut state, "a", "1").is_absent());
        assert_eq!(apply_answer(&mut state, "a", vec!["x"]), Value::from("1"));
        assert_eq!(state.get("a"), &Value::from(vec!["x"]));
    }
}
