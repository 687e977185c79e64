use wasm_bindgen::prelude::*;

use formexpr::{ExprError, Form, State};

#[wasm_bindgen]
pub struct EvalResult {
    output: String,
    error: String,
    success: bool,
}

#[wasm_bindgen]
impl EvalResult {
    #[wasm_bindgen(getter)]
    pub fn output(&self) -> String {
        self.output.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> String {
        self.error.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }
}

impl EvalResult {
    fn ok(output: serde_json::Value) -> Self {
        Self {
            output: output.to_string(),
            error: String::new(),
            success: true,
        }
    }

    fn err(e: ExprError) -> Self {
        Self {
            output: String::new(),
            error: e.message(),
            success: false,
        }
    }
}

/// Malformed or empty state JSON is an empty state
fn parse_state(state_json: &str) -> State {
    if state_json.trim().is_empty() {
        return State::new();
    }
    State::from_json(state_json).unwrap_or_default()
}

/// Evaluate a visibility/required/read-only condition.
///
/// - `expr`: condition text, e.g. `{status} icontains 'yes'`
/// - `state_json`: JSON object of current answers
#[wasm_bindgen]
pub fn evaluate_condition(expr: &str, state_json: &str) -> bool {
    formexpr::evaluate_condition(expr, &parse_state(state_json))
}

/// Evaluate a default-value expression. `output` is the JSON result
/// (`null` when absent).
#[wasm_bindgen]
pub fn evaluate_value(expr: &str, state_json: &str) -> EvalResult {
    let value = formexpr::evaluate_value_expression(expr, &parse_state(state_json));
    EvalResult::ok(value.to_serde_json())
}

/// Seed the initial state of a form from its default values
#[wasm_bindgen]
pub fn create_form_state(form_json: &str) -> EvalResult {
    match Form::from_json(form_json) {
        Ok(form) => EvalResult::ok(formexpr::create_form_state(&form).to_json()),
        Err(e) => EvalResult::err(e),
    }
}

/// Data names of the visible fields of one section, as a JSON array
#[wasm_bindgen]
pub fn visible_fields(form_json: &str, section: usize, state_json: &str) -> EvalResult {
    let form = match Form::from_json(form_json) {
        Ok(form) => form,
        Err(e) => return EvalResult::err(e),
    };

    let Some(section) = form.sections.get(section) else {
        return EvalResult::err(ExprError::invalid_form(format!(
            "no section {} (the form has {})",
            section,
            form.sections.len()
        )));
    };

    let state = parse_state(state_json);
    let names: Vec<serde_json::Value> = formexpr::visible_fields(section, &state)
        .into_iter()
        .map(|field| serde_json::Value::String(field.data_name.clone()))
        .collect();
    EvalResult::ok(serde_json::Value::Array(names))
}
