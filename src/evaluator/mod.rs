//! Evaluators for the condition and value expression languages.
//!
//! The public entry points never fail. A condition that cannot be parsed is
//! `false`; a value expression that cannot be parsed comes back as its own
//! text. The `try_*` variants expose the underlying [`ExprError`] instead.

pub mod coerce;
pub mod condition;
pub mod expression;
pub mod value;

use crate::errors::{ExprResult, Warning};
use crate::parser::ast::{Condition, Expr};
use crate::parser::{parse_condition, parse_value_expression, Parsed};

pub use condition::eval_condition;
pub use expression::eval_expr;
pub use value::{State, Value};

/// Evaluation settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Fail on any input the lexer had to skip instead of ignoring it
    pub strict: bool,
}

impl EvalOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// A parsed expression plus the warnings collected while parsing it
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport<T> {
    pub tree: T,
    pub warnings: Vec<Warning>,
}

/// Evaluator for form expressions
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvalOptions,
}

impl Evaluator {
    /// Create a new evaluator with permissive defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// Set whether skipped input fails the whole expression
    pub fn set_strict(&mut self, strict: bool) {
        self.options.strict = strict;
    }

    /// Evaluate a condition; anything malformed is `false`
    pub fn condition(&self, expr: &str, state: &State) -> bool {
        match self.try_condition(expr, state) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("condition {:?} evaluates to false: {}", expr, e.message());
                false
            }
        }
    }

    pub fn try_condition(&self, expr: &str, state: &State) -> ExprResult<bool> {
        let tree = self.parse_condition(expr)?.tree;
        Ok(eval_condition(&tree, state))
    }

    /// Evaluate a default-value expression; anything malformed is returned
    /// as text
    pub fn value(&self, expr: &str, state: &State) -> Value {
        match self.try_value(expr, state) {
            Ok(value) => value,
            Err(e) => {
                let text = passthrough_text(expr);
                log::debug!("value expression {:?} passed through as text: {}", expr, e.message());
                Value::String(text.to_string())
            }
        }
    }

    pub fn try_value(&self, expr: &str, state: &State) -> ExprResult<Value> {
        let tree = self.parse_value(expr)?;
        Ok(top_level(expression::eval_expr(&tree.tree, state)))
    }

    /// Parse a condition and report anything the lexer skipped
    pub fn check_condition(&self, expr: &str) -> ExprResult<CheckReport<Condition>> {
        self.parse_condition(expr).map(report)
    }

    /// Parse a value expression the way [`Evaluator::value`] would, and report
    /// anything the lexer skipped. Plain literals come back as a string node.
    pub fn check_value_expression(&self, expr: &str) -> ExprResult<CheckReport<Expr>> {
        self.parse_value(expr).map(report)
    }

    fn parse_condition(&self, expr: &str) -> ExprResult<Parsed<Condition>> {
        parse_condition(expr, self.options.strict)
    }

    /// Input wrapped in matching quotes is either a whole expression
    /// (`'Hi ' + {a} + '!'`) or a quoted expression (`'if(...)'`). The first
    /// wins unless it is a single literal whose contents parse on their own.
    fn parse_value(&self, expr: &str) -> ExprResult<Parsed<Expr>> {
        let trimmed = expr.trim();

        let Some(inner) = strip_enclosing_quotes(trimmed) else {
            return self.parse_unquoted(trimmed);
        };

        match self.parse_expression_text(trimmed) {
            Ok(literal @ Parsed {
                tree: Expr::String(_),
                ..
            }) => Ok(self.parse_unquoted(inner).unwrap_or(literal)),
            Ok(parsed) => Ok(parsed),
            Err(_) => self.parse_unquoted(inner),
        }
    }

    /// Text with no expression syntax is a plain literal
    fn parse_unquoted(&self, text: &str) -> ExprResult<Parsed<Expr>> {
        if seems_like_plain_literal(text) {
            return Ok(Parsed {
                tree: Expr::String(text.to_string()),
                anomalies: Vec::new(),
            });
        }

        self.parse_expression_text(text)
    }

    fn parse_expression_text(&self, text: &str) -> ExprResult<Parsed<Expr>> {
        parse_value_expression(text, self.options.strict)
    }
}

/// Evaluate a condition with default options. Never fails; malformed input
/// is `false`.
pub fn evaluate_condition(expr: &str, state: &State) -> bool {
    Evaluator::new().condition(expr, state)
}

/// Evaluate a default-value expression with default options. Never fails;
/// malformed input comes back as its own text.
pub fn evaluate_value_expression(expr: &str, state: &State) -> Value {
    Evaluator::new().value(expr, state)
}

pub fn check_condition(expr: &str, options: EvalOptions) -> ExprResult<CheckReport<Condition>> {
    Evaluator::with_options(options).check_condition(expr)
}

pub fn check_value_expression(expr: &str, options: EvalOptions) -> ExprResult<CheckReport<Expr>> {
    Evaluator::with_options(options).check_value_expression(expr)
}

fn report<T>(parsed: Parsed<T>) -> CheckReport<T> {
    CheckReport {
        tree: parsed.tree,
        warnings: parsed.anomalies.iter().map(Warning::from_anomaly).collect(),
    }
}

/// Objects are only meaningful mid-path; a whole expression never yields one
fn top_level(value: Value) -> Value {
    match value {
        Value::Object(_) => Value::Absent,
        other => other,
    }
}

/// Strip one pair of matching outer quotes. A lone quote strips to nothing.
fn strip_enclosing_quotes(s: &str) -> Option<&str> {
    let quote = s.chars().next()?;
    if !matches!(quote, '\'' | '"') || !s.ends_with(quote) {
        return None;
    }
    if s.len() == 1 {
        Some("")
    } else {
        Some(&s[1..s.len() - 1])
    }
}

fn passthrough_text(expr: &str) -> &str {
    let trimmed = expr.trim();
    strip_enclosing_quotes(trimmed).unwrap_or(trimmed)
}

/// Text with none of the expression syntax is returned as-is without parsing
fn seems_like_plain_literal(text: &str) -> bool {
    let s = text.trim();
    if s.is_empty() {
        return true;
    }
    if s.contains(['{', '}', '\'', '"', '+', '(', ')', ',']) {
        return false;
    }
    let lower = s.to_lowercase();
    if lower.starts_with("if(") || lower.starts_with("replaceall(") {
        return false;
    }
    if lower == "true" || lower == "false" {
        return false;
    }
    !s.split_whitespace().any(|word| word.eq_ignore_ascii_case("is"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExprError;
    use pretty_assertions::assert_eq;

    fn state(pairs: &[(&str, &str)]) -> State {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_plain_literal_detection() {
        assert!(seems_like_plain_literal("Hello world"));
        assert!(seems_like_plain_literal(""));
        assert!(seems_like_plain_literal("This island"));
        assert!(!seems_like_plain_literal("it is"));
        assert!(!seems_like_plain_literal("IS"));
        assert!(!seems_like_plain_literal("True"));
        assert!(!seems_like_plain_literal("a, b"));
        assert!(!seems_like_plain_literal("{a}"));
    }

    #[test]
    fn test_strip_enclosing_quotes() {
        assert_eq!(strip_enclosing_quotes("'abc'"), Some("abc"));
        assert_eq!(strip_enclosing_quotes("\"abc\""), Some("abc"));
        assert_eq!(strip_enclosing_quotes("'"), Some(""));
        assert_eq!(strip_enclosing_quotes("'abc\""), None);
        assert_eq!(strip_enclosing_quotes("abc"), None);
        assert_eq!(strip_enclosing_quotes(""), None);
    }

    #[test]
    fn test_condition_fallback_is_false() {
        assert!(!evaluate_condition("{a} icontains", &State::new()));
        assert!(!evaluate_condition("", &State::new()));
        assert!(!evaluate_condition(")(", &State::new()));
    }

    #[test]
    fn test_condition_permissive_vs_strict() {
        let s = state(&[("a", "yes")]);
        let expr = "{a} really equals 'yes'";
        assert!(evaluate_condition(expr, &s));

        let strict = Evaluator::with_options(EvalOptions::strict());
        assert!(!strict.condition(expr, &s));
        match strict.try_condition(expr, &s) {
            Err(ExprError::UnrecognizedInput { text, .. }) => {
                assert_eq!(text, "unknown word 'really'")
            }
            other => panic!("expected UnrecognizedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_suggests_keyword() {
        let strict = Evaluator::with_options(EvalOptions::strict());
        match strict.try_condition("{a} equal 'x'", &State::new()) {
            Err(ExprError::UnrecognizedInput { help, .. }) => {
                assert_eq!(help, "did you mean 'equals'?")
            }
            other => panic!("expected UnrecognizedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_value_quoted_whole_expression() {
        let s = state(&[("first", "Jane")]);
        assert_eq!(
            evaluate_value_expression("'Hi ' + {first} + '!'", &s),
            Value::from("Hi Jane!")
        );
    }

    #[test]
    fn test_value_quoted_call_is_unwrapped() {
        let s = state(&[("a", "x")]);
        assert_eq!(
            evaluate_value_expression("'if({a} is \"x\", \"one\", \"two\")'", &s),
            Value::from("one")
        );
    }

    #[test]
    fn test_value_plain_literal_inside_quotes() {
        assert_eq!(
            evaluate_value_expression("  'Hello world'  ", &State::new()),
            Value::from("Hello world")
        );
        assert_eq!(evaluate_value_expression("'", &State::new()), Value::from(""));
        assert_eq!(
            evaluate_value_expression("'it''s'", &State::new()),
            Value::from("it's")
        );
    }

    #[test]
    fn test_value_passthrough_on_error() {
        assert_eq!(
            evaluate_value_expression("if(", &State::new()),
            Value::from("if(")
        );
        assert_eq!(
            evaluate_value_expression("Mr. O'Brien", &State::new()),
            Value::from("Mr. O'Brien")
        );
        assert_eq!(
            evaluate_value_expression("\"upper({a})\"", &State::new()),
            Value::from("upper({a})")
        );
    }

    #[test]
    fn test_value_strict_mode() {
        let mut evaluator = Evaluator::new();
        assert_eq!(
            evaluator.value("{x} + '!' ;", &State::new()),
            Value::from("!")
        );
        evaluator.set_strict(true);
        assert!(evaluator.try_value("{x} + '!' ;", &State::new()).is_err());
        assert_eq!(
            evaluator.value("{x} + '!' ;", &State::new()),
            Value::from("{x} + '!' ;")
        );
    }

    #[test]
    fn test_value_object_result_is_absent() {
        let s = State::from_json(r#"{"addr": {"line1": "1 High St"}}"#).unwrap();
        assert!(evaluate_value_expression("{addr}", &s).is_absent());
        assert_eq!(
            evaluate_value_expression("{addr/line1}", &s),
            Value::from("1 High St")
        );
    }

    #[test]
    fn test_check_reports_warnings() {
        let report = check_condition("{a} equals 'x' ;", EvalOptions::default()).unwrap();
        assert_eq!(report.tree.to_string(), "{a} equals 'x'");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].message, "ignored unexpected character ';'");
        assert_eq!(report.warnings[0].column, 16);

        assert!(check_condition("{a} equals 'x' ;", EvalOptions::strict()).is_err());
    }

    #[test]
    fn test_check_value_plain_literal() {
        let report = check_value_expression("Hello world", EvalOptions::default()).unwrap();
        assert_eq!(report.tree, Expr::string("Hello world"));
        assert!(report.warnings.is_empty());
    }
}
