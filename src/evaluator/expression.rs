//! Evaluation of parsed value expressions.

use super::coerce::loosely_equal;
use super::value::{State, Value};
use crate::parser::ast::{Expr, Test};

/// Evaluate a value expression tree. Only the taken branch of an `if` is
/// evaluated.
pub fn eval_expr(expr: &Expr, state: &State) -> Value {
    match expr {
        Expr::String(s) => Value::String(s.clone()),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Var(path) => state.resolve(path).clone(),
        Expr::Concat(parts) => Value::String(
            parts
                .iter()
                .map(|part| eval_expr(part, state).to_display_string())
                .collect(),
        ),
        Expr::If {
            test,
            then_branch,
            else_branch,
        } => {
            if eval_test(test, state) {
                eval_expr(then_branch, state)
            } else {
                eval_expr(else_branch, state)
            }
        }
        Expr::ReplaceAll {
            value,
            search,
            replacement,
        } => {
            let value = eval_expr(value, state).to_display_string();
            let search = eval_expr(search, state).to_display_string();
            if search.is_empty() {
                return Value::String(value);
            }
            let replacement = eval_expr(replacement, state).to_display_string();
            Value::String(value.replace(&search, &replacement))
        }
    }
}

pub fn eval_test(test: &Test, state: &State) -> bool {
    match test {
        Test::Literal(b) => *b,
        Test::Is(left, right) => loosely_equal(&eval_expr(left, state), &eval_expr(right, state)),
    }
}
