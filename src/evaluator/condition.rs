//! Evaluation of parsed conditions.

use super::coerce::{any_contains, any_contains_ignore_case, any_equals_ignore_case};
use super::value::State;
use crate::parser::ast::{CompareOp, Comparison, Condition};

/// Evaluate a condition tree. `and`/`or` short-circuit.
pub fn eval_condition(condition: &Condition, state: &State) -> bool {
    match condition {
        Condition::And(operands) => operands.iter().all(|c| eval_condition(c, state)),
        Condition::Or(operands) => operands.iter().any(|c| eval_condition(c, state)),
        Condition::Compare(comparison) => eval_comparison(comparison, state),
    }
}

/// Variables are looked up by their literal name; condition variables are
/// never paths.
fn eval_comparison(comparison: &Comparison, state: &State) -> bool {
    let actual = state.get(&comparison.variable);
    let expected = comparison.expected.as_str();

    match comparison.op {
        CompareOp::IContains => any_contains_ignore_case(actual, expected),
        CompareOp::NotIContains => !any_contains_ignore_case(actual, expected),
        CompareOp::Contains => any_contains(actual, expected),
        CompareOp::Equals => any_equals_ignore_case(actual, expected),
        CompareOp::NotEquals => !any_equals_ignore_case(actual, expected),
    }
}
