// Rust 1.93+ triggers false positives on thiserror/miette derive macro fields
#![allow(unused_assignments)]

//! Form Expression Engine
//!
//! Two small languages embedded as strings in form definitions and evaluated
//! against the citizen's current answers:
//!
//! - conditions decide whether a section or field is visible, required or
//!   read-only;
//! - value expressions compute a field's default value.
//!
//! # Example
//!
//! ```text
//! {employment} icontains 'unemployed' and ({age} != '' or {carer} equals 'yes')
//!
//! if({status} is 'unemployed', 'Jobseeker', 'Other')
//! 'Dear ' + {title} + ' ' + replaceAll({surname}, '-', ' ')
//! ```
//!
//! Neither evaluator ever fails: a malformed condition is `false` and a
//! malformed value expression is returned as plain text.

pub mod errors;
pub mod evaluator;
pub mod form;
pub mod lexer;
pub mod parser;

pub use errors::{ExprError, ExprResult, Warning};
pub use evaluator::{
    check_condition, check_value_expression, evaluate_condition, evaluate_value_expression,
    CheckReport, EvalOptions, Evaluator, State, Value,
};
pub use form::{
    apply_answer, create_form_state, field_read_only, field_required, field_visible,
    nearest_visible_section, section_visible, visible_fields, visible_sections, Direction, Field,
    FieldKind, Form, Section,
};
pub use lexer::token::{ConditionTokenKind, ExprTokenKind, SourceLocation, Token};
pub use lexer::{Anomaly, AnomalyKind, ConditionLexer, ExpressionLexer};
pub use parser::ast;
pub use parser::{parse_condition, parse_value_expression, ConditionParser, ExpressionParser};
