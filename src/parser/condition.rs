//! Parser for the condition language.
//!
//! ```text
//! condition  := or_expr
//! or_expr    := and_expr ('or' and_expr)*
//! and_expr   := primary ('and' primary)*
//! primary    := '(' or_expr ')' | comparison
//! comparison := VAR OP STRING
//! ```
//!
//! `and` binds tighter than `or`. A run of the same connective becomes one
//! flat node, so only parentheses nest.

use super::ast::{CompareOp, Comparison, Condition};
use super::Cursor;
use crate::errors::ExprResult;
use crate::lexer::token::{ConditionToken, ConditionTokenKind};

/// Parser for visibility/required/read-only conditions
pub struct ConditionParser {
    cursor: Cursor<ConditionTokenKind>,
}

impl ConditionParser {
    pub fn new(tokens: Vec<ConditionToken>, source: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(tokens, source),
        }
    }

    /// Parse the whole token stream as one condition
    pub fn parse(&mut self) -> ExprResult<Condition> {
        let condition = self.parse_or()?;

        if !self.cursor.is_at_end() {
            return Err(self.cursor.error_unexpected(
                "'and', 'or' or end of input",
                "join comparisons with 'and' or 'or'",
            ));
        }

        Ok(condition)
    }

    fn parse_or(&mut self) -> ExprResult<Condition> {
        let mut operands = vec![self.parse_and()?];

        while self.cursor.check(&ConditionTokenKind::Or) {
            self.cursor.advance();
            operands.push(self.parse_and()?);
        }

        Ok(Condition::any(operands))
    }

    fn parse_and(&mut self) -> ExprResult<Condition> {
        let mut operands = vec![self.parse_primary()?];

        while self.cursor.check(&ConditionTokenKind::And) {
            self.cursor.advance();
            operands.push(self.parse_primary()?);
        }

        Ok(Condition::all(operands))
    }

    fn parse_primary(&mut self) -> ExprResult<Condition> {
        if !self.cursor.check(&ConditionTokenKind::LeftParen) {
            return self.parse_comparison();
        }

        self.cursor.enter()?;
        self.cursor.advance();
        let inner = self.parse_or();
        self.cursor.leave();
        let inner = inner?;
        self.cursor.close_paren(&ConditionTokenKind::RightParen)?;
        Ok(inner)
    }

    fn parse_comparison(&mut self) -> ExprResult<Condition> {
        let variable = match &self.cursor.current().kind {
            ConditionTokenKind::Var(name) => name.clone(),
            _ => {
                return Err(self.cursor.error_unexpected(
                    "variable reference",
                    "a comparison starts with a field reference like {fieldName}",
                ))
            }
        };
        self.cursor.advance();

        let op = match &self.cursor.current().kind {
            ConditionTokenKind::Op(word) => CompareOp::parse(word),
            _ => None,
        };
        let Some(op) = op else {
            return Err(self.cursor.error_unexpected(
                "comparison operator",
                "use icontains, noticontains, contains, equals (==) or notequals (!=)",
            ));
        };
        self.cursor.advance();

        let expected = match &self.cursor.current().kind {
            ConditionTokenKind::String(s) => s.clone(),
            _ => {
                return Err(self.cursor.error_unexpected(
                    "string literal",
                    "compare against a single-quoted value like 'yes'",
                ))
            }
        };
        self.cursor.advance();

        Ok(Condition::Compare(Comparison {
            variable,
            op,
            expected,
        }))
    }
}
