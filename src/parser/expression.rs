//! Parser for the value expression language.
//!
//! ```text
//! expr     := concat
//! concat   := term ('+' term)*
//! term     := STRING | BOOL | VAR | call | '(' concat ')'
//! call     := 'if' '(' test ',' concat ',' concat ')'
//!           | 'replaceAll' '(' concat ',' concat ',' concat ')'
//! test     := BOOL | operand 'is' operand
//! operand  := STRING | BOOL | VAR | replaceAll-call | '(' concat ')'
//! ```
//!
//! Function names are matched case-insensitively.

use super::ast::{Expr, Test, VarPath};
use super::Cursor;
use crate::errors::{ExprError, ExprResult};
use crate::lexer::token::{ExprToken, ExprTokenKind};

/// Functions the value language knows about
pub const KNOWN_FUNCTIONS: &[&str] = &["if", "replaceAll"];

/// Parser for default-value expressions
pub struct ExpressionParser {
    cursor: Cursor<ExprTokenKind>,
}

impl ExpressionParser {
    pub fn new(tokens: Vec<ExprToken>, source: impl Into<String>) -> Self {
        Self {
            cursor: Cursor::new(tokens, source),
        }
    }

    /// Parse the whole token stream as one expression
    pub fn parse(&mut self) -> ExprResult<Expr> {
        let expr = self.parse_concat()?;

        if !self.cursor.is_at_end() {
            return Err(self
                .cursor
                .error_unexpected("'+' or end of input", "join values with '+'"));
        }

        Ok(expr)
    }

    fn parse_concat(&mut self) -> ExprResult<Expr> {
        let mut parts = vec![self.parse_term()?];

        while self.cursor.check(&ExprTokenKind::Plus) {
            self.cursor.advance();
            parts.push(self.parse_term()?);
        }

        if parts.len() == 1 {
            Ok(parts.remove(0))
        } else {
            Ok(Expr::Concat(parts))
        }
    }

    fn parse_term(&mut self) -> ExprResult<Expr> {
        if let ExprTokenKind::Ident(name) = &self.cursor.current().kind {
            let name = name.clone();
            return match name.to_lowercase().as_str() {
                "if" => self.nested(Self::parse_if),
                "replaceall" => self.nested(Self::parse_replace_all),
                _ => Err(self.unknown_function(&name)),
            };
        }
        self.parse_simple("a string, boolean, variable, function call or '('")
    }

    /// Literals, variables and parenthesized groups
    fn parse_simple(&mut self, expected: &str) -> ExprResult<Expr> {
        if self.cursor.check(&ExprTokenKind::LeftParen) {
            return self.nested(Self::parse_group);
        }

        let expr = match &self.cursor.current().kind {
            ExprTokenKind::String(s) => Expr::String(s.clone()),
            ExprTokenKind::Bool(b) => Expr::Bool(*b),
            ExprTokenKind::Var(path) => Expr::Var(VarPath::parse(path)),
            _ => {
                return Err(self
                    .cursor
                    .error_unexpected(expected, "values are quoted strings, {fields} or function calls"))
            }
        };
        self.cursor.advance();
        Ok(expr)
    }

    fn parse_group(&mut self) -> ExprResult<Expr> {
        self.cursor.advance(); // (
        let inner = self.parse_concat()?;
        self.cursor.close_paren(&ExprTokenKind::RightParen)?;
        Ok(inner)
    }

    /// `if(test, then, otherwise)`
    fn parse_if(&mut self) -> ExprResult<Expr> {
        self.cursor.advance(); // if
        self.cursor
            .expect(&ExprTokenKind::LeftParen, "call it like if(test, then, otherwise)")?;

        let test = self.parse_test()?;
        self.expect_comma("if takes a test, a then value and an otherwise value")?;
        let then_branch = self.parse_concat()?;
        self.expect_comma("if takes a test, a then value and an otherwise value")?;
        let else_branch = self.parse_concat()?;
        self.cursor.close_paren(&ExprTokenKind::RightParen)?;

        Ok(Expr::If {
            test: Box::new(test),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `replaceAll(value, search, replacement)`
    fn parse_replace_all(&mut self) -> ExprResult<Expr> {
        self.cursor.advance(); // replaceAll
        self.cursor.expect(
            &ExprTokenKind::LeftParen,
            "call it like replaceAll(value, search, replacement)",
        )?;

        let value = self.parse_concat()?;
        self.expect_comma("replaceAll takes a value, a search string and a replacement")?;
        let search = self.parse_concat()?;
        self.expect_comma("replaceAll takes a value, a search string and a replacement")?;
        let replacement = self.parse_concat()?;
        self.cursor.close_paren(&ExprTokenKind::RightParen)?;

        Ok(Expr::ReplaceAll {
            value: Box::new(value),
            search: Box::new(search),
            replacement: Box::new(replacement),
        })
    }

    /// A bare boolean is the test itself; anything else is `left is right`
    fn parse_test(&mut self) -> ExprResult<Test> {
        if let ExprTokenKind::Bool(b) = self.cursor.current().kind {
            self.cursor.advance();
            return Ok(Test::Literal(b));
        }

        let left = self.parse_operand()?;
        self.cursor
            .expect(&ExprTokenKind::Is, "compare two values with 'is', e.g. {a} is 'yes'")?;
        let right = self.parse_operand()?;
        Ok(Test::Is(left, right))
    }

    fn parse_operand(&mut self) -> ExprResult<Expr> {
        if let ExprTokenKind::Ident(name) = &self.cursor.current().kind {
            let name = name.clone();
            return match name.to_lowercase().as_str() {
                "replaceall" => self.nested(Self::parse_replace_all),
                "if" => Err(self.cursor.error_unexpected(
                    "an operand",
                    "if cannot be compared directly; wrap the values instead",
                )),
                _ => Err(self.unknown_function(&name)),
            };
        }
        self.parse_simple("an operand")
    }

    fn expect_comma(&mut self, help: &str) -> ExprResult<()> {
        self.cursor.expect(&ExprTokenKind::Comma, help)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ExprResult<T>) -> ExprResult<T> {
        self.cursor.enter()?;
        let result = f(self);
        self.cursor.leave();
        result
    }

    fn unknown_function(&self, name: &str) -> ExprError {
        ExprError::unknown_function(
            self.cursor.source(),
            &self.cursor.current_location(),
            name,
            KNOWN_FUNCTIONS,
        )
    }
}
