//! Recursive descent parsers for the condition and value expression languages.
//!
//! Both parsers are LL(1) over the token streams produced by [`crate::lexer`].
//! They require the whole input to be consumed: anything left over after a
//! complete expression is an error. The one leniency is a missing closing `)`
//! at end of input, which is tolerated.

pub mod ast;
pub mod condition;
pub mod expression;

use crate::errors::{ExprError, ExprResult};
use crate::lexer::token::{ConditionTokenKind, ExprTokenKind, SourceLocation, Token};
use crate::lexer::condition::KEYWORDS;
use crate::lexer::{Anomaly, ConditionLexer, ExpressionLexer};
use ast::{Condition, Expr};
use expression::KNOWN_FUNCTIONS;

pub use condition::ConditionParser;
pub use expression::ExpressionParser;

/// Maximum nesting of parentheses and function calls.
/// Expressions are one-liners in form definitions; anything deeper is
/// almost certainly generated garbage.
pub const MAX_PARSE_DEPTH: usize = 64;

/// A parse tree plus whatever the lexer skipped to produce it
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub tree: T,
    pub anomalies: Vec<Anomaly>,
}

/// Lex and parse a condition. With `strict`, the first thing the lexer had
/// to skip is an error.
pub fn parse_condition(source: &str, strict: bool) -> ExprResult<Parsed<Condition>> {
    let mut lexer = ConditionLexer::new(source);
    let tokens = lexer.tokenize();
    log::trace!("condition tokens: {:?}", tokens);
    let anomalies = lexer.take_anomalies();
    if strict {
        reject_anomalies(source, &anomalies, KEYWORDS)?;
    }
    let tree = ConditionParser::new(tokens, source).parse()?;
    Ok(Parsed { tree, anomalies })
}

/// Lex and parse a value expression. With `strict`, the first thing the
/// lexer had to skip is an error.
pub fn parse_value_expression(source: &str, strict: bool) -> ExprResult<Parsed<Expr>> {
    let mut lexer = ExpressionLexer::new(source);
    let tokens = lexer.tokenize();
    log::trace!("expression tokens: {:?}", tokens);
    let anomalies = lexer.take_anomalies();
    if strict {
        reject_anomalies(source, &anomalies, KNOWN_FUNCTIONS)?;
    }
    let tree = ExpressionParser::new(tokens, source).parse()?;
    Ok(Parsed { tree, anomalies })
}

fn reject_anomalies(source: &str, anomalies: &[Anomaly], candidates: &[&str]) -> ExprResult<()> {
    match anomalies.first() {
        Some(anomaly) => Err(ExprError::unrecognized_input(source, anomaly, candidates)),
        None => Ok(()),
    }
}

/// Token kinds the shared cursor can walk over
pub(crate) trait TokenKind: std::fmt::Display {
    fn eof() -> Self;
    fn is_eof(&self) -> bool;
}

impl TokenKind for ConditionTokenKind {
    fn eof() -> Self {
        ConditionTokenKind::Eof
    }

    fn is_eof(&self) -> bool {
        matches!(self, ConditionTokenKind::Eof)
    }
}

impl TokenKind for ExprTokenKind {
    fn eof() -> Self {
        ExprTokenKind::Eof
    }

    fn is_eof(&self) -> bool {
        matches!(self, ExprTokenKind::Eof)
    }
}

/// Location just past the end of `source`
fn end_of(source: &str) -> SourceLocation {
    let line = source.matches('\n').count() + 1;
    let last_line = source.rsplit('\n').next().unwrap_or_default();
    SourceLocation::new(line, last_line.chars().count() + 1, source.len(), 0)
}

/// Token position, nesting depth and error helpers shared by both parsers
pub(crate) struct Cursor<K> {
    tokens: Vec<Token<K>>,
    pos: usize,
    source: String,
    /// Current nesting depth
    depth: usize,
}

impl<K: TokenKind> Cursor<K> {
    /// A stream that does not end in `Eof` gets one appended
    pub(crate) fn new(mut tokens: Vec<Token<K>>, source: impl Into<String>) -> Self {
        let source = source.into();
        if !tokens.last().is_some_and(|t| t.kind.is_eof()) {
            tokens.push(Token::new(K::eof(), end_of(&source)));
        }
        Self {
            tokens,
            pos: 0,
            source,
            depth: 0,
        }
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Get current token
    pub(crate) fn current(&self) -> &Token<K> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current().location.clone()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind.is_eof()
    }

    /// Check if current token matches expected kind
    pub(crate) fn check(&self, kind: &K) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Expect a specific token kind
    pub(crate) fn expect(&mut self, kind: &K, help: &str) -> ExprResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_unexpected(&format!("'{}'", kind), help))
        }
    }

    /// Consume a closing `)` if present; a missing one at end of input is fine
    pub(crate) fn close_paren(&mut self, right_paren: &K) -> ExprResult<()> {
        if self.check(right_paren) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            log::debug!("tolerating missing ')' at end of {:?}", self.source);
            Ok(())
        } else {
            Err(self.error_unexpected("')'", "close the parenthesis"))
        }
    }

    /// Go one nesting level deeper, failing past [`MAX_PARSE_DEPTH`].
    /// Every successful `enter` must be paired with a `leave`.
    pub(crate) fn enter(&mut self) -> ExprResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ExprError::recursion_limit(
                self.source.clone(),
                &self.current_location(),
                MAX_PARSE_DEPTH,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Create an "unexpected token" error
    pub(crate) fn error_unexpected(&self, expected: &str, help: &str) -> ExprError {
        ExprError::unexpected_token(
            self.source.clone(),
            &self.current_location(),
            expected,
            format!("{}", self.current().kind),
            help,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_stream_is_an_error() {
        let err = ConditionParser::new(Vec::new(), "").parse().unwrap_err();
        assert_eq!(
            err.message(),
            "unexpected token: expected variable reference, found <eof>"
        );

        assert!(ExpressionParser::new(Vec::new(), "").parse().is_err());
    }

    #[test]
    fn test_missing_eof_is_appended() {
        let source = "{a} equals 'x'";
        let mut tokens = ConditionLexer::new(source).tokenize();
        tokens.pop();
        let tree = ConditionParser::new(tokens, source).parse().unwrap();
        assert_eq!(tree.to_string(), "{a} equals 'x'");

        let source = "'Hi ' + {first}";
        let mut tokens = ExpressionLexer::new(source).tokenize();
        tokens.pop();
        let tree = ExpressionParser::new(tokens, source).parse().unwrap();
        assert_eq!(tree.to_string(), "'Hi ' + {first}");
    }

    #[test]
    fn test_end_of_source_location() {
        assert_eq!(end_of(""), SourceLocation::new(1, 1, 0, 0));
        assert_eq!(end_of("ab\ncd"), SourceLocation::new(2, 3, 5, 0));
    }

    #[test]
    fn test_parse_condition_collects_anomalies() {
        let parsed = parse_condition("{a} equals 'x' ;", false).unwrap();
        assert_eq!(parsed.tree.to_string(), "{a} equals 'x'");
        assert_eq!(parsed.anomalies.len(), 1);
    }

    #[test]
    fn test_strict_rejects_before_parsing() {
        let err = parse_condition("{a} equal 'x'", true).unwrap_err();
        assert!(matches!(err, ExprError::UnrecognizedInput { .. }));

        let err = parse_condition("{a} equal 'x'", false).unwrap_err();
        assert!(matches!(err, ExprError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_parse_value_expression_clean() {
        let parsed = parse_value_expression("'Hi ' + {first}", false).unwrap();
        assert_eq!(parsed.tree.to_string(), "'Hi ' + {first}");
        assert!(parsed.anomalies.is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}'x'{}", "(".repeat(MAX_PARSE_DEPTH + 1), ")".repeat(MAX_PARSE_DEPTH + 1));
        let err = parse_value_expression(&deep, false).unwrap_err();
        assert!(matches!(err, ExprError::RecursionLimitExceeded { .. }));

        let ok = format!("{}'x'{}", "(".repeat(MAX_PARSE_DEPTH), ")".repeat(MAX_PARSE_DEPTH));
        assert!(parse_value_expression(&ok, false).is_ok());
    }

    #[test]
    fn test_condition_depth_limit() {
        let deep = format!(
            "{}{{a}} equals 'x'{}",
            "(".repeat(MAX_PARSE_DEPTH + 1),
            ")".repeat(MAX_PARSE_DEPTH + 1)
        );
        assert!(matches!(
            parse_condition(&deep, false),
            Err(ExprError::RecursionLimitExceeded { .. })
        ));
    }
}
