//! Tokenizer for the condition language.
//!
//! ```text
//! {employment} icontains 'unemployed' and ({age} != '' or {carer} equals 'yes')
//! ```

use super::token::{ConditionToken, ConditionTokenKind, Token};
use super::{Anomaly, AnomalyKind, Scanner};

/// Operator words, matched case-insensitively
pub const OPERATOR_WORDS: &[&str] = &[
    "icontains",
    "noticontains",
    "contains",
    "equals",
    "notequals",
    "==",
    "!=",
];

/// Every word the condition lexer understands (used for suggestions)
pub const KEYWORDS: &[&str] = &[
    "and",
    "or",
    "icontains",
    "noticontains",
    "contains",
    "equals",
    "notequals",
];

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, '_' | '!' | '=')
}

/// Lexer for the condition language
pub struct ConditionLexer<'a> {
    scanner: Scanner<'a>,
    /// Input skipped over while tokenizing
    anomalies: Vec<Anomaly>,
}

impl<'a> ConditionLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            anomalies: Vec::new(),
        }
    }

    /// Get recorded anomalies (available after tokenization)
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Take recorded anomalies (consumes them)
    pub fn take_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    /// Tokenize the entire source. Never fails; the stream always ends in `Eof`.
    pub fn tokenize(&mut self) -> Vec<ConditionToken> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == ConditionTokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token, skipping anything unrecognized
    pub fn next_token(&mut self) -> ConditionToken {
        loop {
            self.scanner.skip_whitespace();
            self.scanner.start_token();

            let Some(ch) = self.scanner.peek_char() else {
                return self.make_token(ConditionTokenKind::Eof);
            };

            match ch {
                '{' => {
                    let (name, closed) = self.scanner.lex_variable();
                    if !closed {
                        self.record(AnomalyKind::UnterminatedVariable);
                    }
                    return self.make_token(ConditionTokenKind::Var(name));
                }
                '\'' => {
                    let (value, closed) = self.scanner.lex_quoted('\'');
                    if !closed {
                        self.record(AnomalyKind::UnterminatedString);
                    }
                    return self.make_token(ConditionTokenKind::String(value));
                }
                '(' => {
                    self.scanner.advance();
                    return self.make_token(ConditionTokenKind::LeftParen);
                }
                ')' => {
                    self.scanner.advance();
                    return self.make_token(ConditionTokenKind::RightParen);
                }
                ch if is_word_char(ch) => {
                    let word = self.scanner.lex_word(is_word_char).to_lowercase();
                    let kind = match word.as_str() {
                        "and" => Some(ConditionTokenKind::And),
                        "or" => Some(ConditionTokenKind::Or),
                        op if OPERATOR_WORDS.contains(&op) => {
                            Some(ConditionTokenKind::Op(op.to_string()))
                        }
                        _ => None,
                    };
                    match kind {
                        Some(kind) => return self.make_token(kind),
                        None => self.record(AnomalyKind::UnknownWord(word)),
                    }
                }
                _ => {
                    self.scanner.advance();
                    self.record(AnomalyKind::UnexpectedCharacter(ch));
                }
            }
        }
    }

    fn record(&mut self, kind: AnomalyKind) {
        log::trace!("condition lexer skipped {:?}", kind);
        self.anomalies.push(self.scanner.anomaly(kind));
    }

    fn make_token(&self, kind: ConditionTokenKind) -> ConditionToken {
        Token::new(kind, self.scanner.token_location())
    }
}
