//! Tokenizer for the value expression language.
//!
//! ```text
//! if({status} is 'unemployed', 'Jobseeker', 'Other')
//! replaceAll({address:display}, ',', ' ') + ' (' + {postcode} + ')'
//! ```

use super::token::{ExprToken, ExprTokenKind, Token};
use super::{Anomaly, AnomalyKind, Scanner};

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Lexer for the value expression language
pub struct ExpressionLexer<'a> {
    scanner: Scanner<'a>,
    /// Input skipped over while tokenizing
    anomalies: Vec<Anomaly>,
}

impl<'a> ExpressionLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            anomalies: Vec::new(),
        }
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn take_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    /// Tokenize the entire source. Never fails; the stream always ends in `Eof`.
    pub fn tokenize(&mut self) -> Vec<ExprToken> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == ExprTokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    pub fn next_token(&mut self) -> ExprToken {
        loop {
            self.scanner.skip_whitespace();
            self.scanner.start_token();

            let Some(ch) = self.scanner.peek_char() else {
                return self.make_token(ExprTokenKind::Eof);
            };

            let kind = match ch {
                '{' => {
                    let (path, closed) = self.scanner.lex_variable();
                    if !closed {
                        self.record(AnomalyKind::UnterminatedVariable);
                    }
                    ExprTokenKind::Var(path)
                }
                '\'' | '"' => {
                    let (value, closed) = self.scanner.lex_quoted(ch);
                    if !closed {
                        self.record(AnomalyKind::UnterminatedString);
                    }
                    ExprTokenKind::String(value)
                }
                ',' | '+' | '(' | ')' => {
                    self.scanner.advance();
                    match ch {
                        ',' => ExprTokenKind::Comma,
                        '+' => ExprTokenKind::Plus,
                        '(' => ExprTokenKind::LeftParen,
                        _ => ExprTokenKind::RightParen,
                    }
                }
                ch if is_identifier_start(ch) => {
                    let word = self.scanner.lex_word(is_identifier_char);
                    match word.to_lowercase().as_str() {
                        "true" => ExprTokenKind::Bool(true),
                        "false" => ExprTokenKind::Bool(false),
                        "is" => ExprTokenKind::Is,
                        _ => ExprTokenKind::Ident(word.to_string()),
                    }
                }
                _ => {
                    self.scanner.advance();
                    self.record(AnomalyKind::UnexpectedCharacter(ch));
                    continue;
                }
            };

            return self.make_token(kind);
        }
    }

    fn record(&mut self, kind: AnomalyKind) {
        log::trace!("expression lexer skipped {:?}", kind);
        self.anomalies.push(self.scanner.anomaly(kind));
    }

    fn make_token(&self, kind: ExprTokenKind) -> ExprToken {
        Token::new(kind, self.scanner.token_location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> Vec<ExprTokenKind> {
        ExpressionLexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn string(s: &str) -> ExprTokenKind {
        ExprTokenKind::String(s.to_string())
    }

    #[test]
    fn test_empty() {
        assert_eq!(lex(""), vec![ExprTokenKind::Eof]);
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            lex("'Hi ' + {first} + \"!\""),
            vec![
                string("Hi "),
                ExprTokenKind::Plus,
                ExprTokenKind::Var("first".to_string()),
                ExprTokenKind::Plus,
                string("!"),
                ExprTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_if_call() {
        assert_eq!(
            lex("IF({a} Is TRUE, 'x', 'y')"),
            vec![
                ExprTokenKind::Ident("IF".to_string()),
                ExprTokenKind::LeftParen,
                ExprTokenKind::Var("a".to_string()),
                ExprTokenKind::Is,
                ExprTokenKind::Bool(true),
                ExprTokenKind::Comma,
                string("x"),
                ExprTokenKind::Comma,
                string("y"),
                ExprTokenKind::RightParen,
                ExprTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_keeps_case() {
        assert_eq!(
            lex("replaceAll_2"),
            vec![
                ExprTokenKind::Ident("replaceAll_2".to_string()),
                ExprTokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_nested_path_variable() {
        assert_eq!(
            lex("{ address / line1 : display }"),
            vec![
                ExprTokenKind::Var("address / line1 : display".to_string()),
                ExprTokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_same_quote_escapes() {
        assert_eq!(
            lex(r#"'it''s' + "say \"hi\"""#),
            vec![
                string("it's"),
                ExprTokenKind::Plus,
                string("say \"hi\""),
                ExprTokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unexpected_characters_are_recorded() {
        let mut lexer = ExpressionLexer::new("'a' & 'b'");
        let kinds: Vec<_> = lexer.tokenize().into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![string("a"), string("b"), ExprTokenKind::Eof]);
        assert_eq!(
            lexer.anomalies()[0].kind,
            AnomalyKind::UnexpectedCharacter('&')
        );
        assert_eq!(lexer.anomalies()[0].location.offset, 4);
    }
}
