//! Lexers (tokenizers) for the two form expression languages.
//!
//! Both lexers are permissive: input they cannot make sense of is skipped and
//! recorded as an [`Anomaly`] rather than reported as an error. The shared
//! [`Scanner`] does the character bookkeeping for both of them.

pub mod condition;
pub mod expression;
pub mod token;

use token::SourceLocation;

pub use condition::ConditionLexer;
pub use expression::ExpressionLexer;

/// What the lexer skipped over
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyKind {
    /// A bare word that is not a keyword of the language
    UnknownWord(String),
    /// A character that cannot start any token
    UnexpectedCharacter(char),
    /// A string literal still open at end of input
    UnterminatedString,
    /// A `{` still open at end of input
    UnterminatedVariable,
}

/// A recorded lexical anomaly with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub location: SourceLocation,
}

/// Character cursor with line/column tracking
pub(crate) struct Scanner<'a> {
    /// Source text being lexed
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    /// Current position in bytes
    position: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Start position of current token
    token_start: usize,
    token_start_line: usize,
    token_start_column: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            line: 1,
            column: 1,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Peek at the current character without consuming
    pub(crate) fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Peek at a character at offset from current position
    pub(crate) fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }

    /// Advance to the next character
    pub(crate) fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.position = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Mark the current position as the start of a token
    pub(crate) fn start_token(&mut self) {
        self.token_start = self.position;
        self.token_start_line = self.line;
        self.token_start_column = self.column;
    }

    /// Location from the token start to the current position
    pub(crate) fn token_location(&self) -> SourceLocation {
        SourceLocation::new(
            self.token_start_line,
            self.token_start_column,
            self.token_start,
            self.position - self.token_start,
        )
    }

    pub(crate) fn anomaly(&self, kind: AnomalyKind) -> Anomaly {
        Anomaly {
            kind,
            location: self.token_location(),
        }
    }

    /// Lex `{...}` and return the trimmed name; `false` when no `}` was found
    pub(crate) fn lex_variable(&mut self) -> (String, bool) {
        self.advance(); // {
        let start = self.position;

        while let Some(ch) = self.peek_char() {
            if ch == '}' {
                let name = self.source[start..self.position].trim().to_string();
                self.advance();
                return (name, true);
            }
            self.advance();
        }

        (self.source[start..].trim().to_string(), false)
    }

    /// Lex a quoted literal. The quote is escaped by doubling it or by a
    /// preceding backslash. Returns `false` when the literal never closes.
    pub(crate) fn lex_quoted(&mut self, quote: char) -> (String, bool) {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.peek_char() {
                None => return (value, false),
                Some(ch) if ch == quote => {
                    self.advance();
                    if self.peek_char() == Some(quote) {
                        self.advance();
                        value.push(quote);
                    } else {
                        return (value, true);
                    }
                }
                Some('\\') if self.peek_char_at(1) == Some(quote) => {
                    self.advance();
                    self.advance();
                    value.push(quote);
                }
                Some(ch) => {
                    self.advance();
                    value.push(ch);
                }
            }
        }
    }

    /// Consume a run of characters accepted by `is_word_char`
    pub(crate) fn lex_word(&mut self, is_word_char: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while matches!(self.peek_char(), Some(ch) if is_word_char(ch)) {
            self.advance();
        }
        let source = self.source;
        &source[start..self.position]
    }
}
