use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of the expression
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Create a span from this location to another
    pub fn span_to(&self, other: &SourceLocation) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            offset: self.offset,
            length: (other.offset + other.length).saturating_sub(self.offset),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<expr>:{}:{}", self.line, self.column)
    }
}

/// Tokens of the condition language (`{a} icontains 'x' and ...`)
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTokenKind {
    /// `{name}`, trimmed
    Var(String),
    /// `'text'`
    String(String),
    /// Operator word, lowercased (`icontains`, `==`, ...)
    Op(String),
    And,
    Or,
    LeftParen,
    RightParen,
    Eof,
}

impl fmt::Display for ConditionTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionTokenKind::Var(name) => write!(f, "{{{}}}", name),
            ConditionTokenKind::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            ConditionTokenKind::Op(op) => write!(f, "{}", op),
            ConditionTokenKind::And => write!(f, "and"),
            ConditionTokenKind::Or => write!(f, "or"),
            ConditionTokenKind::LeftParen => write!(f, "("),
            ConditionTokenKind::RightParen => write!(f, ")"),
            ConditionTokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

/// Tokens of the value expression language (`'Hi ' + {first}`, `if(...)`)
#[derive(Debug, Clone, PartialEq)]
pub enum ExprTokenKind {
    /// `{path/to:accessor}`, trimmed
    Var(String),
    /// `'text'` or `"text"`
    String(String),
    /// `true` / `false`, any case
    Bool(bool),
    /// Bare identifier; only function names are meaningful to the parser
    Ident(String),
    /// `is`, any case
    Is,
    Comma,
    Plus,
    LeftParen,
    RightParen,
    Eof,
}

impl fmt::Display for ExprTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprTokenKind::Var(path) => write!(f, "{{{}}}", path),
            ExprTokenKind::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            ExprTokenKind::Bool(b) => write!(f, "{}", b),
            ExprTokenKind::Ident(name) => write!(f, "{}", name),
            ExprTokenKind::Is => write!(f, "is"),
            ExprTokenKind::Comma => write!(f, ","),
            ExprTokenKind::Plus => write!(f, "+"),
            ExprTokenKind::LeftParen => write!(f, "("),
            ExprTokenKind::RightParen => write!(f, ")"),
            ExprTokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

/// A token with its location and kind
#[derive(Debug, Clone, PartialEq)]
pub struct Token<K> {
    pub kind: K,
    pub location: SourceLocation,
}

impl<K> Token<K> {
    pub fn new(kind: K, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

impl<K: fmt::Display> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.location)
    }
}

pub type ConditionToken = Token<ConditionTokenKind>;
pub type ExprToken = Token<ExprTokenKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_to() {
        let start = SourceLocation::new(1, 1, 0, 3);
        let end = SourceLocation::new(1, 15, 14, 5);
        let span = start.span_to(&end);
        assert_eq!(span.offset, 0);
        assert_eq!(span.length, 19);
    }

    #[test]
    fn test_string_display_doubles_quotes() {
        let kind = ConditionTokenKind::String("it's".to_string());
        assert_eq!(kind.to_string(), "'it''s'");
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(ExprTokenKind::Plus, SourceLocation::new(1, 7, 6, 1));
        assert_eq!(token.to_string(), "+ at <expr>:1:7");
    }
}
