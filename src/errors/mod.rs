//! Error types, diagnostics, and result aliases for the expression engine.
//!
//! Internally every parse step returns an [`ExprResult`]. The fail-safe public
//! entry points in [`crate::evaluator`] turn any [`ExprError`] into the safe
//! default, so these values only reach callers through the `try_*` and
//! `check_*` functions.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::lexer::token::SourceLocation;
use crate::lexer::{Anomaly, AnomalyKind};

/// Warning from parsing (non-fatal)
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Warning {
    /// Describe a lexical anomaly the permissive lexer skipped over
    pub fn from_anomaly(anomaly: &Anomaly) -> Self {
        let message = match &anomaly.kind {
            AnomalyKind::UnknownWord(word) => format!("ignored unknown word '{}'", word),
            AnomalyKind::UnexpectedCharacter(ch) => format!("ignored unexpected character '{}'", ch),
            AnomalyKind::UnterminatedString => "string literal is never closed".to_string(),
            AnomalyKind::UnterminatedVariable => "variable reference is never closed".to_string(),
        };
        Self {
            message,
            line: anomaly.location.line,
            column: anomaly.location.column,
        }
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Find the best "did you mean?" suggestion from a list of candidates
pub fn find_similar(name: &str, candidates: &[&str], max_distance: usize) -> Option<String> {
    let name_lower = name.to_lowercase();
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(&name_lower, &candidate.to_lowercase());
        if distance <= max_distance && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Help line for a word that is not part of the language
pub fn suggestion_help(word: &str, candidates: &[&str]) -> String {
    let max_distance = (word.len() / 2).clamp(1, 3);

    if let Some(suggestion) = find_similar(word, candidates, max_distance) {
        format!("did you mean '{}'?", suggestion)
    } else {
        format!("expected one of: {}", candidates.join(", "))
    }
}

/// Main error type for the expression engine
#[derive(Error, Debug, Diagnostic)]
pub enum ExprError {
    #[error("unexpected token")]
    #[diagnostic(code(E0001), help("{help}"))]
    UnexpectedToken {
        #[source_code]
        src: String,
        #[label("expected {expected}, found {found}")]
        span: SourceSpan,
        expected: String,
        found: String,
        help: String,
    },

    #[error("unrecognized input")]
    #[diagnostic(code(E0006), help("{help}"))]
    UnrecognizedInput {
        #[source_code]
        src: String,
        #[label("{text}")]
        span: SourceSpan,
        text: String,
        help: String,
    },

    #[error("unknown function")]
    #[diagnostic(code(E0603), help("{help}"))]
    UnknownFunction {
        #[source_code]
        src: String,
        #[label("'{name}' is not a function")]
        span: SourceSpan,
        name: String,
        help: String,
    },

    #[error("maximum nesting depth exceeded")]
    #[diagnostic(code(E0403), help("{help}"))]
    RecursionLimitExceeded {
        #[source_code]
        src: String,
        #[label("nesting too deep here")]
        span: SourceSpan,
        help: String,
    },

    #[error("invalid form document: {message}")]
    #[diagnostic(code(E0900))]
    InvalidForm { message: String },

    #[error("invalid state: {message}")]
    #[diagnostic(code(E0901))]
    InvalidState { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

impl ExprError {
    /// Create an UnexpectedToken error
    pub fn unexpected_token(
        src: impl Into<String>,
        location: &SourceLocation,
        expected: impl Into<String>,
        found: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        ExprError::UnexpectedToken {
            src: src.into(),
            span: (location.offset, location.length).into(),
            expected: expected.into(),
            found: found.into(),
            help: help.into(),
        }
    }

    /// Create an UnrecognizedInput error from a recorded anomaly
    pub fn unrecognized_input(
        src: impl Into<String>,
        anomaly: &Anomaly,
        candidates: &[&str],
    ) -> Self {
        let (text, help) = match &anomaly.kind {
            AnomalyKind::UnknownWord(word) => (
                format!("unknown word '{}'", word),
                suggestion_help(word, candidates),
            ),
            AnomalyKind::UnexpectedCharacter(ch) => (
                format!("unexpected character '{}'", ch),
                "remove the character or quote it inside a string literal".to_string(),
            ),
            AnomalyKind::UnterminatedString => (
                "unterminated string".to_string(),
                "add the closing quote".to_string(),
            ),
            AnomalyKind::UnterminatedVariable => (
                "unterminated variable".to_string(),
                "add the closing '}'".to_string(),
            ),
        };
        ExprError::UnrecognizedInput {
            src: src.into(),
            span: (anomaly.location.offset, anomaly.location.length).into(),
            text,
            help,
        }
    }

    /// Create an UnknownFunction error
    pub fn unknown_function(
        src: impl Into<String>,
        location: &SourceLocation,
        name: impl Into<String>,
        known: &[&str],
    ) -> Self {
        let name = name.into();
        let help = suggestion_help(&name, known);
        ExprError::UnknownFunction {
            src: src.into(),
            span: (location.offset, location.length).into(),
            name,
            help,
        }
    }

    /// Create a RecursionLimitExceeded error
    pub fn recursion_limit(src: impl Into<String>, location: &SourceLocation, max: usize) -> Self {
        ExprError::RecursionLimitExceeded {
            src: src.into(),
            span: (location.offset, location.length).into(),
            help: format!("nesting exceeds the maximum depth of {}", max),
        }
    }

    /// Create an InvalidForm error
    pub fn invalid_form(message: impl Into<String>) -> Self {
        ExprError::InvalidForm {
            message: message.into(),
        }
    }

    /// Create an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ExprError::InvalidState {
            message: message.into(),
        }
    }

    /// Create an IoError
    pub fn io_error(message: impl Into<String>) -> Self {
        ExprError::IoError {
            message: message.into(),
        }
    }

    /// Get a simple error message (without source context)
    pub fn message(&self) -> String {
        match self {
            ExprError::UnexpectedToken {
                expected, found, ..
            } => {
                format!("unexpected token: expected {}, found {}", expected, found)
            }
            ExprError::UnrecognizedInput { text, .. } => format!("unrecognized input: {}", text),
            ExprError::UnknownFunction { name, .. } => format!("unknown function: '{}'", name),
            ExprError::RecursionLimitExceeded { .. } => {
                "maximum nesting depth exceeded".to_string()
            }
            ExprError::InvalidForm { message } => format!("invalid form document: {}", message),
            ExprError::InvalidState { message } => format!("invalid state: {}", message),
            ExprError::IoError { message } => format!("I/O error: {}", message),
        }
    }
}

/// Result type for engine operations
pub type ExprResult<T> = Result<T, ExprError>;
