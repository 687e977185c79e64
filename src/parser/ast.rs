//! Syntax trees for the condition and value expression languages.
//!
//! `Display` renders a canonical, fully parenthesized form that parses back
//! to the same tree.

use std::fmt;

/// Comparison operators of the condition language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// case-insensitive substring match
    IContains,
    /// negation of `IContains`
    NotIContains,
    /// case-sensitive substring match
    Contains,
    /// case-insensitive equality: `equals`, `==`
    Equals,
    /// negation of `Equals`: `notequals`, `!=`
    NotEquals,
}

impl CompareOp {
    /// parse a lowercased operator word (supports all forms)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "icontains" => Some(CompareOp::IContains),
            "noticontains" => Some(CompareOp::NotIContains),
            "contains" => Some(CompareOp::Contains),
            "equals" | "==" => Some(CompareOp::Equals),
            "notequals" | "!=" => Some(CompareOp::NotEquals),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::IContains => write!(f, "icontains"),
            CompareOp::NotIContains => write!(f, "noticontains"),
            CompareOp::Contains => write!(f, "contains"),
            CompareOp::Equals => write!(f, "equals"),
            CompareOp::NotEquals => write!(f, "notequals"),
        }
    }
}

/// `{variable} op 'expected'`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub variable: String,
    pub op: CompareOp,
    pub expected: String,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} {} {}",
            self.variable,
            self.op,
            quoted(&self.expected)
        )
    }
}

/// A parsed visibility/required/read-only condition.
///
/// `And`/`Or` hold every operand of a flat chain, so `a and b and c` is one
/// node with three children. Only parentheses add nesting.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Compare(Comparison),
}

impl Condition {
    /// Conjunction of `operands`; a single operand is returned as-is
    pub fn all(mut operands: Vec<Condition>) -> Self {
        if operands.len() == 1 {
            if let Some(only) = operands.pop() {
                return only;
            }
        }
        Condition::And(operands)
    }

    /// Disjunction of `operands`; a single operand is returned as-is
    pub fn any(mut operands: Vec<Condition>) -> Self {
        if operands.len() == 1 {
            if let Some(only) = operands.pop() {
                return only;
            }
        }
        Condition::Or(operands)
    }

    /// Variables referenced anywhere in the condition, in source order
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Condition::And(operands) | Condition::Or(operands) => {
                operands.iter().flat_map(Condition::variables).collect()
            }
            Condition::Compare(c) => vec![c.variable.as_str()],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (operands, joiner) = match self {
            Condition::And(operands) => (operands, " and "),
            Condition::Or(operands) => (operands, " or "),
            Condition::Compare(c) => return write!(f, "{}", c),
        };

        write!(f, "(")?;
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", joiner)?;
            }
            write!(f, "{}", operand)?;
        }
        write!(f, ")")
    }
}

/// One `/`-separated step of a variable path, e.g. `address:display`
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub key: String,
    /// Pseudo-accessor after `:`, looked up on the resolved object
    pub accessor: Option<String>,
}

/// A variable reference such as `{applicant/address:display}`
#[derive(Debug, Clone, PartialEq)]
pub struct VarPath {
    /// Text between the braces, trimmed
    pub raw: String,
    /// Never empty; an empty key makes the whole path resolve to absent
    pub segments: Vec<PathSegment>,
}

impl VarPath {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .map(|segment| {
                let mut parts = segment.trim().split(':');
                let key = parts.next().unwrap_or_default().trim().to_string();
                let accessor = parts
                    .next()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string);
                PathSegment { key, accessor }
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.raw)
    }
}

/// A value expression (default values)
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    Bool(bool),
    Var(VarPath),
    /// `a + b + c`; always two or more parts
    Concat(Vec<Expr>),
    /// `if(test, then, otherwise)`
    If {
        test: Box<Test>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `replaceAll(value, search, replacement)`
    ReplaceAll {
        value: Box<Expr>,
        search: Box<Expr>,
        replacement: Box<Expr>,
    },
}

/// First argument of `if`
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Literal(bool),
    /// Loose, list-aware, case-insensitive equality
    Is(Expr, Expr),
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::String(s.into())
    }

    pub fn var(raw: &str) -> Self {
        Expr::Var(VarPath::parse(raw))
    }

    /// Render as an operand: concatenations need parentheses there
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Concat(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::String(s) => write!(f, "{}", quoted(s)),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Var(path) => write!(f, "{}", path),
            Expr::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    part.fmt_operand(f)?;
                }
                Ok(())
            }
            Expr::If {
                test,
                then_branch,
                else_branch,
            } => write!(f, "if({}, {}, {})", test, then_branch, else_branch),
            Expr::ReplaceAll {
                value,
                search,
                replacement,
            } => write!(f, "replaceAll({}, {}, {})", value, search, replacement),
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Test::Literal(b) => write!(f, "{}", b),
            Test::Is(left, right) => {
                left.fmt_operand(f)?;
                write!(f, " is ")?;
                right.fmt_operand(f)
            }
        }
    }
}

fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
