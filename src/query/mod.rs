//! A small JSONPath-like query language over entity snapshots.
//!
//! # Grammar
//!
//! ```text
//! query     := '$' step*
//! step      := '.' ident | '[*]' | '[' quoted ']' | '[?(' predicate ')]'
//! predicate := '@' ('.' ident)+ op literal
//! op        := '==' | '!=' | '<' | '<=' | '>' | '>='
//! literal   := quoted | number | 'true' | 'false'
//! ```
//!
//! # Snapshot shape
//!
//! The root `$` holds one collection per entity class (`$.players`) plus
//! `$.entities` for every entity. Entities expose their properties and the
//! synthetic members `id` and `classname`; vector values expose `x`, `y`
//! and `z`.
//!
//! # Example
//!
//! ```
//! use demoreel::query::Query;
//!
//! let query = Query::compile("$.players[*][?(@.class != 'other')]")?;
//! assert_eq!(query.steps().len(), 3);
//! assert_eq!(query.to_string(), "$.players[*][?(@.class != 'other')]");
//! # Ok::<(), demoreel::error::DemoError>(())
//! ```

mod eval;
mod parser;

pub use eval::{evaluate, Match};

use std::fmt;
use std::str::FromStr;

use crate::error::{DemoError, Result};
use crate::value::Value;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Returns the operator's source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether the operator only tests equality.
    #[must_use]
    pub const fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

/// Filter condition `@.path OP literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Member path relative to the candidate; never empty.
    pub path: Vec<String>,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand literal (integer, float, string or boolean).
    pub literal: Value,
}

/// One compiled query step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Descend into a named member.
    Field(String),
    /// Expand a collection into its elements.
    Wildcard,
    /// Keep candidates satisfying the predicate.
    Predicate(Predicate),
}

/// A compiled, immutable path query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    steps: Vec<Step>,
}

impl Query {
    /// Compiles a query string.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::QuerySyntax` for malformed input.
    pub fn compile(source: &str) -> Result<Self> {
        parser::parse(source).map(|steps| Query { steps })
    }

    /// The query selecting the whole snapshot (`$`).
    #[must_use]
    pub fn root() -> Self {
        Query { steps: Vec::new() }
    }

    /// Returns the compiled steps in evaluation order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether this query is the bare root selector.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromStr for Query {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self> {
        Query::compile(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for step in &self.steps {
            match step {
                Step::Field(name) if is_identifier(name) => write!(f, ".{name}")?,
                Step::Field(name) => {
                    f.write_str("[")?;
                    write_quoted(f, name)?;
                    f.write_str("]")?;
                }
                Step::Wildcard => f.write_str("[*]")?,
                Step::Predicate(predicate) => {
                    f.write_str("[?(@")?;
                    for segment in &predicate.path {
                        write!(f, ".{segment}")?;
                    }
                    write!(f, " {} ", predicate.op.symbol())?;
                    match &predicate.literal {
                        Value::String(s) => write_quoted(f, s)?,
                        Value::Float(x) => write!(f, "{x:?}")?,
                        other => write!(f, "{other}")?,
                    }
                    f.write_str(")]")?;
                }
            }
        }
        Ok(())
    }
}

/// Whether `name` can be written with dot notation.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_canonical_forms() {
        let cases = [
            ("$", "$"),
            ("$.players", "$.players"),
            ("$ .players [ * ]", "$.players[*]"),
            ("$['team red']", "$['team red']"),
            ("$['players']", "$.players"),
            ("$.a[?(@.b>=2)]", "$.a[?(@.b >= 2)]"),
            ("$.a[?(@.b.x<-1.5)]", "$.a[?(@.b.x < -1.5)]"),
            ("$.a[?(@.b==\"it's\")]", "$.a[?(@.b == 'it\\'s')]"),
            ("$.a[?(@.alive != false)]", "$.a[?(@.alive != false)]"),
            ("$.a[?(@.f == 3.0)]", "$.a[?(@.f == 3.0)]"),
        ];

        for (source, expected) in cases {
            let query = Query::compile(source).unwrap();
            assert_eq!(query.to_string(), expected, "rendering {source}");
            assert_eq!(Query::compile(expected).unwrap(), query, "re-parsing {expected}");
        }
    }

    #[test]
    fn test_root_query() {
        let query: Query = "$".parse().unwrap();
        assert!(query.is_root());
        assert_eq!(query, Query::root());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("m_iHealth"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
