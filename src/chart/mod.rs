//! Chart interpreter for an allowlisted Plotly-Python subset.
//!
//! DESIGN
//! ======
//! Model answers may embed a Python fragment that builds a Plotly figure and
//! binds it to `fig`. Instead of executing arbitrary code, the fragment is
//! tokenized, parsed into a small AST, and evaluated against a fresh [`Scope`]
//! that only knows the `plotly.graph_objects` / `plotly.express` surface and a
//! handful of pure builtins. Nothing in the evaluator can reach the file
//! system, network, or process. The result is a typed [`Figure`], not a
//! duck-typed object.

pub mod ast;
pub mod eval;
pub mod figure;
pub mod lex;
pub mod parse;
pub mod render;

pub use eval::{Scope, execute};
pub use figure::Figure;
pub use parse::parse;

/// Errors raised while parsing or evaluating chart code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    /// The fragment is not valid in the supported syntax.
    #[error("SyntaxError (line {line}): {message}")]
    Syntax { line: usize, message: String },

    /// The fragment uses a module, statement, or attribute outside the allowlist.
    #[error("NotAllowed (line {line}): {message}")]
    NotAllowed { line: usize, message: String },

    /// A name was referenced before assignment.
    #[error("NameError (line {line}): name '{name}' is not defined")]
    UndefinedName { line: usize, name: String },

    /// An operation was applied to a value of the wrong kind.
    #[error("TypeError (line {line}): {message}")]
    Type { line: usize, message: String },

    /// Execution exceeded the statement or collection-size budget.
    #[error("LimitExceeded: {0}")]
    Limit(String),
}

impl crate::error::ErrorCode for ChartError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "E_CHART_SYNTAX",
            Self::NotAllowed { .. } => "E_CHART_NOT_ALLOWED",
            Self::UndefinedName { .. } => "E_CHART_UNDEFINED_NAME",
            Self::Type { .. } => "E_CHART_TYPE",
            Self::Limit(_) => "E_CHART_LIMIT",
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
