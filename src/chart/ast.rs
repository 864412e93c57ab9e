//! AST types for chart code.

/// A parsed chart fragment: a flat list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A single top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import a.b.c [as alias]`
    Import { module: String, alias: Option<String>, line: usize },
    /// `from a.b import name [as alias], ...`
    FromImport { module: String, names: Vec<ImportName>, line: usize },
    /// `target[, target...] = value`
    Assign { targets: Vec<String>, value: Expr, line: usize },
    /// A bare expression, usually a method call such as `fig.update_layout(...)`.
    Expr { expr: Expr, line: usize },
}

impl Stmt {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Import { line, .. } | Self::FromImport { line, .. } | Self::Assign { line, .. } | Self::Expr { line, .. } => {
                *line
            }
        }
    }
}

/// One name in a `from ... import` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportName {
    /// The name bound in scope (alias if present).
    #[must_use]
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Name(String),
    Attr { value: Box<Expr>, attr: String },
    Call { func: Box<Expr>, args: Vec<Expr>, kwargs: Vec<(String, Expr)> },
    Index { value: Box<Expr>, index: Box<Expr> },
    Neg(Box<Expr>),
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    /// Height of the tree rooted here; a leaf is 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            Self::Number(_) | Self::Str(_) | Self::Bool(_) | Self::None | Self::Name(_) => 0,
            Self::List(items) | Self::Tuple(items) => items.iter().map(Self::depth).max().unwrap_or(0),
            Self::Dict(entries) => entries
                .iter()
                .map(|(key, value)| key.depth().max(value.depth()))
                .max()
                .unwrap_or(0),
            Self::Attr { value, .. } | Self::Neg(value) => value.depth(),
            Self::Call { func, args, kwargs } => args
                .iter()
                .chain(kwargs.iter().map(|(_, value)| value))
                .map(Self::depth)
                .fold(func.depth(), usize::max),
            Self::Index { value, index } => value.depth().max(index.depth()),
            Self::Binary { left, right, .. } => left.depth().max(right.depth()),
        };
        children + 1
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
