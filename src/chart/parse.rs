//! Recursive descent parser for chart code.

use super::ChartError;
use super::ast::{BinOp, Expr, ImportName, Program, Stmt};
use super::lex::{Tok, Token, tokenize};

/// Statement keywords outside the supported subset.
const BLOCKED_KEYWORDS: &[&str] = &[
    "def", "class", "for", "while", "if", "elif", "else", "try", "except", "finally", "with", "lambda", "return",
    "yield", "del", "global", "nonlocal", "raise", "assert", "async", "await", "pass",
];

/// Deepest expression tree accepted.
const MAX_NESTING: usize = 64;

/// Parse chart code into a [`Program`].
///
/// # Errors
///
/// Returns [`ChartError::Syntax`] for malformed input and
/// [`ChartError::NotAllowed`] for constructs outside the subset (blocks,
/// function definitions, star-arguments, f-strings). Expressions nested
/// deeper than 64 levels are a [`ChartError::Limit`].
pub fn parse(input: &str) -> Result<Program, ChartError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let mut statements = Vec::new();

    loop {
        while parser.eat_newline() {}
        if parser.at_eof() {
            break;
        }
        statements.push(parser.statement()?);
        if !parser.eat_newline() && !parser.at_eof() {
            return Err(parser.unexpected("end of statement"));
        }
    }

    Ok(Program { statements })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current descent depth through [`Parser::unary`].
    depth: usize,
}

impl Parser {
    // =========================================================================
    // TOKEN CURSOR
    // =========================================================================

    fn peek(&self) -> &Tok {
        self.tokens.get(self.pos).map_or(&Tok::Eof, |t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        self.tokens
            .get(self.pos + offset)
            .map_or(&Tok::Eof, |t| &t.tok)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Tok::Eof)
    }

    fn eat_newline(&mut self) -> bool {
        if matches!(self.peek(), Tok::Newline) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn is_punct(&self, c: char) -> bool {
        matches!(self.peek(), Tok::Punct(p) if *p == c)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.is_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ChartError> {
        if self.eat_punct(c) { Ok(()) } else { Err(self.unexpected(&format!("'{c}'"))) }
    }

    fn is_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Tok::Name(n) if n == kw)
    }

    fn expect_name(&mut self) -> Result<String, ChartError> {
        match self.peek().clone() {
            Tok::Name(name) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    fn unexpected(&self, wanted: &str) -> ChartError {
        let found = match self.peek() {
            Tok::Name(n) => format!("'{n}'"),
            Tok::Number(n) => format!("number {n}"),
            Tok::Str(_) => "string".to_string(),
            Tok::Punct(p) => format!("'{p}'"),
            Tok::Newline => "end of line".to_string(),
            Tok::Eof => "end of input".to_string(),
        };
        ChartError::Syntax { line: self.line(), message: format!("expected {wanted}, found {found}") }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn statement(&mut self) -> Result<Stmt, ChartError> {
        let line = self.line();
        if let Tok::Name(word) = self.peek() {
            if BLOCKED_KEYWORDS.contains(&word.as_str()) {
                return Err(ChartError::NotAllowed { line, message: format!("'{word}' statements are not supported") });
            }
        }
        if self.is_keyword("import") {
            return self.import_statement(line);
        }
        if self.is_keyword("from") {
            return self.from_import_statement(line);
        }

        let first = self.expr_list()?;
        if self.eat_punct('=') {
            let targets = assignment_targets(first, line)?;
            let value = self.expr_list()?;
            if self.is_punct('=') {
                return Err(ChartError::NotAllowed { line, message: "chained assignment is not supported".into() });
            }
            return Ok(Stmt::Assign { targets, value, line });
        }
        Ok(Stmt::Expr { expr: first, line })
    }

    fn import_statement(&mut self, line: usize) -> Result<Stmt, ChartError> {
        self.advance();
        let module = self.dotted_name()?;
        let alias = if self.is_keyword("as") {
            self.advance();
            Some(self.expect_name()?)
        } else {
            None
        };
        if self.is_punct(',') {
            return Err(ChartError::NotAllowed { line, message: "import one module per statement".into() });
        }
        Ok(Stmt::Import { module, alias, line })
    }

    fn from_import_statement(&mut self, line: usize) -> Result<Stmt, ChartError> {
        self.advance();
        let module = self.dotted_name()?;
        if !self.is_keyword("import") {
            return Err(self.unexpected("'import'"));
        }
        self.advance();
        if self.is_punct('*') {
            return Err(ChartError::NotAllowed { line, message: "wildcard imports are not supported".into() });
        }
        let parenthesized = self.eat_punct('(');
        let mut names = Vec::new();
        loop {
            let name = self.expect_name()?;
            let alias = if self.is_keyword("as") {
                self.advance();
                Some(self.expect_name()?)
            } else {
                None
            };
            names.push(ImportName { name, alias });
            if !self.eat_punct(',') {
                break;
            }
            if parenthesized && self.is_punct(')') {
                break;
            }
        }
        if parenthesized {
            self.expect_punct(')')?;
        }
        Ok(Stmt::FromImport { module, names, line })
    }

    fn dotted_name(&mut self) -> Result<String, ChartError> {
        let mut name = self.expect_name()?;
        while self.eat_punct('.') {
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// `expr (',' expr)* [',']`; a bare comma list becomes a tuple.
    fn expr_list(&mut self) -> Result<Expr, ChartError> {
        let first = self.expr()?;
        if !self.is_punct(',') {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_punct(',') {
            if matches!(self.peek(), Tok::Newline | Tok::Eof) || self.is_punct('=') || self.is_punct(')') {
                break;
            }
            items.push(self.expr()?);
        }
        bounded(Expr::Tuple(items))
    }

    fn expr(&mut self) -> Result<Expr, ChartError> {
        let mut left = self.term()?;
        loop {
            let op = if self.eat_punct('+') {
                BinOp::Add
            } else if self.eat_punct('-') {
                BinOp::Sub
            } else {
                break;
            };
            let right = self.term()?;
            left = bounded(Expr::Binary { op, left: Box::new(left), right: Box::new(right) })?;
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ChartError> {
        let mut left = self.unary()?;
        loop {
            if self.is_punct('*') && matches!(self.peek_at(1), Tok::Punct('*')) {
                return Err(ChartError::NotAllowed { line: self.line(), message: "'**' is not supported".into() });
            }
            let op = if self.eat_punct('*') {
                BinOp::Mul
            } else if self.is_punct('/') && matches!(self.peek_at(1), Tok::Punct('/')) {
                return Err(ChartError::NotAllowed { line: self.line(), message: "'//' is not supported".into() });
            } else if self.eat_punct('/') {
                BinOp::Div
            } else {
                break;
            };
            let right = self.unary()?;
            left = bounded(Expr::Binary { op, left: Box::new(left), right: Box::new(right) })?;
        }
        Ok(left)
    }

    /// Every recursive path of the grammar passes through here.
    fn unary(&mut self) -> Result<Expr, ChartError> {
        if self.depth >= MAX_NESTING {
            return Err(nesting_limit());
        }
        self.depth += 1;
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, ChartError> {
        if self.eat_punct('-') {
            let inner = self.unary()?;
            return match inner {
                Expr::Number(n) => Ok(Expr::Number(-n)),
                other => bounded(Expr::Neg(Box::new(other))),
            };
        }
        if self.eat_punct('+') {
            return self.unary();
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ChartError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat_punct('.') {
                let attr = self.expect_name()?;
                expr = bounded(Expr::Attr { value: Box::new(expr), attr })?;
            } else if self.eat_punct('(') {
                let (args, kwargs) = self.call_arguments()?;
                expr = bounded(Expr::Call { func: Box::new(expr), args, kwargs })?;
            } else if self.eat_punct('[') {
                let index = self.expr()?;
                if self.is_punct(':') {
                    return Err(ChartError::NotAllowed { line: self.line(), message: "slices are not supported".into() });
                }
                self.expect_punct(']')?;
                expr = bounded(Expr::Index { value: Box::new(expr), index: Box::new(index) })?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Arguments after an opening `(`, consuming the closing `)`.
    fn call_arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ChartError> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        while !self.is_punct(')') {
            if self.is_punct('*') {
                return Err(ChartError::NotAllowed {
                    line: self.line(),
                    message: "star-arguments are not supported".into(),
                });
            }
            let keyword = match (self.peek(), self.peek_at(1)) {
                (Tok::Name(name), Tok::Punct('=')) if !matches!(self.peek_at(2), Tok::Punct('=')) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = keyword {
                self.pos += 2;
                let value = self.expr()?;
                if kwargs.iter().any(|(k, _)| *k == name) {
                    return Err(ChartError::Syntax {
                        line: self.line(),
                        message: format!("keyword argument repeated: {name}"),
                    });
                }
                kwargs.push((name, value));
            } else {
                if !kwargs.is_empty() {
                    return Err(ChartError::Syntax {
                        line: self.line(),
                        message: "positional argument follows keyword argument".into(),
                    });
                }
                args.push(self.expr()?);
            }
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;
        Ok((args, kwargs))
    }

    fn atom(&mut self) -> Result<Expr, ChartError> {
        let line = self.line();
        match self.advance() {
            Tok::Number(n) => Ok(Expr::Number(n)),
            Tok::Str(mut s) => {
                // Adjacent literals concatenate, as in `"a" "b"`.
                while let Tok::Str(next) = self.peek().clone() {
                    self.pos += 1;
                    s.push_str(&next);
                }
                Ok(Expr::Str(s))
            }
            Tok::Name(name) => match name.as_str() {
                "True" => Ok(Expr::Bool(true)),
                "False" => Ok(Expr::Bool(false)),
                "None" => Ok(Expr::None),
                kw if BLOCKED_KEYWORDS.contains(&kw) => {
                    Err(ChartError::NotAllowed { line, message: format!("'{kw}' expressions are not supported") })
                }
                _ => Ok(Expr::Name(name)),
            },
            Tok::Punct('(') => {
                if self.eat_punct(')') {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let inner = self.expr_list()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Tok::Punct('[') => {
                let items = self.sequence_items(']')?;
                bounded(Expr::List(items))
            }
            Tok::Punct('{') => self.dict_literal(),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("an expression"))
            }
        }
    }

    fn sequence_items(&mut self, close: char) -> Result<Vec<Expr>, ChartError> {
        let mut items = Vec::new();
        while !self.is_punct(close) {
            items.push(self.expr()?);
            if self.is_keyword("for") {
                return Err(ChartError::NotAllowed {
                    line: self.line(),
                    message: "comprehensions are not supported".into(),
                });
            }
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(items)
    }

    fn dict_literal(&mut self) -> Result<Expr, ChartError> {
        let mut entries = Vec::new();
        while !self.is_punct('}') {
            let key = self.expr()?;
            if !self.eat_punct(':') {
                return Err(ChartError::NotAllowed { line: self.line(), message: "set literals are not supported".into() });
            }
            let value = self.expr()?;
            entries.push((key, value));
            if self.is_keyword("for") {
                return Err(ChartError::NotAllowed {
                    line: self.line(),
                    message: "comprehensions are not supported".into(),
                });
            }
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct('}')?;
        bounded(Expr::Dict(entries))
    }
}

/// Pass `expr` through unless its tree is deeper than [`MAX_NESTING`].
fn bounded(expr: Expr) -> Result<Expr, ChartError> {
    if expr.depth() > MAX_NESTING {
        return Err(nesting_limit());
    }
    Ok(expr)
}

fn nesting_limit() -> ChartError {
    ChartError::Limit(format!("expressions may nest at most {MAX_NESTING} levels"))
}

fn assignment_targets(expr: Expr, line: usize) -> Result<Vec<String>, ChartError> {
    match expr {
        Expr::Name(name) => Ok(vec![name]),
        Expr::Tuple(items) => items
            .into_iter()
            .map(|item| match item {
                Expr::Name(name) => Ok(name),
                _ => Err(ChartError::NotAllowed { line, message: "only plain names can be assigned".into() }),
            })
            .collect(),
        Expr::Attr { .. } | Expr::Index { .. } => Err(ChartError::NotAllowed {
            line,
            message: "attribute and item assignment are not supported; use fig.update_layout(...)".into(),
        }),
        _ => Err(ChartError::Syntax { line, message: "cannot assign to expression".into() }),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
