//! Tokenizer for chart code.
//!
//! Newlines are significant only outside brackets, so calls and literals may
//! span several lines. Indented statements are rejected because the supported
//! subset has no blocks.

use super::ChartError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Name(String),
    Number(f64),
    Str(String),
    Punct(char),
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub line: usize,
}

const PUNCT: &[char] = &['(', ')', '[', ']', '{', '}', ',', ':', '.', '=', '+', '-', '*', '/'];

/// Split source text into tokens, always ending with `Newline` + `Eof`.
///
/// # Errors
///
/// Returns [`ChartError::Syntax`] for unterminated strings, unbalanced
/// brackets, unexpected indentation, or unknown characters, and
/// [`ChartError::NotAllowed`] for f-strings.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ChartError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut depth = 0usize;
    let mut at_line_start = true;

    while i < chars.len() {
        if at_line_start && depth == 0 {
            let mut j = i;
            while j < chars.len() && matches!(chars[j], ' ' | '\t') {
                j += 1;
            }
            let blank = j >= chars.len() || matches!(chars[j], '\n' | '\r' | '#');
            if j > i && !blank {
                return Err(syntax(line, "unexpected indent (blocks are not supported)"));
            }
            i = j;
            at_line_start = false;
            continue;
        }

        let c = chars[i];
        match c {
            '\n' => {
                if depth == 0 {
                    push_newline(&mut tokens, line);
                }
                line += 1;
                i += 1;
                at_line_start = true;
            }
            ' ' | '\t' | '\r' => i += 1,
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '\\' if chars.get(i + 1) == Some(&'\n') => {
                i += 2;
                line += 1;
            }
            '"' | '\'' => {
                let start_line = line;
                let text = lex_string(&chars, &mut i, &mut line, false)?;
                tokens.push(Token { tok: Tok::Str(text), line: start_line });
            }
            '.' if chars.get(i + 1).is_some_and(char::is_ascii_digit) => {
                let value = lex_number(&chars, &mut i, line)?;
                tokens.push(Token { tok: Tok::Number(value), line });
            }
            c if c.is_ascii_digit() => {
                let value = lex_number(&chars, &mut i, line)?;
                tokens.push(Token { tok: Tok::Number(value), line });
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if matches!(chars.get(i), Some('"' | '\'')) {
                    let prefix = ident.to_ascii_lowercase();
                    match prefix.as_str() {
                        "r" | "u" | "b" | "rb" | "br" => {
                            let start_line = line;
                            let text = lex_string(&chars, &mut i, &mut line, prefix.contains('r'))?;
                            tokens.push(Token { tok: Tok::Str(text), line: start_line });
                            continue;
                        }
                        "f" | "rf" | "fr" => {
                            return Err(ChartError::NotAllowed {
                                line,
                                message: "f-strings are not supported; use plain string literals".into(),
                            });
                        }
                        _ => {}
                    }
                }
                tokens.push(Token { tok: Tok::Name(ident), line });
            }
            c if PUNCT.contains(&c) => {
                match c {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => {
                        depth = depth
                            .checked_sub(1)
                            .ok_or_else(|| syntax(line, format!("unmatched '{c}'")))?;
                    }
                    _ => {}
                }
                tokens.push(Token { tok: Tok::Punct(c), line });
                i += 1;
            }
            other => return Err(syntax(line, format!("unexpected character '{other}'"))),
        }
    }

    if depth > 0 {
        return Err(syntax(line, "unexpected end of input: unclosed bracket"));
    }
    push_newline(&mut tokens, line);
    tokens.push(Token { tok: Tok::Eof, line });
    Ok(tokens)
}

fn push_newline(tokens: &mut Vec<Token>, line: usize) {
    if tokens.last().is_some_and(|t| t.tok != Tok::Newline) {
        tokens.push(Token { tok: Tok::Newline, line });
    }
}

fn lex_string(chars: &[char], i: &mut usize, line: &mut usize, raw: bool) -> Result<String, ChartError> {
    let quote = chars[*i];
    let triple = chars.get(*i + 1) == Some(&quote) && chars.get(*i + 2) == Some(&quote);
    let start_line = *line;
    *i += if triple { 3 } else { 1 };

    let mut out = String::new();
    loop {
        let Some(&c) = chars.get(*i) else {
            return Err(syntax(start_line, "unterminated string literal"));
        };
        if c == quote {
            if !triple {
                *i += 1;
                return Ok(out);
            }
            if chars.get(*i + 1) == Some(&quote) && chars.get(*i + 2) == Some(&quote) {
                *i += 3;
                return Ok(out);
            }
        }
        if c == '\n' {
            if !triple {
                return Err(syntax(start_line, "unterminated string literal"));
            }
            *line += 1;
        }
        if c == '\\' && !raw {
            let Some(&next) = chars.get(*i + 1) else {
                return Err(syntax(start_line, "unterminated string literal"));
            };
            match next {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '\n' => *line += 1,
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
            *i += 2;
            continue;
        }
        out.push(c);
        *i += 1;
    }
}

fn lex_number(chars: &[char], i: &mut usize, line: usize) -> Result<f64, ChartError> {
    let start = *i;
    while *i < chars.len() {
        let c = chars[*i];
        let exponent_sign =
            matches!(c, '+' | '-') && *i > start && matches!(chars[*i - 1], 'e' | 'E');
        if c.is_ascii_digit() || c == '_' || c == '.' || matches!(c, 'e' | 'E') || exponent_sign {
            *i += 1;
        } else {
            break;
        }
    }
    let text: String = chars[start..*i].iter().filter(|c| **c != '_').collect();
    text.parse::<f64>()
        .map_err(|_| syntax(line, format!("invalid number literal '{text}'")))
}

fn syntax(line: usize, message: impl Into<String>) -> ChartError {
    ChartError::Syntax { line, message: message.into() }
}
