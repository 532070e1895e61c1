//! Reader for the prefix notation printed by `Expr`'s `Display`.
//!
//! `(f a (g "s"))` reads back as the form `f(a, g("s"))`. This is the
//! interchange notation of `FullForm`; the infix concrete syntax belongs to
//! the parser and is not handled here.

use thiserror::Error;

use crate::expr::Expr;

/// Error from reading prefix notation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected `)` at offset {offset}")]
    UnexpectedClose { offset: usize },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

struct Reader<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Reader { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.source.len()
    }

    fn read_expr(&mut self) -> Result<Expr, ReadError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.rest().chars().next() {
            None => Err(ReadError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let mut elements = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.rest().chars().next() {
                        None => return Err(ReadError::UnexpectedEnd),
                        Some(')') => {
                            self.pos += 1;
                            return Ok(Expr::form(elements));
                        }
                        Some(_) => elements.push(self.read_expr()?),
                    }
                }
            }
            Some(')') => Err(ReadError::UnexpectedClose { offset: start }),
            Some('"') => {
                let body = &self.rest()[1..];
                let mut escaped = false;
                for (i, c) in body.char_indices() {
                    match c {
                        '\\' if !escaped => escaped = true,
                        '"' if !escaped => {
                            let end = start + 1 + i + 1;
                            let text = &self.source[start..end];
                            self.pos = end;
                            return Ok(Expr::atom(text));
                        }
                        _ => escaped = false,
                    }
                }
                Err(ReadError::UnterminatedString { offset: start })
            }
            Some(_) => {
                let len = self
                    .rest()
                    .find(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == '"')
                    .unwrap_or(self.rest().len());
                self.pos += len;
                Ok(Expr::atom(&self.source[start..self.pos]))
            }
        }
    }
}

/// Read exactly one expression.
pub fn read(source: &str) -> Result<Expr, ReadError> {
    let mut reader = Reader::new(source);
    let expr = reader.read_expr()?;
    if !reader.at_end() {
        return Err(ReadError::TrailingInput { offset: reader.pos });
    }
    Ok(expr)
}

/// Read a whitespace-separated sequence of expressions.
pub fn read_all(source: &str) -> Result<Vec<Expr>, ReadError> {
    let mut reader = Reader::new(source);
    let mut exprs = Vec::new();
    while !reader.at_end() {
        exprs.push(reader.read_expr()?);
    }
    Ok(exprs)
}
