//! Recursive-descent parser producing a [`Script`]

use super::ast::{Argument, Expr, Invocation, Script, Segment, Statement};
use super::lexer::{Token, TokenKind};
use droidconf_core::error::{Error, Result};

const INFIX_MODIFIERS: [&str; 2] = ["version", "apply"];

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn script(mut self) -> Result<Script> {
        let statements = self.statements(None)?;
        Ok(Script { statements })
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_nth_kind(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        Error::parse(
            format!("Expected {expected}, found {}", token.kind.describe()),
            token.line,
            token.column,
        )
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn ident(&mut self) -> Result<String> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    /// Statements until `}` (inside a block opened at `open`) or end of file
    fn statements(&mut self, open: Option<&Token>) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            let kind = self.peek_kind().clone();
            match (kind, open) {
                (TokenKind::Semi, _) => {
                    self.advance();
                }
                (TokenKind::RBrace, Some(_)) => {
                    self.advance();
                    return Ok(statements);
                }
                (TokenKind::Eof, None) => return Ok(statements),
                (TokenKind::Eof, Some(open)) => {
                    return Err(Error::parse("Unclosed block", open.line, open.column));
                }
                _ => {
                    if let Some(statement) = self.statement()? {
                        statements.push(statement);
                    }
                }
            }
        }
    }

    fn block(&mut self) -> Result<Vec<Statement>> {
        let open = self.expect(&TokenKind::LBrace)?;
        self.statements(Some(&open))
    }

    fn statement(&mut self) -> Result<Option<Statement>> {
        let start = self.peek().clone();
        let TokenKind::Ident(word) = &start.kind else {
            return Err(self.unexpected("a statement"));
        };

        match word.as_str() {
            "import" => {
                self.advance();
                self.path()?;
                Ok(None)
            }
            "val" | "var" => {
                self.advance();
                let name = self.ident()?;
                self.expect(&TokenKind::Eq)?;
                let value = self.expr()?;
                Ok(Some(Statement::Val {
                    name,
                    value,
                    line: start.line,
                }))
            }
            _ => {
                let name = self.path()?;
                if self.peek_kind() == &TokenKind::Eq {
                    self.advance();
                    let value = self.expr()?;
                    return Ok(Some(Statement::Assign {
                        target: name,
                        value,
                        line: start.line,
                    }));
                }

                let args = if self.peek_kind() == &TokenKind::LParen {
                    self.args()?
                } else {
                    Vec::new()
                };
                let body = if self.peek_kind() == &TokenKind::LBrace {
                    Some(self.block()?)
                } else {
                    None
                };
                if self.peek_kind() == &TokenKind::Dot {
                    let token = self.peek();
                    return Err(Error::parse(
                        "Chained calls on statements are not supported",
                        token.line,
                        token.column,
                    ));
                }
                let infix = self.infix()?;

                Ok(Some(Statement::Invoke(Invocation {
                    name,
                    args,
                    infix,
                    body,
                    line: start.line,
                })))
            }
        }
    }

    /// `a.b.c`
    fn path(&mut self) -> Result<Vec<String>> {
        let mut path = vec![self.ident()?];
        while self.peek_kind() == &TokenKind::Dot {
            self.advance();
            path.push(self.ident()?);
        }
        Ok(path)
    }

    fn infix(&mut self) -> Result<Vec<(String, Expr)>> {
        let mut infix = Vec::new();
        loop {
            let TokenKind::Ident(word) = self.peek_kind() else {
                break;
            };
            if !INFIX_MODIFIERS.contains(&word.as_str()) {
                break;
            }
            let operand = matches!(
                self.peek_nth_kind(1),
                TokenKind::Str(_) | TokenKind::Int(_)
            ) || matches!(
                self.peek_nth_kind(1),
                TokenKind::Ident(v) if v == "true" || v == "false"
            );
            if !operand {
                break;
            }
            let name = self.ident()?;
            let value = self.expr()?;
            infix.push((name, value));
        }
        Ok(infix)
    }

    fn args(&mut self) -> Result<Vec<Argument>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();

        loop {
            if self.peek_kind() == &TokenKind::RParen {
                self.advance();
                return Ok(args);
            }

            let named = matches!(self.peek_kind(), TokenKind::Ident(_))
                && self.peek_nth_kind(1) == &TokenKind::Eq;
            let name = if named {
                let name = self.ident()?;
                self.advance();
                Some(name)
            } else {
                None
            };
            args.push(Argument {
                name,
                value: self.expr()?,
            });

            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {}
                _ => return Err(self.unexpected("`,` or `)`")),
            }
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Str(value))
            }
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int(value))
            }
            TokenKind::Ident(word) => match word.as_str() {
                "true" | "false" => {
                    self.advance();
                    Ok(Expr::Bool(word == "true"))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Null)
                }
                _ => self.chain(),
            },
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn chain(&mut self) -> Result<Expr> {
        let mut segments = vec![self.segment()?];
        while self.peek_kind() == &TokenKind::Dot {
            self.advance();
            segments.push(self.segment()?);
        }
        Ok(Expr::Chain(segments))
    }

    fn segment(&mut self) -> Result<Segment> {
        let name = self.ident()?;
        if self.peek_kind() == &TokenKind::LParen {
            Ok(Segment::call(name, self.args()?))
        } else {
            Ok(Segment::field(name))
        }
    }
}
