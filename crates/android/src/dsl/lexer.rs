//! Tokenizer for the Gradle Kotlin DSL subset

use droidconf_core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Dot,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Eq,
    Semi,
    Eof,
}

impl TokenKind {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Int(value) => format!("integer `{value}`"),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::Eq => "`=`".to_string(),
            TokenKind::Semi => "`;`".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn tokens(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '.' => self.single(TokenKind::Dot),
                ',' => self.single(TokenKind::Comma),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '=' => self.single(TokenKind::Eq),
                ';' => self.single(TokenKind::Semi),
                '"' => self.string(line, column)?,
                '`' => self.quoted_ident(line, column)?,
                c if c.is_ascii_digit() => self.integer(line, column)?,
                c if c.is_alphabetic() || c == '_' => self.ident(),
                other => {
                    return Err(Error::parse(
                        format!("Unexpected character `{other}`"),
                        line,
                        column,
                    ))
                }
            };

            tokens.push(Token { kind, line, column });
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && self.peek_second() == Some('/') {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c == '/' && self.peek_second() == Some('*') {
                let (line, column) = (self.line, self.column);
                self.bump();
                self.bump();
                let mut closed = false;
                while let Some(c) = self.bump() {
                    if c == '*' && self.peek() == Some('/') {
                        self.bump();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(Error::parse("Unterminated block comment", line, column));
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn string(&mut self, line: usize, column: usize) -> Result<TokenKind> {
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(Error::parse("Unterminated string literal", line, column))
                }
                Some('"') => return Ok(TokenKind::Str(value)),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c @ ('"' | '\\' | '$' | '\'')) => c,
                        Some(other) => {
                            return Err(Error::parse(
                                format!("Unsupported escape sequence `\\{other}`"),
                                self.line,
                                self.column,
                            ))
                        }
                        None => {
                            return Err(Error::parse("Unterminated string literal", line, column))
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn quoted_ident(&mut self, line: usize, column: usize) -> Result<TokenKind> {
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(Error::parse("Unterminated quoted identifier", line, column))
                }
                Some('`') => return Ok(TokenKind::Ident(name)),
                Some(c) => name.push(c),
            }
        }
    }

    fn integer(&mut self, line: usize, column: usize) -> Result<TokenKind> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.bump();
        }
        if matches!(self.peek(), Some('L')) {
            self.bump();
        }

        digits
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| Error::parse(format!("Integer literal out of range: {digits}"), line, column))
    }

    fn ident(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Ident(name)
    }
}

/// Split Kotlin DSL source into tokens, ending with [`TokenKind::Eof`]
pub fn lex(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokens()
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidconf_core::error::ErrorCode;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            kinds("minSdk = 21"),
            vec![
                TokenKind::Ident("minSdk".into()),
                TokenKind::Eq,
                TokenKind::Int(21),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// line\n/* block\n comment */ id(\"x\") // trailing";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("id".into()),
                TokenKind::LParen,
                TokenKind::Str("x".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\$d""#),
            vec![TokenKind::Str("a\"b\\c$d".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_backtick_identifier() {
        assert_eq!(
            kinds("`kotlin-android`"),
            vec![TokenKind::Ident("kotlin-android".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(
            kinds("1_000 34L"),
            vec![TokenKind::Int(1000), TokenKind::Int(34), TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = lex("android {\n    namespace = \"a.b\"\n}").unwrap();
        let namespace = &tokens[2];
        assert_eq!(namespace.kind, TokenKind::Ident("namespace".into()));
        assert_eq!((namespace.line, namespace.column), (2, 5));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex("id(\"x").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert_eq!(err.context.as_deref(), Some("line 1, column 4"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex("a += 1").unwrap_err();
        assert!(err.message.contains('+'));
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert!(lex("/* open").is_err());
    }
}
