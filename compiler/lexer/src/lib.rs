#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Tokenizer — turns normalized source text into a flat token stream.
//!
//! Comments are retained as [`ast::TokenKind::Comment`] tokens so an LSP host
//! can still syntax-highlight them; the parser strips them on entry.

use ast::{Keyword, Symbol, Token, TokenKind};
use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use span::{FileId, Position, Span};

/// Tokenize `text` (already CRLF-normalized by the [`span::SourceMap`]),
/// raising a diagnostic for every lexically invalid character. The returned
/// stream always ends with a single [`TokenKind::Eof`] token.
pub fn tokenize(file: FileId, text: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    Lexer::new(file, text, diagnostics).run()
}

struct Lexer<'a> {
    file: FileId,
    chars: Vec<char>,
    idx: usize,
    line: u32,
    col: u32,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Lexer<'a> {
    fn new(file: FileId, text: &str, diagnostics: &'a mut Diagnostics) -> Self {
        Self { file, chars: text.chars().collect(), idx: 0, line: 0, col: 0, diagnostics }
    }

    fn pos(&self) -> Position { Position::new(self.line, self.col) }

    fn peek(&self) -> Option<char> { self.chars.get(self.idx).copied() }

    fn peek_at(&self, ahead: usize) -> Option<char> { self.chars.get(self.idx + ahead).copied() }

    /// Consume and return the current character, advancing line/column.
    /// Supplementary-plane code points (outside the Basic Multilingual
    /// Plane) advance the column by 2, matching UTF-16 code-unit counting.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += if (c as u32) > 0xFFFF { 2 } else { 1 };
        }
        Some(c)
    }

    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos();
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, Span::point(self.file, start)));
                break;
            };

            let token = if c == '/' && self.peek_at(1) == Some('/') {
                self.line_comment(start)
            } else if c == '/' && self.peek_at(1) == Some('*') {
                self.block_comment(start)
            } else if is_ident_start(c) {
                self.identifier(start)
            } else if c.is_ascii_digit() {
                self.number(start)
            } else if c == '"' {
                self.string(start)
            } else if let Some(symbol) = Symbol::from_char(c) {
                self.advance();
                Token::new(TokenKind::Symbol(symbol), Span::new(self.file, start, self.pos()))
            } else {
                self.advance();
                let span = Span::new(self.file, start, self.pos());
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::LexUnknownSymbol,
                    span,
                    format!("Unknown symbol \"{}\"", c),
                ));
                Token::new(TokenKind::Unknown(c), span)
            };
            tokens.push(token);
        }
        tokens
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n')) {
            self.advance();
        }
    }

    fn line_comment(&mut self, start: Position) -> Token {
        let mut text = String::new();
        self.advance(); // first '/'
        self.advance(); // second '/'
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        Token::new(TokenKind::Comment(text), Span::new(self.file, start, self.pos()))
    }

    fn block_comment(&mut self, start: Position) -> Token {
        let mut text = String::new();
        self.advance(); // '/'
        self.advance(); // '*'
        while let Some(c) = self.peek() {
            if c == '*' && self.peek_at(1) == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            text.push(c);
            self.advance();
        }
        Token::new(TokenKind::Comment(text), Span::new(self.file, start, self.pos()))
    }

    fn identifier(&mut self, start: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let span = Span::new(self.file, start, self.pos());
        let kind = match Keyword::from_str(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text),
        };
        Token::new(kind, span)
    }

    fn number(&mut self, start: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let span = Span::new(self.file, start, self.pos());
        // A digit run this lexer produced always parses; saturate on the
        // pathological case of a literal wider than i64 rather than panic.
        let value = text.parse::<i64>().unwrap_or(i64::MAX);
        Token::new(TokenKind::NumericLiteral(value), span)
    }

    fn string(&mut self, start: Position) -> Token {
        let mut value = String::new();
        self.advance(); // opening quote
        loop {
            match self.peek() {
                None => break,
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.advance() {
                        value.push(escaped);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        let span = Span::new(self.file, start, self.pos());
        Token::new(TokenKind::StringLiteral(value), span)
    }
}

fn is_ident_start(c: char) -> bool { c.is_ascii_alphabetic() || c == '_' }

fn is_ident_continue(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' }

#[cfg(test)]
mod tests {
    use span::SourceMap;

    use super::*;

    fn lex(text: &str) -> (Vec<Token>, Diagnostics) {
        let mut map = SourceMap::new();
        let file = map.insert("a.eproto", text);
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(file, &map.get(file).unwrap().text.clone(), &mut diagnostics);
        (tokens, diagnostics)
    }

    #[test]
    fn keywords_are_promoted_from_identifiers() {
        let (tokens, _) = lex("package message enum");
        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Package));
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Message));
        assert_eq!(tokens[2].kind, TokenKind::Keyword(Keyword::Enum));
    }

    #[test]
    fn plain_identifier_is_not_promoted() {
        let (tokens, _) = lex("Fruit");
        assert_eq!(tokens[0].kind, TokenKind::Identifier("Fruit".to_string()));
    }

    #[test]
    fn numeric_literal_parses_as_i64() {
        let (tokens, _) = lex("12345");
        assert_eq!(tokens[0].kind, TokenKind::NumericLiteral(12345));
    }

    #[test]
    fn string_literal_strips_escaping_backslash_only() {
        let (tokens, _) = lex(r#""a\"b\nc""#);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("a\"bnc".to_string()));
    }

    #[test]
    fn line_comment_runs_to_newline() {
        let (tokens, _) = lex("// hello\nmessage");
        assert_eq!(tokens[0].kind, TokenKind::Comment(" hello".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Message));
    }

    #[test]
    fn block_comment_spans_multiple_lines() {
        let (tokens, _) = lex("/* a\nb */message");
        assert_eq!(tokens[0].kind, TokenKind::Comment(" a\nb ".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Message));
    }

    #[test]
    fn unknown_character_raises_diagnostic() {
        let (tokens, diagnostics) = lex("#");
        assert_eq!(tokens[0].kind, TokenKind::Unknown('#'));
        assert_eq!(diagnostics.all().len(), 1);
        assert_eq!(diagnostics.all()[0].kind, DiagnosticKind::LexUnknownSymbol);
    }

    #[test]
    fn stream_always_ends_with_eof() {
        let (tokens, _) = lex("message M {}");
        assert!(tokens.last().unwrap().is_eof());
    }

    #[test]
    fn symbols_are_tokenized() {
        let (tokens, _) = lex("<>(){};=,.");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Symbol(Symbol::Lt),
                TokenKind::Symbol(Symbol::Gt),
                TokenKind::Symbol(Symbol::LParen),
                TokenKind::Symbol(Symbol::RParen),
                TokenKind::Symbol(Symbol::LBrace),
                TokenKind::Symbol(Symbol::RBrace),
                TokenKind::Symbol(Symbol::Semi),
                TokenKind::Symbol(Symbol::Eq),
                TokenKind::Symbol(Symbol::Comma),
                TokenKind::Symbol(Symbol::Dot),
                TokenKind::Eof,
            ]
        );
    }
}
