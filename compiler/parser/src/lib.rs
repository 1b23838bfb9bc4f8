#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Parser — an error-tolerant recursive-descent parser over the token
//! stream, producing a permissive AST.
//!
//! Every production returns a best-effort node with `is_complete: false` when
//! a required sub-part was missing, rather than aborting. Productions that
//! loop over a `{ ... }` or comma-separated body guarantee forward progress:
//! if a child production consumed no tokens, the loop steps one token before
//! retrying, so malformed input can never hang the parser.

use ast::{
    AstNode, EnumDecl, EnumFieldDecl, FieldDecl, Ident, Keyword, MessageDecl, NumberLit,
    PackageDecl, RpcDecl, ServiceDecl, StringEnumDecl, StringLit, Symbol, Token, TokenKind,
    TypeRef,
};
use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use span::{FileId, Position, Span};

/// Parse a token stream (as produced by `lexer::tokenize`) into a permissive
/// AST. Comment tokens are stripped here, at parser entry.
pub fn parse(file: FileId, tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> ast::File {
    let tokens: Vec<Token> = tokens.into_iter().filter(|t| !t.is_comment()).collect();
    Parser::new(file, tokens, diagnostics).parse_file()
}

struct Parser<'a> {
    file: FileId,
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    fn new(file: FileId, tokens: Vec<Token>, diagnostics: &'a mut Diagnostics) -> Self {
        debug_assert!(tokens.last().is_some_and(Token::is_eof), "token stream must end with EOF");
        Self { file, tokens, pos: 0, diagnostics }
    }

    fn current(&self) -> &Token { &self.tokens[self.pos] }

    fn at_eof(&self) -> bool { self.current().is_eof() }

    fn current_start(&self) -> Position { self.current().span.start }

    fn span_from(&self, start: Position) -> Span {
        let end = if self.pos == 0 { start } else { self.tokens[self.pos - 1].span.end };
        Span::new(self.file, start, end)
    }

    fn at_keyword(&self, kw: Keyword) -> bool { self.current().kind == TokenKind::Keyword(kw) }

    fn at_symbol(&self, sym: Symbol) -> bool { self.current().kind == TokenKind::Symbol(sym) }

    fn at_identifier_text(&self, text: &str) -> bool {
        matches!(&self.current().kind, TokenKind::Identifier(s) if s == text)
    }

    fn peek_kind_at(&self, ahead: usize) -> &TokenKind {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Consume the current token and return it, unless already at EOF.
    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn expect_symbol(&mut self, sym: Symbol) -> bool {
        if self.at_symbol(sym) {
            self.advance();
            true
        } else {
            self.expect_fail(&format!("{:?}", sym));
            false
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.advance();
            true
        } else {
            self.expect_fail(&format!("{:?}", kw));
            false
        }
    }

    fn expect_fail(&mut self, expected: &str) {
        let span = Span::point(self.file, self.current_start());
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::ParseExpect,
            span,
            format!("expected {}", expected),
        ));
    }

    fn expect_identifier(&mut self) -> Ident {
        if let TokenKind::Identifier(name) = self.current().kind.clone() {
            let span = self.current().span;
            self.advance();
            Ident::new(name, span)
        } else {
            self.expect_fail("identifier");
            Ident::error(Span::point(self.file, self.current_start()))
        }
    }

    fn expect_number(&mut self) -> Option<NumberLit> {
        if let TokenKind::NumericLiteral(value) = self.current().kind {
            let span = self.current().span;
            self.advance();
            Some(NumberLit { value, span })
        } else {
            self.expect_fail("number");
            None
        }
    }

    fn expect_string_lit(&mut self) -> StringLit {
        if let TokenKind::StringLiteral(value) = self.current().kind.clone() {
            let span = self.current().span;
            self.advance();
            StringLit { value, span }
        } else {
            self.expect_fail("string literal");
            StringLit { value: String::new(), span: Span::point(self.file, self.current_start()) }
        }
    }

    /// `ident ('.' ident)*`
    fn parse_dotted_id(&mut self) -> Vec<Ident> {
        let mut segments = vec![self.expect_identifier()];
        while self.at_symbol(Symbol::Dot) {
            self.advance();
            segments.push(self.expect_identifier());
        }
        segments
    }

    /// `dottedId ('<' type (',' type)* '>')?`
    fn parse_type(&mut self) -> TypeRef {
        let start = self.current_start();
        let segments = self.parse_dotted_id();
        let mut is_complete = segments.iter().all(|s| !s.is_error());
        let mut args = Vec::new();
        if self.at_symbol(Symbol::Lt) {
            self.advance();
            args.push(self.parse_type());
            while self.at_symbol(Symbol::Comma) {
                self.advance();
                args.push(self.parse_type());
            }
            if !self.expect_symbol(Symbol::Gt) {
                is_complete = false;
            }
        }
        is_complete &= args.iter().all(|a| a.is_complete);
        TypeRef { segments, args, span: self.span_from(start), is_complete }
    }

    /// A `{ ... }` body with no separator between items (message fields,
    /// enum-like without commas, rpcs): loop until `terminator` or EOF,
    /// forcing one token of progress if an item consumed none.
    fn parse_star_list<T>(
        &mut self,
        terminator: Symbol,
        mut parse_item: impl FnMut(&mut Self) -> T,
    ) -> Vec<T> {
        let mut items = Vec::new();
        while !self.at_symbol(terminator) && !self.at_eof() {
            let before = self.pos;
            items.push(parse_item(self));
            if self.pos == before {
                self.advance();
            }
        }
        items
    }

    /// A comma-separated `{ ... }` body with an optional trailing comma.
    fn parse_comma_list<T>(
        &mut self,
        terminator: Symbol,
        mut parse_item: impl FnMut(&mut Self) -> T,
    ) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            if self.at_symbol(terminator) || self.at_eof() {
                break;
            }
            let before = self.pos;
            items.push(parse_item(self));
            if self.pos == before {
                self.advance();
            }
            if self.at_symbol(Symbol::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        items
    }

    /// `'<' type (',' type)* '>'`, formal generic parameter names. Each
    /// formal is parsed as a full `type` so a dotted or itself-parameterized
    /// form (`T.U`, `T<X>`) can be recognized and flagged rather than just
    /// desyncing the token stream.
    fn parse_generic_params(&mut self) -> Vec<Ident> {
        let mut generics = Vec::new();
        if self.at_symbol(Symbol::Lt) {
            self.advance();
            generics.push(self.parse_generic_param());
            while self.at_symbol(Symbol::Comma) {
                self.advance();
                generics.push(self.parse_generic_param());
            }
            self.expect_symbol(Symbol::Gt);
        }
        generics
    }

    /// One formal generic parameter: a bare identifier. A dotted or
    /// parameterized form raises `generic-form-invalid` and yields an error
    /// identifier in its place.
    fn parse_generic_param(&mut self) -> Ident {
        let type_ref = self.parse_type();
        if type_ref.segments.len() == 1 && type_ref.args.is_empty() {
            type_ref.segments.into_iter().next().expect("checked len == 1 above")
        } else {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::GenericFormInvalid,
                type_ref.span,
                "formal generic parameter must be a bare identifier".to_string(),
            ));
            Ident::error(type_ref.span)
        }
    }

    /// `'package' dottedId ';'`
    fn parse_package(&mut self) -> PackageDecl {
        let start = self.current_start();
        self.advance(); // 'package'
        let segments = self.parse_dotted_id();
        let mut is_complete = segments.iter().all(|s| !s.is_error());
        if !self.expect_symbol(Symbol::Semi) {
            is_complete = false;
        }
        PackageDecl { segments, span: self.span_from(start), is_complete }
    }

    /// `'optional'? type ident ('=' number)? ';'`
    fn parse_message_field(&mut self) -> FieldDecl {
        let start = self.current_start();
        let optional = if self.at_keyword(Keyword::Optional) {
            self.advance();
            true
        } else {
            false
        };
        let type_ref = self.parse_type();
        let name = self.expect_identifier();
        let mut is_complete = type_ref.is_complete && !name.is_error();
        let mut ordinal = None;
        if self.at_symbol(Symbol::Eq) {
            self.advance();
            match self.expect_number() {
                Some(n) => ordinal = Some(n),
                None => is_complete = false,
            }
        }
        if !self.expect_symbol(Symbol::Semi) {
            is_complete = false;
        }
        FieldDecl { optional, type_ref, name, ordinal, span: self.span_from(start), is_complete }
    }

    /// `'message' ident genericParams? '{' messageField* '}'`
    fn parse_message(&mut self) -> MessageDecl {
        let start = self.current_start();
        self.advance(); // 'message'
        let name = self.expect_identifier();
        let mut is_complete = !name.is_error();
        let generics = self.parse_generic_params();
        if generics.iter().any(Ident::is_error) {
            is_complete = false;
        }
        let mut fields = Vec::new();
        if self.expect_symbol(Symbol::LBrace) {
            fields = self.parse_star_list(Symbol::RBrace, Self::parse_message_field);
            if !self.expect_symbol(Symbol::RBrace) {
                is_complete = false;
            }
        } else {
            is_complete = false;
        }
        MessageDecl { name, generics, fields, span: self.span_from(start), is_complete }
    }

    /// `ident ('=' number)?`
    fn parse_enum_field(&mut self) -> EnumFieldDecl {
        let start = self.current_start();
        let name = self.expect_identifier();
        let value = if self.at_symbol(Symbol::Eq) {
            self.advance();
            self.expect_number()
        } else {
            None
        };
        EnumFieldDecl { name, value, span: self.span_from(start) }
    }

    /// `'enum' ident '{' enumField (',' enumField)* ','? '}'`
    fn parse_enum(&mut self) -> EnumDecl {
        let start = self.current_start();
        self.advance(); // 'enum'
        let name = self.expect_identifier();
        let mut is_complete = !name.is_error();
        let mut fields = Vec::new();
        if self.expect_symbol(Symbol::LBrace) {
            fields = self.parse_comma_list(Symbol::RBrace, Self::parse_enum_field);
            if !self.expect_symbol(Symbol::RBrace) {
                is_complete = false;
            }
        } else {
            is_complete = false;
        }
        EnumDecl { name, fields, span: self.span_from(start), is_complete }
    }

    /// `'string' 'enum' ident '{' string (',' string)* ','? '}'`
    fn parse_string_enum(&mut self) -> StringEnumDecl {
        let start = self.current_start();
        self.advance(); // identifier spelled "string"
        let mut is_complete = self.expect_keyword(Keyword::Enum);
        let name = self.expect_identifier();
        is_complete &= !name.is_error();
        let mut values = Vec::new();
        if self.expect_symbol(Symbol::LBrace) {
            values = self.parse_comma_list(Symbol::RBrace, Self::expect_string_lit);
            if !self.expect_symbol(Symbol::RBrace) {
                is_complete = false;
            }
        } else {
            is_complete = false;
        }
        StringEnumDecl { name, values, span: self.span_from(start), is_complete }
    }

    /// `'rpc' ident '(' 'stream'? type ')' 'returns' '(' 'stream'? type ')' ';'`
    fn parse_rpc(&mut self) -> RpcDecl {
        let start = self.current_start();
        self.advance(); // 'rpc'
        let name = self.expect_identifier();
        let mut is_complete = !name.is_error();
        is_complete &= self.expect_symbol(Symbol::LParen);
        let request_stream = if self.at_keyword(Keyword::Stream) {
            self.advance();
            true
        } else {
            false
        };
        let request_type = self.parse_type();
        is_complete &= request_type.is_complete;
        is_complete &= self.expect_symbol(Symbol::RParen);
        is_complete &= self.expect_keyword(Keyword::Returns);
        is_complete &= self.expect_symbol(Symbol::LParen);
        let response_stream = if self.at_keyword(Keyword::Stream) {
            self.advance();
            true
        } else {
            false
        };
        let response_type = self.parse_type();
        is_complete &= response_type.is_complete;
        is_complete &= self.expect_symbol(Symbol::RParen);
        is_complete &= self.expect_symbol(Symbol::Semi);
        RpcDecl {
            name,
            request_stream,
            request_type,
            response_stream,
            response_type,
            span: self.span_from(start),
            is_complete,
        }
    }

    /// `'service' ident '{' rpc* '}'`
    fn parse_service(&mut self) -> ServiceDecl {
        let start = self.current_start();
        self.advance(); // 'service'
        let name = self.expect_identifier();
        let mut is_complete = !name.is_error();
        let mut rpcs = Vec::new();
        if self.expect_symbol(Symbol::LBrace) {
            rpcs = self.parse_star_list(Symbol::RBrace, Self::parse_rpc);
            if !self.expect_symbol(Symbol::RBrace) {
                is_complete = false;
            }
        } else {
            is_complete = false;
        }
        ServiceDecl { name, rpcs, span: self.span_from(start), is_complete }
    }

    /// `file := packageDecl topLevel*`, parsed permissively: any production
    /// may appear any number of times in any order. Phase 1 of the semantic
    /// analyzer (not the parser) enforces that exactly one `package` comes
    /// first.
    fn parse_file(&mut self) -> ast::File {
        let mut nodes = Vec::new();
        while !self.at_eof() {
            let before = self.pos;
            if self.at_keyword(Keyword::Package) {
                nodes.push(AstNode::Package(self.parse_package()));
            } else if self.at_keyword(Keyword::Message) {
                nodes.push(AstNode::Message(self.parse_message()));
            } else if self.at_keyword(Keyword::Enum) {
                nodes.push(AstNode::Enum(self.parse_enum()));
            } else if self.at_identifier_text("string")
                && *self.peek_kind_at(1) == TokenKind::Keyword(Keyword::Enum)
            {
                nodes.push(AstNode::StringEnum(self.parse_string_enum()));
            } else if self.at_keyword(Keyword::Service) {
                nodes.push(AstNode::Service(self.parse_service()));
            } else {
                self.expect_fail("a top-level declaration (package, message, enum, string enum, or service)");
            }
            if self.pos == before {
                self.advance();
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use diagnostics::Diagnostics;
    use span::SourceMap;

    use super::*;

    fn parse_source(text: &str) -> (ast::File, Diagnostics) {
        let mut map = SourceMap::new();
        let file = map.insert("a.eproto", text);
        let mut diagnostics = Diagnostics::new();
        let tokens = lexer::tokenize(file, &map.get(file).unwrap().text.clone(), &mut diagnostics);
        let ast = parse(file, tokens, &mut diagnostics);
        (ast, diagnostics)
    }

    #[test]
    fn parses_package_and_message() {
        let (ast, diagnostics) =
            parse_source("package a; message Fruit { string name = 1; optional int32 weight = 2; }");
        assert!(!diagnostics.has_errors());
        assert_eq!(ast.len(), 2);
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert!(m.is_complete);
        assert_eq!(m.fields.len(), 2);
        assert!(!m.fields[0].optional);
        assert!(m.fields[1].optional);
    }

    #[test]
    fn generic_message_parses_type_params() {
        let (ast, diagnostics) =
            parse_source("package a; message Box<T> { T value = 1; }");
        assert!(!diagnostics.has_errors());
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert_eq!(m.generics.len(), 1);
        assert_eq!(m.generics[0].name, "T");
    }

    #[test]
    fn dotted_generic_parameter_raises_generic_form_invalid() {
        let (ast, diagnostics) = parse_source("package a; message Box<a.b> { a.b value = 1; }");
        assert!(diagnostics
            .all()
            .iter()
            .any(|d| d.kind == DiagnosticKind::GenericFormInvalid));
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert!(!m.is_complete);
    }

    #[test]
    fn parameterized_generic_parameter_raises_generic_form_invalid() {
        let (ast, diagnostics) = parse_source("package a; message Box<T<X>> { T value = 1; }");
        assert!(diagnostics
            .all()
            .iter()
            .any(|d| d.kind == DiagnosticKind::GenericFormInvalid));
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert!(!m.is_complete);
    }

    #[test]
    fn string_is_not_lexed_as_a_keyword() {
        let (ast, diagnostics) = parse_source("package a; message M { string s = 1; }");
        assert!(!diagnostics.has_errors());
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert_eq!(m.fields[0].type_ref.path_text(), "string");
    }

    #[test]
    fn string_enum_disambiguated_from_string_field() {
        let (ast, diagnostics) = parse_source(r#"package a; string enum Color { "red", "blue" }"#);
        assert!(!diagnostics.has_errors());
        let AstNode::StringEnum(e) = &ast[1] else { panic!("expected string enum") };
        assert_eq!(e.values.len(), 2);
    }

    #[test]
    fn generic_type_arguments_parse_nested() {
        let (ast, diagnostics) = parse_source(
            "package a; message M { Array<Nullable<int32>> xs = 1; }",
        );
        assert!(!diagnostics.has_errors());
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        let type_ref = &m.fields[0].type_ref;
        assert_eq!(type_ref.path_text(), "Array");
        assert_eq!(type_ref.args[0].path_text(), "Nullable");
        assert_eq!(type_ref.args[0].args[0].path_text(), "int32");
    }

    #[test]
    fn missing_semicolon_marks_incomplete_but_recovers() {
        let (ast, diagnostics) =
            parse_source("package a; message M { int32 x = 1 int32 y = 2; }");
        assert!(diagnostics.has_errors());
        let AstNode::Message(m) = &ast[1] else { panic!("expected message") };
        assert!(!m.is_complete);
        assert_eq!(m.fields.len(), 2);
    }

    #[test]
    fn garbage_top_level_token_does_not_hang_the_parser() {
        let (ast, diagnostics) = parse_source("package a; @@@ message M {}");
        assert!(diagnostics.has_errors());
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn service_with_rpc_parses() {
        let (ast, diagnostics) = parse_source(
            "package a; service Users { rpc get(stream GetRequest) returns (GetResponse); }",
        );
        assert!(!diagnostics.has_errors());
        let AstNode::Service(s) = &ast[1] else { panic!("expected service") };
        assert_eq!(s.rpcs.len(), 1);
        assert!(s.rpcs[0].request_stream);
        assert!(!s.rpcs[0].response_stream);
    }

    #[test]
    fn enum_with_explicit_and_implicit_values() {
        let (ast, diagnostics) = parse_source("package a; enum Color { Red, Green = 5, Blue, }");
        assert!(!diagnostics.has_errors());
        let AstNode::Enum(e) = &ast[1] else { panic!("expected enum") };
        assert_eq!(e.fields.len(), 3);
        assert_eq!(e.fields[1].value.map(|v| v.value), Some(5));
        assert!(e.fields[0].value.is_none());
    }
}
