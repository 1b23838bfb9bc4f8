#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Token and AST data types shared by the tokenizer, parser, and semantic
//! analyzer.
//!
//! Every node carries the span(s) of its defining tokens and an
//! `is_complete` flag: `false` means a required sub-production was missing
//! and a synthetic placeholder took its place, so downstream passes can
//! pattern-match on the tagged variant and short-circuit on incomplete
//! subtrees instead of throwing.

use serde::{Deserialize, Serialize};
use span::Span;

/// The fixed keyword set of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    /// `package`
    Package,
    /// `message`
    Message,
    /// `enum`
    Enum,
    /// `service`
    Service,
    /// `rpc`
    Rpc,
    /// `stream`
    Stream,
    /// `returns`
    Returns,
    /// `optional`
    Optional,
}

impl Keyword {
    /// Map an identifier's text to a keyword, if it is one.
    ///
    /// `string` is deliberately absent: it names both a builtin scalar type
    /// and the lead word of a `string enum` declaration, so it is lexed as a
    /// plain identifier and disambiguated contextually by the parser (an
    /// identifier spelled `"string"` immediately followed by the `enum`
    /// keyword).
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "package" => Keyword::Package,
            "message" => Keyword::Message,
            "enum" => Keyword::Enum,
            "service" => Keyword::Service,
            "rpc" => Keyword::Rpc,
            "stream" => Keyword::Stream,
            "returns" => Keyword::Returns,
            "optional" => Keyword::Optional,
            _ => return None,
        })
    }
}

/// The fixed symbol set of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `;`
    Semi,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=`
    Eq,
    /// `,`
    Comma,
    /// `.`
    Dot,
}

impl Symbol {
    /// Map a single character to a symbol, if it is one of the fixed set.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '<' => Symbol::Lt,
            '>' => Symbol::Gt,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            ';' => Symbol::Semi,
            '{' => Symbol::LBrace,
            '}' => Symbol::RBrace,
            '=' => Symbol::Eq,
            ',' => Symbol::Comma,
            '.' => Symbol::Dot,
            _ => return None,
        })
    }
}

/// The tagged variant a token carries, beyond its span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    /// A reserved word.
    Keyword(Keyword),
    /// One of the fixed punctuation symbols.
    Symbol(Symbol),
    /// `[A-Za-z_][A-Za-z0-9_]*`, not promoted to a keyword.
    Identifier(String),
    /// A double-quoted string literal; value has escapes stripped of their
    /// leading backslash only (no interpretation of `\n`, `\"`, etc).
    StringLiteral(String),
    /// A decimal digit run, parsed as a signed 64-bit integer.
    NumericLiteral(i64),
    /// A `//...` or `/* ... */` comment, retained in the stream for LSP
    /// syntax highlighting and stripped at parser entry.
    Comment(String),
    /// A character outside the lexical alphabet.
    Unknown(char),
    /// The single end-of-file token that always terminates a token stream.
    Eof,
}

/// One lexical token with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The token's tagged contents.
    pub kind: TokenKind,
    /// The span of source text this token covers.
    pub span: Span,
}

impl Token {
    /// Construct a token.
    pub fn new(kind: TokenKind, span: Span) -> Self { Self { kind, span } }

    /// True for `TokenKind::Comment`.
    pub fn is_comment(&self) -> bool { matches!(self.kind, TokenKind::Comment(_)) }

    /// True for the terminal `TokenKind::Eof`.
    pub fn is_eof(&self) -> bool { matches!(self.kind, TokenKind::Eof) }
}

/// An identifier occurrence: text plus the span it was spelled at.
///
/// An empty `name` with a zero-width span marks a synthesized `ERROR_TOKEN`
/// inserted by the parser when a required identifier was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    /// The identifier's text, or empty for a synthesized error token.
    pub name: String,
    /// Where this identifier occurred (or was synthesized).
    pub span: Span,
}

impl Ident {
    /// A real identifier occurrence.
    pub fn new(name: impl Into<String>, span: Span) -> Self { Self { name: name.into(), span } }

    /// A synthetic `ERROR_TOKEN` standing in for a missing identifier.
    pub fn error(span: Span) -> Self { Self { name: String::new(), span } }

    /// Whether this is a synthesized error token rather than real source text.
    pub fn is_error(&self) -> bool { self.name.is_empty() }
}

/// An integer literal occurrence (field ordinal or enum value).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberLit {
    /// The parsed value.
    pub value: i64,
    /// Where it occurred.
    pub span: Span,
}

/// A string literal occurrence (a string-enum member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLit {
    /// The literal's value, with only the escaping backslash stripped.
    pub value: String,
    /// Where it occurred.
    pub span: Span,
}

/// A `type` production: a dotted identifier path plus optional generic
/// arguments, e.g. `a.Fruit` or `Array<Pagination<int32>>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// The dotted path segments, in source order (`a`, `Fruit`).
    pub segments: Vec<Ident>,
    /// Generic type arguments, if any.
    pub args: Vec<TypeRef>,
    /// The span covering the whole type expression, including arguments.
    pub span: Span,
    /// False if a required segment or a `>` closing the argument list was
    /// missing.
    pub is_complete: bool,
}

impl TypeRef {
    /// The dotted textual path, e.g. `a.Fruit`, without generic arguments.
    pub fn path_text(&self) -> String {
        self.segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".")
    }
}

/// `package <dottedId>;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDecl {
    /// The dotted segments of the package identifier.
    pub segments: Vec<Ident>,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if the `;` (or the identifier) was missing.
    pub is_complete: bool,
}

impl PackageDecl {
    /// The concatenation (without separator) of the segments' text, i.e.
    /// the internal `packageId`.
    pub fn package_id(&self) -> String {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }
}

/// `optional? type ident ('=' number)? ';'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Whether the `optional` keyword preceded this field.
    pub optional: bool,
    /// The field's declared type expression.
    pub type_ref: TypeRef,
    /// The field's name.
    pub name: Ident,
    /// An explicit `= n` ordinal, if given.
    pub ordinal: Option<NumberLit>,
    /// Span of the whole field declaration.
    pub span: Span,
    /// False if the type, name, or terminating `;` was missing.
    pub is_complete: bool,
}

/// `message type '{' messageField* '}'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDecl {
    /// The message's own name.
    pub name: Ident,
    /// Formal generic parameter names, e.g. `<A, B>`.
    pub generics: Vec<Ident>,
    /// The ordered field list as written.
    pub fields: Vec<FieldDecl>,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if the name or the closing `}` was missing.
    pub is_complete: bool,
}

/// `ident ('=' number)?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumFieldDecl {
    /// The member's name.
    pub name: Ident,
    /// An explicit `= n` value, if given.
    pub value: Option<NumberLit>,
    /// Span of the whole member declaration.
    pub span: Span,
}

/// `enum ident '{' enumField (',' enumField)* ','? '}'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    /// The enum's name.
    pub name: Ident,
    /// The member list as written.
    pub fields: Vec<EnumFieldDecl>,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if the name or the closing `}` was missing.
    pub is_complete: bool,
}

/// `string enum ident '{' string (',' string)* ','? '}'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringEnumDecl {
    /// The string-enum's name.
    pub name: Ident,
    /// The literal values, in source order, not deduplicated.
    pub values: Vec<StringLit>,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if the name or the closing `}` was missing.
    pub is_complete: bool,
}

/// `rpc ident '(' 'stream'? type ')' 'returns' '(' 'stream'? type ')' ';'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcDecl {
    /// The RPC's name.
    pub name: Ident,
    /// Whether the request is declared `stream`.
    pub request_stream: bool,
    /// The request type expression.
    pub request_type: TypeRef,
    /// Whether the response is declared `stream`.
    pub response_stream: bool,
    /// The response type expression.
    pub response_type: TypeRef,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if any required piece was missing.
    pub is_complete: bool,
}

/// `service ident '{' rpc* '}'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDecl {
    /// The service's name.
    pub name: Ident,
    /// The RPC list as written.
    pub rpcs: Vec<RpcDecl>,
    /// Span of the whole declaration.
    pub span: Span,
    /// False if the name or the closing `}` was missing.
    pub is_complete: bool,
}

/// One top-level AST node, tagged by which production produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    /// A `package` declaration.
    Package(PackageDecl),
    /// A `message` declaration.
    Message(MessageDecl),
    /// A `service` declaration.
    Service(ServiceDecl),
    /// An `enum` declaration.
    Enum(EnumDecl),
    /// A `string enum` declaration.
    StringEnum(StringEnumDecl),
}

impl AstNode {
    /// Span of this node's defining tokens.
    pub fn span(&self) -> Span {
        match self {
            AstNode::Package(n) => n.span,
            AstNode::Message(n) => n.span,
            AstNode::Service(n) => n.span,
            AstNode::Enum(n) => n.span,
            AstNode::StringEnum(n) => n.span,
        }
    }

    /// Whether this node's required sub-parts all parsed without a synthetic
    /// error token taking their place.
    pub fn is_complete(&self) -> bool {
        match self {
            AstNode::Package(n) => n.is_complete,
            AstNode::Message(n) => n.is_complete,
            AstNode::Service(n) => n.is_complete,
            AstNode::Enum(n) => n.is_complete,
            AstNode::StringEnum(n) => n.is_complete,
        }
    }

    /// The declared name of this node, if it has one (a `package` node does
    /// not — it names a namespace, not a symbol).
    pub fn name(&self) -> Option<&Ident> {
        match self {
            AstNode::Package(_) => None,
            AstNode::Message(n) => Some(&n.name),
            AstNode::Service(n) => Some(&n.name),
            AstNode::Enum(n) => Some(&n.name),
            AstNode::StringEnum(n) => Some(&n.name),
        }
    }
}

/// The parsed AST for one source file: a flat list of top-level nodes, the
/// first of which is expected (but not guaranteed, for malformed input) to
/// be a `package` declaration.
pub type File = Vec<AstNode>;
