//! Type definitions: the canonical things a [`crate::TypeKey`] can resolve to.

use serde::{Deserialize, Serialize};
use span::Span;

use crate::instance::TypeInstance;

/// The fixed set of builtin scalar and pseudo types, plus the three generic
/// constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinName {
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `sint32`
    Sint32,
    /// `sint64`
    Sint64,
    /// `fixed32`
    Fixed32,
    /// `fixed64`
    Fixed64,
    /// `sfixed32`
    Sfixed32,
    /// `sfixed64`
    Sfixed64,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `Date`, a pseudo type serialized as an ISO-8601 string.
    Date,
    /// `void`, the neutral empty request/response type.
    Void,
    /// `any`, the tagged-union pseudo type.
    Any,
    /// `Array<T>`
    Array,
    /// `Nullable<T>`
    Nullable,
    /// `Map<K, V>`
    Map,
}

impl BuiltinName {
    /// The full fixed builtin table, in a stable order.
    pub const ALL: &'static [BuiltinName] = &[
        BuiltinName::Int32,
        BuiltinName::Int64,
        BuiltinName::Uint32,
        BuiltinName::Uint64,
        BuiltinName::Float,
        BuiltinName::Double,
        BuiltinName::Sint32,
        BuiltinName::Sint64,
        BuiltinName::Fixed32,
        BuiltinName::Fixed64,
        BuiltinName::Sfixed32,
        BuiltinName::Sfixed64,
        BuiltinName::Bool,
        BuiltinName::String,
        BuiltinName::Bytes,
        BuiltinName::Date,
        BuiltinName::Void,
        BuiltinName::Any,
        BuiltinName::Array,
        BuiltinName::Nullable,
        BuiltinName::Map,
    ];

    /// The source-level spelling of this builtin.
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinName::Int32 => "int32",
            BuiltinName::Int64 => "int64",
            BuiltinName::Uint32 => "uint32",
            BuiltinName::Uint64 => "uint64",
            BuiltinName::Float => "float",
            BuiltinName::Double => "double",
            BuiltinName::Sint32 => "sint32",
            BuiltinName::Sint64 => "sint64",
            BuiltinName::Fixed32 => "fixed32",
            BuiltinName::Fixed64 => "fixed64",
            BuiltinName::Sfixed32 => "sfixed32",
            BuiltinName::Sfixed64 => "sfixed64",
            BuiltinName::Bool => "bool",
            BuiltinName::String => "string",
            BuiltinName::Bytes => "bytes",
            BuiltinName::Date => "Date",
            BuiltinName::Void => "void",
            BuiltinName::Any => "any",
            BuiltinName::Array => "Array",
            BuiltinName::Nullable => "Nullable",
            BuiltinName::Map => "Map",
        }
    }

    /// Parse the source-level spelling of a builtin, if it names one.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == s)
    }

    /// The formal arity: how many generic arguments this builtin takes.
    pub fn formal_arity(self) -> usize {
        match self {
            BuiltinName::Array | BuiltinName::Nullable => 1,
            BuiltinName::Map => 2,
            _ => 0,
        }
    }
}

/// A builtin type definition: `{ name, formal-arity, rest-args? }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinDef {
    /// Which builtin this is.
    pub name: BuiltinName,
    /// Number of generic arguments this builtin requires.
    pub formal_arity: usize,
    /// Reserved for a future variadic builtin; the fixed builtin table never
    /// sets this.
    pub rest_args: bool,
}

impl BuiltinDef {
    /// Construct the definition for a given builtin.
    pub fn new(name: BuiltinName) -> Self {
        Self { name, formal_arity: name.formal_arity(), rest_args: false }
    }
}

/// One numeric enum member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumField {
    /// The member's name.
    pub name: String,
    /// The member's value. Sequential from 0 unless given explicitly;
    /// duplicate values across members are permitted.
    pub value: i32,
}

/// A numeric `enum` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    /// The enum's name.
    pub name: String,
    /// Package this enum is defined in.
    pub package_id: String,
    /// The member list, in declaration order.
    pub fields: Vec<EnumField>,
    /// Where this enum was declared.
    pub span: Span,
}

/// A `string enum` definition: a flat, non-deduplicated set of literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringEnumDef {
    /// The string-enum's name.
    pub name: String,
    /// Package this string-enum is defined in.
    pub package_id: String,
    /// The literal values, in declaration order.
    pub values: Vec<String>,
    /// Where this string-enum was declared.
    pub span: Span,
}

/// One message field: `{ordinal, name, optional, type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageField {
    /// The field's effective ordinal, per the running-counter rules of
    /// ordinal checking.
    pub ordinal: i32,
    /// The field's name.
    pub name: String,
    /// Whether the field was declared `optional`.
    pub optional: bool,
    /// The field's resolved type.
    pub type_instance: TypeInstance,
    /// Where this field was declared.
    pub span: Span,
}

/// A `message` definition: formal generics, an ordered field list, and the
/// set of concrete argument tuples reachable from RPC signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    /// The message's name.
    pub name: String,
    /// Package this message is defined in.
    pub package_id: String,
    /// Formal generic parameter names, scoped only to this message.
    pub generics: Vec<String>,
    /// The field list as resolved (not yet substituted for any particular
    /// realization).
    pub fields: Vec<MessageField>,
    /// The set of distinct argument tuples this message is realized with,
    /// populated by generic instance collection (§4.3) and grown to a
    /// fixpoint as monomorphizations reveal further generic messages nested
    /// in their own fields.
    ///
    /// Always empty for non-generic messages (`generics.is_empty()`), which
    /// are their own sole "realization".
    pub realized_arg_tuples: Vec<Vec<TypeInstance>>,
    /// Where this message was declared.
    pub span: Span,
}

impl MessageDef {
    /// Record `args` in the realization set if not already present
    /// (structural equality, recursive on arguments). Returns `true` if the
    /// tuple was new.
    pub fn record_realization(&mut self, args: Vec<TypeInstance>) -> bool {
        if self.realized_arg_tuples.contains(&args) {
            false
        } else {
            self.realized_arg_tuples.push(args);
            true
        }
    }
}

/// The canonical thing a [`crate::TypeKey`] resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDefinition {
    /// One of the fixed builtin scalars, pseudo types, or generic
    /// constructors.
    Builtin(BuiltinDef),
    /// A numeric `enum`.
    Enum(EnumDef),
    /// A `string enum`.
    StringEnum(StringEnumDef),
    /// A `message`, generic or not.
    Message(MessageDef),
}

impl TypeDefinition {
    /// The formal arity of this definition: how many generic arguments a
    /// reference to it may supply.
    pub fn formal_arity(&self) -> usize {
        match self {
            TypeDefinition::Builtin(b) => b.formal_arity,
            TypeDefinition::Message(m) => m.generics.len(),
            TypeDefinition::Enum(_) | TypeDefinition::StringEnum(_) => 0,
        }
    }

    /// True if this is a generic message (`formal_arity() > 0`).
    pub fn is_generic_message(&self) -> bool {
        matches!(self, TypeDefinition::Message(m) if !m.generics.is_empty())
    }

    /// The definition's own declaration span, if it has one distinct from a
    /// builtin (builtins are not declared in source).
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeDefinition::Builtin(_) => None,
            TypeDefinition::Enum(e) => Some(e.span),
            TypeDefinition::StringEnum(s) => Some(s.span),
            TypeDefinition::Message(m) => Some(m.span),
        }
    }
}
