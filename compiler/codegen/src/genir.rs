//! GenIR — the intermediate tree of serialize/deserialize combinators that
//! the emitter walks, independent of the output language.
//!
//! Built fresh per emit (§4.5); nothing here is persisted across runs.

/// Protobuf-compatible wire types. The builtin lookup table is fixed; every
/// compound type (`Array`, `Map`, `Nullable`, `Message`) is always `Len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Variable-length integer encoding.
    Varint = 0,
    /// 64-bit fixed-width.
    I64 = 1,
    /// Length-delimited.
    Len = 2,
    /// 32-bit fixed-width.
    I32 = 5,
}

/// How a `Field`'s value is read off its enclosing container at emit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The value itself, unchanged.
    Identity,
    /// A named member of the enclosing value (`value.<name>`).
    FieldName(String),
    /// The current index of an enclosing array traversal.
    ArrayIndex,
}

/// A guard on whether a `Field` is actually serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// No guard; always emit.
    Always,
    /// Emit only when the value is not `null`.
    NotNull,
    /// Emit only when the value is not `undefined`/absent.
    NotUndefined,
    /// A caller-supplied predicate expression, used by `Any`'s branch table.
    Custom(String),
}

/// One labelled member of a `Struct` or a branch of a `Switch`.
#[derive(Debug, Clone)]
pub struct FieldNode {
    /// The field's wire ordinal (its tag number).
    pub ordinal: i32,
    /// The wire type the tag byte advertises.
    pub wire: WireType,
    /// How this field's value is read off its container.
    pub selector: Selector,
    /// Guard on whether the field is actually written/expected.
    pub condition: Condition,
    /// The field's own value encoding.
    pub sub: Box<Node>,
}

/// The uniform GenIR node, per the table in §4.5.
#[derive(Debug, Clone)]
pub enum Node {
    /// Leaf: one scalar encode/decode call.
    Primitive {
        /// Name of the writer procedure, e.g. `write_int32`.
        writer_fn: String,
        /// Name of the reader procedure, e.g. `read_int32`.
        reader_fn: String,
        /// The wire type this primitive advertises.
        wire: WireType,
    },
    /// A one-byte discriminant (0 null, 1 present) followed by `sub`.
    Nullable {
        /// The wrapped encoding.
        sub: Box<Node>,
    },
    /// Length-delimited framing around `sub`.
    Len {
        /// The framed encoding.
        sub: Box<Node>,
    },
    /// Packed-style repeated encoding of `sub`, inside the enclosing `Len`.
    Array {
        /// The per-element encoding.
        sub: Box<Node>,
    },
    /// A message body: initialize a value, then match incoming wire tags to
    /// fields by ordinal.
    Struct {
        /// Expression initializing the value before fields are populated.
        init_value: String,
        /// The field list, in declaration order.
        fields: Vec<FieldNode>,
    },
    /// Used for the builtin `any`: serialize picks the first branch whose
    /// condition holds; deserialize expands to the same tag-match as
    /// `Struct`.
    Switch {
        /// The branch list, tried in order at serialize time.
        branches: Vec<FieldNode>,
    },
    /// Bidirectional value adaptation around `sub`, e.g. `Map<K,V>` as a
    /// sequence of key/value structs, or an enum as a plain integer.
    MapValue {
        /// Expression adapting a value before serializing `sub`, if any.
        map_serialize: Option<String>,
        /// Expression adapting a value after deserializing `sub`, if any.
        map_deserialize: Option<String>,
        /// The adapted encoding.
        sub: Box<Node>,
    },
}

impl Node {
    /// The wire type this node advertises at the point it is embedded in a
    /// `Field`.
    pub fn wire_type(&self) -> WireType {
        match self {
            Node::Primitive { wire, .. } => *wire,
            Node::Nullable { .. }
            | Node::Len { .. }
            | Node::Array { .. }
            | Node::Struct { .. }
            | Node::Switch { .. } => WireType::Len,
            Node::MapValue { sub, .. } => sub.wire_type(),
        }
    }
}
