//! GenIR Construction (§4.6) — lowers a deeply-real [`TypeInstance`] into a
//! [`Node`] tree under a selected wire-format [`Strategy`].

use config::Strategy;
use ir::{BuiltinName, TypeDefinition, TypeInstance, TypeKey};
use monomorphizer::MessageDefinitionInstance;
use registry::TypeRegistry;

use crate::genir::{Condition, FieldNode, Node, Selector, WireType};
use crate::utils::{import_alias, realization_name};

/// The wire type a builtin scalar advertises. Compound types are always
/// `Len`, handled directly by [`Node::wire_type`].
fn builtin_wire_type(name: BuiltinName) -> WireType {
    use BuiltinName::*;
    match name {
        Int32 | Uint32 | Sint32 | Bool => WireType::Varint,
        Int64 | Uint64 | Sint64 | Double | Fixed64 | Sfixed64 => WireType::I64,
        Float | Fixed32 | Sfixed32 => WireType::I32,
        String | Bytes | Date | Any | Array | Nullable | Map | Void => WireType::Len,
    }
}

/// Fallback node for a reference this crate cannot otherwise construct a
/// codec for: an unresolved type, or a builtin container missing the
/// type arguments its arity requires.
fn unknown_node() -> Node {
    Node::Primitive {
        writer_fn: "write_unknown".to_string(),
        reader_fn: "read_unknown".to_string(),
        wire: WireType::Varint,
    }
}

/// Build the GenIR for a deeply-real type instance used at a field or RPC
/// signature position.
pub fn build_type_node(instance: &TypeInstance, registry: &TypeRegistry, strategy: Strategy) -> Node {
    let TypeInstance::Real { key, args } = instance else {
        return unknown_node();
    };

    if key.package_id == TypeKey::BUILTIN_PACKAGE {
        return build_builtin_node(key, args, registry, strategy);
    }

    match registry.get_definition(key) {
        Some(TypeDefinition::Enum(_)) => Node::MapValue {
            map_serialize: Some("(value as i32)".to_string()),
            map_deserialize: Some("from_i32".to_string()),
            sub: Box::new(Node::Primitive {
                writer_fn: "write_uint32".to_string(),
                reader_fn: "read_uint32".to_string(),
                wire: WireType::Varint,
            }),
        },
        Some(TypeDefinition::StringEnum(_)) => Node::Primitive {
            writer_fn: "write_string".to_string(),
            reader_fn: "read_string".to_string(),
            wire: WireType::Len,
        },
        _ => {
            // A message reference: delegate to the named realization's own
            // serialize/deserialize pair.
            let name = realization_name(key, args);
            Node::Len {
                sub: Box::new(Node::Primitive {
                    writer_fn: format!("{name}::serialize"),
                    reader_fn: format!("{name}::deserialize"),
                    wire: WireType::Len,
                }),
            }
        }
    }
}

fn build_builtin_node(
    key: &TypeKey,
    args: &[TypeInstance],
    registry: &TypeRegistry,
    strategy: Strategy,
) -> Node {
    let Some(name) = BuiltinName::from_str(&key.name) else {
        return unknown_node();
    };

    match name {
        BuiltinName::Bool => Node::MapValue {
            map_serialize: Some("(if value { 1u32 } else { 0u32 })".to_string()),
            map_deserialize: Some("(value != 0)".to_string()),
            sub: Box::new(Node::Primitive {
                writer_fn: "write_uint32".to_string(),
                reader_fn: "read_uint32".to_string(),
                wire: WireType::Varint,
            }),
        },
        BuiltinName::Date => Node::Primitive {
            writer_fn: "write_iso8601".to_string(),
            reader_fn: "read_iso8601".to_string(),
            wire: WireType::Len,
        },
        BuiltinName::Any => Node::Len {
            sub: Box::new(Node::Primitive {
                writer_fn: "Builtin__Any::serialize".to_string(),
                reader_fn: "Builtin__Any::deserialize".to_string(),
                wire: WireType::Len,
            }),
        },
        BuiltinName::Void => Node::Primitive {
            writer_fn: "write_void".to_string(),
            reader_fn: "read_void".to_string(),
            wire: WireType::Len,
        },
        // Analysis only flags *excess* generic arguments (§4.3); an
        // under-applied container (`Array` with no element type) can still
        // reach emission, so these fall back to `unknown_node` rather than
        // indexing an empty slice.
        BuiltinName::Array => match args.first() {
            Some(element) => build_array_node(element, registry, strategy),
            None => unknown_node(),
        },
        BuiltinName::Nullable => match args.first() {
            Some(inner) => build_nullable_node(inner, registry, strategy),
            None => unknown_node(),
        },
        BuiltinName::Map => match (args.first(), args.get(1)) {
            (Some(k), Some(v)) => build_map_node(k, v, registry, strategy),
            _ => unknown_node(),
        },
        scalar => Node::Primitive {
            writer_fn: format!("write_{}", scalar.as_str()),
            reader_fn: format!("read_{}", scalar.as_str()),
            wire: builtin_wire_type(scalar),
        },
    }
}

fn build_array_node(element: &TypeInstance, registry: &TypeRegistry, strategy: Strategy) -> Node {
    let element_node = build_type_node(element, registry, strategy);

    // protobuf cannot nest packed arrays directly: `native` wraps each inner
    // array in a one-field struct so the outer array's elements are still
    // length-delimited messages rather than bare arrays.
    let element_node = if strategy == Strategy::Native && matches!(element, TypeInstance::Real { key, .. } if key == &TypeKey::builtin(BuiltinName::Array.as_str()))
    {
        Node::Len {
            sub: Box::new(Node::Struct {
                init_value: "Default::default()".to_string(),
                fields: vec![FieldNode {
                    ordinal: 1,
                    wire: element_node.wire_type(),
                    selector: Selector::Identity,
                    condition: Condition::Always,
                    sub: Box::new(element_node),
                }],
            }),
        }
    } else {
        element_node
    };

    Node::Len { sub: Box::new(Node::Array { sub: Box::new(element_node) }) }
}

fn build_nullable_node(inner: &TypeInstance, registry: &TypeRegistry, strategy: Strategy) -> Node {
    let inner_node = build_type_node(inner, registry, strategy);
    match strategy {
        Strategy::Evolved => Node::Len { sub: Box::new(Node::Nullable { sub: Box::new(inner_node) }) },
        // native | zod | skip: fall back to the protobuf-compatible shape;
        // zod/skip never reach the GenIR builder (see lib.rs), kept
        // exhaustive for forward compatibility rather than `_ =>`.
        _ => Node::Len {
            sub: Box::new(Node::Struct {
                init_value: "None".to_string(),
                fields: vec![FieldNode {
                    ordinal: 1,
                    wire: inner_node.wire_type(),
                    selector: Selector::Identity,
                    condition: Condition::NotNull,
                    sub: Box::new(inner_node),
                }],
            }),
        },
    }
}

fn build_map_node(
    key_ty: &TypeInstance,
    value_ty: &TypeInstance,
    registry: &TypeRegistry,
    strategy: Strategy,
) -> Node {
    let key_node = build_type_node(key_ty, registry, strategy);
    let value_node = build_type_node(value_ty, registry, strategy);
    let entry_struct = Node::Struct {
        init_value: "Default::default()".to_string(),
        fields: vec![
            FieldNode {
                ordinal: 1,
                wire: key_node.wire_type(),
                selector: Selector::Identity,
                condition: Condition::Always,
                sub: Box::new(key_node),
            },
            FieldNode {
                ordinal: 2,
                wire: value_node.wire_type(),
                selector: Selector::Identity,
                condition: Condition::Always,
                sub: Box::new(value_node),
            },
        ],
    };
    Node::MapValue {
        map_serialize: Some("entries".to_string()),
        map_deserialize: Some("from_entries".to_string()),
        sub: Box::new(Node::Len { sub: Box::new(Node::Array { sub: Box::new(entry_struct) }) }),
    }
}

/// Build the `Struct` body for one message realization. Per §4.6, the
/// top-level `Len` a field-position reference would carry is unwrapped here:
/// the caller invoking `<name>::serialize` already owns the length framing
/// via the `Message` construction rule, so the message's own top-level node
/// is the bare `Struct`.
pub fn build_message_struct(
    instance: &MessageDefinitionInstance,
    registry: &TypeRegistry,
    strategy: Strategy,
) -> Node {
    let fields = instance
        .fields
        .iter()
        .map(|field| {
            let mut sub = build_type_node(&field.type_instance, registry, strategy);
            if field.optional {
                sub = match strategy {
                    Strategy::Evolved => Node::Len { sub: Box::new(Node::Nullable { sub: Box::new(sub) }) },
                    _ => Node::Len {
                        sub: Box::new(Node::Struct {
                            init_value: "None".to_string(),
                            fields: vec![FieldNode {
                                ordinal: 1,
                                wire: sub.wire_type(),
                                selector: Selector::Identity,
                                condition: Condition::NotNull,
                                sub: Box::new(sub),
                            }],
                        }),
                    },
                };
            }
            FieldNode {
                ordinal: field.ordinal,
                wire: sub.wire_type(),
                selector: Selector::FieldName(field.name.clone()),
                condition: Condition::Always,
                sub: Box::new(sub),
            }
        })
        .collect();

    Node::Struct { init_value: "Default::default()".to_string(), fields }
}

/// Build the fixed `Switch` for the builtin `any` pseudo type (§4.6). The
/// branch order is significant: it is also the order deserialization's
/// expanded tag-match tries.
pub fn build_any_switch(registry: &TypeRegistry, strategy: Strategy) -> Node {
    let array_of_any = Node::Len {
        sub: Box::new(Node::Array {
            sub: Box::new(build_builtin_node(
                &TypeKey::builtin(BuiltinName::Any.as_str()),
                &[],
                registry,
                strategy,
            )),
        }),
    };
    let map_string_any = build_map_node(
        &TypeInstance::real(TypeKey::builtin(BuiltinName::String.as_str())),
        &TypeInstance::real(TypeKey::builtin(BuiltinName::Any.as_str())),
        registry,
        strategy,
    );

    let branch = |ordinal, condition, writer_fn: &str, reader_fn: &str, wire| FieldNode {
        ordinal,
        wire,
        selector: Selector::Identity,
        condition,
        sub: Box::new(Node::Primitive {
            writer_fn: writer_fn.to_string(),
            reader_fn: reader_fn.to_string(),
            wire,
        }),
    };

    Node::Switch {
        branches: vec![
            branch(1, Condition::Custom("value.is_null()".into()), "write_void", "read_void", WireType::Len),
            branch(2, Condition::Custom("value.is_number()".into()), "write_double", "read_double", WireType::I64),
            branch(3, Condition::Custom("value.is_string()".into()), "write_string", "read_string", WireType::Len),
            branch(4, Condition::Custom("value.is_bool()".into()), "write_uint32", "read_uint32", WireType::Varint),
            FieldNode {
                ordinal: 6,
                wire: WireType::Len,
                selector: Selector::Identity,
                condition: Condition::Custom("value.is_array()".into()),
                sub: Box::new(array_of_any),
            },
            FieldNode {
                ordinal: 5,
                wire: WireType::Len,
                selector: Selector::Identity,
                condition: Condition::Custom("value.is_object()".into()),
                sub: Box::new(map_string_any),
            },
        ],
    }
}

/// The import alias used for the builtin `Any` struct when referenced from a
/// generated file.
pub fn any_import_alias() -> String {
    import_alias(&TypeKey::builtin(BuiltinName::Any.as_str()))
}
