#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generic Monomorphizer — turns a generic message plus one realized
//! argument tuple into a concrete field list.
//!
//! Substitution is a pure tree rewrite over [`ir::TypeInstance`]; ordinals
//! and optionality are carried through untouched.

use std::collections::HashMap;

use ir::{MessageDef, MessageField, TypeInstance};

/// One concrete instantiation of a generic message: its field list with
/// every [`TypeInstance::Generic`] occurrence replaced by the corresponding
/// argument from `args`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinitionInstance {
    /// The originating message's name.
    pub name: String,
    /// The package the originating message is defined in.
    pub package_id: String,
    /// The concrete argument tuple this instance was realized with, in the
    /// same order as the message's formal generics.
    pub args: Vec<TypeInstance>,
    /// The monomorphized field list.
    pub fields: Vec<MessageField>,
}

/// Substitute `args` for `def`'s formal generics across every field's type,
/// producing one concrete instantiation.
///
/// `args.len()` is expected to match `def.generics.len()`; a shorter tuple
/// just leaves the trailing formals unbound (substitution is a no-op for
/// unbound names), which cannot happen for a tuple produced by the semantic
/// analyzer's generic instance collection.
pub fn monomorphize(def: &MessageDef, args: &[TypeInstance]) -> MessageDefinitionInstance {
    let bindings: HashMap<String, TypeInstance> =
        def.generics.iter().cloned().zip(args.iter().cloned()).collect();

    let fields = def
        .fields
        .iter()
        .map(|field| MessageField {
            ordinal: field.ordinal,
            name: field.name.clone(),
            optional: field.optional,
            type_instance: field.type_instance.substitute(&bindings),
            span: field.span,
        })
        .collect();

    MessageDefinitionInstance {
        name: def.name.clone(),
        package_id: def.package_id.clone(),
        args: args.to_vec(),
        fields,
    }
}

/// Monomorphize every realization recorded in `def.realized_arg_tuples`.
/// Empty for a non-generic message, which is its own sole instance (produced
/// separately by the caller, since it has no realized tuples to iterate).
pub fn monomorphize_all(def: &MessageDef) -> Vec<MessageDefinitionInstance> {
    def.realized_arg_tuples.iter().map(|args| monomorphize(def, args)).collect()
}

#[cfg(test)]
mod tests {
    use ir::TypeKey;
    use span::{Position, SourceMap, Span};

    use super::*;

    fn dummy_span() -> Span {
        let mut map = SourceMap::new();
        let file = map.insert("p.eproto", "");
        Span::point(file, Position::default())
    }

    #[test]
    fn substitutes_generic_field_type() {
        let def = MessageDef {
            name: "Box".into(),
            package_id: "p".into(),
            generics: vec!["T".into()],
            fields: vec![MessageField {
                ordinal: 1,
                name: "value".into(),
                optional: false,
                type_instance: TypeInstance::Generic("T".into()),
                span: dummy_span(),
            }],
            realized_arg_tuples: vec![vec![TypeInstance::real(TypeKey::new("p", "int32"))]],
            span: dummy_span(),
        };

        let instance = monomorphize(&def, &[TypeInstance::real(TypeKey::new("p", "int32"))]);
        assert_eq!(instance.fields[0].type_instance, TypeInstance::real(TypeKey::new("p", "int32")));
        assert_eq!(instance.fields[0].ordinal, 1);
        assert!(!instance.fields[0].optional);
    }

    #[test]
    fn monomorphize_all_produces_one_instance_per_realization() {
        let def = MessageDef {
            name: "Box".into(),
            package_id: "p".into(),
            generics: vec!["T".into()],
            fields: vec![MessageField {
                ordinal: 1,
                name: "value".into(),
                optional: false,
                type_instance: TypeInstance::Generic("T".into()),
                span: dummy_span(),
            }],
            realized_arg_tuples: vec![
                vec![TypeInstance::real(TypeKey::new("p", "int32"))],
                vec![TypeInstance::real(TypeKey::new("p", "string"))],
            ],
            span: dummy_span(),
        };

        let instances = monomorphize_all(&def);
        assert_eq!(instances.len(), 2);
        assert_ne!(instances[0].fields[0].type_instance, instances[1].fields[0].type_instance);
    }

    #[test]
    fn unrelated_generic_is_untouched_by_partial_bindings() {
        let def = MessageDef {
            name: "Pair".into(),
            package_id: "p".into(),
            generics: vec!["A".into()],
            fields: vec![MessageField {
                ordinal: 1,
                name: "value".into(),
                optional: false,
                type_instance: TypeInstance::Generic("B".into()),
                span: dummy_span(),
            }],
            realized_arg_tuples: vec![],
            span: dummy_span(),
        };

        let instance = monomorphize(&def, &[TypeInstance::real(TypeKey::new("p", "int32"))]);
        assert_eq!(instance.fields[0].type_instance, TypeInstance::Generic("B".into()));
    }
}
