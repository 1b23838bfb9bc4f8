//! Type instances: how a definition is referenced and parameterized at a
//! particular use site.

use serde::{Deserialize, Serialize};

use crate::key::TypeKey;

/// A reference to a type at a particular use site (a field's declared type,
/// an RPC's request/response type, a generic argument, ...).
///
/// Structural equality (and therefore [`Hash`]) is derived recursively, which
/// is exactly the equality the analyzer needs to deduplicate realized
/// generic argument tuples: two `TypeInstance`s are equal iff they reference
/// the same definition with recursively-equal argument lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeInstance {
    /// A concrete reference to a type definition, with its own argument list
    /// (empty unless the definition is generic/a builtin constructor).
    Real {
        /// The referenced definition's key.
        key: TypeKey,
        /// Concrete (or still-generic) arguments, in declaration order.
        args: Vec<TypeInstance>,
    },
    /// A reference to a formal generic parameter, valid only within the
    /// message that declares it.
    Generic(String),
    /// A placeholder produced when resolution failed, so traversal can
    /// continue and later passes may surface further diagnostics.
    Unknown,
}

impl TypeInstance {
    /// Construct a `Real` instance with no arguments.
    pub fn real(key: TypeKey) -> Self { TypeInstance::Real { key, args: Vec::new() } }

    /// Construct a `Real` instance with arguments.
    pub fn real_with_args(key: TypeKey, args: Vec<TypeInstance>) -> Self {
        TypeInstance::Real { key, args }
    }

    /// A deeply-real type instance: a `Real` instance whose transitive
    /// argument list contains no [`TypeInstance::Generic`] and no
    /// [`TypeInstance::Unknown`]. Only such instances may appear in RPC
    /// signatures and in monomorphized message fields.
    pub fn is_deeply_real(&self) -> bool {
        match self {
            TypeInstance::Real { args, .. } => args.iter().all(TypeInstance::is_deeply_real),
            TypeInstance::Generic(_) | TypeInstance::Unknown => false,
        }
    }

    /// The referenced key, if this is a `Real` instance.
    pub fn key(&self) -> Option<&TypeKey> {
        match self {
            TypeInstance::Real { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The argument list, if this is a `Real` instance (otherwise empty).
    pub fn args(&self) -> &[TypeInstance] {
        match self {
            TypeInstance::Real { args, .. } => args,
            _ => &[],
        }
    }

    /// Recursively substitute every [`TypeInstance::Generic`] occurrence
    /// whose name is a key in `bindings` with the bound concrete instance.
    /// Generics not present in `bindings` are left untouched (this also
    /// models "no occurrence" under an empty binding set).
    pub fn substitute(&self, bindings: &std::collections::HashMap<String, TypeInstance>) -> Self {
        match self {
            TypeInstance::Generic(name) => {
                bindings.get(name).cloned().unwrap_or_else(|| self.clone())
            }
            TypeInstance::Real { key, args } => TypeInstance::Real {
                key: key.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeInstance::Unknown => TypeInstance::Unknown,
        }
    }

    /// Visit this instance and every instance reachable through its
    /// argument lists, depth-first, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeInstance)) {
        visit(self);
        if let TypeInstance::Real { args, .. } = self {
            for arg in args {
                arg.walk(visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> TypeKey { TypeKey::new("p", name) }

    #[test]
    fn real_with_no_generic_or_unknown_is_deeply_real() {
        let inst = TypeInstance::real_with_args(key("Array"), vec![TypeInstance::real(key("int32"))]);
        assert!(inst.is_deeply_real());
    }

    #[test]
    fn generic_anywhere_in_tree_is_not_deeply_real() {
        let inst =
            TypeInstance::real_with_args(key("Array"), vec![TypeInstance::Generic("T".into())]);
        assert!(!inst.is_deeply_real());
    }

    #[test]
    fn unknown_is_not_deeply_real() {
        assert!(!TypeInstance::Unknown.is_deeply_real());
    }

    #[test]
    fn substitute_replaces_bound_generics_only() {
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("T".to_string(), TypeInstance::real(key("int32")));
        let inst = TypeInstance::real_with_args(
            key("Array"),
            vec![TypeInstance::Generic("T".into()), TypeInstance::Generic("U".into())],
        );
        let substituted = inst.substitute(&bindings);
        assert_eq!(
            substituted,
            TypeInstance::real_with_args(
                key("Array"),
                vec![TypeInstance::real(key("int32")), TypeInstance::Generic("U".into())]
            )
        );
    }

    #[test]
    fn equal_structural_trees_are_equal_and_hash_equal() {
        use std::collections::HashSet;
        let a = TypeInstance::real_with_args(key("Pagination"), vec![TypeInstance::real(key("int32"))]);
        let b = TypeInstance::real_with_args(key("Pagination"), vec![TypeInstance::real(key("int32"))]);
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }
}
