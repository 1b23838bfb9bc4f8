//! Name-mangling helpers shared by the builder and emitter.

use ir::{TypeInstance, TypeKey};

/// Turn a value expression into a valid local-variable fragment by replacing
/// `[`, `]`, `.` with `_` (§4.7), so loop induction variables and
/// intermediate bindings derived from `value.foo[i]`-style expressions stay
/// distinct and syntactically valid regardless of how deep the expression is.
pub fn mangle_value_expr(expr: &str) -> String {
    expr.chars()
        .map(|c| if c == '[' || c == ']' || c == '.' { '_' } else { c })
        .collect()
}

/// The generated name for one message realization: the message's own name,
/// followed by its argument tuple's own realization names, double-underscore
/// joined (`Pagination` realized with `int32` becomes `Pagination__int32`).
///
/// Non-generic messages (`args.is_empty()`) return the bare name.
pub fn realization_name(key: &TypeKey, args: &[TypeInstance]) -> String {
    if args.is_empty() {
        return key.name.clone();
    }
    let mut name = key.name.clone();
    for arg in args {
        name.push_str("__");
        name.push_str(&instance_name(arg));
    }
    name
}

/// The name a type instance contributes to a realization name or an import
/// alias: a definition's own name, recursively expanded for generic
/// arguments (`Array<int32>` becomes `Array__int32`).
pub fn instance_name(instance: &TypeInstance) -> String {
    match instance {
        TypeInstance::Real { key, args } => realization_name(key, args),
        TypeInstance::Generic(name) => name.clone(),
        TypeInstance::Unknown => "Unknown".to_string(),
    }
}

/// The cross-package import alias for a definition: `<packageId>__<name>`.
pub fn import_alias(key: &TypeKey) -> String {
    format!("{}__{}", key.package_id, key.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_replaces_brackets_and_dots() {
        assert_eq!(mangle_value_expr("value.items[i]"), "value_items_i_");
    }

    #[test]
    fn realization_name_is_bare_for_non_generic() {
        let key = TypeKey::new("p", "Fruit");
        assert_eq!(realization_name(&key, &[]), "Fruit");
    }

    #[test]
    fn realization_name_expands_nested_generics() {
        let key = TypeKey::new("p", "Pagination");
        let args = vec![TypeInstance::real(TypeKey::new("p", "int32"))];
        assert_eq!(realization_name(&key, &args), "Pagination__int32");
    }

    #[test]
    fn import_alias_joins_package_and_name() {
        assert_eq!(import_alias(&TypeKey::new("a", "Fruit")), "a__Fruit");
    }
}
