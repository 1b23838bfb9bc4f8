//! A trivial secondary emitter for runtime-validation schemas, selected by
//! `-g zod`. Unlike `native`/`evolved`, this never touches GenIR: a schema is
//! a direct structural mapping from a realized message's field list, with no
//! wire concerns at all.

use ir::{BuiltinName, TypeDefinition, TypeInstance, TypeKey};
use monomorphizer::MessageDefinitionInstance;
use registry::TypeRegistry;

fn schema_expr(instance: &TypeInstance, registry: &TypeRegistry) -> String {
    let TypeInstance::Real { key, args } = instance else {
        return "z.unknown()".to_string();
    };

    if key.package_id == TypeKey::BUILTIN_PACKAGE {
        return match BuiltinName::from_str(&key.name) {
            Some(BuiltinName::Bool) => "z.boolean()".to_string(),
            Some(BuiltinName::String | BuiltinName::Bytes) => "z.string()".to_string(),
            Some(BuiltinName::Date) => "z.string().datetime()".to_string(),
            Some(BuiltinName::Any) => "z.any()".to_string(),
            Some(BuiltinName::Void) => "z.void()".to_string(),
            Some(BuiltinName::Array) => format!("z.array({})", schema_expr(&args[0], registry)),
            Some(BuiltinName::Nullable) => format!("{}.nullable()", schema_expr(&args[0], registry)),
            Some(BuiltinName::Map) => {
                format!("z.map({}, {})", schema_expr(&args[0], registry), schema_expr(&args[1], registry))
            }
            Some(_) => "z.number()".to_string(),
            None => "z.unknown()".to_string(),
        };
    }

    match registry.get_definition(key) {
        Some(TypeDefinition::Enum(_)) => "z.number().int()".to_string(),
        Some(TypeDefinition::StringEnum(s)) => {
            let options =
                s.values.iter().map(|v| format!("\"{v}\"")).collect::<Vec<_>>().join(", ");
            format!("z.enum([{options}])")
        }
        _ => format!("{}Schema", crate::utils::realization_name(key, args)),
    }
}

/// Render one message realization's schema as `export const <name>Schema`.
pub fn emit_schema(name: &str, instance: &MessageDefinitionInstance, registry: &TypeRegistry) -> String {
    let mut out = String::new();
    out.push_str(&format!("export const {name}Schema = z.object({{\n"));
    for field in &instance.fields {
        let mut expr = schema_expr(&field.type_instance, registry);
        if field.optional {
            expr = format!("{expr}.optional()");
        }
        out.push_str(&format!("    {}: {},\n", field.name, expr));
    }
    out.push_str("});\n");
    out
}
