//! Emitter (§4.7) — two mutually-recursive traversals of GenIR producing
//! serialize/deserialize procedure bodies, plus per-file import computation
//! and RPC descriptor emission.

use std::collections::BTreeSet;

use ir::{RpcDefinition, ServiceDefinition, TypeInstance, TypeKey};
use monomorphizer::MessageDefinitionInstance;

use crate::genir::{Condition, FieldNode, Node, Selector, WireType};
use crate::utils::{import_alias, mangle_value_expr};

fn apply_selector(value_expr: &str, selector: &Selector) -> String {
    match selector {
        Selector::Identity => value_expr.to_string(),
        Selector::FieldName(name) => format!("{value_expr}.{name}"),
        Selector::ArrayIndex => value_expr.to_string(),
    }
}

fn condition_expr(condition: &Condition, value_expr: &str) -> Option<String> {
    match condition {
        Condition::Always => None,
        Condition::NotNull | Condition::NotUndefined => Some(format!("{value_expr}.is_some()")),
        Condition::Custom(template) => Some(template.replace("value", value_expr)),
    }
}

fn wire_byte(wire: WireType) -> u8 {
    wire as u8
}

/// Emit the lines that serialize `node`'s value, read from `value_expr`.
pub fn serialize_gen_node(node: &Node, value_expr: &str) -> Vec<String> {
    match node {
        Node::Primitive { writer_fn, .. } => {
            vec![format!("{writer_fn}(writer, {value_expr});")]
        }
        Node::Nullable { sub } => {
            let tmp = format!("{}_present", mangle_value_expr(value_expr));
            let mut lines = vec![format!("if let Some({tmp}) = &{value_expr} {{"), "    write_uint32(writer, 1);".to_string()];
            for l in serialize_gen_node(sub, &tmp) {
                lines.push(format!("    {l}"));
            }
            lines.push("} else {".to_string());
            lines.push("    write_uint32(writer, 0);".to_string());
            lines.push("}".to_string());
            lines
        }
        Node::Len { sub } => {
            let tmp = format!("{}_buf", mangle_value_expr(value_expr));
            let mut lines = vec![format!("let mut {tmp} = writer.fork();")];
            for l in serialize_gen_node(sub, value_expr) {
                lines.push(l);
            }
            lines.push(format!("writer.ldelim({tmp});"));
            lines
        }
        Node::Array { sub } => {
            let item = format!("{}_item", mangle_value_expr(value_expr));
            let mut lines = vec![format!("for {item} in {value_expr}.iter() {{")];
            for l in serialize_gen_node(sub, &item) {
                lines.push(format!("    {l}"));
            }
            lines.push("}".to_string());
            lines
        }
        Node::Struct { fields, .. } => {
            let mut lines = Vec::new();
            for field in fields {
                lines.extend(emit_struct_field_serialize(field, value_expr));
            }
            lines
        }
        Node::Switch { branches } => emit_switch_serialize(branches, value_expr),
        Node::MapValue { map_serialize, sub, .. } => {
            let adapted = match map_serialize {
                Some(adapt) => format!("({adapt}({value_expr}))"),
                None => value_expr.to_string(),
            };
            serialize_gen_node(sub, &adapted)
        }
    }
}

/// Emit the lines that deserialize `node`'s value into `value_expr` (an
/// l-value the caller assigns through, e.g. `value.foo`).
pub fn deserialize_gen_node(node: &Node, value_expr: &str) -> Vec<String> {
    match node {
        Node::Primitive { reader_fn, .. } => {
            vec![format!("{value_expr} = {reader_fn}(reader)?;")]
        }
        Node::Nullable { sub } => {
            let tmp = format!("{}_tag", mangle_value_expr(value_expr));
            let mut lines = vec![format!("let {tmp} = read_uint32(reader)?;"), format!("if {tmp} == 1 {{")];
            let inner = format!("{value_expr}_value");
            lines.push(format!("    let mut {inner} = Default::default();"));
            for l in deserialize_gen_node(sub, &inner) {
                lines.push(format!("    {l}"));
            }
            lines.push(format!("    {value_expr} = Some({inner});"));
            lines.push("} else {".to_string());
            lines.push(format!("    {value_expr} = None;"));
            lines.push("}".to_string());
            lines
        }
        Node::Len { sub } => {
            let tmp = format!("{}_end", mangle_value_expr(value_expr));
            let mut lines = vec![format!("let {tmp} = read_delimited_end(reader)?;")];
            for l in deserialize_gen_node(sub, value_expr) {
                lines.push(l);
            }
            lines.push(format!("reader.seek_to({tmp});"));
            lines
        }
        Node::Array { sub } => {
            let item = format!("{}_item", mangle_value_expr(value_expr));
            let mut lines = vec![format!("let mut {item} = Default::default();")];
            lines.extend(deserialize_gen_node(sub, &item));
            lines.push(format!("{value_expr}.push({item});"));
            lines
        }
        Node::Struct { init_value, fields } => {
            let mut lines = vec![format!("{value_expr} = {init_value};")];
            lines.push("while reader.has_more() {".to_string());
            lines.push("    let (ordinal, wire) = read_tag(reader)?;".to_string());
            lines.push("    match ordinal {".to_string());
            for field in fields {
                lines.extend(emit_struct_field_deserialize_arm(field, value_expr));
            }
            lines.push("        _ => reader.skip(wire)?,".to_string());
            lines.push("    }".to_string());
            lines.push("}".to_string());
            lines
        }
        Node::Switch { branches } => {
            let mut lines = vec!["let (ordinal, _wire) = read_tag(reader)?;".to_string()];
            lines.push("match ordinal {".to_string());
            for field in branches {
                let mut inner = Vec::new();
                inner.extend(deserialize_gen_node(&field.sub, value_expr));
                lines.push(format!("    {} => {{", field.ordinal));
                for l in inner {
                    lines.push(format!("        {l}"));
                }
                lines.push("    }".to_string());
            }
            lines.push("    _ => {}".to_string());
            lines.push("}".to_string());
            lines
        }
        Node::MapValue { map_deserialize, sub, .. } => {
            let raw = format!("{}_raw", mangle_value_expr(value_expr));
            let mut lines = vec![format!("let mut {raw} = Default::default();")];
            lines.extend(deserialize_gen_node(sub, &raw));
            match map_deserialize {
                Some(adapt) => lines.push(format!("{value_expr} = {adapt}({raw});")),
                None => lines.push(format!("{value_expr} = {raw};")),
            }
            lines
        }
    }
}

fn emit_struct_field_serialize(field: &FieldNode, enclosing_expr: &str) -> Vec<String> {
    let value_expr = apply_selector(enclosing_expr, &field.selector);
    let body = {
        let mut lines = vec![format!("write_tag(writer, {}, {});", field.ordinal, wire_byte(field.wire))];
        lines.extend(serialize_gen_node(&field.sub, &value_expr));
        lines
    };
    match condition_expr(&field.condition, &value_expr) {
        Some(cond) => {
            let mut lines = vec![format!("if {cond} {{")];
            for l in body {
                lines.push(format!("    {l}"));
            }
            lines.push("}".to_string());
            lines
        }
        None => body,
    }
}

fn emit_struct_field_deserialize_arm(field: &FieldNode, enclosing_expr: &str) -> Vec<String> {
    let value_expr = apply_selector(enclosing_expr, &field.selector);
    let mut lines = vec![format!("        {} => {{", field.ordinal)];
    for l in deserialize_gen_node(&field.sub, &value_expr) {
        lines.push(format!("            {l}"));
    }
    lines.push("        }".to_string());
    lines
}

fn emit_switch_serialize(branches: &[FieldNode], value_expr: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, branch) in branches.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "} else if" };
        let cond = condition_expr(&branch.condition, value_expr).unwrap_or_else(|| "true".to_string());
        lines.push(format!("{keyword} {cond} {{"));
        lines.push(format!("    write_tag(writer, {}, {});", branch.ordinal, wire_byte(branch.wire)));
        for l in serialize_gen_node(&branch.sub, value_expr) {
            lines.push(format!("    {l}"));
        }
    }
    lines.push("}".to_string());
    lines
}

/// Render one message realization's `serialize`/`deserialize` function
/// bodies (the surrounding function signature is the caller's concern —
/// the driver or a textual template owns module/impl scaffolding).
pub fn emit_message_codec(name: &str, body: &Node) -> String {
    let mut out = String::new();
    out.push_str(&format!("pub fn {name}_serialize(writer: &mut Writer, value: &{name}) {{\n"));
    for line in serialize_gen_node(body, "value") {
        out.push_str("    ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n\n");

    out.push_str(&format!("pub fn {name}_deserialize(reader: &mut Reader) -> Result<{name}, DecodeError> {{\n"));
    out.push_str(&format!("    let mut value: {name} = Default::default();\n"));
    for line in deserialize_gen_node(body, "value") {
        out.push_str("    ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("    Ok(value)\n");
    out.push_str("}\n");
    out
}

/// One RPC's generated descriptor: `path`, streaming flags, and the four
/// closures named in §4.7.
pub fn emit_rpc_descriptor(rpc: &RpcDefinition, request_name: &str, response_name: &str) -> String {
    let (request_streaming, _) = &rpc.request;
    let (response_streaming, _) = &rpc.response;

    let request_is_void = request_name == "Void";
    let response_is_void = response_name == "Void";

    let request_serialize = if request_is_void {
        "|_value| Vec::new()".to_string()
    } else {
        format!("|value| {{ let mut w = Writer::new(); {request_name}_serialize(&mut w, value); w.finish() }}")
    };
    let request_deserialize = if request_is_void {
        "|_bytes| Ok(())".to_string()
    } else {
        format!("|bytes| {request_name}_deserialize(&mut Reader::new(bytes))")
    };
    let response_serialize = if response_is_void {
        "|_value| Vec::new()".to_string()
    } else {
        format!("|value| {{ let mut w = Writer::new(); {response_name}_serialize(&mut w, value); w.finish() }}")
    };
    let response_deserialize = if response_is_void {
        "|_bytes| Ok(())".to_string()
    } else {
        format!("|bytes| {response_name}_deserialize(&mut Reader::new(bytes))")
    };

    format!(
        "RpcDescriptor {{\n    path: \"{}\",\n    request_streaming: {},\n    response_streaming: {},\n    request_serialize: {},\n    request_deserialize: {},\n    response_serialize: {},\n    response_deserialize: {},\n}}",
        rpc.path, request_streaming, response_streaming, request_serialize, request_deserialize, response_serialize, response_deserialize,
    )
}

/// Emit every RPC descriptor for a service, one `pub fn` constructor per RPC.
pub fn emit_service_descriptors(service: &ServiceDefinition, name_of: impl Fn(&TypeInstance) -> String) -> String {
    let mut out = String::new();
    for rpc in &service.rpcs {
        let request_name = name_of(&rpc.request.1);
        let response_name = name_of(&rpc.response.1);
        out.push_str(&format!("pub fn {}_descriptor() -> RpcDescriptor {{\n", rpc.name));
        for line in emit_rpc_descriptor(rpc, &request_name, &response_name).lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n\n");
    }
    out
}

/// The set of cross-package import aliases a realization's field list
/// touches, deduplicated and sorted for a deterministic import block.
pub fn collect_imports(own_package: &str, instance: &MessageDefinitionInstance) -> BTreeSet<(TypeKey, String)> {
    let mut imports = BTreeSet::new();
    for field in &instance.fields {
        field.type_instance.walk(&mut |found| {
            if let TypeInstance::Real { key, .. } = found {
                if key.package_id != own_package
                    && key.package_id != TypeKey::BUILTIN_PACKAGE
                    && !matches!(key.name.as_str(), "Array" | "Nullable" | "Map")
                {
                    imports.insert((key.clone(), import_alias(key)));
                }
            }
        });
    }
    imports
}
