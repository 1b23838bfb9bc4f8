#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Code generation for the eproto compiler.
//!
//! Turns each realized message (produced by `monomorphizer`) and each
//! service's RPC signatures into generated serialize/deserialize code (under
//! strategy `native` or `evolved`, via the GenIR model of §4.5-§4.7) or a
//! runtime-validation schema (`zod`). `skip` emits nothing and is handled by
//! the driver, not this crate.

pub mod builder;
pub mod emitter;
pub mod genir;
pub mod utils;
pub mod zod;

use config::Strategy;
use ir::ServiceDefinition;
use monomorphizer::MessageDefinitionInstance;
use registry::TypeRegistry;
use thiserror::Error;

/// Errors a driver may surface while invoking this crate. Construction and
/// emission themselves are infallible (a pure tree rewrite, then pure string
/// building); this exists for the one fallible case, an unsupported
/// strategy reaching the GenIR path.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// `skip` was passed to a function that only handles wire strategies.
    #[error("strategy `skip` emits nothing and must be handled by the caller")]
    NothingToEmit,
}

/// Result type for this crate's fallible entry points.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Emit one realization's generated module body under the selected
/// `strategy`. Returns the serialize/deserialize function pair (`native`,
/// `evolved`) or a validation schema (`zod`).
pub fn emit_realization(
    name: &str,
    instance: &MessageDefinitionInstance,
    registry: &TypeRegistry,
    strategy: Strategy,
) -> Result<String> {
    match strategy {
        Strategy::Native | Strategy::Evolved => {
            let body = builder::build_message_struct(instance, registry, strategy);
            Ok(emitter::emit_message_codec(name, &body))
        }
        Strategy::Zod => Ok(zod::emit_schema(name, instance, registry)),
        Strategy::Skip => Err(CodegenError::NothingToEmit),
    }
}

/// Emit the builtin `Any` struct's own codec, used once per output tree when
/// `any` is referenced anywhere in it.
pub fn emit_any_definition(registry: &TypeRegistry, strategy: Strategy) -> Result<String> {
    match strategy {
        Strategy::Native | Strategy::Evolved => {
            let body = builder::build_any_switch(registry, strategy);
            Ok(emitter::emit_message_codec("Any", &body))
        }
        Strategy::Zod => Ok("export const AnySchema = z.any();\n".to_string()),
        Strategy::Skip => Err(CodegenError::NothingToEmit),
    }
}

/// Emit one service's RPC descriptors, naming each RPC's request/response
/// realization via `name_of`.
pub fn emit_service(service: &ServiceDefinition, name_of: impl Fn(&ir::TypeInstance) -> String) -> String {
    emitter::emit_service_descriptors(service, name_of)
}
