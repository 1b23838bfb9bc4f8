#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! eproto Intermediate Representation (IR).
//!
//! This crate defines the resolved semantic model that analysis produces
//! from an AST: type definitions (builtins, enums, string-enums, messages),
//! type instances (how a definition is referenced and parameterized), and
//! service/RPC descriptors. It is the bridge between the front-end (tokens
//! and AST, in `ast`) and code generation (`codegen`).

pub mod definitions;
pub mod instance;
pub mod key;
pub mod service;

pub use definitions::{
    BuiltinDef, BuiltinName, EnumDef, EnumField, MessageDef, MessageField, StringEnumDef,
    TypeDefinition,
};
pub use instance::TypeInstance;
pub use key::TypeKey;
pub use service::{RpcDefinition, ServiceDefinition};
