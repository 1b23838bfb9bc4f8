#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Path utilities for finding the workspace root, walking a source tree for
//! `*.eproto` files, and rebasing output paths.

pub mod path_utils;

// Re-export for convenience
pub use path_utils::*;
