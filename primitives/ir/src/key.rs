//! The symbolic key that identifies a type definition in the registry.

use serde::{Deserialize, Serialize};

/// A `(packageId, name)` pair that identifies at most one definition.
///
/// Type instances hold a `TypeKey`, not a pointer or `Rc` to a
/// [`crate::TypeDefinition`], so that cyclic references (`A` has a field of
/// type `B`, `B` has a field of type `A`) are representable without any
/// ownership gymnastics: the key is resolved against the registry on demand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    /// The concatenated (dot-joined, then stripped of dots) package identity.
    pub package_id: String,
    /// The definition's own name within that package.
    pub name: String,
}

impl TypeKey {
    /// Construct a key.
    pub fn new(package_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { package_id: package_id.into(), name: name.into() }
    }

    /// The sentinel package id used for files with no resolvable `package`
    /// declaration (missing or containing more than one `package` statement).
    pub const UNKNOWN_PACKAGE: &'static str = "\u{0}unknown";

    /// A key in the sentinel unknown package, used when a file's package
    /// could not be determined.
    pub fn in_unknown_package(name: impl Into<String>) -> Self {
        Self::new(Self::UNKNOWN_PACKAGE, name)
    }

    /// The sentinel package id the fixed builtin table is seeded under. Not
    /// reachable by any user `package` declaration, since package
    /// identifiers are built only from identifier segments.
    pub const BUILTIN_PACKAGE: &'static str = "\u{0}builtin";

    /// A key for a builtin, in the sentinel builtin package.
    pub fn builtin(name: impl Into<String>) -> Self { Self::new(Self::BUILTIN_PACKAGE, name) }
}
