#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Type Registry — the canonical store of type and service definitions.
//!
//! A single `TypeRegistry` is shared across a whole compilation (or LSP
//! session): every file's analyzed definitions live here, keyed by
//! `(packageId, name)`. Storing definitions by key rather than by pointer is
//! what makes cyclic message references (`A` has a field of type `B`, `B` has
//! a field of type `A`) representable: a [`ir::TypeInstance::Real`] only ever
//! holds a [`ir::TypeKey`], resolved against this registry on demand.

use std::collections::BTreeMap;

use ir::{BuiltinDef, BuiltinName, ServiceDefinition, TypeDefinition, TypeKey};
use span::FileId;

/// Either kind of top-level thing a name in a package can resolve to.
///
/// Both share one namespace for redefinition purposes ("a name uniquely
/// identifies at most one of message, enum, string-enum, service"), so they
/// are stored in a single keyed map rather than two.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Entry {
    /// A builtin, enum, string-enum, or message definition.
    Definition(TypeDefinition),
    /// A service definition.
    Service(ServiceDefinition),
}

impl Entry {
    /// Borrow the entry as a type definition, if it is one.
    pub fn as_definition(&self) -> Option<&TypeDefinition> {
        match self {
            Entry::Definition(d) => Some(d),
            Entry::Service(_) => None,
        }
    }

    /// Mutably borrow the entry as a type definition, if it is one.
    pub fn as_definition_mut(&mut self) -> Option<&mut TypeDefinition> {
        match self {
            Entry::Definition(d) => Some(d),
            Entry::Service(_) => None,
        }
    }

    /// Borrow the entry as a service definition, if it is one.
    pub fn as_service(&self) -> Option<&ServiceDefinition> {
        match self {
            Entry::Service(s) => Some(s),
            Entry::Definition(_) => None,
        }
    }
}

/// Registry errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A definition or service with this key already exists in the registry.
    #[error("`{}` is already defined in package `{}`", .0.name, .0.package_id)]
    Redefinition(TypeKey),
}

/// The canonical store of every type and service definition known to a
/// compilation, keyed by `(packageId, name)`.
///
/// Seeded on construction with the fixed builtin table (§3), which are never
/// subject to invalidation.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<TypeKey, Entry>,
    by_file: BTreeMap<FileId, Vec<TypeKey>>,
}

impl TypeRegistry {
    /// Create a registry pre-populated with the fixed builtin definitions.
    pub fn new() -> Self {
        let mut registry = Self::default();
        for name in BuiltinName::ALL {
            let key = TypeKey::builtin(name.as_str());
            registry
                .entries
                .insert(key, Entry::Definition(TypeDefinition::Builtin(BuiltinDef::new(*name))));
        }
        registry
    }

    /// Look up the key for a builtin by its source-level name.
    pub fn builtin_key(name: &str) -> Option<TypeKey> {
        BuiltinName::from_str(name).map(|b| TypeKey::builtin(b.as_str()))
    }

    /// Insert a definition or service produced while analyzing `file`.
    ///
    /// Fails if `key` is already occupied (by a builtin or by a prior
    /// definition in the same package) rather than silently overwriting it;
    /// callers report [`RegistryError::Redefinition`] as a diagnostic.
    pub fn insert(
        &mut self,
        file: FileId,
        key: TypeKey,
        entry: Entry,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&key) {
            return Err(RegistryError::Redefinition(key));
        }
        self.by_file.entry(file).or_default().push(key.clone());
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &TypeKey) -> Option<&Entry> { self.entries.get(key) }

    /// Mutably look up an entry by key, e.g. to record a generic realization.
    pub fn get_mut(&mut self, key: &TypeKey) -> Option<&mut Entry> { self.entries.get_mut(key) }

    /// Look up a type definition by key.
    pub fn get_definition(&self, key: &TypeKey) -> Option<&TypeDefinition> {
        self.get(key).and_then(Entry::as_definition)
    }

    /// Mutably look up a type definition by key.
    pub fn get_definition_mut(&mut self, key: &TypeKey) -> Option<&mut TypeDefinition> {
        self.get_mut(key).and_then(Entry::as_definition_mut)
    }

    /// Look up a service definition by key.
    pub fn get_service(&self, key: &TypeKey) -> Option<&ServiceDefinition> {
        self.get(key).and_then(Entry::as_service)
    }

    /// True if a name is already taken in the given package.
    pub fn contains(&self, key: &TypeKey) -> bool { self.entries.contains_key(key) }

    /// Iterate all type definitions currently registered (builtins included).
    pub fn definitions(&self) -> impl Iterator<Item = (&TypeKey, &TypeDefinition)> {
        self.entries.iter().filter_map(|(k, e)| e.as_definition().map(|d| (k, d)))
    }

    /// Iterate all service definitions currently registered.
    pub fn services(&self) -> impl Iterator<Item = (&TypeKey, &ServiceDefinition)> {
        self.entries.iter().filter_map(|(k, e)| e.as_service().map(|s| (k, s)))
    }

    /// Remove every entry that was inserted while analyzing `file`.
    ///
    /// Called when a file is invalidated (edited, in an LSP session, or
    /// dropped from a recompilation), so that a fresh analysis pass starts
    /// from a clean namespace for that file's definitions.
    pub fn invalidate_file(&mut self, file: FileId) {
        if let Some(keys) = self.by_file.remove(&file) {
            for key in keys {
                self.entries.remove(&key);
            }
        }
    }
}
