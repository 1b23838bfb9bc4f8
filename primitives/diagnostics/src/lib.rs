#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Diagnostics — collects compiler errors with token locations, scope, and
//! optional cross-references; supports per-file invalidation.
//!
//! `local` diagnostics are owned by the file they were raised against and are
//! dropped wholesale when that file is re-analyzed. `global` diagnostics may
//! point from a reference in one file at a definition in another, so any
//! change clears *all* global diagnostics and the caller is expected to
//! recompute them in the subsequent `analyze()` fixpoint.

use serde::{Deserialize, Serialize};
use span::{FileId, Span};

/// The scope of a diagnostic, controlling how it is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Owned entirely by one file; dropped when that file is re-analyzed.
    Local,
    /// May span files (e.g. a reference resolving to a definition elsewhere);
    /// cleared wholesale on any change.
    Global,
}

/// The taxonomy of diagnostic kinds this compiler can raise.
///
/// Every kind surfaces at `severity = error`; there is currently no warning
/// tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A character outside the lexical alphabet.
    LexUnknownSymbol,
    /// A required token was missing during parsing.
    ParseExpect,
    /// No `package` declaration in a file.
    MissingPackage,
    /// More than one `package` declaration in a file.
    MultiplePackages,
    /// `package` was not the first top-level node.
    PackageNotFirst,
    /// Second definition of the same symbol within a package.
    Redefinition,
    /// Repeated field, RPC, or enum-member name.
    FieldRedefinition,
    /// A field ordinal was less than 1.
    OrdinalNonpositive,
    /// An explicit ordinal was smaller than the running counter.
    OrdinalNotMonotonic,
    /// A type reference could not be resolved.
    UnknownType,
    /// Too many (or any, for a zero-arity type) generic arguments.
    ArityMismatch,
    /// A formal generic parameter was used with `<...>` arguments.
    GenericHasArgs,
    /// A formal generic parameter was declared dotted or itself parameterized.
    GenericFormInvalid,
}

impl DiagnosticKind {
    /// The scope this kind is always raised with.
    pub fn scope(self) -> Scope {
        use DiagnosticKind::*;
        match self {
            LexUnknownSymbol
            | ParseExpect
            | MissingPackage
            | MultiplePackages
            | PackageNotFirst
            | FieldRedefinition
            | OrdinalNonpositive
            | OrdinalNotMonotonic
            | GenericHasArgs
            | GenericFormInvalid => Scope::Local,
            Redefinition | UnknownType | ArityMismatch => Scope::Global,
        }
    }
}

/// A related source location attached to a diagnostic, e.g. the span of the
/// first definition in a `redefinition` error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedInfo {
    /// Where the related location is.
    pub span: Span,
    /// A short human-readable label for the relation.
    pub message: String,
}

/// A single diagnostic, always `severity = error` per this compiler's model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What kind of problem this is.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Where the problem was observed.
    pub span: Span,
    /// Optional related location, e.g. the original definition of a symbol.
    pub related: Option<RelatedInfo>,
}

impl Diagnostic {
    /// Construct a diagnostic with no related information.
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), span, related: None }
    }

    /// Attach related information (e.g. a prior definition's span).
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related = Some(RelatedInfo { span, message: message.into() });
        self
    }

    /// Scope this diagnostic is invalidated under.
    pub fn scope(&self) -> Scope { self.kind.scope() }
}

/// Collects diagnostics for a compilation or LSP session, supporting
/// per-file invalidation of `local` entries and wholesale invalidation of
/// `global` entries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty diagnostics collector.
    pub fn new() -> Self { Self::default() }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) { self.entries.push(diagnostic); }

    /// All diagnostics currently recorded.
    pub fn all(&self) -> &[Diagnostic] { &self.entries }

    /// Whether any diagnostic has been recorded (emission is skipped if so).
    pub fn has_errors(&self) -> bool { !self.entries.is_empty() }

    /// Diagnostics touching a given file, either as the raising file or as
    /// the related cross-reference target.
    pub fn for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|d| {
                d.span.file == file || d.related.as_ref().is_some_and(|r| r.span.file == file)
            })
            .collect()
    }

    /// Drop all `local` diagnostics raised against `file`. Called before
    /// re-tokenizing/re-parsing/re-analyzing that file.
    pub fn invalidate_local(&mut self, file: FileId) {
        self.entries.retain(|d| !(d.scope() == Scope::Local && d.span.file == file));
    }

    /// Drop every `global` diagnostic. Called before any global `analyze()`
    /// re-run, since a global diagnostic may no longer apply once the
    /// fileset it referenced has changed.
    pub fn invalidate_global(&mut self) {
        self.entries.retain(|d| d.scope() != Scope::Global);
    }

    /// Drop everything raised by `file`, local or global, without touching
    /// other files' global diagnostics. Used when a file is removed outright.
    pub fn invalidate_file(&mut self, file: FileId) {
        self.entries.retain(|d| d.span.file != file);
    }
}
