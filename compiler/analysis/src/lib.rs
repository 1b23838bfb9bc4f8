#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Semantic Analyzer — resolves a parsed AST into the canonical definitions
//! stored in a [`registry::TypeRegistry`], and exposes the query surface an
//! LSP host would drive.
//!
//! Two-phase design, run per compilation (or per LSP session):
//!
//! - [`SemanticAnalyzer::analyze_ast_nodes`] (phase 1) is called once per
//!   file: it determines the file's `packageId` and materializes every
//!   top-level declaration as an unresolved definition, enforcing symbol
//!   uniqueness within the package.
//! - [`SemanticAnalyzer::analyze`] (phase 2) is called once after every
//!   file has gone through phase 1: it resolves field and RPC types against
//!   the package namespace, checks field ordinals, and collects the set of
//!   generic instantiations reachable from RPC signatures to a fixpoint.
//!
//! Analysis never aborts: a resolution failure downgrades to a diagnostic
//! plus a [`ir::TypeInstance::Unknown`] placeholder so the rest of the tree
//! is still walked.

use std::collections::{HashMap, HashSet, VecDeque};

use ast::{AstNode, TypeRef};
use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use ir::{
    EnumDef, EnumField, MessageDef, MessageField, RpcDefinition, ServiceDefinition,
    StringEnumDef, TypeDefinition, TypeInstance, TypeKey,
};
use registry::{Entry, TypeRegistry};
use span::{FileId, Position, SourceMap, Span};

/// A message's unresolved field list and enclosing scope, kept between
/// phase 1 and phase 2.
struct PendingMessage {
    file: FileId,
    key: TypeKey,
    package_id: String,
    generics: Vec<String>,
    fields: Vec<ast::FieldDecl>,
}

/// A service's unresolved RPC list and enclosing scope, kept between phase 1
/// and phase 2.
struct PendingService {
    file: FileId,
    key: TypeKey,
    package_id: String,
    service_name: String,
    rpcs: Vec<ast::RpcDecl>,
}

/// Resolves ASTs into the canonical [`TypeRegistry`], and answers the
/// queries a language-server host would need.
///
/// Owns the registry and the accumulated diagnostics; a driver (or an LSP
/// host) owns the [`SourceMap`] and feeds it in by reference where needed.
#[derive(Default)]
pub struct SemanticAnalyzer {
    registry: TypeRegistry,
    diagnostics: Diagnostics,
    pending_messages: Vec<PendingMessage>,
    pending_services: Vec<PendingService>,
}

impl SemanticAnalyzer {
    /// Create an analyzer with a fresh, builtin-seeded registry.
    pub fn new() -> Self {
        Self { registry: TypeRegistry::new(), ..Default::default() }
    }

    /// The resolved type and service registry.
    pub fn registry(&self) -> &TypeRegistry { &self.registry }

    /// All diagnostics accumulated so far.
    pub fn diagnostics(&self) -> &Diagnostics { &self.diagnostics }

    /// Phase 1: determine `file`'s packageId, materialize its top-level
    /// declarations as unresolved definitions, and enforce symbol uniqueness
    /// within that package. Field and RPC resolution is deferred to
    /// [`Self::analyze`].
    pub fn analyze_ast_nodes(&mut self, file: FileId, ast: &ast::File) {
        let package_id = self.determine_package_id(file, ast);

        for node in ast {
            match node {
                AstNode::Package(_) => {}
                AstNode::Message(m) => {
                    let key = TypeKey::new(&package_id, &m.name.name);
                    let generics: Vec<String> =
                        m.generics.iter().map(|g| g.name.clone()).collect();
                    let def = MessageDef {
                        name: m.name.name.clone(),
                        package_id: package_id.clone(),
                        generics: generics.clone(),
                        fields: Vec::new(),
                        realized_arg_tuples: Vec::new(),
                        span: m.span,
                    };
                    let inserted = self.materialize(
                        file,
                        key.clone(),
                        Entry::Definition(TypeDefinition::Message(def)),
                        m.span,
                        &m.name.name,
                    );
                    if inserted {
                        self.pending_messages.push(PendingMessage {
                            file,
                            key,
                            package_id: package_id.clone(),
                            generics,
                            fields: m.fields.clone(),
                        });
                    }
                }
                AstNode::Enum(e) => {
                    let key = TypeKey::new(&package_id, &e.name.name);
                    let def = EnumDef {
                        name: e.name.name.clone(),
                        package_id: package_id.clone(),
                        fields: resolve_enum_fields(e),
                        span: e.span,
                    };
                    self.materialize(
                        file,
                        key,
                        Entry::Definition(TypeDefinition::Enum(def)),
                        e.span,
                        &e.name.name,
                    );
                }
                AstNode::StringEnum(s) => {
                    let key = TypeKey::new(&package_id, &s.name.name);
                    let def = StringEnumDef {
                        name: s.name.name.clone(),
                        package_id: package_id.clone(),
                        values: s.values.iter().map(|v| v.value.clone()).collect(),
                        span: s.span,
                    };
                    self.materialize(
                        file,
                        key,
                        Entry::Definition(TypeDefinition::StringEnum(def)),
                        s.span,
                        &s.name.name,
                    );
                }
                AstNode::Service(svc) => {
                    let key = TypeKey::new(&package_id, &svc.name.name);
                    let def = ServiceDefinition {
                        name: svc.name.name.clone(),
                        package_id: package_id.clone(),
                        rpcs: Vec::new(),
                        span: svc.span,
                    };
                    let inserted =
                        self.materialize(file, key.clone(), Entry::Service(def), svc.span, &svc.name.name);
                    if inserted {
                        self.pending_services.push(PendingService {
                            file,
                            key,
                            package_id: package_id.clone(),
                            service_name: svc.name.name.clone(),
                            rpcs: svc.rpcs.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Determine the packageId for `file`'s declarations, raising
    /// `MissingPackage`/`MultiplePackages`/`PackageNotFirst` as needed.
    fn determine_package_id(&mut self, file: FileId, ast: &ast::File) -> String {
        let packages: Vec<&ast::PackageDecl> = ast
            .iter()
            .filter_map(|n| if let AstNode::Package(p) = n { Some(p) } else { None })
            .collect();

        let package_id = match packages.as_slice() {
            [] => {
                let span = ast
                    .first()
                    .map(|n| n.span())
                    .unwrap_or_else(|| Span::point(file, Position::default()));
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MissingPackage,
                    span,
                    "file has no `package` declaration",
                ));
                TypeKey::UNKNOWN_PACKAGE.to_string()
            }
            [only] => only.package_id(),
            [first, ..] => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MultiplePackages,
                    first.span,
                    "file has more than one `package` declaration",
                ));
                first.package_id()
            }
        };

        if let Some(first_package) = packages.first() {
            let leads = matches!(ast.first(), Some(AstNode::Package(_)));
            if !leads {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::PackageNotFirst,
                    first_package.span,
                    "`package` must be the first declaration in the file",
                ));
            }
        }

        package_id
    }

    /// Insert an entry into the registry, reporting a redefinition
    /// diagnostic (with the first definition's span attached) on conflict.
    /// Returns `true` if the insertion succeeded.
    fn materialize(&mut self, file: FileId, key: TypeKey, entry: Entry, span: Span, name: &str) -> bool {
        match self.registry.insert(file, key.clone(), entry) {
            Ok(()) => true,
            Err(_) => {
                let prior_span = self.registry.get(&key).and_then(|e| match e {
                    Entry::Definition(d) => d.span(),
                    Entry::Service(s) => Some(s.span),
                });
                let mut diag = Diagnostic::new(
                    DiagnosticKind::Redefinition,
                    span,
                    format!("`{}` is already defined in this package", name),
                );
                if let Some(prior_span) = prior_span {
                    diag = diag.with_related(prior_span, "first defined here");
                }
                self.diagnostics.push(diag);
                false
            }
        }
    }

    /// Phase 2: resolve every pending field and RPC type against the
    /// package namespace, check ordinals, write the resolved fields/RPCs
    /// back into the registry, and collect generic instantiations to a
    /// fixpoint. Clears prior global diagnostics first, since a resolution
    /// that held before may no longer hold after edits.
    pub fn analyze(&mut self) {
        self.diagnostics.invalidate_global();

        let pending_messages = std::mem::take(&mut self.pending_messages);
        for pending in &pending_messages {
            let fields = self.resolve_message_fields(pending);
            if let Some(TypeDefinition::Message(def)) = self.registry.get_definition_mut(&pending.key) {
                def.fields = fields;
            }
        }
        self.pending_messages = pending_messages;

        let pending_services = std::mem::take(&mut self.pending_services);
        for pending in &pending_services {
            let rpcs = self.resolve_service_rpcs(pending);
            if let Some(Entry::Service(def)) = self.registry.get_mut(&pending.key) {
                def.rpcs = rpcs;
            }
        }
        self.pending_services = pending_services;

        self.collect_generic_instances();
    }

    fn resolve_message_fields(&mut self, pending: &PendingMessage) -> Vec<MessageField> {
        let mut fields = Vec::with_capacity(pending.fields.len());
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut next_ordinal: i64 = 1;

        for field in &pending.fields {
            if !seen_names.insert(field.name.name.clone()) {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::FieldRedefinition,
                    field.span,
                    format!("field `{}` is already defined in this message", field.name.name),
                ));
            }

            let mut ordinal = next_ordinal;
            if let Some(explicit) = &field.ordinal {
                if explicit.value < next_ordinal {
                    if explicit.value < 1 {
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::OrdinalNonpositive,
                            explicit.span,
                            "field ordinal must be > 0",
                        ));
                    } else {
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::OrdinalNotMonotonic,
                            explicit.span,
                            format!("field ordinal {} must be >= {}", explicit.value, next_ordinal),
                        ));
                    }
                } else {
                    ordinal = explicit.value;
                    next_ordinal = explicit.value;
                }
            }

            let type_instance =
                self.resolve_type_ref(&field.type_ref, &pending.package_id, &pending.generics);
            fields.push(MessageField {
                ordinal: ordinal as i32,
                name: field.name.name.clone(),
                optional: field.optional,
                type_instance,
                span: field.span,
            });
            next_ordinal += 1;
        }
        fields
    }

    fn resolve_service_rpcs(&mut self, pending: &PendingService) -> Vec<RpcDefinition> {
        pending
            .rpcs
            .iter()
            .map(|rpc| RpcDefinition {
                name: rpc.name.name.clone(),
                path: format!("/{}/{}", pending.service_name, rpc.name.name),
                request: (
                    rpc.request_stream,
                    self.resolve_type_ref(&rpc.request_type, &pending.package_id, &[]),
                ),
                response: (
                    rpc.response_stream,
                    self.resolve_type_ref(&rpc.response_type, &pending.package_id, &[]),
                ),
                span: rpc.span,
            })
            .collect()
    }

    /// Resolve one `type` production against the package namespace per the
    /// resolution order of §4.3: generic parameter, then (for an unprefixed
    /// name) builtin or same-package definition, then (for a prefixed name)
    /// a direct or package-relative match.
    ///
    /// Builtin/same-package lookup (rules a/b) is restricted to unprefixed,
    /// single-segment references; a dotted reference goes straight to rule
    /// (c) against its prefix, so a same-named bare symbol in the current
    /// package can never silently shadow an explicitly-qualified one.
    fn resolve_type_ref(
        &mut self,
        type_ref: &TypeRef,
        current_package: &str,
        generics_in_scope: &[String],
    ) -> TypeInstance {
        if type_ref.segments.len() == 1
            && generics_in_scope.iter().any(|g| g == &type_ref.segments[0].name)
        {
            if !type_ref.args.is_empty() {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::GenericHasArgs,
                    type_ref.span,
                    format!(
                        "generic parameter `{}` does not take arguments",
                        type_ref.segments[0].name
                    ),
                ));
            }
            return TypeInstance::Generic(type_ref.segments[0].name.clone());
        }

        let name = type_ref.segments.last().map(|s| s.name.as_str()).unwrap_or("");
        let prefix: String = type_ref.segments[..type_ref.segments.len().saturating_sub(1)]
            .iter()
            .map(|s| s.name.as_str())
            .collect();

        let key = if type_ref.segments.len() <= 1 {
            TypeRegistry::builtin_key(name).or_else(|| {
                let same_package = TypeKey::new(current_package, name);
                self.registry.contains(&same_package).then_some(same_package)
            })
        } else {
            let direct = TypeKey::new(&prefix, name);
            if self.registry.contains(&direct) {
                Some(direct)
            } else if !current_package.is_empty() && current_package != TypeKey::UNKNOWN_PACKAGE {
                let relative = TypeKey::new(format!("{}{}", current_package, prefix), name);
                self.registry.contains(&relative).then_some(relative)
            } else {
                None
            }
        };

        let Some(key) = key else {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnknownType,
                type_ref.span,
                format!("unknown type `{}`", type_ref.path_text()),
            ));
            return TypeInstance::Unknown;
        };

        let formal_arity =
            self.registry.get_definition(&key).map(TypeDefinition::formal_arity).unwrap_or(0);
        let args: Vec<TypeInstance> = type_ref
            .args
            .iter()
            .map(|a| self.resolve_type_ref(a, current_package, generics_in_scope))
            .collect();
        if args.len() > formal_arity {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::ArityMismatch,
                type_ref.span,
                format!("`{}` takes {} generic argument(s), got {}", name, formal_arity, args.len()),
            ));
        }
        TypeInstance::real_with_args(key, args)
    }

    /// Walk every RPC signature, recording each reachable generic message
    /// instantiation in its definition's realization set, and follow each
    /// newly-discovered realization's own (substituted) fields to a
    /// fixpoint.
    fn collect_generic_instances(&mut self) {
        let mut worklist: VecDeque<(TypeKey, Vec<TypeInstance>)> = VecDeque::new();

        let seeds: Vec<TypeInstance> = self
            .registry
            .services()
            .flat_map(|(_, svc)| svc.rpcs.iter().flat_map(|r| [r.request.1.clone(), r.response.1.clone()]))
            .collect();
        for seed in &seeds {
            self.record_realizations_in(seed, &mut worklist);
        }

        while let Some((key, args)) = worklist.pop_front() {
            let (generics, fields) = match self.registry.get_definition(&key) {
                Some(TypeDefinition::Message(def)) => (def.generics.clone(), def.fields.clone()),
                _ => continue,
            };
            let bindings: HashMap<String, TypeInstance> = generics.into_iter().zip(args).collect();
            for field in &fields {
                let substituted = field.type_instance.substitute(&bindings);
                self.record_realizations_in(&substituted, &mut worklist);
            }
        }
    }

    fn record_realizations_in(
        &mut self,
        instance: &TypeInstance,
        worklist: &mut VecDeque<(TypeKey, Vec<TypeInstance>)>,
    ) {
        instance.walk(&mut |found| {
            let TypeInstance::Real { key, args } = found else { return };
            if !args.iter().all(TypeInstance::is_deeply_real) {
                return;
            }
            let is_generic_message =
                matches!(self.registry.get_definition(key), Some(d) if d.is_generic_message());
            if !is_generic_message {
                return;
            }
            let Some(TypeDefinition::Message(def)) = self.registry.get_definition_mut(key) else {
                unreachable!("This is a bug: generic message definition vanished mid-collection");
            };
            if def.record_realization(args.clone()) {
                worklist.push_back((key.clone(), args.clone()));
            }
        });
    }

    /// Diagnostics touching `file`, as raising file or cross-reference target.
    pub fn diagnostics_for(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.for_file(file)
    }

    /// The definition a cursor position resolves to, if the position falls
    /// within a top-level declaration of `file` in `ast`.
    pub fn definition_at<'a>(
        &'a self,
        file: FileId,
        position: Position,
        ast: &ast::File,
    ) -> Option<&'a TypeDefinition> {
        let package_id = file_package_id(ast);
        let node = ast.iter().find(|n| {
            !matches!(n, AstNode::Package(_))
                && n.span().file == file
                && n.span().start <= position
                && position <= n.span().end
        })?;
        let key = TypeKey::new(package_id, &node.name()?.name);
        self.registry.get_definition(&key)
    }

    /// Drop `file`'s registry entries and local diagnostics and clear global
    /// diagnostics, in preparation for [`Self::reanalyze`].
    pub fn invalidate(&mut self, file: FileId) {
        self.registry.invalidate_file(file);
        self.diagnostics.invalidate_local(file);
        self.diagnostics.invalidate_global();
        self.pending_messages.retain(|p| p.file != file);
        self.pending_services.retain(|p| p.file != file);
    }

    /// Re-tokenize, re-parse, and re-analyze `path` with new `text`,
    /// re-running the global fixpoint pass. `source_map` is updated in
    /// place; returns the (possibly new) [`FileId`] for the file.
    pub fn reanalyze(&mut self, source_map: &mut SourceMap, path: &str, text: &str) -> FileId {
        if let Some(existing) = source_map.find(path) {
            source_map.invalidate(existing);
            self.invalidate(existing);
        }
        let file = source_map.insert(path, text);
        let source_text = source_map.get(file).expect("just inserted").text.clone();

        let tokens = lexer::tokenize(file, &source_text, &mut self.diagnostics);
        let ast = parser::parse(file, tokens, &mut self.diagnostics);
        self.analyze_ast_nodes(file, &ast);
        self.analyze();
        file
    }
}

fn file_package_id(ast: &ast::File) -> String {
    ast.iter()
        .find_map(|n| match n {
            AstNode::Package(p) => Some(p.package_id()),
            _ => None,
        })
        .unwrap_or_else(|| TypeKey::UNKNOWN_PACKAGE.to_string())
}

fn resolve_enum_fields(e: &ast::EnumDecl) -> Vec<EnumField> {
    let mut next_value: i64 = 0;
    e.fields
        .iter()
        .map(|field| {
            let value = match &field.value {
                Some(explicit) => {
                    next_value = explicit.value + 1;
                    explicit.value
                }
                None => {
                    let v = next_value;
                    next_value += 1;
                    v
                }
            };
            EnumField { name: field.name.name.clone(), value: value as i32 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use span::SourceMap;

    use super::*;

    fn analyze_source(text: &str) -> (SemanticAnalyzer, FileId, ast::File) {
        let mut map = SourceMap::new();
        let file = map.insert("p.eproto", text);
        let mut analyzer = SemanticAnalyzer::new();
        let tokens =
            lexer::tokenize(file, &map.get(file).unwrap().text.clone(), &mut analyzer.diagnostics);
        let ast = parser::parse(file, tokens, &mut analyzer.diagnostics);
        analyzer.analyze_ast_nodes(file, &ast);
        analyzer.analyze();
        (analyzer, file, ast)
    }

    #[test]
    fn message_field_resolves_builtin_type() {
        let (analyzer, _file, _ast) = analyze_source("package p; message M { int32 x = 1; }");
        let def = analyzer.registry().get_definition(&TypeKey::new("p", "M")).unwrap();
        let TypeDefinition::Message(m) = def else { panic!("expected message") };
        assert_eq!(m.fields.len(), 1);
        assert_eq!(m.fields[0].ordinal, 1);
        assert!(matches!(&m.fields[0].type_instance, TypeInstance::Real { key, .. } if key.name == "int32"));
    }

    #[test]
    fn missing_package_raises_diagnostic_and_uses_sentinel() {
        let (analyzer, _file, _ast) = analyze_source("message M { int32 x = 1; }");
        assert!(analyzer.diagnostics().all().iter().any(|d| d.kind == DiagnosticKind::MissingPackage));
        assert!(analyzer.registry().get_definition(&TypeKey::in_unknown_package("M")).is_some());
    }

    #[test]
    fn duplicate_message_name_raises_redefinition_with_related_span() {
        let (analyzer, _file, _ast) =
            analyze_source("package p; message M { int32 x = 1; } message M { int32 y = 1; }");
        let diag = analyzer
            .diagnostics()
            .all()
            .iter()
            .find(|d| d.kind == DiagnosticKind::Redefinition)
            .expect("expected a redefinition diagnostic");
        assert!(diag.related.is_some());
    }

    #[test]
    fn ordinal_smaller_than_counter_is_rejected_but_counter_still_advances() {
        let (analyzer, _file, _ast) =
            analyze_source("package p; message M { int32 a = 1; int32 b = 1; int32 c; }");
        let def = analyzer.registry().get_definition(&TypeKey::new("p", "M")).unwrap();
        let TypeDefinition::Message(m) = def else { panic!("expected message") };
        assert_eq!(m.fields.iter().map(|f| f.ordinal).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(analyzer.diagnostics().all().iter().any(|d| d.kind == DiagnosticKind::OrdinalNotMonotonic));
    }

    #[test]
    fn unknown_type_reference_raises_diagnostic() {
        let (analyzer, _file, _ast) = analyze_source("package p; message M { Bogus x = 1; }");
        assert!(analyzer.diagnostics().all().iter().any(|d| d.kind == DiagnosticKind::UnknownType));
    }

    #[test]
    fn generic_parameter_resolves_without_registry_lookup() {
        let (analyzer, _file, _ast) = analyze_source("package p; message Box<T> { T value = 1; }");
        let def = analyzer.registry().get_definition(&TypeKey::new("p", "Box")).unwrap();
        let TypeDefinition::Message(m) = def else { panic!("expected message") };
        assert_eq!(m.fields[0].type_instance, TypeInstance::Generic("T".into()));
    }

    #[test]
    fn generic_instance_reachable_from_rpc_is_collected() {
        let (analyzer, _file, _ast) = analyze_source(
            "package p; \
             message Box<T> { T value = 1; } \
             service S { rpc Get(int32) returns (Box<int32>); }",
        );
        let def = analyzer.registry().get_definition(&TypeKey::new("p", "Box")).unwrap();
        let TypeDefinition::Message(m) = def else { panic!("expected message") };
        assert_eq!(m.realized_arg_tuples, vec![vec![TypeInstance::real(TypeKey::new("p", "int32"))]]);
    }

    #[test]
    fn nested_generic_realization_is_reached_via_fixpoint() {
        let (analyzer, _file, _ast) = analyze_source(
            "package p; \
             message Pagination<T> { Array<T> items = 1; } \
             message Array<T> { T value = 1; } \
             service S { rpc List(int32) returns (Pagination<int32>); }",
        );
        let array_def = analyzer.registry().get_definition(&TypeKey::new("p", "Array")).unwrap();
        let TypeDefinition::Message(array) = array_def else { panic!("expected message") };
        assert_eq!(array.realized_arg_tuples, vec![vec![TypeInstance::real(TypeKey::new("p", "int32"))]]);
    }

    #[test]
    fn definition_at_resolves_cursor_position() {
        let (analyzer, file, ast) = analyze_source("package p; message M { int32 x = 1; }");
        let position = ast
            .iter()
            .find_map(|n| if let AstNode::Message(m) = n { Some(m.span.start) } else { None })
            .unwrap();
        assert!(analyzer.definition_at(file, position, &ast).is_some());
    }

    #[test]
    fn invalidate_drops_registry_entries_and_diagnostics() {
        let (mut analyzer, file, _ast) = analyze_source("package p; message M { Bogus x = 1; }");
        analyzer.invalidate(file);
        assert!(analyzer.registry().get_definition(&TypeKey::new("p", "M")).is_none());
        assert!(analyzer.diagnostics().for_file(file).is_empty());
    }

    #[test]
    fn reanalyze_updates_definitions_from_new_text() {
        let mut map = SourceMap::new();
        let mut analyzer = SemanticAnalyzer::new();
        let file = analyzer.reanalyze(&mut map, "p.eproto", "package p; message M { int32 x = 1; }");
        assert!(analyzer.registry().get_definition(&TypeKey::new("p", "M")).is_some());

        let file2 = analyzer.reanalyze(&mut map, "p.eproto", "package p; message N { int32 y = 1; }");
        assert_eq!(file, file2);
        assert!(analyzer.registry().get_definition(&TypeKey::new("p", "M")).is_none());
        assert!(analyzer.registry().get_definition(&TypeKey::new("p", "N")).is_some());
    }
}
