//! Compile a source tree into a [`CompileSession`], then emit it under a
//! chosen strategy.
//!
//! Mirrors §5's sequential model: discovery, then one tokenize/parse/analyze
//! pass per file sharing a single [`SourceMap`] and [`SemanticAnalyzer`], then
//! one emission pass over the resolved registry.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use analysis::SemanticAnalyzer;
use ast::AstNode;
use config::{Config, Strategy};
use diagnostics::Diagnostics;
use ir::{MessageDef, TypeDefinition, TypeInstance, TypeKey};
use monomorphizer::MessageDefinitionInstance;
use registry::TypeRegistry;
use span::{FileId, SourceMap};

use crate::{PipelineError, Result};

/// One parsed source file plus its path and [`FileId`], kept for emission.
struct ParsedFile {
    path: PathBuf,
    #[allow(dead_code)]
    file: FileId,
    ast: ast::File,
}

/// The shared state of one compilation: every file's AST, and the analyzer
/// that owns the resolved registry and accumulated diagnostics.
pub struct CompileSession {
    /// Every file's contents, keyed by [`FileId`].
    pub source_map: SourceMap,
    /// The resolved registry and diagnostics.
    pub analyzer: SemanticAnalyzer,
    source_root: PathBuf,
    files: Vec<ParsedFile>,
}

impl CompileSession {
    /// True if any diagnostic was raised anywhere in this session.
    pub fn has_errors(&self) -> bool { self.analyzer.diagnostics().has_errors() }
}

/// Walk `source_dir` for `*.eproto` files and run them through
/// tokenize -> parse -> analyze, sharing one registry across the fileset.
pub fn compile(source_dir: &Path) -> Result<CompileSession> {
    let source_paths = path::discover_source_files(source_dir)?;
    let mut source_map = SourceMap::new();
    let mut analyzer = SemanticAnalyzer::new();
    let mut files = Vec::with_capacity(source_paths.len());

    for source_path in &source_paths {
        let text = std::fs::read_to_string(source_path)?;
        let path_str = source_path.to_string_lossy().into_owned();
        let file = analyzer.reanalyze(&mut source_map, &path_str, &text);

        // `reanalyze` owns the authoritative diagnostics pass; re-derive the
        // AST here purely so the driver knows which declarations live in
        // which file when it comes time to emit.
        let mut scratch = Diagnostics::new();
        let source_text = source_map.get(file).expect("just inserted").text.clone();
        let tokens = lexer::tokenize(file, &source_text, &mut scratch);
        let ast = parser::parse(file, tokens, &mut scratch);
        files.push(ParsedFile { path: source_path.clone(), file, ast });
        logging::trace("pipeline", &format!("tokenized {}", source_path.display()));
    }

    logging::trace("pipeline", &format!("analyzed {} file(s)", files.len()));
    Ok(CompileSession { source_map, analyzer, source_root: source_dir.to_path_buf(), files })
}

/// Load `eproto.toml` from `source_dir`, falling back to defaults if absent.
pub fn load_config(source_dir: &Path) -> Result<Config> { Ok(Config::load(source_dir)?) }

/// Files written by one [`emit`] call.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Output paths written, in the order they were written.
    pub written: Vec<PathBuf>,
}

fn target_extension(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Native | Strategy::Evolved => "rs",
        Strategy::Zod => "ts",
        Strategy::Skip => "",
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

/// One concrete instance per realization of `def`: its own sole instance for
/// a non-generic message, or one per recorded realized argument tuple.
fn instances_for(def: &MessageDef) -> Vec<MessageDefinitionInstance> {
    if def.generics.is_empty() {
        vec![MessageDefinitionInstance {
            name: def.name.clone(),
            package_id: def.package_id.clone(),
            args: Vec::new(),
            fields: def.fields.clone(),
        }]
    } else {
        monomorphizer::monomorphize_all(def)
    }
}

fn references_any(instance: &MessageDefinitionInstance) -> bool {
    let any_key = TypeKey::builtin("any");
    instance.fields.iter().any(|field| {
        let mut found = false;
        field.type_instance.walk(&mut |t| {
            if matches!(t, TypeInstance::Real { key, .. } if key == &any_key) {
                found = true;
            }
        });
        found
    })
}

/// The name a reference to `instance` is emitted under: the builtin `void`
/// type is special-cased to `"Void"` so the emitter's empty-closure check
/// (`emitter::emit_rpc_descriptor`) recognizes it.
fn name_of(instance: &TypeInstance) -> String {
    match instance {
        TypeInstance::Real { key, .. } if key == &TypeKey::builtin("void") => "Void".to_string(),
        TypeInstance::Real { key, args } => codegen::utils::realization_name(key, args),
        TypeInstance::Generic(name) => name.clone(),
        TypeInstance::Unknown => "Unknown".to_string(),
    }
}

/// Emit one output file per source file under `strategy`, rebased from the
/// session's source root onto `output_dir`, plus a single synthetic file for
/// the builtin `Any` struct if it was referenced anywhere.
pub fn emit(session: &CompileSession, output_dir: &Path, strategy: Strategy) -> Result<EmitReport> {
    if strategy == Strategy::Skip {
        return Ok(EmitReport::default());
    }

    std::fs::create_dir_all(output_dir)?;
    let registry = session.analyzer.registry();
    let extension = target_extension(strategy);
    let mut written = Vec::new();
    let mut any_referenced = false;

    for parsed in &session.files {
        let Some(out_path) =
            path::rebase_output_path(&session.source_root, output_dir, &parsed.path, extension)
        else {
            continue;
        };

        let package_id = file_package_id(&parsed.ast);
        let mut imports: BTreeSet<(TypeKey, String)> = BTreeSet::new();
        let mut body = String::new();

        for node in &parsed.ast {
            match node {
                AstNode::Message(m) => {
                    let key = TypeKey::new(&package_id, &m.name.name);
                    let Some(TypeDefinition::Message(def)) = registry.get_definition(&key) else {
                        continue;
                    };
                    for instance in instances_for(def) {
                        imports.extend(codegen::emitter::collect_imports(&package_id, &instance));
                        any_referenced |= references_any(&instance);
                        let name = codegen::utils::realization_name(&key, &instance.args);
                        body.push_str(&codegen::emit_realization(&name, &instance, registry, strategy)?);
                        body.push('\n');
                    }
                }
                AstNode::Service(s) => {
                    let key = TypeKey::new(&package_id, &s.name.name);
                    if let Some(svc) = registry.get_service(&key) {
                        body.push_str(&codegen::emit_service(svc, name_of));
                    }
                }
                AstNode::Package(_) | AstNode::Enum(_) | AstNode::StringEnum(_) => {}
            }
        }

        let mut out = String::new();
        for (key, alias) in &imports {
            out.push_str(&format!("use {}::{} as {};\n", key.package_id, key.name, alias));
        }
        if !imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&body);

        std::fs::write(&out_path, out)?;
        logging::trace("pipeline", &format!("wrote {}", out_path.display()));
        written.push(out_path);
    }

    if any_referenced {
        let any_path = output_dir.join(format!("Any.{extension}"));
        let text = codegen::emit_any_definition(registry, strategy)?;
        std::fs::write(&any_path, text)?;
        written.push(any_path);
    }

    Ok(EmitReport { written })
}

/// A JSON-serializable snapshot of everything resolved in a registry, for
/// `-d | --definitions`.
#[derive(Debug, serde::Serialize)]
pub struct DefinitionsDump {
    /// Every type definition, keyed by its symbolic key.
    pub definitions: Vec<(TypeKey, TypeDefinition)>,
    /// Every service definition, keyed by its symbolic key.
    pub services: Vec<(TypeKey, ir::ServiceDefinition)>,
}

/// Snapshot `session`'s resolved registry for JSON serialization.
pub fn dump_definitions(session: &CompileSession) -> DefinitionsDump {
    let registry: &TypeRegistry = session.analyzer.registry();
    DefinitionsDump {
        definitions: registry.definitions().map(|(k, d)| (k.clone(), d.clone())).collect(),
        services: registry.services().map(|(k, s)| (k.clone(), s.clone())).collect(),
    }
}

/// Every parsed file's AST, paired with its source path, for `-a | --ast`.
pub fn dump_ast(session: &CompileSession) -> Vec<(String, ast::File)> {
    session.files.iter().map(|f| (f.path.to_string_lossy().into_owned(), f.ast.clone())).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_source(dir: &std::path::Path, name: &str, text: &str) {
        let path = dir.join(name);
        let mut file = std::fs::File::create(path).expect("create source file");
        file.write_all(text.as_bytes()).expect("write source file");
    }

    #[test]
    fn compile_and_emit_native_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(
            dir.path(),
            "fruit.eproto",
            "package p; message Fruit { int32 id = 1; string name = 2; }",
        );

        let session = compile(dir.path()).expect("compile succeeds");
        assert!(!session.has_errors());

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
        assert_eq!(report.written.len(), 1);

        let generated = std::fs::read_to_string(&report.written[0]).expect("read generated file");
        assert!(generated.contains("fn Fruit_serialize"));
        assert!(generated.contains("write_int32"));
    }

    #[test]
    fn skip_strategy_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(dir.path(), "fruit.eproto", "package p; message Fruit { int32 id = 1; }");
        let session = compile(dir.path()).expect("compile succeeds");

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Skip).expect("emit succeeds");
        assert!(report.written.is_empty());
    }

    #[test]
    fn any_reference_emits_synthetic_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(dir.path(), "blob.eproto", "package p; message Blob { any payload = 1; }");
        let session = compile(dir.path()).expect("compile succeeds");

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
        assert!(report.written.iter().any(|p| p.ends_with("Any.rs")));
    }

    #[test]
    fn unknown_type_still_produces_an_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(dir.path(), "bad.eproto", "package p; message M { Bogus x = 1; }");
        let session = compile(dir.path()).expect("compile succeeds");
        assert!(session.has_errors());

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
        assert_eq!(report.written.len(), 1);
    }

    #[test]
    fn generic_pagination_emits_every_realization_and_an_rpc_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(
            dir.path(),
            "current.eproto",
            "package current; \
             message Response<TPag, TItem> { TPag pagination = 1; Array<TItem> items = 2; } \
             message Pagination<T> { T current = 1; optional T next = 2; } \
             service TestService { rpc test(Response<Pagination<int32>, Date>) returns (Pagination<string>); }",
        );

        let session = compile(dir.path()).expect("compile succeeds");
        assert!(!session.has_errors());

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
        assert_eq!(report.written.len(), 1);

        let generated = std::fs::read_to_string(&report.written[0]).expect("read generated file");
        assert!(generated.contains("fn Pagination__int32_serialize"));
        assert!(generated.contains("fn Pagination__string_serialize"));
        assert!(generated.contains("fn Response__Pagination__int32__Date_serialize"));
        assert!(generated.contains("/TestService/test"));
    }

    #[test]
    fn cross_package_reference_aliases_the_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(dir.path(), "a.eproto", "package a; message Fruit { string name = 1; }");
        write_source(dir.path(), "b.eproto", "package b; message Box { a.Fruit f = 1; }");

        let session = compile(dir.path()).expect("compile succeeds");
        assert!(!session.has_errors());

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");

        let box_path = report.written.iter().find(|p| p.ends_with("b.rs")).expect("b.rs written");
        let generated = std::fs::read_to_string(box_path).expect("read generated file");
        assert!(generated.contains("use a::Fruit as a__Fruit;"));
    }

    #[test]
    fn nullable_array_round_trips_under_native_strategy() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_source(dir.path(), "m.eproto", "package p; message M { optional Array<int32> xs = 1; }");

        let session = compile(dir.path()).expect("compile succeeds");
        assert!(!session.has_errors());

        let out_dir = tempfile::tempdir().expect("tempdir");
        let report = emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
        let generated = std::fs::read_to_string(&report.written[0]).expect("read generated file");
        assert!(generated.contains("fn M_serialize"));
        assert!(generated.contains("fn M_deserialize"));
    }
}
