//! Black-box coverage of the canonical example scenarios, driven entirely
//! through `pipeline`'s public API rather than internal unit hooks.

use std::io::Write;

use config::Strategy;

fn write_source(dir: &std::path::Path, name: &str, text: &str) {
    let path = dir.join(name);
    let mut file = std::fs::File::create(path).expect("create source file");
    file.write_all(text.as_bytes()).expect("write source file");
}

#[test]
fn e1_enum_explicit_value_reuse_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "demo.eproto", "package demo; enum TestEnum { A = 0, B = 4, C = 4 }");

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(!session.has_errors());
}

#[test]
fn e2_generic_pagination_realizes_and_emits_rpc_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(
        dir.path(),
        "current.eproto",
        "package current; \
         message Response<TPag, TItem> { TPag pagination = 1; Array<TItem> items = 2; } \
         message Pagination<T> { T current = 1; optional T next = 2; } \
         service TestService { rpc test(Response<Pagination<int32>, Date>) returns (Pagination<string>); }",
    );

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(!session.has_errors());

    let out_dir = tempfile::tempdir().expect("tempdir");
    let report =
        pipeline::emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
    let generated = std::fs::read_to_string(&report.written[0]).expect("read generated file");
    assert!(generated.contains("fn Pagination__int32_serialize"));
    assert!(generated.contains("fn Pagination__string_serialize"));
    assert!(generated.contains("fn Response__Pagination__int32__Date_serialize"));
    assert!(generated.contains("/TestService/test"));
}

#[test]
fn e3_ordinal_non_monotonic_raises_diagnostic() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "p.eproto", "package p; message M { int32 a = 1; int32 b = 1; }");

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(session.has_errors());
}

#[test]
fn e4_cross_package_reference_aliases_the_import() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "a.eproto", "package a; message Fruit { string name = 1; }");
    write_source(dir.path(), "b.eproto", "package b; message Box { a.Fruit f = 1; }");

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(!session.has_errors());

    let out_dir = tempfile::tempdir().expect("tempdir");
    let report =
        pipeline::emit(&session, out_dir.path(), Strategy::Native).expect("emit succeeds");
    let box_path = report.written.iter().find(|p| p.ends_with("b.rs")).expect("b.rs written");
    let generated = std::fs::read_to_string(box_path).expect("read generated file");
    assert!(generated.contains("use a::Fruit as a__Fruit;"));
}

#[test]
fn e5_unknown_type_reference_still_analyzes_remaining_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "p.eproto", "package p; message M { Missing x = 1; int32 y = 2; }");

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(session.has_errors());

    let dump = pipeline::driver::dump_definitions(&session);
    let (_, def) = dump
        .definitions
        .iter()
        .find(|(k, _)| k.name == "M")
        .expect("M should still be present in definitions");
    let ir::TypeDefinition::Message(m) = def else { panic!("expected message") };
    assert_eq!(m.fields.len(), 2);
}

#[test]
fn e6_nullable_array_round_trips_under_both_strategies() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_source(dir.path(), "m.eproto", "package p; message M { optional Array<int32> xs = 1; }");

    let session = pipeline::driver::compile(dir.path()).expect("compile succeeds");
    assert!(!session.has_errors());

    for strategy in [Strategy::Native, Strategy::Evolved] {
        let out_dir = tempfile::tempdir().expect("tempdir");
        let report =
            pipeline::emit(&session, out_dir.path(), strategy).expect("emit succeeds");
        let generated = std::fs::read_to_string(&report.written[0]).expect("read generated file");
        assert!(generated.contains("fn M_serialize"));
        assert!(generated.contains("fn M_deserialize"));
    }
}
