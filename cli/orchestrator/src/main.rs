//! eproto command-line compiler
//!
//! Compiles a directory of source files, resolving cross-file references
//! and generic realizations, and emits generated modules under a chosen
//! wire-format strategy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::env;
use std::path::Path;

use eproto_cli::{parse_args, Args, CliError, DumpTarget, Result};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    match run(&args) {
        Ok(had_errors) => std::process::exit(if had_errors { 1 } else { 0 }),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("eprotoc");
    println!();
    println!("USAGE:");
    println!("    eprotoc <sourceDir> [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    -d, --definitions [<file>]    Dump resolved definitions as JSON");
    println!("    -a, --ast [<file>]            Dump parsed ASTs as JSON");
    println!("    -o, --output <dir>             Output directory (default: .)");
    println!("    -g, --gen <strategy>           native | evolved | zod | skip (default: native)");
    println!("    -h, --help                     Show this help message");
}

fn run(raw_args: &[String]) -> Result<bool> {
    let Args { source_dir, definitions, ast, output_dir, strategy } = parse_args(raw_args)?;

    let source_dir =
        source_dir.ok_or_else(|| CliError::Usage("missing required <sourceDir>".into()))?;

    logging::trace("cli", &format!("compiling {}", source_dir.display()));
    let session = pipeline::driver::compile(&source_dir)?;

    if let Some(target) = definitions {
        let dump = pipeline::driver::dump_definitions(&session);
        write_json(&target, &dump)?;
    }

    if let Some(target) = ast {
        let dump = pipeline::driver::dump_ast(&session);
        write_json(&target, &dump)?;
    }

    let config = pipeline::driver::load_config(&source_dir)?;
    let strategy = strategy.unwrap_or(config.codegen.strategy);
    let output_dir = output_dir.unwrap_or(config.codegen.output_dir);

    if session.has_errors() {
        eprintln!("Compilation completed with diagnostics; skipping emission.");
        return Ok(true);
    }

    let report = pipeline::emit(&session, &output_dir, strategy)?;
    for path in &report.written {
        logging::trace("cli", &format!("wrote {}", path.display()));
    }
    println!("Wrote {} file(s) to {}.", report.written.len(), output_dir.display());

    Ok(false)
}

fn write_json(target: &DumpTarget, value: &impl serde::Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match target {
        DumpTarget::Stdout => println!("{text}"),
        DumpTarget::File(path) => write_dump_file(path, &text)?,
    }
    Ok(())
}

fn write_dump_file(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    Ok(())
}
