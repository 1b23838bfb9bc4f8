//! Path utility functions for finding the workspace root, discovering source
//! files, and rebasing output paths.

use std::path::{Path, PathBuf};

/// Find the workspace root by looking for the root Cargo.toml
///
/// This function walks up the directory tree from the current directory
/// until it finds a `Cargo.toml` file containing `[workspace]`.
///
/// # Returns
///
/// Returns `Result<PathBuf>` containing the path to the workspace root directory.
/// Returns an error if the workspace root cannot be found.
pub fn find_project_root() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = std::env::current_dir()?;
    loop {
        let cargo_toml = current.join("Cargo.toml");
        if cargo_toml.exists() {
            let contents = std::fs::read_to_string(&cargo_toml)?;
            if contents.contains("[workspace]") {
                return Ok(current);
            }
        }
        if !current.pop() {
            return Err("Could not find workspace root (no workspace Cargo.toml found)".into());
        }
    }
}

/// The fixed source file extension this language uses.
pub const SOURCE_EXTENSION: &str = "eproto";

/// Recursively walk `source_dir` and collect every `*.eproto` file, in a
/// stable (sorted) order so compilation is deterministic regardless of
/// directory-entry iteration order.
pub fn discover_source_files(source_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(source_dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}

/// Rebase a source file path onto an output root, preserving sub-directory
/// structure and swapping the extension.
///
/// `source_file` must lie under `source_root`; returns `None` otherwise.
pub fn rebase_output_path(
    source_root: &Path,
    output_root: &Path,
    source_file: &Path,
    target_extension: &str,
) -> Option<PathBuf> {
    let relative = source_file.strip_prefix(source_root).ok()?;
    Some(output_root.join(relative).with_extension(target_extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_preserves_subdirectories_and_swaps_extension() {
        let rebased = rebase_output_path(
            Path::new("/src"),
            Path::new("/out"),
            Path::new("/src/pkg/a.eproto"),
            "ts",
        )
        .expect("source_file is under source_root");
        assert_eq!(rebased, Path::new("/out/pkg/a.ts"));
    }

    #[test]
    fn rebase_rejects_paths_outside_source_root() {
        assert!(rebase_output_path(
            Path::new("/src"),
            Path::new("/out"),
            Path::new("/other/a.eproto"),
            "ts"
        )
        .is_none());
    }

    #[test]
    fn discover_source_files_finds_nested_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("b.eproto"), "").unwrap();
        std::fs::write(dir.path().join("pkg/a.eproto"), "").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "").unwrap();

        let found = discover_source_files(dir.path()).expect("walk succeeds");
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.eproto"));
        assert!(found[1].ends_with("pkg/a.eproto"));
    }
}
