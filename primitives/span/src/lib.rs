#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Source Map — owns file contents and source-span primitives.
//!
//! Every user-visible diagnostic carries a [`Span`] pointing back into a
//! [`SourceMap`]. Positions are stored 0-indexed internally and presented
//! 1-indexed, matching typical editor conventions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a file registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(u32);

/// A 0-indexed (line, column) position within a file.
///
/// Supplementary-plane Unicode code points advance the column by 2, to match
/// UTF-16 code-unit counting used by most editor protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column number.
    pub col: u32,
}

impl Position {
    /// Construct a position from 0-indexed coordinates.
    pub fn new(line: u32, col: u32) -> Self { Self { line, col } }

    /// 1-indexed line number, for display to users.
    pub fn display_line(&self) -> u32 { self.line + 1 }

    /// 1-indexed column number, for display to users.
    pub fn display_col(&self) -> u32 { self.col + 1 }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.display_line(), self.display_col())
    }
}

/// A half-open range of source text, identified by file and start/end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// File this span refers to.
    pub file: FileId,
    /// Inclusive start position.
    pub start: Position,
    /// Exclusive end position.
    pub end: Position,
}

impl Span {
    /// Construct a new span.
    pub fn new(file: FileId, start: Position, end: Position) -> Self { Self { file, start, end } }

    /// A zero-width span at a single position, useful for synthesized tokens.
    pub fn point(file: FileId, at: Position) -> Self { Self { file, start: at, end: at } }
}

/// The text and path of one registered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as given to [`SourceMap::insert`] (not necessarily canonicalized).
    pub path: String,
    /// File contents, with CRLF already normalized to LF.
    pub text: String,
}

/// Owns the contents of every file known to a compilation or LSP session.
///
/// Entries live for the lifetime of the session; on a file change the caller
/// invalidates and re-inserts the file, which is the only way spans for that
/// file change identity.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: BTreeMap<FileId, SourceFile>,
    next_id: u32,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self { Self::default() }

    /// Register a file's contents, normalizing CRLF to LF, and return its id.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.next_id);
        self.next_id += 1;
        let normalized = text.into().replace("\r\n", "\n");
        self.files.insert(id, SourceFile { path: path.into(), text: normalized });
        id
    }

    /// Look up a file's contents by id.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> { self.files.get(&id) }

    /// Find the id of a file previously inserted under `path`, if still present.
    pub fn find(&self, path: &str) -> Option<FileId> {
        self.files.iter().find(|(_, f)| f.path == path).map(|(id, _)| *id)
    }

    /// Remove a file's entry, invalidating any [`FileId`] referencing it.
    ///
    /// Returns the removed contents, if the id was present.
    pub fn invalidate(&mut self, id: FileId) -> Option<SourceFile> { self.files.remove(&id) }

    /// Iterate all registered files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().map(|(id, f)| (*id, f))
    }

    /// Extract the substring a span covers from its file's text, if available.
    ///
    /// Returns `None` if the span's line/column positions fall outside the
    /// file's current text (e.g. after an edit shrank the file).
    pub fn text_of(&self, span: Span) -> Option<&str> {
        let file = self.get(span.file)?;
        let lines: Vec<&str> = file.text.split('\n').collect();
        let start = byte_offset(&lines, span.start)?;
        let end = byte_offset(&lines, span.end)?;
        file.text.get(start..end)
    }
}

fn byte_offset(lines: &[&str], pos: Position) -> Option<usize> {
    let line = lines.get(pos.line as usize)?;
    let mut offset: usize = lines.iter().take(pos.line as usize).map(|l| l.len() + 1).sum();
    offset += line.char_indices().nth(pos.col as usize).map(|(i, _)| i).unwrap_or(line.len());
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trips() {
        let mut map = SourceMap::new();
        let id = map.insert("a.eproto", "package a;\r\nmessage M {}\r\n");
        let file = map.get(id).expect("file should be present");
        assert_eq!(file.path, "a.eproto");
        assert!(!file.text.contains('\r'));
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut map = SourceMap::new();
        let id = map.insert("a.eproto", "package a;");
        assert!(map.invalidate(id).is_some());
        assert!(map.get(id).is_none());
    }

    #[test]
    fn position_display_is_one_indexed() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.to_string(), "1:1");
    }

    #[test]
    fn text_of_extracts_span() {
        let mut map = SourceMap::new();
        let id = map.insert("a.eproto", "package a;\nmessage M {}\n");
        let span = Span::new(id, Position::new(0, 0), Position::new(0, 7));
        assert_eq!(map.text_of(span), Some("package"));
    }
}
