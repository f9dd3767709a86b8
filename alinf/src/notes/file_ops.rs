//! File operations for notes
//!
//! Reading/writing note files and deriving a note's canonical name.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// The note's canonical name: its file name without the extension
/// (e.g. "notes/Василий Пупкин.md" -> "Василий Пупкин")
pub fn note_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
}

/// Read a note file
pub fn read_note(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Write a note file (creates parent directories as needed)
pub fn write_note(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
