//! Alias inflection for Markdown notes.
//!
//! Looks up grammatical forms of a note's name and aliases through a
//! pluggable inflector and writes them back into the note's frontmatter.

pub mod aliases;
pub mod commands;
pub mod config;
pub mod http;
pub mod inflectors;
pub mod models;
pub mod notes;

#[cfg(test)]
mod test_support;
