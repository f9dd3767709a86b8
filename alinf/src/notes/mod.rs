//! Notes: markdown files with a YAML frontmatter block
//!
//! The frontmatter holds the note's aliases and the remembered options of
//! the last inflection run; the body is never touched.

pub mod file_ops;
pub mod frontmatter;

pub use frontmatter::Frontmatter;
