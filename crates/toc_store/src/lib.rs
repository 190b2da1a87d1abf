//! TOC Store - Bookmark files, file I/O and settings
//!
//! Two on-disk formats are supported: the indented `.vbkm` text format and
//! a JSON document with a versioned header. Both are written by walking
//! the tree through [`toc_model::export::BookmarkSink`] and read back into
//! a fresh [`toc_model::TocTree`].

mod format;
mod serializer;
mod vbkm;
mod file_io;
mod error;
mod settings;
mod document;

pub use format::*;
pub use serializer::*;
pub use vbkm::*;
pub use file_io::*;
pub use error::*;
pub use settings::*;
pub use document::*;
