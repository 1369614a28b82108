//! Text storage for reblock.
//!
//! The rewrite engine works on in-memory strings only. This module supplies
//! the document before a rewrite and persists it afterwards:
//! - [`FsStore`] reads and atomically writes files on disk
//! - [`MemoryStore`] keeps documents in memory

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{Result, RewriteError};
use std::path::Path;

/// Source and sink for documents.
pub trait TextStore {
	/// Read the full text at `path`.
	fn read(&self, path: &Path) -> Result<String>;

	/// Replace the text at `path`.
	fn write(&mut self, path: &Path, text: &str) -> Result<()>;
}

/// Decode raw bytes read from `path` as UTF-8.
pub(crate) fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
	String::from_utf8(bytes).map_err(|source| RewriteError::DecodeError {
		path: path.to_path_buf(),
		source,
	})
}
