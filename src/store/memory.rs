use crate::error::{Result, RewriteError};
use crate::store::{TextStore, decode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Documents kept in memory, keyed by path.
///
/// Contents are stored as bytes so undecodable input behaves like it does on disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	files: HashMap<PathBuf, Vec<u8>>,
	writes: usize,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a document.
	pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
		self.files.insert(path.into(), contents.into());
	}

	/// Raw contents at `path`, if present.
	pub fn get(&self, path: &Path) -> Option<&[u8]> {
		self.files.get(path).map(Vec::as_slice)
	}

	/// Number of successful writes so far.
	pub fn writes(&self) -> usize {
		self.writes
	}
}

impl TextStore for MemoryStore {
	fn read(&self, path: &Path) -> Result<String> {
		let bytes = self
			.files
			.get(path)
			.cloned()
			.ok_or_else(|| RewriteError::NotFound {
				path: path.to_path_buf(),
			})?;
		decode(path, bytes)
	}

	fn write(&mut self, path: &Path, text: &str) -> Result<()> {
		self.files.insert(path.to_path_buf(), text.as_bytes().to_vec());
		self.writes += 1;
		Ok(())
	}
}
