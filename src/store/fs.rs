use crate::error::{Result, RewriteError};
use crate::store::{TextStore, decode};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl TextStore for FsStore {
	fn read(&self, path: &Path) -> Result<String> {
		let bytes = std::fs::read(path).map_err(|source| {
			if source.kind() == std::io::ErrorKind::NotFound {
				RewriteError::NotFound {
					path: path.to_path_buf(),
				}
			} else {
				RewriteError::ReadError {
					path: path.to_path_buf(),
					source,
				}
			}
		})?;

		decode(path, bytes)
	}

	/// Write through a temp file in the same directory, then rename over `path`.
	///
	/// Existing permissions are carried over to the new file.
	fn write(&mut self, path: &Path, text: &str) -> Result<()> {
		let io_error = |source: std::io::Error| RewriteError::IoError {
			path: path.to_path_buf(),
			source,
		};

		let dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};

		let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
		temp.write_all(text.as_bytes()).map_err(io_error)?;
		temp.as_file().sync_all().map_err(io_error)?;

		if let Ok(metadata) = std::fs::metadata(path) {
			temp.as_file()
				.set_permissions(metadata.permissions())
				.map_err(io_error)?;
		}

		temp.persist(path).map_err(|e| io_error(e.error))?;
		tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote file");
		Ok(())
	}
}
