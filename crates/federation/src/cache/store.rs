use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CacheError;
use crate::records::SerializedAirflowDefinitionsData;
use crate::serdes::{deserialize_from_str, serialize_to_string_pretty};

/// Durable storage for one endpoint's cache artifact.
pub trait CacheStore: Send + Sync {
	/// Reads the stored artifact, or `None` if nothing has been stored yet.
	fn load(&self) -> Result<Option<SerializedAirflowDefinitionsData>, CacheError>;

	/// Replaces the stored artifact. Readers never observe a partial write.
	fn store(&self, data: &SerializedAirflowDefinitionsData) -> Result<(), CacheError>;
}

/// Stores the artifact as a JSON file.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
	path: PathBuf,
}

impl FsCacheStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl CacheStore for FsCacheStore {
	fn load(&self) -> Result<Option<SerializedAirflowDefinitionsData>, CacheError> {
		let text = match std::fs::read_to_string(&self.path) {
			Ok(text) => text,
			Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
			Err(error) => return Err(CacheError::io(&self.path, error)),
		};
		let data = deserialize_from_str(&text)?;
		debug!(path = %self.path.display(), "loaded cache artifact");
		Ok(Some(data))
	}

	fn store(&self, data: &SerializedAirflowDefinitionsData) -> Result<(), CacheError> {
		let text = serialize_to_string_pretty(data)?;
		write_atomic(&self.path, text.as_bytes())
	}
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`.
///
/// Each call gets its own temp file, so concurrent writers to one path never
/// interfere; the last rename wins. Parent directories are created as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	std::fs::create_dir_all(parent).map_err(|error| CacheError::io(parent, error))?;

	let mut temp = NamedTempFile::new_in(parent).map_err(|error| CacheError::io(parent, error))?;
	temp.write_all(bytes).map_err(|error| CacheError::io(temp.path(), error))?;
	temp.as_file().sync_all().map_err(|error| CacheError::io(temp.path(), error))?;
	temp.persist(path).map_err(|error| CacheError::io(path, error.error))?;
	debug!(path = %path.display(), bytes = bytes.len(), "wrote cache artifact");
	Ok(())
}
