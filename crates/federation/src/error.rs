use std::path::PathBuf;

use weir_primitives::AssetKey;

/// Boxed error reported by a remote fetcher.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures encoding or decoding versioned records.
#[derive(Debug, thiserror::Error)]
pub enum SerdesError {
	/// The payload was written by a newer schema than this build understands.
	#[error("{record} payload has schema version {found}, but the newest supported version is {supported}")]
	SchemaVersion { record: &'static str, found: u64, supported: u32 },

	/// The payload is a known record, but not the one requested.
	#[error("expected a {expected} record, found {found}")]
	TypeMismatch { expected: &'static str, found: String },

	/// The payload's type tag names no known record.
	#[error("unknown record type {0:?}")]
	UnknownRecordType(String),

	/// A field required at the payload's version is absent.
	#[error("{record} payload is missing field {field:?}")]
	MissingField { record: &'static str, field: &'static str },

	/// The payload does not have the envelope shape.
	#[error("malformed {record} payload: {reason}")]
	Malformed { record: &'static str, reason: String },

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

/// Failures computing or checking a topological ordering of asset keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
	/// The dependency edges contain a cycle; these keys could not be ordered.
	#[error("dependency cycle among {}", render_keys(.0))]
	Cycle(Vec<AssetKey>),

	/// A dependency is ordered after the asset depending on it.
	#[error("{dependency} is ordered after its dependent {key}")]
	DependencyAfterDependent { key: AssetKey, dependency: AssetKey },

	/// An asset with dependencies is absent from the ordering.
	#[error("{0} is missing from the topological ordering")]
	MissingKey(AssetKey),

	/// A key appears more than once in the ordering.
	#[error("{0} appears more than once in the topological ordering")]
	DuplicateKey(AssetKey),
}

fn render_keys(keys: &[AssetKey]) -> String {
	keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Failures loading, persisting or refreshing an endpoint cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
	#[error("cache I/O failed for {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Serdes(#[from] SerdesError),

	#[error(transparent)]
	Ordering(#[from] OrderingError),

	/// The remote fetch failed.
	#[error("fetching {endpoint} failed: {source}")]
	Fetch {
		endpoint: String,
		#[source]
		source: BoxError,
	},

	/// No cached data exists and none could be obtained.
	#[error("no cached data for {endpoint}{}", .cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default())]
	NoCache { endpoint: String, cause: Option<Box<CacheError>> },

	/// A refresh was requested for an endpoint without a fetcher.
	#[error("no fetcher configured for {endpoint}")]
	NoFetcher { endpoint: String },
}

impl CacheError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}

	/// Whether this error, or the error that caused it, is a schema version mismatch.
	pub fn is_schema_version(&self) -> bool {
		match self {
			Self::Serdes(SerdesError::SchemaVersion { .. }) => true,
			Self::NoCache { cause: Some(cause), .. } => cause.is_schema_version(),
			_ => false,
		}
	}
}

/// Failures reading or validating a federation config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid federation config: {0}")]
	Parse(#[from] toml::de::Error),

	/// Endpoint at this position has an empty name.
	#[error("endpoint #{index} has an empty name")]
	EmptyName { index: usize },

	/// Two endpoints share a name.
	#[error("endpoint {name:?} is configured more than once")]
	DuplicateEndpoint { name: String },

	#[error("no endpoint named {name:?}")]
	UnknownEndpoint { name: String },
}
