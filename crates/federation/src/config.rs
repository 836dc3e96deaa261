//! Federation configuration, loaded from TOML.
//!
//! ```toml
//! cache_dir = ".weir/cache"
//! refetch_on_incompatible_cache = true
//!
//! [[endpoints]]
//! name = "prod"
//! webserver_url = "https://airflow.example.com"
//! cache_file = "prod.json" # optional, relative to cache_dir
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_cache_dir() -> PathBuf {
	PathBuf::from(".weir/cache")
}

fn default_true() -> bool {
	true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FederationConfig {
	#[serde(default = "default_cache_dir")]
	pub cache_dir: PathBuf,
	/// Treat caches written by a newer schema as missing and refetch them.
	#[serde(default = "default_true")]
	pub refetch_on_incompatible_cache: bool,
	#[serde(default)]
	pub endpoints: Vec<EndpointConfig>,
}

impl Default for FederationConfig {
	fn default() -> Self {
		Self {
			cache_dir: default_cache_dir(),
			refetch_on_incompatible_cache: true,
			endpoints: Vec::new(),
		}
	}
}

/// One remote Airflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
	pub name: String,
	pub webserver_url: String,
	#[serde(default)]
	pub cache_file: Option<PathBuf>,
}

impl EndpointConfig {
	/// Where this endpoint's artifact lives: `cache_file` resolved against
	/// `cache_dir`, or `<cache_dir>/<name>.json`.
	pub fn cache_path(&self, cache_dir: &Path) -> PathBuf {
		match &self.cache_file {
			Some(file) => cache_dir.join(file),
			None => cache_dir.join(format!("{}.json", self.name)),
		}
	}
}

impl FederationConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let config = Self::from_toml_str(&input)?;
		tracing::debug!(path = %path.display(), endpoints = config.endpoints.len(), "loaded federation config");
		Ok(config)
	}

	/// Endpoint names must be non-empty and unique.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = BTreeSet::new();
		for (index, endpoint) in self.endpoints.iter().enumerate() {
			if endpoint.name.trim().is_empty() {
				return Err(ConfigError::EmptyName { index });
			}
			if !seen.insert(endpoint.name.as_str()) {
				return Err(ConfigError::DuplicateEndpoint {
					name: endpoint.name.clone(),
				});
			}
		}
		Ok(())
	}

	pub fn endpoint(&self, name: &str) -> Result<&EndpointConfig, ConfigError> {
		self.endpoints
			.iter()
			.find(|endpoint| endpoint.name == name)
			.ok_or_else(|| ConfigError::UnknownEndpoint { name: name.to_string() })
	}
}
