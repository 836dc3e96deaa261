use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator used by the user-facing string form of an [`AssetKey`].
pub const KEY_SEPARATOR: char = '/';

/// Errors produced while parsing keys from user strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
	#[error("asset key must have at least one path component")]
	Empty,
	#[error("asset key {input:?} has an empty path component at position {position}")]
	EmptyComponent { input: String, position: usize },
}

/// Hierarchical identifier of an asset.
///
/// Serialises as a JSON array of path components so persisted payloads stay
/// readable and diffable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(Vec<String>);

impl AssetKey {
	/// Builds a key from path components.
	pub fn new<I, S>(path: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(path.into_iter().map(Into::into).collect())
	}

	/// Parses the `a/b/c` form used in configuration and on the command line.
	pub fn from_user_string(input: &str) -> Result<Self, KeyError> {
		if input.is_empty() {
			return Err(KeyError::Empty);
		}
		let mut path = Vec::new();
		for (position, part) in input.split(KEY_SEPARATOR).enumerate() {
			if part.is_empty() {
				return Err(KeyError::EmptyComponent {
					input: input.to_string(),
					position,
				});
			}
			path.push(part.to_string());
		}
		Ok(Self(path))
	}

	/// Renders the key in `a/b/c` form.
	pub fn to_user_string(&self) -> String {
		self.0.join("/")
	}

	pub fn path(&self) -> &[String] {
		&self.0
	}

	/// Returns a new key with `prefix` components prepended.
	pub fn with_prefix<I, S>(&self, prefix: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut path: Vec<String> = prefix.into_iter().map(Into::into).collect();
		path.extend(self.0.iter().cloned());
		Self(path)
	}
}

impl fmt::Display for AssetKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_user_string())
	}
}

impl FromStr for AssetKey {
	type Err = KeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_user_string(s)
	}
}

impl From<&str> for AssetKey {
	/// Single-component key. Use [`AssetKey::from_user_string`] for `a/b` paths.
	fn from(name: &str) -> Self {
		Self(vec![name.to_string()])
	}
}

/// Identifies one check attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetCheckKey {
	pub asset_key: AssetKey,
	pub name: String,
}

impl AssetCheckKey {
	pub fn new(asset_key: impl Into<AssetKey>, name: impl Into<String>) -> Self {
		Self {
			asset_key: asset_key.into(),
			name: name.into(),
		}
	}
}

impl fmt::Display for AssetCheckKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.asset_key, self.name)
	}
}
