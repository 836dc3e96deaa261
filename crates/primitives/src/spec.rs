use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::key::AssetKey;

/// Free-form, JSON-safe metadata attached to a declaration.
pub type MetadataMap = BTreeMap<String, serde_json::Value>;

/// String tags attached to a declaration.
pub type TagMap = BTreeMap<String, String>;

/// How partitions of a downstream asset map onto its upstream dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionMapping {
	Identity,
	AllPartitions,
	LastPartition,
	TimeWindow { start_offset: i32, end_offset: i32 },
}

/// A dependency edge from a declaration to an upstream asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDep {
	pub asset_key: AssetKey,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub partition_mapping: Option<PartitionMapping>,
}

impl AssetDep {
	pub fn new(asset_key: impl Into<AssetKey>) -> Self {
		Self {
			asset_key: asset_key.into(),
			partition_mapping: None,
		}
	}

	pub fn with_partition_mapping(mut self, mapping: PartitionMapping) -> Self {
		self.partition_mapping = Some(mapping);
		self
	}
}

impl From<AssetKey> for AssetDep {
	fn from(asset_key: AssetKey) -> Self {
		Self::new(asset_key)
	}
}

impl From<&str> for AssetDep {
	fn from(asset_key: &str) -> Self {
		Self::new(asset_key)
	}
}

/// Declaration of a single asset: its key, descriptive data, and upstream edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
	pub key: AssetKey,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub metadata: MetadataMap,
	#[serde(default)]
	pub tags: TagMap,
	#[serde(default)]
	pub deps: Vec<AssetDep>,
	#[serde(default)]
	pub group_name: Option<String>,
}

impl AssetSpec {
	pub fn new(key: impl Into<AssetKey>) -> Self {
		Self {
			key: key.into(),
			description: None,
			metadata: MetadataMap::new(),
			tags: TagMap::new(),
			deps: Vec::new(),
			group_name: None,
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}

	pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn with_dep(mut self, dep: impl Into<AssetDep>) -> Self {
		self.deps.push(dep.into());
		self
	}

	pub fn with_deps<I, D>(mut self, deps: I) -> Self
	where
		I: IntoIterator<Item = D>,
		D: Into<AssetDep>,
	{
		self.deps = deps.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
		self.group_name = Some(group_name.into());
		self
	}

	/// Returns a copy with a different key; every other attribute is kept.
	pub fn replace_key(&self, key: AssetKey) -> Self {
		Self { key, ..self.clone() }
	}

	/// Keys of every upstream dependency, in declaration order.
	pub fn dep_keys(&self) -> impl Iterator<Item = &AssetKey> + '_ {
		self.deps.iter().map(|dep| &dep.asset_key)
	}
}
