//! Persisted records describing one federated Airflow instance.
//!
//! Every record is an immutable value: producers build a new record for every
//! refresh rather than editing one in place.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::trace;
use weir_primitives::{AssetDep, AssetKey, AssetSpec, MetadataMap, TagMap};

use crate::serdes::{FieldSchema, Nesting, RecordSchema, SerdesRecord, empty_array};

// History:
// - v1: created
static ASSET_SPEC_DATA: RecordSchema = RecordSchema {
	name: "SerializedAssetSpecData",
	version: 1,
	fields: &[
		FieldSchema::plain("asset_key"),
		FieldSchema::plain("description"),
		FieldSchema::plain("metadata"),
		FieldSchema::plain("tags"),
		FieldSchema::nested("deps", Nesting::Seq(&ASSET_DEP_DATA)),
	],
	removed_fields: &[],
};

// History:
// - v1: created
static ASSET_DEP_DATA: RecordSchema = RecordSchema {
	name: "SerializedAssetDepData",
	version: 1,
	fields: &[FieldSchema::plain("asset_key")],
	removed_fields: &[],
};

// History:
// - v1: created
static DAG_DATA: RecordSchema = RecordSchema {
	name: "SerializedDagData",
	version: 1,
	fields: &[
		FieldSchema::plain("dag_id"),
		FieldSchema::nested("spec_data", Nesting::Record(&ASSET_SPEC_DATA)),
		FieldSchema::nested("task_handle_data", Nesting::MapValues(&TASK_HANDLE_DATA)),
		FieldSchema::plain("all_asset_keys_in_tasks"),
	],
	removed_fields: &[],
};

// History:
// - v1: created
static TASK_HANDLE_DATA: RecordSchema = RecordSchema {
	name: "SerializedTaskHandleData",
	version: 1,
	fields: &[FieldSchema::plain("migration_state"), FieldSchema::plain("asset_keys_in_task")],
	removed_fields: &[],
};

// History:
// - v1: created
static KEY_SCOPED_DATA: RecordSchema = RecordSchema {
	name: "SerializedAssetKeyScopedAirflowData",
	version: 1,
	fields: &[FieldSchema::plain("additional_metadata"), FieldSchema::plain("additional_tags")],
	removed_fields: &[],
};

// History:
// - v1: created
static KEY_SCOPED_DATA_ITEM: RecordSchema = RecordSchema {
	name: "KeyScopedDataItem",
	version: 1,
	fields: &[
		FieldSchema::plain("asset_key"),
		FieldSchema::nested("data", Nesting::Record(&KEY_SCOPED_DATA)),
	],
	removed_fields: &[],
};

// History:
// - v1: created
// - v2: removed existing_asset_data
// - v2: added key_scoped_data_items
static DEFINITIONS_DATA: RecordSchema = RecordSchema {
	name: "SerializedAirflowDefinitionsData",
	version: 2,
	fields: &[
		FieldSchema::nested("key_scoped_data_items", Nesting::Seq(&KEY_SCOPED_DATA_ITEM)).added_in(2, empty_array),
		FieldSchema::nested("dag_datas", Nesting::MapValues(&DAG_DATA)),
		FieldSchema::plain("asset_key_topological_ordering"),
	],
	removed_fields: &["existing_asset_data"],
};

static ALL_SCHEMAS: [&RecordSchema; 7] = [
	&ASSET_SPEC_DATA,
	&ASSET_DEP_DATA,
	&DAG_DATA,
	&TASK_HANDLE_DATA,
	&KEY_SCOPED_DATA,
	&KEY_SCOPED_DATA_ITEM,
	&DEFINITIONS_DATA,
];

/// Looks up a record schema by its type tag.
pub fn schema_by_name(name: &str) -> Option<&'static RecordSchema> {
	ALL_SCHEMAS.iter().copied().find(|schema| schema.name == name)
}

/// Everything needed to rebuild an [`AssetSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedAssetSpecData {
	pub asset_key: AssetKey,
	pub description: Option<String>,
	pub metadata: MetadataMap,
	pub tags: TagMap,
	pub deps: Vec<SerializedAssetDepData>,
}

impl SerializedAssetSpecData {
	pub fn from_asset_spec(spec: &AssetSpec) -> Self {
		Self {
			asset_key: spec.key.clone(),
			description: spec.description.clone(),
			metadata: spec.metadata.clone(),
			tags: spec.tags.clone(),
			deps: spec.deps.iter().map(SerializedAssetDepData::from_asset_dep).collect(),
		}
	}

	/// See [`crate::merge::reconstruct`].
	pub fn to_asset_spec(&self) -> AssetSpec {
		crate::merge::reconstruct(self)
	}
}

impl SerdesRecord for SerializedAssetSpecData {
	fn schema() -> &'static RecordSchema {
		&ASSET_SPEC_DATA
	}
}

/// A dependency edge reduced to the upstream key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedAssetDepData {
	pub asset_key: AssetKey,
}

impl SerializedAssetDepData {
	/// Drops everything but the key, including any partition mapping.
	pub fn from_asset_dep(dep: &AssetDep) -> Self {
		Self {
			asset_key: dep.asset_key.clone(),
		}
	}
}

impl SerdesRecord for SerializedAssetDepData {
	fn schema() -> &'static RecordSchema {
		&ASSET_DEP_DATA
	}
}

/// Precomputed facts about one Airflow DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDagData {
	pub dag_id: String,
	/// Spec of the asset representing the DAG itself.
	pub spec_data: SerializedAssetSpecData,
	/// Keyed by task handle string.
	pub task_handle_data: BTreeMap<String, SerializedTaskHandleData>,
	/// Union of the keys produced by every task.
	pub all_asset_keys_in_tasks: BTreeSet<AssetKey>,
}

impl SerializedDagData {
	/// Builds the record, deriving `all_asset_keys_in_tasks` from the task data.
	pub fn new(
		dag_id: impl Into<String>,
		spec_data: SerializedAssetSpecData,
		task_handle_data: BTreeMap<String, SerializedTaskHandleData>,
	) -> Self {
		let all_asset_keys_in_tasks = task_handle_data.values().flat_map(|task| task.asset_keys_in_task.iter().cloned()).collect();
		Self {
			dag_id: dag_id.into(),
			spec_data,
			task_handle_data,
			all_asset_keys_in_tasks,
		}
	}

	pub fn contains_asset_key(&self, key: &AssetKey) -> bool {
		self.all_asset_keys_in_tasks.contains(key)
	}

	/// Handles of the tasks producing `key`, in handle order.
	pub fn task_handles_for_key<'a>(&'a self, key: &'a AssetKey) -> impl Iterator<Item = &'a str> + 'a {
		self.task_handle_data
			.iter()
			.filter(move |(_, task)| task.asset_keys_in_task.contains(key))
			.map(|(handle, _)| handle.as_str())
	}
}

impl SerdesRecord for SerializedDagData {
	fn schema() -> &'static RecordSchema {
		&DAG_DATA
	}
}

/// Known facts about one task handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTaskHandleData {
	/// `Some(true)` once the task runs in the federated orchestrator, `None` when unknown.
	pub migration_state: Option<bool>,
	pub asset_keys_in_task: BTreeSet<AssetKey>,
}

impl SerdesRecord for SerializedTaskHandleData {
	fn schema() -> &'static RecordSchema {
		&TASK_HANDLE_DATA
	}
}

/// Metadata and tags fetched from Airflow for one asset key, merged onto the local spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedAssetKeyScopedAirflowData {
	pub additional_metadata: MetadataMap,
	pub additional_tags: TagMap,
}

impl SerializedAssetKeyScopedAirflowData {
	/// See [`crate::merge::apply`].
	pub fn apply_to_spec(&self, spec: &AssetSpec) -> AssetSpec {
		crate::merge::apply(self, spec)
	}
}

impl SerdesRecord for SerializedAssetKeyScopedAirflowData {
	fn schema() -> &'static RecordSchema {
		&KEY_SCOPED_DATA
	}
}

/// One `(asset key, scoped data)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyScopedDataItem {
	pub asset_key: AssetKey,
	pub data: SerializedAssetKeyScopedAirflowData,
}

impl SerdesRecord for KeyScopedDataItem {
	fn schema() -> &'static RecordSchema {
		&KEY_SCOPED_DATA_ITEM
	}
}

/// The persisted cache artifact for one federation endpoint.
///
/// Scoped data is stored as an ordered list of pairs; the keyed view is derived on
/// first use by [`Self::key_scoped_data_map`] and kept for the value's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedAirflowDefinitionsData {
	key_scoped_data_items: Vec<KeyScopedDataItem>,
	dag_datas: BTreeMap<String, SerializedDagData>,
	asset_key_topological_ordering: Vec<AssetKey>,
	#[serde(skip)]
	key_scoped_data_map: OnceLock<BTreeMap<AssetKey, SerializedAssetKeyScopedAirflowData>>,
}

impl SerializedAirflowDefinitionsData {
	/// Assembles the artifact as given. Use [`crate::ordering::DefinitionsDataBuilder`]
	/// to have the ordering computed.
	pub fn new(
		key_scoped_data_items: Vec<KeyScopedDataItem>,
		dag_datas: BTreeMap<String, SerializedDagData>,
		asset_key_topological_ordering: Vec<AssetKey>,
	) -> Self {
		Self {
			key_scoped_data_items,
			dag_datas,
			asset_key_topological_ordering,
			key_scoped_data_map: OnceLock::new(),
		}
	}

	pub fn key_scoped_data_items(&self) -> &[KeyScopedDataItem] {
		&self.key_scoped_data_items
	}

	pub fn dag_datas(&self) -> &BTreeMap<String, SerializedDagData> {
		&self.dag_datas
	}

	pub fn asset_key_topological_ordering(&self) -> &[AssetKey] {
		&self.asset_key_topological_ordering
	}

	/// Scoped data keyed by asset key. Later items win over earlier ones with the same key.
	pub fn key_scoped_data_map(&self) -> &BTreeMap<AssetKey, SerializedAssetKeyScopedAirflowData> {
		self.key_scoped_data_map.get_or_init(|| {
			trace!(items = self.key_scoped_data_items.len(), "deriving key scoped data map");
			self.key_scoped_data_items
				.iter()
				.map(|item| (item.asset_key.clone(), item.data.clone()))
				.collect()
		})
	}

	pub fn key_scoped_data(&self, key: &AssetKey) -> Option<&SerializedAssetKeyScopedAirflowData> {
		self.key_scoped_data_map().get(key)
	}

	/// Every DAG whose tasks produce `key`.
	pub fn dags_containing<'a>(&'a self, key: &'a AssetKey) -> impl Iterator<Item = &'a SerializedDagData> + 'a {
		self.dag_datas.values().filter(move |dag| dag.contains_asset_key(key))
	}

	/// Dependency edges recorded in the artifact: each DAG asset to its upstream keys.
	pub fn dependency_edges(&self) -> BTreeMap<AssetKey, BTreeSet<AssetKey>> {
		let mut edges: BTreeMap<AssetKey, BTreeSet<AssetKey>> = BTreeMap::new();
		for dag in self.dag_datas.values() {
			edges
				.entry(dag.spec_data.asset_key.clone())
				.or_default()
				.extend(dag.spec_data.deps.iter().map(|dep| dep.asset_key.clone()));
		}
		edges
	}
}

impl PartialEq for SerializedAirflowDefinitionsData {
	fn eq(&self, other: &Self) -> bool {
		self.key_scoped_data_items == other.key_scoped_data_items
			&& self.dag_datas == other.dag_datas
			&& self.asset_key_topological_ordering == other.asset_key_topological_ordering
	}
}

impl SerdesRecord for SerializedAirflowDefinitionsData {
	fn schema() -> &'static RecordSchema {
		&DEFINITIONS_DATA
	}
}

#[cfg(test)]
mod tests;
