//! Topological ordering of asset keys.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use weir_primitives::{AssetKey, AssetSpec};

use crate::error::OrderingError;
use crate::records::{
	KeyScopedDataItem, SerializedAirflowDefinitionsData, SerializedAssetKeyScopedAirflowData, SerializedDagData,
};

/// Orders every key mentioned in `edges` so that dependencies precede dependents.
///
/// `edges` maps each key to its upstream keys; upstream keys need no entry of their
/// own. Among keys that are ready at the same time the smallest comes first, so the
/// result is fully determined by the edges.
pub fn topological_ordering(edges: &BTreeMap<AssetKey, BTreeSet<AssetKey>>) -> Result<Vec<AssetKey>, OrderingError> {
	let mut pending: BTreeMap<&AssetKey, usize> = BTreeMap::new();
	let mut dependents: BTreeMap<&AssetKey, Vec<&AssetKey>> = BTreeMap::new();
	for (key, deps) in edges {
		pending.entry(key).or_insert(0);
		for dep in deps {
			if dep == key {
				return Err(OrderingError::Cycle(vec![key.clone()]));
			}
			pending.entry(dep).or_insert(0);
			*pending.entry(key).or_insert(0) += 1;
			dependents.entry(dep).or_default().push(key);
		}
	}

	let mut ready: BTreeSet<&AssetKey> = pending.iter().filter(|(_, n)| **n == 0).map(|(k, _)| *k).collect();
	let mut ordering = Vec::with_capacity(pending.len());
	while let Some(key) = ready.pop_first() {
		ordering.push(key.clone());
		for dependent in dependents.get(&key).into_iter().flatten() {
			if let Some(count) = pending.get_mut(dependent) {
				*count -= 1;
				if *count == 0 {
					ready.insert(*dependent);
				}
			}
		}
	}

	if ordering.len() < pending.len() {
		let placed: BTreeSet<&AssetKey> = ordering.iter().collect();
		let cycle = pending.keys().filter(|key| !placed.contains(*key)).map(|key| (*key).clone()).collect();
		return Err(OrderingError::Cycle(cycle));
	}
	Ok(ordering)
}

/// Checks that every key with dependencies is ordered after each of them.
///
/// Dependencies absent from `ordering` are outside the artifact and ignored. Each key
/// may appear at most once.
pub fn verify_ordering(ordering: &[AssetKey], edges: &BTreeMap<AssetKey, BTreeSet<AssetKey>>) -> Result<(), OrderingError> {
	let mut position: BTreeMap<&AssetKey, usize> = BTreeMap::new();
	for (i, key) in ordering.iter().enumerate() {
		if position.insert(key, i).is_some() {
			return Err(OrderingError::DuplicateKey(key.clone()));
		}
	}
	for (key, deps) in edges {
		let Some(&at) = position.get(key) else {
			return Err(OrderingError::MissingKey(key.clone()));
		};
		for dep in deps {
			if position.get(dep).is_some_and(|&dep_at| dep_at >= at) {
				return Err(OrderingError::DependencyAfterDependent {
					key: key.clone(),
					dependency: dep.clone(),
				});
			}
		}
	}
	Ok(())
}

impl SerializedAirflowDefinitionsData {
	/// Checks the stored ordering against the dependency edges stored alongside it.
	pub fn verify_topological_ordering(&self) -> Result<(), OrderingError> {
		verify_ordering(self.asset_key_topological_ordering(), &self.dependency_edges())
	}
}

/// Assembles a [`SerializedAirflowDefinitionsData`], computing its ordering once.
#[derive(Debug, Default)]
pub struct DefinitionsDataBuilder {
	edges: BTreeMap<AssetKey, BTreeSet<AssetKey>>,
	items: Vec<KeyScopedDataItem>,
	dags: BTreeMap<String, SerializedDagData>,
}

impl DefinitionsDataBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	fn add_edges<'a>(&mut self, key: &AssetKey, deps: impl IntoIterator<Item = &'a AssetKey>) {
		self.edges.entry(key.clone()).or_default().extend(deps.into_iter().cloned());
	}

	/// Contributes a spec's key and dependency edges to the ordering.
	pub fn add_asset_spec(&mut self, spec: &AssetSpec) -> &mut Self {
		self.add_edges(&spec.key, spec.dep_keys());
		self
	}

	/// Adds a DAG. Its own asset and every key its tasks produce join the ordering.
	pub fn add_dag(&mut self, dag: SerializedDagData) -> &mut Self {
		self.add_edges(&dag.spec_data.asset_key, dag.spec_data.deps.iter().map(|dep| &dep.asset_key));
		for key in &dag.all_asset_keys_in_tasks {
			self.edges.entry(key.clone()).or_default();
		}
		self.dags.insert(dag.dag_id.clone(), dag);
		self
	}

	pub fn add_key_scoped_data(&mut self, key: AssetKey, data: SerializedAssetKeyScopedAirflowData) -> &mut Self {
		self.edges.entry(key.clone()).or_default();
		self.items.push(KeyScopedDataItem { asset_key: key, data });
		self
	}

	pub fn build(self) -> Result<SerializedAirflowDefinitionsData, OrderingError> {
		let ordering = topological_ordering(&self.edges)?;
		debug!(keys = ordering.len(), dags = self.dags.len(), "built airflow definitions data");
		Ok(SerializedAirflowDefinitionsData::new(self.items, self.dags, ordering))
	}
}
