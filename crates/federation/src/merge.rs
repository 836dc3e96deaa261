//! Rebuilding and enriching asset specs from cached records.

use weir_primitives::{AssetDep, AssetSpec, merge_maps};

use crate::records::{SerializedAirflowDefinitionsData, SerializedAssetKeyScopedAirflowData, SerializedAssetSpecData};

/// Builds a full spec from cached spec data.
///
/// Dependencies come back as bare keys: anything else the original edges carried,
/// such as a partition mapping, was never persisted.
pub fn reconstruct(data: &SerializedAssetSpecData) -> AssetSpec {
	AssetSpec {
		key: data.asset_key.clone(),
		description: data.description.clone(),
		metadata: data.metadata.clone(),
		tags: data.tags.clone(),
		deps: data.deps.iter().map(|dep| AssetDep::new(dep.asset_key.clone())).collect(),
		group_name: None,
	}
}

/// Merges fetched metadata and tags onto `base`.
///
/// Keys only in `base` are kept and fetched values win on conflict. Everything
/// else about `base` is carried over untouched.
pub fn apply(scoped: &SerializedAssetKeyScopedAirflowData, base: &AssetSpec) -> AssetSpec {
	AssetSpec {
		metadata: merge_maps(&base.metadata, &scoped.additional_metadata),
		tags: merge_maps(&base.tags, &scoped.additional_tags),
		..base.clone()
	}
}

/// Applies the cached scoped data for each spec's key, passing other specs through.
pub fn enrich_specs<I>(data: &SerializedAirflowDefinitionsData, specs: I) -> Vec<AssetSpec>
where
	I: IntoIterator<Item = AssetSpec>,
{
	let mut enriched = 0usize;
	let out: Vec<AssetSpec> = specs
		.into_iter()
		.map(|spec| match data.key_scoped_data(&spec.key) {
			Some(scoped) => {
				enriched += 1;
				apply(scoped, &spec)
			}
			None => spec,
		})
		.collect();
	tracing::debug!(enriched, total = out.len(), "applied cached airflow data to specs");
	out
}
