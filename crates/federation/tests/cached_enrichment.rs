//! Fetch, persist, reload and merge, the way a definitions load uses the cache.

use std::collections::BTreeMap;

use serde_json::json;
use weir_federation::{
	BoxError, CacheState, DefinitionsDataBuilder, EndpointCache, FetchOutcome, FsCacheStore, RemoteFetcher,
	SerializedAirflowDefinitionsData, SerializedAssetKeyScopedAirflowData, SerializedAssetSpecData, SerializedDagData,
	SerializedTaskHandleData, enrich_specs,
};
use weir_primitives::{AssetKey, AssetSpec};

struct StaticFetcher;

impl RemoteFetcher for StaticFetcher {
	fn fetch(&self, endpoint: &str, _previous: Option<&SerializedAirflowDefinitionsData>) -> Result<FetchOutcome, BoxError> {
		let orders = AssetSpec::new("orders").with_dep("raw_orders");
		let dag_spec = AssetSpec::new(AssetKey::new(["airflow", endpoint, "dag", "etl"])).with_dep("orders");

		let mut builder = DefinitionsDataBuilder::new();
		builder
			.add_asset_spec(&orders)
			.add_dag(SerializedDagData::new(
				"etl",
				SerializedAssetSpecData::from_asset_spec(&dag_spec),
				BTreeMap::from([(
					"etl/load_orders".to_string(),
					SerializedTaskHandleData {
						migration_state: Some(false),
						asset_keys_in_task: [AssetKey::from("orders")].into(),
					},
				)]),
			))
			.add_key_scoped_data(
				AssetKey::from("orders"),
				SerializedAssetKeyScopedAirflowData {
					additional_metadata: [("airflow/dag_id".to_string(), json!("etl"))].into(),
					additional_tags: [("airlift/dag".to_string(), "etl".to_string())].into(),
				},
			);
		Ok(FetchOutcome::Updated(builder.build()?))
	}
}

#[test]
fn fetched_data_survives_a_restart_and_enriches_specs() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prod.json");

	let first_process = EndpointCache::new("prod", Box::new(FsCacheStore::new(&path))).with_fetcher(Box::new(StaticFetcher));
	let fetched = first_process.load_or_refresh().unwrap();
	assert_eq!(first_process.state(), CacheState::Cached);
	fetched.verify_topological_ordering().unwrap();

	let second_process = EndpointCache::new("prod", Box::new(FsCacheStore::new(&path)));
	let reloaded = second_process.load_or_refresh().unwrap();
	assert_eq!(*reloaded, *fetched);

	let local = vec![AssetSpec::new("orders").with_metadata("owner", "analytics"), AssetSpec::new("customers")];
	let enriched = enrich_specs(&reloaded, local);
	assert_eq!(enriched[0].metadata["owner"], json!("analytics"));
	assert_eq!(enriched[0].metadata["airflow/dag_id"], json!("etl"));
	assert_eq!(enriched[0].tags["airlift/dag"], "etl");
	assert!(enriched[1].metadata.is_empty());

	let dag = &reloaded.dag_datas()["etl"];
	assert!(dag.contains_asset_key(&AssetKey::from("orders")));
	let dag_asset = dag.spec_data.to_asset_spec();
	assert_eq!(dag_asset.key.to_string(), "airflow/prod/dag/etl");
	assert_eq!(dag_asset.dep_keys().cloned().collect::<Vec<_>>(), vec![AssetKey::from("orders")]);

	let ordering = reloaded.asset_key_topological_ordering();
	let position = |key: &AssetKey| ordering.iter().position(|k| k == key).unwrap();
	assert!(position(&AssetKey::from("raw_orders")) < position(&AssetKey::from("orders")));
	assert!(position(&AssetKey::from("orders")) < position(&dag_asset.key));
}
