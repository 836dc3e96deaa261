use std::collections::{BTreeMap, BTreeSet};

use pretty_assertions::assert_eq;
use serde_json::json;
use weir_primitives::{AssetDep, AssetKey, AssetSpec, PartitionMapping};

use super::*;
use crate::serdes::{deserialize_value, record_type, serialize_value};

fn key(path: &str) -> AssetKey {
	AssetKey::from_user_string(path).unwrap()
}

fn full_spec_data() -> SerializedAssetSpecData {
	SerializedAssetSpecData {
		asset_key: key("airflow/dag/orders"),
		description: Some("Orders DAG".to_string()),
		metadata: [("owner".to_string(), json!("data-eng")), ("retries".to_string(), json!(3))].into(),
		tags: [("dagster/kind/airflow".to_string(), String::new())].into(),
		deps: vec![SerializedAssetDepData { asset_key: key("raw") }, SerializedAssetDepData { asset_key: key("stage") }],
	}
}

fn minimal_spec_data() -> SerializedAssetSpecData {
	SerializedAssetSpecData {
		asset_key: key("a"),
		description: None,
		metadata: MetadataMap::new(),
		tags: TagMap::new(),
		deps: Vec::new(),
	}
}

fn task(migrated: Option<bool>, keys: &[&str]) -> SerializedTaskHandleData {
	SerializedTaskHandleData {
		migration_state: migrated,
		asset_keys_in_task: keys.iter().map(|k| key(k)).collect(),
	}
}

fn full_dag() -> SerializedDagData {
	SerializedDagData::new(
		"orders",
		full_spec_data(),
		[
			("orders/extract".to_string(), task(Some(true), &["raw"])),
			("orders/load".to_string(), task(None, &["stage", "raw"])),
			("orders/noop".to_string(), task(Some(false), &[])),
		]
		.into(),
	)
}

fn full_definitions() -> SerializedAirflowDefinitionsData {
	SerializedAirflowDefinitionsData::new(
		vec![
			KeyScopedDataItem {
				asset_key: key("raw"),
				data: SerializedAssetKeyScopedAirflowData {
					additional_metadata: [("dag_id".to_string(), json!("orders"))].into(),
					additional_tags: [("airlift/task".to_string(), "extract".to_string())].into(),
				},
			},
			KeyScopedDataItem {
				asset_key: key("stage"),
				data: SerializedAssetKeyScopedAirflowData::default(),
			},
		],
		[("orders".to_string(), full_dag())].into(),
		vec![key("raw"), key("stage"), key("airflow/dag/orders")],
	)
}

fn round_trip<T: SerdesRecord + PartialEq + std::fmt::Debug>(record: &T) {
	let encoded = serialize_value(record).unwrap();
	let decoded: T = deserialize_value(encoded.clone()).unwrap();
	assert_eq!(&decoded, record);
	assert_eq!(serialize_value(&decoded).unwrap(), encoded);
}

#[test]
fn every_record_round_trips_minimal_and_full() {
	round_trip(&minimal_spec_data());
	round_trip(&full_spec_data());
	round_trip(&SerializedAssetDepData { asset_key: key("a") });
	round_trip(&task(None, &[]));
	round_trip(&task(Some(true), &["a", "b/c"]));
	round_trip(&SerializedDagData::new("empty", minimal_spec_data(), BTreeMap::new()));
	round_trip(&full_dag());
	round_trip(&SerializedAssetKeyScopedAirflowData::default());
	round_trip(&full_definitions().key_scoped_data_items()[0].clone());
	round_trip(&SerializedAirflowDefinitionsData::new(Vec::new(), BTreeMap::new(), Vec::new()));
	round_trip(&full_definitions());
}

#[test]
fn v1_definitions_payload_decodes_with_defaults() {
	let dag = serialize_value(&full_dag()).unwrap();
	let payload = json!({
		"__class__": "SerializedAirflowDefinitionsData",
		"__version__": 1,
		"fields": {
			"existing_asset_data": {"raw": {"whatever": true}},
			"dag_datas": {"orders": dag},
			"asset_key_topological_ordering": [["raw"], ["stage"], ["airflow", "dag", "orders"]]
		}
	});
	let decoded: SerializedAirflowDefinitionsData = deserialize_value(payload).unwrap();
	assert!(decoded.key_scoped_data_items().is_empty());
	assert!(decoded.key_scoped_data_map().is_empty());
	assert_eq!(decoded.dag_datas()["orders"], full_dag());
	assert_eq!(decoded.asset_key_topological_ordering().len(), 3);

	let upgraded = serialize_value(&decoded).unwrap();
	assert_eq!(upgraded["__version__"], json!(2));
	assert!(upgraded["fields"].get("existing_asset_data").is_none());
}

#[test]
fn dag_values_are_enveloped_inside_the_map() {
	let value = serialize_value(&full_definitions()).unwrap();
	let dag = &value["fields"]["dag_datas"]["orders"];
	assert_eq!(record_type(dag), Some("SerializedDagData"));
	assert_eq!(record_type(&dag["fields"]["spec_data"]), Some("SerializedAssetSpecData"));
	assert_eq!(
		record_type(&dag["fields"]["task_handle_data"]["orders/extract"]),
		Some("SerializedTaskHandleData")
	);
	assert_eq!(record_type(&dag["fields"]["spec_data"]["fields"]["deps"][0]), Some("SerializedAssetDepData"));
	assert_eq!(dag["fields"]["task_handle_data"]["orders/load"]["fields"]["migration_state"], json!(null));
}

#[test]
fn key_scoped_map_is_derived_once_and_last_item_wins() {
	let data = SerializedAirflowDefinitionsData::new(
		vec![
			KeyScopedDataItem {
				asset_key: key("a"),
				data: SerializedAssetKeyScopedAirflowData {
					additional_tags: [("v".to_string(), "1".to_string())].into(),
					..Default::default()
				},
			},
			KeyScopedDataItem {
				asset_key: key("a"),
				data: SerializedAssetKeyScopedAirflowData {
					additional_tags: [("v".to_string(), "2".to_string())].into(),
					..Default::default()
				},
			},
		],
		BTreeMap::new(),
		vec![key("a")],
	);
	let first = data.key_scoped_data_map() as *const _;
	let second = data.key_scoped_data_map() as *const _;
	assert_eq!(first, second);
	assert_eq!(data.key_scoped_data(&key("a")).unwrap().additional_tags["v"], "2");
	assert!(data.key_scoped_data(&key("b")).is_none());
}

#[test]
fn key_scoped_map_is_safe_under_concurrent_first_access() {
	let data = full_definitions();
	std::thread::scope(|scope| {
		let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| data.key_scoped_data_map().len())).collect();
		for handle in handles {
			assert_eq!(handle.join().unwrap(), 2);
		}
	});
}

#[test]
fn equality_ignores_the_memo() {
	let warmed = full_definitions();
	warmed.key_scoped_data_map();
	assert_eq!(warmed, full_definitions());
	assert_eq!(warmed.clone(), warmed);
}

#[test]
fn dag_helpers_answer_membership() {
	let dag = full_dag();
	assert_eq!(dag.all_asset_keys_in_tasks, BTreeSet::from([key("raw"), key("stage")]));
	assert!(dag.contains_asset_key(&key("raw")));
	assert!(!dag.contains_asset_key(&key("airflow/dag/orders")));
	let raw = key("raw");
	assert_eq!(dag.task_handles_for_key(&raw).collect::<Vec<_>>(), vec!["orders/extract", "orders/load"]);

	let defs = full_definitions();
	let stage = key("stage");
	assert_eq!(defs.dags_containing(&stage).map(|dag| dag.dag_id.as_str()).collect::<Vec<_>>(), vec!["orders"]);
}

#[test]
fn dependency_edges_come_from_dag_specs() {
	let edges = full_definitions().dependency_edges();
	assert_eq!(edges.len(), 1);
	assert_eq!(edges[&key("airflow/dag/orders")], BTreeSet::from([key("raw"), key("stage")]));
}

#[test]
fn spec_data_keeps_only_dependency_keys() {
	let spec = AssetSpec::new("down").with_dep(AssetDep::new("up").with_partition_mapping(PartitionMapping::LastPartition));
	let data = SerializedAssetSpecData::from_asset_spec(&spec);
	assert_eq!(data.deps, vec![SerializedAssetDepData { asset_key: key("up") }]);
	let rebuilt = data.to_asset_spec();
	assert_eq!(rebuilt.deps, vec![AssetDep::new("up")]);
	assert_eq!(rebuilt.deps[0].partition_mapping, None);
}

#[test]
fn schemas_are_found_by_tag() {
	assert_eq!(schema_by_name("SerializedAirflowDefinitionsData").map(|s| s.version), Some(2));
	assert_eq!(schema_by_name("KeyScopedDataItem").map(|s| s.version), Some(1));
	assert!(schema_by_name("AssetSpec").is_none());
}
