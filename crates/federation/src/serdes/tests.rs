use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use weir_primitives::AssetKey;

use super::*;
use crate::records::{
	KeyScopedDataItem, SerializedAirflowDefinitionsData, SerializedAssetDepData, SerializedAssetKeyScopedAirflowData,
};

#[test]
fn envelope_carries_tag_version_and_named_fields() {
	let dep = SerializedAssetDepData {
		asset_key: AssetKey::new(["raw", "orders"]),
	};
	assert_eq!(
		serialize_value(&dep).unwrap(),
		json!({
			"__class__": "SerializedAssetDepData",
			"__version__": 1,
			"fields": {"asset_key": ["raw", "orders"]}
		})
	);
}

#[test]
fn nested_records_are_enveloped() {
	let item = KeyScopedDataItem {
		asset_key: AssetKey::from("a"),
		data: SerializedAssetKeyScopedAirflowData::default(),
	};
	let value = serialize_value(&item).unwrap();
	assert_eq!(record_type(&value["fields"]["data"]), Some("SerializedAssetKeyScopedAirflowData"));
	assert_eq!(value["fields"]["data"]["fields"]["additional_tags"], json!({}));
}

#[test]
fn string_helpers_round_trip() {
	let dep = SerializedAssetDepData {
		asset_key: AssetKey::from("a"),
	};
	let text = serialize_to_string(&dep).unwrap();
	assert_eq!(deserialize_from_str::<SerializedAssetDepData>(&text).unwrap(), dep);
	let pretty = serialize_to_string_pretty(&dep).unwrap();
	assert!(pretty.contains('\n'));
	assert_eq!(deserialize_from_str::<SerializedAssetDepData>(&pretty).unwrap(), dep);
}

fn decode<T: SerdesRecord>(payload: Value) -> Result<(), SerdesError> {
	deserialize_value::<T>(payload).map(drop)
}

#[rstest]
#[case::newer_version(
	json!({"__class__": "SerializedAssetDepData", "__version__": 2, "fields": {"asset_key": ["a"]}}),
	decode::<SerializedAssetDepData>,
	"SerializedAssetDepData payload has schema version 2, but the newest supported version is 1"
)]
#[case::other_known_record(
	json!({"__class__": "SerializedAssetDepData", "__version__": 1, "fields": {"asset_key": ["a"]}}),
	decode::<SerializedAirflowDefinitionsData>,
	"expected a SerializedAirflowDefinitionsData record, found SerializedAssetDepData"
)]
#[case::unknown_tag(
	json!({"__class__": "Mystery", "__version__": 1, "fields": {}}),
	decode::<SerializedAssetDepData>,
	"unknown record type \"Mystery\""
)]
#[case::missing_field(
	json!({"__class__": "SerializedAssetKeyScopedAirflowData", "__version__": 1, "fields": {"additional_metadata": {}}}),
	decode::<SerializedAssetKeyScopedAirflowData>,
	"SerializedAssetKeyScopedAirflowData payload is missing field \"additional_tags\""
)]
fn decode_errors(#[case] payload: Value, #[case] decoder: fn(Value) -> Result<(), SerdesError>, #[case] expected: &'static str) {
	let err = decoder(payload).unwrap_err();
	assert_eq!(err.to_string(), expected);
}

#[test]
fn version_errors_keep_their_fields() {
	let payload = json!({"__class__": "SerializedAssetDepData", "__version__": 2, "fields": {"asset_key": ["a"]}});
	let err = deserialize_value::<SerializedAssetDepData>(payload).unwrap_err();
	assert!(matches!(
		err,
		SerdesError::SchemaVersion {
			record: "SerializedAssetDepData",
			found: 2,
			supported: 1
		}
	));
}

#[test]
fn newer_nested_versions_are_rejected() {
	let payload = json!({
		"__class__": "KeyScopedDataItem",
		"__version__": 1,
		"fields": {
			"asset_key": ["a"],
			"data": {
				"__class__": "SerializedAssetKeyScopedAirflowData",
				"__version__": 7,
				"fields": {"additional_metadata": {}, "additional_tags": {}}
			}
		}
	});
	let err = deserialize_value::<KeyScopedDataItem>(payload).unwrap_err();
	assert!(matches!(err, SerdesError::SchemaVersion { found: 7, .. }));
}

#[test]
fn fields_introduced_at_the_payload_version_are_required() {
	let payload = json!({
		"__class__": "SerializedAirflowDefinitionsData",
		"__version__": 2,
		"fields": {"dag_datas": {}, "asset_key_topological_ordering": []}
	});
	let err = deserialize_value::<SerializedAirflowDefinitionsData>(payload).unwrap_err();
	assert!(matches!(
		err,
		SerdesError::MissingField {
			field: "key_scoped_data_items",
			..
		}
	));
}

#[test]
fn unexpected_fields_are_malformed() {
	let payload = json!({
		"__class__": "SerializedAssetDepData",
		"__version__": 1,
		"fields": {"asset_key": ["a"], "partition_mapping": null}
	});
	let err = deserialize_value::<SerializedAssetDepData>(payload).unwrap_err();
	assert!(matches!(err, SerdesError::Malformed { ref reason, .. } if reason.contains("partition_mapping")));
}

#[test]
fn envelope_shape_is_checked() {
	for payload in [
		json!(["not", "an", "object"]),
		json!({"__version__": 1, "fields": {}}),
		json!({"__class__": "SerializedAssetDepData", "fields": {}}),
		json!({"__class__": "SerializedAssetDepData", "__version__": 0, "fields": {}}),
		json!({"__class__": "SerializedAssetDepData", "__version__": 1}),
	] {
		let err = deserialize_value::<SerializedAssetDepData>(payload).unwrap_err();
		assert!(matches!(err, SerdesError::Malformed { .. }), "unexpected error: {err}");
	}
}

#[test]
fn invalid_json_is_reported() {
	let err = deserialize_from_str::<SerializedAssetDepData>("{not json").unwrap_err();
	assert!(matches!(err, SerdesError::Json(_)));
}

#[test]
fn field_schema_defaults() {
	let field = FieldSchema::plain("x");
	assert_eq!(field.added_in, 1);
	assert!(field.default.is_none());
	let field = field.added_in(3, empty_object);
	assert_eq!(field.added_in, 3);
	assert_eq!(field.default.map(|default| default()), Some(json!({})));
}
