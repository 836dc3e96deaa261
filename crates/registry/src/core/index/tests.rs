use pretty_assertions::assert_eq;
use rstest::rstest;
use weir_primitives::{AssetCheckKey, AssetKey, AssetSpec};

use super::*;
use crate::core::{
	AssetCheckDef, AssetsDef, CacheableAssets, CollisionKey, DefRef, JobDef, ObjectKind, ObjectKinds, ScheduleDef, SensorDef,
	SourceAsset,
};
use crate::module::{Module, ModuleBuilder};

fn asset(key: &str) -> DefRef {
	DefRef::new(AssetSpec::new(key))
}

fn schedule(name: &str) -> DefRef {
	DefRef::new(ScheduleDef::new(name, "@daily"))
}

fn sensor(name: &str) -> DefRef {
	DefRef::new(SensorDef::new(name))
}

fn job(name: &str) -> DefRef {
	DefRef::new(JobDef::new(name))
}

fn check(asset_key: &str, name: &str) -> DefRef {
	DefRef::new(AssetCheckDef::new(asset_key, name))
}

fn asset_key(key: &str) -> CollisionKey {
	CollisionKey::Asset(AssetKey::from(key))
}

fn name(name: &str) -> CollisionKey {
	CollisionKey::Name(name.to_string())
}

fn two_names(def: DefRef) -> Vec<(&'static str, DefRef)> {
	vec![("foo", def.clone()), ("bar", def)]
}

fn module(name: &str, bindings: Vec<(&str, DefRef)>) -> Module {
	let mut b = ModuleBuilder::new(name);
	for (attr, def) in bindings {
		b.bind(attr, def);
	}
	b.build()
}

#[rstest]
#[case::single_asset(vec![("foo", asset("a"))], None)]
#[case::conflicting_assets(vec![("foo", asset("a")), ("bar", asset("a"))], Some((ObjectKind::Asset, asset_key("a"))))]
#[case::asset_bound_twice(two_names(asset("a")), None)]
#[case::single_schedule(vec![("foo", schedule("s1"))], None)]
#[case::conflicting_schedules(vec![("foo", schedule("s1")), ("bar", schedule("s1"))], Some((ObjectKind::Schedule, name("s1"))))]
#[case::schedule_bound_twice(two_names(schedule("s1")), None)]
#[case::single_sensor(vec![("foo", sensor("watch"))], None)]
#[case::conflicting_sensors(vec![("foo", sensor("watch")), ("bar", sensor("watch"))], Some((ObjectKind::Sensor, name("watch"))))]
#[case::sensor_bound_twice(two_names(sensor("watch")), None)]
#[case::single_job(vec![("foo", job("etl"))], None)]
#[case::conflicting_jobs(vec![("foo", job("etl")), ("bar", job("etl"))], Some((ObjectKind::Job, name("etl"))))]
#[case::job_bound_twice(two_names(job("etl")), None)]
#[case::jobs_with_different_names(vec![("foo", job("etl")), ("bar", job("backfill"))], None)]
#[case::single_check(vec![("foo", check("a", "not_null"))], None)]
#[case::checks_sharing_a_key(vec![("foo", check("a", "not_null")), ("bar", check("a", "not_null"))], None)]
#[case::check_bound_twice(two_names(check("a", "not_null")), None)]
#[case::source_and_spec_share_key(
	vec![("foo", asset("raw")), ("bar", DefRef::new(SourceAsset::new("raw")))],
	Some((ObjectKind::Asset, asset_key("raw")))
)]
fn collision_matrix(#[case] bindings: Vec<(&'static str, DefRef)>, #[case] expected: Option<(ObjectKind, CollisionKey)>) {
	let scope = ModuleScopedObjects::from_modules([module("defs", bindings)]);
	let result = scope.get_object_list();
	match expected {
		None => {
			let list = result.unwrap();
			assert_eq!(list.len(), scope.distinct_objects().len());
		}
		Some((kind, key)) => {
			let err = result.unwrap_err();
			assert_eq!(err.kind(), kind);
			assert_eq!(err.key(), &key);
			assert_eq!(err.first.identities, 2);
			assert_eq!(err.first.bindings, vec!["defs.bar".to_string(), "defs.foo".to_string()]);
			assert!(err.others.is_empty());
		}
	}
}

#[test]
fn same_object_under_two_names_is_not_a_collision() {
	let foo = schedule("s1");
	let scope = ModuleScopedObjects::from_modules([module("m", vec![("foo", foo.clone()), ("bar", foo.clone())])]);

	let buckets = scope.buckets();
	let bucket = &buckets.schedules["s1"];
	assert_eq!(bucket.identities(), 1);
	assert_eq!(bucket.sites_of(&foo).map(|sites| sites.len()), Some(2));

	let list = scope.get_object_list().unwrap();
	assert_eq!(list.schedules().count(), 1);
	assert!(list.loaded_objects()[0].ptr_eq(&foo));
}

#[test]
fn equal_fields_are_still_distinct_identities() {
	let scope =
		ModuleScopedObjects::from_modules([module("m", vec![("foo", schedule("s1")), ("bar", schedule("s1"))])]);
	let err = scope.get_object_list().unwrap_err();
	assert_eq!(err.kind(), ObjectKind::Schedule);
	assert_eq!(err.key(), &name("s1"));
	assert!(err.to_string().contains("\"s1\""));
}

#[test]
fn aliases_across_modules_collapse() {
	let shared = asset("orders");
	let first = module("pkg.a", vec![("orders", shared.clone())]);
	let second = module("pkg.b", vec![("orders_alias", shared.clone())]);
	let scope = ModuleScopedObjects::from_modules([&first, &second]);

	assert_eq!(scope.bindings().len(), 2);
	assert_eq!(scope.distinct_objects(), vec![shared]);
	assert!(scope.get_object_list().is_ok());
}

#[test]
fn multi_asset_definition_buckets_every_key() {
	let multi = DefRef::new(AssetsDef::multi("op", vec![AssetSpec::new("a"), AssetSpec::new("b")]));
	let clash = asset("b");
	let scope = ModuleScopedObjects::from_modules([module("m", vec![("multi", multi.clone()), ("clash", clash)])]);

	let buckets = scope.buckets();
	assert!(buckets.assets[&AssetKey::from("a")].contains(&multi));
	assert!(buckets.assets[&AssetKey::from("b")].contains(&multi));

	let err = scope.get_object_list().unwrap_err();
	assert_eq!(err.key(), &asset_key("b"));
}

#[test]
fn list_elements_are_bucketed_individually() {
	let mut b = ModuleBuilder::new("m");
	b.bind_list("assets", [asset("a"), asset("b"), asset("a")]);
	let scope = ModuleScopedObjects::from_modules([b.build()]);

	let err = scope.get_object_list().unwrap_err();
	assert_eq!(err.key(), &asset_key("a"));
	assert_eq!(err.first.bindings, vec!["m.assets[0]".to_string(), "m.assets[2]".to_string()]);
}

#[test]
fn cacheable_assets_are_unkeyed() {
	let first = DefRef::new(CacheableAssets {
		unique_id: "dbt".to_string(),
	});
	let second = DefRef::new(CacheableAssets {
		unique_id: "dbt".to_string(),
	});
	let scope = ModuleScopedObjects::from_modules([module("m", vec![("a", first), ("b", second)])]);

	let buckets = scope.buckets();
	assert!(buckets.assets.is_empty());
	assert_eq!(buckets.unkeyed.identities(), 2);
	assert_eq!(scope.get_object_list().unwrap().assets().count(), 2);
}

#[test]
fn checks_are_bucketed_by_check_key() {
	let scope = ModuleScopedObjects::from_modules([module(
		"m",
		vec![("c1", check("a", "fresh")), ("c2", check("a", "fresh")), ("c3", check("a", "unique"))],
	)]);
	let buckets = scope.buckets();
	assert_eq!(buckets.checks[&AssetCheckKey::new("a", "fresh")].identities(), 2);
	assert_eq!(buckets.checks[&AssetCheckKey::new("a", "unique")].identities(), 1);
	assert!(collisions(&buckets).is_empty());
}

#[test]
fn buckets_do_not_depend_on_module_order() {
	let shared = job("etl");
	let a = module("a", vec![("x", asset("k")), ("job", shared.clone())]);
	let b = module("b", vec![("y", schedule("daily")), ("job", shared)]);

	let forward = ModuleScopedObjects::from_modules([&a, &b]);
	let backward = ModuleScopedObjects::from_modules([&b, &a]);
	assert_eq!(forward.buckets(), backward.buckets());
	assert_eq!(forward.distinct_objects(), backward.distinct_objects());
}

#[test]
fn rescanning_is_idempotent() {
	let m = module("m", vec![("x", asset("k")), ("y", sensor("s"))]);
	let once = ModuleScopedObjects::from_modules([&m]);
	let twice = ModuleScopedObjects::from_modules([&m, &m]);
	assert_eq!(once.distinct_objects(), twice.distinct_objects());
	assert_eq!(twice.buckets().assets[&AssetKey::from("k")].identities(), 1);
}

#[test]
fn every_collision_is_reported_in_kind_then_key_order() {
	let scope = ModuleScopedObjects::from_modules([module(
		"m",
		vec![
			("j1", job("zeta")),
			("j2", job("zeta")),
			("s1", schedule("alpha")),
			("s2", schedule("alpha")),
			("a1", asset("b")),
			("a2", asset("b")),
			("a3", asset("a")),
			("a4", asset("a")),
		],
	)]);
	let err = scope.get_object_list().unwrap_err();
	let order: Vec<(ObjectKind, CollisionKey)> = err.all().map(|c| (c.kind, c.key.clone())).collect();
	assert_eq!(
		order,
		vec![
			(ObjectKind::Asset, asset_key("a")),
			(ObjectKind::Asset, asset_key("b")),
			(ObjectKind::Schedule, name("alpha")),
			(ObjectKind::Job, name("zeta")),
		]
	);
	assert!(err.to_string().ends_with("(and 3 more collisions)"));
}

#[test]
fn kind_filter_limits_what_is_indexed() {
	let m = module("m", vec![("a", asset("k")), ("b", asset("k")), ("s", schedule("daily"))]);
	let scope = ModuleScopedObjects::from_modules_of_types([&m], ObjectKinds::SCHEDULE);
	let list = scope.get_object_list().unwrap();
	assert_eq!(list.len(), 1);
	assert_eq!(list.schedules().next().map(|s| s.name.as_str()), Some("daily"));
}

#[test]
fn asset_keys_are_reported_by_path_components() {
	let slashed = DefRef::new(AssetSpec::new(AssetKey::new(["a/b"])));
	let nested = DefRef::new(AssetSpec::new(AssetKey::new(["a", "b"])));
	let scope = ModuleScopedObjects::from_modules([module(
		"m",
		vec![("s1", slashed.clone()), ("s2", slashed), ("n1", nested.clone()), ("n2", nested)],
	)]);
	let err = scope.get_object_list().unwrap_err();

	let keys: Vec<String> = err.all().map(|c| c.key.to_string()).collect();
	assert_eq!(keys, vec![r#"["a", "b"]"#.to_string(), r#"["a/b"]"#.to_string()]);
	assert!(err.to_string().starts_with(r#"conflicting definitions: asset key ["a", "b"] is defined by 2 distinct objects"#), "{err}");
}
