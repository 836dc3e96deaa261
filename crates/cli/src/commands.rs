//! Subcommand implementations. Each writes its report to `out`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::info;
use weir_federation::cache::write_atomic;
use weir_federation::serdes::{self, SerdesRecord, record_type, serialize_to_string_pretty};
use weir_federation::{EndpointCache, FederationConfig, SerializedAirflowDefinitionsData};

/// Reads `path` and decodes it, returning the artifact and the version it was written at.
fn read_artifact(path: &Path) -> anyhow::Result<(SerializedAirflowDefinitionsData, u64)> {
	let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
	let value: Value = serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;

	let expected = SerializedAirflowDefinitionsData::schema().name;
	match record_type(&value) {
		Some(found) if found == expected => {}
		Some(found) => bail!("{} holds a {found} record, not a {expected}", path.display()),
		None => bail!("{} is not a weir cache artifact", path.display()),
	}
	let version = value.get(serdes::VERSION_KEY).and_then(Value::as_u64).unwrap_or_default();
	let data = serdes::deserialize_value(value).with_context(|| format!("failed to decode {}", path.display()))?;
	Ok((data, version))
}

pub fn inspect(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
	let (data, version) = read_artifact(path)?;
	let current = SerializedAirflowDefinitionsData::schema().version;

	writeln!(out, "{}", path.display())?;
	writeln!(out, "  schema version: {version} (current {current})")?;
	writeln!(out, "  asset keys:     {}", data.asset_key_topological_ordering().len())?;
	writeln!(out, "  scoped items:   {}", data.key_scoped_data_items().len())?;
	writeln!(out, "  dags:           {}", data.dag_datas().len())?;
	for (dag_id, dag) in data.dag_datas() {
		let migrated = dag.task_handle_data.values().filter(|task| task.migration_state == Some(true)).count();
		writeln!(
			out,
			"    {dag_id}: asset {}, {} tasks ({migrated} migrated), {} task assets",
			dag.spec_data.asset_key,
			dag.task_handle_data.len(),
			dag.all_asset_keys_in_tasks.len()
		)?;
	}
	Ok(())
}

pub fn verify(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
	let (data, _) = read_artifact(path)?;
	data.verify_topological_ordering()
		.with_context(|| format!("{} has an invalid topological ordering", path.display()))?;
	writeln!(out, "{}: ok ({} asset keys)", path.display(), data.asset_key_topological_ordering().len())?;
	Ok(())
}

pub fn upgrade(path: &Path, target: Option<&Path>, out: &mut impl Write) -> anyhow::Result<()> {
	let (data, version) = read_artifact(path)?;
	let target = target.unwrap_or(path);
	let text = serialize_to_string_pretty(&data)?;
	write_atomic(target, text.as_bytes())?;

	let current = SerializedAirflowDefinitionsData::schema().version;
	info!(from = version, to = current, target = %target.display(), "rewrote cache artifact");
	writeln!(out, "{}: v{version} -> v{current}", target.display())?;
	Ok(())
}

pub fn check_config(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
	let config = FederationConfig::load(path)?;
	writeln!(out, "{}: {} endpoint(s)", path.display(), config.endpoints.len())?;
	for endpoint in &config.endpoints {
		let cache = EndpointCache::from_config(&config, endpoint);
		let cache_path = endpoint.cache_path(&config.cache_dir);
		let status = match cache.load_persisted() {
			Ok(Some(_)) => "cached".to_string(),
			Ok(None) => "no cache".to_string(),
			Err(error) => format!("unreadable cache: {error}"),
		};
		writeln!(out, "  {} ({}) -> {} [{status}]", endpoint.name, endpoint.webserver_url, cache_path.display())?;
	}
	Ok(())
}
