//! Higher-level loading helpers built on the scanner and the index.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use weir_primitives::{AssetCheckKey, AssetDep, AssetKey, AssetSpec};

use crate::core::{AssetObject, AssetsDef, ModuleScopedObjects, ObjectKinds, ObjectList, RegistryError, SourceAsset};
use crate::module::{Module, ModuleSet};
use crate::scan::collect_package_modules;

fn replaced(key: &AssetKey, replacements: &BTreeMap<AssetKey, AssetKey>) -> AssetKey {
	replacements.get(key).unwrap_or(key).clone()
}

fn replace_check_key(
	key: &AssetCheckKey,
	key_replacements: &BTreeMap<AssetKey, AssetKey>,
	check_key_replacements: &BTreeMap<AssetCheckKey, AssetCheckKey>,
) -> AssetCheckKey {
	match check_key_replacements.get(key) {
		Some(new) => new.clone(),
		None => AssetCheckKey {
			asset_key: replaced(&key.asset_key, key_replacements),
			name: key.name.clone(),
		},
	}
}

fn replace_deps(deps: &[AssetDep], replacements: &BTreeMap<AssetKey, AssetKey>) -> Vec<AssetDep> {
	deps.iter()
		.map(|dep| AssetDep {
			asset_key: replaced(&dep.asset_key, replacements),
			..dep.clone()
		})
		.collect()
}

/// Returns `asset` with its keys swapped according to the replacement maps.
///
/// Specs and source assets only have their own key replaced. Definitions also have
/// their dependency edges and bundled check keys rewritten; a check key without an
/// explicit replacement follows its asset's key. Cacheable assets have no keys yet
/// and are returned unchanged.
pub fn replace_keys_in_asset(
	asset: &AssetObject,
	key_replacements: &BTreeMap<AssetKey, AssetKey>,
	check_key_replacements: &BTreeMap<AssetCheckKey, AssetCheckKey>,
) -> AssetObject {
	match asset {
		AssetObject::Source(source) => AssetObject::Source(SourceAsset {
			key: replaced(&source.key, key_replacements),
			..source.clone()
		}),
		AssetObject::Spec(spec) => AssetObject::Spec(spec.replace_key(replaced(&spec.key, key_replacements))),
		AssetObject::Definition(def) => AssetObject::Definition(AssetsDef {
			op_name: def.op_name.clone(),
			specs: def
				.specs
				.iter()
				.map(|spec| AssetSpec {
					key: replaced(&spec.key, key_replacements),
					deps: replace_deps(&spec.deps, key_replacements),
					..spec.clone()
				})
				.collect(),
			check_keys: def
				.check_keys
				.iter()
				.map(|key| replace_check_key(key, key_replacements, check_key_replacements))
				.collect(),
		}),
		AssetObject::Cacheable(_) => asset.clone(),
	}
}

impl ObjectList {
	/// Every loaded asset with `prefix` prepended to the keys it produces.
	///
	/// Dependencies on other loaded, non-source assets are rewired to the prefixed
	/// keys; dependencies on anything else, and source assets themselves, keep
	/// their keys.
	pub fn assets_with_key_prefix<I, S>(&self, prefix: I) -> Vec<AssetObject>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let prefix: Vec<String> = prefix.into_iter().map(Into::into).collect();
		let key_replacements: BTreeMap<AssetKey, AssetKey> = self
			.assets()
			.filter(|asset| !matches!(asset, AssetObject::Source(_)))
			.flat_map(AssetObject::keys)
			.map(|key| (key.clone(), key.with_prefix(prefix.iter().cloned())))
			.collect();
		debug!(prefixed = key_replacements.len(), "prefixing loaded asset keys");

		self.assets()
			.map(|asset| match asset {
				AssetObject::Source(_) => asset.clone(),
				AssetObject::Spec(spec) => AssetObject::Spec(AssetSpec {
					key: replaced(&spec.key, &key_replacements),
					deps: replace_deps(&spec.deps, &key_replacements),
					..spec.clone()
				}),
				other => replace_keys_in_asset(other, &key_replacements, &BTreeMap::new()),
			})
			.collect()
	}
}

/// Scans `modules` for objects of `kinds` and validates them.
pub fn load_objects_from_modules(modules: &[Arc<Module>], kinds: ObjectKinds) -> Result<ObjectList, RegistryError> {
	let scope = ModuleScopedObjects::from_modules_of_types(modules.iter().map(Arc::as_ref), kinds);
	Ok(scope.get_object_list()?)
}

/// Walks the package rooted at `root` and returns its validated assets.
#[tracing::instrument(level = "debug", skip(set))]
pub fn load_assets_from_package(set: &ModuleSet, root: &str) -> Result<ObjectList, RegistryError> {
	let root = set.require(root)?;
	let modules = collect_package_modules(set, root)?;
	load_objects_from_modules(&modules, ObjectKinds::ASSET)
}
