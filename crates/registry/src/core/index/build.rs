use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use tracing::debug;
use weir_primitives::{AssetCheckKey, AssetKey};

use super::collision::validate;
use super::list::ObjectList;
use crate::core::{CollisionError, DeclaredObject, DefRef, ObjectKinds};
use crate::module::Module;
use crate::scan::{BindingSite, scan_bindings};

/// Distinct identities sharing one identity key, with the sites binding each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
	members: HashMap<DefRef, BTreeSet<BindingSite>>,
}

impl Bucket {
	/// Records that `def` is bound at `site`. Rebinding a known identity only adds a site.
	pub fn insert(&mut self, def: DefRef, site: BindingSite) {
		self.members.entry(def).or_default().insert(site);
	}

	/// Number of distinct objects in the bucket.
	pub fn identities(&self) -> usize {
		self.members.len()
	}

	pub fn is_conflicting(&self) -> bool {
		self.members.len() > 1
	}

	pub fn contains(&self, def: &DefRef) -> bool {
		self.members.contains_key(def)
	}

	/// Sites binding `def`, in site order.
	pub fn sites_of(&self, def: &DefRef) -> Option<&BTreeSet<BindingSite>> {
		self.members.get(def)
	}

	/// Every site binding any member, sorted.
	pub fn sites(&self) -> Vec<&BindingSite> {
		let all: BTreeSet<&BindingSite> = self.members.values().flatten().collect();
		all.into_iter().collect()
	}

	/// Members ordered by their first binding site.
	pub fn objects(&self) -> Vec<&DefRef> {
		let mut members: Vec<(&BindingSite, &DefRef)> = self
			.members
			.iter()
			.filter_map(|(def, sites)| sites.first().map(|site| (site, def)))
			.collect();
		members.sort_by(|a, b| a.0.cmp(b.0));
		members.into_iter().map(|(_, def)| def).collect()
	}
}

/// Per-kind buckets keyed by identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectBuckets {
	pub assets: BTreeMap<AssetKey, Bucket>,
	pub schedules: BTreeMap<String, Bucket>,
	pub sensors: BTreeMap<String, Bucket>,
	pub jobs: BTreeMap<String, Bucket>,
	pub checks: BTreeMap<AssetCheckKey, Bucket>,
	/// Objects exposing no identity key, such as unresolved cacheable assets.
	pub unkeyed: Bucket,
}

impl ObjectBuckets {
	fn insert(&mut self, def: &DefRef, site: &BindingSite) {
		let put = |bucket: &mut Bucket| bucket.insert(def.clone(), site.clone());
		match def.object() {
			DeclaredObject::Asset(asset) => {
				let keys = asset.keys();
				if keys.is_empty() {
					put(&mut self.unkeyed);
				}
				for key in keys {
					put(self.assets.entry(key.clone()).or_default());
				}
			}
			DeclaredObject::Schedule(schedule) => put(self.schedules.entry(schedule.name.clone()).or_default()),
			DeclaredObject::Sensor(sensor) => put(self.sensors.entry(sensor.name.clone()).or_default()),
			DeclaredObject::Job(job) => put(self.jobs.entry(job.name.clone()).or_default()),
			DeclaredObject::Check(check) => put(self.checks.entry(check.key.clone()).or_default()),
		}
	}
}

/// Every binding site of a recognised object across a set of modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleScopedObjects {
	bindings: Vec<(BindingSite, DefRef)>,
}

impl ModuleScopedObjects {
	/// Scans `modules` for objects of every kind.
	pub fn from_modules<I>(modules: I) -> Self
	where
		I: IntoIterator,
		I::Item: Borrow<Module>,
	{
		Self::from_modules_of_types(modules, ObjectKinds::all())
	}

	#[tracing::instrument(level = "trace", skip_all, fields(kinds = ?kinds))]
	pub fn from_modules_of_types<I>(modules: I, kinds: ObjectKinds) -> Self
	where
		I: IntoIterator,
		I::Item: Borrow<Module>,
	{
		let mut bindings = Vec::new();
		for module in modules {
			bindings.extend(scan_bindings(module.borrow(), kinds));
		}
		debug!(bindings = bindings.len(), "scanned module bindings");
		Self { bindings }
	}

	pub fn bindings(&self) -> &[(BindingSite, DefRef)] {
		&self.bindings
	}

	/// Distinct identities, ordered by their first binding site.
	pub fn distinct_objects(&self) -> Vec<DefRef> {
		let mut sorted: Vec<&(BindingSite, DefRef)> = self.bindings.iter().collect();
		sorted.sort_by(|a, b| a.0.cmp(&b.0));
		let mut seen = HashSet::default();
		sorted
			.into_iter()
			.filter(|(_, def)| seen.insert(def.clone()))
			.map(|(_, def)| def.clone())
			.collect()
	}

	pub fn buckets(&self) -> ObjectBuckets {
		let mut buckets = ObjectBuckets::default();
		for (site, def) in &self.bindings {
			buckets.insert(def, site);
		}
		debug!(
			assets = buckets.assets.len(),
			schedules = buckets.schedules.len(),
			sensors = buckets.sensors.len(),
			jobs = buckets.jobs.len(),
			checks = buckets.checks.len(),
			"bucketed objects by identity key"
		);
		buckets
	}

	/// Validates the buckets and returns the deduplicated objects.
	pub fn get_object_list(&self) -> Result<ObjectList, CollisionError> {
		validate(&self.buckets())?;
		Ok(ObjectList::new(self.distinct_objects()))
	}
}
