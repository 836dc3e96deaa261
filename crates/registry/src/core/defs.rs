//! Declared object shapes recognised by the scanner.

use std::fmt;

use weir_primitives::{AssetCheckKey, AssetKey, AssetSpec};

/// A computed asset definition, possibly producing several assets from one op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetsDef {
	pub op_name: String,
	pub specs: Vec<AssetSpec>,
	/// Checks bundled with the op; each targets one asset key.
	pub check_keys: Vec<AssetCheckKey>,
}

impl AssetsDef {
	/// Single-asset definition whose op is named after the asset key.
	pub fn single(spec: AssetSpec) -> Self {
		Self {
			op_name: spec.key.path().join("__"),
			specs: vec![spec],
			check_keys: Vec::new(),
		}
	}

	pub fn multi(op_name: impl Into<String>, specs: Vec<AssetSpec>) -> Self {
		Self {
			op_name: op_name.into(),
			specs,
			check_keys: Vec::new(),
		}
	}

	pub fn with_check(mut self, key: AssetCheckKey) -> Self {
		self.check_keys.push(key);
		self
	}

	pub fn keys(&self) -> impl Iterator<Item = &AssetKey> + '_ {
		self.specs.iter().map(|spec| &spec.key)
	}
}

/// An asset produced outside of this code location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
	pub key: AssetKey,
	pub description: Option<String>,
}

impl SourceAsset {
	pub fn new(key: impl Into<AssetKey>) -> Self {
		Self {
			key: key.into(),
			description: None,
		}
	}
}

/// Assets whose keys are only known after an external resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheableAssets {
	pub unique_id: String,
}

/// Every asset-shaped declaration the scanner recognises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetObject {
	Definition(AssetsDef),
	Spec(AssetSpec),
	Source(SourceAsset),
	Cacheable(CacheableAssets),
}

impl AssetObject {
	/// Keys this object declares. Cacheable assets declare none until resolved.
	pub fn keys(&self) -> Vec<&AssetKey> {
		key_iterator(self, false)
	}

	/// Whether the object carries concrete keys at scan time.
	pub fn is_key_scoped(&self) -> bool {
		!matches!(self, Self::Cacheable(_))
	}
}

/// Asset keys exposed by `asset`.
///
/// With `include_targeted_keys`, keys targeted by checks bundled in a definition
/// are appended after the definition's own keys.
pub fn key_iterator(asset: &AssetObject, include_targeted_keys: bool) -> Vec<&AssetKey> {
	match asset {
		AssetObject::Definition(def) => {
			let mut keys: Vec<&AssetKey> = def.keys().collect();
			if include_targeted_keys {
				keys.extend(def.check_keys.iter().map(|check| &check.asset_key));
			}
			keys
		}
		AssetObject::Spec(spec) => vec![&spec.key],
		AssetObject::Source(source) => vec![&source.key],
		AssetObject::Cacheable(_) => Vec::new(),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDef {
	pub name: String,
	pub cron_schedule: String,
	pub target: String,
}

impl ScheduleDef {
	pub fn new(name: impl Into<String>, cron_schedule: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			cron_schedule: cron_schedule.into(),
			target: "*".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDef {
	pub name: String,
	pub job_name: Option<String>,
	pub minimum_interval_seconds: u32,
}

impl SensorDef {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			job_name: None,
			minimum_interval_seconds: 30,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDef {
	pub name: String,
	/// Asset selection string; `None` selects every asset.
	pub selection: Option<String>,
}

impl JobDef {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			selection: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCheckDef {
	pub key: AssetCheckKey,
	pub description: Option<String>,
	pub blocking: bool,
}

impl AssetCheckDef {
	pub fn new(asset_key: impl Into<AssetKey>, name: impl Into<String>) -> Self {
		Self {
			key: AssetCheckKey::new(asset_key, name),
			description: None,
			blocking: false,
		}
	}
}

/// Tagged union over every declared object category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredObject {
	Asset(AssetObject),
	Schedule(ScheduleDef),
	Sensor(SensorDef),
	Job(JobDef),
	Check(AssetCheckDef),
}

impl DeclaredObject {
	pub fn kind(&self) -> ObjectKind {
		match self {
			Self::Asset(_) => ObjectKind::Asset,
			Self::Schedule(_) => ObjectKind::Schedule,
			Self::Sensor(_) => ObjectKind::Sensor,
			Self::Job(_) => ObjectKind::Job,
			Self::Check(_) => ObjectKind::AssetCheck,
		}
	}

	pub fn as_asset(&self) -> Option<&AssetObject> {
		match self {
			Self::Asset(asset) => Some(asset),
			_ => None,
		}
	}
}

impl From<AssetObject> for DeclaredObject {
	fn from(value: AssetObject) -> Self {
		Self::Asset(value)
	}
}

impl From<AssetsDef> for DeclaredObject {
	fn from(value: AssetsDef) -> Self {
		Self::Asset(AssetObject::Definition(value))
	}
}

impl From<AssetSpec> for DeclaredObject {
	fn from(value: AssetSpec) -> Self {
		Self::Asset(AssetObject::Spec(value))
	}
}

impl From<SourceAsset> for DeclaredObject {
	fn from(value: SourceAsset) -> Self {
		Self::Asset(AssetObject::Source(value))
	}
}

impl From<CacheableAssets> for DeclaredObject {
	fn from(value: CacheableAssets) -> Self {
		Self::Asset(AssetObject::Cacheable(value))
	}
}

impl From<ScheduleDef> for DeclaredObject {
	fn from(value: ScheduleDef) -> Self {
		Self::Schedule(value)
	}
}

impl From<SensorDef> for DeclaredObject {
	fn from(value: SensorDef) -> Self {
		Self::Sensor(value)
	}
}

impl From<JobDef> for DeclaredObject {
	fn from(value: JobDef) -> Self {
		Self::Job(value)
	}
}

impl From<AssetCheckDef> for DeclaredObject {
	fn from(value: AssetCheckDef) -> Self {
		Self::Check(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
	Asset,
	Schedule,
	Sensor,
	Job,
	AssetCheck,
}

impl ObjectKind {
	pub const fn flag(self) -> ObjectKinds {
		match self {
			Self::Asset => ObjectKinds::ASSET,
			Self::Schedule => ObjectKinds::SCHEDULE,
			Self::Sensor => ObjectKinds::SENSOR,
			Self::Job => ObjectKinds::JOB,
			Self::AssetCheck => ObjectKinds::ASSET_CHECK,
		}
	}
}

impl fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Asset => write!(f, "asset"),
			Self::Schedule => write!(f, "schedule"),
			Self::Sensor => write!(f, "sensor"),
			Self::Job => write!(f, "job"),
			Self::AssetCheck => write!(f, "asset check"),
		}
	}
}

bitflags::bitflags! {
	/// Filter over [`ObjectKind`]s accepted by a scan.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct ObjectKinds: u8 {
		const ASSET = 1 << 0;
		const SCHEDULE = 1 << 1;
		const SENSOR = 1 << 2;
		const JOB = 1 << 3;
		const ASSET_CHECK = 1 << 4;
	}
}

impl ObjectKinds {
	pub fn accepts(self, kind: ObjectKind) -> bool {
		self.contains(kind.flag())
	}
}
