use crate::core::{AssetCheckDef, AssetObject, DeclaredObject, DefRef, JobDef, ScheduleDef, SensorDef};

/// Validated, deduplicated objects loaded from a module scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectList {
	loaded_objects: Vec<DefRef>,
}

impl ObjectList {
	pub fn new(loaded_objects: Vec<DefRef>) -> Self {
		Self { loaded_objects }
	}

	pub fn loaded_objects(&self) -> &[DefRef] {
		&self.loaded_objects
	}

	pub fn len(&self) -> usize {
		self.loaded_objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.loaded_objects.is_empty()
	}

	pub fn into_inner(self) -> Vec<DefRef> {
		self.loaded_objects
	}

	pub fn assets(&self) -> impl Iterator<Item = &AssetObject> + '_ {
		self.loaded_objects.iter().filter_map(|def| def.as_asset())
	}

	pub fn schedules(&self) -> impl Iterator<Item = &ScheduleDef> + '_ {
		self.loaded_objects.iter().filter_map(|def| match def.object() {
			DeclaredObject::Schedule(schedule) => Some(schedule),
			_ => None,
		})
	}

	pub fn sensors(&self) -> impl Iterator<Item = &SensorDef> + '_ {
		self.loaded_objects.iter().filter_map(|def| match def.object() {
			DeclaredObject::Sensor(sensor) => Some(sensor),
			_ => None,
		})
	}

	pub fn jobs(&self) -> impl Iterator<Item = &JobDef> + '_ {
		self.loaded_objects.iter().filter_map(|def| match def.object() {
			DeclaredObject::Job(job) => Some(job),
			_ => None,
		})
	}

	pub fn checks(&self) -> impl Iterator<Item = &AssetCheckDef> + '_ {
		self.loaded_objects.iter().filter_map(|def| match def.object() {
			DeclaredObject::Check(check) => Some(check),
			_ => None,
		})
	}
}
