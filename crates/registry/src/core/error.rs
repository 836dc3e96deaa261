use std::fmt;

use weir_primitives::AssetKey;

use super::defs::ObjectKind;

/// Failures while resolving the module tree to scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
	/// A package has no filesystem location, so its submodules cannot be discovered.
	#[error("tried to find modules in package {module:?}, but it has no resolvable location")]
	UnresolvableLocation { module: String },
	/// Package discovery was requested for a plain module.
	#[error("module {module:?} is not a package")]
	NotAPackage { module: String },
	#[error("no module named {module:?} is registered")]
	UnknownModule { module: String },
	#[error("module {module:?} is registered more than once")]
	DuplicateModule { module: String },
}

/// The key two or more objects were found to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionKey {
	Asset(AssetKey),
	/// Schedule, sensor or job name.
	Name(String),
}

impl fmt::Display for CollisionKey {
	/// Asset keys render as their path components, so `["a/b"]` and `["a", "b"]`
	/// stay distinguishable.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Asset(key) => write!(f, "{:?}", key.path()),
			Self::Name(name) => write!(f, "{name:?}"),
		}
	}
}

/// A single identity key bound to more than one distinct object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub kind: ObjectKind,
	pub key: CollisionKey,
	/// Number of distinct objects sharing the key.
	pub identities: usize,
	/// Every `module.attribute` site binding one of the conflicting objects, sorted.
	pub bindings: Vec<String>,
}

impl fmt::Display for Collision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} key {} is defined by {} distinct objects (bound at: {})",
			self.kind,
			self.key,
			self.identities,
			self.bindings.join(", ")
		)
	}
}

/// Conflicting definitions found during validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conflicting definitions: {first}{}", more_suffix(.others))]
pub struct CollisionError {
	pub first: Collision,
	/// Further collisions found in the same pass, in validation order.
	pub others: Vec<Collision>,
}

impl CollisionError {
	pub fn kind(&self) -> ObjectKind {
		self.first.kind
	}

	pub fn key(&self) -> &CollisionKey {
		&self.first.key
	}

	pub fn all(&self) -> impl Iterator<Item = &Collision> + '_ {
		std::iter::once(&self.first).chain(self.others.iter())
	}
}

fn more_suffix(others: &[Collision]) -> String {
	match others.len() {
		0 => String::new(),
		1 => " (and 1 more collision)".to_string(),
		n => format!(" (and {n} more collisions)"),
	}
}

/// Umbrella error for loading objects from modules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error(transparent)]
	Scan(#[from] ScanError),
	#[error(transparent)]
	Collision(#[from] CollisionError),
}
