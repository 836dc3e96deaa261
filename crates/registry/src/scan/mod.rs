//! Module scanning.
//!
//! Read-only: nothing reached through a scan is mutated.

use std::fmt;
use std::sync::Arc;

use crate::core::{DefRef, ObjectKinds, ScanError};
use crate::module::{AttrValue, Module, ModuleSet, TypeRef};

/// Where an object was found: module, attribute, and list position when the
/// attribute held a list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingSite {
	pub module: String,
	pub attr: String,
	pub index: Option<usize>,
}

impl fmt::Display for BindingSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.index {
			Some(i) => write!(f, "{}.{}[{}]", self.module, self.attr, i),
			None => write!(f, "{}.{}", self.module, self.attr),
		}
	}
}

/// Lazy depth-first walk over a package tree. See [`find_modules_in_package`].
pub struct PackageWalk<'a> {
	set: &'a ModuleSet,
	stack: Vec<Arc<Module>>,
	pending_error: Option<ScanError>,
}

impl PackageWalk<'_> {
	fn fail(&mut self, error: ScanError) -> Option<Result<Arc<Module>, ScanError>> {
		self.stack.clear();
		Some(Err(error))
	}
}

impl Iterator for PackageWalk<'_> {
	type Item = Result<Arc<Module>, ScanError>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(error) = self.pending_error.take() {
			return self.fail(error);
		}
		let module = self.stack.pop()?;
		if module.is_package() {
			if module.location().is_none() {
				return self.fail(ScanError::UnresolvableLocation {
					module: module.name().to_string(),
				});
			}
			let children = self.set.submodules(&module);
			self.stack.extend(children.into_iter().rev());
		}
		Some(Ok(module))
	}
}

/// Yields `root` and then every module beneath it, depth first.
///
/// Each package's children are visited in name order, and a sub-package's own
/// children are visited before its next sibling. The walk ends after yielding
/// [`ScanError::UnresolvableLocation`] for the first package lacking a location,
/// or [`ScanError::NotAPackage`] if `root` is a plain module.
pub fn find_modules_in_package<'a>(set: &'a ModuleSet, root: &Arc<Module>) -> PackageWalk<'a> {
	if !root.is_package() {
		return PackageWalk {
			set,
			stack: Vec::new(),
			pending_error: Some(ScanError::NotAPackage {
				module: root.name().to_string(),
			}),
		};
	}
	PackageWalk {
		set,
		stack: vec![Arc::clone(root)],
		pending_error: None,
	}
}

/// Collects [`find_modules_in_package`], failing on the first error.
pub fn collect_package_modules(set: &ModuleSet, root: &Arc<Module>) -> Result<Vec<Arc<Module>>, ScanError> {
	find_modules_in_package(set, root).collect()
}

fn matches(value: &AttrValue, kinds: ObjectKinds) -> Option<&DefRef> {
	match value {
		AttrValue::Object(def) if kinds.accepts(def.kind()) => Some(def),
		_ => None,
	}
}

/// Every binding of a recognised object in `module`, with its site.
///
/// Homogeneous lists are decomposed into one binding per element; a list with any
/// unrecognised element contributes nothing.
pub fn scan_bindings<'a>(module: &'a Module, kinds: ObjectKinds) -> impl Iterator<Item = (BindingSite, DefRef)> + 'a {
	module.attrs().flat_map(move |(attr, value)| {
		let site = |index| BindingSite {
			module: module.name().to_string(),
			attr: attr.to_string(),
			index,
		};
		let found: Vec<(BindingSite, DefRef)> = match value {
			AttrValue::List(items) => {
				let defs: Option<Vec<&DefRef>> = items.iter().map(|item| matches(item, kinds)).collect();
				defs.map(|defs| defs.into_iter().enumerate().map(|(i, def)| (site(Some(i)), def.clone())).collect())
					.unwrap_or_default()
			}
			other => matches(other, kinds).map(|def| vec![(site(None), def.clone())]).unwrap_or_default(),
		};
		found
	})
}

/// Objects of the requested kinds bound at the top level of `module`.
pub fn find_objects_in_module_of_types(module: &Module, kinds: ObjectKinds) -> impl Iterator<Item = DefRef> + '_ {
	scan_bindings(module, kinds).map(|(_, def)| def)
}

/// Component types bound in `module` that are `base` or derive from it.
pub fn find_subclasses_in_module<'a>(module: &'a Module, base: &'a TypeRef) -> impl Iterator<Item = &'a TypeRef> + 'a {
	module.attrs().filter_map(move |(_, value)| match value {
		AttrValue::Type(ty) if ty.is_subclass_of(base) => Some(ty),
		_ => None,
	})
}
