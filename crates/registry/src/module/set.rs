use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{Module, ModuleBuilder, ModuleReg};
use crate::core::ScanError;

/// Owning collection of modules keyed by dotted name.
///
/// Acts as the import mechanism for package walks: the children of a package are
/// the modules named `<package>.<child>`.
#[derive(Debug, Default, Clone)]
pub struct ModuleSet {
	modules: BTreeMap<String, Arc<Module>>,
}

impl ModuleSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds every module submitted through [`crate::module!`] in this binary.
	///
	/// Each call runs the registered builders again, so objects are fresh
	/// identities per call.
	pub fn from_inventory() -> Result<Self, ScanError> {
		let mut regs: Vec<&'static ModuleReg> = inventory::iter::<ModuleReg>.into_iter().collect();
		regs.sort_by(|a, b| a.name.cmp(b.name));

		let mut set = Self::new();
		for reg in regs {
			let mut builder = ModuleBuilder::new(reg.name);
			builder.package(reg.is_package);
			if let Some(location) = reg.location {
				builder.location(location);
			}
			(reg.build)(&mut builder);
			set.insert(builder.build())?;
		}
		debug!(modules = set.len(), "loaded registered modules");
		Ok(set)
	}

	pub fn insert(&mut self, module: Module) -> Result<Arc<Module>, ScanError> {
		if self.modules.contains_key(module.name()) {
			return Err(ScanError::DuplicateModule {
				module: module.name().to_string(),
			});
		}
		let module = Arc::new(module);
		self.modules.insert(module.name().to_string(), Arc::clone(&module));
		Ok(module)
	}

	pub fn get(&self, name: &str) -> Option<&Arc<Module>> {
		self.modules.get(name)
	}

	pub fn require(&self, name: &str) -> Result<&Arc<Module>, ScanError> {
		self.get(name).ok_or_else(|| ScanError::UnknownModule { module: name.to_string() })
	}

	/// Direct children of `package`, sorted by name.
	pub fn submodules(&self, package: &Module) -> Vec<Arc<Module>> {
		let prefix = format!("{}.", package.name());
		self.modules
			.range(prefix.clone()..)
			.take_while(|(name, _)| name.starts_with(&prefix))
			.filter(|(name, _)| !name[prefix.len()..].contains('.'))
			.map(|(_, module)| Arc::clone(module))
			.collect()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<Module>> + '_ {
		self.modules.values()
	}

	pub fn len(&self) -> usize {
		self.modules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}
