use super::ModuleBuilder;

/// Static registration of a module, collected with `inventory`.
///
/// Submitted by [`crate::module!`]; materialised by
/// [`ModuleSet::from_inventory`](super::ModuleSet::from_inventory).
pub struct ModuleReg {
	pub name: &'static str,
	pub location: Option<&'static str>,
	pub is_package: bool,
	/// Binds the module's attributes. Runs once per materialisation.
	pub build: fn(&mut ModuleBuilder),
}

inventory::collect!(ModuleReg);

impl ModuleReg {
	pub const fn module(name: &'static str, build: fn(&mut ModuleBuilder)) -> Self {
		Self {
			name,
			location: None,
			is_package: false,
			build,
		}
	}

	pub const fn package(name: &'static str, location: &'static str, build: fn(&mut ModuleBuilder)) -> Self {
		Self {
			name,
			location: Some(location),
			is_package: true,
			build,
		}
	}
}

/// Registers a module for discovery through [`ModuleSet::from_inventory`](crate::module::ModuleSet::from_inventory).
///
/// ```ignore
/// fn orders(m: &mut ModuleBuilder) {
///     m.bind("orders", DefRef::new(AssetSpec::new("orders")));
/// }
/// weir_registry::module!("analytics.orders", orders);
/// weir_registry::module!(package "analytics" at "src/analytics", analytics_root);
/// ```
#[macro_export]
macro_rules! module {
	(package $name:literal at $location:literal, $build:path) => {
		$crate::__inventory::submit! {
			$crate::module::ModuleReg::package($name, $location, $build)
		}
	};
	($name:literal, $build:path) => {
		$crate::__inventory::submit! {
			$crate::module::ModuleReg::module($name, $build)
		}
	};
}
