//! Module scopes: named collections of top-level bindings.
//!
//! Rust has no runtime view of arbitrary module namespaces, so user code declares
//! its bindings explicitly through [`ModuleBuilder`], either directly or through
//! static registration with [`crate::module!`]. A [`ModuleSet`] then plays the role
//! of the import mechanism for package discovery.

mod plugin;
mod set;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use plugin::ModuleReg;
pub use set::ModuleSet;

use crate::core::DefRef;

/// Value bound to a module attribute.
#[derive(Debug, Clone)]
pub enum AttrValue {
	Object(DefRef),
	/// Ordered sequence; only decomposed when every element is a recognised object.
	List(Vec<AttrValue>),
	/// A component type, discoverable by [`crate::scan::find_subclasses_in_module`].
	Type(TypeRef),
	/// Any other value, described by its type name.
	Opaque(String),
}

impl From<DefRef> for AttrValue {
	fn from(value: DefRef) -> Self {
		Self::Object(value)
	}
}

impl From<&DefRef> for AttrValue {
	fn from(value: &DefRef) -> Self {
		Self::Object(value.clone())
	}
}

impl From<TypeRef> for AttrValue {
	fn from(value: TypeRef) -> Self {
		Self::Type(value)
	}
}

struct TypeDef {
	name: String,
	bases: Vec<TypeRef>,
}

/// Handle to a declared component type and its base types.
///
/// Like [`DefRef`], identity is the allocation: two types with the same name are
/// unrelated unless one lists the other as a base.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDef>);

impl TypeRef {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_bases(name, Vec::new())
	}

	pub fn with_bases(name: impl Into<String>, bases: Vec<TypeRef>) -> Self {
		Self(Arc::new(TypeDef {
			name: name.into(),
			bases,
		}))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub fn bases(&self) -> &[TypeRef] {
		&self.0.bases
	}

	/// Reflexive, transitive subtype test.
	pub fn is_subclass_of(&self, base: &TypeRef) -> bool {
		Arc::ptr_eq(&self.0, &base.0) || self.0.bases.iter().any(|b| b.is_subclass_of(base))
	}
}

impl PartialEq for TypeRef {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let bases: Vec<&str> = self.0.bases.iter().map(TypeRef::name).collect();
		f.debug_struct("TypeRef").field("name", &self.0.name).field("bases", &bases).finish()
	}
}

/// One scanned module: its dotted name, optional location, and bindings.
#[derive(Debug, Clone)]
pub struct Module {
	name: String,
	location: Option<PathBuf>,
	is_package: bool,
	attrs: BTreeMap<String, AttrValue>,
}

impl Module {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn location(&self) -> Option<&Path> {
		self.location.as_deref()
	}

	pub fn is_package(&self) -> bool {
		self.is_package
	}

	/// Top-level bindings in attribute-name order.
	pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> + '_ {
		self.attrs.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn get(&self, attr: &str) -> Option<&AttrValue> {
		self.attrs.get(attr)
	}

	/// Dotted name of the parent package, if any.
	pub fn parent_name(&self) -> Option<&str> {
		self.name.rsplit_once('.').map(|(parent, _)| parent)
	}
}

/// Explicit collector for a module's bindings.
///
/// Rebinding an attribute name replaces the earlier value, as assignment would.
#[derive(Debug)]
pub struct ModuleBuilder {
	module: Module,
}

impl ModuleBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			module: Module {
				name: name.into(),
				location: None,
				is_package: false,
				attrs: BTreeMap::new(),
			},
		}
	}

	pub fn name(&self) -> &str {
		&self.module.name
	}

	pub fn location(&mut self, path: impl Into<PathBuf>) -> &mut Self {
		self.module.location = Some(path.into());
		self
	}

	pub fn package(&mut self, is_package: bool) -> &mut Self {
		self.module.is_package = is_package;
		self
	}

	pub fn bind(&mut self, attr: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
		self.module.attrs.insert(attr.into(), value.into());
		self
	}

	pub fn bind_list<I, V>(&mut self, attr: impl Into<String>, values: I) -> &mut Self
	where
		I: IntoIterator<Item = V>,
		V: Into<AttrValue>,
	{
		let list = values.into_iter().map(Into::into).collect();
		self.module.attrs.insert(attr.into(), AttrValue::List(list));
		self
	}

	pub fn bind_type(&mut self, attr: impl Into<String>, ty: TypeRef) -> &mut Self {
		self.module.attrs.insert(attr.into(), AttrValue::Type(ty));
		self
	}

	pub fn bind_opaque(&mut self, attr: impl Into<String>, type_name: impl Into<String>) -> &mut Self {
		self.module.attrs.insert(attr.into(), AttrValue::Opaque(type_name.into()));
		self
	}

	pub fn build(self) -> Module {
		self.module
	}
}
