use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use super::defs::DeclaredObject;

/// Shared handle to a declared object.
///
/// Equality and hashing follow the allocation, not the contents: cloning a handle
/// binds the same object again, while constructing a second object with equal
/// fields yields a distinct identity.
#[derive(Clone)]
pub struct DefRef(Arc<DeclaredObject>);

impl DefRef {
	pub fn new(object: impl Into<DeclaredObject>) -> Self {
		Self(Arc::new(object.into()))
	}

	pub fn object(&self) -> &DeclaredObject {
		&self.0
	}

	/// Stable address of the underlying allocation, used as the identity token.
	pub fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Deref for DefRef {
	type Target = DeclaredObject;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq for DefRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for DefRef {}

impl Hash for DefRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.addr().hash(state);
	}
}

impl fmt::Debug for DefRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DefRef")
			.field("addr", &format_args!("{:#x}", self.addr()))
			.field("object", &self.0)
			.finish()
	}
}
