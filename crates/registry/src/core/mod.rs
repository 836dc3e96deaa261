//! Declared objects, identity handles, errors and the identity-keyed index.

pub mod defs;
pub mod error;
pub mod handle;
pub mod index;

pub use defs::{
	AssetCheckDef, AssetObject, AssetsDef, CacheableAssets, DeclaredObject, JobDef, ObjectKind, ObjectKinds,
	ScheduleDef, SensorDef, SourceAsset, key_iterator,
};
pub use error::{Collision, CollisionError, CollisionKey, RegistryError, ScanError};
pub use handle::DefRef;
pub use index::{Bucket, ModuleScopedObjects, ObjectBuckets, ObjectList, collisions, validate};
