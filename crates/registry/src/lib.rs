//! Discovery of declared pipeline objects.
//!
//! User code binds assets, schedules, sensors, jobs and checks into [`module::Module`]
//! scopes, either directly through [`module::ModuleBuilder`] or statically through
//! [`module!`]. The [`scan`] functions walk those scopes, and the [`core::index`] turns
//! what they find into deduplicated, collision-checked object lists.
//!
//! # Flow
//!
//! | Step | Entry point |
//! |------|-------------|
//! | Walk a package | [`scan::find_modules_in_package`] |
//! | Find objects | [`scan::find_objects_in_module_of_types`] |
//! | Bucket by identity key | [`ModuleScopedObjects::buckets`] |
//! | Validate | [`ModuleScopedObjects::get_object_list`] |

pub mod core;
pub mod loaders;
pub mod module;
pub mod scan;

#[doc(hidden)]
pub use inventory as __inventory;

pub use crate::core::{
	AssetCheckDef, AssetObject, AssetsDef, Bucket, CacheableAssets, Collision, CollisionError, CollisionKey, DeclaredObject,
	DefRef, JobDef, ModuleScopedObjects, ObjectBuckets, ObjectKind, ObjectKinds, ObjectList, RegistryError, ScanError,
	ScheduleDef, SensorDef, SourceAsset, key_iterator,
};
pub use loaders::{load_assets_from_package, load_objects_from_modules, replace_keys_in_asset};
pub use module::{AttrValue, Module, ModuleBuilder, ModuleReg, ModuleSet, TypeRef};
