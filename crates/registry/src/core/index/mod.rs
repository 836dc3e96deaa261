//! Identity-keyed object index and collision validation.
//!
//! # Purpose
//!
//! Turns the raw binding sites produced by the scanner into per-kind buckets keyed by
//! identity key, then decides which buckets are user errors.
//!
//! # Mental Model
//!
//! 1. **Collect:** [`ModuleScopedObjects`] records every `(site, DefRef)` pair found in
//!    the scanned modules. The same object bound under several names appears once per
//!    site.
//! 2. **Bucket:** [`ModuleScopedObjects::buckets`] folds the sites into [`ObjectBuckets`].
//!    A [`Bucket`] maps each distinct identity to the sites binding it, so aliases
//!    collapse before any key comparison happens.
//! 3. **Validate:** [`validate`] rejects any asset, schedule, sensor or job bucket that
//!    holds more than one identity.
//!
//! # Invariants
//!
//! - Aliases of one object never collide with each other.
//!   - Enforced in: [`Bucket::insert`] (keyed by [`DefRef`] pointer identity).
//!   - Tested by: `core::index::tests::same_object_under_two_names_is_not_a_collision`
//!   - Failure symptom: Spurious conflict errors for `bar = foo` style aliases.
//!
//! - Bucketing is independent of module and attribute order.
//!   - Enforced in: [`ObjectBuckets`] (ordered maps, set-valued buckets).
//!   - Tested by: `core::index::tests::buckets_do_not_depend_on_module_order`
//!   - Failure symptom: Error messages or loaded object order change between runs.
//!
//! - Asset checks sharing a key are tolerated.
//!   - Enforced in: [`collisions`] (the check buckets are never inspected).
//!   - Tested by: `core::index::tests::collision_matrix`
//!   - Failure symptom: Loading fails when several checks target one asset.

mod build;
mod collision;
mod list;

pub use build::{Bucket, ModuleScopedObjects, ObjectBuckets};
pub use collision::{collisions, validate};
pub use list::ObjectList;

#[cfg(test)]
mod tests;
