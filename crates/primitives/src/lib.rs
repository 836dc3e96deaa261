//! Core asset vocabulary: keys, declarations, dependency edges and metadata maps.
//!
//! Every other weir crate speaks in these types. Nothing here performs I/O.

/// Asset and asset-check keys.
pub mod key;
/// Dictionary merge rule shared by every enrichment path.
pub mod merge;
/// Asset declarations and dependency edges.
pub mod spec;

pub use key::{AssetCheckKey, AssetKey, KeyError};
pub use merge::merge_maps;
pub use spec::{AssetDep, AssetSpec, MetadataMap, PartitionMapping, TagMap};
