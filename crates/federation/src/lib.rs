//! Federation with remote Airflow instances.
//!
//! Metadata fetched from Airflow is shaped into versioned [`records`], persisted per
//! endpoint by the [`cache`], and merged back onto local asset specs through
//! [`merge`]. The fetch itself happens behind [`cache::RemoteFetcher`].

pub mod cache;
pub mod config;
pub mod error;
pub mod merge;
pub mod ordering;
pub mod records;
pub mod serdes;

pub use cache::{CacheState, CacheStore, EndpointCache, FetchOutcome, FsCacheStore, RemoteFetcher};
pub use config::{EndpointConfig, FederationConfig};
pub use error::{BoxError, CacheError, ConfigError, OrderingError, SerdesError};
pub use merge::{apply, enrich_specs, reconstruct};
pub use ordering::{DefinitionsDataBuilder, topological_ordering, verify_ordering};
pub use records::{
	KeyScopedDataItem, SerializedAirflowDefinitionsData, SerializedAssetDepData, SerializedAssetKeyScopedAirflowData,
	SerializedAssetSpecData, SerializedDagData, SerializedTaskHandleData,
};
pub use serdes::{SerdesRecord, deserialize_from_str, deserialize_value, serialize_to_string, serialize_value};
