use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::store::{CacheStore, FsCacheStore};
use crate::config::{EndpointConfig, FederationConfig};
use crate::error::{BoxError, CacheError};
use crate::records::SerializedAirflowDefinitionsData;

/// Result of a successful remote fetch.
#[derive(Debug)]
pub enum FetchOutcome {
	/// The remote has nothing newer than the value passed in.
	Unchanged,
	Updated(SerializedAirflowDefinitionsData),
}

/// Produces fresh artifacts from a remote orchestrator.
pub trait RemoteFetcher: Send + Sync {
	/// Fetches data for `endpoint`. `previous` is the currently published value, if
	/// any, for incremental refreshes.
	fn fetch(&self, endpoint: &str, previous: Option<&SerializedAirflowDefinitionsData>) -> Result<FetchOutcome, BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
	NoCache,
	Fetching,
	Cached,
	/// The last refresh failed; a previously published value is still served.
	Error,
}

impl fmt::Display for CacheState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoCache => write!(f, "no cache"),
			Self::Fetching => write!(f, "fetching"),
			Self::Cached => write!(f, "cached"),
			Self::Error => write!(f, "error"),
		}
	}
}

/// Cached artifact for one federation endpoint.
///
/// The published value is swapped atomically: readers holding an `Arc` from
/// [`Self::current`] keep a consistent snapshot across refreshes. Refreshes and
/// persisted loads are serialised, so the published value always matches the
/// artifact last written to the store.
pub struct EndpointCache {
	endpoint: String,
	store: Box<dyn CacheStore>,
	fetcher: Option<Box<dyn RemoteFetcher>>,
	refetch_on_incompatible_cache: bool,
	current: ArcSwapOption<SerializedAirflowDefinitionsData>,
	/// Held from reading the previous value until the replacement is published.
	refresh_lock: Mutex<()>,
	state: Mutex<CacheState>,
	last_error: Mutex<Option<String>>,
}

impl EndpointCache {
	pub fn new(endpoint: impl Into<String>, store: Box<dyn CacheStore>) -> Self {
		Self {
			endpoint: endpoint.into(),
			store,
			fetcher: None,
			refetch_on_incompatible_cache: true,
			current: ArcSwapOption::empty(),
			refresh_lock: Mutex::new(()),
			state: Mutex::new(CacheState::NoCache),
			last_error: Mutex::new(None),
		}
	}

	/// Cache for a configured endpoint, stored at its configured file.
	pub fn from_config(config: &FederationConfig, endpoint: &EndpointConfig) -> Self {
		let store = FsCacheStore::new(endpoint.cache_path(&config.cache_dir));
		Self::new(endpoint.name.clone(), Box::new(store)).with_refetch_on_incompatible_cache(config.refetch_on_incompatible_cache)
	}

	pub fn with_fetcher(mut self, fetcher: Box<dyn RemoteFetcher>) -> Self {
		self.fetcher = Some(fetcher);
		self
	}

	pub fn with_refetch_on_incompatible_cache(mut self, enabled: bool) -> Self {
		self.refetch_on_incompatible_cache = enabled;
		self
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn state(&self) -> CacheState {
		*self.state.lock()
	}

	/// Message of the most recent failed refresh, cleared by the next success.
	pub fn last_error(&self) -> Option<String> {
		self.last_error.lock().clone()
	}

	pub fn current(&self) -> Option<Arc<SerializedAirflowDefinitionsData>> {
		self.current.load_full()
	}

	/// The published value, or [`CacheError::NoCache`] when there is none.
	pub fn get(&self) -> Result<Arc<SerializedAirflowDefinitionsData>, CacheError> {
		self.current().ok_or_else(|| CacheError::NoCache {
			endpoint: self.endpoint.clone(),
			cause: None,
		})
	}

	fn set_state(&self, state: CacheState) {
		*self.state.lock() = state;
	}

	fn publish(&self, data: Arc<SerializedAirflowDefinitionsData>) {
		self.current.store(Some(data));
		*self.last_error.lock() = None;
		self.set_state(CacheState::Cached);
	}

	/// Publishes the persisted artifact, if one exists.
	///
	/// A payload from a newer schema is treated as a cache miss when a fetcher is
	/// configured and refetching is enabled, so the next [`Self::refresh`] replaces
	/// it. Otherwise it is returned as an error.
	pub fn load_persisted(&self) -> Result<Option<Arc<SerializedAirflowDefinitionsData>>, CacheError> {
		let _guard = self.refresh_lock.lock();
		match self.store.load() {
			Ok(Some(data)) => {
				let data = Arc::new(data);
				self.publish(Arc::clone(&data));
				Ok(Some(data))
			}
			Ok(None) => Ok(None),
			Err(error) if error.is_schema_version() && self.can_refetch() => {
				warn!(endpoint = %self.endpoint, %error, "ignoring incompatible cache, a refetch is required");
				Ok(None)
			}
			Err(error) => Err(error),
		}
	}

	fn can_refetch(&self) -> bool {
		self.fetcher.is_some() && self.refetch_on_incompatible_cache
	}

	/// Fetches from the remote, persists and publishes the result.
	///
	/// On failure the previously published value stays in place and is returned; with
	/// nothing published the failure surfaces as [`CacheError::NoCache`].
	#[tracing::instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
	pub fn refresh(&self) -> Result<Arc<SerializedAirflowDefinitionsData>, CacheError> {
		let fetcher = self.fetcher.as_ref().ok_or_else(|| CacheError::NoFetcher {
			endpoint: self.endpoint.clone(),
		})?;
		let _guard = self.refresh_lock.lock();
		let previous = self.current();
		self.set_state(CacheState::Fetching);

		match self.fetch_and_store(fetcher.as_ref(), previous.as_deref()) {
			Ok(Some(data)) => {
				let data = Arc::new(data);
				self.publish(Arc::clone(&data));
				info!(keys = data.asset_key_topological_ordering().len(), "replaced cached airflow data");
				Ok(data)
			}
			Ok(None) => match previous {
				Some(previous) => {
					self.set_state(CacheState::Cached);
					Ok(previous)
				}
				None => {
					self.set_state(CacheState::NoCache);
					Err(CacheError::NoCache {
						endpoint: self.endpoint.clone(),
						cause: None,
					})
				}
			},
			Err(error) => {
				*self.last_error.lock() = Some(error.to_string());
				match previous {
					Some(previous) => {
						warn!(%error, "refresh failed, keeping previous cache");
						self.set_state(CacheState::Error);
						Ok(previous)
					}
					None => {
						self.set_state(CacheState::NoCache);
						Err(CacheError::NoCache {
							endpoint: self.endpoint.clone(),
							cause: Some(Box::new(error)),
						})
					}
				}
			}
		}
	}

	fn fetch_and_store(
		&self,
		fetcher: &dyn RemoteFetcher,
		previous: Option<&SerializedAirflowDefinitionsData>,
	) -> Result<Option<SerializedAirflowDefinitionsData>, CacheError> {
		let outcome = fetcher.fetch(&self.endpoint, previous).map_err(|source| CacheError::Fetch {
			endpoint: self.endpoint.clone(),
			source,
		})?;
		match outcome {
			FetchOutcome::Unchanged => Ok(None),
			FetchOutcome::Updated(data) => {
				data.verify_topological_ordering()?;
				self.store.store(&data)?;
				Ok(Some(data))
			}
		}
	}

	/// Publishes persisted data, refreshing when there is none or it is incompatible.
	pub fn load_or_refresh(&self) -> Result<Arc<SerializedAirflowDefinitionsData>, CacheError> {
		match self.load_persisted()? {
			Some(data) => Ok(data),
			None => self.refresh(),
		}
	}
}

impl fmt::Debug for EndpointCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EndpointCache")
			.field("endpoint", &self.endpoint)
			.field("state", &self.state())
			.field("has_fetcher", &self.fetcher.is_some())
			.field("refetch_on_incompatible_cache", &self.refetch_on_incompatible_cache)
			.finish()
	}
}
