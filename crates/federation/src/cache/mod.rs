//! Persisted cache artifacts and the per-endpoint refresh state machine.
//!
//! ```text
//! NoCache ──refresh──▶ Fetching ──ok──▶ Cached ──refresh──▶ Fetching ──ok──▶ Cached
//!                          │                                    │
//!                          └──err──▶ NoCache (error returned)   └──err──▶ Error (previous value kept)
//! ```

mod state;
mod store;

pub use state::{CacheState, EndpointCache, FetchOutcome, RemoteFetcher};
pub use store::{CacheStore, FsCacheStore, write_atomic};
