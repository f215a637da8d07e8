//! KMB open-data stop directory.
//!
//! Two endpoints are used: the full stop list and per-stop arrival
//! predictions. Both return `{ "data": [...] }` envelopes. The list is
//! fetched fresh on every browse and held by [`StopDirectory`] only
//! so that search can run against what the user is looking at.

mod client;
mod error;
mod stops;
mod types;

pub use client::{DirectoryClient, DirectoryConfig};
pub use error::NetworkError;
pub use stops::{BROWSE_PAGE_SIZE, MIN_QUERY_CHARS, SEARCH_LIMIT, StopDirectory};
pub use types::{EtaDto, EtaResponse, StopDto, StopListResponse};
