use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lazy_static::lazy_static;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::json_rpc::JsonRpcRequest;
use crate::upstream::{ArchiveRpc, UpstreamError};

/// Method served from the cache instead of being forwarded to the archive.
pub const CACHED_METHOD: &str = "validators.get_next_epoch_set";

/// Interval between two scheduled refreshes.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(15);

const EPOCH_SET_SIZE: u64 = 200;
const REFRESH_REQUEST_ID: u64 = 1;

lazy_static! {
    static ref EPOCH_SET_PARAMS: Map<String, Value> = {
        let mut params = Map::new();
        params.insert("size".to_string(), Value::from(EPOCH_SET_SIZE));
        params
    };
}

struct CachedResponse {
    body: Value,
    fetched_at: DateTime<Utc>,
}

/// Holds the last archive response for [`CACHED_METHOD`], keyed by method
/// name. A background task replaces the entry on a fixed schedule; readers
/// always see the last fully-written entry and never wait on a refresh.
pub struct EpochSetCache {
    entries: DashMap<String, CachedResponse>,
    upstream: Arc<dyn ArchiveRpc>,
    refresh_guard: Mutex<()>,
}

impl EpochSetCache {
    pub fn new(upstream: Arc<dyn ArchiveRpc>) -> Self {
        Self {
            entries: DashMap::new(),
            upstream,
            refresh_guard: Mutex::new(()),
        }
    }

    /// The fixed request sent on every refresh.
    pub fn refresh_request() -> JsonRpcRequest {
        JsonRpcRequest::new(
            CACHED_METHOD.to_string(),
            EPOCH_SET_PARAMS.clone(),
            REFRESH_REQUEST_ID,
        )
    }

    /// Fetches the epoch set from the archive and swaps in the new entry.
    ///
    /// A failed fetch leaves the previous entry in place and reports the
    /// error to the caller (the refresh loop) only; readers are never
    /// affected. If a refresh is already in flight the call is skipped
    /// rather than queued, so refreshes never overlap.
    pub async fn refresh(&self) -> Result<(), UpstreamError> {
        let _guard = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("refresh already in flight, skipping");
                return Ok(());
            }
        };

        let body = self.upstream.send(&Self::refresh_request()).await?;

        self.entries.insert(
            CACHED_METHOD.to_string(),
            CachedResponse {
                body,
                fetched_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// Returns the last stored response for `method` without touching the
    /// archive. `None` until the first successful refresh.
    pub fn get(&self, method: &str) -> Option<Value> {
        self.entries.get(method).map(|entry| entry.body.clone())
    }

    pub fn last_refreshed_at(&self, method: &str) -> Option<DateTime<Utc>> {
        self.entries.get(method).map(|entry| entry.fetched_at)
    }
}
