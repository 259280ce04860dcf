use std::sync::Arc;

use crate::args::Args;
use crate::cache::EpochSetCache;
use crate::metrics::Metrics;
use crate::upstream::{ArchiveClient, ArchiveRpc};

const METRICS_PREFIX: &str = "cached_archive_rpc";

/// Everything the routes and the refresh task share, constructed once at
/// startup and handed around by reference.
pub struct AppState {
    pub upstream: Arc<dyn ArchiveRpc>,
    pub cache: Arc<EpochSetCache>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let client = ArchiveClient::new(args.archive_endpoint.clone())?;

        Ok(Self::with_upstream(Arc::new(client)))
    }

    pub fn with_upstream(upstream: Arc<dyn ArchiveRpc>) -> Self {
        Self {
            cache: Arc::new(EpochSetCache::new(upstream.clone())),
            upstream,
            metrics: Metrics::new(METRICS_PREFIX),
        }
    }
}
