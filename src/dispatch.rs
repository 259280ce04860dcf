use serde_json::Value;

use crate::app_state::AppState;
use crate::cache::CACHED_METHOD;
use crate::json_rpc::JsonRpcRequest;
use crate::upstream::UpstreamError;

/// Routes a request either to the refreshing cache or straight to the
/// archive.
///
/// `Ok(None)` means the designated method was asked for before the first
/// successful refresh; the HTTP layer renders it as a `null` body. There is
/// deliberately no live-upstream fallback for that window.
pub async fn handle(
    state: &AppState,
    request: JsonRpcRequest,
) -> Result<Option<Value>, UpstreamError> {
    if request.method == CACHED_METHOD {
        let cached = state.cache.get(&request.method);

        match &cached {
            Some(_) => {
                tracing::info!("cache hit for method {}", request.method);
                state.metrics.cache_hit_counter.inc();
            }
            None => {
                tracing::info!("cache not yet populated for method {}", request.method);
                state.metrics.cache_miss_counter.inc();
            }
        }

        state
            .metrics
            .method_call_counter
            .with_label_values(&[&request.method, "cache"])
            .inc();

        return Ok(cached);
    }

    state
        .metrics
        .method_call_counter
        .with_label_values(&[&request.method, "upstream"])
        .inc();

    match state.upstream.send(&request).await {
        Ok(body) => Ok(Some(body)),
        Err(err) => {
            state.metrics.error_counter.inc();
            Err(err)
        }
    }
}
