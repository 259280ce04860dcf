use actix_web::{web, Error, HttpResponse};
use prometheus::{Counter, Encoder, IntCounterVec, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    pub registry: Registry,
    pub cache_hit_counter: Counter,
    pub cache_miss_counter: Counter,
    pub refresh_failure_counter: Counter,
    pub error_counter: Counter,
    pub method_call_counter: IntCounterVec,
    pub last_refresh_gauge: IntGauge,
}

// Function to add a prefix to the metric names
fn add_prefix(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name)
}

fn register_counter_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
) -> Counter {
    let name = add_prefix(prefix, name);
    let opts = prometheus::Opts::new(name, description);
    let counter = prometheus::Counter::with_opts(opts).unwrap();
    registry.register(Box::new(counter.clone())).unwrap();
    counter
}

fn register_int_counter_vec_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
    labels: &[&str],
) -> IntCounterVec {
    let name = add_prefix(prefix, name);
    let opts = prometheus::Opts::new(name, description);
    let counter_vec = IntCounterVec::new(opts, labels).unwrap();
    registry.register(Box::new(counter_vec.clone())).unwrap();
    counter_vec
}

fn register_int_gauge_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
) -> IntGauge {
    let name = add_prefix(prefix, name);
    let opts = prometheus::Opts::new(name, description);
    let gauge = IntGauge::with_opts(opts).unwrap();
    registry.register(Box::new(gauge.clone())).unwrap();
    gauge
}

impl Metrics {
    pub fn new(prefix: &str) -> Self {
        let registry = Registry::new();

        let cache_hit_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_hit_total",
            "Total number of requests served from the refreshed cache.",
        );
        let cache_miss_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_miss_total",
            "Total number of cached-method requests before the first successful refresh.",
        );
        let refresh_failure_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "refresh_failure_total",
            "Total number of background refreshes that failed.",
        );
        let error_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "error_total",
            "Total number of passthrough requests that failed upstream.",
        );
        let method_call_counter = register_int_counter_vec_with_prefix(
            &registry,
            prefix,
            "method_call_total",
            "Total number of method calls by serving source",
            &["method", "source"],
        );
        let last_refresh_gauge = register_int_gauge_with_prefix(
            &registry,
            prefix,
            "last_refresh_timestamp_seconds",
            "Unix timestamp of the last successful cache refresh.",
        );

        Self {
            registry,
            cache_hit_counter,
            cache_miss_counter,
            refresh_failure_counter,
            error_counter,
            method_call_counter,
            last_refresh_gauge,
        }
    }
}

// Metrics handler
#[actix_web::get("/metrics")]
pub async fn metrics(data: web::Data<crate::app_state::AppState>) -> Result<HttpResponse, Error> {
    let encoder = TextEncoder::new();
    let metric_families = data.metrics.registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(buffer))
}
