use actix_web::{error, web, App, Error, HttpResponse, HttpServer};
use clap::Parser;
use env_logger::Env;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::args::Args;
use crate::json_rpc::{DefinedError, JsonRpcErrorResponse, JsonRpcRequest};

mod app_state;
mod args;
mod cache;
mod dispatch;
mod json_rpc;
mod metrics;
mod upstream;

#[actix_web::post("/archive")]
async fn archive_call(
    data: web::Data<AppState>,
    body: web::Json<JsonRpcRequest>,
) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    let request_id = request.id;

    if request.method.is_empty() {
        return JsonRpcErrorResponse::new(Some(request_id), DefinedError::InvalidRequest).into();
    }

    match dispatch::handle(&data, request).await {
        Ok(Some(body)) => Ok(HttpResponse::Ok().json(body)),

        // designated method before the first successful refresh
        Ok(None) => Ok(HttpResponse::Ok().json(Value::Null)),

        Err(err) => {
            tracing::error!("fail to forward request to archive: {err}");

            JsonRpcErrorResponse::new(
                Some(request_id),
                DefinedError::InternalError(Some(json!({
                    "error": "fail to forward request to archive",
                    "reason": err.to_string(),
                }))),
            )
            .into()
        }
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let defined_error = match &err {
            error::JsonPayloadError::Deserialize(err) if err.is_data() => {
                DefinedError::InvalidRequest
            }
            _ => DefinedError::InvalidJson,
        };

        let response: HttpResponse = JsonRpcErrorResponse::new(None, defined_error).into();
        error::InternalError::from_response(err, response).into()
    })
}

/// Refreshes the cache once at startup and then every [`cache::REFRESH_PERIOD`].
/// A hung fetch delays the next tick; it never tears down the task.
fn spawn_refresh_task(state: web::Data<AppState>) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(cache::REFRESH_PERIOD);

        loop {
            ticker.tick().await;

            match state.cache.refresh().await {
                Ok(()) => {
                    if let Some(at) = state.cache.last_refreshed_at(cache::CACHED_METHOD) {
                        state.metrics.last_refresh_gauge.set(at.timestamp());
                    }

                    tracing::info!("refreshed cache for method {}", cache::CACHED_METHOD);
                }
                Err(err) => {
                    state.metrics.refresh_failure_counter.inc();
                    tracing::warn!("fail to refresh cache, keeping previous entry: {err}");
                }
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    let app_state = AppState::new(&args).expect("fail to create app state");
    let app_state = web::Data::new(app_state);

    tracing::info!(
        "Forwarding uncached methods to archive endpoint {}",
        args.archive_endpoint
    );

    spawn_refresh_task(app_state.clone());

    tracing::info!("Server listening on {}:{}", args.bind, args.port);

    {
        let app_state = app_state.clone();

        HttpServer::new(move || {
            App::new()
                .app_data(json_config())
                .app_data(app_state.clone())
                .service(archive_call)
                .service(metrics::metrics)
        })
        .bind((args.bind, args.port))?
        .run()
        .await?;
    }

    tracing::info!("Server stopped");

    Ok(())
}
