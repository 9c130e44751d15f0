//! HTTP server for the salestrend API.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                              |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/health`      | Health check                             |
//! | POST   | `/api/analyze` | Upload a `.csv`/`.xlsx` file and analyze |
//! | GET    | `/api/logs`    | SSE stream of pipeline logs              |

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{log_info, log_job, log_success, LogLevel, Stage, LOG_BROADCASTER};
use super::types::{error_response, AnalyzeParams, AnalyzeResponse};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::transform::pipeline::{analyze_bytes, AnalysisOptions};

type ApiError = (StatusCode, Json<Value>);

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze_upload))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}

/// Start the HTTP server.
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let addr = config.socket_addr();
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_success(Stage::Server, format!("Listening on http://{}", addr));
    log_info(Stage::Server, "POST /api/analyze - upload a .csv or .xlsx file");
    log_info(Stage::Server, "GET  /api/logs    - SSE log stream");
    log_info(Stage::Server, "GET  /health      - health check");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salestrend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /api/analyze",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Multipart upload: `file` plus optional `minPurchases` / `topN` fields.
async fn analyze_upload(mut multipart: Multipart) -> Result<Json<AnalyzeResponse>, ApiError> {
    let job_id = Uuid::new_v4().to_string();
    let bad_request = |msg: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&job_id, &msg)),
        )
    };

    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut params = AnalyzeParams::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {}", e)))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "minPurchases" | "topN" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {}", e)))?;
                if name == "topN" {
                    params.top_n = Some(text);
                } else {
                    params.min_purchases = Some(text);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| bad_request("No file provided".to_string()))?;
    let options = parse_options(&params).map_err(|e| bad_request(e.to_string()))?;

    log_job(
        LogLevel::Info,
        Stage::Server,
        &job_id,
        format!("Received {} ({} bytes)", file_name, bytes.len()),
    );

    let result = tokio::task::spawn_blocking(move || analyze_bytes(&file_name, &bytes, &options))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
        .and_then(|r| r.map_err(ServerError::from));

    match result {
        Ok(run) => {
            log_job(LogLevel::Success, Stage::Server, &job_id, "Analysis complete");
            Ok(Json(AnalyzeResponse::new(job_id, run)))
        }
        Err(e) => {
            log_job(LogLevel::Error, Stage::Server, &job_id, format!("Analysis failed: {}", e));
            let status = status_for(&e);
            Err((status, Json(error_response(&job_id, &e.to_string()))))
        }
    }
}

/// Form parameters to options; absent fields take the defaults.
fn parse_options(params: &AnalyzeParams) -> ServerResult<AnalysisOptions> {
    let defaults = AnalysisOptions::default();
    let parse = |name: &str, raw: &Option<String>, default: i64| -> ServerResult<i64> {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(text) => text
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("{} must be an integer, got '{}'", name, text))),
        }
    };

    Ok(AnalysisOptions {
        min_purchases: parse("minPurchases", &params.min_purchases, defaults.min_purchases)?,
        top_n: parse("topN", &params.top_n, defaults.top_n)?,
    })
}

fn status_for(error: &ServerError) -> StatusCode {
    match error {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
