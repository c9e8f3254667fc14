// SPDX-License-Identifier: MIT

//! HTTP front end for both pipelines

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adk::error::{ResearcherError, WorkflowError};
use crate::researcher::pipelines::leads::{LeadContext, LeadInput, LeadState};
use crate::researcher::pipelines::research::{ResearchContext, ResearchInput, ResearchState};
use crate::researcher::tools::{Mailer, ResultsEmail};
use crate::researcher::workflow::graph::CompiledGraph;
use crate::researcher::workflow::state::Outcome;

/// Shared by every request
pub struct AppState {
    pub research_graph: Arc<CompiledGraph<ResearchState, ResearchContext>>,
    pub research_ctx: Arc<ResearchContext>,
    pub lead_graph: Arc<CompiledGraph<LeadState, LeadContext>>,
    pub lead_ctx: Arc<LeadContext>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub request_timeout: Duration,
}

/// Request failure mapped to an HTTP status
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Run exceeded the {0}s deadline")]
    Timeout(u64),

    #[error("Execution failed: {0}")]
    Workflow(#[from] WorkflowError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) | ApiError::Workflow(WorkflowError::InvalidInput(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/research", post(run_research))
        .route("/api/research/stream", post(stream_research))
        .route("/api/leads", post(run_leads))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, port: u16) -> Result<(), ResearcherError> {
    let app = router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Split off `recipient_email`, then parse the rest strictly
fn parse_request<T: DeserializeOwned>(mut body: Value) -> Result<(T, Option<String>), ApiError> {
    let field = body
        .as_object_mut()
        .and_then(|o| o.remove("recipient_email"));
    let recipient = match field {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            return Err(ApiError::InvalidInput(format!(
                "recipient_email must be a string, got {}",
                other
            )));
        }
    };
    let input = serde_json::from_value(body).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    Ok((input, recipient))
}

async fn with_deadline<T>(
    timeout: Duration,
    run: impl Future<Output = Result<T, WorkflowError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(timeout, run).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            log::error!("Run exceeded the {}s deadline", timeout.as_secs());
            Err(ApiError::Timeout(timeout.as_secs()))
        }
    }
}

async fn run_research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (input, recipient): (ResearchInput, _) = parse_request(body)?;
    let execution_id = uuid::Uuid::new_v4().to_string();
    let topic = input.topic.clone();
    log::info!("Starting research execution {} on: {}", execution_id, topic);

    let output = with_deadline(
        state.request_timeout,
        state.research_graph.invoke(input, &state.research_ctx),
    )
    .await?;

    if let (Some(to), Some(mailer)) = (recipient, state.mailer.clone()) {
        let podcast = output.podcast_url.as_ref().and_then(Outcome::ready);
        let email = ResultsEmail {
            to,
            topic,
            report: output.report.as_ref().and_then(Outcome::ready).cloned(),
            podcast: podcast.cloned(),
        };
        tokio::spawn(async move {
            match mailer.send(&email).await {
                Ok(()) => log::info!("Results e-mailed to {}", email.to),
                Err(e) => log::error!("Failed to e-mail results to {}: {}", email.to, e),
            }
        });
    }

    let output = serde_json::to_value(&output).map_err(WorkflowError::Output)?;
    Ok(Json(json!({
        "execution_id": execution_id,
        "status": "completed",
        "output": output
    })))
}

async fn run_leads(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (input, _): (LeadInput, Option<String>) = parse_request(body)?;
    let execution_id = uuid::Uuid::new_v4().to_string();
    log::info!(
        "Starting lead execution {} for: {}",
        execution_id,
        input.company_name
    );

    let output = with_deadline(
        state.request_timeout,
        state.lead_graph.invoke(input, &state.lead_ctx),
    )
    .await?;

    let output = serde_json::to_value(&output).map_err(WorkflowError::Output)?;
    Ok(Json(json!({
        "execution_id": execution_id,
        "status": "completed",
        "output": output
    })))
}

/// Terminal SSE payload of a failed run
fn error_event<E: Display>(e: E) -> Value {
    json!({ "event": "error", "message": e.to_string() })
}

async fn stream_research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (input, _): (ResearchInput, Option<String>) = parse_request(body)?;
    let (tx, rx) = mpsc::channel::<Value>(100);

    tokio::spawn(async move {
        log::info!("Starting streaming research on: {}", input.topic);
        let timeout = state.request_timeout;
        let graph = state.research_graph.clone();
        let ctx = state.research_ctx.clone();

        let forward = async {
            let mut events = Box::pin(graph.stream(input, &ctx));
            while let Some(event) = events.next().await {
                let value = match event {
                    Ok(event) => serde_json::to_value(&event).unwrap_or_else(error_event),
                    Err(e) => error_event(e),
                };
                if tx.send(value).await.is_err() {
                    log::warn!("Stream client disconnected");
                    return;
                }
            }
        };

        if tokio::time::timeout(timeout, forward).await.is_err() {
            log::error!("Streaming run exceeded the {}s deadline", timeout.as_secs());
            let timed_out = error_event(ApiError::Timeout(timeout.as_secs()));
            let _ = tx.send(timed_out).await;
        }
        log::info!("Streaming research finished");
    });

    let stream = ReceiverStream::new(rx).map(|value| {
        Ok(Event::default()
            .json_data(&value)
            .unwrap_or_else(|_| Event::default().data(value.to_string())))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1))))
}
