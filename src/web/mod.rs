//! Web UI.
//!
//! Routes:
//! - `GET /`        - the question form
//! - `POST /ask`    - answer a form-encoded `question`
//! - `GET /health`  - liveness check

pub mod page;

use crate::error::{AskError, Result};
use crate::pipeline::Assistant;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

pub use page::{escape_html, EMPTY_MESSAGE};

/// Form payload of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// Builds the router over a shared assistant.
pub fn router(assistant: Arc<Assistant>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .with_state(assistant)
}

/// Binds `addr` and serves the UI until the process is stopped.
pub async fn serve(assistant: Arc<Assistant>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AskError::config(format!("Cannot listen on {addr}: {e}")))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, router(assistant))
        .await
        .map_err(|e| AskError::internal(format!("Server stopped: {e}")))
}

async fn index() -> Html<String> {
    Html(page::render("", page::Body::Blank))
}

async fn ask(State(assistant): State<Arc<Assistant>>, Form(form): Form<AskForm>) -> Response {
    match assistant.ask(&form.question).await {
        Ok(answer) => Html(page::render(&form.question, page::Body::Answer(&answer))).into_response(),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            (
                StatusCode::BAD_GATEWAY,
                Html(page::render(&form.question, page::Body::Error(&e))),
            )
                .into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
