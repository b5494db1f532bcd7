//! REST boundary of the agent: `GET /chat?query=<text>`.

use crate::agent::Agent;
use crate::error::Error;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub query: String,
}

/// Error body returned by `/chat`
#[derive(Debug)]
pub struct ChatError(Error);

impl From<Error> for ChatError {
    fn from(e: Error) -> Self {
        ChatError(e)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        log::error!("Chat failed: {}", self.0);
        (status, self.0.to_string()).into_response()
    }
}

async fn handle_chat(
    State(agent): State<Arc<Agent>>,
    Query(params): Query<ChatQuery>,
) -> Result<String, ChatError> {
    log::info!("Query: {}", params.query);
    let answer = agent.ask(params.query).await?;
    Ok(answer)
}

/// HTTP routes of the agent.
pub fn router(agent: Arc<Agent>) -> Router {
    Router::new()
        .route("/chat", get(handle_chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(agent)
}
