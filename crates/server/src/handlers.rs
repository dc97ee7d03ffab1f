//! # Request Handlers
//!
//! The webhook the messaging transport calls for every verified inbound
//! message, plus liveness probes and a retrieval debug endpoint.

use crate::{errors::AppError, state::AppState};
use axum::{extract::State, Json};
use docbot::{chat::InboundMessage, search::retrieve, types::RetrievedChunk};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The root handler.
pub async fn root() -> &'static str {
    "docbot server is running."
}

/// The health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}

/// One verified inbound message from the transport. Signature checking has
/// already happened on the transport's side of this hop.
#[derive(Deserialize)]
pub struct WebhookRequest {
    pub user_id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    pub text: String,
}

/// The reply handed back to the transport for delivery.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub reply: String,
}

/// The handler for the `/webhook` endpoint.
///
/// Always answers with 200 and a reply body: per-message failures inside the
/// engine are downgraded to an apology text, never a dropped message.
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<WebhookRequest>,
) -> Json<WebhookResponse> {
    info!("Received message from user: {}", payload.user_id);

    let msg = InboundMessage {
        user_id: payload.user_id,
        message_id: payload.message_id,
        text: payload.text,
    };
    let reply = app_state.engine.handle_message(&msg).await;

    Json(WebhookResponse { reply })
}

/// The request body for the `/retrieve` endpoint.
#[derive(Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
    #[serde(default)]
    pub k: Option<u32>,
}

/// The handler for the `/retrieve` endpoint: runs the retrieval stage alone,
/// for inspecting what context a question would be grounded on.
pub async fn retrieve_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RetrieveRequest>,
) -> Result<Json<Vec<RetrievedChunk>>, AppError> {
    info!("Received retrieve request for query: {}", payload.query);

    let k = payload.k.unwrap_or(app_state.config.retrieval_k);
    let results = retrieve(
        &app_state.index,
        app_state.embedder.as_ref(),
        &payload.query,
        k,
    )
    .await?;

    Ok(Json(results))
}
