//! Push delivery endpoint for transaction events.
//!
//! The message transport POSTs one envelope per delivery attempt and
//! retries (with backoff) on any non-2xx response. The status code is
//! therefore the acknowledgement signal:
//! - processed or unprocessable-forever -> 2xx, delivery stops
//! - transient failure -> 500, transport redelivers
//! - not a push envelope at all -> 400, the caller is misconfigured

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::AppState;

/// Push envelope as delivered by the transport.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    /// The wrapped message; absent on malformed requests.
    #[serde(default)]
    pub message: Option<PushMessage>,
    /// Subscription the delivery came from.
    #[serde(default)]
    pub subscription: Option<String>,
}

/// The message within a push envelope.
#[derive(Debug, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded event payload.
    #[serde(default)]
    pub data: Option<String>,
    /// Transport-assigned message id.
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
}

/// POST `/internal/pubsub/transactions` - receive one pushed delivery.
async fn receive_transaction(
    State(state): State<AppState>,
    Json(envelope): Json<PushEnvelope>,
) -> Response {
    let Some(message) = envelope.message else {
        return (StatusCode::BAD_REQUEST, "Bad Request: no message").into_response();
    };
    let Some(data) = message.data else {
        return (StatusCode::BAD_REQUEST, "Bad Request: no data").into_response();
    };

    debug!(
        message_id = message.message_id.as_deref().unwrap_or("-"),
        subscription = envelope.subscription.as_deref().unwrap_or("-"),
        "received transaction delivery"
    );

    let payload = match STANDARD.decode(data.as_bytes()) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "dropping delivery with corrupt base64 data");
            return StatusCode::NO_CONTENT.into_response();
        }
    };

    match state.processor.process(&payload).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) if !err.is_retryable() => {
            warn!(error = %err, "dropping unprocessable delivery");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            error!(error = %err, "processing failed, requesting redelivery");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Creates the event delivery routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/internal/pubsub/transactions", post(receive_transaction))
}
