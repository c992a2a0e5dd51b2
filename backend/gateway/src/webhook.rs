//! Webhook handler.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use exambot_core::Update;
use tracing::{debug, warn};

use crate::server::{not_found, GatewayState};

/// Accepts GET or POST with a JSON update body.
///
/// The response status only reflects transport-level problems: a malformed
/// body is a 400, and everything that goes wrong after decoding is reported
/// to the user in chat while the platform still gets a 200.
pub async fn handle_update(
    State(state): State<GatewayState>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::GET && method != Method::POST {
        debug!(%method, "Rejected webhook method");
        return not_found().await.into_response();
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Failed to parse update");
            return (StatusCode::BAD_REQUEST, "failed to parse update").into_response();
        }
    };

    let outcome = state.dispatcher.handle(&update).await;
    debug!(?outcome, chat_id = update.chat_id(), "Update handled");
    StatusCode::OK.into_response()
}
