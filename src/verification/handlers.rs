use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    error::AppError,
    state::AppState,
    validate::require,
    verification::{
        dto::{CodeField, SendCodeRequest, VerifyCodeRequest},
        store::generate_code,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/send-code", post(send_code))
        .route("/verify-code", post(verify_code))
}

#[instrument(skip(state, payload))]
pub async fn send_code(
    State(state): State<AppState>,
    Json(payload): Json<SendCodeRequest>,
) -> Result<Json<Value>, AppError> {
    let email = require(&payload.email, "email")?;

    let code = generate_code();
    // Stored before the send; a delivery failure leaves the code pending.
    state.codes.put(email, code).await;

    state
        .mailer
        .send(
            email,
            "Email Verification",
            &format!("Your verification code is: {}", code),
        )
        .await
        .map_err(|e| {
            error!(error = %e, email = %email, "verification mail delivery failed");
            AppError::Upstream("Failed to send email.".into())
        })?;

    info!(email = %email, "verification code sent");
    Ok(Json(json!({ "message": "Verification code sent." })))
}

#[instrument(skip(state, payload))]
pub async fn verify_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<Json<Value>, AppError> {
    let email = require(&payload.email, "email")?;
    if payload.code.is_none() {
        return Err(AppError::Validation("code is required".into()));
    }

    let Some(code) = payload.code.as_ref().and_then(CodeField::as_code) else {
        return Err(AppError::Validation("Invalid code.".into()));
    };

    if state.codes.consume(email, code).await {
        info!(email = %email, "email verified");
        Ok(Json(json!({ "message": "Email verified." })))
    } else {
        warn!(email = %email, "verification code mismatch");
        Err(AppError::Validation("Invalid code.".into()))
    }
}
