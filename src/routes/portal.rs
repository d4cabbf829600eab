use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::error;

use crate::errors::{Error, Result};
use crate::models::order::OrderProjection;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct VerifyTokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyTokenResponse {
    pub success: bool,
    pub order: OrderProjection,
}

/// GET /portal/verify-token?token= — the sole gate for every portal page.
/// The response for a missing, malformed or unknown token is byte-identical.
pub async fn verify_token(
    State(state): State<AppState>,
    Query(query): Query<VerifyTokenQuery>,
) -> Result<Json<VerifyTokenResponse>> {
    let token = query.token.unwrap_or_default();

    let order = store::find_by_token(&state.sdb, &token)
        .await?
        .ok_or(Error::TokenNotFound)?;

    Ok(Json(VerifyTokenResponse {
        success: true,
        order: OrderProjection::from(&order),
    }))
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SaveIntakeRequest {
    pub token: String,
    pub answers: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SaveIntakeResponse {
    pub success: bool,
    pub submitted: bool,
    pub message: String,
}

/// POST /portal/save-intake — autosave (`submit=false`) or terminal submit.
/// The submit path persists the answers and advances the order in one atomic
/// write, then fires the confirmation emails (best-effort).
pub async fn save_intake(
    State(state): State<AppState>,
    Json(input): Json<SaveIntakeRequest>,
) -> Result<Json<SaveIntakeResponse>> {
    if input.submit {
        let order = store::submit_intake(&state.sdb, &input.token, &input.answers).await?;

        if let Err(err) = state.mailer.intake_received(&order).await {
            error!("failed to send intake confirmation email: {err}");
        }

        Ok(Json(SaveIntakeResponse {
            success: true,
            submitted: true,
            message: "Questionnaire submitted successfully".to_string(),
        }))
    } else {
        store::save_intake_draft(&state.sdb, &input.token, &input.answers).await?;

        Ok(Json(SaveIntakeResponse {
            success: true,
            submitted: false,
            message: "Draft saved".to_string(),
        }))
    }
}
