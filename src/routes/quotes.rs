use axum::{Json, extract::State};
use tracing::error;
use validator::Validate;

use crate::errors::Result;
use crate::models::order::normalize_tier;
use crate::state::AppState;
use crate::store::{self, NewQuote};

#[derive(Debug, Clone, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "business is required"))]
    pub business: String,
    pub phone: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub base_price: Option<f64>,
    pub payment_type: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub success: bool,
    pub quote_id: String,
    pub message: String,
}

/// POST /quotes — public quote-request form. Creates a pending order (no
/// portal token; that only comes with payment) and notifies the business.
pub async fn submit_quote(
    State(state): State<AppState>,
    Json(input): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    input.validate()?;

    let tier = normalize_tier(input.package_id.as_deref());
    let quote = NewQuote {
        customer_name: input.name,
        customer_email: input.email,
        business_name: Some(input.business),
        phone: input.phone,
        package_id: input.package_id,
        package_name: input.package_name,
        base_price: input.base_price,
        payment_type: input.payment_type,
        message: input.message,
        source: input.source,
        tier,
    };
    let order = store::create_quote(&state.sdb, quote).await?;

    if let Err(err) = state.mailer.quote_notification(&order).await {
        error!("failed to send quote notification email: {err}");
    }

    Ok(Json(QuoteResponse {
        success: true,
        quote_id: order.id.to_string(),
        message: "Quote request received successfully".to_string(),
    }))
}
