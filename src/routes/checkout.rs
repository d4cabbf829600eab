use axum::{Json, extract::State};
use tracing::info;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::models::order::{OrderProjection, normalize_tier};
use crate::payments::CheckoutIntent;
use crate::pricing::calculate_charge;
use crate::state::AppState;
use crate::store::{self, PaymentConfirmation};

#[derive(Debug, Clone, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub package_id: String,
    #[validate(length(min = 1, message = "packageName is required"))]
    pub package_name: String,
    #[validate(range(min = 0.01, message = "basePrice must be positive"))]
    pub base_price: f64,
    #[validate(length(min = 1, message = "paymentType is required"))]
    pub payment_type: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub session_id: String,
    pub url: Option<String>,
}

/// POST /checkout — prices the selected package/plan and opens a processor
/// session for the client-side redirect. Nothing is persisted here; the order
/// row only appears once the payment is confirmed, so an abandoned checkout
/// leaves nothing behind.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(input): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    input.validate()?;

    let charge = calculate_charge(&input.package_name, input.base_price, &input.payment_type)?;

    let intent = CheckoutIntent {
        package_id: input.package_id,
        package_name: input.package_name,
        base_price: input.base_price,
        payment_type: input.payment_type,
        amount_cents: charge.amount_cents,
        description: charge.description,
    };
    let session = state.payments.create_checkout_session(&intent).await?;

    info!("checkout session created: {}", session.id);

    Ok(Json(CheckoutResponse {
        success: true,
        session_id: session.id,
        url: session.url,
    }))
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub portal_token: Option<String>,
    pub order: OrderProjection,
}

/// POST /checkout/confirm — called from the success page after the processor
/// redirect. Verifies the session is actually paid, then applies the payment
/// idempotently (replays and double-clicks return the same order and token).
pub async fn confirm_checkout(
    State(state): State<AppState>,
    Json(input): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>> {
    let session = state.payments.retrieve_session(&input.session_id).await?;

    if !session.paid {
        return Err(Error::PaymentNotCompleted);
    }

    let meta = |key: &str| session.metadata.get(key).cloned();
    let customer_email = session
        .customer_email
        .clone()
        .or_else(|| meta("customerEmail"))
        .ok_or_else(|| Error::Upstream("session has no customer email".to_string()))?;
    let customer_name = meta("customerName")
        .filter(|name| !name.is_empty())
        .or_else(|| session.customer_name.clone())
        .unwrap_or_default();

    let tier_input = meta("tier").or_else(|| meta("packageId"));
    let conf = PaymentConfirmation {
        session_id: session.id.clone(),
        payment_intent: None,
        amount_cents: session.amount_total,
        customer_name,
        customer_email,
        business_name: meta("business").filter(|b| !b.is_empty()),
        package_id: meta("packageId"),
        package_name: meta("packageName"),
        base_price: meta("basePrice").and_then(|p| p.parse().ok()),
        payment_type: meta("paymentType"),
        tier: normalize_tier(tier_input.as_deref()),
        quote_id: meta("quoteId").filter(|q| !q.is_empty()),
    };

    let order = store::record_payment(&state.sdb, conf).await?;

    Ok(Json(ConfirmResponse {
        success: true,
        portal_token: order.portal_token.clone(),
        order: OrderProjection::from(&order),
    }))
}
