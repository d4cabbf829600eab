use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, warn};

use crate::consts::order_const::ADMIN_COOKIE;
use crate::errors::{Error, Result};
use crate::models::order::{Order, OrderStatus, PaymentStatus};
use crate::models::stats::DashboardStats;
use crate::pricing::calculate_charge;
use crate::state::AppState;
use crate::store::{self, QuoteQuery};
use crate::utils::record_id::order_record_id;
use crate::utils::secrets::{admin_session_token, constant_time_eq, sha256_hex};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OkResponse {
    pub success: bool,
}

/// POST /admin/login — compares the hash of the supplied password against the
/// hash of the configured shared secret and sets the session cookie on match.
/// The cookie value is deterministic, so it stays valid until the secret
/// itself is rotated. No lockout or backoff on repeated failures.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> Result<(CookieJar, Json<OkResponse>)> {
    let expected = admin_session_token(&state.config.admin_password);
    let supplied = sha256_hex(&input.password);

    if !constant_time_eq(supplied.as_bytes(), expected.as_bytes()) {
        warn!("admin login rejected");
        return Err(Error::Unauthorized);
    }

    let cookie = Cookie::build((ADMIN_COOKIE, expected))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("admin logged in");
    Ok((jar.add(cookie), Json(OkResponse { success: true })))
}

/// POST /admin/logout — clears the session cookie. The deterministic token
/// itself cannot be revoked short of rotating the shared secret.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    let cookie = Cookie::build((ADMIN_COOKIE, "")).path("/");
    (jar.remove(cookie), Json(OkResponse { success: true }))
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OrdersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub quotes: Vec<Order>,
    pub pagination: Pagination,
    pub stats: DashboardStats,
}

/// GET /admin/orders — the dashboard table plus aggregate stats. The table
/// honours filter/search/sort/pagination; the stats are always global.
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);

    let quote_query = QuoteQuery {
        limit,
        offset,
        sort: query.sort.unwrap_or_else(|| "created_at".to_string()),
        order: query.order.unwrap_or_else(|| "DESC".to_string()),
        status: query.status,
        search: query.search,
    };

    let (quotes, total) = store::list_quotes(&state.sdb, &quote_query).await?;
    let stats = store::dashboard_stats(&state.sdb).await?;

    Ok(Json(OrdersResponse {
        success: true,
        quotes,
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: total > offset + limit,
        },
        stats,
    }))
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub quote: Order,
}

/// POST /admin/orders/{id}/status — direct override of the workflow status.
/// Deliberately unconstrained: staff may revert or skip stages.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let status = OrderStatus::parse(&input.status)
        .ok_or_else(|| Error::InvalidInput("Invalid status".to_string()))?;

    let rid = order_record_id(&id);
    let quote = store::set_status(&state.sdb, &rid, status).await?;
    info!("order {} status set to {}", quote.id, status);

    Ok(Json(OrderResponse {
        success: true,
        quote,
    }))
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: String,
}

/// POST /admin/orders/{id}/payment-status — invoice state only; the workflow
/// status is untouched.
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let payment_status = PaymentStatus::parse(&input.payment_status)
        .ok_or_else(|| Error::InvalidInput("Invalid status".to_string()))?;

    let rid = order_record_id(&id);
    let quote = store::set_payment_status(&state.sdb, &rid, payment_status).await?;

    Ok(Json(OrderResponse {
        success: true,
        quote,
    }))
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreviewRequest {
    pub preview_url: String,
}

/// POST /admin/orders/{id}/preview — attach the build-in-progress preview URL
/// shown on the customer's portal.
pub async fn update_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePreviewRequest>,
) -> Result<Json<OrderResponse>> {
    let url = input.preview_url.trim().to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::InvalidInput("Invalid preview URL".to_string()));
    }

    let rid = order_record_id(&id);
    let quote = store::set_preview_url(&state.sdb, &rid, url).await?;

    Ok(Json(OrderResponse {
        success: true,
        quote,
    }))
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PaymentRequestResponse {
    pub success: bool,
    pub url: String,
}

/// POST /admin/orders/{id}/payment-request — prices the quote, creates a
/// hosted payment link carrying the quote id (so a later confirmation mints
/// the portal token on this row), and emails it to the customer.
pub async fn send_payment_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentRequestResponse>> {
    let rid = order_record_id(&id);
    let order = store::find_by_id(&state.sdb, &rid)
        .await?
        .ok_or(Error::NotFound)?;

    let base_price = order
        .base_price
        .ok_or_else(|| Error::InvalidInput("Quote has no price set".to_string()))?;
    let payment_type = order.payment_type.clone().unwrap_or_else(|| "full".to_string());
    let package_name = order
        .package_name
        .clone()
        .unwrap_or_else(|| "Website".to_string());

    let charge = calculate_charge(&package_name, base_price, &payment_type)?;

    let mut metadata = HashMap::new();
    metadata.insert("quoteId".to_string(), order.id.to_string());
    metadata.insert("customerName".to_string(), order.customer_name.clone());
    metadata.insert("customerEmail".to_string(), order.customer_email.clone());
    metadata.insert("packageName".to_string(), package_name);
    metadata.insert("paymentType".to_string(), payment_type);

    let link = state
        .payments
        .create_payment_link(charge.amount_cents, &charge.description, &metadata)
        .await?;

    store::set_payment_link(&state.sdb, &rid, link.id.clone()).await?;

    if let Err(err) = state
        .mailer
        .payment_request(&order, &link.url, charge.amount_cents)
        .await
    {
        error!("failed to send payment request email: {err}");
    }

    info!("payment request sent for order {}", order.id);

    Ok(Json(PaymentRequestResponse {
        success: true,
        url: link.url,
    }))
}
