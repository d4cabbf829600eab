use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{middleware::admin_auth_middleware, state::AppState};

pub mod admin;
pub mod checkout;
pub mod portal;
pub mod quotes;

pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/checkout", post(checkout::create_checkout))
        .route("/checkout/confirm", post(checkout::confirm_checkout))
        .route("/quotes", post(quotes::submit_quote))
        .route("/portal/verify-token", get(portal::verify_token))
        .route("/portal/save-intake", post(portal::save_intake))
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout));

    let protected = Router::new()
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/{id}/status", post(admin::update_status))
        .route(
            "/admin/orders/{id}/payment-status",
            post(admin::update_payment_status),
        )
        .route("/admin/orders/{id}/preview", post(admin::update_preview))
        .route(
            "/admin/orders/{id}/payment-request",
            post(admin::send_payment_request),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}
