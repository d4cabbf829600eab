mod common;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use pegrio_backend::errors::Error;
use pegrio_backend::models::order::OrderStatus;
use pegrio_backend::payments::SessionDetails;
use pegrio_backend::routes::checkout::{
    CheckoutRequest, ConfirmRequest, confirm_checkout, create_checkout,
};
use pegrio_backend::store::{self, QuoteQuery};

use common::{FakeGateway, test_state_with_gateway};

fn list_all() -> QuoteQuery {
    QuoteQuery {
        limit: 10,
        ..Default::default()
    }
}

fn checkout_request(payment_type: &str) -> CheckoutRequest {
    CheckoutRequest {
        package_id: "tier-2".to_string(),
        package_name: "Growth".to_string(),
        base_price: 5000.0,
        payment_type: payment_type.to_string(),
    }
}

fn paid_session(id: &str) -> SessionDetails {
    let mut metadata = HashMap::new();
    metadata.insert("packageId".to_string(), "tier-2".to_string());
    metadata.insert("packageName".to_string(), "Growth".to_string());
    metadata.insert("basePrice".to_string(), "5000".to_string());
    metadata.insert("paymentType".to_string(), "full".to_string());
    metadata.insert("customerName".to_string(), "Ada Lovelace".to_string());
    metadata.insert("business".to_string(), "Analytical Engines".to_string());

    SessionDetails {
        id: id.to_string(),
        paid: true,
        amount_total: 475_000,
        customer_name: None,
        customer_email: Some("ada@example.com".to_string()),
        metadata,
    }
}

#[tokio::test]
async fn checkout_prices_the_plan_before_handing_off() {
    let gateway = Arc::new(FakeGateway::default());
    let state = test_state_with_gateway(gateway.clone()).await;

    let Json(res) = create_checkout(State(state), Json(checkout_request("full")))
        .await
        .unwrap();
    assert!(res.success);
    assert_eq!(res.session_id, "cs_test_fake");

    let intents = gateway.created_intents.lock().unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].amount_cents, 475_000);
    assert!(intents[0].description.contains("5% discount"));
}

#[tokio::test]
async fn checkout_rejects_invalid_input() {
    let gateway = Arc::new(FakeGateway::default());
    let state = test_state_with_gateway(gateway.clone()).await;

    let mut bad_price = checkout_request("full");
    bad_price.base_price = 0.0;
    let err = create_checkout(State(state.clone()), Json(bad_price))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    let mut no_plan = checkout_request("");
    no_plan.payment_type = String::new();
    let err = create_checkout(State(state.clone()), Json(no_plan))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    // monthly at or below the 2000 reserve would be a non-positive installment
    let mut cheap_monthly = checkout_request("monthly");
    cheap_monthly.base_price = 1800.0;
    let err = create_checkout(State(state.clone()), Json(cheap_monthly))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    // nothing was handed to the processor and nothing was persisted
    assert!(gateway.created_intents.lock().unwrap().is_empty());
    let (rows, total) = store::list_quotes(&state.sdb, &list_all())
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn confirm_creates_order_from_session_metadata() {
    let gateway = Arc::new(FakeGateway::default());
    gateway.register_session(paid_session("cs_ok"));
    let state = test_state_with_gateway(gateway).await;

    let Json(res) = confirm_checkout(
        State(state.clone()),
        Json(ConfirmRequest {
            session_id: "cs_ok".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(res.success);
    let token = res.portal_token.clone().unwrap();
    assert_eq!(res.order.status, OrderStatus::Paid);
    assert_eq!(res.order.customer_name, "Ada Lovelace");
    assert_eq!(res.order.tier, 2);

    let order = store::find_by_token(&state.sdb, &token).await.unwrap().unwrap();
    assert_eq!(order.amount_paid, Some(475_000));
    assert_eq!(order.base_price, Some(5000.0));
}

#[tokio::test]
async fn confirm_is_idempotent_across_replays() {
    let gateway = Arc::new(FakeGateway::default());
    gateway.register_session(paid_session("cs_dup"));
    let state = test_state_with_gateway(gateway).await;

    let Json(first) = confirm_checkout(
        State(state.clone()),
        Json(ConfirmRequest {
            session_id: "cs_dup".to_string(),
        }),
    )
    .await
    .unwrap();
    let Json(second) = confirm_checkout(
        State(state.clone()),
        Json(ConfirmRequest {
            session_id: "cs_dup".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(first.order.id, second.order.id);
    assert_eq!(first.portal_token, second.portal_token);

    let (_, total) = store::list_quotes(&state.sdb, &list_all())
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn confirm_refuses_unpaid_sessions() {
    let gateway = Arc::new(FakeGateway::default());
    let mut session = paid_session("cs_unpaid");
    session.paid = false;
    gateway.register_session(session);
    let state = test_state_with_gateway(gateway).await;

    let err = confirm_checkout(
        State(state.clone()),
        Json(ConfirmRequest {
            session_id: "cs_unpaid".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::PaymentNotCompleted));

    let (_, total) = store::list_quotes(&state.sdb, &list_all())
        .await
        .unwrap();
    assert_eq!(total, 0);
}
