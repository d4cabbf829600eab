use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use surrealdb::{Surreal, engine::any::Any};

use pegrio_backend::config::Config;
use pegrio_backend::consts::order_const::ORDER_TABLE;
use pegrio_backend::errors::Result;
use pegrio_backend::models::order::Order;
use pegrio_backend::payments::{
    CheckoutIntent, CheckoutSession, PaymentGateway, PaymentLink, SessionDetails,
};
use pegrio_backend::state::AppState;
use pegrio_backend::utils::mailer::Mailer;

pub const TEST_ADMIN_PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    Config {
        database_url: "mem://".to_string(),
        db_username: None,
        db_password: None,
        admin_password: TEST_ADMIN_PASSWORD.to_string(),
        stripe_secret_key: "sk_test_unused".to_string(),
        resend_api_key: None,
        from_email: "hello@pegrio.com".to_string(),
        notification_email: "hello@pegrio.com".to_string(),
        domain: "localhost:3000".to_string(),
        port: 0,
    }
}

/// In-process stand-in for the Stripe gateway. Sessions are registered by
/// tests; creation calls are recorded so handlers can be asserted against.
#[derive(Default)]
pub struct FakeGateway {
    pub sessions: Mutex<HashMap<String, SessionDetails>>,
    pub created_intents: Mutex<Vec<CheckoutIntent>>,
}

impl FakeGateway {
    pub fn register_session(&self, session: SessionDetails) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(&self, intent: &CheckoutIntent) -> Result<CheckoutSession> {
        self.created_intents.lock().unwrap().push(intent.clone());
        Ok(CheckoutSession {
            id: "cs_test_fake".to_string(),
            url: Some("https://checkout.stripe.test/cs_test_fake".to_string()),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or(pegrio_backend::errors::Error::Upstream(
                "unknown session".to_string(),
            ))
    }

    async fn create_payment_link(
        &self,
        _amount_cents: i64,
        _description: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentLink> {
        let quote = metadata.get("quoteId").cloned().unwrap_or_default();
        Ok(PaymentLink {
            id: format!("plink_{quote}"),
            url: format!("https://pay.stripe.test/{quote}"),
        })
    }
}

pub async fn test_state_with_gateway(gateway: Arc<FakeGateway>) -> AppState {
    let config = test_config();
    let sdb = surrealdb::engine::any::connect("mem://").await.unwrap();
    sdb.use_ns("test").use_db("test").await.unwrap();
    let mailer = Mailer::new(&config).unwrap();

    AppState {
        sdb,
        config,
        payments: gateway,
        mailer,
    }
}

pub async fn test_state() -> AppState {
    test_state_with_gateway(Arc::new(FakeGateway::default())).await
}

/// Seeds an order row with full control over the fields the query engine
/// sorts and filters on. Explicit keys keep id ordering predictable.
#[allow(clippy::too_many_arguments)]
pub async fn seed_order(
    db: &Surreal<Any>,
    key: &str,
    name: &str,
    email: &str,
    business: &str,
    status: &str,
    payment_status: &str,
    amount_paid: Option<i64>,
    created_at: &str,
) -> Order {
    let mut content = json!({
        "customer_name": name,
        "customer_email": email,
        "business_name": business,
        "tier": 1,
        "status": status,
        "payment_status": payment_status,
        "created_at": created_at,
    });
    if let Some(amount) = amount_paid {
        content["amount_paid"] = json!(amount);
    }

    let created: Option<Order> = db
        .create((ORDER_TABLE, key))
        .content(content)
        .await
        .unwrap();
    created.unwrap()
}
