use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::error;

use crate::config::Config;
use crate::errors::{Error, Result};

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// What the checkout handler hands to the processor after pricing.
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    pub package_id: String,
    pub package_name: String,
    pub base_price: f64,
    pub payment_type: String,
    pub amount_cents: i64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// A hosted payment link for payment-request emails.
#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub id: String,
    pub url: String,
}

/// The processor's view of a session, retrieved after the customer is
/// redirected back to the success page.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub id: String,
    pub paid: bool,
    pub amount_total: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Seam to the external payment processor. The service only ever computes an
/// amount and a description; collecting the card and settling the charge is
/// entirely the processor's problem.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, intent: &CheckoutIntent) -> Result<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails>;

    async fn create_payment_link(
        &self,
        amount_cents: i64,
        description: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentLink>;
}

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    domain: String,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Result<Self> {
        // A hung processor call should fail the checkout attempt cleanly, not
        // park the request forever.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            secret_key: config.stripe_secret_key.clone(),
            domain: config.domain.clone(),
        })
    }

    fn base_url(&self) -> String {
        let protocol = if self.domain.contains("localhost") {
            "http"
        } else {
            "https"
        };
        format!("{}://{}", protocol, self.domain)
    }

    async fn post_form(&self, path: &str, params: Vec<(String, String)>) -> Result<Value> {
        let res = self
            .client
            .post(format!("{STRIPE_API}{path}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = res.status();
        let body: Value = res.json().await?;
        if !status.is_success() {
            error!("stripe {path} returned {status}: {body}");
            return Err(Error::Upstream(format!("stripe {path} returned {status}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, intent: &CheckoutIntent) -> Result<CheckoutSession> {
        let base_url = self.base_url();
        let params = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                format!("{} Website Package", intent.package_name),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                intent.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                intent.amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "success_url".to_string(),
                format!("{base_url}/success?session_id={{CHECKOUT_SESSION_ID}}"),
            ),
            (
                "cancel_url".to_string(),
                format!("{base_url}/#packages"),
            ),
            (
                "metadata[packageId]".to_string(),
                intent.package_id.clone(),
            ),
            (
                "metadata[packageName]".to_string(),
                intent.package_name.clone(),
            ),
            (
                "metadata[basePrice]".to_string(),
                intent.base_price.to_string(),
            ),
            (
                "metadata[paymentType]".to_string(),
                intent.payment_type.clone(),
            ),
        ];

        let session = self.post_form("/checkout/sessions", params).await?;
        let id = session["id"]
            .as_str()
            .ok_or_else(|| Error::Upstream("checkout session missing id".to_string()))?
            .to_string();
        let url = session["url"].as_str().map(str::to_string);

        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        let res = self
            .client
            .get(format!("{STRIPE_API}/checkout/sessions/{session_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let status = res.status();
        let session: Value = res.json().await?;
        if !status.is_success() {
            error!("stripe session retrieve returned {status}: {session}");
            return Err(Error::Upstream(format!(
                "stripe session retrieve returned {status}"
            )));
        }

        let metadata = session["metadata"]
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SessionDetails {
            id: session["id"].as_str().unwrap_or(session_id).to_string(),
            paid: session["payment_status"].as_str() == Some("paid"),
            amount_total: session["amount_total"].as_i64().unwrap_or(0),
            customer_name: session["customer_details"]["name"]
                .as_str()
                .map(str::to_string),
            customer_email: session["customer_details"]["email"]
                .as_str()
                .or(session["customer_email"].as_str())
                .map(str::to_string),
            metadata,
        })
    }

    async fn create_payment_link(
        &self,
        amount_cents: i64,
        description: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentLink> {
        // Payment links hang off a Price object, so create that first.
        let price = self
            .post_form(
                "/prices",
                vec![
                    ("unit_amount".to_string(), amount_cents.to_string()),
                    ("currency".to_string(), "usd".to_string()),
                    (
                        "product_data[name]".to_string(),
                        format!("{description} - Pegrio Web Development"),
                    ),
                ],
            )
            .await?;
        let price_id = price["id"]
            .as_str()
            .ok_or_else(|| Error::Upstream("price missing id".to_string()))?;

        let mut params = vec![
            ("line_items[0][price]".to_string(), price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "after_completion[type]".to_string(),
                "redirect".to_string(),
            ),
            (
                "after_completion[redirect][url]".to_string(),
                format!("{}?payment=success", self.base_url()),
            ),
        ];
        for (key, val) in metadata {
            params.push((format!("metadata[{key}]"), val.clone()));
        }

        let link = self.post_form("/payment_links", params).await?;
        let id = link["id"]
            .as_str()
            .ok_or_else(|| Error::Upstream("payment link missing id".to_string()))?
            .to_string();
        let url = link["url"]
            .as_str()
            .ok_or_else(|| Error::Upstream("payment link missing url".to_string()))?
            .to_string();

        Ok(PaymentLink { id, url })
    }
}
