use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::models::order::Order;

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Thin client for the Resend email API. Every send is best-effort: callers
/// log failures and carry on, an email outage must never fail a request.
/// With no API key configured (local dev, tests) sends are skipped.
#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    notify: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.resend_api_key.clone(),
            from: config.from_email.clone(),
            notify: config.notification_email.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            debug!("no RESEND_API_KEY configured, skipping email to {to}");
            return Ok(());
        };

        let res = self
            .client
            .post(RESEND_URL)
            .bearer_auth(api_key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("resend {status}: {body}")));
        }

        info!("sent email to {to}: {subject}");
        Ok(())
    }

    /// Notifies the business of a new quote request from the public form.
    pub async fn quote_notification(&self, order: &Order) -> Result<()> {
        let subject = format!(
            "New Quote Request: {} - {}",
            order.package_name.as_deref().unwrap_or("Custom"),
            order.business_name.as_deref().unwrap_or(&order.customer_name),
        );
        let html = format!(
            "<h2>New Quote Request</h2>\
             <p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Business:</strong> {}</p>\
             <p><strong>Package:</strong> {}</p>\
             <p><strong>Message:</strong> {}</p>",
            order.customer_name,
            order.customer_email,
            order.business_name.as_deref().unwrap_or("-"),
            order.package_name.as_deref().unwrap_or("-"),
            order.message.as_deref().unwrap_or("-"),
        );
        self.send(&self.notify, &subject, html).await
    }

    /// Confirmation to the customer after they submit the questionnaire, plus
    /// a heads-up to the business that the build can start.
    pub async fn intake_received(&self, order: &Order) -> Result<()> {
        let business = order.business_name.as_deref().unwrap_or("your website");
        let html = format!(
            "<h1>We Got Your Answers!</h1>\
             <p>Hi {},</p>\
             <p>Thank you for completing the questionnaire for <strong>{}</strong>. \
             Our team is now hard at work bringing your vision to life.</p>\
             <p>You'll receive an email when your site is ready for review. \
             You can check on your project status anytime through your client portal.</p>\
             <p>Best regards,<br>The Pegrio Team</p>",
            order.customer_name, business,
        );
        self.send(
            &order.customer_email,
            "Questionnaire Received - We're Building Your Website!",
            html,
        )
        .await?;

        let subject = format!(
            "Intake Complete: {} (Tier {})",
            order.business_name.as_deref().unwrap_or(&order.customer_name),
            order.tier,
        );
        let html = format!(
            "<h2>Client Intake Submitted</h2>\
             <p><strong>Client:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Tier:</strong> {}</p>\
             <p>The questionnaire answers are saved to the order. Time to start building!</p>",
            order.customer_name, order.customer_email, order.tier,
        );
        self.send(&self.notify, &subject, html).await
    }

    /// Branded payment-request email with a Stripe payment link.
    pub async fn payment_request(&self, order: &Order, url: &str, amount_cents: i64) -> Result<()> {
        let html = format!(
            "<h1>Your Payment Link</h1>\
             <p>Hi {},</p>\
             <p>Here is your secure payment link for <strong>{}</strong> \
             (${:.2}):</p>\
             <p><a href=\"{}\">Complete your payment</a></p>\
             <p>Best regards,<br>The Pegrio Team</p>",
            order.customer_name,
            order.package_name.as_deref().unwrap_or("your website package"),
            amount_cents as f64 / 100.0,
            url,
        );
        self.send(
            &order.customer_email,
            "Your Pegrio Payment Link",
            html,
        )
        .await
    }
}
