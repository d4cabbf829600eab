use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Primary workflow status of an order. Customers only ever move forward
/// through this sequence (and only through the portal endpoints); the admin
/// write path may set any value directly to correct or revert state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Intake,
    InProgress,
    Review,
    Delivered,
}

impl OrderStatus {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "intake" => Some(Self::Intake),
            "in_progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Intake => "intake",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Delivered => "delivered",
        }
    }

    /// The questionnaire window: `paid` and `intake` are the same accessible
    /// stage from the customer's point of view. Once work has started the
    /// form is no longer relevant.
    pub fn intake_open(self) -> bool {
        matches!(self, Self::Paid | Self::Intake)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice state, orthogonal to the workflow status. The admin can mark an
/// invoice paid without moving the order to another workflow stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

/// Tier selects which intake questionnaire variant applies. Incoming values
/// arrive as free text ("tier-2", "3", "Tier 1") so everything except ascii
/// digits is stripped before parsing; absent or unparseable input means tier 1.
pub fn normalize_tier(val: Option<&str>) -> i64 {
    let digits: String = val
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<i64>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Order {
    pub id: RecordId,
    pub customer_name: String,
    pub customer_email: String, // ! & (len = 255)
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>, // ! & (len = 20)
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub payment_type: Option<String>, // full | split | monthly
    pub tier: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub intake_answers: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub portal_token: Option<String>,
    #[serde(default)]
    pub stripe_session_id: Option<String>,
    #[serde(default)]
    pub stripe_payment_intent: Option<String>,
    #[serde(default)]
    pub amount_paid: Option<i64>, // minor units (cents)
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: String, // ! TIMESTAMP (UTC rfc3339, fixed precision)
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

/// Row content for inserts. Optional fields are skipped entirely when unset so
/// the stored value is NONE (a serialized `null` would not match the
/// `portal_token = NONE` conditional writes).
#[derive(Serialize, Debug, Clone)]
pub struct OrderContent {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    pub tier: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_payment_intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

/// What a portal page is allowed to see. No Stripe identifiers, no amounts,
/// no marketing attribution.
#[derive(Serialize, Debug, Clone)]
pub struct OrderProjection {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub business_name: Option<String>,
    pub package_name: Option<String>,
    pub payment_type: Option<String>,
    pub tier: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub intake_answers: Option<HashMap<String, serde_json::Value>>,
    pub preview_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&Order> for OrderProjection {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            business_name: order.business_name.clone(),
            package_name: order.package_name.clone(),
            payment_type: order.payment_type.clone(),
            tier: order.tier,
            status: order.status,
            payment_status: order.payment_status,
            intake_answers: order.intake_answers.clone(),
            preview_url: order.preview_url.clone(),
            created_at: order.created_at.clone(),
            updated_at: order.updated_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tier() {
        assert_eq!(normalize_tier(Some("2")), 2);
        assert_eq!(normalize_tier(Some("tier-3")), 3);
        assert_eq!(normalize_tier(Some("Tier 1")), 1);
        assert_eq!(normalize_tier(Some("premium")), 1);
        assert_eq!(normalize_tier(Some("")), 1);
        assert_eq!(normalize_tier(Some("0")), 1);
        assert_eq!(normalize_tier(None), 1);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Intake,
            OrderStatus::InProgress,
            OrderStatus::Review,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("building"), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_intake_window() {
        assert!(OrderStatus::Paid.intake_open());
        assert!(OrderStatus::Intake.intake_open());
        assert!(!OrderStatus::Pending.intake_open());
        assert!(!OrderStatus::InProgress.intake_open());
        assert!(!OrderStatus::Delivered.intake_open());
    }
}
