//! All database access for the order lifecycle. Every customer-driven state
//! transition is a single conditional `UPDATE` so the status check and the
//! write land in one atomic statement; the admin write path sets values
//! directly and deliberately skips those guards.

use std::collections::HashMap;

use serde::Deserialize;
use surrealdb::{RecordId, Surreal, engine::any::Any};
use tracing::info;

use crate::consts::order_const::ORDER_TABLE;
use crate::errors::{Error, Result};
use crate::models::order::{Order, OrderContent, OrderStatus, PaymentStatus};
use crate::models::stats::DashboardStats;
use crate::utils::record_id::order_record_id;
use crate::utils::secrets::{constant_time_eq, generate_portal_token, portal_token_shape_ok};
use crate::utils::time::{time_days_ago, time_now};

#[derive(Debug, Clone)]
pub struct NewQuote {
    pub customer_name: String,
    pub customer_email: String,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub base_price: Option<f64>,
    pub payment_type: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub tier: i64,
}

/// A confirmed payment event, as reported by the processor. `quote_id` is
/// present when the payment came through a payment-request link bound to an
/// existing pending quote.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub session_id: String,
    pub payment_intent: Option<String>,
    pub amount_cents: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub business_name: Option<String>,
    pub package_id: Option<String>,
    pub package_name: Option<String>,
    pub base_price: Option<f64>,
    pub payment_type: Option<String>,
    pub tier: i64,
    pub quote_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteQuery {
    pub limit: i64,
    pub offset: i64,
    pub sort: String,
    pub order: String,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Deserialize)]
struct RevenueRow {
    revenue: i64,
}

/// Public quote-request form. No portal token yet; that is only minted by a
/// confirmed payment.
pub async fn create_quote(db: &Surreal<Any>, quote: NewQuote) -> Result<Order> {
    let content = OrderContent {
        customer_name: quote.customer_name,
        customer_email: quote.customer_email,
        business_name: quote.business_name,
        phone: quote.phone,
        package_id: quote.package_id,
        package_name: quote.package_name,
        base_price: quote.base_price,
        payment_type: quote.payment_type,
        tier: quote.tier,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        message: quote.message,
        portal_token: None,
        stripe_session_id: None,
        stripe_payment_intent: None,
        amount_paid: None,
        source: quote.source,
        created_at: time_now(),
        paid_at: None,
    };

    let created: Option<Order> = db.create(ORDER_TABLE).content(content).await?;
    created.ok_or(Error::Unknown)
}

/// Applies a confirmed payment. Exactly-once under replayed or concurrent
/// confirmations:
///
/// - payments bound to an existing quote mint the portal token through a
///   conditional write (`portal_token = NONE`), so a second confirmation
///   finds the condition false and returns the already-minted row;
/// - fresh orders are keyed by the processor session id, so a duplicate
///   create fails on the existing record and the winner's row is returned.
///
/// Either way the customer only ever sees one token per order.
pub async fn record_payment(db: &Surreal<Any>, conf: PaymentConfirmation) -> Result<Order> {
    let now = time_now();

    if let Some(quote_id) = &conf.quote_id {
        let rid = order_record_id(quote_id);
        let token = generate_portal_token();

        let mut res = db
            .query(
                "UPDATE $id SET \
                    status = 'paid', \
                    payment_status = 'paid', \
                    portal_token = $portal_token, \
                    amount_paid = $amount, \
                    stripe_session_id = $session_id, \
                    stripe_payment_intent = $intent, \
                    paid_at = $now, \
                    updated_at = $now \
                WHERE portal_token = NONE \
                RETURN AFTER",
            )
            .bind(("id", rid.clone()))
            .bind(("portal_token", token))
            .bind(("amount", conf.amount_cents))
            .bind(("session_id", conf.session_id.clone()))
            .bind(("intent", conf.payment_intent.clone()))
            .bind(("now", now))
            .await?;
        let updated: Vec<Order> = res.take(0)?;

        if let Some(order) = updated.into_iter().next() {
            info!("order {} paid, portal token minted", order.id);
            return Ok(order);
        }

        // Someone minted first (replayed confirmation); their token stands.
        let existing: Option<Order> = db.select(rid).await?;
        return existing
            .filter(|order| order.portal_token.is_some())
            .ok_or(Error::NotFound);
    }

    let key = session_record_key(&conf.session_id);
    if let Some(existing) = find_by_session_key(db, &key).await? {
        return Ok(existing);
    }

    let content = OrderContent {
        customer_name: conf.customer_name,
        customer_email: conf.customer_email,
        business_name: conf.business_name,
        phone: None,
        package_id: conf.package_id,
        package_name: conf.package_name,
        base_price: conf.base_price,
        payment_type: conf.payment_type,
        tier: conf.tier,
        status: OrderStatus::Paid,
        payment_status: PaymentStatus::Paid,
        message: None,
        portal_token: Some(generate_portal_token()),
        stripe_session_id: Some(conf.session_id.clone()),
        stripe_payment_intent: conf.payment_intent,
        amount_paid: Some(conf.amount_cents),
        source: None,
        created_at: now.clone(),
        paid_at: Some(now),
    };

    let created: surrealdb::Result<Option<Order>> =
        db.create((ORDER_TABLE, key.as_str())).content(content).await;
    match created {
        Ok(Some(order)) => {
            info!("order {} created from session {}", order.id, conf.session_id);
            Ok(order)
        }
        Ok(None) => find_by_session_key(db, &key).await?.ok_or(Error::Unknown),
        Err(err) => {
            // Lost a duplicate-confirmation race on the session-keyed id; the
            // winner's row (and its token) is authoritative.
            match find_by_session_key(db, &key).await? {
                Some(order) => Ok(order),
                None => Err(err.into()),
            }
        }
    }
}

async fn find_by_session_key(db: &Surreal<Any>, key: &str) -> Result<Option<Order>> {
    Ok(db.select((ORDER_TABLE, key)).await?)
}

fn session_record_key(session_id: &str) -> String {
    session_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// The single read path for all portal pages. Missing, malformed and unknown
/// tokens all come back as `None`; the fetched row's token is re-checked with
/// a constant-time comparison.
pub async fn find_by_token(db: &Surreal<Any>, token: &str) -> Result<Option<Order>> {
    if !portal_token_shape_ok(token) {
        return Ok(None);
    }

    let mut res = db
        .query("SELECT * FROM type::table($table) WHERE portal_token = $portal_token LIMIT 1")
        .bind(("table", ORDER_TABLE))
        .bind(("portal_token", token.to_string()))
        .await?;
    let rows: Vec<Order> = res.take(0)?;

    Ok(rows.into_iter().next().filter(|order| {
        order
            .portal_token
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), token.as_bytes()))
    }))
}

/// Autosave path. Overwrites the full answer set (last-write-wins, the client
/// resends everything each save) without touching the submitted flag. The
/// `paid -> intake` step happens implicitly here: any draft save inside the
/// accessible window lands the order in `intake`. Once the order has left the
/// window (including right after a submit) stale saves are rejected, so an
/// in-flight autosave can never clobber a successful submit.
pub async fn save_intake_draft(
    db: &Surreal<Any>,
    token: &str,
    answers: &HashMap<String, serde_json::Value>,
) -> Result<Order> {
    intake_write(db, token, answers, OrderStatus::Intake).await
}

/// Terminal submit: persists the answers and advances `intake -> in_progress`
/// in one statement. Rejected with a conflict when the order is outside the
/// intake window, whether because work already started or because the token
/// matches nothing; the two cases are indistinguishable to the caller.
pub async fn submit_intake(
    db: &Surreal<Any>,
    token: &str,
    answers: &HashMap<String, serde_json::Value>,
) -> Result<Order> {
    intake_write(db, token, answers, OrderStatus::InProgress).await
}

async fn intake_write(
    db: &Surreal<Any>,
    token: &str,
    answers: &HashMap<String, serde_json::Value>,
    next: OrderStatus,
) -> Result<Order> {
    if !portal_token_shape_ok(token) {
        return Err(Error::Conflict);
    }

    let mut res = db
        .query(
            "UPDATE type::table($table) SET \
                intake_answers = $answers, \
                status = $next, \
                updated_at = $now \
            WHERE portal_token = $portal_token AND status IN ['paid', 'intake'] \
            RETURN AFTER",
        )
        .bind(("table", ORDER_TABLE))
        .bind(("answers", answers.clone()))
        .bind(("next", next))
        .bind(("now", time_now()))
        .bind(("portal_token", token.to_string()))
        .await?;
    let rows: Vec<Order> = res.take(0)?;

    rows.into_iter().next().ok_or(Error::Conflict)
}

const SORT_FIELDS: &[&str] = &[
    "created_at",
    "customer_name",
    "status",
    "payment_status",
    "base_price",
];

/// Filtered, sorted, paginated dashboard view. The sort field is whitelisted
/// (never interpolated from raw input) and `id` is always appended as a
/// secondary sort key so identical queries page identically even when the
/// primary field has duplicates.
pub async fn list_quotes(db: &Surreal<Any>, query: &QuoteQuery) -> Result<(Vec<Order>, i64)> {
    let mut conditions = Vec::new();

    let status_filter = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "all")
        .map(str::to_string);
    if status_filter.is_some() {
        conditions.push("status = $status");
    }

    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    if needle.is_some() {
        conditions.push(
            "(string::contains(string::lowercase(customer_name ?? ''), $needle) \
             OR string::contains(string::lowercase(business_name ?? ''), $needle) \
             OR string::contains(string::lowercase(customer_email ?? ''), $needle))",
        );
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sort_field = if SORT_FIELDS.contains(&query.sort.as_str()) {
        query.sort.as_str()
    } else {
        "created_at"
    };
    let direction = if query.order.eq_ignore_ascii_case("asc") {
        "ASC"
    } else {
        "DESC"
    };

    let list_sql = format!(
        "SELECT * FROM type::table($table) {where_clause} \
         ORDER BY {sort_field} {direction}, id {direction} \
         LIMIT $limit START $offset"
    );
    let count_sql = format!("SELECT count() FROM type::table($table) {where_clause} GROUP ALL");

    let mut res = db
        .query(list_sql)
        .query(count_sql)
        .bind(("table", ORDER_TABLE))
        .bind(("status", status_filter))
        .bind(("needle", needle))
        .bind(("limit", query.limit))
        .bind(("offset", query.offset))
        .await?;
    let rows: Vec<Order> = res.take(0)?;
    let counts: Vec<CountRow> = res.take(1)?;
    let total = counts.first().map(|c| c.count).unwrap_or(0);

    Ok((rows, total))
}

/// Aggregates over the whole table regardless of any active list filter.
pub async fn dashboard_stats(db: &Surreal<Any>) -> Result<DashboardStats> {
    let mut res = db
        .query("SELECT count() FROM type::table($table) GROUP ALL")
        .query("SELECT count() FROM type::table($table) WHERE payment_status = 'paid' GROUP ALL")
        .query("SELECT count() FROM type::table($table) WHERE payment_status = 'pending' GROUP ALL")
        .query(
            "SELECT math::sum(amount_paid ?? 0) AS revenue FROM type::table($table) \
             WHERE payment_status = 'paid' GROUP ALL",
        )
        .query("SELECT count() FROM type::table($table) WHERE created_at > $cutoff7 GROUP ALL")
        .query("SELECT count() FROM type::table($table) WHERE created_at > $cutoff30 GROUP ALL")
        .bind(("table", ORDER_TABLE))
        .bind(("cutoff7", time_days_ago(7)))
        .bind(("cutoff30", time_days_ago(30)))
        .await?;

    let total: Vec<CountRow> = res.take(0)?;
    let paid: Vec<CountRow> = res.take(1)?;
    let pending: Vec<CountRow> = res.take(2)?;
    let revenue: Vec<RevenueRow> = res.take(3)?;
    let last_7: Vec<CountRow> = res.take(4)?;
    let last_30: Vec<CountRow> = res.take(5)?;

    let total_quotes = total.first().map(|c| c.count).unwrap_or(0);
    let paid_quotes = paid.first().map(|c| c.count).unwrap_or(0);

    Ok(DashboardStats {
        total_quotes,
        paid_quotes,
        pending_quotes: pending.first().map(|c| c.count).unwrap_or(0),
        total_revenue: revenue.first().map(|r| r.revenue).unwrap_or(0),
        quotes_last_7_days: last_7.first().map(|c| c.count).unwrap_or(0),
        quotes_last_30_days: last_30.first().map(|c| c.count).unwrap_or(0),
        conversion_rate: if total_quotes > 0 {
            paid_quotes as f64 / total_quotes as f64
        } else {
            0.0
        },
    })
}

pub async fn find_by_id(db: &Surreal<Any>, id: &RecordId) -> Result<Option<Order>> {
    Ok(db.select(id.clone()).await?)
}

/// Unconstrained admin override. Staff may need to revert or correct state,
/// so no forward-only check here; customers never reach this path.
pub async fn set_status(db: &Surreal<Any>, id: &RecordId, status: OrderStatus) -> Result<Order> {
    set_field(db, id, "status", status).await
}

pub async fn set_payment_status(
    db: &Surreal<Any>,
    id: &RecordId,
    payment_status: PaymentStatus,
) -> Result<Order> {
    set_field(db, id, "payment_status", payment_status).await
}

pub async fn set_preview_url(db: &Surreal<Any>, id: &RecordId, url: String) -> Result<Order> {
    set_field(db, id, "preview_url", url).await
}

pub async fn set_payment_link(db: &Surreal<Any>, id: &RecordId, link_id: String) -> Result<Order> {
    set_field(db, id, "stripe_session_id", link_id).await
}

async fn set_field<V>(db: &Surreal<Any>, id: &RecordId, field: &'static str, value: V) -> Result<Order>
where
    V: serde::Serialize + Send + Sync + 'static,
{
    let mut res = db
        .query(format!(
            "UPDATE $id SET {field} = $value, updated_at = $now RETURN AFTER"
        ))
        .bind(("id", id.clone()))
        .bind(("value", value))
        .bind(("now", time_now()))
        .await?;
    let rows: Vec<Order> = res.take(0)?;

    rows.into_iter().next().ok_or(Error::NotFound)
}
