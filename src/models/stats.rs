use serde::Serialize;

/// Dashboard aggregates. Always computed over the entire orders table, even
/// when the table view next to them is filtered; the dashboard intentionally
/// shows global numbers beside a filtered list.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_quotes: i64,
    pub paid_quotes: i64,
    pub pending_quotes: i64,
    /// Sum of captured charges, in minor units (cents).
    pub total_revenue: i64,
    pub quotes_last_7_days: i64,
    pub quotes_last_30_days: i64,
    /// paid / total as a fraction; 0.0 when there are no quotes.
    pub conversion_rate: f64,
}
