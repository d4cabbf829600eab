use surrealdb::RecordId;

use crate::consts::order_const::ORDER_TABLE;

/// Rebuilds an order record id from its string form. Accepts both a bare key
/// and the full `orders:key` rendering (including the bracketed form
/// `orders:⟨key⟩` that `RecordId::to_string` produces for some keys).
pub fn order_record_id(val: &str) -> RecordId {
    let (table, key) = match val.trim().split_once(':') {
        Some((table, key)) => (table, key),
        None => (ORDER_TABLE, val.trim()),
    };
    let key = key.trim_start_matches('⟨').trim_end_matches('⟩');
    RecordId::from_table_key(table, key)
}
