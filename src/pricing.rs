use crate::errors::{Error, Result};

/// What we hand to the payment processor: an amount in minor currency units
/// (cents) and a human-readable line-item description.
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub amount_cents: i64,
    pub description: String,
}

/// Derives the checkout charge from a package list price and payment plan.
///
/// Pure; no I/O. Rounding is `f64::round`, i.e. half-away-from-zero, which
/// for the positive amounts here means half-up. The same input always yields
/// the same cent amount.
///
/// - `full`: 5% prepayment discount.
/// - `split`: 50% deposit now, the remaining 50% is collected out of band.
/// - `monthly`: installment 1 of 10 over `base_price - 2000`; a base price
///   at or below $2,000 would produce a non-positive installment and is
///   rejected.
/// - anything else falls back to the full undiscounted price.
pub fn calculate_charge(package_name: &str, base_price: f64, payment_type: &str) -> Result<Charge> {
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(Error::InvalidInput(
            "basePrice must be a positive number".to_string(),
        ));
    }

    let (amount_cents, description) = match payment_type {
        "full" => (
            (base_price * 0.95 * 100.0).round() as i64,
            format!("{} Package - Pay in Full (5% discount)", package_name),
        ),
        "split" => (
            (base_price / 2.0 * 100.0).round() as i64,
            format!("{} Package - 50% Down Payment", package_name),
        ),
        "monthly" => {
            if base_price <= 2000.0 {
                return Err(Error::InvalidInput(
                    "basePrice must be above 2000 for monthly payments".to_string(),
                ));
            }
            (
                ((base_price - 2000.0) / 10.0 * 100.0).round() as i64,
                format!("{} Package - Monthly Payment 1 of 10", package_name),
            )
        }
        _ => (
            (base_price * 100.0).round() as i64,
            format!("{} Package", package_name),
        ),
    };

    Ok(Charge {
        amount_cents,
        description,
    })
}
