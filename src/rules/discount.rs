use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{entity::discount_codes, error::AppError, models::DiscountType};

/// Why a discount code cannot be redeemed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountRejection {
    #[error("Discount code is not active")]
    Inactive,
    #[error("Discount code has expired")]
    Expired,
    #[error("Discount code has reached its usage limit")]
    Exhausted,
    #[error("Minimum order amount of {0} not met")]
    BelowMinimum(i64),
    #[error("You have already used this discount code")]
    AlreadyUsed,
    #[error("Discount code has an unknown type")]
    UnknownType,
}

impl From<DiscountRejection> for AppError {
    fn from(rejection: DiscountRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

/// Normalised form used both when storing and when looking up a code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Checks eligibility and returns the amount to take off `subtotal`.
pub fn evaluate(
    code: &discount_codes::Model,
    subtotal: i64,
    now: DateTime<Utc>,
    already_used: bool,
) -> Result<i64, DiscountRejection> {
    if !code.is_active {
        return Err(DiscountRejection::Inactive);
    }
    if let Some(expires_at) = code.expires_at {
        if expires_at.with_timezone(&Utc) <= now {
            return Err(DiscountRejection::Expired);
        }
    }
    if let Some(max_uses) = code.max_uses {
        if code.current_uses >= max_uses {
            return Err(DiscountRejection::Exhausted);
        }
    }
    if subtotal < code.minimum_order_amount {
        return Err(DiscountRejection::BelowMinimum(code.minimum_order_amount));
    }
    if already_used {
        return Err(DiscountRejection::AlreadyUsed);
    }
    let discount_type =
        DiscountType::parse(&code.discount_type).ok_or(DiscountRejection::UnknownType)?;
    Ok(discount_amount(discount_type, code.discount_value, subtotal))
}

/// Capped at the subtotal so totals never go negative.
pub fn discount_amount(discount_type: DiscountType, value: i64, subtotal: i64) -> i64 {
    let raw = match discount_type {
        DiscountType::Percentage => subtotal * value / 100,
        DiscountType::Fixed => value,
    };
    raw.clamp(0, subtotal.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn code(discount_type: &str, value: i64) -> discount_codes::Model {
        discount_codes::Model {
            id: Uuid::new_v4(),
            code: "SAVE10".into(),
            description: None,
            discount_type: discount_type.into(),
            discount_value: value,
            minimum_order_amount: 5000,
            max_uses: Some(3),
            current_uses: 0,
            expires_at: Some((Utc::now() + Duration::days(1)).into()),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn percentage_discount_on_hundred_pounds() {
        let amount = evaluate(&code("percentage", 10), 10_000, Utc::now(), false);
        assert_eq!(amount, Ok(1_000));
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() {
        let mut c = code("fixed", 9_000);
        c.minimum_order_amount = 0;
        assert_eq!(evaluate(&c, 6_000, Utc::now(), false), Ok(6_000));
    }

    #[test]
    fn percentage_rounds_down() {
        assert_eq!(discount_amount(DiscountType::Percentage, 15, 999), 149);
    }

    #[test]
    fn rejects_inactive_code() {
        let mut c = code("percentage", 10);
        c.is_active = false;
        assert_eq!(
            evaluate(&c, 10_000, Utc::now(), false),
            Err(DiscountRejection::Inactive)
        );
    }

    #[test]
    fn rejects_expired_code() {
        let mut c = code("percentage", 10);
        let now = Utc::now();
        c.expires_at = Some(now.into());
        assert_eq!(evaluate(&c, 10_000, now, false), Err(DiscountRejection::Expired));
    }

    #[test]
    fn rejects_exhausted_code() {
        let mut c = code("percentage", 10);
        c.current_uses = 3;
        assert_eq!(
            evaluate(&c, 10_000, Utc::now(), false),
            Err(DiscountRejection::Exhausted)
        );
    }

    #[test]
    fn unlimited_code_never_exhausts() {
        let mut c = code("percentage", 10);
        c.max_uses = None;
        c.current_uses = 10_000;
        assert!(evaluate(&c, 10_000, Utc::now(), false).is_ok());
    }

    #[test]
    fn rejects_subtotal_below_minimum() {
        let c = code("percentage", 10);
        assert_eq!(
            evaluate(&c, 4_999, Utc::now(), false),
            Err(DiscountRejection::BelowMinimum(5_000))
        );
        assert!(evaluate(&c, 5_000, Utc::now(), false).is_ok());
    }

    #[test]
    fn rejects_code_already_used_by_user() {
        let c = code("percentage", 10);
        assert_eq!(
            evaluate(&c, 10_000, Utc::now(), true),
            Err(DiscountRejection::AlreadyUsed)
        );
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
    }
}
