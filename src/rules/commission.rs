/// Platform commission in basis points (5%).
pub const COMMISSION_RATE_BPS: i32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarningSplit {
    pub total: i64,
    pub commission: i64,
    pub net: i64,
}

/// Splits one order line into the platform commission and the seller's net,
/// rounding the commission half up to the nearest minor unit.
pub fn split_line(unit_price: i64, quantity: i32) -> EarningSplit {
    let total = unit_price * i64::from(quantity);
    let commission = (total * i64::from(COMMISSION_RATE_BPS) + 5_000) / 10_000;
    EarningSplit {
        total,
        commission,
        net: total - commission,
    }
}
