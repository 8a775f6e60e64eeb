pub mod budget_service;
pub mod category_service;
pub mod dashboard_service;
pub mod goal_service;
pub mod report_service;
pub mod transaction_service;

use rust_decimal::Decimal;

/// `part / whole * 100`, defined as exactly zero when `whole` is not positive.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
