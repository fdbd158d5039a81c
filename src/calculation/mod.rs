//! Calculation logic for the payroll processing core.
//!
//! This module contains the pure gross-to-net pipeline: gross pay from the
//! employee's pay basis, statutory tax withholding with wage-base capping,
//! garnishment prioritization against disposable income, voluntary
//! deduction handling, and exact net derivation. Nothing in this module
//! performs I/O or mutates shared state.

mod calculator;
mod garnishment;
mod gross;
mod withholding;

use rust_decimal::{Decimal, RoundingStrategy};

pub use calculator::{DEDUCTIONS_REDUCED, calculate_paycheck};
pub use garnishment::{
    OTHER_CAP, SUPPORT_CAP, SUPPORT_CAP_ARREARS_SHARED, SUPPORT_CAP_ARREARS_SOLE,
    prioritize_garnishments,
};
pub use gross::{GrossPayResult, OVERTIME_PREMIUM, calculate_gross};
pub use withholding::{
    FEDERAL_JURISDICTION, FICA_KEY, INCOME_TAX_KEY, WithholdingResult, calculate_withholding,
};

/// Rounds a monetary amount to minor currency units using banker's rounding.
///
/// Every line item on a paycheck passes through this function; net pay is
/// then derived from the rounded lines rather than rounded independently,
/// which keeps the balance invariant exact. The result always carries two
/// decimal places, so amounts serialize as `"5000.00"` rather than `"5000"`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// // Midpoints round to the nearest even cent.
/// assert_eq!(
///     round_money(Decimal::from_str("2.345").unwrap()),
///     Decimal::from_str("2.34").unwrap()
/// );
/// assert_eq!(
///     round_money(Decimal::from_str("2.355").unwrap()),
///     Decimal::from_str("2.36").unwrap()
/// );
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}
