//! Gross pay calculation.
//!
//! This module computes an employee's gross earnings for one pay period
//! from their pay basis: hourly with an overtime premium, salaried with a
//! periods-per-year divisor, or a flat one-off amount.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{EarningsBreakdown, PayBasis, PayProfile};

use super::round_money;

/// The overtime premium multiplier applied to hourly rates.
pub const OVERTIME_PREMIUM: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// The result of a gross pay calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossPayResult {
    /// Itemized earnings, each line rounded to minor currency units.
    pub earnings: EarningsBreakdown,
    /// Total gross pay (sum of the rounded lines).
    pub gross: Decimal,
}

/// Computes gross pay for one employee's period inputs.
///
/// Each earnings line is rounded to minor currency units with banker's
/// rounding before summing, so the gross is exactly the sum of its lines.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPayInput`] when any rate, hour count,
/// salary, or bonus is negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_gross;
/// use payroll_engine::models::{FilingStatus, PayBasis, PayFrequency, PayProfile, PaymentMethod};
/// use rust_decimal::Decimal;
///
/// let profile = PayProfile {
///     employee_id: "emp_001".to_string(),
///     company_id: "co_001".to_string(),
///     pay_basis: PayBasis::Salaried {
///         annual_salary: Decimal::from(130_000),
///     },
///     pay_frequency: PayFrequency::Biweekly,
///     bonus: None,
///     filing_status: FilingStatus::Single,
///     work_state: "CA".to_string(),
///     locality: None,
///     payment_method: PaymentMethod::DirectDeposit,
///     deductions: vec![],
///     garnishments: vec![],
/// };
///
/// let result = calculate_gross(&profile).unwrap();
/// assert_eq!(result.gross, Decimal::from(5_000));
/// ```
pub fn calculate_gross(profile: &PayProfile) -> EngineResult<GrossPayResult> {
    let reject = |message: &str| EngineError::InvalidPayInput {
        employee_id: profile.employee_id.clone(),
        message: message.to_string(),
    };

    let bonus = profile.bonus.unwrap_or(Decimal::ZERO);
    if bonus < Decimal::ZERO {
        return Err(reject("bonus cannot be negative"));
    }
    let bonus = round_money(bonus);

    let earnings = match &profile.pay_basis {
        PayBasis::Hourly {
            rate,
            hours,
            overtime_hours,
        } => {
            if *rate < Decimal::ZERO {
                return Err(reject("hourly rate cannot be negative"));
            }
            if *hours < Decimal::ZERO || *overtime_hours < Decimal::ZERO {
                return Err(reject("hours cannot be negative"));
            }
            EarningsBreakdown {
                regular_hours: *hours,
                overtime_hours: *overtime_hours,
                regular_amount: round_money(rate * hours),
                overtime_amount: round_money(rate * OVERTIME_PREMIUM * overtime_hours),
                bonus_amount: bonus,
            }
        }
        PayBasis::Salaried { annual_salary } => {
            if *annual_salary < Decimal::ZERO {
                return Err(reject("annual salary cannot be negative"));
            }
            let periods = Decimal::from(profile.pay_frequency.periods_per_year());
            EarningsBreakdown {
                regular_hours: Decimal::ZERO,
                overtime_hours: Decimal::ZERO,
                regular_amount: round_money(annual_salary / periods),
                overtime_amount: Decimal::ZERO,
                bonus_amount: bonus,
            }
        }
        PayBasis::Flat { amount } => {
            if *amount < Decimal::ZERO {
                return Err(reject("flat amount cannot be negative"));
            }
            EarningsBreakdown {
                regular_hours: Decimal::ZERO,
                overtime_hours: Decimal::ZERO,
                regular_amount: Decimal::ZERO,
                overtime_amount: Decimal::ZERO,
                bonus_amount: round_money(amount + bonus),
            }
        }
    };

    let gross = earnings.regular_amount + earnings.overtime_amount + earnings.bonus_amount;
    if gross < Decimal::ZERO {
        return Err(reject("computed gross pay is negative"));
    }

    Ok(GrossPayResult { earnings, gross })
}
