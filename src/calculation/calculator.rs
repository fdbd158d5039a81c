//! Gross-to-net paycheck calculation.
//!
//! This module composes the full gross-to-net pipeline for one employee:
//! gross pay, statutory withholding, garnishment prioritization against
//! disposable income, voluntary deductions, and exact net derivation. The
//! function is pure: it reads the ruleset store and a year-to-date snapshot
//! and writes nothing.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ledger::YtdAccumulator;
use crate::models::{
    DeductionLine, PayPeriod, PayProfile, Paycheck, PaycheckWarning, PaymentStatus,
};
use crate::ruleset::RulesetStore;

use super::garnishment::prioritize_garnishments;
use super::gross::calculate_gross;
use super::round_money;
use super::withholding::calculate_withholding;

/// Warning code attached when voluntary deductions were pro-rata reduced.
pub const DEDUCTIONS_REDUCED: &str = "DEDUCTIONS_REDUCED";

/// Takes voluntary deductions out of the income remaining after taxes and
/// garnishments. When the requested total exceeds what remains, every line
/// is reduced pro-rata and a warning is emitted; net pay never goes
/// negative on account of voluntary deductions.
fn take_deductions(
    profile: &PayProfile,
    available: Decimal,
    warnings: &mut Vec<PaycheckWarning>,
) -> Vec<DeductionLine> {
    let requested: Decimal = profile
        .deductions
        .iter()
        .map(|d| round_money(d.amount))
        .sum();

    if requested <= available {
        return profile
            .deductions
            .iter()
            .map(|d| DeductionLine {
                code: d.code.clone(),
                description: d.description.clone(),
                amount: round_money(d.amount),
            })
            .collect();
    }

    warnings.push(PaycheckWarning {
        code: DEDUCTIONS_REDUCED.to_string(),
        message: format!(
            "voluntary deductions of {} reduced pro-rata to {} of remaining income",
            requested, available
        ),
    });

    let scale = if requested > Decimal::ZERO {
        available / requested
    } else {
        Decimal::ZERO
    };

    let mut remaining = available;
    profile
        .deductions
        .iter()
        .map(|d| {
            let amount = round_money(round_money(d.amount) * scale).min(remaining);
            remaining -= amount;
            DeductionLine {
                code: d.code.clone(),
                description: d.description.clone(),
                amount,
            }
        })
        .collect()
}

/// Calculates one employee's paycheck for a pay period.
///
/// The pipeline runs in the legally mandated order: gross, statutory taxes
/// (with wage-base capping against the YTD snapshot), garnishments against
/// disposable income (gross minus mandatory taxes), then voluntary
/// deductions. Every line item is rounded to minor currency units with
/// banker's rounding and net pay is re-derived from the rounded lines, so
/// `gross − Σtaxes − Σgarnishments − Σdeductions == net` holds exactly.
///
/// # Errors
///
/// - [`EngineError::InvalidPayInput`] for negative pay inputs.
/// - [`EngineError::RulesetUnavailable`] when any required ruleset is
///   missing (blocking; the run must not proceed).
/// - [`EngineError::InsufficientEarnings`] when mandatory taxes exceed
///   gross pay even with every voluntary deduction zeroed; the employee is
///   excluded from the run pending manual review.
pub fn calculate_paycheck(
    run_id: Uuid,
    profile: &PayProfile,
    period: &PayPeriod,
    ytd: &YtdAccumulator,
    rulesets: &RulesetStore,
) -> EngineResult<Paycheck> {
    let gross_result = calculate_gross(profile)?;
    let gross = gross_result.gross;

    let withholding = calculate_withholding(profile, gross, period.pay_date, ytd, rulesets)?;
    let total_taxes = withholding.total();

    // The garnishment base is federally defined as gross minus mandatory
    // taxes, not net after all deductions.
    let disposable_income = gross - total_taxes;
    if disposable_income < Decimal::ZERO {
        return Err(EngineError::InsufficientEarnings {
            employee_id: profile.employee_id.clone(),
        });
    }

    let garnishments = prioritize_garnishments(disposable_income, &profile.garnishments);
    let total_garnishments: Decimal = garnishments.iter().map(|g| g.amount).sum();

    let mut warnings = Vec::new();
    let available = disposable_income - total_garnishments;
    let deductions = take_deductions(profile, available, &mut warnings);
    let total_deductions: Decimal = deductions.iter().map(|d| d.amount).sum();

    let net_pay = gross - total_taxes - total_garnishments - total_deductions;

    Ok(Paycheck {
        id: Uuid::new_v4(),
        payroll_run_id: run_id,
        employee_id: profile.employee_id.clone(),
        earnings: gross_result.earnings,
        gross_pay: gross,
        taxes: withholding.taxes,
        garnishments,
        deductions,
        net_pay,
        employer_taxes: withholding.employer_taxes,
        wage_bases: withholding.wage_bases,
        payment_method: profile.payment_method,
        payment_status: PaymentStatus::Pending,
        warnings,
        reverses: None,
    })
}
