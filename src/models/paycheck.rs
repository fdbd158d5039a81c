//! Paycheck models.
//!
//! This module contains the [`Paycheck`] type and its line-item structures
//! capturing one employee's gross-to-net result within a payroll run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::employee::PaymentMethod;
use super::garnishment::GarnishmentKind;

/// A statutory tax withheld from wages.
///
/// Used both as a line-item key on paychecks and as an accumulator key in
/// the YTD ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    /// Federal income tax.
    FederalIncome,
    /// State income tax.
    StateIncome,
    /// Local income tax.
    LocalIncome,
    /// Social Security (OASDI), subject to an annual wage base.
    SocialSecurity,
    /// Medicare hospital insurance.
    Medicare,
    /// Additional Medicare surtax above the annual threshold.
    AdditionalMedicare,
}

/// Breakdown of how the gross pay was earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    /// Regular hours worked (zero for salaried/flat).
    pub regular_hours: Decimal,
    /// Overtime hours worked.
    pub overtime_hours: Decimal,
    /// Amount earned at the regular rate (or the salary/flat portion).
    pub regular_amount: Decimal,
    /// Amount earned at the overtime premium.
    pub overtime_amount: Decimal,
    /// Flat bonus amount this period.
    pub bonus_amount: Decimal,
}

/// One garnishment withholding on a paycheck, in served order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarnishmentLine {
    /// External case reference for the order.
    pub case_ref: String,
    /// The legal class of the order.
    pub kind: GarnishmentKind,
    /// The amount withheld this period (may be zero for starved orders).
    pub amount: Decimal,
}

/// One voluntary deduction taken on a paycheck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// A short code identifying the deduction (e.g., "401k").
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// The amount actually deducted (may be pro-rata reduced).
    pub amount: Decimal,
}

/// A non-fatal condition noted during calculation (e.g., a voluntary
/// deduction reduced for lack of remaining income).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaycheckWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// Disbursement state of a paycheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Calculated but not yet committed.
    Pending,
    /// Committed and handed to the disbursement gateway.
    Paid,
    /// A reversing entry created when a completed run is voided.
    Reversed,
}

/// One employee's result within a payroll run.
///
/// A paycheck is owned exclusively by its run and becomes immutable once
/// the run reaches `completed`. The core invariant is exact balance:
/// `gross_pay − Σtaxes − Σgarnishments − Σdeductions == net_pay`, which
/// [`Paycheck::balances`] checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paycheck {
    /// Unique identifier for this paycheck.
    pub id: Uuid,
    /// The run this paycheck belongs to.
    pub payroll_run_id: Uuid,
    /// The employee this paycheck pays.
    pub employee_id: String,
    /// How the gross was earned.
    pub earnings: EarningsBreakdown,
    /// Total earnings before any withholding.
    pub gross_pay: Decimal,
    /// Statutory taxes withheld, by tax type.
    pub taxes: BTreeMap<TaxType, Decimal>,
    /// Garnishments withheld, in served (priority) order.
    pub garnishments: Vec<GarnishmentLine>,
    /// Voluntary deductions taken after garnishments.
    pub deductions: Vec<DeductionLine>,
    /// Take-home pay.
    pub net_pay: Decimal,
    /// Employer-side payroll taxes (FICA match); not part of the net
    /// balance, feeds run totals only.
    pub employer_taxes: Decimal,
    /// Wages subject to each capped tax this period, used by the YTD ledger
    /// to advance wage bases.
    pub wage_bases: BTreeMap<TaxType, Decimal>,
    /// How net pay is delivered.
    pub payment_method: PaymentMethod,
    /// Disbursement state.
    pub payment_status: PaymentStatus,
    /// Non-fatal conditions noted during calculation.
    #[serde(default)]
    pub warnings: Vec<PaycheckWarning>,
    /// For reversing entries, the paycheck being reversed.
    #[serde(default)]
    pub reverses: Option<Uuid>,
}

impl Paycheck {
    /// Sum of all statutory taxes withheld.
    pub fn total_taxes(&self) -> Decimal {
        self.taxes.values().copied().sum()
    }

    /// Sum of all garnishments withheld.
    pub fn total_garnishments(&self) -> Decimal {
        self.garnishments.iter().map(|g| g.amount).sum()
    }

    /// Sum of all voluntary deductions taken.
    pub fn total_deductions(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    /// Checks the balance invariant exactly, with no rounding tolerance.
    pub fn balances(&self) -> bool {
        self.gross_pay - self.total_taxes() - self.total_garnishments() - self.total_deductions()
            == self.net_pay
    }

    /// Builds the reversing entry for this paycheck: every amount negated,
    /// status [`PaymentStatus::Reversed`], linked back to the original.
    /// The original is left untouched.
    pub fn reversed(&self) -> Paycheck {
        Paycheck {
            id: Uuid::new_v4(),
            payroll_run_id: self.payroll_run_id,
            employee_id: self.employee_id.clone(),
            earnings: EarningsBreakdown {
                regular_hours: -self.earnings.regular_hours,
                overtime_hours: -self.earnings.overtime_hours,
                regular_amount: -self.earnings.regular_amount,
                overtime_amount: -self.earnings.overtime_amount,
                bonus_amount: -self.earnings.bonus_amount,
            },
            gross_pay: -self.gross_pay,
            taxes: self.taxes.iter().map(|(t, a)| (*t, -a)).collect(),
            garnishments: self
                .garnishments
                .iter()
                .map(|g| GarnishmentLine {
                    case_ref: g.case_ref.clone(),
                    kind: g.kind,
                    amount: -g.amount,
                })
                .collect(),
            deductions: self
                .deductions
                .iter()
                .map(|d| DeductionLine {
                    code: d.code.clone(),
                    description: d.description.clone(),
                    amount: -d.amount,
                })
                .collect(),
            net_pay: -self.net_pay,
            employer_taxes: -self.employer_taxes,
            wage_bases: self.wage_bases.iter().map(|(t, a)| (*t, -a)).collect(),
            payment_method: self.payment_method,
            payment_status: PaymentStatus::Reversed,
            warnings: vec![],
            reverses: Some(self.id),
        }
    }
}
