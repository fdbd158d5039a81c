//! Payroll run model.
//!
//! This module contains the [`PayrollRun`] record, its status enum, and the
//! aggregate totals derived from the run's paychecks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pay_period::PayPeriod;
use super::paycheck::Paycheck;

/// The kind of payroll execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollType {
    /// A normal scheduled run.
    #[default]
    Regular,
    /// An unscheduled run outside the normal calendar.
    OffCycle,
    /// A bonus-only run.
    Bonus,
    /// A terminating employee's final pay.
    Final,
}

/// Lifecycle status of a payroll run.
///
/// Legal transitions form a single path to `completed` with three
/// soft-terminal exits: `failed` (from `calculated` or `processing`),
/// `cancelled` (discard before approval), and `voided` (compensating
/// reversal after `completed`). Runs are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, nothing calculated yet.
    Draft,
    /// Every eligible employee's paycheck calculated and staged.
    Calculated,
    /// Awaiting maker-checker approval.
    PendingApproval,
    /// Approved, ready to process.
    Approved,
    /// The terminal commit is in flight.
    Processing,
    /// Committed: paychecks final, ledger updated, disbursement accepted.
    Completed,
    /// The commit halted before the gateway accepted; nothing was applied.
    Failed,
    /// Discarded before approval; no side effects existed to undo.
    Cancelled,
    /// Reversed after completion through compensating entries.
    Voided,
}

impl RunStatus {
    /// The snake_case name used in error messages and audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Draft => "draft",
            RunStatus::Calculated => "calculated",
            RunStatus::PendingApproval => "pending_approval",
            RunStatus::Approved => "approved",
            RunStatus::Processing => "processing",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Voided => "voided",
        }
    }
}

/// Aggregate money totals for a run.
///
/// Totals are always derived from the run's paychecks via
/// [`RunTotals::from_paychecks`]; they are never maintained independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Sum of paycheck gross pay.
    pub gross: Decimal,
    /// Sum of employee-side taxes withheld.
    pub taxes: Decimal,
    /// Sum of garnishments and voluntary deductions.
    pub deductions: Decimal,
    /// Sum of net pay.
    pub net: Decimal,
    /// Sum of employer-side payroll taxes.
    pub employer_taxes: Decimal,
}

impl RunTotals {
    /// Zeroed totals for a run with no paychecks.
    pub fn zero() -> Self {
        RunTotals {
            gross: Decimal::ZERO,
            taxes: Decimal::ZERO,
            deductions: Decimal::ZERO,
            net: Decimal::ZERO,
            employer_taxes: Decimal::ZERO,
        }
    }

    /// Derives totals by summing the given paychecks.
    pub fn from_paychecks<'a, I>(paychecks: I) -> Self
    where
        I: IntoIterator<Item = &'a Paycheck>,
    {
        let mut totals = RunTotals::zero();
        for check in paychecks {
            totals.gross += check.gross_pay;
            totals.taxes += check.total_taxes();
            totals.deductions += check.total_garnishments() + check.total_deductions();
            totals.net += check.net_pay;
            totals.employer_taxes += check.employer_taxes;
        }
        totals
    }
}

/// An employee excluded from a run during calculation, surfaced so an
/// operator can correct the inputs and retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedEmployee {
    /// The excluded employee.
    pub employee_id: String,
    /// Why the employee was excluded.
    pub reason: String,
}

/// One payroll execution for one company.
///
/// The run is the unit of atomicity: its paychecks are staged together,
/// approved together, and committed together. The `version` field implements
/// optimistic concurrency; every state transition checks and increments it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// The company (tenant) the run pays.
    pub company_id: String,
    /// The period the run covers.
    pub period: PayPeriod,
    /// The kind of execution.
    pub payroll_type: PayrollType,
    /// Current lifecycle status.
    pub status: RunStatus,
    /// Aggregate totals, derived from paychecks.
    pub totals: RunTotals,
    /// Employees excluded during the last calculation, with reasons.
    #[serde(default)]
    pub excluded: Vec<ExcludedEmployee>,
    /// The user who created the run.
    pub created_by: String,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// The user who approved the run (maker-checker: never `created_by`).
    pub approved_by: Option<String>,
    /// When the run was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the terminal commit finished.
    pub processed_at: Option<DateTime<Utc>>,
    /// Why the run was voided, when it was.
    pub void_reason: Option<String>,
    /// Monotonic version for optimistic concurrency.
    pub version: u64,
}

impl PayrollRun {
    /// Creates a new run in `draft` at version 0.
    pub fn new(
        company_id: impl Into<String>,
        period: PayPeriod,
        payroll_type: PayrollType,
        created_by: impl Into<String>,
    ) -> Self {
        PayrollRun {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            period,
            payroll_type,
            status: RunStatus::Draft,
            totals: RunTotals::zero(),
            excluded: vec![],
            created_by: created_by.into(),
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            processed_at: None,
            void_reason: None,
            version: 0,
        }
    }
}
