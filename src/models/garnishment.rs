//! Garnishment order models.
//!
//! This module defines the [`GarnishmentOrder`] type and the fixed federal
//! priority classes that determine the order in which concurrent garnishments
//! are served out of disposable income.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The legal class of a garnishment order.
///
/// The priority ordering across classes is fixed by federal law and is not
/// configurable. Lower priority numbers are served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarnishmentKind {
    /// Child or spousal support order.
    ChildSupport,
    /// Federal tax levy.
    FederalTaxLevy,
    /// Defaulted federal student loan.
    StudentLoan,
    /// State tax levy.
    StateTaxLevy,
    /// Creditor or consumer garnishment.
    Creditor,
    /// Voluntary wage assignment.
    WageAssignment,
}

impl GarnishmentKind {
    /// The federal priority of this class; lower is served first.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::GarnishmentKind;
    ///
    /// assert!(GarnishmentKind::ChildSupport.priority() < GarnishmentKind::Creditor.priority());
    /// ```
    pub fn priority(&self) -> u8 {
        match self {
            GarnishmentKind::ChildSupport => 1,
            GarnishmentKind::FederalTaxLevy => 2,
            GarnishmentKind::StudentLoan => 3,
            GarnishmentKind::StateTaxLevy => 4,
            GarnishmentKind::Creditor => 5,
            GarnishmentKind::WageAssignment => 6,
        }
    }

    /// Returns true for support orders, which use the 50/60/65% cap tier
    /// instead of the 25% cap that applies to everything else.
    pub fn is_support(&self) -> bool {
        matches!(self, GarnishmentKind::ChildSupport)
    }
}

/// An active garnishment order against an employee's wages.
///
/// Orders are supplied by the external case-management system; this engine
/// only withholds. Arrears tracking for orders starved in a given period
/// stays with the case-management system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarnishmentOrder {
    /// External case reference for the order.
    pub case_ref: String,
    /// The legal class of the order.
    pub kind: GarnishmentKind,
    /// The amount sought per pay period.
    pub amount_per_period: Decimal,
    /// True when the obligor is in arrears (raises the support cap tier).
    #[serde(default)]
    pub in_arrears: bool,
    /// The date the order was filed or received; earliest is served first
    /// within the same priority class.
    pub received: NaiveDate,
}
