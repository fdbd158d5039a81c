//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type defining the date window a
//! payroll run covers and the date employees are paid.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The date range a payroll run covers, plus the disbursement date.
///
/// The pay date determines which rulesets are active and which tax year
/// the run's amounts accumulate into.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
///     pay_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
/// };
/// assert_eq!(period.tax_year(), 2025);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// Last day of the period (inclusive).
    pub end: NaiveDate,
    /// The date employees are paid.
    pub pay_date: NaiveDate,
}

impl PayPeriod {
    /// The tax year this period's amounts accumulate into.
    ///
    /// Payroll tax liability attaches to the pay date, not the work dates,
    /// so a period worked in late December but paid in January belongs to
    /// the new tax year.
    pub fn tax_year(&self) -> i32 {
        self.pay_date.year()
    }

    /// Validates that the period's dates are internally consistent.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end && self.pay_date >= self.end
    }
}
