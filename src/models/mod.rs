//! Core data models for the payroll processing core.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod garnishment;
mod pay_period;
mod paycheck;
mod run;

pub use employee::{
    FilingStatus, PayBasis, PayFrequency, PayProfile, PaymentMethod, VoluntaryDeduction,
};
pub use garnishment::{GarnishmentKind, GarnishmentOrder};
pub use pay_period::PayPeriod;
pub use paycheck::{
    DeductionLine, EarningsBreakdown, GarnishmentLine, Paycheck, PaycheckWarning, PaymentStatus,
    TaxType,
};
pub use run::{ExcludedEmployee, PayrollRun, PayrollType, RunStatus, RunTotals};
