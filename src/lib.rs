//! Multi-tenant payroll processing core.
//!
//! This crate calculates employee paychecks (gross-to-net with bracket
//! withholding, FICA, garnishments, and voluntary deductions), maintains
//! idempotent year-to-date balances, and drives payroll runs through a
//! maker-checker lifecycle that commits atomically against an external
//! disbursement gateway.

#![warn(missing_docs)]

pub mod api;
pub mod audit;
pub mod calculation;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod models;
pub mod ruleset;
