//! Error types for the payroll processing core.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating and committing
//! a payroll run.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the payroll processing core.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::RulesetUnavailable {
///     key: "income_tax".to_string(),
///     jurisdiction: "CA".to_string(),
///     as_of: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "No active ruleset 'income_tax' for jurisdiction 'CA' as of 2025-06-15"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ruleset file or directory was not found at the specified path.
    #[error("Ruleset file not found: {path}")]
    RulesetFileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Ruleset file could not be parsed.
    #[error("Failed to parse ruleset file '{path}': {message}")]
    RulesetParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No published ruleset covers the requested jurisdiction and date.
    ///
    /// This is always a blocking error: a payroll run must never proceed
    /// with assumed or fallback tax rates.
    #[error("No active ruleset '{key}' for jurisdiction '{jurisdiction}' as of {as_of}")]
    RulesetUnavailable {
        /// The ruleset key (e.g., "income_tax", "fica").
        key: String,
        /// The jurisdiction the lookup was for.
        jurisdiction: String,
        /// The date the lookup was for.
        as_of: NaiveDate,
    },

    /// The active ruleset has no bracket table for the employee's filing status.
    #[error("Ruleset '{key}' has no entry for filing status '{filing_status}'")]
    FilingStatusNotCovered {
        /// The ruleset key.
        key: String,
        /// The filing status that was not covered.
        filing_status: String,
    },

    /// An employee's pay inputs were invalid or inconsistent.
    #[error("Invalid pay input for employee '{employee_id}': {message}")]
    InvalidPayInput {
        /// The employee whose inputs were rejected.
        employee_id: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// Mandatory withholding exceeds gross pay; the employee cannot be paid
    /// this period and is excluded from the run pending manual review.
    #[error(
        "Insufficient earnings for employee '{employee_id}': mandatory withholding exceeds gross pay"
    )]
    InsufficientEarnings {
        /// The employee who could not be paid.
        employee_id: String,
    },

    /// A request field failed validation before any calculation ran.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// No payroll run exists with the given id.
    #[error("Payroll run not found: {run_id}")]
    RunNotFound {
        /// The run id that was not found.
        run_id: Uuid,
    },

    /// The requested transition is not legal from the run's current status.
    #[error("Cannot {action} payroll run {run_id} in status '{status}'")]
    InvalidTransition {
        /// The run the transition was attempted on.
        run_id: Uuid,
        /// The run's current status.
        status: String,
        /// The transition that was attempted (e.g., "approve").
        action: String,
    },

    /// Another transition committed first; the caller must reload and retry.
    #[error(
        "Concurrent modification of payroll run {run_id}: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        /// The contended run.
        run_id: Uuid,
        /// The version the transition was based on.
        expected: u64,
        /// The version actually found at commit time.
        actual: u64,
    },

    /// Maker-checker violation: the approver must differ from the creator.
    #[error("Payroll run {run_id} cannot be approved by its creator '{actor}'")]
    SelfApproval {
        /// The run awaiting approval.
        run_id: Uuid,
        /// The actor who both created and attempted to approve the run.
        actor: String,
    },

    /// The employee directory could not supply eligible employees.
    #[error("Employee directory error: {message}")]
    DirectoryUnavailable {
        /// A description of the directory failure.
        message: String,
    },

    /// The disbursement gateway rejected the batch; the commit was rolled
    /// back and the run marked failed before any money moved.
    #[error("Disbursement gateway rejected batch for run {run_id}: {reason}")]
    GatewayRejected {
        /// The run whose batch was rejected.
        run_id: Uuid,
        /// The gateway's rejection reason.
        reason: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
