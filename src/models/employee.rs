//! Employee pay profile models.
//!
//! This module defines the [`PayProfile`] struct and its supporting enums
//! describing one employee's pay inputs for a single pay period: how they
//! earn, how they file, where they work, and what standing deductions and
//! garnishment orders apply.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::garnishment::GarnishmentOrder;

/// Tax filing status used to select a bracket table from an income tax ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    /// Single filer.
    Single,
    /// Married filing jointly.
    MarriedJoint,
    /// Married filing separately.
    MarriedSeparate,
    /// Head of household.
    HeadOfHousehold,
}

impl FilingStatus {
    /// Returns the snake_case name used in ruleset files and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedJoint => "married_joint",
            FilingStatus::MarriedSeparate => "married_separate",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }
}

/// How often the employee is paid.
///
/// Determines the periods-per-year divisor used to annualize wages for
/// bracket-method withholding and to derive a salaried employee's
/// per-period gross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Paid every week (52 periods per year).
    Weekly,
    /// Paid every two weeks (26 periods per year).
    Biweekly,
    /// Paid twice a month (24 periods per year).
    Semimonthly,
    /// Paid once a month (12 periods per year).
    Monthly,
}

impl PayFrequency {
    /// The number of pay periods in a year for this frequency.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayFrequency;
    ///
    /// assert_eq!(PayFrequency::Biweekly.periods_per_year(), 26);
    /// ```
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Semimonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }
}

/// How the employee earns during the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "basis")]
pub enum PayBasis {
    /// Hourly employee: rate times hours, plus a 1.5x premium on overtime hours.
    Hourly {
        /// The base hourly rate.
        rate: Decimal,
        /// Regular hours worked this period.
        hours: Decimal,
        /// Overtime hours worked this period, paid at 1.5x the base rate.
        overtime_hours: Decimal,
    },
    /// Salaried employee: annual salary divided by periods per year.
    Salaried {
        /// The annual salary.
        annual_salary: Decimal,
    },
    /// One-off flat payment with no regular earnings (e.g., a bonus run).
    Flat {
        /// The flat amount paid this period.
        amount: Decimal,
    },
}

/// How the employee's net pay is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Direct deposit through the disbursement gateway.
    DirectDeposit,
    /// Physical check.
    Check,
}

/// A standing voluntary deduction (retirement, benefits premiums, and similar).
///
/// Voluntary deductions are taken after taxes and garnishments and are
/// reduced pro-rata when insufficient income remains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoluntaryDeduction {
    /// A short code identifying the deduction (e.g., "401k", "medical").
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// The amount to deduct each period.
    pub amount: Decimal,
}

/// One employee's pay inputs for a payroll run.
///
/// The `company_id` is carried explicitly on every profile; there is no
/// ambient tenant context anywhere in the engine.
///
/// # Example
///
/// ```
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
/// assert_eq!(profile.pay_frequency.periods_per_year(), 26);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayProfile {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// The company (tenant) the employee belongs to.
    pub company_id: String,
    /// How the employee earns.
    pub pay_basis: PayBasis,
    /// How often the employee is paid.
    pub pay_frequency: PayFrequency,
    /// Optional flat bonus added on top of the regular earnings this period.
    #[serde(default)]
    pub bonus: Option<Decimal>,
    /// Tax filing status.
    pub filing_status: FilingStatus,
    /// The state the employee works in (e.g., "CA").
    pub work_state: String,
    /// Optional local tax jurisdiction (e.g., "NYC"). When set, a local
    /// income tax ruleset must be published for it.
    #[serde(default)]
    pub locality: Option<String>,
    /// How net pay is delivered.
    pub payment_method: PaymentMethod,
    /// Standing voluntary deductions.
    #[serde(default)]
    pub deductions: Vec<VoluntaryDeduction>,
    /// Active garnishment orders against the employee's wages.
    #[serde(default)]
    pub garnishments: Vec<GarnishmentOrder>,
}
