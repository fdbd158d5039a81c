//! Ruleset payload types.
//!
//! A ruleset is an effective-dated, immutable bundle of tax parameters for
//! one jurisdiction. The engine consumes rulesets; it never authors them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::FilingStatus;

/// One bracket in an annualized income tax table.
///
/// The bracket containing an annual income yields a tax of
/// `base_tax + rate × (income − min_income)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Lower bound of the bracket (inclusive).
    pub min_income: Decimal,
    /// Upper bound of the bracket (exclusive); `None` for the top bracket.
    pub max_income: Option<Decimal>,
    /// Marginal rate within the bracket.
    pub rate: Decimal,
    /// Tax accumulated by all lower brackets.
    pub base_tax: Decimal,
}

/// Annualized bracket tables keyed by filing status.
///
/// Tables are expected to cover income from zero upward; income below the
/// lowest bracket withholds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxTable {
    /// Bracket table per filing status.
    pub brackets: BTreeMap<FilingStatus, Vec<TaxBracket>>,
}

impl IncomeTaxTable {
    /// Computes the annual tax for the given filing status and annual income.
    ///
    /// Returns `None` when the table has no entry for the filing status.
    pub fn annual_tax(&self, filing_status: FilingStatus, annual_income: Decimal) -> Option<Decimal> {
        let brackets = self.brackets.get(&filing_status)?;
        let bracket = brackets.iter().find(|b| {
            annual_income >= b.min_income
                && b.max_income.map_or(true, |max| annual_income < max)
        });
        Some(match bracket {
            Some(b) => b.base_tax + b.rate * (annual_income - b.min_income),
            None => Decimal::ZERO,
        })
    }
}

/// Flat-rate payroll tax parameters (FICA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaParameters {
    /// Social Security rate (employee side; the employer match is equal).
    pub social_security_rate: Decimal,
    /// Annual Social Security wage base ceiling.
    pub social_security_wage_base: Decimal,
    /// Medicare rate (employee side; the employer match is equal).
    pub medicare_rate: Decimal,
    /// Additional Medicare surtax rate above the threshold (employee only).
    pub additional_medicare_rate: Decimal,
    /// Annual wage threshold where the additional Medicare surtax begins.
    pub additional_medicare_threshold: Decimal,
}

/// The typed parameter bundle carried by a ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RulesetPayload {
    /// Bracket-method income tax (federal, state, or local).
    IncomeTax(IncomeTaxTable),
    /// Social Security and Medicare parameters.
    Fica(FicaParameters),
}

/// An effective-dated tax parameter bundle for one jurisdiction.
///
/// Immutable once published. The active ruleset for a date is the one whose
/// `[effective_start, effective_end)` interval contains it; the highest
/// `version` wins when intervals overlap.
///
/// # Example
///
/// ```
/// use payroll_engine::ruleset::{FicaParameters, Ruleset, RulesetPayload};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let ruleset = Ruleset {
///     key: "fica".to_string(),
///     jurisdiction: "US".to_string(),
///     version: 1,
///     effective_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     effective_end: None,
///     payload: RulesetPayload::Fica(FicaParameters {
///         social_security_rate: Decimal::from_str("0.062").unwrap(),
///         social_security_wage_base: Decimal::from(176_100),
///         medicare_rate: Decimal::from_str("0.0145").unwrap(),
///         additional_medicare_rate: Decimal::from_str("0.009").unwrap(),
///         additional_medicare_threshold: Decimal::from(200_000),
///     }),
/// };
/// assert!(ruleset.is_active(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// The parameter kind (e.g., "income_tax", "fica").
    pub key: String,
    /// The jurisdiction the parameters apply to (e.g., "US", "CA", "NYC").
    pub jurisdiction: String,
    /// Publication version; highest wins on overlapping intervals.
    pub version: u32,
    /// First date the ruleset is effective (inclusive).
    pub effective_start: NaiveDate,
    /// Date the ruleset stops being effective (exclusive); `None` if open.
    pub effective_end: Option<NaiveDate>,
    /// The typed parameters.
    pub payload: RulesetPayload,
}

impl Ruleset {
    /// True when `as_of` falls inside `[effective_start, effective_end)`.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.effective_start <= as_of && self.effective_end.map_or(true, |end| as_of < end)
    }
}
