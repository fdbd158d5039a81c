//! Statutory tax withholding.
//!
//! This module computes every mandatory tax for one paycheck: bracket-method
//! income taxes (federal, state, optional local) on annualized wages, and
//! FICA taxes with partial-period wage-base capping read from the employee's
//! year-to-date accumulator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::ledger::YtdAccumulator;
use crate::models::{PayProfile, TaxType};
use crate::ruleset::{FicaParameters, IncomeTaxTable, Ruleset, RulesetPayload, RulesetStore};

use super::round_money;

/// Ruleset key for bracket-method income taxes.
pub const INCOME_TAX_KEY: &str = "income_tax";
/// Ruleset key for Social Security / Medicare parameters.
pub const FICA_KEY: &str = "fica";
/// Jurisdiction code for federal rulesets.
pub const FEDERAL_JURISDICTION: &str = "US";

/// The result of computing all statutory withholding for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct WithholdingResult {
    /// Withheld amount per tax, each rounded to minor currency units.
    pub taxes: BTreeMap<TaxType, Decimal>,
    /// Wages subject to each capped tax this period, for the YTD ledger.
    pub wage_bases: BTreeMap<TaxType, Decimal>,
    /// Employer-side FICA match (not withheld from the employee).
    pub employer_taxes: Decimal,
}

impl WithholdingResult {
    /// Sum of all employee-side taxes withheld.
    pub fn total(&self) -> Decimal {
        self.taxes.values().copied().sum()
    }
}

fn income_table<'a>(ruleset: &'a Ruleset) -> EngineResult<&'a IncomeTaxTable> {
    match &ruleset.payload {
        RulesetPayload::IncomeTax(table) => Ok(table),
        _ => Err(EngineError::Validation {
            field: "ruleset".to_string(),
            message: format!(
                "ruleset '{}' for '{}' does not carry an income tax table",
                ruleset.key, ruleset.jurisdiction
            ),
        }),
    }
}

fn fica_parameters<'a>(ruleset: &'a Ruleset) -> EngineResult<&'a FicaParameters> {
    match &ruleset.payload {
        RulesetPayload::Fica(params) => Ok(params),
        _ => Err(EngineError::Validation {
            field: "ruleset".to_string(),
            message: format!(
                "ruleset '{}' for '{}' does not carry fica parameters",
                ruleset.key, ruleset.jurisdiction
            ),
        }),
    }
}

/// Computes one period's income tax withholding by the percentage method:
/// annualize the period wages, tax the annual figure through the bracket
/// table, and de-annualize the result.
fn bracket_withholding(
    table: &IncomeTaxTable,
    profile: &PayProfile,
    gross: Decimal,
    key: &str,
) -> EngineResult<Decimal> {
    let periods = Decimal::from(profile.pay_frequency.periods_per_year());
    let annual_income = gross * periods;
    let annual_tax = table
        .annual_tax(profile.filing_status, annual_income)
        .ok_or_else(|| EngineError::FilingStatusNotCovered {
            key: key.to_string(),
            filing_status: profile.filing_status.as_str().to_string(),
        })?;
    Ok(round_money(annual_tax / periods))
}

/// Computes all statutory withholding for one paycheck.
///
/// Income taxes are looked up for the federal jurisdiction, the employee's
/// work state, and (when set) their locality; any missing ruleset is a
/// blocking [`EngineError::RulesetUnavailable`], never a fallback rate.
/// Social Security withholds only on the portion of gross that keeps
/// `ytd_wages + period wages` within the annual wage base (partial-period
/// capping). The additional Medicare surtax applies only to the portion of
/// wages that crosses the annual threshold.
pub fn calculate_withholding(
    profile: &PayProfile,
    gross: Decimal,
    pay_date: NaiveDate,
    ytd: &YtdAccumulator,
    rulesets: &RulesetStore,
) -> EngineResult<WithholdingResult> {
    let mut taxes = BTreeMap::new();
    let mut wage_bases = BTreeMap::new();

    // Bracket-method income taxes.
    let federal = rulesets.get_active(INCOME_TAX_KEY, FEDERAL_JURISDICTION, pay_date)?;
    taxes.insert(
        TaxType::FederalIncome,
        bracket_withholding(income_table(federal)?, profile, gross, INCOME_TAX_KEY)?,
    );

    let state = rulesets.get_active(INCOME_TAX_KEY, &profile.work_state, pay_date)?;
    taxes.insert(
        TaxType::StateIncome,
        bracket_withholding(income_table(state)?, profile, gross, INCOME_TAX_KEY)?,
    );

    if let Some(locality) = &profile.locality {
        let local = rulesets.get_active(INCOME_TAX_KEY, locality, pay_date)?;
        taxes.insert(
            TaxType::LocalIncome,
            bracket_withholding(income_table(local)?, profile, gross, INCOME_TAX_KEY)?,
        );
    }

    // FICA.
    let fica = fica_parameters(rulesets.get_active(FICA_KEY, FEDERAL_JURISDICTION, pay_date)?)?;

    let ytd_ss_wages = ytd.wage_base(TaxType::SocialSecurity);
    let ss_headroom = (fica.social_security_wage_base - ytd_ss_wages).max(Decimal::ZERO);
    let ss_taxable = gross.min(ss_headroom);
    let social_security = round_money(ss_taxable * fica.social_security_rate);
    taxes.insert(TaxType::SocialSecurity, social_security);
    wage_bases.insert(TaxType::SocialSecurity, ss_taxable);

    let medicare = round_money(gross * fica.medicare_rate);
    taxes.insert(TaxType::Medicare, medicare);
    wage_bases.insert(TaxType::Medicare, gross);

    // Surtax on the portion of wages above the annual threshold, measured
    // against Medicare wages accumulated so far this year.
    let ytd_medicare_wages = ytd.wage_base(TaxType::Medicare);
    let over_threshold = (ytd_medicare_wages + gross - fica.additional_medicare_threshold)
        .max(Decimal::ZERO)
        .min(gross);
    if over_threshold > Decimal::ZERO {
        taxes.insert(
            TaxType::AdditionalMedicare,
            round_money(over_threshold * fica.additional_medicare_rate),
        );
        wage_bases.insert(TaxType::AdditionalMedicare, over_threshold);
    }

    // The employer matches Social Security and Medicare but not the surtax.
    let employer_taxes =
        round_money(ss_taxable * fica.social_security_rate) + round_money(gross * fica.medicare_rate);

    Ok(WithholdingResult {
        taxes,
        wage_bases,
        employer_taxes,
    })
}
