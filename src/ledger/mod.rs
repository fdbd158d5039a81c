//! Year-to-date accumulators.
//!
//! This module provides the [`YtdLedger`], the per-employee running totals
//! that the calculator reads (for wage-base ceilings) and the run engine
//! writes after a run commits. The accumulator is the source of truth going
//! forward: it is advanced by summing each completed run's paychecks into
//! it, never recomputed by replaying history.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Paycheck, TaxType};

/// Running totals for one (employee, tax year) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtdAccumulator {
    /// The employee the totals belong to.
    pub employee_id: String,
    /// The tax year the totals cover.
    pub tax_year: i32,
    /// Gross pay accumulated this year.
    pub ytd_gross: Decimal,
    /// Net pay accumulated this year.
    pub ytd_net: Decimal,
    /// Withholding accumulated this year, per tax type.
    pub ytd_withheld: BTreeMap<TaxType, Decimal>,
    /// Taxed wages accumulated this year per capped tax, compared against
    /// annual wage bases and thresholds by the calculator.
    pub ytd_wage_bases: BTreeMap<TaxType, Decimal>,
}

impl YtdAccumulator {
    /// A zeroed accumulator for an employee's first sighting in a tax year.
    pub fn zeroed(employee_id: impl Into<String>, tax_year: i32) -> Self {
        YtdAccumulator {
            employee_id: employee_id.into(),
            tax_year,
            ytd_gross: Decimal::ZERO,
            ytd_net: Decimal::ZERO,
            ytd_withheld: BTreeMap::new(),
            ytd_wage_bases: BTreeMap::new(),
        }
    }

    /// Amount withheld so far this year for a tax type.
    pub fn withheld(&self, tax: TaxType) -> Decimal {
        self.ytd_withheld.get(&tax).copied().unwrap_or(Decimal::ZERO)
    }

    /// Taxed wages so far this year for a capped tax type.
    pub fn wage_base(&self, tax: TaxType) -> Decimal {
        self.ytd_wage_bases
            .get(&tax)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Adds one paycheck's amounts into the accumulator.
    ///
    /// Reversing paychecks carry negated amounts, so the same operation
    /// applies both commits and void adjustments.
    pub fn absorb(&mut self, paycheck: &Paycheck) {
        self.ytd_gross += paycheck.gross_pay;
        self.ytd_net += paycheck.net_pay;
        for (tax, amount) in &paycheck.taxes {
            *self.ytd_withheld.entry(*tax).or_insert(Decimal::ZERO) += amount;
        }
        for (tax, wages) in &paycheck.wage_bases {
            *self.ytd_wage_bases.entry(*tax).or_insert(Decimal::ZERO) += wages;
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    accumulators: HashMap<(String, i32), YtdAccumulator>,
    applied: HashSet<Uuid>,
}

/// The per-employee year-to-date ledger.
///
/// A single writer lock serializes every update, which realizes the
/// required per-(employee, tax year) serialization: concurrent runs cannot
/// interleave partial increments. Applies are idempotent keyed on the apply
/// key, guarding against retry after a partial failure during commit.
#[derive(Debug, Default)]
pub struct YtdLedger {
    state: Mutex<LedgerState>,
}

impl YtdLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        YtdLedger::default()
    }

    /// Returns a snapshot of the accumulator for (employee, tax year).
    ///
    /// First sight of a pair yields a zeroed accumulator, not an error.
    pub fn get(&self, employee_id: &str, tax_year: i32) -> YtdAccumulator {
        let state = self.state.lock().expect("ledger lock poisoned");
        state
            .accumulators
            .get(&(employee_id.to_string(), tax_year))
            .cloned()
            .unwrap_or_else(|| YtdAccumulator::zeroed(employee_id, tax_year))
    }

    /// Atomically adds each paycheck's amounts into the corresponding
    /// accumulators.
    ///
    /// Idempotent on `apply_key`: applying the same key twice is a no-op,
    /// not a double count. Returns `true` when the apply took effect and
    /// `false` when the key had already been applied.
    pub fn apply_run(&self, apply_key: Uuid, tax_year: i32, paychecks: &[Paycheck]) -> bool {
        let mut state = self.state.lock().expect("ledger lock poisoned");
        if !state.applied.insert(apply_key) {
            return false;
        }
        for check in paychecks {
            let key = (check.employee_id.clone(), tax_year);
            state
                .accumulators
                .entry(key)
                .or_insert_with(|| YtdAccumulator::zeroed(&check.employee_id, tax_year))
                .absorb(check);
        }
        true
    }

    /// Compensating un-apply for a commit that halted before the gateway
    /// accepted. Subtracts the paychecks' amounts and forgets the apply key
    /// so a corrected retry can apply again. A no-op when the key was never
    /// applied.
    pub fn revert_run(&self, apply_key: Uuid, tax_year: i32, paychecks: &[Paycheck]) -> bool {
        let mut state = self.state.lock().expect("ledger lock poisoned");
        if !state.applied.remove(&apply_key) {
            return false;
        }
        for check in paychecks {
            let key = (check.employee_id.clone(), tax_year);
            if let Some(acc) = state.accumulators.get_mut(&key) {
                acc.ytd_gross -= check.gross_pay;
                acc.ytd_net -= check.net_pay;
                for (tax, amount) in &check.taxes {
                    *acc.ytd_withheld.entry(*tax).or_insert(Decimal::ZERO) -= amount;
                }
                for (tax, wages) in &check.wage_bases {
                    *acc.ytd_wage_bases.entry(*tax).or_insert(Decimal::ZERO) -= wages;
                }
            }
        }
        true
    }
}
