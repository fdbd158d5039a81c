//! Effective-dated tax parameter lookup for the payroll processing core.
//!
//! Rulesets are published externally as versioned, effective-dated YAML
//! documents; this module loads them and answers deterministic point-in-time
//! lookups. A missing ruleset is always a blocking error: the engine never
//! assumes default tax rates.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::ruleset::RulesetStore;
//! use chrono::NaiveDate;
//!
//! let store = RulesetStore::load("./rulesets").unwrap();
//! let pay_date = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
//! let fica = store.get_active("fica", "US", pay_date).unwrap();
//! println!("Active fica ruleset version {}", fica.version);
//! ```

mod store;
mod types;

pub use store::RulesetStore;
pub use types::{FicaParameters, IncomeTaxTable, Ruleset, RulesetPayload, TaxBracket};
