//! Employee directory boundary.
//!
//! The directory is an external collaborator: it owns employee and company
//! records and answers, read-only, which employees are eligible for a given
//! company and pay period.

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::models::{PayPeriod, PayProfile};

/// Read-only source of eligible employees and their pay profiles.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the pay profiles of every employee eligible for the company
    /// and period.
    async fn eligible_employees(
        &self,
        company_id: &str,
        period: &PayPeriod,
    ) -> EngineResult<Vec<PayProfile>>;
}

/// A directory backed by a fixed set of profiles, filtered by company.
///
/// Suitable for tests and single-process deployments where eligibility is
/// resolved upstream.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: Vec<PayProfile>,
}

impl InMemoryDirectory {
    /// Creates a directory over the given profiles.
    pub fn new(profiles: Vec<PayProfile>) -> Self {
        InMemoryDirectory { profiles }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn eligible_employees(
        &self,
        company_id: &str,
        _period: &PayPeriod,
    ) -> EngineResult<Vec<PayProfile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilingStatus, PayBasis, PayFrequency, PaymentMethod};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn profile(employee_id: &str, company_id: &str) -> PayProfile {
        PayProfile {
            employee_id: employee_id.to_string(),
            company_id: company_id.to_string(),
            pay_basis: PayBasis::Salaried {
                annual_salary: Decimal::from(100_000),
            },
            pay_frequency: PayFrequency::Biweekly,
            bonus: None,
            filing_status: FilingStatus::Single,
            work_state: "CA".to_string(),
            locality: None,
            payment_method: PaymentMethod::DirectDeposit,
            deductions: vec![],
            garnishments: vec![],
        }
    }

    fn period() -> PayPeriod {
        PayPeriod {
            start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            pay_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_filters_by_company() {
        let directory = InMemoryDirectory::new(vec![
            profile("emp_1", "co_a"),
            profile("emp_2", "co_b"),
            profile("emp_3", "co_a"),
        ]);

        let eligible = directory.eligible_employees("co_a", &period()).await.unwrap();
        let ids: Vec<&str> = eligible.iter().map(|p| p.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_1", "emp_3"]);
    }

    #[tokio::test]
    async fn test_unknown_company_yields_empty() {
        let directory = InMemoryDirectory::new(vec![profile("emp_1", "co_a")]);
        let eligible = directory.eligible_employees("co_x", &period()).await.unwrap();
        assert!(eligible.is_empty());
    }
}
