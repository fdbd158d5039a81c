//! Request types for the payroll API.
//!
//! This module defines the JSON request structures for the run
//! lifecycle endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PayPeriod, PayrollType};

/// Request body for `POST /runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    /// The company (tenant) the run belongs to.
    pub company_id: String,
    /// The pay period being processed.
    pub period: PayPeriodRequest,
    /// The kind of run.
    #[serde(default)]
    pub payroll_type: PayrollType,
    /// The user creating the run.
    pub created_by: String,
}

/// Pay period information in a run creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// Last day of the period (inclusive).
    pub end: NaiveDate,
    /// The date employees are paid.
    pub pay_date: NaiveDate,
}

impl From<PayPeriodRequest> for PayPeriod {
    fn from(req: PayPeriodRequest) -> Self {
        PayPeriod {
            start: req.start,
            end: req.end,
            pay_date: req.pay_date,
        }
    }
}

/// Request body for `POST /runs/{id}/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The user approving the run. Must differ from the run's creator.
    pub approver_id: String,
}

/// Request body for `POST /runs/{id}/void`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidRequest {
    /// Why the run is being voided.
    pub reason: String,
    /// The user voiding the run.
    pub actor: String,
}

/// Request body for endpoints that only need to know who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    /// The user performing the action.
    pub actor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_create_run_request() {
        let json = r#"{
            "company_id": "co_001",
            "period": {
                "start": "2025-06-01",
                "end": "2025-06-14",
                "pay_date": "2025-06-20"
            },
            "payroll_type": "regular",
            "created_by": "user_1"
        }"#;

        let request: CreateRunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.company_id, "co_001");
        assert_eq!(request.payroll_type, PayrollType::Regular);
        assert_eq!(
            request.period.pay_date,
            NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
        );
    }

    #[test]
    fn test_payroll_type_defaults_to_regular() {
        let json = r#"{
            "company_id": "co_001",
            "period": {
                "start": "2025-06-01",
                "end": "2025-06-14",
                "pay_date": "2025-06-20"
            },
            "created_by": "user_1"
        }"#;

        let request: CreateRunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.payroll_type, PayrollType::Regular);
    }

    #[test]
    fn test_period_conversion() {
        let req = PayPeriodRequest {
            start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            pay_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        };

        let period: PayPeriod = req.into();
        assert!(period.is_valid());
        assert_eq!(period.tax_year(), 2025);
    }
}
