//! Disbursement gateway boundary.
//!
//! The gateway is the one irreversible external effect in the commit
//! sequence: once it accepts a batch, money moves. The engine therefore
//! invokes it last, only after all internal state is durable, and relies on
//! the gateway being idempotent on the run id so a retry after a crash
//! cannot double-disburse.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PaymentMethod;

/// One net-pay instruction within a disbursement batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayInstruction {
    /// The employee to pay.
    pub employee_id: String,
    /// The amount to deliver.
    pub net_pay: Decimal,
    /// How to deliver it.
    pub payment_method: PaymentMethod,
}

/// The gateway's decision on a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDecision {
    /// The batch was accepted for settlement.
    Accepted,
    /// The batch was rejected; no money moved.
    Rejected {
        /// The gateway's rejection reason.
        reason: String,
    },
}

/// External service accepting finalized batches of net-pay instructions.
///
/// Implementations must be idempotent on `run_id`: resubmitting the same
/// batch for the same run is safe and settles at most once.
#[async_trait]
pub trait DisbursementGateway: Send + Sync {
    /// Submits the batch for the given run.
    async fn submit_batch(&self, run_id: Uuid, instructions: &[PayInstruction]) -> BatchDecision;
}
