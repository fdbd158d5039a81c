//! The payroll run engine.
//!
//! This module owns the run state machine
//! (`draft → calculated → pending_approval → approved → processing →
//! completed`, with `failed`, `cancelled`, and `voided` exits), the
//! atomicity of the terminal commit, and the optimistic concurrency guard
//! on every transition.
//!
//! The commit sequence is ordered so the one irreversible external effect
//! comes last: paychecks are finalized, the YTD ledger is applied
//! (idempotently), the audit trail is written, a pending-disbursement
//! marker is persisted, and only then is the disbursement gateway invoked.
//! A gateway rejection rolls the internal writes back and marks the run
//! `failed`; a crash between marker and acknowledgment is recovered by
//! re-processing, which the marker and the gateway's run-id idempotency
//! make safe.

mod directory;
mod gateway;

pub use directory::{EmployeeDirectory, InMemoryDirectory};
pub use gateway::{BatchDecision, DisbursementGateway, PayInstruction};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde_json::json;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::calculation::calculate_paycheck;
use crate::error::{EngineError, EngineResult};
use crate::ledger::YtdLedger;
use crate::models::{
    ExcludedEmployee, PayPeriod, Paycheck, PaymentStatus, PayrollRun, PayrollType, RunStatus,
    RunTotals,
};
use crate::ruleset::RulesetStore;

const ENTITY_RUN: &str = "payroll_run";

#[derive(Debug, Default)]
struct EngineState {
    runs: HashMap<Uuid, PayrollRun>,
    paychecks: HashMap<Uuid, Vec<Paycheck>>,
    pending_disbursements: HashSet<Uuid>,
}

/// Orchestrates payroll runs for all tenants.
///
/// One engine instance serves every company; the tenant is an explicit
/// `company_id` on each run, never ambient state. Runs are never deleted:
/// discarded runs become `cancelled` and completed runs can only be
/// `voided` through reversing entries.
pub struct PayrollEngine {
    rulesets: Arc<RulesetStore>,
    directory: Arc<dyn EmployeeDirectory>,
    gateway: Arc<dyn DisbursementGateway>,
    ledger: YtdLedger,
    audit: AuditLog,
    state: RwLock<EngineState>,
}

impl PayrollEngine {
    /// Creates an engine over the given ruleset store and collaborators.
    pub fn new(
        rulesets: Arc<RulesetStore>,
        directory: Arc<dyn EmployeeDirectory>,
        gateway: Arc<dyn DisbursementGateway>,
    ) -> Self {
        PayrollEngine {
            rulesets,
            directory,
            gateway,
            ledger: YtdLedger::new(),
            audit: AuditLog::new(),
            state: RwLock::new(EngineState::default()),
        }
    }

    /// The engine's year-to-date ledger.
    pub fn ledger(&self) -> &YtdLedger {
        &self.ledger
    }

    /// The engine's append-only audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Returns a snapshot of a run.
    pub fn get_run(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        let state = self.state.read().expect("engine lock poisoned");
        state
            .runs
            .get(&run_id)
            .cloned()
            .ok_or(EngineError::RunNotFound { run_id })
    }

    /// Returns the paychecks of a run (including reversing entries after a
    /// void), in calculation order.
    pub fn paychecks(&self, run_id: Uuid) -> EngineResult<Vec<Paycheck>> {
        let state = self.state.read().expect("engine lock poisoned");
        if !state.runs.contains_key(&run_id) {
            return Err(EngineError::RunNotFound { run_id });
        }
        Ok(state.paychecks.get(&run_id).cloned().unwrap_or_default())
    }

    fn status_values(run: &PayrollRun) -> serde_json::Value {
        json!({
            "status": run.status.as_str(),
            "version": run.version,
            "totals": run.totals,
        })
    }

    /// Creates a run in `draft` for one company and period.
    pub fn create_run(
        &self,
        company_id: &str,
        period: PayPeriod,
        payroll_type: PayrollType,
        created_by: &str,
    ) -> EngineResult<PayrollRun> {
        if !period.is_valid() {
            return Err(EngineError::Validation {
                field: "period".to_string(),
                message: "start must be on or before end, and pay_date on or after end"
                    .to_string(),
            });
        }
        if company_id.is_empty() {
            return Err(EngineError::Validation {
                field: "company_id".to_string(),
                message: "company_id is required".to_string(),
            });
        }

        let run = PayrollRun::new(company_id, period, payroll_type, created_by);
        self.state
            .write()
            .expect("engine lock poisoned")
            .runs
            .insert(run.id, run.clone());

        self.audit.record(
            created_by,
            "payroll_run.created",
            ENTITY_RUN,
            run.id.to_string(),
            json!(null),
            Self::status_values(&run),
        );
        info!(run_id = %run.id, company_id, "Created payroll run");
        Ok(run)
    }

    /// Runs the calculator for every eligible employee and stages the
    /// results (`draft → calculated`).
    ///
    /// Per-employee calculation is fanned out concurrently; the calculator
    /// is a pure function with no shared mutable state. The transition is
    /// all-or-nothing: any blocking error (bad input, missing ruleset)
    /// leaves the run in `draft` with no paychecks staged. Employees whose
    /// mandatory withholding exceeds gross pay are excluded and listed on
    /// the run instead of failing the whole transition.
    pub async fn calculate(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        let run = self.get_run(run_id)?;
        if run.status != RunStatus::Draft {
            return Err(EngineError::InvalidTransition {
                run_id,
                status: run.status.as_str().to_string(),
                action: "calculate".to_string(),
            });
        }

        let profiles = self
            .directory
            .eligible_employees(&run.company_id, &run.period)
            .await?;
        let tax_year = run.period.tax_year();

        let mut tasks = JoinSet::new();
        for profile in profiles {
            let rulesets = Arc::clone(&self.rulesets);
            let period = run.period;
            let ytd = self.ledger.get(&profile.employee_id, tax_year);
            tasks.spawn(async move {
                calculate_paycheck(run_id, &profile, &period, &ytd, &rulesets)
            });
        }

        let mut checks = Vec::new();
        let mut excluded = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| EngineError::Validation {
                field: "calculation".to_string(),
                message: format!("calculation task failed: {}", e),
            })?;
            match result {
                Ok(check) => checks.push(check),
                Err(EngineError::InsufficientEarnings { employee_id }) => {
                    warn!(run_id = %run_id, employee_id = %employee_id, "Employee excluded from run");
                    excluded.push(ExcludedEmployee {
                        employee_id,
                        reason: "mandatory withholding exceeds gross pay".to_string(),
                    });
                }
                Err(blocking) => return Err(blocking),
            }
        }
        checks.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

        let old_values;
        let updated = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            if stored.version != run.version {
                return Err(EngineError::ConcurrentModification {
                    run_id,
                    expected: run.version,
                    actual: stored.version,
                });
            }
            old_values = Self::status_values(stored);
            stored.status = RunStatus::Calculated;
            stored.totals = RunTotals::from_paychecks(&checks);
            stored.excluded = excluded;
            stored.version += 1;
            let updated = stored.clone();
            state.paychecks.insert(run_id, checks);
            updated
        };

        self.audit.record(
            updated.created_by.clone(),
            "payroll_run.calculated",
            ENTITY_RUN,
            run_id.to_string(),
            old_values,
            Self::status_values(&updated),
        );
        info!(
            run_id = %run_id,
            gross = %updated.totals.gross,
            net = %updated.totals.net,
            excluded = updated.excluded.len(),
            "Calculated payroll run"
        );
        Ok(updated)
    }

    /// Sends a calculated run for approval (`calculated → pending_approval`).
    pub fn submit_for_approval(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        let (old_values, updated) = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let has_paychecks = state
                .paychecks
                .get(&run_id)
                .is_some_and(|checks| !checks.is_empty());
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            if stored.status != RunStatus::Calculated {
                return Err(EngineError::InvalidTransition {
                    run_id,
                    status: stored.status.as_str().to_string(),
                    action: "submit".to_string(),
                });
            }
            if !has_paychecks {
                return Err(EngineError::Validation {
                    field: "paychecks".to_string(),
                    message: "run has no calculated paychecks to approve".to_string(),
                });
            }
            let old_values = Self::status_values(stored);
            stored.status = RunStatus::PendingApproval;
            stored.version += 1;
            (old_values, stored.clone())
        };

        self.audit.record(
            updated.created_by.clone(),
            "payroll_run.submitted",
            ENTITY_RUN,
            run_id.to_string(),
            old_values,
            Self::status_values(&updated),
        );
        Ok(updated)
    }

    /// Approves a run (`pending_approval → approved`).
    ///
    /// Maker-checker: the approver must differ from the run's creator.
    pub fn approve(&self, run_id: Uuid, approver_id: &str) -> EngineResult<PayrollRun> {
        let (old_values, updated) = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            if stored.status != RunStatus::PendingApproval {
                return Err(EngineError::InvalidTransition {
                    run_id,
                    status: stored.status.as_str().to_string(),
                    action: "approve".to_string(),
                });
            }
            if stored.created_by == approver_id {
                return Err(EngineError::SelfApproval {
                    run_id,
                    actor: approver_id.to_string(),
                });
            }
            let old_values = Self::status_values(stored);
            stored.status = RunStatus::Approved;
            stored.approved_by = Some(approver_id.to_string());
            stored.approved_at = Some(Utc::now());
            stored.version += 1;
            (old_values, stored.clone())
        };

        self.audit.record(
            approver_id,
            "payroll_run.approved",
            ENTITY_RUN,
            run_id.to_string(),
            old_values,
            Self::status_values(&updated),
        );
        info!(run_id = %run_id, approver = approver_id, "Approved payroll run");
        Ok(updated)
    }

    /// Commits an approved run (`approved → processing → completed`).
    ///
    /// The sequence is paychecks-finalize, YTD-apply, audit-write, then the
    /// gateway last. A rejection rolls the YTD apply back and marks the run
    /// `failed`, leaving no dangling writes. Re-invoking `process` on a run
    /// stuck in `processing` with its pending-disbursement marker set is
    /// the crash-recovery path; the ledger apply and the gateway are both
    /// idempotent on the run id, so the retry cannot double-pay.
    pub async fn process(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        // Claim the run.
        let (run, checks, fresh_claim) = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let pending = state.pending_disbursements.contains(&run_id);
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            let fresh_claim = match stored.status {
                RunStatus::Approved => {
                    stored.status = RunStatus::Processing;
                    stored.version += 1;
                    true
                }
                // Retry after an interrupted commit: the marker proves the
                // gateway may already have been invoked.
                RunStatus::Processing if pending => false,
                _ => {
                    return Err(EngineError::InvalidTransition {
                        run_id,
                        status: stored.status.as_str().to_string(),
                        action: "process".to_string(),
                    });
                }
            };
            let run = stored.clone();
            let checks = state.paychecks.get(&run_id).cloned().unwrap_or_default();
            (run, checks, fresh_claim)
        };

        let actor = run
            .approved_by
            .clone()
            .unwrap_or_else(|| "system".to_string());
        if fresh_claim {
            self.audit.record(
                actor.clone(),
                "payroll_run.processing",
                ENTITY_RUN,
                run_id.to_string(),
                json!({"status": RunStatus::Approved.as_str()}),
                Self::status_values(&run),
            );
        }

        let tax_year = run.period.tax_year();

        // Internal writes, in order: ledger apply (idempotent on run id),
        // audit, then the pending marker ahead of the irreversible call.
        let applied = self.ledger.apply_run(run_id, tax_year, &checks);
        if applied {
            self.audit.record(
                actor.clone(),
                "payroll_run.ledger_applied",
                ENTITY_RUN,
                run_id.to_string(),
                json!(null),
                json!({"tax_year": tax_year, "paychecks": checks.len()}),
            );
        }
        self.state
            .write()
            .expect("engine lock poisoned")
            .pending_disbursements
            .insert(run_id);

        let instructions: Vec<PayInstruction> = checks
            .iter()
            .map(|check| PayInstruction {
                employee_id: check.employee_id.clone(),
                net_pay: check.net_pay,
                payment_method: check.payment_method,
            })
            .collect();

        match self.gateway.submit_batch(run_id, &instructions).await {
            BatchDecision::Accepted => {
                let updated = {
                    let mut state = self.state.write().expect("engine lock poisoned");
                    state.pending_disbursements.remove(&run_id);
                    if let Some(staged) = state.paychecks.get_mut(&run_id) {
                        for check in staged.iter_mut() {
                            check.payment_status = PaymentStatus::Paid;
                        }
                    }
                    let stored = state
                        .runs
                        .get_mut(&run_id)
                        .ok_or(EngineError::RunNotFound { run_id })?;
                    stored.status = RunStatus::Completed;
                    stored.processed_at = Some(Utc::now());
                    stored.version += 1;
                    stored.clone()
                };

                self.audit.record(
                    actor,
                    "payroll_run.completed",
                    ENTITY_RUN,
                    run_id.to_string(),
                    json!({"status": RunStatus::Processing.as_str()}),
                    Self::status_values(&updated),
                );
                info!(run_id = %run_id, net = %updated.totals.net, "Completed payroll run");
                Ok(updated)
            }
            BatchDecision::Rejected { reason } => {
                // The gateway moved no money; undo the internal writes so
                // the failed run looks like the commit never started.
                self.ledger.revert_run(run_id, tax_year, &checks);
                {
                    let mut state = self.state.write().expect("engine lock poisoned");
                    state.pending_disbursements.remove(&run_id);
                    if let Some(stored) = state.runs.get_mut(&run_id) {
                        stored.status = RunStatus::Failed;
                        stored.version += 1;
                    }
                }

                self.audit.record(
                    actor,
                    "payroll_run.failed",
                    ENTITY_RUN,
                    run_id.to_string(),
                    json!({"status": RunStatus::Processing.as_str()}),
                    json!({"status": RunStatus::Failed.as_str(), "reason": reason}),
                );
                warn!(run_id = %run_id, reason = %reason, "Disbursement gateway rejected batch");
                Err(EngineError::GatewayRejected { run_id, reason })
            }
        }
    }

    /// Voids a completed run (`completed → voided`).
    ///
    /// Creates reversing paychecks and reversing YTD adjustments; the
    /// original records are left untouched. This is a compensating action,
    /// not a rollback.
    pub fn void(&self, run_id: Uuid, reason: &str, actor: &str) -> EngineResult<PayrollRun> {
        let (old_values, updated, reversals, tax_year) = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            if stored.status != RunStatus::Completed {
                return Err(EngineError::InvalidTransition {
                    run_id,
                    status: stored.status.as_str().to_string(),
                    action: "void".to_string(),
                });
            }
            let old_values = Self::status_values(stored);
            stored.status = RunStatus::Voided;
            stored.void_reason = Some(reason.to_string());
            stored.version += 1;
            let updated = stored.clone();
            let tax_year = updated.period.tax_year();

            let staged = state.paychecks.entry(run_id).or_default();
            let reversals: Vec<Paycheck> = staged
                .iter()
                .filter(|c| c.reverses.is_none())
                .map(|c| c.reversed())
                .collect();
            staged.extend(reversals.iter().cloned());
            (old_values, updated, reversals, tax_year)
        };

        // Reversing adjustments get their own apply key; the original run's
        // ledger entry stays applied under the run id.
        self.ledger.apply_run(Uuid::new_v4(), tax_year, &reversals);

        self.audit.record(
            actor,
            "payroll_run.voided",
            ENTITY_RUN,
            run_id.to_string(),
            old_values,
            json!({
                "status": updated.status.as_str(),
                "version": updated.version,
                "reason": reason,
                "reversing_paychecks": reversals.len(),
            }),
        );
        info!(run_id = %run_id, reason, "Voided payroll run");
        Ok(updated)
    }

    /// Discards a run that has not been approved
    /// (`draft | calculated | pending_approval → cancelled`).
    ///
    /// No side effects exist yet at these stages, so staged paychecks are
    /// dropped and nothing needs compensating.
    pub fn cancel(&self, run_id: Uuid, actor: &str) -> EngineResult<PayrollRun> {
        let (old_values, updated) = {
            let mut state = self.state.write().expect("engine lock poisoned");
            let stored = state
                .runs
                .get_mut(&run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            match stored.status {
                RunStatus::Draft | RunStatus::Calculated | RunStatus::PendingApproval => {}
                _ => {
                    return Err(EngineError::InvalidTransition {
                        run_id,
                        status: stored.status.as_str().to_string(),
                        action: "cancel".to_string(),
                    });
                }
            }
            let old_values = Self::status_values(stored);
            stored.status = RunStatus::Cancelled;
            stored.totals = RunTotals::zero();
            stored.excluded.clear();
            stored.version += 1;
            let updated = stored.clone();
            state.paychecks.remove(&run_id);
            (old_values, updated)
        };

        self.audit.record(
            actor,
            "payroll_run.cancelled",
            ENTITY_RUN,
            run_id.to_string(),
            old_values,
            Self::status_values(&updated),
        );
        Ok(updated)
    }
}
