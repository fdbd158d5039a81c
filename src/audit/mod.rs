//! Append-only audit trail.
//!
//! Every state transition and field-level change in the engine is recorded
//! here, keyed to the acting user. Records are never updated or deleted;
//! the log supports full reconstruction of who changed what, when, for any
//! run or paycheck.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The user (or "system") that performed the action.
    pub actor: String,
    /// The action performed (e.g., "payroll_run.approved").
    pub action: String,
    /// The kind of entity acted on (e.g., "payroll_run").
    pub entity_type: String,
    /// The id of the entity acted on.
    pub entity_id: String,
    /// Field values before the change.
    pub old_values: serde_json::Value,
    /// Field values after the change.
    pub new_values: serde_json::Value,
    /// When the action happened.
    pub at: DateTime<Utc>,
}

/// In-memory append-only audit log.
///
/// The log intentionally exposes no update or delete surface.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        AuditLog::default()
    }

    /// Appends one record and returns its id.
    pub fn record(
        &self,
        actor: impl Into<String>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        old_values: serde_json::Value,
        new_values: serde_json::Value,
    ) -> Uuid {
        let record = AuditRecord {
            id: Uuid::new_v4(),
            actor: actor.into(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            old_values,
            new_values,
            at: Utc::now(),
        };
        let id = record.id;
        self.records
            .lock()
            .expect("audit lock poisoned")
            .push(record);
        id
    }

    /// All records for one entity, in append order.
    pub fn records_for(&self, entity_id: &str) -> Vec<AuditRecord> {
        self.records
            .lock()
            .expect("audit lock poisoned")
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Every record, in append order.
    pub fn all(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit lock poisoned").clone()
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.lock().expect("audit lock poisoned").len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_appends_and_returns_id() {
        let log = AuditLog::new();
        let id = log.record(
            "user_1",
            "payroll_run.created",
            "payroll_run",
            "run-123",
            json!(null),
            json!({"status": "draft"}),
        );

        let records = log.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].actor, "user_1");
        assert_eq!(records[0].action, "payroll_run.created");
    }

    #[test]
    fn test_records_for_filters_by_entity() {
        let log = AuditLog::new();
        log.record("u", "a", "payroll_run", "run-1", json!(null), json!(null));
        log.record("u", "b", "payroll_run", "run-2", json!(null), json!(null));
        log.record("u", "c", "payroll_run", "run-1", json!(null), json!(null));

        let records = log.records_for("run-1");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, "a");
        assert_eq!(records[1].action, "c");
    }

    #[test]
    fn test_records_preserve_append_order() {
        let log = AuditLog::new();
        for i in 0..5 {
            log.record(
                "u",
                format!("action_{}", i),
                "payroll_run",
                "run-1",
                json!(null),
                json!(null),
            );
        }
        let actions: Vec<String> = log.all().into_iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec!["action_0", "action_1", "action_2", "action_3", "action_4"]
        );
    }

    #[test]
    fn test_old_and_new_values_preserved() {
        let log = AuditLog::new();
        log.record(
            "approver_1",
            "payroll_run.approved",
            "payroll_run",
            "run-1",
            json!({"status": "pending_approval"}),
            json!({"status": "approved", "approved_by": "approver_1"}),
        );

        let record = &log.records_for("run-1")[0];
        assert_eq!(record.old_values["status"], "pending_approval");
        assert_eq!(record.new_values["status"], "approved");
    }

    #[test]
    fn test_empty_log() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert!(log.records_for("anything").is_empty());
    }
}
