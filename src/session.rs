//! Portable snapshot of a staircase session for persistence and transport.
//!
//! A session snapshot captures every registered staircase's running state at
//! a point in time — enough to resume logging, audit a run offline, or
//! archive the trial-by-trial record next to the behavioural data file. It
//! operates at the label level: condition keys are stored as their `label()`
//! strings, so the snapshot is independent of the key type, and the runtime
//! re-associates labels with live keys when it needs to.
//!
//! # no_std
//!
//! This module requires the `serde` feature and is compatible with
//! no_std + alloc environments.

use alloc::string::String;
use alloc::vec::Vec;

use crate::registry::{ConditionKey, StaircaseRegistry};
use crate::staircase::StaircaseSnapshot;

/// Current session snapshot format version.
pub const SESSION_SNAPSHOT_VERSION: u16 = 1;

/// A serialisable snapshot of every staircase in a registry.
///
/// # Example
///
/// ```rust,ignore
/// use staircase_core::session::SessionSnapshot;
///
/// let snapshot = SessionSnapshot::from_registry(&registry);
/// let json = serde_json::to_string(&snapshot)?;
/// let restored: SessionSnapshot = serde_json::from_str(&json)?;
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Format version — always [`SESSION_SNAPSHOT_VERSION`] for newly
    /// created snapshots.
    pub version: u16,
    /// Trials recorded across all conditions at snapshot time.
    pub trial_total: u64,
    /// Per-condition staircase states, in registry iteration order.
    pub conditions: Vec<ConditionRecord>,
}

/// One condition's staircase state, keyed by its label.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ConditionRecord {
    /// `ConditionKey::label()` of the cell this state belongs to.
    pub label: String,
    /// Full running-state export for the cell's staircase.
    pub state: StaircaseSnapshot,
}

impl SessionSnapshot {
    /// Capture the state of every staircase in `registry`.
    pub fn from_registry<K: ConditionKey>(registry: &StaircaseRegistry<K>) -> Self {
        let conditions: Vec<ConditionRecord> = registry
            .iter()
            .map(|(key, staircase)| ConditionRecord {
                label: key.label(),
                state: staircase.inspect(),
            })
            .collect();
        let trial_total = conditions
            .iter()
            .map(|record| u64::from(record.state.trial_count))
            .sum();

        Self {
            version: SESSION_SNAPSHOT_VERSION,
            trial_total,
            conditions,
        }
    }

    /// Number of condition entries in this snapshot.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Number of conditions whose staircase had completed at snapshot time.
    pub fn completed_count(&self) -> usize {
        self.conditions.iter().filter(|r| r.state.complete).count()
    }

    /// Look up a condition record by its label.
    ///
    /// Returns `None` if the label is not present in this snapshot.
    pub fn find_condition(&self, label: &str) -> Option<&ConditionRecord> {
        self.conditions.iter().find(|r| r.label == label)
    }
}
