//! Explicit condition-keyed staircase dispatch.
//!
//! An experiment that interleaves many staircases needs to route each trial
//! outcome to the controller for that trial's condition. The registry is an
//! owned map from a structured condition key to its [`Staircase`] — the
//! experiment driver holds it and passes it to whatever records outcomes or
//! queries completion. A key with no entry is a [`ConfigError`], caught at
//! the call site, not a runtime name-resolution failure.
//!
//! The key type is anything implementing [`ConditionKey`]; the same registry
//! logic works for any condition space. [`crate::grating::GratingCondition`]
//! is the ready-to-use vocabulary for the reference grating experiment.
//!
//! # Invariants
//!
//! - Entries share no state: updating one staircase never touches another.
//! - Iteration order is unspecified; nothing here depends on it.

use core::hash::Hash;

use hashbrown::HashMap;

use alloc::string::String;

use crate::error::{ConfigError, StaircaseError};
use crate::staircase::Staircase;

/// A structured key identifying one experimental condition cell.
///
/// Implementors are small value types — typically a struct of fieldwise
/// enums (spatial-frequency tier × cycle count × mask type, say). `label()`
/// names the cell for logs, snapshots and error messages.
///
/// ```
/// use staircase_core::registry::ConditionKey;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// struct Contrast { percent: u8 }
///
/// impl ConditionKey for Contrast {
///     fn label(&self) -> String {
///         format!("contrast_{}", self.percent)
///     }
/// }
/// ```
pub trait ConditionKey: Eq + Hash + Clone + core::fmt::Debug {
    /// Stable human-readable name for this condition cell.
    fn label(&self) -> String;
}

/// Owned map from condition key to staircase controller.
///
/// One entry per condition cell; the reference grating experiment carries 18.
pub struct StaircaseRegistry<K: ConditionKey> {
    entries: HashMap<K, Staircase>,
}

impl<K: ConditionKey> StaircaseRegistry<K> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a staircase under a condition key.
    ///
    /// Returns the previous entry if the key was already registered.
    pub fn insert(&mut self, key: K, staircase: Staircase) -> Option<Staircase> {
        self.entries.insert(key, staircase)
    }

    /// The staircase for a condition, or [`ConfigError::UnknownCondition`].
    pub fn get(&self, key: &K) -> Result<&Staircase, StaircaseError> {
        self.entries
            .get(key)
            .ok_or_else(|| unknown_condition(key))
    }

    /// Mutable access to the staircase for a condition.
    pub fn get_mut(&mut self, key: &K) -> Result<&mut Staircase, StaircaseError> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| unknown_condition(key))
    }

    /// Route one trial outcome to the staircase for its condition.
    pub fn record_trial(
        &mut self,
        key: &K,
        is_correct: bool,
        target_present: bool,
    ) -> Result<(), StaircaseError> {
        self.get_mut(key)?.record_trial(is_correct, target_present)
    }

    /// Threshold for one condition (completion rules per
    /// [`Staircase::threshold`]).
    pub fn threshold(&self, key: &K) -> Result<f32, StaircaseError> {
        self.get(key)?.threshold()
    }

    // ── Completion queries ─────────────────────────────────────────────────

    /// True when every registered staircase has finished its schedule.
    ///
    /// True for an empty registry, so drivers should register conditions
    /// before polling.
    pub fn all_complete(&self) -> bool {
        self.entries.values().all(Staircase::is_complete)
    }

    /// Number of staircases that have finished their schedule.
    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|s| s.is_complete()).count()
    }

    // ── Collection helpers ─────────────────────────────────────────────────

    /// Number of registered conditions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no condition is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all (condition key, staircase) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Staircase)> {
        self.entries.iter()
    }
}

impl<K: ConditionKey> Default for StaircaseRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ConditionKey> core::fmt::Debug for StaircaseRegistry<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaircaseRegistry")
            .field("conditions", &self.entries.len())
            .field("completed", &self.completed_count())
            .finish()
    }
}

fn unknown_condition<K: ConditionKey>(key: &K) -> StaircaseError {
    StaircaseError::Config(ConfigError::UnknownCondition { label: key.label() })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staircase::StaircaseConfig;
    use alloc::format;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Cell(u8);

    impl ConditionKey for Cell {
        fn label(&self) -> String {
            format!("cell_{}", self.0)
        }
    }

    fn quick_stair(start: f32) -> Staircase {
        Staircase::new(StaircaseConfig::new(start, 0.75, [1, 1], [1.0, 1.0])).unwrap()
    }

    fn two_cell_registry() -> StaircaseRegistry<Cell> {
        let mut reg = StaircaseRegistry::new();
        reg.insert(Cell(0), quick_stair(8.0));
        reg.insert(Cell(1), quick_stair(12.0));
        reg
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let reg = two_cell_registry();
        assert_eq!(reg.get(&Cell(0)).unwrap().current_value(), 8.0);
        let err = reg.get(&Cell(9)).unwrap_err();
        assert_eq!(
            err,
            StaircaseError::Config(ConfigError::UnknownCondition {
                label: "cell_9".into()
            })
        );
    }

    #[test]
    fn test_record_trial_routes_to_one_entry_only() {
        let mut reg = two_cell_registry();
        reg.record_trial(&Cell(0), false, true).unwrap();
        assert_eq!(reg.get(&Cell(0)).unwrap().current_value(), 11.0);
        assert_eq!(reg.get(&Cell(1)).unwrap().current_value(), 12.0);
        assert_eq!(reg.get(&Cell(1)).unwrap().trial_count(), 0);
    }

    #[test]
    fn test_record_trial_unknown_key_fails() {
        let mut reg = two_cell_registry();
        assert!(reg.record_trial(&Cell(7), true, true).is_err());
    }

    #[test]
    fn test_insert_replaces_and_returns_previous() {
        let mut reg = two_cell_registry();
        let old = reg.insert(Cell(0), quick_stair(20.0));
        assert_eq!(old.unwrap().current_value(), 8.0);
        assert_eq!(reg.get(&Cell(0)).unwrap().current_value(), 20.0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_completion_tracking() {
        let mut reg = two_cell_registry();
        assert!(!reg.all_complete());
        assert_eq!(reg.completed_count(), 0);

        // Alternate outcomes until cell 0 finishes its [1, 1] schedule.
        let mut ok = false;
        while !reg.get(&Cell(0)).unwrap().is_complete() {
            reg.record_trial(&Cell(0), ok, true).unwrap();
            ok = !ok;
        }
        assert_eq!(reg.completed_count(), 1);
        assert!(!reg.all_complete());

        reg.get_mut(&Cell(1)).unwrap().force_complete();
        assert!(reg.all_complete());
    }

    #[test]
    fn test_threshold_through_registry() {
        let mut reg = two_cell_registry();
        assert!(matches!(
            reg.threshold(&Cell(0)),
            Err(StaircaseError::NotReady { .. })
        ));
        let mut ok = false;
        while !reg.get(&Cell(0)).unwrap().is_complete() {
            reg.record_trial(&Cell(0), ok, true).unwrap();
            ok = !ok;
        }
        assert!(reg.threshold(&Cell(0)).is_ok());
    }

    #[test]
    fn test_empty_registry_is_trivially_complete() {
        let reg: StaircaseRegistry<Cell> = StaircaseRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.all_complete());
    }
}
