//! End-to-end staircase runs against a deterministic simulated observer.
//!
//! The observer answers correctly whenever the presented intensity is at or
//! above a hidden threshold — the offline stand-in for a participant. Runs
//! must terminate, respect every structural invariant along the way, and
//! land the threshold estimate near the hidden value.

use staircase_core::error::StaircaseError;
use staircase_core::grating::GratingCondition;
use staircase_core::registry::{ConditionKey, StaircaseRegistry};
use staircase_core::staircase::{Staircase, StaircaseConfig, StaircasePhase};

// ── Helpers ──────────────────────────────────────────────────────────────

/// Deterministic observer: correct iff the intensity reaches its threshold.
struct Observer {
    hidden_threshold: f32,
}

impl Observer {
    fn respond(&self, intensity: f32) -> bool {
        intensity >= self.hidden_threshold
    }
}

/// Structural invariants checked after every single update.
fn assert_invariants(stair: &Staircase, prev_reversals: u32, was_measurement: bool) {
    let config = stair.config();
    if let Some(min) = config.min_value {
        assert!(stair.current_value() >= min, "value below clamp");
    }
    if let Some(max) = config.max_value {
        assert!(stair.current_value() <= max, "value above clamp");
    }
    assert!(
        stair.reversal_count() >= prev_reversals,
        "reversal count decreased"
    );
    if was_measurement {
        assert_eq!(
            stair.phase(),
            StaircasePhase::Measurement,
            "phase reverted to warmup"
        );
    }
}

fn run_against_observer(stair: &mut Staircase, observer: &Observer, max_trials: u32) {
    let mut trials = 0;
    while !stair.is_complete() {
        let prev_reversals = stair.reversal_count();
        let was_measurement = stair.phase() == StaircasePhase::Measurement;
        let is_correct = observer.respond(stair.current_value());
        stair.record_trial(is_correct, true).unwrap();
        assert_invariants(stair, prev_reversals, was_measurement);
        trials += 1;
        assert!(trials <= max_trials, "staircase failed to terminate");
    }
}

// ── Single-staircase runs ─────────────────────────────────────────────────

#[test]
fn observer_run_converges_near_hidden_threshold() {
    let observer = Observer {
        hidden_threshold: 6.5,
    };
    let mut stair =
        Staircase::new(StaircaseConfig::new(12.0, 0.75, [5, 15], [1.0, 1.0])).unwrap();
    run_against_observer(&mut stair, &observer, 2_000);

    let estimate = stair.threshold().unwrap();
    assert!(
        (3.0..=10.0).contains(&estimate),
        "estimate {estimate} too far from hidden threshold 6.5"
    );
    assert!(stair.value_history().len() as u32 == stair.trial_count());
}

#[test]
fn observer_run_with_max_clamp_stays_bounded() {
    // Observer the staircase can never satisfy: every trial is a miss, the
    // value pins at the ceiling, and the run never reverses.
    let observer = Observer {
        hidden_threshold: 1_000.0,
    };
    let config = StaircaseConfig {
        max_value: Some(30.0),
        ..StaircaseConfig::new(8.0, 0.75, [2, 2], [1.0, 1.0])
    };
    let mut stair = Staircase::new(config).unwrap();
    for _ in 0..50 {
        let is_correct = observer.respond(stair.current_value());
        stair.record_trial(is_correct, true).unwrap();
        assert!(stair.current_value() <= 30.0);
    }
    assert_eq!(stair.current_value(), 30.0);
    assert_eq!(stair.reversal_count(), 0);
    assert!(!stair.is_complete());
}

#[test]
fn completion_is_permanent_under_further_input() {
    let observer = Observer {
        hidden_threshold: 6.5,
    };
    let mut stair =
        Staircase::new(StaircaseConfig::new(8.0, 0.75, [2, 2], [1.0, 1.0])).unwrap();
    run_against_observer(&mut stair, &observer, 2_000);

    let frozen = stair.inspect();
    for _ in 0..20 {
        stair.record_trial(false, true).unwrap();
        assert!(stair.is_complete());
    }
    assert_eq!(stair.inspect(), frozen, "completed run must not mutate");
}

#[test]
fn threshold_is_error_not_sentinel_while_running() {
    let mut stair =
        Staircase::new(StaircaseConfig::new(8.0, 0.75, [5, 15], [1.0, 1.0])).unwrap();
    for &ok in &[false, true, false] {
        stair.record_trial(ok, true).unwrap();
    }
    match stair.threshold() {
        Err(StaircaseError::NotReady {
            reversals_done,
            reversals_needed,
        }) => {
            assert_eq!(reversals_done, 2);
            assert_eq!(reversals_needed, 20);
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
}

// ── Full 18-condition session ─────────────────────────────────────────────

#[test]
fn interleaved_session_runs_all_conditions_to_completion() {
    // Per-condition hidden thresholds loosely shaped like the reference
    // experiment: harder (longer) for single-cycle and high-SF cells.
    let hidden = |cell: &GratingCondition| -> f32 {
        2.0 + cell.suggested_start_value() * 0.5
    };

    let mut registry = StaircaseRegistry::new();
    for cell in GratingCondition::all() {
        let config = StaircaseConfig::new(cell.suggested_start_value(), 0.75, [3, 5], [1.0, 1.0]);
        registry.insert(cell, Staircase::new(config).unwrap());
    }
    assert_eq!(registry.len(), 18);

    // Round-robin over the cells, as an interleaved trial list would.
    let cells = GratingCondition::all();
    let mut guard = 0;
    while !registry.all_complete() {
        for cell in &cells {
            if registry.get(cell).unwrap().is_complete() {
                continue;
            }
            let observer = Observer {
                hidden_threshold: hidden(cell),
            };
            let intensity = registry.get(cell).unwrap().current_value();
            registry
                .record_trial(cell, observer.respond(intensity), true)
                .unwrap();
        }
        guard += 1;
        assert!(guard < 5_000, "session failed to terminate");
    }

    assert_eq!(registry.completed_count(), 18);
    for cell in &cells {
        let estimate = registry.threshold(cell).unwrap();
        let target = hidden(cell);
        assert!(
            (estimate - target).abs() <= 5.0,
            "cell {} estimate {estimate} vs hidden {target}",
            cell.label()
        );
    }
}

#[test]
fn conditions_are_fully_independent() {
    // Schedule long enough that 40 alternating trials cannot complete it.
    let mut registry = StaircaseRegistry::new();
    for cell in GratingCondition::all() {
        let config = StaircaseConfig::new(cell.suggested_start_value(), 0.75, [50, 50], [1.0, 1.0]);
        registry.insert(cell, Staircase::new(config).unwrap());
    }

    // Hammer a single cell; every other cell must remain untouched.
    let cells = GratingCondition::all();
    let target_cell = cells[0];
    for i in 0..40 {
        registry.record_trial(&target_cell, i % 2 == 0, true).unwrap();
    }
    assert_eq!(registry.get(&target_cell).unwrap().trial_count(), 40);
    for cell in &cells[1..] {
        let stair = registry.get(cell).unwrap();
        assert_eq!(stair.trial_count(), 0, "cell {} was touched", cell.label());
        assert_eq!(stair.current_value(), cell.suggested_start_value());
    }
}
