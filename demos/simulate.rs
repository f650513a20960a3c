//! Offline staircase validation harness.
//!
//! Drives the full 18-condition grating registry against a deterministic
//! simulated observer and prints the estimated threshold per cell next to
//! the observer's hidden threshold. Useful for eyeballing convergence
//! behaviour before putting a parameter set in front of a participant.
//!
//! Run with: `cargo run --example simulate --features std`

use staircase_core::grating::GratingCondition;
use staircase_core::registry::{ConditionKey, StaircaseRegistry};
use staircase_core::staircase::{Staircase, StaircaseConfig};

/// Hidden per-cell threshold the observer answers against.
fn hidden_threshold(cell: &GratingCondition) -> f32 {
    2.0 + cell.suggested_start_value() * 0.5
}

fn main() {
    let cells = GratingCondition::all();

    let mut registry = StaircaseRegistry::new();
    for cell in cells {
        let config = StaircaseConfig::new(
            cell.suggested_start_value(),
            0.75,
            [5, 15],
            [1.0, 1.0],
        );
        registry.insert(cell, Staircase::new(config).expect("valid config"));
    }

    // Round-robin over the cells, as an interleaved trial list would.
    let mut trials = 0u32;
    while !registry.all_complete() {
        for cell in &cells {
            let stair = registry.get(cell).expect("registered");
            if stair.is_complete() {
                continue;
            }
            let is_correct = stair.current_value() >= hidden_threshold(cell);
            registry
                .record_trial(cell, is_correct, true)
                .expect("trial update");
            trials += 1;
        }
    }

    println!("all 18 staircases complete after {trials} trials\n");
    println!("{:<18} {:>8} {:>10} {:>8}", "condition", "hidden", "estimate", "trials");
    for cell in &cells {
        let stair = registry.get(cell).expect("registered");
        let estimate = stair.threshold().expect("complete");
        println!(
            "{:<18} {:>8.2} {:>10.2} {:>8}",
            cell.label(),
            hidden_threshold(cell),
            estimate,
            stair.trial_count(),
        );
    }
}
