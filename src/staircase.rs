//! The adaptive staircase controller.
//!
//! One [`Staircase`] per experimental condition cell. Each instance is a pure
//! state machine: [`record_trial`] consumes one (correct?, present?)
//! observation, applies the payoff-matrix update in perceived space, clamps,
//! and advances the reversal schedule. Once the schedule is exhausted the run
//! is complete and [`threshold`] yields the median of the values recorded at
//! measurement-phase reversals.
//!
//! # Invariants
//!
//! - **STC-001**: `current_value` stays within `[min_value, max_value]`
//!   (inclusive) after every update.
//! - **STC-003**: `reversal_count` is monotonically non-decreasing; the phase
//!   moves `Warmup → Measurement` exactly once and never reverts; `complete`
//!   never becomes false again.
//! - **STC-004**: only reversals that occur while already in the measurement
//!   phase extend `reversal_values`. The reversal that *triggers* the phase
//!   transition is itself discarded.
//! - Deterministic: identical outcome sequences produce identical value
//!   sequences. No clock, no randomness, no I/O.
//!
//! [`record_trial`]: Staircase::record_trial
//! [`threshold`]: Staircase::threshold

use alloc::vec::Vec;

use crate::error::StaircaseError;
use crate::payoff::{PayoffMatrix, TrialOutcome};

// ─── Checked power-law transform ────────────────────────────────────────────

/// Raise `base` to `exponent`, rejecting combinations outside the real domain.
///
/// An exponent of exactly 1.0 bypasses `powf` entirely so linear staircases
/// stay in exact arithmetic. A negative base with a fractional exponent (or a
/// zero base with a negative one) has no real value and is reported rather
/// than silently producing NaN.
fn checked_pow(base: f32, exponent: f32) -> Result<f32, StaircaseError> {
    if exponent == 1.0 {
        return Ok(base);
    }
    let fractional = libm::roundf(exponent) != exponent;
    if (base < 0.0 && fractional) || (base == 0.0 && exponent < 0.0) {
        return Err(StaircaseError::NumericDomain {
            value: base,
            exponent,
        });
    }
    Ok(libm::powf(base, exponent))
}

// ─── Phase ──────────────────────────────────────────────────────────────────

/// Which block of the reversal schedule the run is in.
///
/// The warmup block walks the value into the threshold's neighbourhood; its
/// reversals are counted but discarded. Only measurement-block reversals feed
/// the threshold estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StaircasePhase {
    /// First `reversal_schedule[0]` reversals: coarse approach, discarded.
    Warmup,
    /// Remaining `reversal_schedule[1]` reversals: recorded for the threshold.
    Measurement,
}

impl StaircasePhase {
    /// Index into `step_sizes` for this phase.
    pub fn index(self) -> usize {
        match self {
            Self::Warmup => 0,
            Self::Measurement => 1,
        }
    }
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Fixed configuration for one staircase run.
///
/// [`StaircaseConfig::new`] takes the four parameters every run must choose
/// deliberately — start value, target hit-rate, reversal schedule and step
/// sizes — and defaults the rest. Override remaining fields directly:
///
/// ```
/// use staircase_core::staircase::StaircaseConfig;
///
/// let config = StaircaseConfig {
///     power_law_exponent: 2.2,
///     max_value: Some(60.0),
///     ..StaircaseConfig::new(8.0, 0.75, [5, 15], [1.0, 1.0])
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaircaseConfig {
    /// Intensity used on the first trial, in raw/physical units.
    pub start_value: f32,
    /// Hit-rate the procedure converges on, in (0, 1).
    pub target_hit_rate: f32,
    /// `[warmup, measurement]` reversal counts. The run completes when their
    /// sum is reached. Required — call sites in the wild disagree on a
    /// sensible default, so there is none.
    pub reversal_schedule: [u32; 2],
    /// Step magnitude for the warmup and measurement phases respectively.
    pub step_sizes: [f32; 2],
    /// Maps raw to perceived value via `perceived = raw^exponent`. Updates
    /// happen in perceived space and are mapped back. 1.0 = linear.
    pub power_law_exponent: f32,
    /// When set, the per-trial step is `perceived / divisor` — a fraction of
    /// the current perceived magnitude — instead of an absolute step.
    pub perceived_space_divisor: Option<f32>,
    /// Hard lower clamp on the value after every update.
    pub min_value: Option<f32>,
    /// Hard upper clamp on the value after every update.
    pub max_value: Option<f32>,
    /// Resolve the payoff matrix from the SIAM table (true) or the analytic
    /// formula (false). Ignored when `custom_payoff` is set.
    pub use_siam_table: bool,
    /// Caller-supplied payoff matrix. Overrides both other sources.
    pub custom_payoff: Option<PayoffMatrix>,
}

impl StaircaseConfig {
    /// Configuration with the required parameters set and everything else at
    /// its default: linear space, absolute steps, lower clamp at 1.0 (one
    /// stimulus frame), no upper clamp, SIAM table payoffs.
    pub fn new(
        start_value: f32,
        target_hit_rate: f32,
        reversal_schedule: [u32; 2],
        step_sizes: [f32; 2],
    ) -> Self {
        Self {
            start_value,
            target_hit_rate,
            reversal_schedule,
            step_sizes,
            power_law_exponent: 1.0,
            perceived_space_divisor: None,
            min_value: Some(1.0),
            max_value: None,
            use_siam_table: true,
            custom_payoff: None,
        }
    }

    /// Total reversals the schedule requires before the run completes.
    pub fn total_reversals(&self) -> u32 {
        self.reversal_schedule[0] + self.reversal_schedule[1]
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────────────

/// Read-only export of a staircase's running state.
///
/// Everything a trial-by-trial log needs: the current value, trial number,
/// previous-correct flag, phase, step size, power law, table flag, completion
/// flag, target rate and the resolved payoff multipliers, plus the full
/// value, outcome and reversal histories.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaircaseSnapshot {
    /// Trials recorded so far.
    pub trial_count: u32,
    /// Intensity for the next trial, in raw units.
    pub current_value: f32,
    /// Current schedule phase.
    pub phase: StaircasePhase,
    /// Step size in effect for the current phase.
    pub current_step_size: f32,
    /// Reversals accumulated across both phases.
    pub reversal_count: u32,
    /// Whether the reversal schedule has been exhausted.
    pub complete: bool,
    /// Outcome of the most recent trial (`None` before the first).
    pub last_correct: Option<bool>,
    /// Whether the most recent trial was a reversal.
    pub last_was_reversal: bool,
    /// Target hit-rate the run converges on.
    pub target_hit_rate: f32,
    /// Power-law exponent of the perceptual transform.
    pub power_law_exponent: f32,
    /// Resolved per-outcome step multipliers.
    pub payoff: PayoffMatrix,
    /// True when a custom payoff matrix displaced a requested table lookup.
    pub siam_overridden: bool,
    /// Value used on each trial, in order.
    pub value_history: Vec<f32>,
    /// Values at measurement-phase reversals, in order of occurrence.
    pub reversal_values: Vec<f32>,
    /// 1-based trial numbers at which each reversal (either phase) occurred.
    pub reversal_trials: Vec<u32>,
    /// Classified outcome of each trial, in order.
    pub outcome_history: Vec<TrialOutcome>,
}

// ─── Controller ─────────────────────────────────────────────────────────────

/// Adaptive staircase controller for one condition cell.
///
/// Created once before any trials run, mutated exactly once per trial via
/// [`record_trial`], and read — never mutated — to extract the threshold.
///
/// ```
/// use staircase_core::staircase::{Staircase, StaircaseConfig};
///
/// let mut stair = Staircase::new(StaircaseConfig::new(8.0, 0.75, [2, 2], [1.0, 1.0]))?;
/// stair.record_trial(false, true)?; // miss: 8 → 11
/// assert_eq!(stair.current_value(), 11.0);
/// # Ok::<(), staircase_core::error::StaircaseError>(())
/// ```
///
/// [`record_trial`]: Staircase::record_trial
#[derive(Clone, Debug)]
pub struct Staircase {
    config: StaircaseConfig,
    payoff: PayoffMatrix,
    siam_overridden: bool,
    current_value: f32,
    trial_count: u32,
    phase: StaircasePhase,
    reversal_count: u32,
    complete: bool,
    last_correct: Option<bool>,
    last_was_reversal: bool,
    value_history: Vec<f32>,
    reversal_values: Vec<f32>,
    reversal_trials: Vec<u32>,
    outcome_history: Vec<TrialOutcome>,
}

impl Staircase {
    /// Build a controller from a configuration, resolving the payoff matrix.
    ///
    /// Resolution order:
    /// 1. `custom_payoff`, verbatim, if supplied. When `use_siam_table` was
    ///    also requested the clash is flagged via [`siam_overridden`] and a
    ///    `log::warn!`, but is not an error.
    /// 2. The SIAM table keyed by `round(target_hit_rate × 100)`.
    /// 3. The analytic formula.
    ///
    /// [`siam_overridden`]: Staircase::siam_overridden
    pub fn new(config: StaircaseConfig) -> Result<Self, StaircaseError> {
        let mut siam_overridden = false;
        let payoff = match config.custom_payoff {
            Some(matrix) => {
                if config.use_siam_table {
                    siam_overridden = true;
                    log::warn!(
                        "custom payoff matrix supplied, overriding SIAM table lookup"
                    );
                }
                matrix
            }
            None if config.use_siam_table => PayoffMatrix::siam(config.target_hit_rate)?,
            None => PayoffMatrix::analytic(config.target_hit_rate)?,
        };

        Ok(Self {
            current_value: config.start_value,
            config,
            payoff,
            siam_overridden,
            trial_count: 0,
            phase: StaircasePhase::Warmup,
            reversal_count: 0,
            complete: false,
            last_correct: None,
            last_was_reversal: false,
            value_history: Vec::new(),
            reversal_values: Vec::new(),
            reversal_trials: Vec::new(),
            outcome_history: Vec::new(),
        })
    }

    // ── The update operation ───────────────────────────────────────────────

    /// Consume one trial observation and update the intensity.
    ///
    /// `is_correct` is whether the response matched the stimulus;
    /// `target_present` is whether the tracked signal was nominally present
    /// (always true in forced-choice discrimination on a present signal).
    ///
    /// Calling this on a completed run is a deliberate no-op returning
    /// `Ok(())`: the surrounding trial loop keeps running until every
    /// condition's staircase finishes, and a finished controller simply stops
    /// updating rather than aborting the session.
    pub fn record_trial(
        &mut self,
        is_correct: bool,
        target_present: bool,
    ) -> Result<(), StaircaseError> {
        if self.complete {
            return Ok(());
        }

        self.trial_count += 1;
        self.value_history.push(self.current_value);

        // Reversal detection. Nothing to compare against on the first trial.
        self.last_was_reversal = match self.last_correct {
            Some(previous) if previous != is_correct => {
                self.reversal_count += 1;
                self.reversal_trials.push(self.trial_count);
                if self.phase == StaircasePhase::Measurement {
                    self.reversal_values.push(self.current_value);
                }
                true
            }
            _ => false,
        };

        let outcome = TrialOutcome::classify(is_correct, target_present);
        self.outcome_history.push(outcome);

        // Perceptual update: transform, step, transform back.
        let exponent = self.config.power_law_exponent;
        let perceived = checked_pow(self.current_value, exponent)?;
        let step_fraction = match self.config.perceived_space_divisor {
            None => 1.0,
            Some(divisor) => perceived / divisor,
        };
        let phase_step = self.config.step_sizes[self.phase.index()];
        let perceived_new = perceived + self.payoff.step(outcome) * phase_step * step_fraction;
        self.current_value = checked_pow(perceived_new, 1.0 / exponent)?;

        // STC-001: clamp after every update.
        if let Some(min) = self.config.min_value {
            if self.current_value < min {
                self.current_value = min;
            }
        }
        if let Some(max) = self.config.max_value {
            if self.current_value > max {
                self.current_value = max;
            }
        }

        // Schedule transitions, using the reversal count updated above. The
        // step size this trial already used belongs to the outgoing phase.
        if self.reversal_count >= self.config.total_reversals() {
            self.complete = true;
            log::info!(
                "staircase complete after {} trials, {} reversals",
                self.trial_count,
                self.reversal_count
            );
        }
        if self.reversal_count >= self.config.reversal_schedule[0]
            && self.phase == StaircasePhase::Warmup
        {
            self.phase = StaircasePhase::Measurement;
            log::info!(
                "entering measurement phase on trial {} (value {})",
                self.trial_count,
                self.current_value
            );
        }

        log::debug!(
            "trial {}: {:?} -> value {}",
            self.trial_count,
            outcome,
            self.current_value
        );

        self.last_correct = Some(is_correct);
        Ok(())
    }

    /// Mark the run complete without finishing the reversal schedule.
    ///
    /// Lets an operator abort a session and still extract a threshold from
    /// the measurement-phase reversals collected so far. Irreversible, like
    /// natural completion.
    pub fn force_complete(&mut self) {
        if !self.complete {
            self.complete = true;
            log::info!(
                "staircase force-completed after {} trials, {} reversals",
                self.trial_count,
                self.reversal_count
            );
        }
    }

    // ── Threshold extraction ───────────────────────────────────────────────

    /// Median of the values recorded at measurement-phase reversals.
    ///
    /// Even counts average the two middle values. Fails with
    /// [`StaircaseError::NotReady`] while the run is incomplete, and also on
    /// a force-completed run that never recorded a measurement reversal —
    /// never a sentinel number.
    pub fn threshold(&self) -> Result<f32, StaircaseError> {
        if !self.complete || self.reversal_values.is_empty() {
            return Err(StaircaseError::NotReady {
                reversals_done: self.reversal_count,
                reversals_needed: self.config.total_reversals(),
            });
        }
        let mut values = self.reversal_values.clone();
        values.sort_unstable_by(f32::total_cmp);
        let mid = values.len() / 2;
        Ok(if values.len() % 2 == 1 {
            values[mid]
        } else {
            0.5 * (values[mid - 1] + values[mid])
        })
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// Intensity to present on the next trial, in raw units.
    pub fn current_value(&self) -> f32 {
        self.current_value
    }

    /// Trials recorded so far.
    pub fn trial_count(&self) -> u32 {
        self.trial_count
    }

    /// Current schedule phase.
    pub fn phase(&self) -> StaircasePhase {
        self.phase
    }

    /// Reversals accumulated across both phases.
    pub fn reversal_count(&self) -> u32 {
        self.reversal_count
    }

    /// Whether the reversal schedule has been exhausted.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the most recent trial was a reversal.
    pub fn last_was_reversal(&self) -> bool {
        self.last_was_reversal
    }

    /// True when a custom payoff matrix displaced a requested table lookup.
    pub fn siam_overridden(&self) -> bool {
        self.siam_overridden
    }

    /// The resolved per-outcome step multipliers.
    pub fn payoff_matrix(&self) -> &PayoffMatrix {
        &self.payoff
    }

    /// The configuration this controller was built from.
    pub fn config(&self) -> &StaircaseConfig {
        &self.config
    }

    /// Value used on each trial, in order.
    pub fn value_history(&self) -> &[f32] {
        &self.value_history
    }

    /// Values at measurement-phase reversals, in order of occurrence.
    pub fn reversal_values(&self) -> &[f32] {
        &self.reversal_values
    }

    /// Classified outcome of each trial, in order.
    pub fn outcome_history(&self) -> &[TrialOutcome] {
        &self.outcome_history
    }

    /// Snapshot every running-state field for logging or telemetry.
    pub fn inspect(&self) -> StaircaseSnapshot {
        StaircaseSnapshot {
            trial_count: self.trial_count,
            current_value: self.current_value,
            phase: self.phase,
            current_step_size: self.config.step_sizes[self.phase.index()],
            reversal_count: self.reversal_count,
            complete: self.complete,
            last_correct: self.last_correct,
            last_was_reversal: self.last_was_reversal,
            target_hit_rate: self.config.target_hit_rate,
            power_law_exponent: self.config.power_law_exponent,
            payoff: self.payoff,
            siam_overridden: self.siam_overridden,
            value_history: self.value_history.clone(),
            reversal_values: self.reversal_values.clone(),
            reversal_trials: self.reversal_trials.clone(),
            outcome_history: self.outcome_history.clone(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
