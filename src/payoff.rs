//! Trial outcome labels and the payoff matrices that drive the staircase.
//!
//! A staircase trial yields two booleans — was the response correct, and was
//! the tracked signal nominally present — which classify into the standard
//! detection-theory contingency table ([`TrialOutcome`]). The per-outcome
//! step multiplier comes from a [`PayoffMatrix`], built one of three ways:
//!
//! - [`PayoffMatrix::siam`] — the fixed table from Kaernbach, C. (1990),
//!   *A single-interval adjustment-matrix (SIAM) procedure for unbiased
//!   adaptive testing*, JASA 88(6), 2645–2655. Entries exist only for target
//!   hit-rates of 25, 33, 50, 66, 75 and 85%.
//! - [`PayoffMatrix::analytic`] — closed-form multipliers for arbitrary
//!   rates; proportionally the same as the table, without the scaling that
//!   clears fractional steps.
//! - A caller-supplied matrix, passed verbatim through
//!   [`StaircaseConfig::custom_payoff`].
//!
//! # Invariants
//!
//! - **STC-002**: a hit multiplier is negative (a correct detection makes
//!   the task harder), a miss multiplier positive, a correct rejection zero.
//! - Table lookups key on `round(rate × 100)`; there is no interpolation.
//!
//! [`StaircaseConfig::custom_payoff`]: crate::staircase::StaircaseConfig::custom_payoff

use crate::error::ConfigError;

// ─── Trial outcome ──────────────────────────────────────────────────────────

/// Contingency-table label for a single trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrialOutcome {
    /// Correct response, signal present.
    Hit,
    /// Incorrect response, signal present.
    Miss,
    /// Incorrect response, signal absent.
    FalseAlarm,
    /// Correct response, signal absent.
    CorrectRejection,
}

impl TrialOutcome {
    /// Classify a trial from its two observable facts.
    ///
    /// In forced-choice discrimination settings "present" marks the tracked
    /// category rather than literal signal presence; the classification is
    /// the same either way.
    pub fn classify(is_correct: bool, target_present: bool) -> Self {
        match (is_correct, target_present) {
            (true, true) => Self::Hit,
            (true, false) => Self::CorrectRejection,
            (false, true) => Self::Miss,
            (false, false) => Self::FalseAlarm,
        }
    }

    /// Whether the response behind this label was correct.
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Hit | Self::CorrectRejection)
    }

    /// Whether the tracked signal was nominally present on this trial.
    pub fn target_present(self) -> bool {
        matches!(self, Self::Hit | Self::Miss)
    }
}

// ─── Payoff matrix ──────────────────────────────────────────────────────────

/// Per-outcome step multipliers determining update direction and magnitude.
///
/// Multiplied by the phase step size (and, in perceived-space mode, by a
/// fraction of the current perceived value) to produce each trial's delta.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayoffMatrix {
    /// Multiplier on a hit. Negative: correct detections lower the intensity.
    pub hit: f32,
    /// Multiplier on a miss. Positive: misses raise the intensity.
    pub miss: f32,
    /// Multiplier on a false alarm.
    pub false_alarm: f32,
    /// Multiplier on a correct rejection. Zero in every standard matrix.
    pub correct_rejection: f32,
}

impl PayoffMatrix {
    /// Look up the SIAM table entry for a target hit-rate in (0, 1).
    ///
    /// The key is `round(rate × 100)`; only 25, 33, 50, 66, 75 and 85 have
    /// entries (the 85% row extends the published table following the same
    /// pattern). Any other percentage is a configuration error.
    pub fn siam(target_hit_rate: f32) -> Result<Self, ConfigError> {
        let percent = libm::roundf(target_hit_rate * 100.0) as u32;
        let (hit, miss, false_alarm) = match percent {
            25 => (-3.0, 1.0, 4.0),
            33 => (-2.0, 1.0, 3.0),
            50 => (-1.0, 1.0, 2.0),
            66 => (-1.0, 2.0, 3.0),
            75 => (-1.0, 3.0, 4.0),
            85 => (-1.0, 4.0, 5.0),
            _ => return Err(ConfigError::UnsupportedTableRate { percent }),
        };
        Ok(Self {
            hit,
            miss,
            false_alarm,
            correct_rejection: 0.0,
        })
    }

    /// Closed-form payoff matrix for an arbitrary target hit-rate in (0, 1).
    ///
    /// `hit = −1`, `miss = p/(1−p)`, `false_alarm = 1/(1−p)`,
    /// `correct_rejection = 0`. Proportionally identical to the SIAM table
    /// rows: at p = 0.25 the table is this matrix scaled by 3 to clear the
    /// fractional steps.
    pub fn analytic(target_hit_rate: f32) -> Result<Self, ConfigError> {
        if target_hit_rate >= 1.0 || target_hit_rate <= 0.0 {
            return Err(ConfigError::DegenerateHitRate {
                rate: target_hit_rate,
            });
        }
        let complement = 1.0 - target_hit_rate;
        Ok(Self {
            hit: -1.0,
            miss: target_hit_rate / complement,
            false_alarm: 1.0 / complement,
            correct_rejection: 0.0,
        })
    }

    /// Step multiplier for one trial outcome.
    pub fn step(&self, outcome: TrialOutcome) -> f32 {
        match outcome {
            TrialOutcome::Hit => self.hit,
            TrialOutcome::Miss => self.miss,
            TrialOutcome::FalseAlarm => self.false_alarm,
            TrialOutcome::CorrectRejection => self.correct_rejection,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
