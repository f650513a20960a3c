//! Error taxonomy for staircase configuration and use.
//!
//! Three categories, all raised synchronously at the call that triggers them
//! and none retryable — each one indicates misconfiguration or misuse, not a
//! transient failure. A miscalibrated staircase invalidates the data it
//! collects, so experiment drivers should treat any of these as fatal to the
//! run.
//!
//! - [`ConfigError`] — the requested payoff matrix cannot be built, or a
//!   condition key has no registered staircase.
//! - [`StaircaseError::NumericDomain`] — the perceptual transform was asked
//!   to raise a non-positive value to a fractional power.
//! - [`StaircaseError::NotReady`] — a threshold was requested before the
//!   reversal schedule finished. Never a sentinel number.

use alloc::string::String;
use core::fmt;

/// Invalid staircase configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    /// The SIAM table has no entry for this target hit-rate percentage.
    ///
    /// The table (Kaernbach 1990, Table 1) covers 25, 33, 50, 66, 75 and
    /// 85% only. Use [`PayoffMatrix::analytic`] or a custom matrix for other
    /// rates.
    ///
    /// [`PayoffMatrix::analytic`]: crate::payoff::PayoffMatrix::analytic
    UnsupportedTableRate {
        /// The rounded percentage that was looked up.
        percent: u32,
    },
    /// The analytic payoff formula divides by `1 - rate`; a rate at or above
    /// 1.0 (or at or below 0.0) has no finite matrix.
    DegenerateHitRate {
        /// The offending target hit-rate.
        rate: f32,
    },
    /// A condition key was presented that no staircase is registered under.
    UnknownCondition {
        /// Label of the unrecognised key.
        label: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedTableRate { percent } => {
                write!(
                    f,
                    "no SIAM table entry for target hit-rate {percent}% \
                     (table covers 25/33/50/66/75/85)"
                )
            }
            Self::DegenerateHitRate { rate } => {
                write!(f, "target hit-rate {rate} has no finite payoff matrix")
            }
            Self::UnknownCondition { label } => {
                write!(f, "no staircase registered for condition '{label}'")
            }
        }
    }
}

/// Errors from staircase construction, trial recording and threshold readout.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StaircaseError {
    /// The controller could not be configured or a condition key resolved.
    Config(ConfigError),
    /// The power-law transform left its domain: a non-positive base raised to
    /// a fractional exponent is undefined.
    NumericDomain {
        /// Base the transform was applied to.
        value: f32,
        /// Exponent of the offending transform.
        exponent: f32,
    },
    /// The threshold was requested before the run produced one.
    ///
    /// Raised while the reversal schedule is still in progress, and also
    /// after [`force_complete`] when no measurement-phase reversal was ever
    /// recorded (there is nothing to take a median of).
    ///
    /// [`force_complete`]: crate::staircase::Staircase::force_complete
    NotReady {
        /// Reversals accumulated so far.
        reversals_done: u32,
        /// Reversals the schedule requires in total.
        reversals_needed: u32,
    },
}

impl fmt::Display for StaircaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::NumericDomain { value, exponent } => {
                write!(
                    f,
                    "perceptual transform undefined: {value}^{exponent} \
                     (non-positive base, fractional exponent)"
                )
            }
            Self::NotReady {
                reversals_done,
                reversals_needed,
            } => {
                write!(
                    f,
                    "staircase is not over: {reversals_done}/{reversals_needed} reversals"
                )
            }
        }
    }
}

impl From<ConfigError> for StaircaseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for StaircaseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn test_display_unsupported_table_rate() {
        let e = ConfigError::UnsupportedTableRate { percent: 80 };
        let msg = format!("{e}");
        assert!(msg.contains("80%"), "msg={msg}");
        assert!(msg.contains("25/33/50/66/75/85"), "msg={msg}");
    }

    #[test]
    fn test_display_not_ready_reports_progress() {
        let e = StaircaseError::NotReady {
            reversals_done: 7,
            reversals_needed: 20,
        };
        assert_eq!(e.to_string(), "staircase is not over: 7/20 reversals");
    }

    #[test]
    fn test_config_error_wraps_into_staircase_error() {
        let e: StaircaseError = ConfigError::UnknownCondition {
            label: "low_1_mask_low".to_string(),
        }
        .into();
        assert!(matches!(e, StaircaseError::Config(_)));
        assert!(e.to_string().contains("low_1_mask_low"));
    }
}
