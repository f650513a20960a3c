//! Python FFI bindings via PyO3.
//!
//! Exposes the staircase controller to Python with a keyword-argument
//! surface shaped for PsychoPy trial loops, so an experiment script can
//! drive the Rust implementation without restructuring its per-trial code.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from staircase_core import Staircase
//!
//! stair = Staircase(start_value=8, aimed_performance=0.75,
//!                   reversals=[5, 25], step_sizes=[1, 1],
//!                   name="low_1_mask_low")
//!
//! while not stair.staircase_over:
//!     is_correct = run_one_trial(duration_frames=stair.dv)
//!     stair.new_trial(is_correct, stim=True)
//!
//! print(stair.get_threshold())
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::error::StaircaseError;
use crate::payoff::PayoffMatrix;
use crate::staircase::{Staircase as RustStaircase, StaircaseConfig, StaircasePhase};

fn py_err(e: StaircaseError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Parse a `{'hit': .., 'miss': .., 'fa': .., 'cr': ..}` dict into a
/// custom payoff matrix.
fn payoff_from_dict(dict: &HashMap<String, f32>) -> PyResult<PayoffMatrix> {
    let field = |key: &str| {
        dict.get(key).copied().ok_or_else(|| {
            PyValueError::new_err(format!("custom_payoff_matrix is missing key '{key}'"))
        })
    };
    Ok(PayoffMatrix {
        hit: field("hit")?,
        miss: field("miss")?,
        false_alarm: field("fa")?,
        correct_rejection: field("cr")?,
    })
}

fn pair<T: Copy>(values: &[T], what: &str) -> PyResult<[T; 2]> {
    match values {
        &[a, b] => Ok([a, b]),
        _ => Err(PyValueError::new_err(format!(
            "{what} must have exactly 2 elements, got {}",
            values.len()
        ))),
    }
}

/// Adaptive SIAM staircase controller.
///
/// `reversals` defaults to `[5, 15]` and `step_sizes` to `[1, 0.5]` when
/// passed as `None`, so a bare `Staircase()` is immediately runnable.
#[pyclass(name = "Staircase")]
pub struct PyStaircase {
    inner: RustStaircase,
    name: String,
}

#[pymethods]
impl PyStaircase {
    /// Create a staircase.
    ///
    /// Args:
    ///     start_value: Intensity for the first trial.
    ///     aimed_performance: Target hit-rate in (0, 1).
    ///     reversals: [warmup, measurement] reversal counts (default [5, 15]).
    ///     step_sizes: Step magnitude per phase (default [1, 0.5]).
    ///     power_law: Raw→perceived exponent (1 = linear).
    ///     perceived_space: When set, steps are perceived/this fraction.
    ///     min_value_correction: Lower clamp (None to disable).
    ///     max_value_correction: Upper clamp (None to disable).
    ///     name: Label for logging when running multiple staircases.
    ///     siam: Use the Kaernbach (1990) SIAM table (else the analytic formula).
    ///     custom_payoff_matrix: {'hit','miss','fa','cr'} dict, overrides `siam`.
    #[new]
    #[pyo3(signature = (
        start_value = 5.0,
        aimed_performance = 0.75,
        reversals = None,
        step_sizes = None,
        power_law = 1.0,
        perceived_space = None,
        min_value_correction = Some(1.0),
        max_value_correction = None,
        name = String::from("staircase"),
        siam = true,
        custom_payoff_matrix = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_value: f32,
        aimed_performance: f32,
        reversals: Option<Vec<u32>>,
        step_sizes: Option<Vec<f32>>,
        power_law: f32,
        perceived_space: Option<f32>,
        min_value_correction: Option<f32>,
        max_value_correction: Option<f32>,
        name: String,
        siam: bool,
        custom_payoff_matrix: Option<HashMap<String, f32>>,
    ) -> PyResult<Self> {
        let reversal_schedule = match reversals {
            Some(values) => pair(&values, "reversals")?,
            None => [5, 15],
        };
        let steps = match step_sizes {
            Some(values) => pair(&values, "step_sizes")?,
            None => [1.0, 0.5],
        };
        let custom_payoff = custom_payoff_matrix
            .as_ref()
            .map(payoff_from_dict)
            .transpose()?;

        let config = StaircaseConfig {
            power_law_exponent: power_law,
            perceived_space_divisor: perceived_space,
            min_value: min_value_correction,
            max_value: max_value_correction,
            use_siam_table: siam,
            custom_payoff,
            ..StaircaseConfig::new(start_value, aimed_performance, reversal_schedule, steps)
        };
        Ok(Self {
            inner: RustStaircase::new(config).map_err(py_err)?,
            name,
        })
    }

    /// Record one trial outcome.
    ///
    /// Args:
    ///     is_correct: Was the response correct?
    ///     stim: Was the target present? (In discrimination settings, marks
    ///         the tracked category.) Default True.
    #[pyo3(signature = (is_correct, stim = true))]
    pub fn new_trial(&mut self, is_correct: bool, stim: bool) -> PyResult<()> {
        self.inner.record_trial(is_correct, stim).map_err(py_err)
    }

    /// Threshold estimate: median intensity at measurement-phase reversals.
    ///
    /// Raises ValueError while the staircase is not over.
    pub fn get_threshold(&self) -> PyResult<f32> {
        self.inner.threshold().map_err(py_err)
    }

    /// End the run early; a partial threshold stays extractable.
    pub fn force_complete(&mut self) {
        self.inner.force_complete();
    }

    /// Intensity for the next trial.
    #[getter]
    pub fn dv(&self) -> f32 {
        self.inner.current_value()
    }

    /// Trials recorded so far.
    #[getter]
    pub fn trial_number(&self) -> u32 {
        self.inner.trial_count()
    }

    /// Reversals accumulated so far.
    #[getter]
    pub fn revn(&self) -> u32 {
        self.inner.reversal_count()
    }

    /// Schedule phase: 0 while warming up, 1 while measuring.
    #[getter]
    pub fn phase(&self) -> u32 {
        match self.inner.phase() {
            StaircasePhase::Warmup => 0,
            StaircasePhase::Measurement => 1,
        }
    }

    /// Whether the reversal schedule is exhausted.
    #[getter]
    pub fn staircase_over(&self) -> bool {
        self.inner.is_complete()
    }

    /// Whether the most recent trial was a reversal.
    #[getter]
    pub fn is_rev(&self) -> bool {
        self.inner.last_was_reversal()
    }

    /// Intensity used on each trial, in order.
    #[getter]
    pub fn dvs(&self) -> Vec<f32> {
        self.inner.value_history().to_vec()
    }

    /// Intensities at measurement-phase reversals, in order.
    #[getter]
    pub fn dvs_on_rev(&self) -> Vec<f32> {
        self.inner.reversal_values().to_vec()
    }

    /// Label given at construction.
    #[getter]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when a custom payoff matrix displaced a requested SIAM lookup.
    #[getter]
    pub fn siam_overridden(&self) -> bool {
        self.inner.siam_overridden()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Staircase(name='{}', dv={:.5}, trial={}, reversals={}, phase={}, over={})",
            self.name,
            self.inner.current_value(),
            self.inner.trial_count(),
            self.inner.reversal_count(),
            self.phase(),
            self.inner.is_complete(),
        )
    }
}

/// staircase-core Python bindings.
///
/// Deterministic SIAM adaptive staircases with a keyword surface that
/// drops straight into a PsychoPy trial loop.
#[pymodule]
pub fn staircase_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyStaircase>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
