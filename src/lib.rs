//! # staircase-core
//!
//! Deterministic adaptive staircase procedures for psychophysics.
//!
//! ---
//!
//! ## One controller, many independent instances
//!
//! An adaptive staircase is a closed-loop controller: it adjusts a
//! one-dimensional stimulus intensity trial-by-trial from participant
//! responses until the run converges on the intensity that produces a target
//! hit-rate (say, 75% correct). The controller is a pure numerical state
//! machine — given the same sequence of correct/incorrect outcomes it
//! produces the same sequence of intensities, every time, on every platform.
//!
//! **Payoff-matrix updates** — each trial is classified as a hit, miss,
//! false alarm or correct rejection, and the per-outcome step multiplier
//! comes from Kaernbach's (1990) single-interval adjustment-matrix (SIAM)
//! table, from a closed-form formula for arbitrary hit-rates, or from a
//! caller-supplied matrix.
//!
//! **Two-phase reversal schedule** — early reversals walk the value into the
//! neighbourhood of the threshold and are discarded; only reversals in the
//! measurement phase contribute to the threshold estimate (the median of the
//! values at which those reversals occurred).
//!
//! **Perceptual-space stepping** — when the psychologically relevant scale is
//! nonlinear in the raw unit, updates run through a power-law transform, and
//! the step size may be a fraction of the current perceived magnitude.
//!
//! A typical experiment runs many staircases at once (one per condition
//! cell — 18 in the reference grating experiment). Instances share no state;
//! [`StaircaseRegistry`] gives the experiment driver an explicit, owned map
//! from condition key to controller, so no trial outcome is ever routed by
//! constructing a variable name at runtime.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! Response → TrialOutcome → Staircase ──→ next intensity
//!                 ↑             ↑
//!           PayoffMatrix   StaircaseConfig
//!                               ↓
//!                      StaircaseRegistry  (one entry per condition)
//!                               ↓
//!                       SessionSnapshot   (serde feature)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`error`] | [`StaircaseError`], [`ConfigError`] | Misconfiguration / misuse taxonomy |
//! | [`payoff`] | [`TrialOutcome`], [`PayoffMatrix`] | Outcome labels and SIAM step multipliers |
//! | [`staircase`] | [`Staircase`], [`StaircaseConfig`] | The adaptive controller itself |
//! | [`registry`] | [`ConditionKey`], [`StaircaseRegistry`] | Explicit per-condition dispatch |
//! | [`grating`] | [`grating::GratingCondition`] | Reference 18-cell condition vocabulary |
//! | [`session`] | [`session::SessionSnapshot`] | Serialisable run snapshot (requires `serde` feature) |
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default; trial histories live in `alloc`
//! vectors. Enable the `std` feature for heap-backed convenience helpers and
//! the `serde` feature for snapshot serialisation. The power-law transform
//! uses `libm`, so no platform float intrinsics are required.
//!
//! [`StaircaseError`]: error::StaircaseError
//! [`ConfigError`]: error::ConfigError
//! [`TrialOutcome`]: payoff::TrialOutcome
//! [`PayoffMatrix`]: payoff::PayoffMatrix
//! [`Staircase`]: staircase::Staircase
//! [`StaircaseConfig`]: staircase::StaircaseConfig
//! [`ConditionKey`]: registry::ConditionKey
//! [`StaircaseRegistry`]: registry::StaircaseRegistry

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Pull in std when the feature is enabled (for persistence helpers, etc.)
#[cfg(any(feature = "std", feature = "python-ffi"))]
extern crate std;

extern crate alloc;

pub mod error;     // ConfigError + StaircaseError taxonomy
pub mod grating;   // reference grating-experiment condition vocabulary
pub mod payoff;    // TrialOutcome + PayoffMatrix (SIAM table / analytic)
pub mod registry;  // ConditionKey trait + StaircaseRegistry
pub mod staircase; // StaircaseConfig + Staircase controller
#[cfg(feature = "serde")]
pub mod session;   // serialisable run snapshot format

#[cfg(feature = "python-ffi")]
pub mod ffi;
