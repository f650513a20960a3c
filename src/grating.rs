//! Reference condition vocabulary for the masked-grating experiment.
//!
//! The experiment this crate was built for staircases the stimulus-frame
//! duration of oriented gratings across 18 condition cells: three spatial
//! frequency tiers × one-to-three presentation cycles × two mask contrasts.
//! Each cell runs its own independent staircase.
//!
//! This module ships that condition space as a concrete [`ConditionKey`] so
//! you can see exactly what a production key looks like. Your own experiment's
//! vocabulary follows the same pattern — a struct of fieldwise enums and a
//! `label()` naming the cell.
//!
//! ```
//! use staircase_core::grating::{CycleCount, GratingCondition, MaskContrast, SpatialFrequency};
//! use staircase_core::registry::{ConditionKey, StaircaseRegistry};
//! use staircase_core::staircase::{Staircase, StaircaseConfig};
//!
//! let mut registry = StaircaseRegistry::new();
//! for condition in GratingCondition::all() {
//!     let config = StaircaseConfig::new(
//!         condition.suggested_start_value(),
//!         0.75,
//!         [5, 25],
//!         [1.0, 1.0],
//!     );
//!     registry.insert(condition, Staircase::new(config)?);
//! }
//! assert_eq!(registry.len(), 18);
//! # Ok::<(), staircase_core::error::StaircaseError>(())
//! ```

use alloc::format;
use alloc::string::String;

use crate::registry::ConditionKey;

/// One cell of the masked-grating condition space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GratingCondition {
    /// Spatial frequency tier of the target grating.
    pub spatial_frequency: SpatialFrequency,
    /// How many black/white presentation cycles the trial shows.
    pub cycle_count: CycleCount,
    /// Contrast tier of the mask that follows the target.
    pub mask_contrast: MaskContrast,
}

/// Spatial frequency tier of the target grating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpatialFrequency {
    /// Coarse stripes (lowest cycles per degree).
    Low,
    /// Intermediate stripes.
    Med,
    /// Fine stripes (highest cycles per degree).
    High,
}

/// Number of black/white presentation cycles in a trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CycleCount {
    /// A single cycle.
    One,
    /// Two cycles.
    Two,
    /// Three cycles.
    Three,
}

/// Contrast tier of the pattern mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaskContrast {
    /// Low-contrast mask.
    Low,
    /// High-contrast mask.
    High,
}

impl GratingCondition {
    /// Every cell of the 3 × 3 × 2 condition space, in a fixed order.
    pub fn all() -> [GratingCondition; 18] {
        let mut cells = [GratingCondition {
            spatial_frequency: SpatialFrequency::Low,
            cycle_count: CycleCount::One,
            mask_contrast: MaskContrast::Low,
        }; 18];
        let mut i = 0;
        for &spatial_frequency in &[
            SpatialFrequency::Low,
            SpatialFrequency::Med,
            SpatialFrequency::High,
        ] {
            for &cycle_count in &[CycleCount::One, CycleCount::Two, CycleCount::Three] {
                for &mask_contrast in &[MaskContrast::Low, MaskContrast::High] {
                    cells[i] = GratingCondition {
                        spatial_frequency,
                        cycle_count,
                        mask_contrast,
                    };
                    i += 1;
                }
            }
        }
        cells
    }

    /// Start value (stimulus frames) used for this cell in the reference
    /// experiment.
    ///
    /// Low spatial frequency starts at 8 frames for single-cycle trials and
    /// 3 otherwise; medium and high start at 12 and 8 respectively. The mask
    /// contrast does not affect the starting point.
    pub fn suggested_start_value(&self) -> f32 {
        match (self.spatial_frequency, self.cycle_count) {
            (SpatialFrequency::Low, CycleCount::One) => 8.0,
            (SpatialFrequency::Low, _) => 3.0,
            (_, CycleCount::One) => 12.0,
            (_, _) => 8.0,
        }
    }
}

impl ConditionKey for GratingCondition {
    fn label(&self) -> String {
        let sf = match self.spatial_frequency {
            SpatialFrequency::Low => "low",
            SpatialFrequency::Med => "med",
            SpatialFrequency::High => "high",
        };
        let cycles = match self.cycle_count {
            CycleCount::One => 1,
            CycleCount::Two => 2,
            CycleCount::Three => 3,
        };
        let mask = match self.mask_contrast {
            MaskContrast::Low => "low",
            MaskContrast::High => "high",
        };
        format!("{sf}_{cycles}_mask_{mask}")
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
