//! Tuning for each generator.
//!
//! Every field has a default, so partial documents deserialize cleanly. None
//! of the values are range checked.

use crate::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Shortest interior run (in cells) worth replacing with an underground pair.
    pub min_gap_between_undergrounds: usize,
    /// Longest gap a single underground pair can bridge.
    pub max_gap_between_undergrounds: usize,
    /// Rounds of relaxed linking granted to groups that could not be joined.
    pub max_tries: u32,
    pub base_max_turns: u32,
    pub grid_margin: u32,
    pub visualizations: bool,
}

impl Default for PipeConfig {
    fn default() -> Self {
        PipeConfig {
            min_gap_between_undergrounds: MIN_GAP_BETWEEN_UNDERGROUNDS,
            max_gap_between_undergrounds: MAX_GAP_BETWEEN_UNDERGROUNDS,
            max_tries: MAX_TRIES,
            base_max_turns: BASE_MAX_TURNS,
            grid_margin: GRID_MARGIN,
            visualizations: true,
        }
    }
}

/// Which facilities a beacon counts as affected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageRule {
    /// Every footprint cell must lie inside the effect area.
    Full,
    /// Any footprint cell inside the effect area is enough.
    Partial,
}

impl Default for CoverageRule {
    fn default() -> Self {
        CoverageRule::Full
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub min_affected_entities: usize,
    pub coverage: CoverageRule,
    pub visualizations: bool,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        BeaconConfig {
            min_affected_entities: MIN_AFFECTED_ENTITIES,
            coverage: CoverageRule::default(),
            visualizations: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoleConfig {
    pub visualizations: bool,
}

impl Default for PoleConfig {
    fn default() -> Self {
        PoleConfig { visualizations: true }
    }
}
