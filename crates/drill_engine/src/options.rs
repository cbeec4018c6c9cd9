//! Engine limits.
//!
//! Loaded from the `[engine]` table of the drill configuration; every field
//! falls back to its default when omitted.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Passes of `simplify` allowed before giving up on a fixed point.
    pub max_fixed_point_passes: usize,
    /// Polynomial terms one pass may materialize while expanding.
    pub max_expand_terms: u64,
    /// Estimated bits of any exact integer power computed in one pass.
    pub max_number_bits: u64,
    /// Arena nodes one pass may create.
    pub max_nodes_per_pass: u64,
    /// Term products one pass may spend on exact polynomial division.
    pub max_poly_ops: u64,
    /// Largest integer multiple expanded in `sin(n*x)` / `cos(n*x)`.
    pub max_trig_multiple: u32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_fixed_point_passes: 32,
            max_expand_terms: 5_000,
            max_number_bits: 65_536,
            max_nodes_per_pass: 200_000,
            max_poly_ops: 50_000,
            max_trig_multiple: 12,
        }
    }
}

impl EngineLimits {
    /// Tight limits, useful for exercising the budget paths.
    pub fn strict() -> Self {
        Self {
            max_fixed_point_passes: 8,
            max_expand_terms: 200,
            max_number_bits: 1_024,
            max_nodes_per_pass: 20_000,
            max_poly_ops: 2_000,
            max_trig_multiple: 4,
        }
    }
}
