//! Analysis settings.

use serde::{Deserialize, Serialize};

/// Numerical tolerances used by the linear solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Eigenvalues of the reduced stiffness below this fraction of the largest one
    /// are treated as zero, i.e. as rigid-body modes.
    pub singularity_tolerance: f64,
    /// Largest admissible `|K[i, j] - K[j, i]|` relative to the largest entry of `K`.
    pub symmetry_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singularity_tolerance: 1.0e-10,
            symmetry_tolerance: 1.0e-9,
        }
    }
}

/// Settings applied when a truss is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrussConfig {
    /// Axial stiffness `ES` given to every element unless overridden.
    #[serde(alias = "ES")]
    pub default_stiffness: f64,
    /// Solver tolerances.
    pub solver: SolverConfig,
}

impl Default for TrussConfig {
    fn default() -> Self {
        Self {
            default_stiffness: 1.0,
            solver: SolverConfig::default(),
        }
    }
}

impl TrussConfig {
    /// Configuration with a uniform axial stiffness and default tolerances.
    #[must_use]
    pub fn with_stiffness(default_stiffness: f64) -> Self {
        Self {
            default_stiffness,
            ..Self::default()
        }
    }
}
