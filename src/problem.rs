//! Serializable description of a complete truss problem.
//!
//! This is the input format of the command line tool; the solver itself only
//! ever sees the values built from it.

use serde::{Deserialize, Serialize};

use crate::conditions::{BoundaryConditions, LoadVector};
use crate::config::TrussConfig;
use crate::errors::Result;
use crate::geometry::{point, Direction, Point};
use crate::truss::Truss;

/// Axial stiffness of one element that differs from the default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StiffnessOverride {
    /// Element index.
    pub element: usize,
    /// Axial stiffness `ES` of the element.
    #[serde(alias = "ES")]
    pub value: f64,
}

/// Prescribed displacement at a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Node index.
    pub node: usize,
    /// Restrained direction; both directions when absent.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Prescribed displacement, zero for a rigid support.
    #[serde(default)]
    pub value: f64,
}

/// Point load on a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodalLoad {
    /// Node index.
    pub node: usize,
    /// Force along the global X axis.
    #[serde(default)]
    pub fx: f64,
    /// Force along the global Y axis.
    #[serde(default)]
    pub fy: f64,
}

/// Everything needed to set up and solve a truss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Node coordinates `[x, y]`.
    pub nodes: Vec<[f64; 2]>,
    /// Element `[tail, head]` node pairs.
    pub elements: Vec<[usize; 2]>,
    /// Default stiffness and solver tolerances.
    #[serde(default)]
    pub config: TrussConfig,
    /// Per-element stiffness overrides.
    #[serde(default)]
    pub stiffness: Vec<StiffnessOverride>,
    /// Supports and prescribed displacements.
    #[serde(default)]
    pub supports: Vec<Support>,
    /// Applied nodal loads; loads on the same node add up.
    #[serde(default)]
    pub loads: Vec<NodalLoad>,
}

impl Problem {
    /// Parse a problem from JSON.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] describing malformed input.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Symmetric two-bar arch: base nodes `(0, 0)` and `(2·half_span, 0)` fixed, apex at
    /// `(half_span, rise)` loaded by `-force` in Y.
    #[must_use]
    pub fn two_bar_arch(half_span: f64, rise: f64, stiffness: f64, force: f64) -> Self {
        Self {
            nodes: vec![[0.0, 0.0], [2.0 * half_span, 0.0], [half_span, rise]],
            elements: vec![[0, 2], [1, 2]],
            config: TrussConfig::with_stiffness(stiffness),
            stiffness: Vec::new(),
            supports: vec![
                Support {
                    node: 0,
                    direction: None,
                    value: 0.0,
                },
                Support {
                    node: 1,
                    direction: None,
                    value: 0.0,
                },
            ],
            loads: vec![NodalLoad {
                node: 2,
                fx: 0.0,
                fy: -force,
            }],
        }
    }

    /// Build the truss, its supports and its load vector.
    ///
    /// # Errors
    ///
    /// Returns the construction errors of [`Truss::new`], stiffness override errors of
    /// [`Truss::set_element_stiffness`], conflicting supports and loads on missing nodes.
    pub fn build(&self) -> Result<(Truss, BoundaryConditions, LoadVector)> {
        let nodes: Vec<Point> = self.nodes.iter().map(|&[x, y]| point(x, y)).collect();
        let elements: Vec<(usize, usize)> =
            self.elements.iter().map(|&[start, end]| (start, end)).collect();
        let mut truss = Truss::new(&nodes, &elements, self.config)?;
        for entry in &self.stiffness {
            truss.set_element_stiffness(entry.element, entry.value)?;
        }

        let mut conditions = BoundaryConditions::new();
        for support in &self.supports {
            match support.direction {
                Some(direction) => {
                    conditions.prescribe_node(support.node, direction, support.value)?;
                }
                None => {
                    for direction in [Direction::X, Direction::Y] {
                        conditions.prescribe_node(support.node, direction, support.value)?;
                    }
                }
            }
        }

        let mut loads = LoadVector::zeros(truss.dof_count());
        for load in &self.loads {
            loads
                .add_node(load.node, Direction::X, load.fx)?
                .add_node(load.node, Direction::Y, load.fy)?;
        }
        Ok((truss, conditions, loads))
    }
}
