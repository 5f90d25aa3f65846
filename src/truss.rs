//! The truss aggregate: geometry, per-element stiffness and the current solution.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::assembly::{assemble, check_symmetry};
use crate::conditions::{BoundaryConditions, LoadVector};
use crate::config::TrussConfig;
use crate::errors::{Result, TrussError};
use crate::geometry::{Displacement, Geometry, Node, Point};
use crate::post::{element_result, ElementResult};
use crate::solver::solve_partitioned;

/// Nodal displacements and support reactions produced by [`Truss::solve`].
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementField {
    /// Displacement at every dof.
    values: DVector<f64>,
    /// Reaction force at every fixed dof, zero elsewhere.
    reactions: DVector<f64>,
    /// Condition number of the reduced stiffness used for the solve.
    condition_number: f64,
}

impl DisplacementField {
    /// Undeformed state of a system with `dof_count` dofs.
    #[must_use]
    pub fn zeros(dof_count: usize) -> Self {
        Self {
            values: DVector::zeros(dof_count),
            reactions: DVector::zeros(dof_count),
            condition_number: 1.0,
        }
    }

    /// Full displacement vector `U`.
    #[must_use]
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Displacement at a single dof.
    #[must_use]
    pub fn get(&self, dof: usize) -> Option<f64> {
        self.values.get(dof).copied()
    }

    /// Displacement of a node.
    #[must_use]
    pub fn node(&self, node: usize) -> Option<Displacement> {
        let [x, y] = Node::dofs(node)?;
        Some(Displacement::new(self.get(x)?, self.get(y)?))
    }

    /// Reaction force vector, non-zero only at fixed dofs.
    #[must_use]
    pub fn reactions(&self) -> &DVector<f64> {
        &self.reactions
    }

    /// Reaction force at a single dof.
    #[must_use]
    pub fn reaction(&self, dof: usize) -> Option<f64> {
        self.reactions.get(dof).copied()
    }

    /// Condition number of the reduced stiffness matrix.
    #[must_use]
    pub fn condition_number(&self) -> f64 {
        self.condition_number
    }
}

/// Planar pin-jointed truss.
#[derive(Clone, Debug)]
pub struct Truss {
    /// Node and element layout.
    geometry: Geometry,
    /// Axial stiffness `ES` of every element.
    stiffness: Vec<f64>,
    /// Settings used for assembly and solving.
    config: TrussConfig,
    /// Latest successful solution, zero before the first solve.
    field: DisplacementField,
    /// Whether `field` was computed with the current stiffness values.
    solved: bool,
}

impl Truss {
    /// Build a truss from node coordinates and `(tail, head)` element pairs.
    ///
    /// Every element receives `config.default_stiffness`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::InvalidGeometry`] for malformed nodes or elements and
    /// [`TrussError::InvalidStiffness`] when the default stiffness is not positive.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, Truss, TrussConfig};
    ///
    /// let truss = Truss::new(
    ///     &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)],
    ///     &[(0, 1), (1, 2)],
    ///     TrussConfig::default(),
    /// )
    /// .expect("valid truss");
    /// assert_eq!(truss.dof_count(), 6);
    /// ```
    pub fn new(nodes: &[Point], elements: &[(usize, usize)], config: TrussConfig) -> Result<Self> {
        let geometry = Geometry::new(nodes, elements)?;
        Self::from_geometry(geometry, config)
    }

    /// Build a truss around an existing geometry.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::InvalidStiffness`] when the default stiffness is not positive.
    pub fn from_geometry(geometry: Geometry, config: TrussConfig) -> Result<Self> {
        check_stiffness(0, config.default_stiffness)?;
        let stiffness = vec![config.default_stiffness; geometry.element_count()];
        let field = DisplacementField::zeros(geometry.dof_count());
        Ok(Self {
            geometry,
            stiffness,
            config,
            field,
            solved: false,
        })
    }

    /// Return the geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &TrussConfig {
        &self.config
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.geometry.node_count()
    }

    /// Return the number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.geometry.element_count()
    }

    /// Return the number of dofs.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.geometry.dof_count()
    }

    /// Override the axial stiffness of one element.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UnknownElement`] for a missing element and
    /// [`TrussError::InvalidStiffness`] when `stiffness` is not positive and finite.
    pub fn set_element_stiffness(&mut self, element: usize, stiffness: f64) -> Result<()> {
        let element_count = self.element_count();
        let slot = self
            .stiffness
            .get_mut(element)
            .ok_or(TrussError::UnknownElement {
                element,
                element_count,
            })?;
        check_stiffness(element, stiffness)?;
        *slot = stiffness;
        self.solved = false;
        Ok(())
    }

    /// Axial stiffness of one element.
    #[must_use]
    pub fn element_stiffness(&self, element: usize) -> Option<f64> {
        self.stiffness.get(element).copied()
    }

    /// Axial stiffness of every element, in element order.
    #[must_use]
    pub fn stiffnesses(&self) -> &[f64] {
        &self.stiffness
    }

    /// Assemble the global stiffness matrix and verify its symmetry.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::AsymmetricStiffness`] if the symmetry check fails.
    pub fn stiffness_matrix(&self) -> Result<DMatrix<f64>> {
        let matrix = assemble(&self.geometry, &self.stiffness)?;
        check_symmetry(&matrix, self.config.solver.symmetry_tolerance)?;
        Ok(matrix)
    }

    /// Solve for the displacements produced by `loads` under `conditions`.
    ///
    /// On success the stored displacement field is replaced; on failure it is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::DimensionMismatch`] when `loads` does not have one entry
    /// per dof, [`TrussError::InvalidBoundaryCondition`] for a constraint on a missing
    /// dof, and [`TrussError::UnderconstrainedSystem`] or
    /// [`TrussError::SingularSystem`] when the supports leave a mechanism.
    pub fn solve(
        &mut self,
        conditions: &BoundaryConditions,
        loads: &LoadVector,
    ) -> Result<&DisplacementField> {
        let dof = self.dof_count();
        if loads.len() != dof {
            return Err(TrussError::DimensionMismatch {
                what: "load vector",
                expected: dof,
                found: loads.len(),
            });
        }
        let partition = conditions.partition(dof)?;
        let stiffness = self.stiffness_matrix()?;
        let solution = solve_partitioned(
            &stiffness,
            loads.as_vector(),
            &partition,
            &self.config.solver,
        )?;
        info!(
            "solved truss with {} nodes, {} elements ({} free dofs)",
            self.node_count(),
            self.element_count(),
            partition.free.len()
        );
        debug!("max |U| = {:e}", solution.displacements.amax());

        self.field = DisplacementField {
            values: solution.displacements,
            reactions: solution.reactions,
            condition_number: solution.condition_number,
        };
        self.solved = true;
        Ok(&self.field)
    }

    /// Whether the stored displacements belong to the current stiffness values.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Current displacement field.
    #[must_use]
    pub fn displacement_field(&self) -> &DisplacementField {
        &self.field
    }

    /// Current global displacement vector `U`.
    #[must_use]
    pub fn displacements(&self) -> &DVector<f64> {
        self.field.as_vector()
    }

    /// Current displacement of a node.
    #[must_use]
    pub fn node_displacement(&self, node: usize) -> Option<Displacement> {
        self.field.node(node)
    }

    /// Axial response of every element, recomputed from the current displacements.
    #[must_use]
    pub fn element_results(&self) -> Vec<ElementResult> {
        self.geometry
            .elements()
            .zip(&self.stiffness)
            .map(|(element, &stiffness)| element_result(element, stiffness, self.field.as_vector()))
            .collect()
    }

    /// Axial force of every element; positive means tension.
    #[must_use]
    pub fn axial_forces(&self) -> Vec<f64> {
        self.element_results()
            .into_iter()
            .map(|result| result.axial_force)
            .collect()
    }
}

/// Reject non-positive or non-finite axial stiffness.
fn check_stiffness(element: usize, stiffness: f64) -> Result<()> {
    if stiffness.is_finite() && stiffness > 0.0 {
        Ok(())
    } else {
        Err(TrussError::InvalidStiffness { element, stiffness })
    }
}
