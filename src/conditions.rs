//! Prescribed displacements, applied nodal loads and the free/fixed dof split.

use std::collections::BTreeMap;

use nalgebra::DVector;

use crate::errors::{BoundaryConditionError, Result, TrussError};
use crate::geometry::{dof_index, Direction, Node, DOFS_PER_NODE};

/// Prescribed displacements keyed by global dof index; dofs not listed are free.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryConditions {
    /// Prescribed value per constrained dof, ordered by dof.
    prescribed: BTreeMap<usize, f64>,
}

impl BoundaryConditions {
    /// Create an empty set where every dof is free.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(dof, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryConditionError::ConflictingConstraint`] when a dof appears
    /// twice with different values.
    pub fn from_pairs<I>(pairs: I) -> std::result::Result<Self, BoundaryConditionError>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut conditions = Self::new();
        for (dof, value) in pairs {
            conditions.prescribe(dof, value)?;
        }
        Ok(conditions)
    }

    /// Prescribe a displacement at a global dof.
    ///
    /// Repeating an identical constraint is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryConditionError::ConflictingConstraint`] when the dof already
    /// carries a different value and [`BoundaryConditionError::NonFiniteValue`] for NaN
    /// or infinite values.
    pub fn prescribe(
        &mut self,
        dof: usize,
        value: f64,
    ) -> std::result::Result<&mut Self, BoundaryConditionError> {
        if !value.is_finite() {
            return Err(BoundaryConditionError::NonFiniteValue { dof });
        }
        if let Some(&existing) = self.prescribed.get(&dof) {
            if existing != value {
                return Err(BoundaryConditionError::ConflictingConstraint {
                    dof,
                    existing,
                    requested: value,
                });
            }
        }
        self.prescribed.insert(dof, value);
        Ok(self)
    }

    /// Fix a single dof at zero displacement.
    ///
    /// # Errors
    ///
    /// See [`BoundaryConditions::prescribe`].
    pub fn fix(&mut self, dof: usize) -> std::result::Result<&mut Self, BoundaryConditionError> {
        self.prescribe(dof, 0.0)
    }

    /// Prescribe the displacement of `node` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryConditionError::NodeOutOfRange`] when `node` is too large to
    /// have a dof index; otherwise see [`BoundaryConditions::prescribe`].
    pub fn prescribe_node(
        &mut self,
        node: usize,
        direction: Direction,
        value: f64,
    ) -> std::result::Result<&mut Self, BoundaryConditionError> {
        let dof =
            dof_index(node, direction).ok_or(BoundaryConditionError::NodeOutOfRange { node })?;
        self.prescribe(dof, value)
    }

    /// Fix both dofs of `node` at zero, i.e. a pin support.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryConditionError::NodeOutOfRange`] when `node` is too large to
    /// have dof indices; otherwise see [`BoundaryConditions::prescribe`].
    pub fn fix_node(
        &mut self,
        node: usize,
    ) -> std::result::Result<&mut Self, BoundaryConditionError> {
        let dofs = Node::dofs(node).ok_or(BoundaryConditionError::NodeOutOfRange { node })?;
        for dof in dofs {
            self.fix(dof)?;
        }
        Ok(self)
    }

    /// Prescribed value at `dof`, if constrained.
    #[must_use]
    pub fn value(&self, dof: usize) -> Option<f64> {
        self.prescribed.get(&dof).copied()
    }

    /// Number of constrained dofs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prescribed.len()
    }

    /// Whether no dof is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prescribed.is_empty()
    }

    /// Iterate over `(dof, value)` pairs in dof order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.prescribed.iter().map(|(&dof, &value)| (dof, value))
    }

    /// Split `0..dof_count` into free and fixed dofs.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryConditionError::DofOutOfRange`] when a constrained dof does not
    /// exist in a system of `dof_count` dofs.
    pub fn partition(
        &self,
        dof_count: usize,
    ) -> std::result::Result<DofPartition, BoundaryConditionError> {
        if let Some((&dof, _)) = self.prescribed.range(dof_count..).next() {
            return Err(BoundaryConditionError::DofOutOfRange { dof, dof_count });
        }
        let mut free = Vec::with_capacity(dof_count - self.prescribed.len());
        let mut fixed = Vec::with_capacity(self.prescribed.len());
        let mut prescribed = Vec::with_capacity(self.prescribed.len());
        for dof in 0..dof_count {
            match self.prescribed.get(&dof) {
                Some(&value) => {
                    fixed.push(dof);
                    prescribed.push(value);
                }
                None => free.push(dof),
            }
        }
        Ok(DofPartition {
            free,
            fixed,
            prescribed,
        })
    }
}

/// Free and fixed dof index sets of a constrained system.
#[derive(Clone, Debug, PartialEq)]
pub struct DofPartition {
    /// Unconstrained dofs in ascending order.
    pub free: Vec<usize>,
    /// Constrained dofs in ascending order.
    pub fixed: Vec<usize>,
    /// Prescribed value of each entry of `fixed`.
    pub prescribed: Vec<f64>,
}

impl DofPartition {
    /// Prescribed displacements `U_c` as a vector aligned with `fixed`.
    #[must_use]
    pub fn prescribed_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.prescribed)
    }
}

/// Applied nodal forces, one entry per dof.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadVector {
    /// Force per global dof.
    values: DVector<f64>,
}

impl LoadVector {
    /// Create an unloaded vector for a system of `dof_count` dofs.
    #[must_use]
    pub fn zeros(dof_count: usize) -> Self {
        Self {
            values: DVector::zeros(dof_count),
        }
    }

    /// Wrap an existing force vector; its length is checked when solving.
    #[must_use]
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            values: DVector::from_vec(values),
        }
    }

    /// Number of dofs covered by this vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set the force at a global dof, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::InvalidLoad`] when `dof` is out of range.
    pub fn set(&mut self, dof: usize, force: f64) -> Result<&mut Self> {
        *self.entry(dof)? = force;
        Ok(self)
    }

    /// Add to the force at a global dof.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::InvalidLoad`] when `dof` is out of range.
    pub fn add(&mut self, dof: usize, force: f64) -> Result<&mut Self> {
        *self.entry(dof)? += force;
        Ok(self)
    }

    /// Set the force on `node` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UnknownNode`] when the node does not exist.
    pub fn set_node(&mut self, node: usize, direction: Direction, force: f64) -> Result<&mut Self> {
        *self.node_entry(node, direction)? = force;
        Ok(self)
    }

    /// Add to the force on `node` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UnknownNode`] when the node does not exist.
    pub fn add_node(&mut self, node: usize, direction: Direction, force: f64) -> Result<&mut Self> {
        *self.node_entry(node, direction)? += force;
        Ok(self)
    }

    /// Apply a force `(fx, fy)` to `node`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`TrussError::UnknownNode`] when the node does not exist.
    pub fn set_node_force(&mut self, node: usize, fx: f64, fy: f64) -> Result<&mut Self> {
        self.set_node(node, Direction::X, fx)?;
        self.set_node(node, Direction::Y, fy)
    }

    /// Force at `dof`, zero when out of range.
    #[must_use]
    pub fn get(&self, dof: usize) -> f64 {
        self.values.get(dof).copied().unwrap_or(0.0)
    }

    /// Borrow the underlying vector.
    #[must_use]
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Mutable access to a single entry.
    fn entry(&mut self, dof: usize) -> Result<&mut f64> {
        let dof_count = self.values.len();
        self.values
            .get_mut(dof)
            .ok_or(TrussError::InvalidLoad { dof, dof_count })
    }

    /// Mutable access to the entry of `node` in `direction`.
    fn node_entry(&mut self, node: usize, direction: Direction) -> Result<&mut f64> {
        let node_count = self.values.len() / DOFS_PER_NODE;
        let unknown = TrussError::UnknownNode { node, node_count };
        if node >= node_count {
            return Err(unknown);
        }
        let dof = dof_index(node, direction).ok_or(unknown)?;
        self.entry(dof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_splits_dofs_in_order() {
        let mut conditions = BoundaryConditions::new();
        conditions
            .fix_node(0)
            .expect("node fixed")
            .prescribe_node(2, Direction::Y, -0.01)
            .expect("settlement prescribed");
        let partition = conditions.partition(6).expect("valid partition");
        assert_eq!(partition.fixed, vec![0, 1, 5]);
        assert_eq!(partition.free, vec![2, 3, 4]);
        assert_eq!(partition.prescribed, vec![0.0, 0.0, -0.01]);
    }

    #[test]
    fn out_of_range_dof_is_rejected_at_partition() {
        let conditions = BoundaryConditions::from_pairs([(1, 0.0), (7, 0.0)]).expect("no conflict");
        assert_eq!(
            conditions.partition(6).expect_err("dof 7 out of range"),
            BoundaryConditionError::DofOutOfRange {
                dof: 7,
                dof_count: 6
            }
        );
    }

    #[test]
    fn conflicting_constraints_are_rejected() {
        let mut conditions = BoundaryConditions::new();
        conditions.fix(3).expect("first constraint");
        conditions.fix(3).expect("repeat with same value");
        assert_eq!(
            conditions.prescribe(3, 0.5).expect_err("conflict"),
            BoundaryConditionError::ConflictingConstraint {
                dof: 3,
                existing: 0.0,
                requested: 0.5
            }
        );
        assert_eq!(conditions.value(3), Some(0.0));
        assert_eq!(
            conditions.prescribe(4, f64::NAN).expect_err("nan"),
            BoundaryConditionError::NonFiniteValue { dof: 4 }
        );
    }

    #[test]
    fn loads_can_be_set_and_accumulated() {
        let mut loads = LoadVector::zeros(6);
        loads
            .set_node_force(2, 3.0, -1.0)
            .expect("node exists")
            .add(5, -0.5)
            .expect("dof exists");
        assert_eq!(loads.get(4), 3.0);
        assert_eq!(loads.get(5), -1.5);
        assert_eq!(loads.get(0), 0.0);
        assert_eq!(
            loads.set_node(3, Direction::X, 1.0).expect_err("missing node"),
            TrussError::UnknownNode {
                node: 3,
                node_count: 3
            }
        );
        loads
            .add_node(1, Direction::Y, 2.0)
            .expect("node exists")
            .add_node(1, Direction::Y, 0.5)
            .expect("node exists");
        assert_eq!(loads.get(3), 2.5);
    }

    #[test]
    fn huge_node_indices_are_rejected_without_overflow() {
        let mut conditions = BoundaryConditions::new();
        assert_eq!(
            conditions.fix_node(usize::MAX).expect_err("no such node"),
            BoundaryConditionError::NodeOutOfRange { node: usize::MAX }
        );
        assert_eq!(
            conditions
                .prescribe_node(usize::MAX / 2 + 1, Direction::X, 0.0)
                .expect_err("no such node"),
            BoundaryConditionError::NodeOutOfRange {
                node: usize::MAX / 2 + 1
            }
        );
        assert!(conditions.is_empty());

        let mut loads = LoadVector::zeros(4);
        assert_eq!(
            loads
                .set_node(usize::MAX, Direction::Y, 1.0)
                .expect_err("no such node"),
            TrussError::UnknownNode {
                node: usize::MAX,
                node_count: 2
            }
        );
        assert_eq!(
            loads
                .add_node(usize::MAX, Direction::X, 1.0)
                .expect_err("no such node"),
            TrussError::UnknownNode {
                node: usize::MAX,
                node_count: 2
            }
        );
        assert_eq!(loads.as_vector().sum(), 0.0);
    }
}
