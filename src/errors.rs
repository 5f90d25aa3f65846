//! Error types produced while building or solving trusses.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrussError>;

/// Malformed node or element input rejected while constructing a geometry.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// Returned when fewer than two nodes are supplied.
    #[error("a truss needs at least two nodes (received {node_count})")]
    TooFewNodes {
        /// Number of nodes supplied.
        node_count: usize,
    },
    /// Returned when no elements are supplied.
    #[error("a truss needs at least one element")]
    NoElements,
    /// Returned when a node coordinate is NaN or infinite.
    #[error("node {node} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending node.
        node: usize,
    },
    /// Returned when an element references a node that does not exist.
    #[error("element {element} references node {node}, but only {node_count} nodes exist")]
    NodeOutOfRange {
        /// Index of the offending element.
        element: usize,
        /// Node index that was referenced.
        node: usize,
        /// Number of nodes in the geometry.
        node_count: usize,
    },
    /// Returned when both ends of an element reference the same node.
    #[error("element {element} connects node {node} to itself")]
    DegenerateElement {
        /// Index of the offending element.
        element: usize,
        /// Node referenced at both ends.
        node: usize,
    },
    /// Returned when the two endpoints of an element coincide.
    #[error("element {element} has zero length")]
    ZeroLengthElement {
        /// Index of the offending element.
        element: usize,
    },
}

/// Error returned when a displacement constraint cannot be accepted.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum BoundaryConditionError {
    /// Returned when a constrained dof lies outside `[0, dof_count)`.
    #[error("dof {dof} is out of range for a system with {dof_count} dofs")]
    DofOutOfRange {
        /// Rejected dof index.
        dof: usize,
        /// Number of dofs in the system.
        dof_count: usize,
    },
    /// Returned when a node index is too large to have dof indices.
    #[error("node {node} has no addressable dofs")]
    NodeOutOfRange {
        /// Rejected node index.
        node: usize,
    },
    /// Returned when the same dof is prescribed twice with different values.
    #[error("dof {dof} is already prescribed to {existing}, cannot prescribe {requested}")]
    ConflictingConstraint {
        /// Constrained dof index.
        dof: usize,
        /// Value already stored for the dof.
        existing: f64,
        /// Value that was rejected.
        requested: f64,
    },
    /// Returned when a prescribed displacement is NaN or infinite.
    #[error("prescribed displacement for dof {dof} is not finite")]
    NonFiniteValue {
        /// Constrained dof index.
        dof: usize,
    },
}

/// Error returned by truss construction, configuration and analysis.
///
/// Every failure is reported before any state is changed, so a failed
/// [`Truss::solve`](crate::Truss::solve) leaves the previous displacements in place.
#[derive(Debug, Error, PartialEq)]
pub enum TrussError {
    /// Returned when the node or element input is malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    /// Returned when a displacement constraint is out of range or conflicting.
    #[error("invalid boundary condition: {0}")]
    InvalidBoundaryCondition(#[from] BoundaryConditionError),
    /// Returned when an axial stiffness is zero, negative or not finite.
    #[error("element {element} has invalid axial stiffness {stiffness}")]
    InvalidStiffness {
        /// Index of the offending element.
        element: usize,
        /// Rejected axial stiffness.
        stiffness: f64,
    },
    /// Returned when an element index does not exist.
    #[error("element {element} does not exist (truss has {element_count} elements)")]
    UnknownElement {
        /// Requested element index.
        element: usize,
        /// Number of elements in the truss.
        element_count: usize,
    },
    /// Returned when an element appears more than once in an assembly order.
    #[error("element {element} appears more than once in the assembly order")]
    DuplicateElement {
        /// Repeated element index.
        element: usize,
    },
    /// Returned when a node-based operation names a node that does not exist.
    #[error("node {node} does not exist (system has {node_count} nodes)")]
    UnknownNode {
        /// Requested node index.
        node: usize,
        /// Number of nodes covered by the receiving vector.
        node_count: usize,
    },
    /// Returned when a load is applied to a dof that does not exist.
    #[error("cannot load dof {dof}: system has {dof_count} dofs")]
    InvalidLoad {
        /// Rejected dof index.
        dof: usize,
        /// Number of dofs in the load vector.
        dof_count: usize,
    },
    /// Returned when a vector does not have one entry per dof.
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        /// Name of the mismatched quantity.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },
    /// Returned when the constraints leave rigid-body modes in the free dofs.
    #[error(
        "system is under-constrained: {rank_deficiency} rigid-body mode(s) among {free_dofs} free dofs"
    )]
    UnderconstrainedSystem {
        /// Number of (numerically) zero eigenvalues of the reduced stiffness.
        rank_deficiency: usize,
        /// Number of free dofs in the reduced system.
        free_dofs: usize,
    },
    /// Returned when the reduced stiffness cannot be factorised.
    #[error("reduced stiffness matrix is singular (condition number {condition_number:e})")]
    SingularSystem {
        /// Estimated condition number of the reduced stiffness.
        condition_number: f64,
    },
    /// Returned when the assembled stiffness fails its symmetry check.
    #[error("stiffness matrix is not symmetric at ({row}, {col}): difference {difference:e}")]
    AsymmetricStiffness {
        /// Row of the first offending entry.
        row: usize,
        /// Column of the first offending entry.
        col: usize,
        /// Absolute difference between `K[row, col]` and `K[col, row]`.
        difference: f64,
    },
}
