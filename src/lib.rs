#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod assembly;
pub mod conditions;
pub mod config;
pub mod element;
pub mod errors;
pub mod geometry;
pub mod post;
pub mod problem;
pub mod report;
pub mod solver;
pub mod truss;

pub use conditions::{BoundaryConditions, DofPartition, LoadVector};
pub use config::{SolverConfig, TrussConfig};
pub use errors::{BoundaryConditionError, GeometryError, Result, TrussError};
pub use geometry::{dof_index, point, Direction, Displacement, Element, Geometry, Node, Point};
pub use post::ElementResult;
pub use problem::Problem;
pub use report::Report;
pub use truss::{DisplacementField, Truss};
