//! Planar geometry: node coordinates, element connectivity and the derived
//! length and orientation of every element.

use std::f64::consts::PI;

use log::{debug, warn};
use nalgebra::{Rotation2, Vector2};
use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;

/// Number of translational degrees of freedom carried by each node.
pub const DOFS_PER_NODE: usize = 2;

/// Position in the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Translation of a node in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Displacement {
    /// Displacement component along the global X axis.
    pub x: f64,
    /// Displacement component along the global Y axis.
    pub y: f64,
}

impl Displacement {
    /// Create a [`Displacement`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the displacement into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use planar_truss::point;
///
/// let apex = point(2.0, 3.0);
/// assert_eq!(apex.y, 3.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Global direction of a nodal degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Translation along the global X axis.
    X,
    /// Translation along the global Y axis.
    Y,
}

impl Direction {
    /// Offset of this direction within a node's pair of dofs.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

/// Global dof index of `node` in `direction`: `2 * node` for X, `2 * node + 1` for Y.
///
/// Returns `None` when the index does not fit in a `usize`.
///
/// # Examples
/// ```
/// use planar_truss::{dof_index, Direction};
///
/// assert_eq!(dof_index(3, Direction::Y), Some(7));
/// assert_eq!(dof_index(usize::MAX, Direction::X), None);
/// ```
#[must_use]
pub fn dof_index(node: usize, direction: Direction) -> Option<usize> {
    node.checked_mul(DOFS_PER_NODE)?
        .checked_add(direction.offset())
}

/// Euclidean distance between the endpoints of an element.
///
/// Uses `hypot` so that tiny but distinct separations do not underflow to zero.
#[must_use]
pub fn element_length(tail: Point, head: Point) -> f64 {
    (head.x - tail.x).hypot(head.y - tail.y)
}

/// Orientation of the vector from `tail` to `head`, in `(-π, π]`.
#[must_use]
pub fn element_angle(tail: Point, head: Point) -> f64 {
    let angle = (head.y - tail.y).atan2(head.x - tail.x);
    if angle <= -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// A node of the truss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Position of the node in the plane.
    pub position: Point,
}

impl Node {
    /// Global dofs `[x, y]` of the node with the given index, `None` on overflow.
    #[must_use]
    pub fn dofs(index: usize) -> Option<[usize; 2]> {
        Some([
            dof_index(index, Direction::X)?,
            dof_index(index, Direction::Y)?,
        ])
    }
}

/// A pin-jointed bar between two nodes.
///
/// The first node is the tail and the second the head; the orientation and the
/// sign of the axial elongation are both measured from tail to head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    /// Index of the tail node.
    pub start: usize,
    /// Index of the head node.
    pub end: usize,
    /// Length of the bar.
    pub length: f64,
    /// Orientation angle of the bar in radians.
    pub angle: f64,
}

impl Element {
    /// Global dofs `[tail x, tail y, head x, head y]` touched by the element.
    #[must_use]
    pub const fn dofs(&self) -> [usize; 4] {
        // Endpoints index into the node list, so `2 * node + 1` cannot overflow.
        let tail = self.start * DOFS_PER_NODE;
        let head = self.end * DOFS_PER_NODE;
        [tail, tail + 1, head, head + 1]
    }
}

/// Immutable node and element layout of a planar truss.
#[derive(Clone, Debug)]
pub struct Geometry {
    /// Connectivity stored as a directed graph from tail to head node.
    graph: Graph<Node, Element>,
}

impl Geometry {
    /// Build a geometry from node coordinates and `(tail, head)` element pairs.
    ///
    /// Lengths and angles are computed here once and never change.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] when fewer than two nodes or no elements are
    /// supplied, when a coordinate is not finite, or when an element references
    /// a missing node, references the same node twice or has zero length.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, Geometry};
    ///
    /// let geometry = Geometry::new(
    ///     &[point(0.0, 0.0), point(3.0, 4.0)],
    ///     &[(0, 1)],
    /// )
    /// .expect("valid geometry");
    /// assert_eq!(geometry.element(0).map(|e| e.length), Some(5.0));
    /// ```
    pub fn new(nodes: &[Point], elements: &[(usize, usize)]) -> Result<Self, GeometryError> {
        if nodes.len() < 2 {
            return Err(GeometryError::TooFewNodes {
                node_count: nodes.len(),
            });
        }
        if elements.is_empty() {
            return Err(GeometryError::NoElements);
        }

        let mut graph = Graph::with_capacity(nodes.len(), elements.len());
        for (index, &position) in nodes.iter().enumerate() {
            if !position.x.is_finite() || !position.y.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { node: index });
            }
            graph.add_node(Node { position });
        }

        for (index, &(start, end)) in elements.iter().enumerate() {
            for node in [start, end] {
                if node >= nodes.len() {
                    return Err(GeometryError::NodeOutOfRange {
                        element: index,
                        node,
                        node_count: nodes.len(),
                    });
                }
            }
            if start == end {
                return Err(GeometryError::DegenerateElement {
                    element: index,
                    node: start,
                });
            }
            let (tail, head) = (nodes[start], nodes[end]);
            let length = element_length(tail, head);
            if length == 0.0 {
                return Err(GeometryError::ZeroLengthElement { element: index });
            }
            graph.add_edge(
                NodeIndex::new(start),
                NodeIndex::new(end),
                Element {
                    start,
                    end,
                    length,
                    angle: element_angle(tail, head),
                },
            );
        }

        let geometry = Self { graph };
        geometry.report_connectivity();
        Ok(geometry)
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return the number of dofs, two per node.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.node_count() * DOFS_PER_NODE
    }

    /// Look up a node by index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.graph.node_weight(NodeIndex::new(index))
    }

    /// Look up an element by index.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.graph.edge_weight(EdgeIndex::new(index))
    }

    /// Iterate over the nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_weights()
    }

    /// Iterate over the elements in index order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.graph.edge_weights()
    }

    /// Node positions in index order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point> {
        self.nodes().map(|node| node.position).collect()
    }

    /// Element `(tail, head)` pairs in index order.
    #[must_use]
    pub fn connectivity(&self) -> Vec<(usize, usize)> {
        self.elements().map(|e| (e.start, e.end)).collect()
    }

    /// Number of connected pieces the elements split the nodes into.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Indices of nodes that no element references.
    #[must_use]
    pub fn unconnected_nodes(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .filter(|&node| self.graph.neighbors_undirected(node).next().is_none())
            .map(NodeIndex::index)
            .collect()
    }

    /// Copy of this geometry with every node shifted by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] when the shifted coordinates are not finite.
    pub fn translated(&self, dx: f64, dy: f64) -> Result<Self, GeometryError> {
        let nodes: Vec<Point> = self
            .positions()
            .into_iter()
            .map(|p| point(p.x + dx, p.y + dy))
            .collect();
        Self::new(&nodes, &self.connectivity())
    }

    /// Copy of this geometry rotated by `angle` radians about the origin.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] when the rotated coordinates are not finite.
    pub fn rotated(&self, angle: f64) -> Result<Self, GeometryError> {
        let rotation = Rotation2::new(angle);
        let nodes: Vec<Point> = self
            .positions()
            .into_iter()
            .map(|p| Point::from(rotation * p.to_vector()))
            .collect();
        Self::new(&nodes, &self.connectivity())
    }

    /// Log connectivity problems that will surface later as a singular system.
    fn report_connectivity(&self) {
        debug!(
            "geometry: {} nodes, {} elements, {} dofs",
            self.node_count(),
            self.element_count(),
            self.dof_count()
        );
        let components = self.component_count();
        if components > 1 {
            warn!("geometry splits into {components} disconnected parts");
        }
        let unconnected = self.unconnected_nodes();
        if !unconnected.is_empty() {
            warn!("nodes {unconnected:?} are not attached to any element");
        }
    }
}
