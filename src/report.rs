//! Plain-text summary of a solved truss.

use std::fmt;

use crate::truss::Truss;

/// Borrowed view of a truss that renders its results as text.
///
/// # Examples
/// ```
/// use planar_truss::{Problem, Report};
///
/// let (mut truss, supports, loads) = Problem::two_bar_arch(1.0, 1.0, 1.0, 1.0)
///     .build()
///     .expect("valid problem");
/// truss.solve(&supports, &loads).expect("solvable");
/// let text = Report::new(&truss).to_string();
/// assert!(text.contains("element"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    /// Truss being reported.
    truss: &'a Truss,
}

impl<'a> Report<'a> {
    /// Create a report for `truss`.
    #[must_use]
    pub fn new(truss: &'a Truss) -> Self {
        Self { truss }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let truss = self.truss;
        let field = truss.displacement_field();
        writeln!(
            f,
            "Planar truss: {} nodes, {} elements, {} dofs",
            truss.node_count(),
            truss.element_count(),
            truss.dof_count()
        )?;
        if !truss.is_solved() {
            writeln!(f, "(results are not current)")?;
        }
        writeln!(f, "Condition number of K_ff: {:.3e}", field.condition_number())?;

        writeln!(f, "Nodal displacements:")?;
        for node in 0..truss.node_count() {
            if let Some(u) = field.node(node) {
                writeln!(f, "  node {node:>3}: ux = {:+.6e}, uy = {:+.6e}", u.x, u.y)?;
            }
        }

        writeln!(f, "Support reactions:")?;
        for (dof, &reaction) in field.reactions().iter().enumerate() {
            if reaction != 0.0 {
                let axis = if dof % 2 == 0 { 'x' } else { 'y' };
                writeln!(f, "  node {:>3} {axis}: {reaction:+.6e}", dof / 2)?;
            }
        }

        writeln!(f, "Element axial response (positive = tension):")?;
        for (index, result) in truss.element_results().iter().enumerate() {
            writeln!(
                f,
                "  element {index:>3}: strain = {:+.6e}, force = {:+.6e}",
                result.strain, result.axial_force
            )?;
        }
        Ok(())
    }
}
