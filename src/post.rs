//! Axial strain and force recovery from nodal displacements.

use nalgebra::{DVector, Vector4};

use crate::errors::{Result, TrussError};
use crate::geometry::{Element, Geometry};

/// Axial response of one element. Positive values mean tension.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementResult {
    /// Change of length `d · u_e`.
    pub elongation: f64,
    /// Axial strain `elongation / L`.
    pub strain: f64,
    /// Axial force `ES · strain`.
    pub axial_force: f64,
}

/// Axial response of a single element for the given global displacements.
///
/// `displacements` must hold every dof the element references.
#[must_use]
pub fn element_result(element: &Element, stiffness: f64, displacements: &DVector<f64>) -> ElementResult {
    let [a, b, c, d] = element.dofs();
    let local = Vector4::new(
        displacements[a],
        displacements[b],
        displacements[c],
        displacements[d],
    );
    let elongation = element.axial_direction().dot(&local);
    let strain = elongation / element.length;
    ElementResult {
        elongation,
        strain,
        axial_force: stiffness * strain,
    }
}

/// Axial response of every element, in element order.
///
/// # Errors
///
/// Returns [`TrussError::DimensionMismatch`] when `displacements` does not have one
/// entry per dof or `stiffnesses` one entry per element.
pub fn element_results(
    geometry: &Geometry,
    stiffnesses: &[f64],
    displacements: &DVector<f64>,
) -> Result<Vec<ElementResult>> {
    if displacements.len() != geometry.dof_count() {
        return Err(TrussError::DimensionMismatch {
            what: "displacement vector",
            expected: geometry.dof_count(),
            found: displacements.len(),
        });
    }
    if stiffnesses.len() != geometry.element_count() {
        return Err(TrussError::DimensionMismatch {
            what: "element stiffness list",
            expected: geometry.element_count(),
            found: stiffnesses.len(),
        });
    }
    Ok(geometry
        .elements()
        .zip(stiffnesses)
        .map(|(element, &stiffness)| element_result(element, stiffness, displacements))
        .collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    fn diagonal_bar() -> Geometry {
        Geometry::new(&[point(0.0, 0.0), point(3.0, 4.0)], &[(0, 1)]).expect("valid geometry")
    }

    #[test]
    fn stretching_along_the_axis_is_tension() {
        let geometry = diagonal_bar();
        let displacements = DVector::from_vec(vec![0.0, 0.0, 0.03, 0.04]);
        let results = element_results(&geometry, &[10.0], &displacements).expect("sizes match");
        assert_relative_eq!(results[0].elongation, 0.05, epsilon = 1.0e-12);
        assert_relative_eq!(results[0].strain, 0.01, epsilon = 1.0e-12);
        assert_relative_eq!(results[0].axial_force, 0.1, epsilon = 1.0e-12);
    }

    #[test]
    fn moving_the_tail_towards_the_head_is_compression() {
        let geometry = diagonal_bar();
        let displacements = DVector::from_vec(vec![0.3, 0.4, 0.0, 0.0]);
        let results = element_results(&geometry, &[1.0], &displacements).expect("sizes match");
        assert_relative_eq!(results[0].axial_force, -0.1, epsilon = 1.0e-12);
    }

    #[test]
    fn transverse_motion_produces_no_force() {
        let geometry = diagonal_bar();
        let displacements = DVector::from_vec(vec![0.0, 0.0, -0.4, 0.3]);
        let results = element_results(&geometry, &[1.0], &displacements).expect("sizes match");
        assert_relative_eq!(results[0].axial_force, 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn displacement_length_is_checked() {
        let geometry = diagonal_bar();
        let error = element_results(&geometry, &[1.0], &DVector::zeros(3))
            .expect_err("wrong length");
        assert_eq!(
            error,
            TrussError::DimensionMismatch {
                what: "displacement vector",
                expected: 4,
                found: 3
            }
        );
    }
}
