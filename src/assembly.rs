//! Global stiffness assembly by dof scatter-add.

use log::debug;
use nalgebra::DMatrix;

use crate::errors::{Result, TrussError};
use crate::geometry::Geometry;

/// Add the global stiffness of one element into `matrix`.
///
/// Contributions are summed, so elements sharing a dof superpose.
fn scatter(matrix: &mut DMatrix<f64>, geometry: &Geometry, element: usize, stiffness: f64) {
    let Some(bar) = geometry.element(element) else {
        return;
    };
    let local = bar.stiffness(stiffness);
    let dof_map = bar.dofs();
    for (row_local, &global_row) in dof_map.iter().enumerate() {
        for (col_local, &global_col) in dof_map.iter().enumerate() {
            matrix[(global_row, global_col)] += local[(row_local, col_local)];
        }
    }
}

/// Check that the per-element stiffness list has one positive, finite entry per element.
fn check_stiffnesses(geometry: &Geometry, stiffnesses: &[f64]) -> Result<()> {
    if stiffnesses.len() != geometry.element_count() {
        return Err(TrussError::DimensionMismatch {
            what: "element stiffness list",
            expected: geometry.element_count(),
            found: stiffnesses.len(),
        });
    }
    if let Some((element, &stiffness)) = stiffnesses
        .iter()
        .enumerate()
        .find(|&(_, &es)| !(es.is_finite() && es > 0.0))
    {
        return Err(TrussError::InvalidStiffness { element, stiffness });
    }
    Ok(())
}

/// Assemble the `ndof × ndof` global stiffness matrix, processing elements in index order.
///
/// # Errors
///
/// Returns [`TrussError::DimensionMismatch`] when `stiffnesses` does not have one entry
/// per element and [`TrussError::InvalidStiffness`] for a non-positive entry.
pub fn assemble(geometry: &Geometry, stiffnesses: &[f64]) -> Result<DMatrix<f64>> {
    assemble_in_order(geometry, stiffnesses, 0..geometry.element_count())
}

/// Assemble the global stiffness matrix visiting elements in the given order.
///
/// `order` must visit every element exactly once. The result does not depend on
/// the order beyond floating-point rounding.
///
/// # Errors
///
/// Same as [`assemble`], plus [`TrussError::UnknownElement`] for an index outside the
/// element range, [`TrussError::DuplicateElement`] for a repeated index and
/// [`TrussError::DimensionMismatch`] when some element is never visited.
pub fn assemble_in_order<I>(
    geometry: &Geometry,
    stiffnesses: &[f64],
    order: I,
) -> Result<DMatrix<f64>>
where
    I: IntoIterator<Item = usize>,
{
    check_stiffnesses(geometry, stiffnesses)?;
    let dof = geometry.dof_count();
    let element_count = geometry.element_count();
    let mut matrix = DMatrix::zeros(dof, dof);
    let mut seen = vec![false; element_count];
    let mut visited = 0;
    for element in order {
        let slot = seen.get_mut(element).ok_or(TrussError::UnknownElement {
            element,
            element_count,
        })?;
        if *slot {
            return Err(TrussError::DuplicateElement { element });
        }
        *slot = true;
        visited += 1;
        scatter(&mut matrix, geometry, element, stiffnesses[element]);
    }
    if visited != element_count {
        return Err(TrussError::DimensionMismatch {
            what: "element order",
            expected: element_count,
            found: visited,
        });
    }
    debug!("assembled {dof} x {dof} stiffness matrix");
    Ok(matrix)
}

/// Verify that `matrix` is symmetric within `tolerance`, relative to its largest entry.
///
/// # Errors
///
/// Returns [`TrussError::AsymmetricStiffness`] naming the first offending entry.
pub fn check_symmetry(matrix: &DMatrix<f64>, tolerance: f64) -> Result<()> {
    let scale = matrix.amax().max(f64::MIN_POSITIVE);
    for row in 0..matrix.nrows() {
        for col in (row + 1)..matrix.ncols() {
            let difference = (matrix[(row, col)] - matrix[(col, row)]).abs();
            if difference > tolerance * scale {
                return Err(TrussError::AsymmetricStiffness {
                    row,
                    col,
                    difference,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    fn warren() -> Geometry {
        Geometry::new(
            &[
                point(0.0, 0.0),
                point(2.0, 0.0),
                point(4.0, 0.0),
                point(1.0, 1.5),
                point(3.0, 1.5),
            ],
            &[(0, 1), (1, 2), (0, 3), (3, 1), (1, 4), (4, 2), (3, 4)],
        )
        .expect("valid geometry")
    }

    #[test]
    fn single_bar_fills_its_four_dofs() {
        let geometry =
            Geometry::new(&[point(0.0, 0.0), point(9.0, 9.0), point(2.0, 0.0)], &[(0, 2)])
                .expect("valid geometry");
        let k = assemble(&geometry, &[4.0]).expect("assembly succeeds");
        assert_eq!(k.shape(), (6, 6));
        assert_relative_eq!(k[(0, 0)], 2.0, epsilon = 1.0e-12);
        assert_relative_eq!(k[(0, 4)], -2.0, epsilon = 1.0e-12);
        assert_relative_eq!(k[(4, 4)], 2.0, epsilon = 1.0e-12);
        assert_relative_eq!(k.rows(2, 2).amax(), 0.0);
    }

    #[test]
    fn shared_dofs_are_summed() {
        let geometry = Geometry::new(
            &[point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)],
            &[(0, 1), (1, 2)],
        )
        .expect("valid geometry");
        let k = assemble(&geometry, &[1.0, 3.0]).expect("assembly succeeds");
        assert_relative_eq!(k[(2, 2)], 4.0, epsilon = 1.0e-12);
    }

    #[test]
    fn element_order_does_not_change_the_result() {
        let geometry = warren();
        let stiffnesses = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let forward = assemble(&geometry, &stiffnesses).expect("assembly succeeds");
        let reversed = assemble_in_order(&geometry, &stiffnesses, (0..7).rev())
            .expect("assembly succeeds");
        let shuffled = assemble_in_order(&geometry, &stiffnesses, [4, 0, 6, 2, 5, 1, 3])
            .expect("assembly succeeds");
        assert_relative_eq!(forward, reversed, epsilon = 1.0e-12);
        assert_relative_eq!(forward, shuffled, epsilon = 1.0e-12);
    }

    #[test]
    fn element_order_must_visit_each_element_once() {
        let geometry = warren();
        let stiffnesses = [1.0; 7];
        assert_eq!(
            assemble_in_order(&geometry, &stiffnesses, [0, 1, 2, 3, 4, 5, 6, 99])
                .expect_err("unknown element"),
            TrussError::UnknownElement {
                element: 99,
                element_count: 7
            }
        );
        assert_eq!(
            assemble_in_order(&geometry, &stiffnesses, [0, 1, 2, 2, 3, 4, 5, 6])
                .expect_err("repeated element"),
            TrussError::DuplicateElement { element: 2 }
        );
        assert_eq!(
            assemble_in_order(&geometry, &stiffnesses, [6, 5, 4])
                .expect_err("missing elements"),
            TrussError::DimensionMismatch {
                what: "element order",
                expected: 7,
                found: 3
            }
        );
    }

    #[test]
    fn assembled_matrix_is_symmetric() {
        let geometry = warren();
        let k = assemble(&geometry, &[1.0; 7]).expect("assembly succeeds");
        check_symmetry(&k, 1.0e-12).expect("symmetric");
    }

    #[test]
    fn symmetry_check_reports_offending_entry() {
        let mut k = DMatrix::<f64>::identity(3, 3);
        k[(0, 2)] = 0.5;
        let error = check_symmetry(&k, 1.0e-9).expect_err("asymmetry detected");
        assert_eq!(
            error,
            TrussError::AsymmetricStiffness {
                row: 0,
                col: 2,
                difference: 0.5
            }
        );
    }

    #[test]
    fn stiffness_list_is_validated() {
        let geometry = warren();
        assert_eq!(
            assemble(&geometry, &[1.0; 3]).expect_err("wrong length"),
            TrussError::DimensionMismatch {
                what: "element stiffness list",
                expected: 7,
                found: 3
            }
        );
        let mut stiffnesses = [1.0; 7];
        stiffnesses[5] = -2.0;
        assert_eq!(
            assemble(&geometry, &stiffnesses).expect_err("negative stiffness"),
            TrussError::InvalidStiffness {
                element: 5,
                stiffness: -2.0
            }
        );
    }
}
