//! Dense solution of the constrained system `K · U = F`.
//!
//! With the dofs split into free (`f`) and fixed (`c`) sets the unknown
//! displacements satisfy `K_ff · U_f = F_f - K_fc · U_c`. Before factorising,
//! the spectrum of `K_ff` is inspected so that rigid-body modes left by the
//! supports are reported instead of producing meaningless numbers.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::conditions::DofPartition;
use crate::config::SolverConfig;
use crate::errors::{Result, TrussError};

/// Displacements and support reactions of a solved system.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSolution {
    /// Displacement at every dof.
    pub displacements: DVector<f64>,
    /// `K · U - F` at fixed dofs, zero at free dofs.
    pub reactions: DVector<f64>,
    /// Condition number of the reduced stiffness, `1.0` when nothing is free.
    pub condition_number: f64,
}

/// Condition number of a symmetric matrix from its eigenvalues.
///
/// # Errors
///
/// Returns [`TrussError::UnderconstrainedSystem`] when eigenvalues vanish relative to
/// the largest one and [`TrussError::SingularSystem`] when the spectrum is not finite.
pub fn condition_number(matrix: &DMatrix<f64>, tolerance: f64) -> Result<f64> {
    let size = matrix.nrows();
    let eigenvalues = matrix.clone().symmetric_eigen().eigenvalues;
    if eigenvalues.iter().any(|value| !value.is_finite()) {
        return Err(TrussError::SingularSystem {
            condition_number: f64::INFINITY,
        });
    }
    let largest = eigenvalues.amax();
    let smallest = eigenvalues.amin();
    let rank_deficiency = eigenvalues
        .iter()
        .filter(|value| value.abs() <= tolerance * largest)
        .count();
    if largest == 0.0 || rank_deficiency > 0 {
        return Err(TrussError::UnderconstrainedSystem {
            rank_deficiency: if largest == 0.0 { size } else { rank_deficiency },
            free_dofs: size,
        });
    }
    Ok(largest / smallest)
}

/// Solve the partitioned system for the free displacements.
///
/// # Errors
///
/// Returns [`TrussError::DimensionMismatch`] when `stiffness` or `loads` do not match
/// the partition, and the errors of [`condition_number`] when the reduced stiffness
/// has rigid-body modes. [`TrussError::SingularSystem`] is also returned if the
/// Cholesky factorisation of `K_ff` fails.
pub fn solve_partitioned(
    stiffness: &DMatrix<f64>,
    loads: &DVector<f64>,
    partition: &DofPartition,
    config: &SolverConfig,
) -> Result<SystemSolution> {
    let dof = partition.free.len() + partition.fixed.len();
    if stiffness.nrows() != dof || stiffness.ncols() != dof {
        return Err(TrussError::DimensionMismatch {
            what: "stiffness matrix",
            expected: dof,
            found: stiffness.nrows().max(stiffness.ncols()),
        });
    }
    if loads.len() != dof {
        return Err(TrussError::DimensionMismatch {
            what: "load vector",
            expected: dof,
            found: loads.len(),
        });
    }
    debug!(
        "solving {} free / {} fixed dofs",
        partition.free.len(),
        partition.fixed.len()
    );

    let prescribed = partition.prescribed_vector();
    let mut displacements = DVector::zeros(dof);
    for (&dof, &value) in partition.fixed.iter().zip(prescribed.iter()) {
        displacements[dof] = value;
    }

    let mut condition = 1.0;
    if !partition.free.is_empty() {
        let free_rows = stiffness.select_rows(&partition.free);
        let k_ff = free_rows.select_columns(&partition.free);
        let k_fc = free_rows.select_columns(&partition.fixed);
        let f_f = loads.select_rows(&partition.free);
        let rhs = f_f - k_fc * &prescribed;

        condition = condition_number(&k_ff, config.singularity_tolerance)?;
        debug!("reduced stiffness condition number {condition:e}");
        let solution = k_ff
            .cholesky()
            .ok_or(TrussError::SingularSystem {
                condition_number: condition,
            })?
            .solve(&rhs);
        for (&dof, &value) in partition.free.iter().zip(solution.iter()) {
            displacements[dof] = value;
        }
    }

    let mut reactions = stiffness * &displacements - loads;
    for &dof in &partition.free {
        reactions[dof] = 0.0;
    }

    Ok(SystemSolution {
        displacements,
        reactions,
        condition_number: condition,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::conditions::BoundaryConditions;

    /// Two springs in series along one axis: ground - k1 - dof 1 - k2 - dof 2.
    fn springs(k1: f64, k2: f64) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            3,
            &[
                k1, -k1, 0.0, //
                -k1, k1 + k2, -k2, //
                0.0, -k2, k2,
            ],
        )
    }

    #[test]
    fn series_springs_share_the_load() {
        let k = springs(2.0, 4.0);
        let loads = DVector::from_vec(vec![0.0, 0.0, 8.0]);
        let partition = BoundaryConditions::from_pairs([(0, 0.0)])
            .expect("valid")
            .partition(3)
            .expect("valid");
        let solution =
            solve_partitioned(&k, &loads, &partition, &SolverConfig::default()).expect("solves");
        assert_relative_eq!(solution.displacements[1], 4.0, epsilon = 1.0e-12);
        assert_relative_eq!(solution.displacements[2], 6.0, epsilon = 1.0e-12);
        assert_relative_eq!(solution.reactions[0], -8.0, epsilon = 1.0e-12);
        assert_relative_eq!(solution.reactions[2], 0.0);
    }

    #[test]
    fn prescribed_displacement_drives_free_dofs() {
        let k = springs(1.0, 1.0);
        let loads = DVector::zeros(3);
        let partition = BoundaryConditions::from_pairs([(0, 0.0), (2, 0.2)])
            .expect("valid")
            .partition(3)
            .expect("valid");
        let solution =
            solve_partitioned(&k, &loads, &partition, &SolverConfig::default()).expect("solves");
        assert_relative_eq!(solution.displacements[1], 0.1, epsilon = 1.0e-12);
        assert_relative_eq!(solution.displacements[2], 0.2);
        assert_relative_eq!(solution.reactions[0], -0.1, epsilon = 1.0e-12);
        assert_relative_eq!(solution.reactions[2], 0.1, epsilon = 1.0e-12);
    }

    #[test]
    fn floating_system_is_underconstrained() {
        let k = springs(1.0, 1.0);
        let loads = DVector::zeros(3);
        let partition = BoundaryConditions::new().partition(3).expect("valid");
        let error = solve_partitioned(&k, &loads, &partition, &SolverConfig::default())
            .expect_err("rigid-body mode");
        assert_eq!(
            error,
            TrussError::UnderconstrainedSystem {
                rank_deficiency: 1,
                free_dofs: 3
            }
        );
    }

    #[test]
    fn fully_fixed_system_returns_prescribed_values() {
        let k = springs(1.0, 1.0);
        let loads = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let partition = BoundaryConditions::from_pairs([(0, 0.0), (1, 0.0), (2, 0.0)])
            .expect("valid")
            .partition(3)
            .expect("valid");
        let solution =
            solve_partitioned(&k, &loads, &partition, &SolverConfig::default()).expect("solves");
        assert_eq!(solution.displacements, DVector::zeros(3));
        assert_relative_eq!(solution.reactions[0], -1.0);
        assert_eq!(solution.condition_number, 1.0);
    }

    #[test]
    fn load_length_is_checked() {
        let k = springs(1.0, 1.0);
        let loads = DVector::zeros(2);
        let partition = BoundaryConditions::new().partition(3).expect("valid");
        assert_eq!(
            solve_partitioned(&k, &loads, &partition, &SolverConfig::default())
                .expect_err("short load vector"),
            TrussError::DimensionMismatch {
                what: "load vector",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn condition_number_of_diagonal_matrix() {
        let matrix = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 10.0, 100.0]));
        let condition = condition_number(&matrix, 1.0e-10).expect("well conditioned");
        assert_relative_eq!(condition, 100.0, epsilon = 1.0e-9);

        let nearly = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0e-14, 1.0]));
        assert_eq!(
            condition_number(&nearly, 1.0e-10).expect_err("near singular"),
            TrussError::UnderconstrainedSystem {
                rank_deficiency: 1,
                free_dofs: 2
            }
        );
    }
}
