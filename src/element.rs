//! Stiffness of a single pin-jointed bar.
//!
//! The bar only resists axial elongation. Its 2 × 2 axial stiffness in the local
//! basis `[u_t(tail), u_t(head)]` follows from the strain energy of a bar with
//! constant strain `(u_t(head) - u_t(tail)) / L`. Padding that block with zero
//! rows for the two normal dofs and rotating it into the global frame gives the
//! 4 × 4 matrix that the assembler scatters into the global system.

use nalgebra::{Matrix2, Matrix4, Vector4};

use crate::geometry::Element;

/// Axial stiffness `ES / L * [[1, -1], [-1, 1]]` in the local tangential basis.
#[must_use]
pub fn local_axial_stiffness(axial_stiffness: f64, length: f64) -> Matrix2<f64> {
    axial_stiffness / length * Matrix2::new(1.0, -1.0, -1.0, 1.0)
}

/// Local stiffness expanded to the basis `[u_t(tail), u_n(tail), u_t(head), u_n(head)]`.
///
/// The normal dofs carry no stiffness.
#[must_use]
pub fn expanded_local_stiffness(axial_stiffness: f64, length: f64) -> Matrix4<f64> {
    let axial = local_axial_stiffness(axial_stiffness, length);
    let mut expanded = Matrix4::zeros();
    for (row_local, row) in [0, 2].into_iter().enumerate() {
        for (col_local, col) in [0, 2].into_iter().enumerate() {
            expanded[(row, col)] = axial[(row_local, col_local)];
        }
    }
    expanded
}

/// Rotation from global `[u_x, u_y]` pairs to local `[u_t, u_n]` pairs at both ends.
#[must_use]
pub fn rotation_matrix(angle: f64) -> Matrix4<f64> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        c, s, 0.0, 0.0, //
        -s, c, 0.0, 0.0, //
        0.0, 0.0, c, s, //
        0.0, 0.0, -s, c,
    )
}

/// Axial direction vector `d = [-cos θ, -sin θ, cos θ, sin θ]` in global dofs.
///
/// `|d| = √2`; `d · u_e` is the elongation of the bar for element displacements `u_e`.
#[must_use]
pub fn axial_direction(angle: f64) -> Vector4<f64> {
    let (s, c) = angle.sin_cos();
    Vector4::new(-c, -s, c, s)
}

/// Global stiffness `Rᵀ · K_local · R` of a bar.
#[must_use]
pub fn global_stiffness(axial_stiffness: f64, length: f64, angle: f64) -> Matrix4<f64> {
    let rotation = rotation_matrix(angle);
    rotation.transpose() * expanded_local_stiffness(axial_stiffness, length) * rotation
}

/// Closed form `ES / L * d ⊗ d` of [`global_stiffness`].
#[must_use]
pub fn closed_form_stiffness(axial_stiffness: f64, length: f64, angle: f64) -> Matrix4<f64> {
    let d = axial_direction(angle);
    axial_stiffness / length * d * d.transpose()
}

impl Element {
    /// Global 4 × 4 stiffness of this element for the given axial stiffness.
    #[must_use]
    pub fn stiffness(&self, axial_stiffness: f64) -> Matrix4<f64> {
        global_stiffness(axial_stiffness, self.length, self.angle)
    }

    /// Axial direction vector of this element in its global dofs.
    #[must_use]
    pub fn axial_direction(&self) -> Vector4<f64> {
        axial_direction(self.angle)
    }
}
