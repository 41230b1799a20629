use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::matrix::Matrix3;

/// Affine map `p -> matrix * p + origin`.
///
/// When the matrix is rigid the transform is a local-to-world frame: the
/// matrix columns are the local axes expressed in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: Matrix3,
    pub origin: Point3,
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            origin: Point3::ORIGIN,
        }
    }

    #[must_use]
    pub const fn from_matrix_origin(matrix: Matrix3, origin: Point3) -> Self {
        Self { matrix, origin }
    }

    /// Frame whose local axes are the given (world) vectors.
    #[must_use]
    pub const fn from_origin_and_axes(origin: Point3, x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        Self {
            matrix: Matrix3::from_columns(x_axis, y_axis, z_axis),
            origin,
        }
    }

    #[must_use]
    pub const fn translate(offset: Vec3) -> Self {
        Self {
            matrix: Matrix3::identity(),
            origin: Point3::new(offset.x, offset.y, offset.z),
        }
    }

    #[must_use]
    pub fn multiply_point(&self, p: Point3) -> Point3 {
        self.origin.add_vec(self.matrix.multiply_vec(p.to_vec3()))
    }

    #[must_use]
    pub fn multiply_vec(&self, v: Vec3) -> Vec3 {
        self.matrix.multiply_vec(v)
    }

    /// `self * other`: apply `other` first, then `self`.
    #[must_use]
    pub fn multiply_transform(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix.multiply_matrix(&other.matrix),
            origin: self.multiply_point(other.origin),
        }
    }

    /// Returns `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let inverse = self.matrix.inverse()?;
        let origin = inverse.multiply_vec(self.origin.to_vec3()).neg();
        Some(Self {
            matrix: inverse,
            origin: Point3::new(origin.x, origin.y, origin.z),
        })
    }

    #[must_use]
    pub fn is_identity(&self, tol: Tolerance) -> bool {
        self.matrix.is_identity(tol) && self.origin.to_vec3().max_abs() <= tol.eps
    }

    /// Matrix columns as individual axis vectors.
    #[must_use]
    pub const fn axes(&self) -> (Vec3, Vec3, Vec3) {
        (self.matrix.column(0), self.matrix.column(1), self.matrix.column(2))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply_transform(&rhs)
    }
}
