use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::core::{Tolerance, Vec3};

/// 3x3 real matrix, stored row-major.
///
/// Used both as a frame orientation (columns are the local axes) and as a
/// symmetric tensor of area products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    m: [[f64; 3]; 3],
}

impl Matrix3 {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self { m: [[0.0; 3]; 3] }
    }

    #[must_use]
    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    #[must_use]
    pub const fn from_columns(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self {
            m: [[x.x, y.x, z.x], [x.y, y.y, z.y], [x.z, y.z, z.z]],
        }
    }

    #[must_use]
    pub const fn diagonal(a: f64, b: f64, c: f64) -> Self {
        Self {
            m: [[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]],
        }
    }

    /// `a * b^T`.
    #[must_use]
    pub fn outer_product(a: Vec3, b: Vec3) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = a.at(i) * b.at(j);
            }
        }
        Self { m }
    }

    #[must_use]
    pub const fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[row][col] = value;
    }

    #[must_use]
    pub const fn as_rows(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    #[must_use]
    pub const fn column(&self, index: usize) -> Vec3 {
        Vec3::new(self.m[0][index], self.m[1][index], self.m[2][index])
    }

    #[must_use]
    pub const fn row(&self, index: usize) -> Vec3 {
        Vec3::new(self.m[index][0], self.m[index][1], self.m[index][2])
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.m[j][i];
            }
        }
        Self { m }
    }

    #[must_use]
    pub fn multiply_vec(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }

    #[must_use]
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }
        Self { m }
    }

    #[must_use]
    pub fn scaled(&self, s: f64) -> Self {
        let mut out = *self;
        for row in &mut out.m {
            for value in row.iter_mut() {
                *value *= s;
            }
        }
        out
    }

    #[must_use]
    pub fn trace(&self) -> f64 {
        self.m[0][0] + self.m[1][1] + self.m[2][2]
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.column(0).dot(self.column(1).cross(self.column(2)))
    }

    /// Inverse via the adjugate. `None` when the columns are dependent: the
    /// determinant is compared with the product of the column lengths, so
    /// axes of very different length still invert.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let c0 = self.column(0);
        let c1 = self.column(1);
        let c2 = self.column(2);
        let r0 = c1.cross(c2);
        let r1 = c2.cross(c0);
        let r2 = c0.cross(c1);
        let det = c0.dot(r0);
        let volume = c0.length() * c1.length() * c2.length();
        if !det.is_finite() || det.abs() <= Tolerance::ZERO_LENGTH.eps * volume {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Self {
            m: [
                [r0.x * inv_det, r0.y * inv_det, r0.z * inv_det],
                [r1.x * inv_det, r1.y * inv_det, r1.z * inv_det],
                [r2.x * inv_det, r2.y * inv_det, r2.z * inv_det],
            ],
        })
    }

    /// Largest absolute entry.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.m
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0_f64, |acc, value| acc.max(value.abs()))
    }

    /// Largest `|m[i][j] - m[j][i]|`.
    #[must_use]
    pub fn max_asymmetry(&self) -> f64 {
        let a = (self.m[0][1] - self.m[1][0]).abs();
        let b = (self.m[0][2] - self.m[2][0]).abs();
        let c = (self.m[1][2] - self.m[2][1]).abs();
        a.max(b).max(c)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.m.iter().flat_map(|row| row.iter()).all(|v| v.is_finite())
    }

    #[must_use]
    pub fn max_diff(&self, other: &Self) -> f64 {
        let mut diff = 0.0_f64;
        for i in 0..3 {
            for j in 0..3 {
                diff = diff.max((self.m[i][j] - other.m[i][j]).abs());
            }
        }
        diff
    }

    #[must_use]
    pub fn is_identity(&self, tol: Tolerance) -> bool {
        self.max_diff(&Self::identity()) <= tol.eps
    }

    /// All off-diagonal entries within tolerance of zero.
    #[must_use]
    pub fn is_diagonal(&self, tol: Tolerance) -> bool {
        let bound = tol.relative_bound(self.max_abs());
        (0..3).all(|i| (0..3).all(|j| i == j || self.m[i][j].abs() <= bound))
    }

    /// Columns are unit length, mutually perpendicular and form a right-handed
    /// basis.
    #[must_use]
    pub fn is_rigid(&self, tol: Tolerance) -> bool {
        let product = self.transpose().multiply_matrix(self);
        product.is_identity(tol) && (self.determinant() - 1.0).abs() <= tol.eps
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add for Matrix3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let mut out = self;
        for i in 0..3 {
            for j in 0..3 {
                out.m[i][j] += rhs.m[i][j];
            }
        }
        out
    }
}

impl Sub for Matrix3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = self;
        for i in 0..3 {
            for j in 0..3 {
                out.m[i][j] -= rhs.m[i][j];
            }
        }
        out
    }
}

impl Mul for Matrix3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply_matrix(&rhs)
    }
}

impl Mul<Vec3> for Matrix3 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.multiply_vec(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_round_trip() {
        let x = Vec3::new(1.0, 2.0, 3.0);
        let y = Vec3::new(4.0, 5.0, 6.0);
        let z = Vec3::new(7.0, 8.0, 10.0);
        let m = Matrix3::from_columns(x, y, z);
        assert_eq!(m.column(0), x);
        assert_eq!(m.column(2), z);
        assert_eq!(m.transpose().row(1), y);
    }

    #[test]
    fn test_inverse_of_general_matrix() {
        let m = Matrix3::from_rows([[2.0, 1.0, 0.0], [0.0, 3.0, 1.0], [1.0, 0.0, 4.0]]);
        let inv = m.inverse().unwrap();
        assert!(m.multiply_matrix(&inv).is_identity(Tolerance::DEFAULT));
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Matrix3::from_columns(Vec3::X, Vec3::X.mul_scalar(2.0), Vec3::Z);
        assert!(m.inverse().is_none());
        assert_eq!(m.determinant(), 0.0);
    }

    #[test]
    fn test_inverse_of_badly_scaled_diagonal() {
        let m = Matrix3::diagonal(1.0e6, 1.0e-3, 1.0);
        let inv = m.inverse().unwrap();
        assert!(m.multiply_matrix(&inv).is_identity(Tolerance::DEFAULT));

        // Nearly parallel columns stay singular regardless of their length.
        let nearly = Matrix3::from_columns(Vec3::X.mul_scalar(1.0e6), Vec3::new(1.0, 1.0e-15, 0.0), Vec3::Z);
        assert!(nearly.inverse().is_none());
    }

    #[test]
    fn test_rigid_checks_handedness() {
        assert!(Matrix3::identity().is_rigid(Tolerance::DEFAULT));
        let mirrored = Matrix3::from_columns(Vec3::X, Vec3::Y, Vec3::Z.neg());
        assert!(!mirrored.is_rigid(Tolerance::DEFAULT));
        assert!(!Matrix3::diagonal(2.0, 2.0, 2.0).is_rigid(Tolerance::DEFAULT));
    }

    #[test]
    fn test_asymmetry_and_diagonal() {
        let mut m = Matrix3::diagonal(1.0, 2.0, 3.0);
        assert!(m.is_diagonal(Tolerance::DEFAULT));
        assert_eq!(m.max_asymmetry(), 0.0);
        m.set(0, 2, 0.5);
        assert!(!m.is_diagonal(Tolerance::DEFAULT));
        assert_eq!(m.max_asymmetry(), 0.5);
    }

    #[test]
    fn test_outer_product() {
        let m = Matrix3::outer_product(Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(m.at(1, 2), 6.0);
        assert_eq!(m.at(0, 1), 1.0);
        assert_eq!(m.trace(), 2.0);
    }
}
