//! Reduction of inertia sums to principal moments and axes.
//!
//! The centered products tensor `C = ∫ (r - c)(r - c)ᵀ dA` is diagonalized with
//! cyclic Jacobi rotations. Moments about each principal axis are
//! `trace(C) - λᵢ`, reported in ascending order; equal moments (within
//! tolerance) keep the order the solver produced them in.

use serde::Serialize;

use super::core::{Point3, Tolerance, Vec3};
use super::matrix::Matrix3;
use super::moments::{InertiaSums, MomentError};
use super::transform::Transform;

const MAX_JACOBI_SWEEPS: usize = 32;

/// Principal frame of a region or point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalAxes {
    /// Area as integrated, before sign normalization.
    pub signed_area: f64,
    pub centroid: Point3,
    /// Origin at the centroid; columns are the principal directions.
    pub local_to_world: Transform,
    /// Moments about each principal axis, ascending.
    pub principal_moments: Vec3,
    pub radius_of_gyration: Vec3,
}

/// Coarse shape of a mass distribution read off its principal moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeClass {
    /// All moments vanish.
    Point,
    /// Mass along a line: no moment about it, equal moments across it.
    WireLike,
    /// Planar distribution: the largest moment is the sum of the other two.
    DiskLike,
    /// Mass spread in three dimensions.
    ShellLike,
    /// All three moments equal.
    Isotropic,
}

impl PrincipalAxes {
    /// Principal direction `index` (0, 1 or 2).
    #[must_use]
    pub const fn axis(&self, index: usize) -> Vec3 {
        self.local_to_world.matrix.column(index)
    }

    #[must_use]
    pub fn world_to_local(&self) -> Option<Transform> {
        self.local_to_world.inverse()
    }

    /// `(m0 / m2, m1 / m2)`; `None` when the largest moment vanishes.
    #[must_use]
    pub fn moment_ratios(&self) -> Option<(f64, f64)> {
        let largest = self.principal_moments.z;
        if largest <= 0.0 || !largest.is_finite() {
            return None;
        }
        Some((self.principal_moments.x / largest, self.principal_moments.y / largest))
    }

    /// Ratio comparisons use `tol.eps` as a relative tolerance.
    #[must_use]
    pub fn classify(&self, tol: Tolerance) -> ShapeClass {
        let Some((r0, r1)) = self.moment_ratios() else {
            return ShapeClass::Point;
        };
        let eps = tol.eps;
        if r0 <= eps && (1.0 - r1) <= eps {
            ShapeClass::WireLike
        } else if (1.0 - r0) <= eps {
            ShapeClass::Isotropic
        } else if (r0 + r1 - 1.0).abs() <= eps {
            ShapeClass::DiskLike
        } else {
            ShapeClass::ShellLike
        }
    }
}

/// Principal moments and axes of `sums` accumulated about `origin`.
///
/// `Ok(None)` when the area is within tolerance of zero. Non-finite or
/// asymmetric products are a caller defect and yield `Err`. A negative area
/// (clockwise boundary) is normalized so moments are reported positive;
/// `signed_area` keeps the original sign.
pub fn inertia_products_to_principal_axes(
    origin: Point3,
    sums: &InertiaSums,
    tol: Tolerance,
) -> Result<Option<PrincipalAxes>, MomentError> {
    if !sums.is_finite() || !origin.is_finite() {
        return Err(MomentError::NonFiniteProducts);
    }
    let asymmetry = sums.products.max_asymmetry();
    let bound = tol.relative_bound(sums.products.max_abs());
    if asymmetry > bound {
        log::warn!("principal axes: products asymmetric by {asymmetry:e} (bound {bound:e})");
        return Err(MomentError::NotSymmetric { asymmetry, bound });
    }

    let signed_area = sums.area;
    if signed_area.abs() <= tol.eps {
        log::debug!("principal axes: area {signed_area:e} too small");
        return Ok(None);
    }
    let sign = signed_area.signum();
    let area = signed_area.abs();
    let first = sums.first_moment.mul_scalar(sign);
    let products = symmetrized(&sums.products.scaled(sign));

    let c = first.mul_scalar(1.0 / area);
    let centered = products - Matrix3::outer_product(c, c).scaled(area);
    let trace = centered.trace();

    let (eigenvalues, eigenvectors) = symmetric_eigen(&centered);
    let mut moments = eigenvalues.map(|lambda| trace - lambda);
    let mut order = [0_usize, 1, 2];
    let tie = tol.relative_bound(moments.iter().fold(0.0_f64, |acc, m| acc.max(m.abs())));
    sort_ascending_stable(&mut moments, &mut order, tie);

    let e0 = canonical_sign(eigenvectors.column(order[0]));
    let e1 = canonical_sign(eigenvectors.column(order[1]));
    let e2 = e0.cross(e1);

    let centroid = origin.add_vec(c);
    let radius = moments.map(|m| (m.max(0.0) / area).sqrt());

    Ok(Some(PrincipalAxes {
        signed_area,
        centroid,
        local_to_world: Transform::from_origin_and_axes(centroid, e0, e1, e2),
        principal_moments: Vec3::from_array(moments),
        radius_of_gyration: Vec3::from_array(radius),
    }))
}

/// Unit-weight moments of a point cloud, about its centroid.
///
/// `Ok(None)` for an empty slice. `signed_area` reports the point count.
pub fn points_to_principal_axes(points: &[Point3], tol: Tolerance) -> Result<Option<PrincipalAxes>, MomentError> {
    let Some(origin) = points.first().copied() else {
        return Ok(None);
    };
    let mut sums = InertiaSums::zero();
    for p in points {
        sums.accumulate_point(p.sub_point(origin));
    }
    inertia_products_to_principal_axes(origin, &sums, tol)
}

fn symmetrized(m: &Matrix3) -> Matrix3 {
    (*m + m.transpose()).scaled(0.5)
}

/// Flip `v` so that its largest-magnitude component is positive.
fn canonical_sign(v: Vec3) -> Vec3 {
    let mut dominant = v.x;
    for value in [v.y, v.z] {
        if value.abs() > dominant.abs() {
            dominant = value;
        }
    }
    if dominant < 0.0 { v.neg() } else { v }
}

/// Insertion sort that only swaps when the later value is smaller by more
/// than `tie`, so near-equal moments keep their incoming order.
fn sort_ascending_stable(values: &mut [f64; 3], order: &mut [usize; 3], tie: f64) {
    for i in 1..3 {
        let mut j = i;
        while j > 0 && values[j - 1] > values[j] + tie {
            values.swap(j - 1, j);
            order.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Eigenvalues and eigenvectors (as columns) of a symmetric matrix.
fn symmetric_eigen(matrix: &Matrix3) -> ([f64; 3], Matrix3) {
    let mut a = *matrix.as_rows();
    let mut v = *Matrix3::identity().as_rows();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        let diag = a[0][0] * a[0][0] + a[1][1] * a[1][1] + a[2][2] * a[2][2];
        if off <= f64::EPSILON * f64::EPSILON * (diag + off) {
            break;
        }

        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a[p][q] == 0.0 {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + theta.mul_add(theta, 1.0).sqrt());
            let c = 1.0 / t.mul_add(t, 1.0).sqrt();
            let s = t * c;

            for row in &mut a {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
            for k in 0..3 {
                let (pk, qk) = (a[p][k], a[q][k]);
                a[p][k] = c * pk - s * qk;
                a[q][k] = s * pk + c * qk;
            }
            for row in &mut v {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
        }
    }

    ([a[0][0], a[1][1], a[2][2]], Matrix3::from_rows(v))
}
