//! Area moments of planar regions by boundary integration.
//!
//! Every primitive of a boundary contributes the moments of the signed "fan"
//! region swept from a fixed origin to the primitive. Summed around a closed
//! loop the fans cancel outside the region, leaving its area, first moments
//! and second moments (products of inertia) about the origin.
//!
//! Line segments and line strings contribute closed-form triangle integrals.
//! An arc contributes two triangles through its center plus the sector between
//! them; the sector is integrated on the unit circle and mapped through the
//! arc's affine frame, so arcs tilted out of the XY plane integrate their
//! projection exactly.
//!
//! Area is positive for counterclockwise traversal. Callers that need a
//! particular sign orient the loop first; the integrator never reorients.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::curve::{Arc3, BoundaryCurve, Curve3};
use super::frame::FrameBuilder;
use super::matrix::Matrix3;
use super::principal::{PrincipalAxes, inertia_products_to_principal_axes};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MomentError {
    #[error("boundary geometry contains non-finite coordinates")]
    NonFiniteGeometry,
    #[error("inertia products must be finite")]
    NonFiniteProducts,
    #[error("inertia products are not symmetric: asymmetry {asymmetry:e} exceeds {bound:e}")]
    NotSymmetric { asymmetry: f64, bound: f64 },
}

/// Zeroth, first and second moments of a region about some origin.
///
/// All quantities are measured from the origin they were accumulated about;
/// [`MomentSums`] pairs them with that origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InertiaSums {
    /// Signed area (or total weight for point sums).
    pub area: f64,
    /// `∫ r dA`.
    pub first_moment: Vec3,
    /// `∫ r rᵀ dA`; symmetric by construction.
    pub products: Matrix3,
}

impl InertiaSums {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            area: 0.0,
            first_moment: Vec3::ZERO,
            products: Matrix3::zero(),
        }
    }

    /// Signed triangle `(origin, origin + a, origin + b)` using the XY
    /// projection of `a` and `b`.
    pub fn accumulate_triangle_xy(&mut self, a: Vec3, b: Vec3) {
        let a = Vec3::new(a.x, a.y, 0.0);
        let b = Vec3::new(b.x, b.y, 0.0);
        let det = a.cross_xy(b);
        if det == 0.0 {
            return;
        }
        self.area += 0.5 * det;
        self.first_moment = self.first_moment.add(a.add(b).mul_scalar(det / 6.0));

        let products = Matrix3::outer_product(a, a).scaled(2.0)
            + Matrix3::outer_product(a, b)
            + Matrix3::outer_product(b, a)
            + Matrix3::outer_product(b, b).scaled(2.0);
        self.products = self.products + products.scaled(det / 24.0);
    }

    /// Sector of `arc` (center to arc) in the XY projection; `center_offset` is
    /// the arc center relative to the accumulation origin.
    pub fn accumulate_sector_xy(&mut self, arc: &Arc3, center_offset: Vec3) {
        let u = Vec3::new(arc.vector0.x, arc.vector0.y, 0.0);
        let v = Vec3::new(arc.vector90.x, arc.vector90.y, 0.0);
        let d = Vec3::new(center_offset.x, center_offset.y, 0.0);
        let det = u.cross_xy(v);
        if det == 0.0 {
            return;
        }

        let local = unit_sector_moments(arc.start_angle, arc.start_angle + arc.sweep_angle);

        // Local sums pushed through p = d + X u + Y v.
        let mapped_first = u.mul_scalar(local.fx).add(v.mul_scalar(local.fy));
        let jsj = Matrix3::outer_product(u, u).scaled(local.xx)
            + Matrix3::outer_product(u, v).scaled(local.xy)
            + Matrix3::outer_product(v, u).scaled(local.xy)
            + Matrix3::outer_product(v, v).scaled(local.yy);
        let products = Matrix3::outer_product(d, d).scaled(local.area)
            + Matrix3::outer_product(d, mapped_first)
            + Matrix3::outer_product(mapped_first, d)
            + jsj;

        self.area += det * local.area;
        self.first_moment = self
            .first_moment
            .add(d.mul_scalar(local.area).add(mapped_first).mul_scalar(det));
        self.products = self.products + products.scaled(det);
    }

    /// Unit-weight point at `r` relative to the origin.
    pub fn accumulate_point(&mut self, r: Vec3) {
        self.area += 1.0;
        self.first_moment = self.first_moment.add(r);
        self.products = self.products + Matrix3::outer_product(r, r);
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            area: self.area + other.area,
            first_moment: self.first_moment.add(other.first_moment),
            products: self.products + other.products,
        }
    }

    /// Same sums measured from an origin displaced by `-shift`, i.e. every
    /// relative position `r` becomes `r + shift`.
    #[must_use]
    pub fn shifted(&self, shift: Vec3) -> Self {
        let products = self.products
            + Matrix3::outer_product(shift, self.first_moment)
            + Matrix3::outer_product(self.first_moment, shift)
            + Matrix3::outer_product(shift, shift).scaled(self.area);
        Self {
            area: self.area,
            first_moment: self.first_moment.add(shift.mul_scalar(self.area)),
            products,
        }
    }

    /// Sums re-expressed in a rotated basis: `r -> rotation * r`.
    #[must_use]
    pub fn rotated(&self, rotation: &Matrix3) -> Self {
        Self {
            area: self.area,
            first_moment: rotation.multiply_vec(self.first_moment),
            products: rotation
                .multiply_matrix(&self.products)
                .multiply_matrix(&rotation.transpose()),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.area.is_finite() && self.first_moment.is_finite() && self.products.is_finite()
    }
}

impl Default for InertiaSums {
    fn default() -> Self {
        Self::zero()
    }
}

/// Raw moment sums of one boundary traversal, about `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentSums {
    pub origin: Point3,
    pub sums: InertiaSums,
}

impl MomentSums {
    #[must_use]
    pub fn area(&self) -> f64 {
        self.sums.area
    }

    /// `None` when the area is within tolerance of zero.
    #[must_use]
    pub fn centroid(&self, tol: Tolerance) -> Option<Point3> {
        if tol.approx_zero_f64(self.sums.area) {
            return None;
        }
        Some(
            self.origin
                .add_vec(self.sums.first_moment.mul_scalar(1.0 / self.sums.area)),
        )
    }

    /// The same region measured about `new_origin`.
    #[must_use]
    pub fn shifted_to(&self, new_origin: Point3) -> Self {
        Self {
            origin: new_origin,
            sums: self.sums.shifted(self.origin.sub_point(new_origin)),
        }
    }

    pub fn principal_axes(&self, tol: Tolerance) -> Result<Option<PrincipalAxes>, MomentError> {
        inertia_products_to_principal_axes(self.origin, &self.sums, tol)
    }
}

struct UnitSectorMoments {
    area: f64,
    fx: f64,
    fy: f64,
    xx: f64,
    xy: f64,
    yy: f64,
}

/// Moments of the unit-circle sector between angles `a0` and `a1`; signed by
/// the direction from `a0` to `a1`.
fn unit_sector_moments(a0: f64, a1: f64) -> UnitSectorMoments {
    let (s0, c0) = a0.sin_cos();
    let (s1, c1) = a1.sin_cos();
    let sweep = a1 - a0;
    let double_sin = (2.0 * a1).sin() - (2.0 * a0).sin();
    UnitSectorMoments {
        area: 0.5 * sweep,
        fx: (s1 - s0) / 3.0,
        fy: (c0 - c1) / 3.0,
        xx: 0.25 * (0.5 * sweep + 0.25 * double_sin),
        yy: 0.25 * (0.5 * sweep - 0.25 * double_sin),
        xy: (s1 * s1 - s0 * s0) / 8.0,
    }
}

impl BoundaryCurve {
    /// Oriented boundary-integral contribution of this curve, as fans from
    /// `origin`, added to `sums`.
    pub fn accumulate_xy_area_moments(&self, sums: &mut InertiaSums, origin: Point3) {
        match self {
            Self::LineSegment(line) => {
                sums.accumulate_triangle_xy(line.start.sub_point(origin), line.end.sub_point(origin));
            }
            Self::LineString(polyline) => {
                for (a, b) in polyline.edges() {
                    sums.accumulate_triangle_xy(a.sub_point(origin), b.sub_point(origin));
                }
            }
            Self::Arc(arc) => {
                let start = arc.start_point().sub_point(origin);
                let end = arc.end_point().sub_point(origin);
                let center = arc.center.sub_point(origin);
                sums.accumulate_triangle_xy(start, center);
                sums.accumulate_triangle_xy(center, end);
                sums.accumulate_sector_xy(arc, center);
            }
            Self::Loop(curve_loop) => {
                for child in curve_loop.children() {
                    child.accumulate_xy_area_moments(sums, origin);
                }
            }
        }
    }
}

/// Area, first moments and products of the XY projection of a closed boundary.
///
/// The origin of the returned sums is the start point of the first primitive.
/// `Ok(None)` for an empty loop or a boundary of zero length; `Err` when the
/// geometry has non-finite coordinates.
pub fn compute_xy_area_moments(curve: &BoundaryCurve) -> Result<Option<MomentSums>, MomentError> {
    if !curve.is_finite() {
        log::warn!("area moments requested for a boundary with non-finite coordinates");
        return Err(MomentError::NonFiniteGeometry);
    }
    if curve.primitive_count() == 0 {
        log::debug!("area moments: empty loop");
        return Ok(None);
    }
    let length = curve.length();
    if length <= Tolerance::SMALL_METRIC_DISTANCE.eps {
        log::debug!("area moments: boundary length {length:e} is degenerate");
        return Ok(None);
    }

    let origin = curve.start_point();
    let mut sums = InertiaSums::zero();
    curve.accumulate_xy_area_moments(&mut sums, origin);
    Ok(Some(MomentSums { origin, sums }))
}

/// Signed XY area of a closed boundary.
pub fn compute_xy_area(curve: &BoundaryCurve) -> Result<Option<f64>, MomentError> {
    Ok(compute_xy_area_moments(curve)?.map(|moments| moments.sums.area))
}

/// Area moments of a planar boundary in its own plane.
///
/// The plane comes from [`FrameBuilder::curves_to_plane`]; the boundary is
/// integrated in that local frame and the sums are rotated back to world
/// coordinates. `Ok(None)` when the boundary is not planar within `tol` or is
/// otherwise insufficient.
pub fn compute_area_moments_in_plane(
    curve: &BoundaryCurve,
    tol: Tolerance,
) -> Result<Option<MomentSums>, MomentError> {
    if !curve.is_finite() {
        return Err(MomentError::NonFiniteGeometry);
    }
    let Some(local_to_world) = FrameBuilder::curves_to_plane(std::slice::from_ref(curve), tol) else {
        log::debug!("area moments in plane: boundary is not planar");
        return Ok(None);
    };
    let Some(world_to_local) = local_to_world.inverse() else {
        return Ok(None);
    };

    let local = curve.transformed(&world_to_local);
    let Some(local_moments) = compute_xy_area_moments(&local)? else {
        return Ok(None);
    };

    Ok(Some(MomentSums {
        origin: local_to_world.multiply_point(local_moments.origin),
        sums: local_moments.sums.rotated(&local_to_world.matrix),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_sector_full_circle() {
        let m = unit_sector_moments(0.0, std::f64::consts::TAU);
        assert!((m.area - std::f64::consts::PI).abs() < 1e-12);
        assert!(m.fx.abs() < 1e-12);
        assert!(m.fy.abs() < 1e-12);
        assert!((m.xx - std::f64::consts::PI / 4.0).abs() < 1e-12);
        assert!((m.yy - std::f64::consts::PI / 4.0).abs() < 1e-12);
        assert!(m.xy.abs() < 1e-12);
    }

    #[test]
    fn test_triangle_products_are_symmetric() {
        let mut sums = InertiaSums::zero();
        sums.accumulate_triangle_xy(Vec3::new(3.0, 0.5, 0.0), Vec3::new(-1.0, 2.0, 0.0));
        assert_eq!(sums.products.max_asymmetry(), 0.0);
        assert!(sums.area > 0.0);
    }

    #[test]
    fn test_shift_round_trip() {
        let mut sums = InertiaSums::zero();
        sums.accumulate_triangle_xy(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let shift = Vec3::new(2.0, -1.0, 0.5);
        let back = sums.shifted(shift).shifted(shift.neg());
        assert!((back.area - sums.area).abs() < 1e-12);
        assert!(back.products.max_diff(&sums.products) < 1e-12);
    }
}
