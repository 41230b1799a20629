//! End-to-end region analysis used by the host bindings.
//!
//! Keeps the bindings thin: integrate a boundary (in its own plane when it is
//! not parallel to XY), reduce the sums to principal axes and classify the
//! result, timing each phase through [`KernelMetrics`].

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance};
use super::curve::BoundaryCurve;
use super::frame::{FrameBuilder, RangeFrameOptions};
use super::metrics::{KernelMetrics, TimingBucket};
use super::moments::{MomentError, MomentSums, compute_area_moments_in_plane, compute_xy_area_moments};
use super::principal::{PrincipalAxes, ShapeClass};
use super::range::Range3;
use super::transform::Transform;

/// Which plane a boundary is integrated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntegrationPlane {
    /// Project onto world XY.
    #[default]
    WorldXy,
    /// Integrate in the plane of the boundary itself.
    CurvePlane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionOptions {
    pub plane: IntegrationPlane,
    /// Planarity and degeneracy tolerance.
    pub tolerance: f64,
    /// Relative tolerance for shape classification.
    pub classify_tolerance: f64,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            plane: IntegrationPlane::WorldXy,
            tolerance: Tolerance::SMALL_METRIC_DISTANCE.eps,
            classify_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionAnalysis {
    pub moments: MomentSums,
    pub principal: Option<PrincipalAxes>,
    pub shape: Option<ShapeClass>,
}

/// Moments, principal axes and shape class of a closed boundary.
///
/// `Ok(None)` when the boundary is degenerate (or not planar, for
/// [`IntegrationPlane::CurvePlane`]).
pub fn analyze_region(
    curve: &BoundaryCurve,
    options: &RegionOptions,
    metrics: &mut KernelMetrics,
) -> Result<Option<RegionAnalysis>, MomentError> {
    let tol = Tolerance::new(options.tolerance);
    let moments = metrics.time(TimingBucket::AreaMoments, || match options.plane {
        IntegrationPlane::WorldXy => compute_xy_area_moments(curve),
        IntegrationPlane::CurvePlane => compute_area_moments_in_plane(curve, tol),
    })?;
    let Some(moments) = moments else {
        return Ok(None);
    };

    let principal = metrics.time(TimingBucket::PrincipalAxes, || moments.principal_axes(tol))?;
    let shape = principal.map(|axes| axes.classify(Tolerance::new(options.classify_tolerance)));

    Ok(Some(RegionAnalysis {
        moments,
        principal,
        shape,
    }))
}

/// Validated right-handed frame through `points`, in announcement order.
pub fn frame_from_points(points: &[Point3], metrics: &mut KernelMetrics) -> Option<Transform> {
    metrics.time(TimingBucket::FrameBuilding, || {
        let mut builder = FrameBuilder::new();
        builder.announce_points(points);
        builder.get_validated_frame(false)
    })
}

pub fn range_frame(range: &Range3, options: &RangeFrameOptions, metrics: &mut KernelMetrics) -> Transform {
    metrics.time(TimingBucket::RangeFrames, || {
        FrameBuilder::create_local_to_world_transform_with_options(range, options)
    })
}
