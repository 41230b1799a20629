//! Frame construction and planar region moment kernel.

mod analysis;
mod core;
mod curve;
mod frame;
mod matrix;
mod metrics;
mod moments;
mod principal;
mod range;
mod transform;

pub use analysis::{
    IntegrationPlane, RegionAnalysis, RegionOptions, analyze_region, frame_from_points, range_frame,
};
pub use core::{Point3, Tolerance, Vec3};
pub use curve::{Arc3, BoundaryCurve, Curve3, CurveError, CurveLocation, CurveLoop, Line3, Polyline3};
pub use frame::{AxisScaleSelect, FrameBuilder, FrameDatum, RangeFrameOptions};
pub use matrix::Matrix3;
pub use metrics::{KernelMetrics, KernelTimingReport, TimingBucket};
pub use moments::{
    InertiaSums, MomentError, MomentSums, compute_area_moments_in_plane, compute_xy_area,
    compute_xy_area_moments,
};
pub use principal::{PrincipalAxes, ShapeClass, inertia_products_to_principal_axes, points_to_principal_axes};
pub use range::Range3;
pub use transform::Transform;

#[cfg(test)]
mod tests;
