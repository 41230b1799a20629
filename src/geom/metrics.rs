//! Opt-in timing hooks for the kernel.
//!
//! Timing is only collected when the `kernel_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). In every
//! other build the calls compile to plain closure invocations.
//!
//! ```ignore
//! use ghx_moments::geom::{KernelMetrics, TimingBucket};
//!
//! let mut metrics = KernelMetrics::default();
//! metrics.begin();
//! let sums = metrics.time(TimingBucket::AreaMoments, || compute_xy_area_moments(&boundary));
//! if let Some(report) = metrics.end() {
//!     println!("area moments: {} ns", report.area_moments_ns);
//! }
//! ```

/// Phases of the kernel that accumulate time separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Announcing curves/points and extracting validated frames.
    FrameBuilding,
    /// Range-to-frame construction.
    RangeFrames,
    /// Boundary integration of area moments.
    AreaMoments,
    /// Eigen-reduction of inertia sums.
    PrincipalAxes,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KernelTimingReport {
    pub frame_building_ns: u64,
    pub range_frames_ns: u64,
    pub area_moments_ns: u64,
    pub principal_axes_ns: u64,
}

impl KernelTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.frame_building_ns
            .saturating_add(self.range_frames_ns)
            .saturating_add(self.area_moments_ns)
            .saturating_add(self.principal_axes_ns)
    }

    /// Total in milliseconds, for display.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for kernel timings.
///
/// Call [`begin`](Self::begin) to reset, wrap work in [`time`](Self::time) and
/// read the totals with [`end`](Self::end), which is `None` whenever metrics are
/// compiled out.
#[derive(Debug, Default)]
pub struct KernelMetrics {
    #[cfg(all(feature = "kernel_metrics", not(target_arch = "wasm32")))]
    report: KernelTimingReport,
}

impl KernelMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "kernel_metrics", not(target_arch = "wasm32")))]
        {
            self.report = KernelTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<KernelTimingReport> {
        #[cfg(all(feature = "kernel_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "kernel_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its elapsed time to `bucket` when metrics are enabled.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "kernel_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "kernel_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "kernel_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::FrameBuilding => &mut self.report.frame_building_ns,
            TimingBucket::RangeFrames => &mut self.report.range_frames_ns,
            TimingBucket::AreaMoments => &mut self.report.area_moments_ns,
            TimingBucket::PrincipalAxes => &mut self.report.principal_axes_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
