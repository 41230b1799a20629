#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use serde::de::DeserializeOwned;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use geom::{BoundaryCurve, KernelMetrics, Point3, Range3, RangeFrameOptions, RegionOptions};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Area moments, principal axes and shape class of a closed boundary.
///
/// `boundary` is a tagged [`BoundaryCurve`]; `options` is an optional
/// [`RegionOptions`]. Resolves to `undefined` for degenerate boundaries.
#[wasm_bindgen]
pub fn region_moments(boundary: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let curve: BoundaryCurve = serde_wasm_bindgen::from_value(boundary).map_err(to_js_error)?;
    let options: RegionOptions = optional_value(options)?;

    let mut metrics = KernelMetrics::default();
    metrics.begin();
    let analysis = geom::analyze_region(&curve, &options, &mut metrics).map_err(to_js_error)?;
    if let Some(report) = metrics.end() {
        log::debug!("region_moments: {:.3} ms", report.total_ms());
    }
    serde_wasm_bindgen::to_value(&analysis).map_err(to_js_error)
}

/// Validated right-handed frame through an array of `{x, y, z}` points.
#[wasm_bindgen]
pub fn frame_from_points(points: JsValue) -> Result<JsValue, JsValue> {
    let points: Vec<Point3> = serde_wasm_bindgen::from_value(points).map_err(to_js_error)?;
    let mut metrics = KernelMetrics::default();
    let frame = geom::frame_from_points(&points, &mut metrics);
    if frame.is_none() {
        debug_log!("frame_from_points: {} points span fewer than two directions", points.len());
    }
    serde_wasm_bindgen::to_value(&frame).map_err(to_js_error)
}

/// Scaled axis-aligned frame for the range spanned by `low` and `high`.
#[wasm_bindgen]
pub fn range_frame(low: JsValue, high: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let low: Point3 = serde_wasm_bindgen::from_value(low).map_err(to_js_error)?;
    let high: Point3 = serde_wasm_bindgen::from_value(high).map_err(to_js_error)?;
    let options: RangeFrameOptions = optional_value(options)?;

    let range = Range3::from_points(&[low, high]);
    let mut metrics = KernelMetrics::default();
    let frame = geom::range_frame(&range, &options, &mut metrics);
    serde_wasm_bindgen::to_value(&frame).map_err(to_js_error)
}

fn optional_value<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
