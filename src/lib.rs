pub mod editor;
pub mod error;
pub mod geometry;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod summary;
pub mod writer;

use wasm_bindgen::prelude::*;

pub use crate::error::GpxError;
pub use crate::gpx_types::{
    Author, Bounds, Gpx, Link, Metadata, MovingData, Segment, TimeBounds, Track, Waypoint,
};
use crate::options::AnalysisOptions;

/// Summarize a GPX string, returned as a JS object.
#[wasm_bindgen(js_name = gpxInfo)]
pub fn gpx_info(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let gpx = parser::parse_gpx(gpx_string)?;
    let summary = summary::summarize(&gpx, &opts);
    serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Summarize a GPX string, returned as a JSON string.
#[wasm_bindgen(js_name = gpxInfoString)]
pub fn gpx_info_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let gpx = parser::parse_gpx(gpx_string)?;
    let summary = summary::summarize(&gpx, &opts);
    serde_json::to_string(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Summarize raw GPX bytes in whatever encoding the document declares.
#[wasm_bindgen(js_name = gpxInfoBytes)]
pub fn gpx_info_bytes(bytes: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let gpx = parser::parse_gpx_bytes(bytes)?;
    let summary = summary::summarize(&gpx, &opts);
    serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Re-serialize a GPX string in canonical form.
#[wasm_bindgen(js_name = normalizeGpx)]
pub fn normalize_gpx(gpx_string: &str) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let gpx = parser::parse_gpx(gpx_string)?;
    Ok(writer::to_xml(&gpx)?)
}

/// Split a track segment after `point` and return the edited document.
#[wasm_bindgen(js_name = splitSegment)]
pub fn split_segment(
    gpx_string: &str,
    track: usize,
    segment: usize,
    point: usize,
) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let mut gpx = parser::parse_gpx(gpx_string)?;
    gpx.split(track, segment, point)?;
    Ok(writer::to_xml(&gpx)?)
}

/// Append segment `b` to segment `a` within a track and return the edited document.
#[wasm_bindgen(js_name = joinSegments)]
pub fn join_segments(gpx_string: &str, track: usize, a: usize, b: usize) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let mut gpx = parser::parse_gpx(gpx_string)?;
    gpx.join(track, a, b)?;
    Ok(writer::to_xml(&gpx)?)
}

fn parse_options(options: JsValue) -> Result<AnalysisOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(AnalysisOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
