#![cfg(target_arch = "wasm32")]

use gpxinfo_wasm::{gpx_info_string, join_segments, normalize_gpx, split_segment};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const TRACK: &str = r#"<gpx creator="wasm"><trk><trkseg>
<trkpt lat="45.0" lon="7.0"><time>2020-01-01T00:00:00Z</time></trkpt>
<trkpt lat="45.001" lon="7.0"><time>2020-01-01T00:01:00Z</time></trkpt>
<trkpt lat="45.002" lon="7.0"><time>2020-01-01T00:02:00Z</time></trkpt>
</trkseg></trk></gpx>"#;

#[wasm_bindgen_test]
fn info_string_reports_moving_time() {
    let json = gpx_info_string(TRACK, JsValue::UNDEFINED).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["movingData"]["movingTime"], 120.0);
    assert_eq!(value["pointCount"], 3);
}

#[wasm_bindgen_test]
fn split_and_join_roundtrip() {
    let normalized = normalize_gpx(TRACK).unwrap();
    let split = split_segment(TRACK, 0, 0, 0).unwrap();
    assert_eq!(split.matches("<trkseg>").count(), 2);
    let joined = join_segments(&split, 0, 0, 1).unwrap();
    assert_eq!(joined, normalized);
}

#[wasm_bindgen_test]
fn bad_index_is_an_error() {
    assert!(split_segment(TRACK, 3, 0, 0).is_err());
}
