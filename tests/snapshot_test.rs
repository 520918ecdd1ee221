use gpxinfo_wasm::parser::parse_file;
use gpxinfo_wasm::writer::{segments_to_xml, to_xml};
use std::path::Path;

fn load_fixture(path: &str) -> gpxinfo_wasm::Gpx {
    parse_file(format!("tests/fixtures/{path}")).unwrap()
}

/// Compare actual XML output against the expected snapshot file.
/// When `UPDATE_SNAPSHOTS=1` is set, write/overwrite the expected file instead.
fn assert_snapshot(actual: &str, expected_path: &str) {
    let path = format!("tests/fixtures/expected/{expected_path}");

    if matches!(std::env::var("UPDATE_SNAPSHOTS").as_deref(), Ok("1")) {
        let dir = Path::new(&path).parent().unwrap();
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(&path, actual.as_bytes()).unwrap();
        eprintln!("Updated snapshot: {path}");
        return;
    }

    let expected = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Expected file not found: {path}. Run with UPDATE_SNAPSHOTS=1 to generate."));

    assert_eq!(
        actual, expected,
        "Snapshot mismatch for {path}.\nRun with UPDATE_SNAPSHOTS=1 to update."
    );
}

#[test]
fn snapshot_document() {
    let gpx = load_fixture("file.gpx");
    assert_snapshot(&to_xml(&gpx).unwrap(), "file.gpx");
}

#[test]
fn snapshot_transcoded_document_matches_utf8_structure() {
    let mut gpx = load_fixture("file2.gpx");
    gpx.tracks[0].name = "17-MRZ-12 16:44:12".to_string();
    assert_snapshot(&to_xml(&gpx).unwrap(), "file.gpx");
}

#[test]
fn snapshot_split_segments() {
    let mut gpx = load_fixture("file.gpx");
    gpx.split(0, 0, 2).unwrap();
    assert_snapshot(
        &segments_to_xml(&gpx.tracks[0].segments).unwrap(),
        "split_segments.xml",
    );
}

#[test]
fn snapshot_joined_segments() {
    let mut track = load_fixture("file.gpx").tracks.remove(0);
    track.split(0, 2).unwrap();
    track.join(0, 1).unwrap();
    assert_snapshot(&segments_to_xml(&track.segments).unwrap(), "joined_segments.xml");
}

#[test]
fn snapshot_normalized_output_is_stable() {
    let gpx = load_fixture("file.gpx");
    let once = to_xml(&gpx).unwrap();
    let twice = to_xml(&gpxinfo_wasm::parser::parse_gpx(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
}
