use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

pub const GPX_VERSION: &str = "1.1";
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
pub const DEFAULT_CREATOR: &str = "gpxinfo-wasm";

/// A GPX 1.1 document. Owns every track, segment and waypoint below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Gpx {
    pub creator: String,
    pub metadata: Option<Metadata>,
    pub waypoints: Vec<Waypoint>,
    pub tracks: Vec<Track>,
}

impl Gpx {
    /// Empty document for programmatic building.
    pub fn new() -> Self {
        Self {
            creator: DEFAULT_CREATOR.to_string(),
            metadata: None,
            waypoints: Vec::new(),
            tracks: Vec::new(),
        }
    }

    /// Always "1.1"; the version is not configurable.
    pub fn version(&self) -> &'static str {
        GPX_VERSION
    }
}

impl Default for Gpx {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-level `<metadata>`. The timestamp stays raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<Author>,
    pub link: Option<Link>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub href: String,
    pub text: Option<String>,
}

/// A GPX track (<trk>).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name: String,
    pub segments: Vec<Segment>,
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub points: Vec<Waypoint>,
}

impl Segment {
    pub fn new(points: Vec<Waypoint>) -> Self {
        Self { points }
    }
}

/// A single GPX point (used for wpt and trkpt).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    /// ISO-8601 text exactly as read; see [`Waypoint::time`].
    pub timestamp: Option<String>,
    pub name: String,
    pub sym: String,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Default::default()
        }
    }

    pub fn with_ele(mut self, ele: f64) -> Self {
        self.ele = Some(ele);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Parsed timestamp. Unparseable text counts as no time at all.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t.with_timezone(&Utc));
        }
        // Some loggers drop the zone designator.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|t| t.and_utc())
    }
}

/// Latitude/longitude extent, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub(crate) fn from_point(pt: &Waypoint) -> Self {
        Self {
            min_lat: pt.lat,
            max_lat: pt.lat,
            min_lon: pt.lon,
            max_lon: pt.lon,
        }
    }

    pub(crate) fn extend(self, other: Bounds) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

/// First and last timestamp of a segment, track or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Moving vs stopped split of a recording. Times in seconds, distances in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingData {
    pub moving_time: f64,
    pub stopped_time: f64,
    pub moving_distance: f64,
    pub stopped_distance: f64,
    /// m/s
    pub max_speed: f64,
}

impl MovingData {
    pub(crate) fn accumulate(self, other: MovingData) -> Self {
        Self {
            moving_time: self.moving_time + other.moving_time,
            stopped_time: self.stopped_time + other.stopped_time,
            moving_distance: self.moving_distance + other.moving_distance,
            stopped_distance: self.stopped_distance + other.stopped_distance,
            max_speed: if other.max_speed > self.max_speed {
                other.max_speed
            } else {
                self.max_speed
            },
        }
    }
}
