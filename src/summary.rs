use std::fmt;

use serde::Serialize;

use crate::gpx_types::*;
use crate::options::AnalysisOptions;

/// Trip statistics for a whole document. Distances in meters, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpxSummary {
    pub creator: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub waypoint_count: usize,
    pub point_count: usize,
    pub length_2d: f64,
    pub length_3d: f64,
    pub duration: f64,
    pub bounds: Option<Bounds>,
    pub time_bounds: Option<TimeBounds>,
    pub moving_data: MovingData,
    pub max_speed_kmh: f64,
    pub uphill: f64,
    pub downhill: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<TrackSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub name: String,
    pub segment_count: usize,
    pub point_count: usize,
    pub length_2d: f64,
    pub length_3d: f64,
    pub duration: f64,
    pub moving_data: MovingData,
    pub uphill: f64,
    pub downhill: f64,
}

/// Compute the summary of a parsed document.
pub fn summarize(gpx: &Gpx, opts: &AnalysisOptions) -> GpxSummary {
    let thresholds = opts.moving_thresholds();
    let moving_data = gpx.moving_data_with(&thresholds);
    let (uphill, downhill) = gpx.uphill_downhill();

    let metadata = gpx.metadata.as_ref();
    let author = metadata.and_then(|m| m.author.as_ref());

    let tracks = if opts.include_tracks {
        gpx.tracks
            .iter()
            .map(|trk| {
                let (uphill, downhill) = trk.uphill_downhill();
                TrackSummary {
                    name: trk.name.clone(),
                    segment_count: trk.segments.len(),
                    point_count: trk.point_count(),
                    length_2d: trk.length_2d(),
                    length_3d: trk.length_3d(),
                    duration: trk.duration(),
                    moving_data: trk.moving_data_with(&thresholds),
                    uphill,
                    downhill,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    GpxSummary {
        creator: gpx.creator.clone(),
        name: metadata
            .and_then(|m| m.name.clone())
            .filter(|s| !s.is_empty()),
        description: metadata
            .and_then(|m| m.description.clone())
            .filter(|s| !s.is_empty()),
        author: author.and_then(|a| a.name.clone()),
        email: author.and_then(|a| a.email.clone()),
        waypoint_count: gpx.waypoints.len(),
        point_count: gpx.point_count(),
        length_2d: gpx.length_2d(),
        length_3d: gpx.length_3d(),
        duration: gpx.duration(),
        bounds: gpx.bounds(),
        time_bounds: gpx.time_bounds(),
        max_speed_kmh: moving_data.max_speed * 60.0 * 60.0 / 1000.0,
        moving_data,
        uphill,
        downhill,
        tracks,
    }
}

impl fmt::Display for GpxSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "GPX name: {name}")?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "GPX description: {description}")?;
        }
        if let Some(author) = &self.author {
            writeln!(f, "Author: {author}")?;
        }
        if let Some(email) = &self.email {
            writeln!(f, "Email: {email}")?;
        }
        writeln!(f, "Length 2D: {:.3} km", self.length_2d / 1000.0)?;
        writeln!(f, "Length 3D: {:.3} km", self.length_3d / 1000.0)?;
        if let Some(b) = &self.bounds {
            writeln!(
                f,
                "Bounds: lat {}..{}, lon {}..{}",
                b.min_lat, b.max_lat, b.min_lon, b.max_lon
            )?;
        }
        writeln!(f, "Moving time: {}s", self.moving_data.moving_time)?;
        writeln!(f, "Stopped time: {}s", self.moving_data.stopped_time)?;
        writeln!(
            f,
            "Max speed: {:.6}m/s = {:.6}km/h",
            self.moving_data.max_speed, self.max_speed_kmh
        )?;
        writeln!(f, "Total uphill: {}", self.uphill)?;
        writeln!(f, "Total downhill: {}", self.downhill)?;
        if let Some(tb) = &self.time_bounds {
            writeln!(f, "Started: {}", tb.start)?;
            writeln!(f, "Ended: {}", tb.end)?;
        }
        for trk in &self.tracks {
            writeln!(
                f,
                "Track '{}': {} segment(s), {} point(s), {:.3} km",
                trk.name,
                trk.segment_count,
                trk.point_count,
                trk.length_2d / 1000.0
            )?;
        }
        Ok(())
    }
}
