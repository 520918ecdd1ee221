use std::f64::consts::PI;

use chrono::{DateTime, Utc};

use crate::gpx_types::*;

/// Mean Earth radius in meters.
const EARTH_RADIUS: f64 = 6_371_000.0;
/// Meters per degree of latitude (1000 · 10000.8 / 90).
const ONE_DEGREE: f64 = 111_120.0;
/// Above this lat/lon delta (degrees) the flat approximation is dropped for haversine.
const FLAT_APPROXIMATION_LIMIT: f64 = 0.2;

/// Minimum moving-speed samples before a max speed is reported.
const MAX_SPEED_MIN_SAMPLES: usize = 20;
const MAX_SPEED_PERCENTILE: f64 = 0.95;
const MAX_SPEED_DEVIATION_FACTOR: f64 = 1.5;

/// Thresholds that split consecutive point pairs into moving and stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingThresholds {
    /// km/h; pairs at or below this speed are stopped.
    pub stopped_speed: f64,
    /// meters; shorter hops are GPS jitter.
    pub min_distance: f64,
    /// seconds; shorter gaps never count as moving.
    pub min_seconds: f64,
}

impl Default for MovingThresholds {
    fn default() -> Self {
        Self {
            stopped_speed: 1.0,
            min_distance: 0.01,
            min_seconds: 1.0,
        }
    }
}

fn to_rad(x: f64) -> f64 {
    x / 180.0 * PI
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = to_rad(lat1 - lat2);
    let d_lon = to_rad(lon1 - lon2);
    let lat1 = to_rad(lat1);
    let lat2 = to_rad(lat2);

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + (d_lon / 2.0).sin() * (d_lon / 2.0).sin() * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS * c
}

fn horizontal_distance(p1: &Waypoint, p2: &Waypoint) -> f64 {
    let abs_lat = (p1.lat - p2.lat).abs();
    let abs_lon = (p1.lon - p2.lon).abs();
    if abs_lat > FLAT_APPROXIMATION_LIMIT || abs_lon > FLAT_APPROXIMATION_LIMIT {
        return haversine_distance(p1.lat, p1.lon, p2.lat, p2.lon);
    }

    let coef = to_rad(p1.lat).cos();
    let x = p1.lat - p2.lat;
    let y = (p1.lon - p2.lon) * coef;
    (x * x + y * y).sqrt() * ONE_DEGREE
}

/// Flat approximation for short hops, haversine beyond; elevation is added in both cases.
fn distance(p1: &Waypoint, p2: &Waypoint, three_d: bool) -> f64 {
    let distance_2d = horizontal_distance(p1, p2);

    match (three_d, p1.ele, p2.ele) {
        (true, Some(ele1), Some(ele2)) if ele1 != ele2 => {
            let ele_diff = ele1 - ele2;
            (distance_2d * distance_2d + ele_diff * ele_diff).sqrt()
        }
        _ => distance_2d,
    }
}

/// Signed seconds from `from` to `to`, sub-second part included.
fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

impl Waypoint {
    /// Horizontal distance in meters.
    pub fn distance_2d(&self, other: &Waypoint) -> f64 {
        distance(self, other, false)
    }

    /// Distance in meters including the elevation delta, when both points have one.
    pub fn distance_3d(&self, other: &Waypoint) -> f64 {
        distance(self, other, true)
    }

    /// Absolute seconds between the two timestamps; 0 when either is missing.
    pub fn time_diff(&self, other: &Waypoint) -> f64 {
        match (self.time(), other.time()) {
            (Some(t1), Some(t2)) => seconds_between(t2, t1).abs(),
            _ => 0.0,
        }
    }

    /// Average speed in m/s between two points; 0 without a usable time gap.
    pub fn speed_to(&self, other: &Waypoint) -> f64 {
        let seconds = self.time_diff(other);
        if seconds == 0.0 {
            return 0.0;
        }
        self.distance_3d(other) / seconds
    }
}

fn length(points: &[Waypoint], three_d: bool) -> f64 {
    points
        .windows(2)
        .fold(0.0, |acc, pair| acc + distance(&pair[1], &pair[0], three_d))
}

/// Gain and loss over a smoothed elevation profile.
fn uphill_downhill(elevations: &[f64]) -> (f64, f64) {
    let len = elevations.len();
    let smoothed: Vec<f64> = (0..len)
        .map(|i| {
            if 0 < i && i < len - 1 {
                elevations[i - 1] * 0.3 + elevations[i] * 0.4 + elevations[i + 1] * 0.3
            } else {
                elevations[i]
            }
        })
        .collect();

    let mut uphill = 0.0;
    let mut downhill = 0.0;
    for pair in smoothed.windows(2) {
        let d = pair[1] - pair[0];
        if d > 0.0 {
            uphill += d;
        } else {
            downhill -= d;
        }
    }
    (uphill, downhill)
}

/// One moving pair: (speed in m/s, distance in m).
struct SpeedSample {
    speed: f64,
    distance: f64,
}

/// Robust maximum speed: outlier hops are dropped, then the 95th percentile is taken.
fn max_speed(samples: &[SpeedSample]) -> f64 {
    if samples.len() < MAX_SPEED_MIN_SAMPLES {
        return 0.0;
    }

    let count = samples.len() as f64;
    let average = samples.iter().fold(0.0, |acc, s| acc + s.distance) / count;
    let deviation = samples
        .iter()
        .fold(0.0, |acc, s| acc + (s.distance - average) * (s.distance - average))
        .sqrt();

    let mut speeds: Vec<f64> = samples
        .iter()
        .filter(|s| (s.distance - average).abs() <= deviation * MAX_SPEED_DEVIATION_FACTOR)
        .map(|s| s.speed)
        .collect();
    if speeds.is_empty() {
        return 0.0;
    }
    speeds.sort_by(f64::total_cmp);

    let idx = ((speeds.len() as f64 * MAX_SPEED_PERCENTILE) as usize).min(speeds.len() - 1);
    let max = speeds[idx];
    if max.is_nan() { 0.0 } else { max }
}

impl Segment {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn length_2d(&self) -> f64 {
        length(&self.points, false)
    }

    pub fn length_3d(&self) -> f64 {
        length(&self.points, true)
    }

    /// First and last timestamp by position; points without a time are skipped.
    pub fn time_bounds(&self) -> Option<TimeBounds> {
        let start = self.points.iter().find_map(Waypoint::time)?;
        let end = self.points.iter().rev().find_map(Waypoint::time)?;
        Some(TimeBounds { start, end })
    }

    /// Seconds from the first to the last timestamped point, never negative.
    pub fn duration(&self) -> f64 {
        match self.time_bounds() {
            Some(TimeBounds { start, end }) if end > start => seconds_between(start, end),
            _ => 0.0,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let (first, rest) = self.points.split_first()?;
        Some(
            rest.iter()
                .fold(Bounds::from_point(first), |b, pt| b.extend(Bounds::from_point(pt))),
        )
    }

    /// Speed in m/s at `index`, averaged over the hop from the previous point
    /// and the hop to the next one. Out-of-range indices clamp to the last point.
    pub fn speed(&self, index: usize) -> f64 {
        let len = self.points.len();
        if len < 2 {
            return 0.0;
        }
        let index = index.min(len - 1);
        let point = &self.points[index];

        let from_prev = (index > 0).then(|| point.speed_to(&self.points[index - 1]).abs());
        let to_next = (index < len - 1).then(|| point.speed_to(&self.points[index + 1]).abs());

        match (from_prev, to_next) {
            (Some(s1), Some(s2)) => (s1 + s2) / 2.0,
            (Some(s), None) | (None, Some(s)) => s,
            (None, None) => 0.0,
        }
    }

    /// Total (gain, loss) in meters. Points without elevation are left out.
    pub fn uphill_downhill(&self) -> (f64, f64) {
        let elevations: Vec<f64> = self.points.iter().filter_map(|pt| pt.ele).collect();
        uphill_downhill(&elevations)
    }

    pub fn moving_data(&self) -> MovingData {
        self.moving_data_with(&MovingThresholds::default())
    }

    pub fn moving_data_with(&self, thresholds: &MovingThresholds) -> MovingData {
        let mut data = MovingData::default();
        let mut samples = Vec::new();

        for pair in self.points.windows(2) {
            let (prev, pt) = (&pair[0], &pair[1]);
            let dist = pt.distance_3d(prev);
            let seconds = match (prev.time(), pt.time()) {
                (Some(t1), Some(t2)) => seconds_between(t1, t2).max(0.0),
                _ => 0.0,
            };

            let speed_kmh = if seconds > 0.0 {
                (dist / 1000.0) / (seconds / 3600.0)
            } else {
                0.0
            };

            let stopped = seconds < thresholds.min_seconds
                || dist < thresholds.min_distance
                || speed_kmh <= thresholds.stopped_speed;
            if stopped {
                data.stopped_time += seconds;
                data.stopped_distance += dist;
            } else {
                data.moving_time += seconds;
                data.moving_distance += dist;
                samples.push(SpeedSample {
                    speed: dist / seconds,
                    distance: dist,
                });
            }
        }

        data.max_speed = max_speed(&samples);
        data
    }

    /// Index of the first point recorded at or after `time`.
    pub fn location_at(&self, time: DateTime<Utc>) -> Option<usize> {
        self.points
            .iter()
            .position(|pt| pt.time().is_some_and(|t| t >= time))
    }
}

/// First start and last end among a sequence of optional time bounds.
fn merge_time_bounds(bounds: impl Iterator<Item = Option<TimeBounds>>) -> Option<TimeBounds> {
    bounds.flatten().fold(None, |acc, tb| match acc {
        None => Some(tb),
        Some(acc) => Some(TimeBounds {
            start: acc.start,
            end: tb.end,
        }),
    })
}

fn merge_bounds(bounds: impl Iterator<Item = Option<Bounds>>) -> Option<Bounds> {
    bounds
        .flatten()
        .reduce(|acc, b| acc.extend(b))
}

impl Track {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Segment::point_count).sum()
    }

    pub fn length_2d(&self) -> f64 {
        self.segments.iter().fold(0.0, |acc, s| acc + s.length_2d())
    }

    pub fn length_3d(&self) -> f64 {
        self.segments.iter().fold(0.0, |acc, s| acc + s.length_3d())
    }

    pub fn duration(&self) -> f64 {
        self.segments.iter().fold(0.0, |acc, s| acc + s.duration())
    }

    pub fn time_bounds(&self) -> Option<TimeBounds> {
        merge_time_bounds(self.segments.iter().map(Segment::time_bounds))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        merge_bounds(self.segments.iter().map(Segment::bounds))
    }

    pub fn uphill_downhill(&self) -> (f64, f64) {
        self.segments.iter().fold((0.0, 0.0), |(up, down), s| {
            let (u, d) = s.uphill_downhill();
            (up + u, down + d)
        })
    }

    pub fn moving_data(&self) -> MovingData {
        self.moving_data_with(&MovingThresholds::default())
    }

    pub fn moving_data_with(&self, thresholds: &MovingThresholds) -> MovingData {
        self.segments
            .iter()
            .fold(MovingData::default(), |acc, s| acc.accumulate(s.moving_data_with(thresholds)))
    }
}

impl Gpx {
    pub fn point_count(&self) -> usize {
        self.tracks.iter().map(Track::point_count).sum()
    }

    pub fn length_2d(&self) -> f64 {
        self.tracks.iter().fold(0.0, |acc, t| acc + t.length_2d())
    }

    pub fn length_3d(&self) -> f64 {
        self.tracks.iter().fold(0.0, |acc, t| acc + t.length_3d())
    }

    pub fn duration(&self) -> f64 {
        self.tracks.iter().fold(0.0, |acc, t| acc + t.duration())
    }

    pub fn time_bounds(&self) -> Option<TimeBounds> {
        merge_time_bounds(self.tracks.iter().map(Track::time_bounds))
    }

    /// Extent of the track points. Top-level waypoints are not part of it.
    pub fn bounds(&self) -> Option<Bounds> {
        merge_bounds(self.tracks.iter().map(Track::bounds))
    }

    pub fn uphill_downhill(&self) -> (f64, f64) {
        self.tracks.iter().fold((0.0, 0.0), |(up, down), t| {
            let (u, d) = t.uphill_downhill();
            (up + u, down + d)
        })
    }

    pub fn moving_data(&self) -> MovingData {
        self.moving_data_with(&MovingThresholds::default())
    }

    pub fn moving_data_with(&self, thresholds: &MovingThresholds) -> MovingData {
        self.tracks
            .iter()
            .fold(MovingData::default(), |acc, t| acc.accumulate(t.moving_data_with(thresholds)))
    }
}
