use serde::Deserialize;

use crate::geometry::MovingThresholds;

/// Options for computing a GPX summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Speed in km/h at or below which a hop counts as stopped (default: 1.0)
    #[serde(default = "default_stopped_speed_threshold")]
    pub stopped_speed_threshold: f64,

    /// Hops shorter than this many meters are always stopped (default: 0.01)
    #[serde(default = "default_min_moving_distance")]
    pub min_moving_distance: f64,

    /// Hops shorter than this many seconds are always stopped (default: 1.0)
    #[serde(default = "default_min_moving_seconds")]
    pub min_moving_seconds: f64,

    /// Include a per-track breakdown in the summary (default: true)
    #[serde(default = "default_true")]
    pub include_tracks: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            stopped_speed_threshold: default_stopped_speed_threshold(),
            min_moving_distance: default_min_moving_distance(),
            min_moving_seconds: default_min_moving_seconds(),
            include_tracks: true,
        }
    }
}

impl AnalysisOptions {
    pub fn moving_thresholds(&self) -> MovingThresholds {
        MovingThresholds {
            stopped_speed: self.stopped_speed_threshold,
            min_distance: self.min_moving_distance,
            min_seconds: self.min_moving_seconds,
        }
    }
}

fn default_stopped_speed_threshold() -> f64 {
    MovingThresholds::default().stopped_speed
}

fn default_min_moving_distance() -> f64 {
    MovingThresholds::default().min_distance
}

fn default_min_moving_seconds() -> f64 {
    MovingThresholds::default().min_seconds
}

fn default_true() -> bool {
    true
}
