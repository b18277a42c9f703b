//! Launcher configuration: DOM ids and the tunable sizes/intensities of the
//! splat. Timings are fixed (see `launcher::timeline`) and not configurable.

#[cfg(feature = "serde_json")]
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LauncherConfig {
    /// Overlay layer id; created on demand if the page doesn't have one.
    pub overlay_id: String,
    /// Render surface whose native pixel space `launch` coordinates are in.
    pub world_canvas_id: String,
    /// Element that gets shaken on impact (falls back to `<body>`).
    pub root_id: String,
    /// Base width of the figure sprites in px (before scaling).
    pub figure_size: f64,
    pub fly_start_scale: f64,
    pub fly_end_scale: f64,
    pub impact_intensity: f64,
    pub shake_intensity: f64,
    /// Horizontal offsets of the drool trails from the splat centre (px).
    pub drool_offsets: [f64; 3],
    /// Drool target height as a fraction of the viewport height.
    pub drool_height_ratio: f64,
    /// How far the splat slides, as a fraction of the viewport height.
    pub slide_ratio: f64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            overlay_id: "kid-launch-overlay".to_string(),
            world_canvas_id: "world".to_string(),
            root_id: "game-container".to_string(),
            figure_size: 160.0,
            fly_start_scale: 0.3,
            fly_end_scale: 1.8,
            impact_intensity: 1.0,
            shake_intensity: 15.0,
            drool_offsets: [-40.0, 0.0, 40.0],
            drool_height_ratio: 0.25,
            slide_ratio: 0.35,
        }
    }
}

#[cfg(feature = "serde_json")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid launcher config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "serde_json")]
impl LauncherConfig {
    /// Parses a (possibly partial) JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LauncherConfig::default();
        assert_eq!(cfg.world_canvas_id, "world");
        assert_eq!(cfg.drool_offsets.len(), 3);
        assert!(cfg.fly_end_scale > cfg.fly_start_scale);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = LauncherConfig::from_json(r#"{"shake_intensity": 4.0, "root_id": "app"}"#).unwrap();
        assert_eq!(cfg.shake_intensity, 4.0);
        assert_eq!(cfg.root_id, "app");
        assert_eq!(cfg.overlay_id, LauncherConfig::default().overlay_id);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_bad_json_is_an_error() {
        assert!(LauncherConfig::from_json("{").is_err());
    }
}
