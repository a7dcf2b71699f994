//! Editor configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid config.

use mm_core::layout::LayoutConfig;
use mm_render::NodeMetrics;
use serde::{Deserialize, Serialize};

/// Zoom limits and gesture sensitivities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale change per wheel delta unit while ⌘/Ctrl is held.
    pub wheel_zoom_sensitivity: f64,
    /// 1.0 follows the fingers exactly; lower values damp pinch zoom.
    pub pinch_sensitivity: f64,
    /// Factor used by the zoom-in / zoom-out commands.
    pub zoom_step: f64,
}

impl InteractionConfig {
    /// Usable `(min, max)` zoom limits.
    ///
    /// An inverted pair is swapped; a non-finite or non-positive bound falls
    /// back to its default.
    pub fn scale_range(&self) -> (f64, f64) {
        let defaults = Self::default();
        let usable = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let lo = usable(self.min_scale, defaults.min_scale);
        let hi = usable(self.max_scale, defaults.max_scale);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }

    fn check(&self) -> Result<(), String> {
        let (min, max) = (self.min_scale, self.max_scale);
        if !(min.is_finite() && max.is_finite() && min > 0.0) {
            return Err(format!("zoom limits must be finite and positive, got {min}..{max}"));
        }
        if min > max {
            return Err(format!("min_scale {min} exceeds max_scale {max}"));
        }
        Ok(())
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 3.0,
            wheel_zoom_sensitivity: 0.002,
            pinch_sensitivity: 1.0,
            zoom_step: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
    pub metrics: NodeMetrics,
    /// Maximum number of undo steps kept.
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
            metrics: NodeMetrics::default(),
            history_depth: 200,
        }
    }
}

impl EditorConfig {
    /// Parse a config, rejecting zoom limits no viewport can honor.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        config
            .interaction
            .check()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Plain structs of numbers always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
