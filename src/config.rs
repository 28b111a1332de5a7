//! Injected configuration for the route core.
//!
//! Everything a screen used to read from module-level constants (viewport
//! padding, the default region, route and marker colors, resolver policy)
//! lives here and is passed in explicitly. Mobile code hands the whole thing
//! across as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::resolver::{ResolverConfig, RouteLeg};
use crate::viewport::ViewportConfig;

/// How a route polyline should be stroked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Stroke {
    /// CSS-style color, e.g. "#1E88E5"
    pub color: String,
    pub width: u32,
    pub dashed: bool,
}

/// Route and marker palette.
///
/// Fallback legs always get their own stroke so a straight-line estimate is
/// never drawn as if it were a road route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct MapStyle {
    pub route_color: String,
    pub fallback_color: String,
    pub fallback_dashed: bool,
    pub stroke_width: u32,
    /// Marker colors, cycled by stop order
    pub marker_colors: Vec<String>,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            route_color: "#1E88E5".to_string(),
            fallback_color: "#9E9E9E".to_string(),
            fallback_dashed: true,
            stroke_width: 4,
            marker_colors: vec![
                "#E53935".to_string(),
                "#FB8C00".to_string(),
                "#FDD835".to_string(),
                "#43A047".to_string(),
                "#8E24AA".to_string(),
            ],
        }
    }
}

impl MapStyle {
    /// Stroke for a resolved leg.
    pub fn stroke_for(&self, leg: &RouteLeg) -> Stroke {
        if leg.is_fallback {
            Stroke {
                color: self.fallback_color.clone(),
                width: self.stroke_width,
                dashed: self.fallback_dashed,
            }
        } else {
            Stroke {
                color: self.route_color.clone(),
                width: self.stroke_width,
                dashed: false,
            }
        }
    }

    /// Marker color for a 1-based stop order, cycling through the palette.
    pub fn marker_color(&self, order: u32) -> Option<&str> {
        if self.marker_colors.is_empty() {
            return None;
        }
        let index = order.saturating_sub(1) as usize % self.marker_colors.len();
        Some(self.marker_colors[index].as_str())
    }
}

/// Complete configuration for one consumer of the route core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct RouteCoreConfig {
    pub viewport: ViewportConfig,
    pub resolver: ResolverConfig,
    pub style: MapStyle,
}

impl RouteCoreConfig {
    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| RouteError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RouteError::Config {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.viewport.validate()?;
        self.resolver.validate()?;
        if self.style.stroke_width == 0 {
            return Err(RouteError::Config {
                message: "stroke_width must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
