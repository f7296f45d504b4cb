use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::{ChartError, Result};

pub const DEFAULT_SLOT_WIDTH: f64 = 50.0;
pub const DEFAULT_HOVER_STEPS: usize = 100;
pub const DEFAULT_POINT_LABEL_ANGLE: f64 = -45.0;
pub const NEUTRAL_COLOR: &str = "#9e9e9e";

/// Usage category to line color.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Palette {
    colors: BTreeMap<String, String>,
    #[serde(default = "default_neutral")]
    neutral: String,
}

fn default_neutral() -> String {
    NEUTRAL_COLOR.to_string()
}

impl Default for Palette {
    fn default() -> Self {
        let colors = [
            ("Expected", "#04BF8A"),
            ("Actual", "#2176ff"),
            ("High", "#04BF8A"),
            ("Low", "#2176ff"),
        ]
        .into_iter()
        .map(|(category, color)| (category.to_string(), color.to_string()))
        .collect();

        Self {
            colors,
            neutral: default_neutral(),
        }
    }
}

impl Palette {
    #[cfg(test)]
    pub fn new(colors: BTreeMap<String, String>, neutral: impl Into<String>) -> Self {
        Self {
            colors,
            neutral: neutral.into(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read palette {}", path.display()))?;
        let palette: Palette = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse palette {}", path.display()))?;
        Ok(palette)
    }

    pub fn color_for(&self, category: &str) -> Option<&str> {
        self.colors.get(category).map(String::as_str)
    }

    pub fn neutral(&self) -> &str {
        &self.neutral
    }

    pub fn validate(&self) -> Result<()> {
        if self.colors.is_empty() {
            return Err(ChartError::InvalidPalette(
                "at least one category color is required".to_string(),
            ));
        }

        if !is_color_literal(&self.neutral) {
            return Err(ChartError::InvalidPalette(format!(
                "neutral color `{}` is not a color literal",
                self.neutral
            )));
        }

        for (category, color) in &self.colors {
            if category.trim().is_empty() {
                return Err(ChartError::InvalidPalette(
                    "category keys must not be blank".to_string(),
                ));
            }
            if !is_color_literal(color) {
                return Err(ChartError::InvalidPalette(format!(
                    "color `{color}` for `{category}` is not a color literal"
                )));
            }
        }

        Ok(())
    }
}

fn is_color_literal(value: &str) -> bool {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    ["rgb(", "rgba("]
        .iter()
        .any(|prefix| value.starts_with(prefix) && value.ends_with(')'))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub title: String,
    pub slot_width: f64,
    pub hover_steps: usize,
    pub include_deltas: bool,
    pub point_labels: bool,
    pub point_label_angle: f64,
    /// Unknown categories are an error instead of falling back to the neutral color.
    pub strict_colors: bool,
    pub palette: Palette,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "Overall Growth".to_string(),
            slot_width: DEFAULT_SLOT_WIDTH,
            hover_steps: DEFAULT_HOVER_STEPS,
            include_deltas: true,
            point_labels: false,
            point_label_angle: DEFAULT_POINT_LABEL_ANGLE,
            strict_colors: cfg!(debug_assertions),
            palette: Palette::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.slot_width.is_finite() || self.slot_width <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "slot width must be positive, got {}",
                self.slot_width
            )));
        }
        if self.hover_steps == 0 {
            return Err(ChartError::InvalidConfig(
                "hover steps must be at least 1".to_string(),
            ));
        }
        self.palette.validate()
    }
}
