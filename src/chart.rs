//! Plotly-shaped chart description handed to the renderer.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "data")]
    pub series: Vec<Trace>,
    pub layout: Layout,
    pub config: Config,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Chart(ChartSpec),
    /// No table was supplied; only a message is shown and no chart is drawn.
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendgroup: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverlabel: Option<HoverLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Trace {
    pub fn new(mode: Mode, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: None,
            legendgroup: None,
            x,
            y,
            mode,
            marker: None,
            line: None,
            hoverinfo: None,
            hovertemplate: None,
            hoverlabel: None,
            showlegend: None,
        }
    }

    /// Names the trace and joins it to the category's legend group.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self.legendgroup = Some(name.to_string());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    pub fn skip_hover(mut self) -> Self {
        self.hoverinfo = Some("skip".to_string());
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.showlegend = Some(false);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

impl Marker {
    pub fn solid(color: &str, size: f64) -> Self {
        Self {
            color: color.to_string(),
            size: Some(size),
            symbol: None,
            line: None,
        }
    }

    pub fn transparent() -> Self {
        Self {
            color: TRANSPARENT.to_string(),
            size: None,
            symbol: None,
            line: None,
        }
    }
}

pub const TRANSPARENT: &str = "rgba(0,0,0,0.0)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Line {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: Some("dash".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub bgcolor: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Font {
    pub fn sized(size: f64) -> Self {
        Self { size, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub legend: Legend,
    pub annotations: Vec<Annotation>,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fixedrange: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tickvals: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticktext: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
    pub x: f64,
    pub xanchor: String,
    pub y: f64,
    pub yanchor: String,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            orientation: "h".to_string(),
            x: 0.5,
            xanchor: "center".to_string(),
            y: 1.1,
            yanchor: "top".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub font: Font,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub xanchor: String,
    pub yanchor: String,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textangle: Option<f64>,
}

impl Annotation {
    /// Text placed in data coordinates.
    pub fn at(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            font: Font::sized(13.0),
            xref: "x".to_string(),
            yref: "y".to_string(),
            x,
            y,
            xanchor: "left".to_string(),
            yanchor: "middle".to_string(),
            showarrow: false,
            textangle: None,
        }
    }

    /// Text placed relative to the plot area, `(0.5, 0.5)` being its center.
    pub fn on_paper(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            xanchor: "center".to_string(),
            ..Self::at(text, x, y)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub xref: String,
    pub yref: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub line: Line,
}

impl Shape {
    pub fn vertical(x: f64, y0: f64, y1: f64, line: Line) -> Self {
        Self {
            kind: "line".to_string(),
            xref: "x".to_string(),
            yref: "y".to_string(),
            x0: x,
            y0,
            x1: x,
            y1,
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub display_mode_bar: bool,
    pub responsive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_mode_bar: false,
            responsive: true,
        }
    }
}
