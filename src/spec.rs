use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven chart shapes the renderer can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Histogram,
    StackedBar,
}

impl ChartType {
    pub const ALL: [ChartType; 7] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Area,
        ChartType::Histogram,
        ChartType::StackedBar,
    ];

    /// Tag used in chart JSON and artifact file names.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Area => "area",
            ChartType::Histogram => "histogram",
            ChartType::StackedBar => "stacked_bar",
        }
    }

    /// Exact-tag lookup. Unknown tags yield None; the repair stage maps
    /// those to Bar.
    pub fn parse(tag: &str) -> Option<Self> {
        ChartType::ALL.iter().copied().find(|t| t.as_str() == tag)
    }

    /// Name used in generated descriptions.
    pub fn display_name(self) -> &'static str {
        match self {
            ChartType::Bar => "bar chart",
            ChartType::Line => "line chart",
            ChartType::Pie => "pie chart",
            ChartType::Scatter => "scatter plot",
            ChartType::Area => "area chart",
            ChartType::Histogram => "histogram",
            ChartType::StackedBar => "stacked bar chart",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named series. Cells are number-or-null; a null draws nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Vec<Option<f64>>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    /// Series with every cell present.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Self {
        Self::new(label, values.iter().copied().map(Some).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AxisBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Scales {
    #[serde(default)]
    pub y: Option<AxisBounds>,
}

/// Trend overlay request. The drawing pass treats every entry as a
/// two-point linear fit regardless of `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    #[serde(default = "default_trend_kind", rename = "type")]
    pub kind: String,
    #[serde(default = "default_trend_label")]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_trend_kind() -> String {
    "linear".to_string()
}

fn default_trend_label() -> String {
    "Trend".to_string()
}

impl Default for TrendLine {
    fn default() -> Self {
        Self {
            kind: default_trend_kind(),
            label: default_trend_label(),
            color: None,
        }
    }
}

/// Callout pinned to a category label. Skipped when `x` matches no label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub x: String,
    pub y: f64,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartOptions {
    #[serde(default)]
    pub scales: Scales,
    #[serde(default, rename = "trendLines")]
    pub trend_lines: Vec<TrendLine>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Fully-repaired chart description. Everything the drawing pass reads is
/// present; `style` and `figsize` stay optional layout hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default, rename = "type")]
    pub chart_type: ChartType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: ChartData,
    #[serde(default)]
    pub options: ChartOptions,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub figsize: Option<(f64, f64)>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Bar,
            title: "Data Chart".to_string(),
            description: String::new(),
            data: ChartData::default(),
            options: ChartOptions::default(),
            style: None,
            figsize: None,
        }
    }
}

impl ChartSpec {
    /// Y clamp from the options tree; applied only when both ends are given.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let y = self.options.scales.y?;
        match (y.min, y.max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}
