// Dashboard domain model
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub tabs: Vec<Tab>,
}

impl Dashboard {
    pub fn new(title: String, tabs: Vec<Tab>) -> Self {
        Self { title, tabs }
    }

    pub fn widget_count(&self) -> usize {
        self.tabs
            .iter()
            .map(|t| t.metrics.len() + t.charts.len())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub metrics: Vec<Metric>,
    pub charts: Vec<Chart>,
}

impl Tab {
    pub fn new(id: &str, title: &str, metrics: Vec<Metric>, charts: Vec<Chart>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            metrics,
            charts,
        }
    }
}

/// Headline number, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Map,
    Line,
    Bar,
    HorizontalBar,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub value_title: Option<String>,
    pub body: ChartBody,
}

impl Chart {
    pub fn new(id: &str, title: String, value_title: Option<&str>, body: ChartBody) -> Self {
        Self {
            id: id.to_string(),
            title,
            value_title: value_title.map(str::to_string),
            body,
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self.body {
            ChartBody::Map { .. } => ChartKind::Map,
            ChartBody::Line { .. } => ChartKind::Line,
            ChartBody::Bar { .. } => ChartKind::Bar,
            ChartBody::HorizontalBar { .. } => ChartKind::HorizontalBar,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    /// Scatter of sized markers over South America.
    Map { points: Vec<MapPoint> },
    /// One series per year, x axis is the month name.
    Line { series: Vec<LineSeries>, y_max: f64 },
    Bar { bars: Vec<Bar> },
    HorizontalBar { bars: Vec<Bar> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}
