//! Chart rendering collaborator.
//!
//! [`PlotlyHtmlRenderer`] writes a standalone HTML page holding one Plotly
//! line trace of the closes. The page loads plotly.js from its CDN, so
//! opening it needs network access but no local install.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use price_ingestor::models::price_point::PricePoint;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::errors::ChartError;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Draws a line chart of closing prices.
pub trait ChartRenderer {
    fn render(&self, title: &str, points: &[PricePoint]) -> Result<(), ChartError>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for Box<T> {
    fn render(&self, title: &str, points: &[PricePoint]) -> Result<(), ChartError> {
        (**self).render(title, points)
    }
}

/// Where a chart for this request lands by default:
/// `<dir>/<TICKER>_<start>_<end>.html`.
pub fn default_chart_path(dir: &Path, ticker: &str, start: NaiveDate, end: NaiveDate) -> PathBuf {
    dir.join(format!("{ticker}_{start}_{end}.html"))
}

/// Plotly figure with one `lines` trace named `close`, dates ascending.
pub fn plotly_figure(title: &str, points: &[PricePoint]) -> Value {
    let mut sorted: Vec<&PricePoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.date);

    let x: Vec<String> = sorted.iter().map(|p| p.date.to_string()).collect();
    let y: Vec<Option<f64>> = sorted.iter().map(|p| p.close.to_f64()).collect();

    json!({
        "data": [{
            "type": "scatter",
            "mode": "lines",
            "name": "close",
            "x": x,
            "y": y,
        }],
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "date" } },
            "yaxis": { "title": { "text": "close" } },
        },
    })
}

/// Writes the chart as an HTML page to a fixed path.
#[derive(Debug, Clone)]
pub struct PlotlyHtmlRenderer {
    path: PathBuf,
}

impl PlotlyHtmlRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page(title: &str, figure: &Value) -> Result<String, ChartError> {
        // Keep the embedded JSON from closing the script element early.
        let figure = serde_json::to_string(figure)?.replace("</", "<\\/");
        let title = html_escape(title);
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("chart", figure.data, figure.layout);
</script>
</body>
</html>
"#
        ))
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl ChartRenderer for PlotlyHtmlRenderer {
    fn render(&self, title: &str, points: &[PricePoint]) -> Result<(), ChartError> {
        debug!(points = points.len(), "data to display");
        let page = Self::page(title, &plotly_figure(title, points))?;

        let write_err = |source| ChartError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        fs::write(&self.path, page).map_err(write_err)?;

        info!(path = %self.path.display(), "chart written");
        Ok(())
    }
}
