//! Chart output for aggregated CLIM series.
//!
//! The aggregation result and its configuration labels are serialized to a
//! JSON payload. `render_html` embeds that payload and the D3.js line chart
//! script into a standalone page.

use clim_data::{AnalysisConfig, ResultPoint};
use serde::Serialize;
use std::fmt;

static LINE_CHART_JS: &str = include_str!("../assets/line-chart.js");

/// D3 v7 loaded from the public CDN by generated pages.
pub const D3_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/d3@7";

/// Chart container element ID in generated pages.
pub const CHART_ID: &str = "clim-chart";

pub const EMPTY_MESSAGE: &str = "No data for the selected range";

#[derive(Debug)]
pub enum ChartError {
    Serialize(serde_json::Error),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Serialize(err) => write!(f, "failed to serialize chart data: {}", err),
        }
    }
}

impl std::error::Error for ChartError {}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::Serialize(err)
    }
}

/// Display settings passed to `renderLineChart`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// "Analysis: .., Period: .., Calculation: .." line shown in tooltips.
    pub tooltip_context: String,
    pub decimals: usize,
    pub empty_message: String,
}

/// A renderable series: data points plus the labels describing them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub config: ChartConfig,
    pub data: Vec<ResultPoint>,
}

impl ChartSeries {
    /// Build the chart payload for `points` using the labels of `config`.
    pub fn new(points: Vec<ResultPoint>, config: &AnalysisConfig) -> Self {
        let field = config.analysis_field.label();
        let calculation = config.calculation_type;
        let period = match config.resolved_sub_period() {
            Ok(Some(sub_period)) => format!("{} ({})", config.period_type, sub_period.label()),
            _ => config.period_type.to_string(),
        };
        let y_label = if calculation.is_count() {
            format!("{} days ({} {})", field, calculation, config.threshold)
        } else {
            format!("{} average", field)
        };
        let decimals = if calculation.is_count() {
            0
        } else {
            clim_utils::format::AVERAGE_DECIMALS
        };
        ChartSeries {
            config: ChartConfig {
                title: format!(
                    "{} {} by {}, {}-{}",
                    field,
                    calculation,
                    period,
                    config.year_range.start,
                    config.year_range.end
                ),
                x_label: "Year".to_string(),
                y_label,
                tooltip_context: format!(
                    "Analysis: {}, Period: {}, Calculation: {}",
                    field, period, calculation
                ),
                decimals,
                empty_message: EMPTY_MESSAGE.to_string(),
            },
            data: points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_json(&self) -> Result<String, ChartError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// JSON embedded in a `<script>` block must not close it early.
fn script_safe_json<T: Serialize>(value: &T) -> Result<String, ChartError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Render a standalone HTML page drawing `series` with D3.js.
pub fn render_html(series: &ChartSeries) -> Result<String, ChartError> {
    let data_json = script_safe_json(&series.data)?;
    let config_json = script_safe_json(&series.config)?;
    if series.is_empty() {
        log::warn!("chart: rendering empty series \"{}\"", series.config.title);
    }
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{d3}"></script>
</head>
<body>
<div id="{id}" style="position: relative;"></div>
<script>
{script}
renderLineChart('{id}', {data}, {config});
</script>
</body>
</html>
"#,
        title = escape_html(&series.config.title),
        d3 = D3_CDN_URL,
        id = CHART_ID,
        script = LINE_CHART_JS,
        data = data_json,
        config = config_json,
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
