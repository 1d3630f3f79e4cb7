use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::path::Path;

use survey_stats::charts::SectionChart;

use crate::report::io_common::write_bytes;
use crate::report::{ParsingJsonSnafu, ReportResult};

fn chart_to_json(chart: &SectionChart) -> JSValue {
    json!({
        "key": chart.key,
        "title": chart.title,
        "yLabel": chart.y_label,
        "axisWidth": chart.axis_width,
        "positions": chart.positions,
        "labels": chart.labels,
        "series": [
            {
                "name": chart.subject_series,
                "means": chart.subject_means,
                "stds": chart.subject_stds,
            },
            {
                "name": chart.cohort_series,
                "means": chart.cohort_means,
            },
        ],
    })
}

/// Writes the chart data of a subject. Missing means are written as `null`.
pub fn write_charts(path: &Path, charts: &[SectionChart]) -> ReportResult<()> {
    let js = JSValue::Array(charts.iter().map(chart_to_json).collect());
    let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    write_bytes(path, pretty.as_bytes())
}
