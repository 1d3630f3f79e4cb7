// Data of the per-section bar charts. Drawing them is left to the caller.

use log::debug;

use crate::bidi::rtl_embed_graphic;
use crate::config::{SurveyError, SurveySchema};
use crate::numeric::{cohort_mean_key, mean_key, std_key};
use crate::values::{PlaceholderMap, PlaceholderValue};

/// One chart: the subject mean (with its std as error bar) next to the cohort mean,
/// for every question of a numeric section.
#[derive(PartialEq, Debug, Clone)]
pub struct SectionChart {
    pub key: String,
    pub title: String,
    pub y_label: String,
    pub subject_series: String,
    pub cohort_series: String,
    /// The x axis spans `0..axis_width - 1` whatever the number of questions.
    pub axis_width: usize,
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    /// Absent when there were too few answers.
    pub subject_means: Vec<Option<f64>>,
    pub subject_stds: Vec<Option<f64>>,
    pub cohort_means: Vec<Option<f64>>,
}

pub fn chart_key(prefix: &str) -> String {
    format!("chart_{}", prefix)
}

/// Bar positions for `count` questions on an axis of `width` slots.
///
/// A section with fewer questions than the widest one keeps its bars around the centre
/// of the axis, so that every chart of a report has the same scale.
pub fn centered_positions(count: usize, width: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count >= width {
        return (0..count).map(|i| i as f64).collect();
    }
    let right = (width - 1) as f64;
    let center = right / 2.0;
    match count {
        1 => vec![center],
        2 => vec![center - 0.5, center + 0.5],
        _ => {
            let step = right / (count - 1) as f64;
            (0..count).map(|i| i as f64 * step).collect()
        }
    }
}

fn lookup<'a>(values: &'a PlaceholderMap, key: &str) -> Result<&'a PlaceholderValue, SurveyError> {
    values
        .get(key)
        .ok_or_else(|| SurveyError::UnknownPlaceholder {
            key: key.to_string(),
        })
}

pub fn section_chart(
    schema: &SurveySchema,
    label: &str,
    values: &PlaceholderMap,
) -> Result<SectionChart, SurveyError> {
    let section = schema.section(label)?;
    let punctuation = &schema.rules.punctuation;
    let graphic = |s: &str| rtl_embed_graphic(s, punctuation);

    let count = section.questions.len();
    let mut chart = SectionChart {
        key: chart_key(&section.prefix),
        title: graphic(&section.label),
        y_label: graphic(&schema.chart_labels.y_axis),
        subject_series: graphic(&schema.chart_labels.subject_series),
        cohort_series: graphic(&schema.chart_labels.cohort_series),
        axis_width: schema.max_questions_per_section(),
        positions: centered_positions(count, schema.max_questions_per_section()),
        labels: Vec::with_capacity(count),
        subject_means: Vec::with_capacity(count),
        subject_stds: Vec::with_capacity(count),
        cohort_means: Vec::with_capacity(count),
    };
    for (idx, question) in section.questions.iter().enumerate() {
        let idx = idx + 1;
        chart.labels.push(graphic(question.display_label()));
        chart
            .subject_means
            .push(lookup(values, &mean_key(&section.prefix, idx))?.as_number());
        chart
            .subject_stds
            .push(lookup(values, &std_key(&section.prefix, idx))?.as_number());
        chart
            .cohort_means
            .push(lookup(values, &cohort_mean_key(&section.prefix, idx))?.as_number());
    }
    debug!(
        "section_chart: {:?}: positions {:?}, means {:?}",
        section.label, chart.positions, chart.subject_means
    );
    Ok(chart)
}

/// The charts of all the sections, in schema order.
pub fn section_charts(schema: &SurveySchema, values: &PlaceholderMap) -> Result<Vec<SectionChart>, SurveyError> {
    schema
        .numeric_sections
        .iter()
        .map(|s| section_chart(schema, &s.label, values))
        .collect()
}
