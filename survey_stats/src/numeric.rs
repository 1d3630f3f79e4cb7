// Mean and standard deviation of numeric answers.

use log::debug;

use crate::config::{NumericSection, RatingQuestion, StatsRules, SurveyError};
use crate::table::Group;
use crate::values::{round_to, PlaceholderMap, PlaceholderValue, DEFAULT_ZERO_VALUE};

/// Which population a statistic is computed for.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Scope {
    /// The answers about one subject: mean and std, subject to the minimum sample.
    Subject,
    /// All the answers: mean only, no minimum sample.
    Cohort,
}

/// The statistics of one numeric column over one group.
///
/// When there are fewer valid answers than the minimum sample, `mean` and `std` both
/// hold the "too few answers" text.
#[derive(PartialEq, Debug, Clone)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: PlaceholderValue,
    pub std: PlaceholderValue,
}

/// The valid numeric answers of a column for a group.
///
/// Answers equal to `ignored` are dropped, then blank and unparseable cells.
pub fn valid_values(group: &Group, column: &str, ignored: Option<f64>) -> Result<Vec<f64>, SurveyError> {
    let mut values: Vec<f64> = Vec::new();
    let mut unparsed = 0usize;
    for cell in group.column(column)? {
        match cell.as_number() {
            Some(x) if Some(x) == ignored => {}
            Some(x) => values.push(x),
            None if cell.is_blank() => {}
            None => unparsed += 1,
        }
    }
    if unparsed > 0 {
        debug!(
            "valid_values: column {:?}, subject {:?}: {} unparseable cells treated as missing",
            column,
            group.key(),
            unparsed
        );
    }
    Ok(values)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return DEFAULT_ZERO_VALUE;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (denominator `n - 1`). Undefined results are zero.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return DEFAULT_ZERO_VALUE;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    let std = (ss / (values.len() - 1) as f64).sqrt();
    if std.is_nan() {
        DEFAULT_ZERO_VALUE
    } else {
        std
    }
}

pub fn summarize(
    group: &Group,
    column: &str,
    ignored: Option<f64>,
    rules: &StatsRules,
) -> Result<NumericSummary, SurveyError> {
    let values = valid_values(group, column, ignored)?;
    let count = values.len();
    if count < rules.min_sample {
        debug!(
            "summarize: column {:?}, subject {:?}: {} valid answers, {} required",
            column,
            group.key(),
            count,
            rules.min_sample
        );
        let too_few = PlaceholderValue::Text(rules.too_few_answers_text.clone());
        return Ok(NumericSummary {
            count,
            mean: too_few.clone(),
            std: too_few,
        });
    }
    Ok(NumericSummary {
        count,
        mean: PlaceholderValue::Number(round_to(mean(&values), rules.decimals)),
        std: PlaceholderValue::Number(round_to(sample_std(&values), rules.decimals)),
    })
}

/// The mean over the whole cohort. No minimum sample; no answers gives zero.
pub fn cohort_mean(
    group: &Group,
    column: &str,
    ignored: Option<f64>,
    rules: &StatsRules,
) -> Result<f64, SurveyError> {
    let values = valid_values(group, column, ignored)?;
    Ok(round_to(mean(&values), rules.decimals))
}

pub fn mean_key(prefix: &str, idx: usize) -> String {
    format!("mean_{}_{}", prefix, idx)
}

pub fn std_key(prefix: &str, idx: usize) -> String {
    format!("std_{}_{}", prefix, idx)
}

pub fn cohort_mean_key(prefix: &str, idx: usize) -> String {
    format!("cohort_mean_{}_{}", prefix, idx)
}

pub const AVERAGE_GENERAL: &str = "average_general";
pub const STD_GENERAL: &str = "std_general";
pub const TOTAL_GENERAL: &str = "total_general";

/// The placeholders of every question of a section. Questions are numbered from 1.
pub fn section_stats(
    group: &Group,
    section: &NumericSection,
    scope: Scope,
    rules: &StatsRules,
) -> Result<PlaceholderMap, SurveyError> {
    let mut res = PlaceholderMap::new();
    for (idx, question) in section.questions.iter().enumerate() {
        let idx = idx + 1;
        match scope {
            Scope::Subject => {
                let summary = summarize(group, &question.column, section.ignored_value, rules)?;
                res.insert(mean_key(&section.prefix, idx), summary.mean);
                res.insert(std_key(&section.prefix, idx), summary.std);
            }
            Scope::Cohort => {
                let m = cohort_mean(group, &question.column, section.ignored_value, rules)?;
                res.insert(
                    cohort_mean_key(&section.prefix, idx),
                    PlaceholderValue::Number(m),
                );
            }
        }
    }
    Ok(res)
}

/// The placeholders of the general rating question.
pub fn general_stats(
    group: &Group,
    rating: &RatingQuestion,
    scope: Scope,
    rules: &StatsRules,
) -> Result<PlaceholderMap, SurveyError> {
    let mut res = PlaceholderMap::new();
    match scope {
        Scope::Subject => {
            let summary = summarize(group, &rating.column, rating.ignored_value, rules)?;
            res.insert(AVERAGE_GENERAL.to_string(), summary.mean);
            res.insert(STD_GENERAL.to_string(), summary.std);
        }
        Scope::Cohort => {
            let m = cohort_mean(group, &rating.column, rating.ignored_value, rules)?;
            res.insert(TOTAL_GENERAL.to_string(), PlaceholderValue::Number(m));
        }
    }
    Ok(res)
}
