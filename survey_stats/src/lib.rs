/*!
Statistics and document substitution for per-subject survey feedback reports.

A survey table (one row per respondent) is grouped by subject. For every subject, the
numeric and multiple-choice answers are summarized and compared with the whole cohort,
the free-text answers are collected as bullet points, and everything ends up in a map
of placeholder values. That map fills the `{{name}}` tokens of a report template
without changing its formatting runs.

This crate does no I/O. Reading the survey, loading and saving documents, drawing
charts and writing spreadsheets are done by the caller with the types of [document],
[charts] and [export].

See the [manual] for the configuration of a survey form.
*/

mod config;
pub use crate::config::*;

pub mod bidi;
pub mod categorical;
pub mod charts;
pub mod document;
pub mod export;
pub mod manual;
pub mod numeric;
pub mod report;
pub mod substitute;
pub mod table;
pub mod values;

pub use crate::report::{
    build_subject_report, check_resolved, cohort_stats, merge, placeholder_names, prepare_table,
    unresolved_placeholders, SubjectReport,
};
pub use crate::table::{CellValue, SurveyTable};
pub use crate::values::{PlaceholderMap, PlaceholderValue};
