// Layout of the per-subject spreadsheet export. Writing the file is left to the caller.

use crate::categorical::{percent_key, total_key};
use crate::config::{SurveyError, SurveySchema};
use crate::numeric::{cohort_mean_key, mean_key, std_key, AVERAGE_GENERAL, STD_GENERAL, TOTAL_GENERAL};
use crate::report::SubjectReport;
use crate::values::PlaceholderValue;

pub const QUANTITATIVE_SHEET: &str = "Quantitative";
pub const TEXTUAL_SHEET: &str = "Textual";

#[derive(PartialEq, Debug, Clone)]
pub enum ExportCell {
    Empty,
    Text(String),
    Number(f64),
}

impl ExportCell {
    fn text(s: impl Into<String>) -> ExportCell {
        ExportCell::Text(s.into())
    }
}

impl From<&PlaceholderValue> for ExportCell {
    fn from(v: &PlaceholderValue) -> Self {
        match v {
            PlaceholderValue::Number(x) => ExportCell::Number(*x),
            PlaceholderValue::Text(s) => ExportCell::Text(s.clone()),
            PlaceholderValue::List(items) => ExportCell::Text(items.join("\n")),
        }
    }
}

/// A sheet as rows of cells. Rows may have different lengths.
#[derive(PartialEq, Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<ExportCell>>,
    /// Rows written in bold.
    pub header_rows: Vec<usize>,
}

impl Sheet {
    fn new(name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows: Vec::new(),
            header_rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<ExportCell>) {
        self.rows.push(row);
    }

    fn push_header(&mut self, row: Vec<ExportCell>) {
        self.header_rows.push(self.rows.len());
        self.rows.push(row);
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SubjectExport {
    pub quantitative: Sheet,
    pub textual: Sheet,
}

pub fn subject_export(schema: &SurveySchema, report: &SubjectReport) -> Result<SubjectExport, SurveyError> {
    Ok(SubjectExport {
        quantitative: quantitative_sheet(schema, report)?,
        textual: textual_sheet(report),
    })
}

fn quantitative_sheet(schema: &SurveySchema, report: &SubjectReport) -> Result<Sheet, SurveyError> {
    let label = &schema.subject.label;
    let value = |key: &str| -> Result<ExportCell, SurveyError> { Ok(report.value(key)?.into()) };
    let mut sheet = Sheet::new(QUANTITATIVE_SHEET);

    sheet.push(vec![ExportCell::text(label.as_str()), ExportCell::text(report.subject.as_str())]);
    sheet.push(vec![
        ExportCell::text("Number of respondents"),
        ExportCell::Number(report.answer_count as f64),
    ]);
    sheet.push(vec![
        ExportCell::text(format!("General question - {} average", label)),
        value(AVERAGE_GENERAL)?,
    ]);
    sheet.push(vec![
        ExportCell::text(format!("General question - {} std", label)),
        value(STD_GENERAL)?,
    ]);
    sheet.push(vec![
        ExportCell::text("General question - cohort average"),
        value(TOTAL_GENERAL)?,
    ]);
    sheet.push(vec![]);

    let mut header = vec![ExportCell::text("Question")];
    for _ in 0..schema.options_per_question() {
        header.push(ExportCell::text("Statement"));
        header.push(ExportCell::text(format!("{} %", label)));
        header.push(ExportCell::text("Cohort %"));
    }
    sheet.push_header(header);
    for question in schema.choice_questions.iter() {
        let mut row = vec![ExportCell::text(question.column.as_str())];
        for (idx, option) in question.options.iter().enumerate() {
            row.push(ExportCell::text(option.as_str()));
            row.push(value(&percent_key(&question.prefix, idx + 1))?);
            row.push(value(&total_key(&question.prefix, idx + 1))?);
        }
        sheet.push(row);
    }

    if !schema.numeric_sections.is_empty() {
        sheet.push(vec![]);
        sheet.push_header(vec![
            ExportCell::text("Question"),
            ExportCell::text(format!("{} avg", label)),
            ExportCell::text(format!("{} std", label)),
            ExportCell::text("Cohort avg"),
        ]);
        for section in schema.numeric_sections.iter() {
            for (idx, question) in section.questions.iter().enumerate() {
                sheet.push(vec![
                    ExportCell::text(question.display_label()),
                    value(&mean_key(&section.prefix, idx + 1))?,
                    value(&std_key(&section.prefix, idx + 1))?,
                    value(&cohort_mean_key(&section.prefix, idx + 1))?,
                ]);
            }
        }
    }
    Ok(sheet)
}

/// One column per open-text field, padded to the longest with empty strings.
fn textual_sheet(report: &SubjectReport) -> Sheet {
    let mut sheet = Sheet::new(TEXTUAL_SHEET);
    sheet.push_header(
        report
            .comments
            .iter()
            .map(|(column, _)| ExportCell::text(column.as_str()))
            .collect(),
    );
    let height = report
        .comments
        .iter()
        .map(|(_, texts)| texts.len())
        .max()
        .unwrap_or(0);
    for idx in 0..height {
        sheet.push(
            report
                .comments
                .iter()
                .map(|(_, texts)| ExportCell::text(texts.get(idx).map(|s| s.as_str()).unwrap_or("")))
                .collect(),
        );
    }
    sheet
}
