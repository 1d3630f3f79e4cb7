// The survey answers, one row per respondent.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use crate::config::SurveyError;

/// The content of one cell, as read from the spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Empty cells and whitespace-only texts.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// The text of the cell. Numbers are printed without a trailing `.0`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Number(x) => Some(Cow::Owned(format!("{}", x))),
            CellValue::Bool(b) => Some(Cow::Owned(b.to_string())),
        }
    }

    /// The numeric value of the cell, if it has one.
    ///
    /// Blank cells, texts that do not parse and non-finite values are missing.
    pub fn as_number(&self) -> Option<f64> {
        let x = match self {
            CellValue::Number(x) => *x,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Bool(_) => return None,
        };
        if x.is_finite() {
            Some(x)
        } else {
            None
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SurveyTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    index: HashMap<String, usize>,
}

impl SurveyTable {
    /// Rows shorter than the header are padded with empty cells.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> SurveyTable {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), CellValue::Empty);
                row
            })
            .collect();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, name) in columns.iter().enumerate() {
            // The first column wins when a header is repeated.
            index.entry(name.clone()).or_insert(idx);
        }
        SurveyTable {
            columns,
            rows,
            index,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, SurveyError> {
        self.index
            .get(name)
            .cloned()
            .ok_or_else(|| SurveyError::UnknownColumn {
                column: name.to_string(),
            })
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    /// Checks that all the expected columns are present and that there is at least one answer.
    ///
    /// Columns that are not expected are reported but otherwise ignored.
    pub fn validate(&self, expected: &[String]) -> Result<(), SurveyError> {
        let actual: HashSet<&String> = self.columns.iter().collect();
        let expected_set: HashSet<&String> = expected.iter().collect();

        let missing: Vec<String> = expected
            .iter()
            .filter(|c| !actual.contains(c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            warn!(
                "validate: missing columns: {:?} (expected: {:?}, actual: {:?})",
                missing, expected, self.columns
            );
            return Err(SurveyError::MissingColumns { missing });
        }

        let extra: Vec<&String> = self
            .columns
            .iter()
            .filter(|c| !expected_set.contains(c))
            .collect();
        if !extra.is_empty() {
            warn!("validate: extra columns ignored: {:?}", extra);
        }

        if self.rows.is_empty() {
            return Err(SurveyError::EmptyTable);
        }
        Ok(())
    }

    /// Drops the rows that cannot be attributed to a subject and normalizes the subject names.
    ///
    /// Fully empty rows and rows without a subject are removed. The subject keeps its
    /// name without the parenthetical annotations: `"Dana (deputy)"` becomes `"Dana"`.
    pub fn clean(self, subject_column: &str) -> Result<SurveyTable, SurveyError> {
        let subject_idx = self.column_index(subject_column)?;
        let before = self.rows.len();
        let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(before);
        for (lineno, mut row) in self.rows.into_iter().enumerate() {
            if row.iter().all(|c| c.is_blank()) {
                debug!("clean: row {} is empty, dropped", lineno);
                continue;
            }
            let subject = row[subject_idx]
                .as_text()
                .map(|s| normalize_subject(&s))
                .unwrap_or_default();
            if subject.is_empty() {
                debug!("clean: row {} has no subject, dropped", lineno);
                continue;
            }
            row[subject_idx] = CellValue::Text(subject);
            rows.push(row);
        }
        debug!("clean: kept {} rows out of {}", rows.len(), before);
        Ok(SurveyTable {
            columns: self.columns,
            rows,
            index: self.index,
        })
    }

    /// The distinct subjects, in order of first appearance.
    pub fn subjects(&self, subject_column: &str) -> Result<Vec<String>, SurveyError> {
        let subject_idx = self.column_index(subject_column)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut res: Vec<String> = Vec::new();
        for row in self.rows.iter() {
            if let Some(s) = row[subject_idx].as_text() {
                if seen.insert(s.to_string()) {
                    res.push(s.to_string());
                }
            }
        }
        Ok(res)
    }

    /// The answers about one subject.
    pub fn group(&self, subject_column: &str, subject: &str) -> Result<Group<'_>, SurveyError> {
        let subject_idx = self.column_index(subject_column)?;
        let rows = (0..self.rows.len())
            .filter(|idx| self.rows[*idx][subject_idx].as_text().as_deref() == Some(subject))
            .collect();
        Ok(Group {
            table: self,
            key: Some(subject.to_string()),
            rows,
        })
    }

    /// All the answers (the cohort).
    pub fn all(&self) -> Group<'_> {
        Group {
            table: self,
            key: None,
            rows: (0..self.rows.len()).collect(),
        }
    }
}

/// Removes every parenthetical annotation and the surrounding whitespace.
pub fn normalize_subject(raw: &str) -> String {
    static PARENS: OnceLock<Regex> = OnceLock::new();
    let re = PARENS.get_or_init(|| Regex::new(r"\s*\(.*?\)").expect("valid regex"));
    re.replace_all(raw, "").trim().to_string()
}

/// A subset of the rows of a table: the answers about one subject, or all of them.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    table: &'a SurveyTable,
    key: Option<String>,
    rows: Vec<usize>,
}

impl<'a> Group<'a> {
    /// The subject, or `None` for the whole cohort.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn answer_count(&self) -> usize {
        self.rows.len()
    }

    /// The cells of the given column for the rows of this group.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &'a CellValue> + '_, SurveyError> {
        let col = self.table.column_index(name)?;
        let table = self.table;
        Ok(self.rows.iter().map(move |r| table.cell(*r, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn table() -> SurveyTable {
        SurveyTable::new(
            vec!["Name".to_string(), "Rating".to_string()],
            vec![
                vec![text("Dana (deputy)"), CellValue::Number(4.0)],
                vec![text("Avi"), text(" 5 ")],
                vec![CellValue::Empty, CellValue::Number(2.0)],
                vec![CellValue::Empty, text("  ")],
                vec![text("Dana"), text("n/a")],
                vec![text(" (x) "), CellValue::Number(3.0)],
            ],
        )
    }

    #[test]
    fn normalize_removes_annotations() {
        assert_eq!(normalize_subject("Dana (deputy)"), "Dana");
        assert_eq!(normalize_subject("  Dana  "), "Dana");
        assert_eq!(normalize_subject("Dana (a) Levi (b)"), "Dana Levi");
        assert_eq!(normalize_subject("(only)"), "");
    }

    #[test]
    fn numbers() {
        assert_eq!(text(" 4 ").as_number(), Some(4.0));
        assert_eq!(text("4.5").as_number(), Some(4.5));
        assert_eq!(text("").as_number(), None);
        assert_eq!(text("abc").as_number(), None);
        assert_eq!(text("NaN").as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Number(3.0).as_text().as_deref(), Some("3"));
    }

    #[test]
    fn clean_and_group() {
        let t = table().clean("Name").unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.subjects("Name").unwrap(), vec!["Dana", "Avi"]);
        let g = t.group("Name", "Dana").unwrap();
        assert_eq!(g.answer_count(), 2);
        assert_eq!(g.key(), Some("Dana"));
        assert_eq!(t.all().answer_count(), 3);
        assert_eq!(t.all().key(), None);
    }

    #[test]
    fn validate_reports_missing_columns() {
        let t = table();
        let res = t.validate(&["Name".to_string(), "Comments".to_string()]);
        assert_eq!(
            res,
            Err(SurveyError::MissingColumns {
                missing: vec!["Comments".to_string()]
            })
        );
        assert_eq!(t.validate(&["Name".to_string()]), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_table() {
        let t = SurveyTable::new(vec!["Name".to_string()], vec![]);
        assert_eq!(t.validate(&["Name".to_string()]), Err(SurveyError::EmptyTable));
    }

    #[test]
    fn short_rows_are_padded() {
        let t = SurveyTable::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec![text("x")]],
        );
        assert_eq!(t.cell(0, 1), &CellValue::Empty);
        assert_eq!(t.cell(5, 5), &CellValue::Empty);
    }

    #[test]
    fn unknown_column() {
        let t = table();
        assert!(matches!(
            t.all().column("Missing"),
            Err(SurveyError::UnknownColumn { .. })
        ));
    }
}
