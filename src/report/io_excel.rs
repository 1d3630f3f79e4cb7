use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;
use std::path::Path;

use survey_stats::{CellValue, SurveyTable};

use crate::report::{EmptyExcelSnafu, OpeningExcelSnafu, ReportResult};

fn get_range(path: &Path, worksheet_name_o: Option<&str>) -> ReportResult<Range<DataType>> {
    let path_s = path.display().to_string();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path_s, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: path_s.clone() })?;

    // A worksheet name was provided, use it.
    let wrange = if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu { path: path_s.clone() })?
            .context(OpeningExcelSnafu { path: path_s })?
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path: path_s.clone() })?
            .context(OpeningExcelSnafu { path: path_s })?
    };
    Ok(wrange)
}

fn read_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::Error(e) => {
            debug!("read_cell: error cell {:?} read as empty", e);
            CellValue::Empty
        }
        // Dates and durations are only found in the columns that are not used.
        other => CellValue::Text(other.to_string()),
    }
}

/// Reads the survey answers. The first row holds the column names.
pub fn read_survey_table(path: &Path, worksheet_name: Option<&str>) -> ReportResult<SurveyTable> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {
        path: path.display().to_string(),
    })?;
    let columns: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    debug!("read_survey_table: header: {:?}", columns);

    let rows: Vec<Vec<CellValue>> = iter.map(|row| row.iter().map(read_cell).collect()).collect();
    debug!("read_survey_table: {} rows", rows.len());
    Ok(SurveyTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportError;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn read_named_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("answers.xlsx");
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("Notes").unwrap();
        first.write_string(0, 0, "nothing here").unwrap();
        let answers = workbook.add_worksheet();
        answers.set_name("Form1").unwrap();
        answers.write_string(0, 0, "Name").unwrap();
        answers.write_string(0, 1, "Rating").unwrap();
        answers.write_string(1, 0, "Dana").unwrap();
        answers.write_number(1, 1, 4).unwrap();
        answers.write_string(2, 0, "Avi").unwrap();
        answers.write_boolean(2, 1, true).unwrap();
        workbook.save(&p).unwrap();

        let t = read_survey_table(&p, Some("Form1")).unwrap();
        assert_eq!(t.columns(), &["Name".to_string(), "Rating".to_string()]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(0, 0), &CellValue::Text("Dana".to_string()));
        assert_eq!(t.cell(0, 1), &CellValue::Number(4.0));
        assert_eq!(t.cell(1, 1), &CellValue::Bool(true));

        let first = read_survey_table(&p, None).unwrap();
        assert_eq!(first.columns(), &["nothing here".to_string()]);
        assert!(first.is_empty());

        assert!(matches!(
            read_survey_table(&p, Some("Missing")),
            Err(ReportError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_survey_table(Path::new("/nonexistent/answers.xlsx"), None),
            Err(ReportError::OpeningExcel { .. })
        ));
    }
}
