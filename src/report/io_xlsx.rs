use rust_xlsxwriter::{Format, Workbook, Worksheet};
use snafu::prelude::*;
use std::path::Path;

use survey_stats::export::{ExportCell, Sheet, SubjectExport};

use crate::report::{ReportResult, WritingXlsxSnafu};

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, path: &str) -> ReportResult<()> {
    let header_format = Format::new().set_bold();
    worksheet
        .set_name(&sheet.name)
        .context(WritingXlsxSnafu { path })?;
    for (row_index, row) in sheet.rows.iter().enumerate() {
        let bold = sheet.header_rows.contains(&row_index);
        let r = row_index as u32;
        for (col_index, cell) in row.iter().enumerate() {
            let c = col_index as u16;
            match cell {
                ExportCell::Empty => {}
                ExportCell::Text(s) if bold => {
                    worksheet
                        .write_string_with_format(r, c, s, &header_format)
                        .context(WritingXlsxSnafu { path })?;
                }
                ExportCell::Text(s) => {
                    worksheet
                        .write_string(r, c, s)
                        .context(WritingXlsxSnafu { path })?;
                }
                ExportCell::Number(x) => {
                    worksheet
                        .write_number(r, c, *x)
                        .context(WritingXlsxSnafu { path })?;
                }
            }
        }
    }
    Ok(())
}

/// Writes the two sheets of the export of a subject.
pub fn write_export(path: &Path, export: &SubjectExport) -> ReportResult<()> {
    let path_s = path.display().to_string();
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), &export.quantitative, &path_s)?;
    write_sheet(workbook.add_worksheet(), &export.textual, &path_s)?;
    workbook
        .save(path)
        .context(WritingXlsxSnafu { path: path_s })?;
    Ok(())
}
