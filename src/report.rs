use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_stats::charts::section_charts;
use survey_stats::export::subject_export;
use survey_stats::*;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;

pub mod config_reader;
mod io_charts;
mod io_common;
mod io_docx;
mod io_excel;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("{source}"))]
    Survey { source: SurveyError },
    #[snafu(display("Error reading the document package {path}"))]
    ReadingDocx {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("Error writing the document package {path}"))]
    WritingDocx {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("Error parsing {part}"))]
    ParsingXml {
        source: quick_xml::Error,
        part: String,
    },
    #[snafu(display("Error writing {part}"))]
    WritingXml {
        source: quick_xml::Error,
        part: String,
    },
    #[snafu(display("Error writing workbook {path}"))]
    WritingXlsx {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

fn value_to_json(v: &PlaceholderValue) -> JSValue {
    match v {
        PlaceholderValue::Number(x) => json!(x),
        PlaceholderValue::Text(s) => json!(s),
        PlaceholderValue::List(items) => json!(items),
    }
}

fn values_to_json(values: &PlaceholderMap) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (k, v) in values.iter() {
        m.insert(k.clone(), value_to_json(v));
    }
    JSValue::Object(m)
}

/// Where the outputs go and which ones are produced.
struct OutputPlan {
    directory: PathBuf,
    template: Option<io_docx::DocxTemplate>,
    generate_export: bool,
    generate_charts: bool,
}

fn process_subject(
    table: &SurveyTable,
    schema: &SurveySchema,
    subject: &str,
    stem: &str,
    cohort: &PlaceholderMap,
    plan: &OutputPlan,
) -> ReportResult<JSValue> {
    let report = build_subject_report(table, schema, subject, cohort).context(SurveySnafu {})?;
    if !check_resolved(&report) {
        return Ok(json!({
            "subject": subject,
            "answers": report.answer_count,
            "rendered": false,
            "unresolved": unresolved_placeholders(&report.values),
        }));
    }

    if let Some(template) = plan.template.as_ref() {
        let p = plan.directory.join(format!("{}.docx", stem));
        let bytes = template.render(&report.values)?;
        io_common::write_bytes(&p, &bytes)?;
        info!("process_subject: {:?}: wrote {}", subject, p.display());
    }
    if plan.generate_export {
        let p = plan.directory.join(format!("{}.xlsx", stem));
        let export = subject_export(schema, &report).context(SurveySnafu {})?;
        io_xlsx::write_export(&p, &export)?;
        debug!("process_subject: {:?}: wrote {}", subject, p.display());
    }
    if plan.generate_charts {
        let p = plan.directory.join(format!("{}_charts.json", stem));
        let charts = section_charts(schema, &report.values).context(SurveySnafu {})?;
        io_charts::write_charts(&p, &charts)?;
        debug!("process_subject: {:?}: wrote {}", subject, p.display());
    }

    Ok(json!({
        "subject": subject,
        "answers": report.answer_count,
        "rendered": true,
        "file": stem,
        "values": values_to_json(&report.values),
    }))
}

fn build_summary_js(config: &SurveyConfig, cohort: &PlaceholderMap, subjects: Vec<JSValue>) -> JSValue {
    json!({
        "config": {
            "reportName": config.output_settings.report_name,
        },
        "cohort": values_to_json(cohort),
        "subjects": subjects,
    })
}

fn write_summary(out: &Option<String>, pretty_js_stats: &str) -> ReportResult<()> {
    match out.as_deref() {
        Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            fs::write(path, pretty_js_stats).context(WritingOutputSnafu { path })?;
            info!("write_summary: summary written to {}", path);
        }
        None => {
            debug!("write_summary: no output location, summary not written");
        }
    }
    Ok(())
}

fn check_reference(reference: &Option<String>, pretty_js_stats: &str) -> ReportResult<()> {
    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("check_reference: summary matches {}", summary_p);
    }
    Ok(())
}

pub fn run_reports(args: &Args) -> ReportResult<()> {
    let config_path = args.config.as_str();
    let config = read_config(config_path)?;
    info!("run_reports: report {:?}", config.output_settings.report_name);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let schema = to_schema(&config)?;

    let input_p = match args.input.as_ref() {
        Some(p) => PathBuf::from(p),
        None => io_common::resolve(root_p, &config.input_file.file_path),
    };
    let worksheet = args
        .excel_worksheet_name
        .clone()
        .or_else(|| config.input_file.excel_worksheet_name.clone());
    let raw_table = io_excel::read_survey_table(&input_p, worksheet.as_deref())?;
    let table = prepare_table(raw_table, &schema).context(SurveySnafu {})?;

    let cohort = cohort_stats(&table, &schema).context(SurveySnafu {})?;
    debug!("run_reports: cohort values: {:?}", cohort);

    let settings = &config.output_settings;
    let template_p = match args.template.as_ref() {
        Some(p) => Some(PathBuf::from(p)),
        None => settings
            .template_path
            .as_ref()
            .map(|p| io_common::resolve(root_p, p)),
    };
    let template = match template_p {
        Some(p) => Some(io_docx::DocxTemplate::open(&p)?),
        None => {
            warn!("run_reports: no template given, no documents will be written");
            None
        }
    };
    let directory = io_common::resolve(
        root_p,
        settings.output_directory.as_deref().unwrap_or("output"),
    );
    fs::create_dir_all(&directory).context(WritingOutputSnafu {
        path: directory.display().to_string(),
    })?;
    let plan = OutputPlan {
        directory,
        template,
        generate_export: settings.generate_export.unwrap_or(true),
        generate_charts: settings.generate_charts.unwrap_or(true),
    };

    let subjects = table
        .subjects(&schema.subject.column)
        .context(SurveySnafu {})?;
    let mut subject_summaries: Vec<JSValue> = Vec::with_capacity(subjects.len());
    let mut rendered = 0usize;
    let mut stems: HashSet<String> = HashSet::new();
    for subject in subjects.iter() {
        let stem = io_common::unique_file_stem(subject, &mut stems);
        let js = process_subject(&table, &schema, subject, &stem, &cohort, &plan)?;
        if js["rendered"] == json!(true) {
            rendered += 1;
        }
        subject_summaries.push(js);
    }
    info!(
        "run_reports: {} reports written out of {} subjects",
        rendered,
        subjects.len()
    );

    let result_js = build_summary_js(&config, &cohort, subject_summaries);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&args.out, &pretty_js_stats)?;
    check_reference(&args.reference, &pretty_js_stats)
}
