use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "reportName")]
    pub report_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "templatePath")]
    pub template_path: Option<String>,
    #[serde(rename = "generateExport")]
    pub generate_export: Option<bool>,
    #[serde(rename = "generateCharts")]
    pub generate_charts: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputFile {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub column: String,
    pub label: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GeneralRatingConfig {
    pub column: String,
    #[serde(rename = "ignoredValue")]
    pub ignored_value: Option<f64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NumericQuestionConfig {
    pub column: String,
    #[serde(rename = "shortLabel")]
    pub short_label: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NumericSectionConfig {
    pub label: String,
    pub prefix: String,
    #[serde(rename = "ignoredValue")]
    pub ignored_value: Option<f64>,
    pub questions: Vec<NumericQuestionConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MultipleChoiceConfig {
    pub column: String,
    pub prefix: String,
    pub options: Vec<String>,
    #[serde(rename = "noneOption")]
    pub none_option: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OpenTextConfig {
    pub column: String,
    #[serde(rename = "bulletKey")]
    pub bullet_key: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    #[serde(rename = "minSample")]
    pub min_sample: Option<usize>,
    pub decimals: Option<u32>,
    #[serde(rename = "tooFewAnswersText")]
    pub too_few_answers_text: Option<String>,
    #[serde(rename = "minCommentLength")]
    pub min_comment_length: Option<usize>,
    pub delimiter: Option<String>,
    #[serde(rename = "matchMode")]
    pub match_mode: Option<String>,
    pub punctuation: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChartLabelsConfig {
    #[serde(rename = "yAxis")]
    pub y_axis: Option<String>,
    #[serde(rename = "subjectSeries")]
    pub subject_series: Option<String>,
    #[serde(rename = "cohortSeries")]
    pub cohort_series: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputFile")]
    pub input_file: InputFile,
    pub subject: SubjectConfig,
    #[serde(rename = "generalRating")]
    pub general_rating: GeneralRatingConfig,
    #[serde(rename = "numericSections", default)]
    pub numeric_sections: Vec<NumericSectionConfig>,
    #[serde(rename = "multipleChoice", default)]
    pub multiple_choice: Vec<MultipleChoiceConfig>,
    #[serde(rename = "openText", default)]
    pub open_text: Vec<OpenTextConfig>,
    #[serde(rename = "extraColumns", default)]
    pub extra_columns: Vec<String>,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(rename = "chartLabels", default)]
    pub chart_labels: ChartLabelsConfig,
}

pub fn read_config(path: &str) -> ReportResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_match_mode(s: &Option<String>) -> ReportResult<MatchMode> {
    match s.as_deref() {
        None | Some("delimited") => Ok(MatchMode::Delimited),
        Some("contains") => Ok(MatchMode::Contains),
        Some(x) => whatever!("unknown match mode {:?}: expected delimited or contains", x),
    }
}

fn read_rules(rules: &RulesConfig) -> ReportResult<StatsRules> {
    let defaults = StatsRules::default();
    let min_sample = rules.min_sample.unwrap_or(defaults.min_sample);
    let decimals = rules.decimals.unwrap_or(defaults.decimals);
    if !(1..=2).contains(&decimals) {
        warn!(
            "read_rules: decimals is {}, reports usually use 1 or 2 decimals",
            decimals
        );
    }
    Ok(StatsRules {
        min_sample,
        decimals,
        too_few_answers_text: rules
            .too_few_answers_text
            .clone()
            .unwrap_or_else(|| too_few_answers_text(min_sample)),
        min_comment_length: rules
            .min_comment_length
            .unwrap_or(defaults.min_comment_length),
        delimiter: rules.delimiter.clone().unwrap_or(defaults.delimiter),
        match_mode: read_match_mode(&rules.match_mode)?,
        punctuation: rules
            .punctuation
            .as_ref()
            .map(|p| p.chars().collect())
            .unwrap_or(defaults.punctuation),
    })
}

/// The schema of the survey form, validated.
pub fn to_schema(config: &SurveyConfig) -> ReportResult<SurveySchema> {
    let default_labels = ChartLabels::default();
    let labels = &config.chart_labels;
    let schema = SurveySchema {
        subject: SubjectField {
            column: config.subject.column.clone(),
            label: config
                .subject
                .label
                .clone()
                .unwrap_or_else(|| config.subject.column.clone()),
        },
        general_rating: RatingQuestion {
            column: config.general_rating.column.clone(),
            ignored_value: config.general_rating.ignored_value,
        },
        numeric_sections: config
            .numeric_sections
            .iter()
            .map(|s| NumericSection {
                label: s.label.clone(),
                prefix: s.prefix.clone(),
                questions: s
                    .questions
                    .iter()
                    .map(|q| NumericQuestion {
                        column: q.column.clone(),
                        short_label: q.short_label.clone(),
                    })
                    .collect(),
                ignored_value: s.ignored_value,
            })
            .collect(),
        choice_questions: config
            .multiple_choice
            .iter()
            .map(|q| ChoiceQuestion {
                column: q.column.clone(),
                prefix: q.prefix.clone(),
                options: q.options.clone(),
                none_option: q.none_option.clone(),
            })
            .collect(),
        open_text: config
            .open_text
            .iter()
            .map(|f| OpenTextField {
                column: f.column.clone(),
                bullet_key: f.bullet_key.clone(),
            })
            .collect(),
        extra_columns: config.extra_columns.clone(),
        rules: read_rules(&config.rules)?,
        chart_labels: ChartLabels {
            y_axis: labels.y_axis.clone().unwrap_or(default_labels.y_axis),
            subject_series: labels
                .subject_series
                .clone()
                .unwrap_or(default_labels.subject_series),
            cohort_series: labels
                .cohort_series
                .clone()
                .unwrap_or(default_labels.cohort_series),
        },
    };
    schema.validate().context(SurveySnafu {})?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "outputSettings": { "reportName": "Spring cohort" },
        "inputFile": { "filePath": "answers.xlsx" },
        "subject": { "column": "Name", "label": "Commander" },
        "generalRating": { "column": "Rating" },
        "numericSections": [
            { "label": "Professional", "prefix": "professional", "ignoredValue": 0,
              "questions": [ { "column": "Q1", "shortLabel": "Knowledge" }, { "column": "Q2" } ] }
        ],
        "multipleChoice": [
            { "column": "Command", "prefix": "command",
              "options": ["Decisive, confident", "Motivating", "None"], "noneOption": "None" }
        ],
        "openText": [ { "column": "Keep", "bulletKey": "conserve_command" } ],
        "rules": { "minSample": 3, "matchMode": "contains", "punctuation": ".," }
    }"#;

    fn config() -> SurveyConfig {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn schema_from_config() {
        let schema = to_schema(&config()).unwrap();
        assert_eq!(schema.subject.label, "Commander");
        assert_eq!(schema.numeric_sections[0].ignored_value, Some(0.0));
        assert_eq!(
            schema.numeric_sections[0].questions[0].display_label(),
            "Knowledge"
        );
        assert_eq!(schema.numeric_sections[0].questions[1].display_label(), "Q2");
        assert_eq!(schema.rules.min_sample, 3);
        assert_eq!(schema.rules.decimals, 2);
        assert_eq!(schema.rules.too_few_answers_text, "fewer than 3 answers");
        assert_eq!(schema.rules.match_mode, MatchMode::Contains);
        assert_eq!(schema.rules.punctuation, vec!['.', ',']);
        assert_eq!(schema.rules.delimiter, ",");
        assert_eq!(schema.chart_labels, ChartLabels::default());
        assert!(schema.extra_columns.is_empty());
    }

    #[test]
    fn unknown_match_mode() {
        let mut c = config();
        c.rules.match_mode = Some("fuzzy".to_string());
        assert!(matches!(to_schema(&c), Err(ReportError::Whatever { .. })));
    }

    #[test]
    fn invalid_schema_is_rejected() {
        let mut c = config();
        c.multiple_choice[0].none_option = "Nobody".to_string();
        assert!(matches!(to_schema(&c), Err(ReportError::Survey { .. })));
        let mut c = config();
        c.rules.min_sample = Some(1);
        assert!(matches!(to_schema(&c), Err(ReportError::Survey { .. })));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_config("/nonexistent/config.json"),
            Err(ReportError::OpeningJson { .. })
        ));
    }
}
