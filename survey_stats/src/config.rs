// ********* Schema data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

use crate::bidi::DEFAULT_PUNCTUATION;

/// The column that identifies the subject (the person being rated) of every answer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubjectField {
    pub column: String,
    /// Label used for the subject in the exported spreadsheet ("Commander", "Supervisor", ...)
    pub label: String,
}

/// The single overall numeric rating of the form.
#[derive(PartialEq, Debug, Clone)]
pub struct RatingQuestion {
    pub column: String,
    /// Answers literally equal to this value mean "not applicable" and are dropped.
    pub ignored_value: Option<f64>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NumericQuestion {
    pub column: String,
    /// Short label for the chart axis and the export. Defaults to the column name.
    pub short_label: Option<String>,
}

impl NumericQuestion {
    pub fn display_label(&self) -> &str {
        self.short_label.as_deref().unwrap_or(&self.column)
    }
}

/// A named cluster of related numeric questions, reported together as one chart.
#[derive(PartialEq, Debug, Clone)]
pub struct NumericSection {
    pub label: String,
    /// Placeholder prefix, e.g. `professional` gives `mean_professional_1`.
    pub prefix: String,
    pub questions: Vec<NumericQuestion>,
    pub ignored_value: Option<f64>,
}

/// A multiple-choice question with its fixed, ordered list of options.
///
/// One of the options is the "none of the above" sentinel, counted with exclusive semantics.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceQuestion {
    pub column: String,
    pub prefix: String,
    pub options: Vec<String>,
    pub none_option: String,
}

impl ChoiceQuestion {
    pub fn is_none_option(&self, option: &str) -> bool {
        option == self.none_option
    }
}

/// A free-text column and the bullet list it feeds in the report.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OpenTextField {
    pub column: String,
    pub bullet_key: String,
}

// ********* Rules **********

/// How a multiple-choice cell is matched against an option label.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MatchMode {
    /// The cell is a delimiter-joined list of labels. A label matches exactly, at
    /// delimiter boundaries, even when it contains the delimiter itself.
    Delimited,
    /// The label only has to appear somewhere in the cell. Labels that are substrings of
    /// other labels will be over-counted in this mode.
    Contains,
}

#[derive(PartialEq, Debug, Clone)]
pub struct StatsRules {
    /// Below this number of valid answers, a mean or a std is not reported.
    pub min_sample: usize,
    /// Decimal places of the reported means, stds and percentages.
    pub decimals: u32,
    /// Displayed instead of a mean or a std that could not be computed.
    pub too_few_answers_text: String,
    /// Free-text answers shorter than this (in characters, after trimming) are dropped.
    pub min_comment_length: usize,
    pub delimiter: String,
    pub match_mode: MatchMode,
    /// Characters pinned to right-to-left with marks when embedding text.
    pub punctuation: Vec<char>,
}

pub const DEFAULT_MIN_SAMPLE: usize = 4;
pub const DEFAULT_DECIMALS: u32 = 2;
pub const DEFAULT_MIN_COMMENT_LENGTH: usize = 2;
pub const MAX_DECIMALS: u32 = 6;

impl Default for StatsRules {
    fn default() -> Self {
        StatsRules {
            min_sample: DEFAULT_MIN_SAMPLE,
            decimals: DEFAULT_DECIMALS,
            too_few_answers_text: too_few_answers_text(DEFAULT_MIN_SAMPLE),
            min_comment_length: DEFAULT_MIN_COMMENT_LENGTH,
            delimiter: ",".to_string(),
            match_mode: MatchMode::Delimited,
            punctuation: DEFAULT_PUNCTUATION.to_vec(),
        }
    }
}

pub fn too_few_answers_text(min_sample: usize) -> String {
    format!("fewer than {} answers", min_sample)
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartLabels {
    pub y_axis: String,
    pub subject_series: String,
    pub cohort_series: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        ChartLabels {
            y_axis: "Average".to_string(),
            subject_series: "Personal average".to_string(),
            cohort_series: "Cohort average".to_string(),
        }
    }
}

/// Everything the engines need to know about one survey form.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveySchema {
    pub subject: SubjectField,
    pub general_rating: RatingQuestion,
    pub numeric_sections: Vec<NumericSection>,
    pub choice_questions: Vec<ChoiceQuestion>,
    pub open_text: Vec<OpenTextField>,
    /// Columns that must be present in the input but are not used (timestamps, ...)
    pub extra_columns: Vec<String>,
    pub rules: StatsRules,
    pub chart_labels: ChartLabels,
}

impl SurveySchema {
    /// All the columns the input table must provide, without duplicates.
    pub fn expected_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = vec![
            self.subject.column.clone(),
            self.general_rating.column.clone(),
        ];
        for section in self.numeric_sections.iter() {
            cols.extend(section.questions.iter().map(|q| q.column.clone()));
        }
        cols.extend(self.choice_questions.iter().map(|q| q.column.clone()));
        cols.extend(self.open_text.iter().map(|f| f.column.clone()));
        cols.extend(self.extra_columns.iter().cloned());

        let mut seen: HashSet<String> = HashSet::new();
        cols.retain(|c| seen.insert(c.clone()));
        cols
    }

    /// The number of options of every multiple-choice question (0 if there are none).
    pub fn options_per_question(&self) -> usize {
        self.choice_questions
            .first()
            .map(|q| q.options.len())
            .unwrap_or(0)
    }

    /// The largest number of questions in a numeric section.
    pub fn max_questions_per_section(&self) -> usize {
        self.numeric_sections
            .iter()
            .map(|s| s.questions.len())
            .max()
            .unwrap_or(0)
    }

    pub fn section(&self, label: &str) -> Result<&NumericSection, SurveyError> {
        self.numeric_sections
            .iter()
            .find(|s| s.label == label)
            .ok_or_else(|| SurveyError::UnknownSection {
                label: label.to_string(),
            })
    }

    /// Checks the invariants the engines rely on.
    pub fn validate(&self) -> Result<(), SurveyError> {
        if self.rules.min_sample < 2 {
            return Err(SurveyError::InvalidRule {
                message: format!("minSample must be at least 2, got {}", self.rules.min_sample),
            });
        }
        if self.rules.decimals > MAX_DECIMALS {
            return Err(SurveyError::InvalidRule {
                message: format!(
                    "decimals must be at most {}, got {}",
                    MAX_DECIMALS, self.rules.decimals
                ),
            });
        }
        if self.rules.delimiter.is_empty() && self.rules.match_mode == MatchMode::Delimited {
            return Err(SurveyError::InvalidRule {
                message: "an empty delimiter requires the contains match mode".to_string(),
            });
        }

        let expected = self.options_per_question();
        for q in self.choice_questions.iter() {
            if q.options.len() != expected {
                return Err(SurveyError::InconsistentOptions {
                    question: q.column.clone(),
                    expected,
                    actual: q.options.len(),
                });
            }
            if !q.options.iter().any(|o| q.is_none_option(o)) {
                return Err(SurveyError::MissingNoneOption {
                    question: q.column.clone(),
                    none_option: q.none_option.clone(),
                });
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        for name in crate::report::placeholder_names(self) {
            if !seen.insert(name.clone()) {
                return Err(SurveyError::DuplicatePlaceholder { key: name });
            }
        }
        Ok(())
    }
}

// ********* Errors **********

/// Errors that prevent the statistics from being computed.
///
/// Data problems (too few answers, unparseable cells) are not errors: they are
/// reported as values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyError {
    MissingColumns {
        missing: Vec<String>,
    },
    EmptyTable,
    /// A column was requested that the table does not have.
    /// The schema is validated against the table before computing, so this is a bug.
    UnknownColumn {
        column: String,
    },
    UnknownSection {
        label: String,
    },
    UnknownPlaceholder {
        key: String,
    },
    InconsistentOptions {
        question: String,
        expected: usize,
        actual: usize,
    },
    MissingNoneOption {
        question: String,
        none_option: String,
    },
    DuplicatePlaceholder {
        key: String,
    },
    InvalidRule {
        message: String,
    },
}

impl Error for SurveyError {}

impl Display for SurveyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyError::MissingColumns { missing } => {
                write!(f, "missing required columns: {:?}", missing)
            }
            SurveyError::EmptyTable => write!(f, "the survey table has no answers"),
            SurveyError::UnknownColumn { column } => write!(f, "unknown column {:?}", column),
            SurveyError::UnknownSection { label } => {
                write!(f, "unknown numeric section {:?}", label)
            }
            SurveyError::UnknownPlaceholder { key } => {
                write!(f, "no value computed for placeholder {:?}", key)
            }
            SurveyError::InconsistentOptions {
                question,
                expected,
                actual,
            } => write!(
                f,
                "question {:?} has {} options, expected {} like the other questions",
                question, actual, expected
            ),
            SurveyError::MissingNoneOption {
                question,
                none_option,
            } => write!(
                f,
                "question {:?} does not list its none option {:?}",
                question, none_option
            ),
            SurveyError::DuplicatePlaceholder { key } => {
                write!(f, "placeholder {:?} is generated twice", key)
            }
            SurveyError::InvalidRule { message } => write!(f, "invalid rule: {}", message),
        }
    }
}
