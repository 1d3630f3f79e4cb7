// The placeholder values of the report of every subject.

use log::{debug, info, warn};

use crate::bidi::rtl_embed;
use crate::categorical::{choice_stats, percent_key, total_key};
use crate::config::{SurveyError, SurveySchema};
use crate::numeric::{
    cohort_mean_key, general_stats, mean_key, section_stats, std_key, Scope, AVERAGE_GENERAL,
    STD_GENERAL, TOTAL_GENERAL,
};
use crate::table::{Group, SurveyTable};
use crate::values::{PlaceholderMap, PlaceholderValue};

pub const NAME: &str = "name";
pub const NUMBER_ANSWERS: &str = "number_answers";

/// Every placeholder the assembler produces for a schema, subject keys then cohort keys.
pub fn placeholder_names(schema: &SurveySchema) -> Vec<String> {
    let mut res: Vec<String> = vec![
        NAME.to_string(),
        NUMBER_ANSWERS.to_string(),
        AVERAGE_GENERAL.to_string(),
        STD_GENERAL.to_string(),
    ];
    for section in schema.numeric_sections.iter() {
        for idx in 1..=section.questions.len() {
            res.push(mean_key(&section.prefix, idx));
            res.push(std_key(&section.prefix, idx));
        }
    }
    for question in schema.choice_questions.iter() {
        for idx in 1..=question.options.len() {
            res.push(percent_key(&question.prefix, idx));
        }
    }
    res.extend(schema.open_text.iter().map(|f| f.bullet_key.clone()));

    res.push(TOTAL_GENERAL.to_string());
    for section in schema.numeric_sections.iter() {
        for idx in 1..=section.questions.len() {
            res.push(cohort_mean_key(&section.prefix, idx));
        }
    }
    for question in schema.choice_questions.iter() {
        for idx in 1..=question.options.len() {
            res.push(total_key(&question.prefix, idx));
        }
    }
    res
}

/// Validates the schema and the table, then cleans the table.
///
/// Any error here aborts the whole run: nothing has been computed yet.
pub fn prepare_table(table: SurveyTable, schema: &SurveySchema) -> Result<SurveyTable, SurveyError> {
    schema.validate()?;
    table.validate(&schema.expected_columns())?;
    let cleaned = table.clean(&schema.subject.column)?;
    if cleaned.is_empty() {
        return Err(SurveyError::EmptyTable);
    }
    info!(
        "prepare_table: {} answers about {} subjects",
        cleaned.len(),
        cleaned.subjects(&schema.subject.column)?.len()
    );
    Ok(cleaned)
}

/// The statistics of the whole cohort. Computed once per run.
pub fn cohort_stats(table: &SurveyTable, schema: &SurveySchema) -> Result<PlaceholderMap, SurveyError> {
    stats_for(&table.all(), schema, Scope::Cohort)
}

fn stats_for(group: &Group, schema: &SurveySchema, scope: Scope) -> Result<PlaceholderMap, SurveyError> {
    let rules = &schema.rules;
    let mut res = general_stats(group, &schema.general_rating, scope, rules)?;
    for section in schema.numeric_sections.iter() {
        res.extend(section_stats(group, section, scope, rules)?);
    }
    for question in schema.choice_questions.iter() {
        res.extend(choice_stats(group, question, scope, rules)?);
    }
    Ok(res)
}

/// The free-text answers of a column: trimmed, without the ones that are too short.
pub fn collect_comments(group: &Group, column: &str, min_length: usize) -> Result<Vec<String>, SurveyError> {
    let mut res = Vec::new();
    for cell in group.column(column)? {
        let text = match cell.as_text() {
            Some(t) => t.trim().to_string(),
            None => continue,
        };
        if text.chars().count() < min_length {
            continue;
        }
        res.push(text);
    }
    Ok(res)
}

/// Everything needed to render the report of one subject.
#[derive(PartialEq, Debug, Clone)]
pub struct SubjectReport {
    pub subject: String,
    pub answer_count: usize,
    /// Subject values merged over the cohort values.
    pub values: PlaceholderMap,
    /// The comments of every open-text column, in schema order, before bidi embedding.
    pub comments: Vec<(String, Vec<String>)>,
}

impl SubjectReport {
    pub fn value(&self, key: &str) -> Result<&PlaceholderValue, SurveyError> {
        self.values
            .get(key)
            .ok_or_else(|| SurveyError::UnknownPlaceholder {
                key: key.to_string(),
            })
    }
}

pub fn build_subject_report(
    table: &SurveyTable,
    schema: &SurveySchema,
    subject: &str,
    cohort: &PlaceholderMap,
) -> Result<SubjectReport, SurveyError> {
    let group = table.group(&schema.subject.column, subject)?;
    let mut values = stats_for(&group, schema, Scope::Subject)?;
    values.insert(NAME.to_string(), PlaceholderValue::Text(subject.to_string()));
    values.insert(
        NUMBER_ANSWERS.to_string(),
        PlaceholderValue::Number(group.answer_count() as f64),
    );

    let mut comments = Vec::with_capacity(schema.open_text.len());
    for field in schema.open_text.iter() {
        let texts = collect_comments(&group, &field.column, schema.rules.min_comment_length)?;
        let bullets = texts
            .iter()
            .map(|t| rtl_embed(t, &schema.rules.punctuation))
            .collect();
        values.insert(field.bullet_key.clone(), PlaceholderValue::List(bullets));
        comments.push((field.column.clone(), texts));
    }
    debug!(
        "build_subject_report: subject {:?}: {} answers, {} values",
        subject,
        group.answer_count(),
        values.len()
    );

    Ok(SubjectReport {
        subject: subject.to_string(),
        answer_count: group.answer_count(),
        values: merge(values, cohort),
        comments,
    })
}

/// The subject values over the cohort values. The subject wins on a shared key.
pub fn merge(subject: PlaceholderMap, cohort: &PlaceholderMap) -> PlaceholderMap {
    let mut res = cohort.clone();
    res.extend(subject);
    res
}

/// The keys whose value cannot be rendered: empty texts and numbers that are not finite.
pub fn unresolved_placeholders(values: &PlaceholderMap) -> Vec<String> {
    values
        .iter()
        .filter(|(_, v)| !v.is_resolved())
        .map(|(k, _)| k.clone())
        .collect()
}

/// Applies the validation gate: the report of a subject with unresolved values is not
/// rendered. Returns false (and logs the keys) in that case.
pub fn check_resolved(report: &SubjectReport) -> bool {
    let unresolved = unresolved_placeholders(&report.values);
    if unresolved.is_empty() {
        return true;
    }
    warn!(
        "check_resolved: subject {:?} skipped, unresolved placeholders: {:?}",
        report.subject, unresolved
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::{PDF, RLE};
    use crate::testing::{sample_schema, sample_table};

    fn number(x: f64) -> PlaceholderValue {
        PlaceholderValue::Number(x)
    }

    fn text(s: &str) -> PlaceholderValue {
        PlaceholderValue::Text(s.to_string())
    }

    #[test]
    fn names_are_unique_and_cover_both_scopes() {
        let names = placeholder_names(&sample_schema());
        assert!(names.contains(&"mean_professional_2".to_string()));
        assert!(names.contains(&"cohort_mean_professional_1".to_string()));
        assert!(names.contains(&"total_involvement_3".to_string()));
        assert!(names.contains(&"improve_command".to_string()));
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }

    #[test]
    fn prepare_drops_unattributed_rows() {
        let t = prepare_table(sample_table(), &sample_schema()).unwrap();
        assert_eq!(t.len(), 6);
        assert_eq!(t.subjects("Name").unwrap(), vec!["Dana", "Avi"]);
    }

    #[test]
    fn prepare_rejects_missing_columns() {
        let mut schema = sample_schema();
        schema.extra_columns.push("Timestamp".to_string());
        assert!(matches!(
            prepare_table(sample_table(), &schema),
            Err(SurveyError::MissingColumns { .. })
        ));
    }

    #[test]
    fn cohort_values() {
        let schema = sample_schema();
        let t = prepare_table(sample_table(), &schema).unwrap();
        let cohort = cohort_stats(&t, &schema).unwrap();
        assert_eq!(cohort.get("total_general"), Some(&number(3.6)));
        assert_eq!(cohort.get("cohort_mean_professional_1"), Some(&number(3.17)));
        assert_eq!(cohort.get("cohort_mean_professional_2"), Some(&number(3.0)));
        assert_eq!(cohort.get("total_command_1"), Some(&text("50%")));
        assert_eq!(cohort.get("total_command_2"), Some(&text("33.33%")));
        assert_eq!(cohort.get("total_command_3"), Some(&text("16.67%")));
        assert!(cohort.keys().all(|k| !k.starts_with("percent_")));
    }

    #[test]
    fn subject_report() {
        let _ = env_logger::builder().is_test(true).try_init();
        let schema = sample_schema();
        let t = prepare_table(sample_table(), &schema).unwrap();
        let cohort = cohort_stats(&t, &schema).unwrap();
        let report = build_subject_report(&t, &schema, "Dana", &cohort).unwrap();
        let v = &report.values;
        assert_eq!(report.answer_count, 4);
        assert_eq!(v.get("name"), Some(&text("Dana")));
        assert_eq!(v.get("number_answers"), Some(&number(4.0)));
        assert_eq!(v.get("average_general"), Some(&number(4.0)));
        assert_eq!(v.get("std_general"), Some(&number(0.82)));
        assert_eq!(v.get("mean_professional_1"), Some(&number(4.0)));
        // Three answers left once the zeros are ignored.
        let sentinel = text(&schema.rules.too_few_answers_text);
        assert_eq!(v.get("mean_professional_2"), Some(&sentinel));
        assert_eq!(v.get("std_professional_2"), Some(&sentinel));
        assert_eq!(v.get("percent_command_1"), Some(&text("50%")));
        assert_eq!(v.get("percent_command_3"), Some(&text("25%")));
        assert_eq!(v.get("percent_involvement_1"), Some(&text("50%")));
        assert_eq!(v.get("percent_involvement_3"), Some(&text("25%")));
        // Cohort values are merged in.
        assert_eq!(v.get("total_general"), Some(&number(3.6)));

        assert_eq!(
            report.comments,
            vec![
                (
                    "Keep".to_string(),
                    vec!["Great leader".to_string(), "Clear, calm.".to_string()]
                ),
                (
                    "Improve".to_string(),
                    vec!["More feedback".to_string(), "Be on time".to_string()]
                ),
            ]
        );
        match v.get("conserve_command") {
            Some(PlaceholderValue::List(items)) => {
                assert_eq!(items.len(), 2);
                assert!(items.iter().all(|i| i.starts_with(RLE) && i.ends_with(PDF)));
            }
            other => panic!("unexpected value {:?}", other),
        }
        assert!(check_resolved(&report));
        assert!(placeholder_names(&schema).iter().all(|k| v.contains_key(k)));
    }

    #[test]
    fn small_subject_has_sentinels() {
        let schema = sample_schema();
        let t = prepare_table(sample_table(), &schema).unwrap();
        let cohort = cohort_stats(&t, &schema).unwrap();
        let report = build_subject_report(&t, &schema, "Avi", &cohort).unwrap();
        assert_eq!(
            report.value("average_general").unwrap(),
            &text(&schema.rules.too_few_answers_text)
        );
        assert_eq!(report.value("percent_command_1").unwrap(), &text("50%"));
        assert!(matches!(
            report.value("chart_professional"),
            Err(SurveyError::UnknownPlaceholder { .. })
        ));
    }

    #[test]
    fn merge_prefers_subject_values() {
        let mut cohort = PlaceholderMap::new();
        cohort.insert("a".to_string(), number(1.0));
        cohort.insert("b".to_string(), number(2.0));
        let mut subject = PlaceholderMap::new();
        subject.insert("a".to_string(), number(10.0));
        let merged = merge(subject, &cohort);
        assert_eq!(merged.get("a"), Some(&number(10.0)));
        assert_eq!(merged.get("b"), Some(&number(2.0)));
    }

    #[test]
    fn gate_names_unresolved_keys() {
        let mut values = PlaceholderMap::new();
        values.insert("ok".to_string(), text("x"));
        values.insert("empty".to_string(), text(""));
        values.insert("nan".to_string(), number(f64::NAN));
        values.insert("list".to_string(), PlaceholderValue::List(vec![]));
        assert_eq!(unresolved_placeholders(&values), vec!["empty", "nan"]);
        let report = SubjectReport {
            subject: "Dana".to_string(),
            answer_count: 1,
            values,
            comments: vec![],
        };
        assert!(!check_resolved(&report));
    }
}
