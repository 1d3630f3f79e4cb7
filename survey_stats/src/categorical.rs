// Option frequencies of multiple-choice questions.

use log::debug;

use crate::config::{ChoiceQuestion, MatchMode, StatsRules, SurveyError};
use crate::numeric::Scope;
use crate::table::{CellValue, Group};
use crate::values::{format_percent, PlaceholderMap, PlaceholderValue};

/// How many rows of a group selected each option of a question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceCounts {
    /// The size of the group: the denominator of every percentage.
    pub total: usize,
    /// One count per option, in the order of the question's options.
    pub counts: Vec<usize>,
}

impl ChoiceCounts {
    pub fn percentages(&self, decimals: u32) -> Vec<String> {
        self.counts
            .iter()
            .map(|c| format_percent(*c, self.total, decimals))
            .collect()
    }
}

/// Which options of the question are selected in a cell, by option index.
pub fn selected_options(cell: &CellValue, question: &ChoiceQuestion, rules: &StatsRules) -> Vec<bool> {
    let mut selected = vec![false; question.options.len()];
    let text = match cell.as_text() {
        Some(t) if !t.trim().is_empty() => t,
        _ => return selected,
    };
    match rules.match_mode {
        MatchMode::Contains => {
            for (idx, option) in question.options.iter().enumerate() {
                selected[idx] = !option.is_empty() && text.contains(option.as_str());
            }
        }
        MatchMode::Delimited => {
            for idx in tokenize(&text, &question.options, &rules.delimiter) {
                selected[idx] = true;
            }
        }
    }
    selected
}

/// Splits a delimiter-joined cell into option indices.
///
/// Labels are tried longest first at every position, and a label only matches when it
/// ends at a delimiter or at the end of the cell. This recognizes labels that contain
/// the delimiter. Text that matches no label is skipped up to the next delimiter.
fn tokenize(text: &str, options: &[String], delimiter: &str) -> Vec<usize> {
    let mut by_length: Vec<usize> = (0..options.len())
        .filter(|idx| !options[*idx].trim().is_empty())
        .collect();
    by_length.sort_by_key(|idx| std::cmp::Reverse(options[*idx].trim().len()));

    let mut res: Vec<usize> = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let found = by_length.iter().find_map(|idx| {
            let label = options[*idx].trim();
            let after = rest.strip_prefix(label)?;
            let after_trimmed = after.trim_start();
            if after_trimmed.is_empty() || after_trimmed.starts_with(delimiter) {
                Some((*idx, after_trimmed))
            } else {
                None
            }
        });
        let after = match found {
            Some((idx, after)) => {
                res.push(idx);
                after
            }
            None => {
                let end = match rest.find(delimiter) {
                    Some(end) if !delimiter.is_empty() => end,
                    _ => rest.len(),
                };
                debug!("tokenize: unknown option {:?} in {:?}", rest[..end].trim(), text);
                &rest[end..]
            }
        };
        rest = after.strip_prefix(delimiter).unwrap_or(after);
    }
    res
}

/// Counts the rows of the group selecting each option.
///
/// A row counts for the none option only when it selects no other option of the
/// question.
pub fn count_options(
    group: &Group,
    question: &ChoiceQuestion,
    rules: &StatsRules,
) -> Result<ChoiceCounts, SurveyError> {
    let mut counts = vec![0usize; question.options.len()];
    for cell in group.column(&question.column)? {
        let selected = selected_options(cell, question, rules);
        let any_real = selected
            .iter()
            .zip(question.options.iter())
            .any(|(s, o)| *s && !question.is_none_option(o));
        for (idx, option) in question.options.iter().enumerate() {
            if !selected[idx] {
                continue;
            }
            if question.is_none_option(option) && any_real {
                debug!(
                    "count_options: question {:?}, subject {:?}: none option selected together with other options in {:?}, not counted",
                    question.column,
                    group.key(),
                    cell
                );
                continue;
            }
            counts[idx] += 1;
        }
    }
    Ok(ChoiceCounts {
        total: group.answer_count(),
        counts,
    })
}

pub fn percent_key(prefix: &str, idx: usize) -> String {
    format!("percent_{}_{}", prefix, idx)
}

pub fn total_key(prefix: &str, idx: usize) -> String {
    format!("total_{}_{}", prefix, idx)
}

/// The percentage placeholders of one question. Options are numbered from 1.
pub fn choice_stats(
    group: &Group,
    question: &ChoiceQuestion,
    scope: Scope,
    rules: &StatsRules,
) -> Result<PlaceholderMap, SurveyError> {
    let counts = count_options(group, question, rules)?;
    let mut res = PlaceholderMap::new();
    for (idx, pct) in counts.percentages(rules.decimals).into_iter().enumerate() {
        let key = match scope {
            Scope::Subject => percent_key(&question.prefix, idx + 1),
            Scope::Cohort => total_key(&question.prefix, idx + 1),
        };
        res.insert(key, PlaceholderValue::Text(pct));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SurveyTable;

    fn question() -> ChoiceQuestion {
        ChoiceQuestion {
            column: "Traits".to_string(),
            prefix: "traits".to_string(),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "Decisive, confident".to_string(),
                "None".to_string(),
            ],
            none_option: "None".to_string(),
        }
    }

    fn table(cells: &[&str]) -> SurveyTable {
        SurveyTable::new(
            vec!["Name".to_string(), "Traits".to_string()],
            cells
                .iter()
                .map(|c| {
                    let cell = if c.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(c.to_string())
                    };
                    vec![CellValue::Text("Dana".to_string()), cell]
                })
                .collect(),
        )
    }

    fn counts(cells: &[&str], rules: &StatsRules) -> Vec<usize> {
        count_options(&table(cells).all(), &question(), rules)
            .unwrap()
            .counts
    }

    #[test]
    fn multi_select_percentages() {
        let rules = StatsRules::default();
        let t = table(&["A", "A", "A", "A,B", "A, B"]);
        let c = count_options(&t.all(), &question(), &rules).unwrap();
        assert_eq!(c.total, 5);
        assert_eq!(c.counts, vec![5, 2, 0, 0]);
        assert_eq!(c.percentages(2), vec!["100%", "40%", "0%", "0%"]);
    }

    #[test]
    fn labels_containing_the_delimiter() {
        let rules = StatsRules::default();
        assert_eq!(
            counts(&["Decisive, confident", "A,Decisive, confident", "Decisive"], &rules),
            vec![1, 0, 2, 0]
        );
    }

    #[test]
    fn none_option_is_exclusive() {
        let _ = env_logger::builder().is_test(true).try_init();
        let rules = StatsRules::default();
        assert_eq!(
            counts(&["None", "None,A", "B, None", ""], &rules),
            vec![1, 1, 0, 1]
        );
        assert_eq!(counts(&["A,None", "B,None"], &rules)[3], 0);
    }

    #[test]
    fn unknown_fragments_are_skipped() {
        let rules = StatsRules::default();
        assert_eq!(counts(&["Other,B", "AB", "A,"], &rules), vec![1, 1, 0, 0]);
    }

    #[test]
    fn contains_mode_over_counts_substrings() {
        let rules = StatsRules {
            match_mode: MatchMode::Contains,
            ..StatsRules::default()
        };
        // "A" is also found inside "AB".
        assert_eq!(counts(&["AB"], &rules), vec![1, 1, 0, 0]);
    }

    #[test]
    fn empty_group() {
        let rules = StatsRules::default();
        let t = table(&[]);
        let c = count_options(&t.all(), &question(), &rules).unwrap();
        assert_eq!(c.percentages(2), vec!["0%", "0%", "0%", "0%"]);
    }

    #[test]
    fn placeholders_by_scope() {
        let rules = StatsRules::default();
        let t = table(&["A", "B"]);
        let subject = choice_stats(&t.all(), &question(), Scope::Subject, &rules).unwrap();
        assert_eq!(
            subject.get("percent_traits_1"),
            Some(&PlaceholderValue::Text("50%".to_string()))
        );
        assert_eq!(subject.len(), 4);
        let cohort = choice_stats(&t.all(), &question(), Scope::Cohort, &rules).unwrap();
        assert!(cohort.contains_key("total_traits_4"));
    }
}
