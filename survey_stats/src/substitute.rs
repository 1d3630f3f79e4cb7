/*!
Placeholder substitution that keeps the run structure of a document.

A placeholder is the literal token `{{name}}`. Word processors split text into runs
wherever the formatting (or the editing history) changes, so a token is often spread
over several runs: `["{{", "name", "}}!"]`. Substitution therefore works on the logical
string of a paragraph (all its runs concatenated), then cuts the new string back into
the original runs:

1. Only the runs with some text take part. A paragraph without such runs is skipped.
2. The texts of those runs are concatenated and their lengths (in characters) recorded.
3. Without any `{{` in the logical string, the paragraph is left alone.
4. Every token whose name has an inline value is replaced. The string is scanned once:
   a value that contains token syntax is inserted verbatim and never substituted again.
   Unknown names and list values stay in place.
5. The new string is cut into slices of the recorded lengths, one per run, in order. The
   last run also receives whatever is left when the string grew.

The cut is positional: when the lengths change a lot, formatting may end up on other
characters than in the template. No run is ever added, removed or reformatted.
*/

use log::debug;

use crate::document::{Document, Paragraph, ParagraphId, Story};
use crate::values::{PlaceholderMap, PlaceholderValue};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces every known token of the text in one pass.
pub fn replace_tokens(text: &str, values: &PlaceholderMap) -> String {
    let mut res = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        res.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let replacement = after_open.find(CLOSE).and_then(|end| {
            let name = &after_open[..end];
            let value = values.get(name)?.as_inline()?;
            Some((value, end + CLOSE.len()))
        });
        match replacement {
            Some((value, consumed)) => {
                res.push_str(&value);
                rest = &after_open[consumed..];
            }
            None => {
                res.push_str(OPEN);
                rest = after_open;
            }
        }
    }
    res.push_str(rest);
    res
}

/// Cuts a text into consecutive slices of the given lengths, in characters.
///
/// The last slice also takes the remaining characters, so that the slices always
/// concatenate to the text. Slices past the end of the text are empty.
pub fn reslice(text: &str, lengths: &[usize]) -> Vec<String> {
    let mut res: Vec<String> = Vec::with_capacity(lengths.len());
    let mut chars = text.chars();
    for (idx, len) in lengths.iter().enumerate() {
        if idx + 1 == lengths.len() {
            res.push(chars.by_ref().collect());
        } else {
            res.push(chars.by_ref().take(*len).collect());
        }
    }
    res
}

/// Substitutes the tokens of one paragraph. Returns true if its text changed.
pub fn substitute_paragraph(paragraph: &mut Paragraph, values: &PlaceholderMap) -> bool {
    let text_runs: Vec<usize> = (0..paragraph.runs.len())
        .filter(|idx| !paragraph.runs[*idx].text.is_empty())
        .collect();
    if text_runs.is_empty() {
        return false;
    }
    let logical: String = text_runs
        .iter()
        .map(|idx| paragraph.runs[*idx].text.as_str())
        .collect();
    if !logical.contains(OPEN) {
        return false;
    }
    let replaced = replace_tokens(&logical, values);
    if replaced == logical {
        return false;
    }
    let lengths: Vec<usize> = text_runs
        .iter()
        .map(|idx| paragraph.runs[*idx].text.chars().count())
        .collect();
    for (idx, slice) in text_runs.iter().zip(reslice(&replaced, &lengths)) {
        paragraph.runs[*idx].text = slice;
    }
    debug!(
        "substitute_paragraph: paragraph {:?}: {:?} -> {:?}",
        paragraph.id, logical, replaced
    );
    true
}

/// Substitutes every paragraph of a story, tables included. Returns the number of
/// paragraphs that changed.
pub fn substitute_story(story: &mut Story, values: &PlaceholderMap) -> usize {
    let mut changed = 0;
    story.for_each_paragraph_mut(&mut |p| {
        if substitute_paragraph(p, values) {
            changed += 1;
        }
    });
    changed
}

/// Substitutes the body and every header and footer.
pub fn substitute_document(doc: &mut Document, values: &PlaceholderMap) -> usize {
    doc.stories_mut()
        .map(|story| substitute_story(story, values))
        .sum()
}

/// A paragraph that stands for a bullet list: its only content is the token of a list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ListExpansion {
    pub paragraph: ParagraphId,
    pub items: Vec<String>,
}

/// The paragraphs of a story whose trimmed text is exactly `{{key}}` for a list value.
pub fn find_list_paragraphs(story: &Story, values: &PlaceholderMap) -> Vec<ListExpansion> {
    let mut res = Vec::new();
    story.for_each_paragraph(&mut |p| {
        let text = p.text();
        let name = text
            .trim()
            .strip_prefix(OPEN)
            .and_then(|t| t.strip_suffix(CLOSE));
        if let Some(PlaceholderValue::List(items)) = name.and_then(|n| values.get(n)) {
            res.push(ListExpansion {
                paragraph: p.id,
                items: items.clone(),
            });
        }
    });
    res
}
