/*!
Embedding of right-to-left text inside left-to-right documents.

Free-text answers are mostly written in a right-to-left script but end up in documents
and charts whose default direction is left-to-right. Two things go wrong without help:
neutral characters (punctuation) at the edges of a right-to-left span get attached to
the surrounding left-to-right text, and the span as a whole gets reordered with its
neighbours.

[rtl_embed] fixes both for text stored in logical order (document runs): every neutral
punctuation character is pinned between two right-to-left marks and the whole span is
wrapped in an embedding. [rtl_embed_graphic] does the same for text that is drawn
directly (chart titles and axis labels), which must be supplied in visual order.
*/

use std::borrow::Cow;

use unicode_bidi::BidiInfo;

/// RIGHT-TO-LEFT EMBEDDING, opens the embedded span.
pub const RLE: char = '\u{202B}';
/// POP DIRECTIONAL FORMATTING, closes the embedded span.
pub const PDF: char = '\u{202C}';
/// RIGHT-TO-LEFT MARK, a zero-width strong right-to-left character.
pub const RLM: char = '\u{200F}';

pub const DEFAULT_PUNCTUATION: &[char] = &[
    ',', '.', '"', '\\', '-', ':', ';', '(', ')', '!', '?', '+', '/',
];

/// Embeds a text for storage in a left-to-right document.
///
/// Empty and whitespace-only texts are returned unchanged. Other texts are trimmed,
/// then each character of `punctuation` is surrounded with [RLM] and the result is
/// wrapped between [RLE] and [PDF].
pub fn rtl_embed(text: &str, punctuation: &[char]) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return text.to_string();
    }
    wrap(trimmed, punctuation)
}

/// Like [rtl_embed], for text that is rendered as graphics.
///
/// The text is first put in visual order with the Unicode Bidirectional Algorithm, each
/// paragraph taking its base direction from its first strong character.
pub fn rtl_embed_graphic(text: &str, punctuation: &[char]) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return text.to_string();
    }
    wrap(&visual_order(trimmed), punctuation)
}

/// The visual order of a text, paragraph by paragraph.
pub fn visual_order(text: &str) -> String {
    let info = BidiInfo::new(text, None);
    let mut res = String::with_capacity(text.len());
    for para in info.paragraphs.iter() {
        let line = para.range.clone();
        let reordered: Cow<'_, str> = info.reorder_line(para, line);
        res.push_str(&reordered);
    }
    res
}

fn wrap(text: &str, punctuation: &[char]) -> String {
    let mut res = String::with_capacity(text.len() + 8);
    res.push(RLE);
    for c in text.chars() {
        if punctuation.contains(&c) {
            res.push(RLM);
            res.push(c);
            res.push(RLM);
        } else {
            res.push(c);
        }
    }
    res.push(PDF);
    res
}
