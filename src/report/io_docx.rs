/*!
Reading and writing `.docx` templates.

A `.docx` file is a zip package of xml parts. The body lives in `word/document.xml`;
the headers and footers live in their own parts, referenced from the section
properties (`w:sectPr`) of the body through `word/_rels/document.xml.rels`.

Each part is kept as a tree of xml events. Paragraphs (`w:p`) and text elements
(`w:t`) receive ids while parsing, so that the text model of `survey_stats::document`
can be edited and the new texts written back to the same elements. Everything else
(formatting, drawings, other parts of the package) is written back untouched.

Only the default header and footer of each section are filled. First-page and
even-page variants are left as they are.
*/

use log::{debug, info};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use snafu::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use survey_stats::document::{
    Block, Document, Paragraph, ParagraphId, Run, RunId, Section, Story, Table, TableCell,
    TableRow,
};
use survey_stats::substitute::{find_list_paragraphs, substitute_document, ListExpansion};
use survey_stats::PlaceholderMap;

use crate::report::{
    ParsingXmlSnafu, ReadingDocxSnafu, ReportResult, WritingDocxSnafu, WritingXmlSnafu,
};

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

const PARAGRAPH: &[u8] = b"w:p";
const TEXT: &[u8] = b"w:t";
const TABLE: &[u8] = b"w:tbl";
const TABLE_ROW: &[u8] = b"w:tr";
const TABLE_CELL: &[u8] = b"w:tc";
const TEXTBOX: &[u8] = b"w:txbxContent";
const SECTION_PROPERTIES: &[u8] = b"w:sectPr";
const HEADER_REFERENCE: &[u8] = b"w:headerReference";
const FOOTER_REFERENCE: &[u8] = b"w:footerReference";

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    // Written back as a self-closing tag when it is still childless.
    empty: bool,
    // Set for paragraphs and text elements.
    id: Option<u32>,
}

impl Element {
    fn new(start: BytesStart<'static>, empty: bool, ids: &mut u32) -> Element {
        let name = start.name();
        let id = if name.as_ref() == PARAGRAPH || name.as_ref() == TEXT {
            *ids += 1;
            Some(*ids)
        } else {
            None
        };
        Element {
            start,
            children: Vec::new(),
            empty,
            id,
        }
    }

    fn is(&self, name: &[u8]) -> bool {
        self.start.name().as_ref() == name
    }

    fn attribute(&self, key: &[u8]) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == key)
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    fn text(&self, part: &str) -> ReportResult<String> {
        let mut res = String::new();
        for child in self.children.iter() {
            if let Node::Other(Event::Text(t)) = child {
                res.push_str(&t.unescape().context(ParsingXmlSnafu { part })?);
            }
        }
        Ok(res)
    }

    fn set_text(&mut self, text: &str) {
        self.children = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::Other(Event::Text(BytesText::new(text).into_owned()))]
        };
        self.empty = false;
        if self.attribute(b"xml:space").is_none() {
            self.start.push_attribute(("xml:space", "preserve"));
        }
    }
}

#[derive(Debug, Clone)]
struct TemplatePart {
    name: String,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

fn push_node(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn parse_part(name: &str, xml: &str, ids: &mut u32) -> ReportResult<TemplatePart> {
    let mut reader = Reader::from_str(xml);
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    loop {
        let event = reader.read_event().context(ParsingXmlSnafu { part: name })?;
        match event {
            Event::Eof => break,
            Event::Start(e) => stack.push(Element::new(e.into_owned(), false, ids)),
            Event::Empty(e) => {
                let el = Element::new(e.into_owned(), true, ids);
                push_node(&mut stack, &mut roots, Node::Element(el));
            }
            Event::End(_) => match stack.pop() {
                Some(el) => push_node(&mut stack, &mut roots, Node::Element(el)),
                None => whatever!("Unbalanced closing tag in {}", name),
            },
            other => push_node(&mut stack, &mut roots, Node::Other(other.into_owned())),
        }
    }
    if !stack.is_empty() {
        whatever!("Unclosed elements at the end of {}", name);
    }
    Ok(TemplatePart {
        name: name.to_string(),
        nodes: roots,
    })
}

fn serialize_part(part: &TemplatePart) -> ReportResult<Vec<u8>> {
    fn write_nodes(writer: &mut Writer<Vec<u8>>, nodes: &[Node]) -> quick_xml::Result<()> {
        for node in nodes.iter() {
            match node {
                Node::Element(el) if el.empty && el.children.is_empty() => {
                    writer.write_event(Event::Empty(el.start.borrow()))?;
                }
                Node::Element(el) => {
                    writer.write_event(Event::Start(el.start.borrow()))?;
                    write_nodes(writer, &el.children)?;
                    writer.write_event(Event::End(el.start.to_end()))?;
                }
                Node::Other(e) => writer.write_event(e)?,
            }
        }
        Ok(())
    }
    let mut writer = Writer::new(Vec::new());
    write_nodes(&mut writer, &part.nodes).context(WritingXmlSnafu {
        part: part.name.as_str(),
    })?;
    Ok(writer.into_inner())
}

// ********* Text model ***********

fn collect_runs(nodes: &[Node], part: &str, runs: &mut Vec<Run>) -> ReportResult<()> {
    for node in nodes.iter() {
        if let Node::Element(el) = node {
            if el.is(TEXT) {
                if let Some(id) = el.id {
                    runs.push(Run {
                        id: RunId(id),
                        text: el.text(part)?,
                    });
                }
            } else if !el.is(TEXTBOX) {
                collect_runs(&el.children, part, runs)?;
            }
        }
    }
    Ok(())
}

fn read_table(el: &Element, part: &str) -> ReportResult<Table> {
    let mut rows = Vec::new();
    for row in child_elements(el, TABLE_ROW) {
        let mut cells = Vec::new();
        for cell in child_elements(row, TABLE_CELL) {
            let mut blocks = Vec::new();
            collect_blocks(&cell.children, part, &mut blocks)?;
            cells.push(TableCell { blocks });
        }
        rows.push(TableRow { cells });
    }
    Ok(Table { rows })
}

fn child_elements<'a>(el: &'a Element, name: &'a [u8]) -> impl Iterator<Item = &'a Element> {
    el.children.iter().filter_map(move |n| match n {
        Node::Element(c) if c.is(name) => Some(c),
        _ => None,
    })
}

// Containers that are neither paragraphs nor tables (content controls, the body
// itself) are looked through.
fn collect_blocks(nodes: &[Node], part: &str, blocks: &mut Vec<Block>) -> ReportResult<()> {
    for node in nodes.iter() {
        if let Node::Element(el) = node {
            if el.is(PARAGRAPH) {
                if let Some(id) = el.id {
                    let mut runs = Vec::new();
                    collect_runs(&el.children, part, &mut runs)?;
                    blocks.push(Block::Paragraph(Paragraph {
                        id: ParagraphId(id),
                        runs,
                    }));
                }
            } else if el.is(TABLE) {
                blocks.push(Block::Table(read_table(el, part)?));
            } else {
                collect_blocks(&el.children, part, blocks)?;
            }
        }
    }
    Ok(())
}

fn read_story(part: &TemplatePart) -> ReportResult<Story> {
    let mut blocks = Vec::new();
    collect_blocks(&part.nodes, &part.name, &mut blocks)?;
    Ok(Story { blocks })
}

fn find_section_properties<'a>(nodes: &'a [Node], res: &mut Vec<&'a Element>) {
    for node in nodes.iter() {
        if let Node::Element(el) = node {
            if el.is(SECTION_PROPERTIES) {
                res.push(el);
            } else {
                find_section_properties(&el.children, res);
            }
        }
    }
}

/// The relationship id of the default header or footer of a section.
fn default_reference(section: &Element, name: &[u8]) -> Option<String> {
    child_elements(section, name)
        .find(|r| matches!(r.attribute(b"w:type").as_deref(), None | Some("default")))
        .and_then(|r| r.attribute(b"r:id"))
}

fn read_relationships(xml: &str) -> ReportResult<HashMap<String, String>> {
    let mut ids = 0;
    let part = parse_part(DOCUMENT_RELS, xml, &mut ids)?;
    let mut res = HashMap::new();
    let mut stack: Vec<&Node> = part.nodes.iter().collect();
    while let Some(node) = stack.pop() {
        if let Node::Element(el) = node {
            if el.is(b"Relationship") {
                if let (Some(id), Some(target)) = (el.attribute(b"Id"), el.attribute(b"Target")) {
                    res.insert(id, target);
                }
            }
            stack.extend(el.children.iter());
        }
    }
    Ok(res)
}

fn part_name(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{}", target),
    }
}

// ********* Rendering helpers ***********

fn run_texts(doc: &Document) -> Vec<(RunId, String)> {
    let mut res = Vec::new();
    for story in doc.stories() {
        story.for_each_paragraph(&mut |p: &Paragraph| {
            for r in p.runs.iter() {
                res.push((r.id, r.text.clone()));
            }
        });
    }
    res
}

fn write_texts(nodes: &mut [Node], texts: &HashMap<u32, String>) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            match el.id.and_then(|id| texts.get(&id)) {
                Some(text) if el.is(TEXT) => el.set_text(text),
                _ => write_texts(&mut el.children, texts),
            }
        }
    }
}

fn fill_list_item(nodes: &mut [Node], item: &str, first: &mut bool) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is(TEXT) {
                el.set_text(if *first { item } else { "" });
                *first = false;
            } else if !el.is(TEXTBOX) {
                fill_list_item(&mut el.children, item, first);
            }
        }
    }
}

fn is_block(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.is(PARAGRAPH) || el.is(TABLE))
}

/// Replaces each list paragraph with one copy per item. A list without items removes
/// its paragraph, except when it is the last block of a table cell: a cell keeps one
/// emptied copy.
fn expand_lists(nodes: &mut Vec<Node>, lists: &HashMap<u32, &ListExpansion>, in_cell: bool) {
    let old = std::mem::take(nodes);
    let mut dropped: Option<(usize, Element)> = None;
    for node in old.into_iter() {
        match node {
            Node::Element(mut el) => {
                let expansion = el
                    .id
                    .filter(|_| el.is(PARAGRAPH))
                    .and_then(|id| lists.get(&id));
                if let Some(expansion) = expansion {
                    debug!(
                        "expand_lists: paragraph {:?}: {} items",
                        expansion.paragraph,
                        expansion.items.len()
                    );
                    for item in expansion.items.iter() {
                        let mut copy = el.clone();
                        fill_list_item(&mut copy.children, item, &mut true);
                        nodes.push(Node::Element(copy));
                    }
                    if expansion.items.is_empty() && dropped.is_none() {
                        dropped = Some((nodes.len(), el));
                    }
                } else {
                    let cell = el.is(TABLE_CELL);
                    expand_lists(&mut el.children, lists, cell);
                    nodes.push(Node::Element(el));
                }
            }
            other => nodes.push(other),
        }
    }
    if in_cell && !nodes.iter().any(is_block) {
        if let Some((idx, mut el)) = dropped {
            fill_list_item(&mut el.children, "", &mut true);
            nodes.insert(idx, Node::Element(el));
        }
    }
}

/// A parsed template. Parsing is done once; each rendering works on a copy.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    path: String,
    entries: Vec<PackageEntry>,
    parts: Vec<TemplatePart>,
    document: Document,
    // The part of each story, in the order of `Document::stories`.
    story_parts: Vec<usize>,
}

impl DocxTemplate {
    pub fn open(path: &Path) -> ReportResult<DocxTemplate> {
        let path_s = path.display().to_string();
        let bytes = fs::read(path)
            .map_err(ZipError::from)
            .context(ReadingDocxSnafu { path: path_s.clone() })?;
        let template = DocxTemplate::from_bytes(&path_s, bytes)?;
        info!(
            "DocxTemplate::open: {}: {} xml parts parsed",
            path_s,
            template.parts.len()
        );
        Ok(template)
    }

    fn from_bytes(path: &str, bytes: Vec<u8>) -> ReportResult<DocxTemplate> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).context(ReadingDocxSnafu { path })?;
        let mut entries = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let mut file = archive.by_index(idx).context(ReadingDocxSnafu { path })?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(ZipError::from)
                .context(ReadingDocxSnafu { path })?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }
        let entry_text = |name: &str| -> Option<String> {
            entries
                .iter()
                .find(|e| e.name == name)
                .map(|e| String::from_utf8_lossy(&e.data).into_owned())
        };

        let mut ids = 0u32;
        let body_xml = match entry_text(DOCUMENT_PART) {
            Some(xml) => xml,
            None => whatever!("{} is not a document: no {} found", path, DOCUMENT_PART),
        };
        let body_part = parse_part(DOCUMENT_PART, &body_xml, &mut ids)?;
        let body = read_story(&body_part)?;
        let relationships = match entry_text(DOCUMENT_RELS) {
            Some(xml) => read_relationships(&xml)?,
            None => HashMap::new(),
        };

        let mut parts: Vec<TemplatePart> = Vec::new();
        let mut story_parts: Vec<usize> = vec![0];
        let mut sections: Vec<Section> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut section_elements = Vec::new();
        find_section_properties(&body_part.nodes, &mut section_elements);
        let mut read_reference = |section: &Element,
                                  reference: &[u8],
                                  parts: &mut Vec<TemplatePart>,
                                  story_parts: &mut Vec<usize>|
         -> ReportResult<Option<Story>> {
            let name = match default_reference(section, reference)
                .and_then(|id| relationships.get(&id))
                .map(|target| part_name(target))
            {
                Some(name) => name,
                None => return Ok(None),
            };
            if !seen.insert(name.clone()) {
                return Ok(None);
            }
            let xml = match entry_text(&name) {
                Some(xml) => xml,
                None => {
                    debug!("DocxTemplate: referenced part {} is missing", name);
                    return Ok(None);
                }
            };
            let part = parse_part(&name, &xml, &mut ids)?;
            let story = read_story(&part)?;
            story_parts.push(parts.len() + 1);
            parts.push(part);
            Ok(Some(story))
        };
        for section in section_elements.iter() {
            let header = read_reference(section, HEADER_REFERENCE, &mut parts, &mut story_parts)?;
            let footer = read_reference(section, FOOTER_REFERENCE, &mut parts, &mut story_parts)?;
            sections.push(Section { header, footer });
        }
        parts.insert(0, body_part);

        Ok(DocxTemplate {
            path: path.to_string(),
            entries,
            parts,
            document: Document { body, sections },
            story_parts,
        })
    }

    /// The text model of the template, before any substitution.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Fills the template with the values of one subject and returns the bytes of
    /// the new package.
    pub fn render(&self, values: &PlaceholderMap) -> ReportResult<Vec<u8>> {
        let mut doc = self.document.clone();
        let changed = substitute_document(&mut doc, values);
        let texts: HashMap<u32, String> = run_texts(&self.document)
            .into_iter()
            .zip(run_texts(&doc))
            .filter(|((_, before), (_, after))| before != after)
            .map(|(_, (id, after))| (id.0, after))
            .collect();
        debug!(
            "render: {}: {} paragraphs changed, {} text elements rewritten",
            self.path,
            changed,
            texts.len()
        );

        let mut parts = self.parts.clone();
        for part in parts.iter_mut() {
            write_texts(&mut part.nodes, &texts);
        }
        for (story, part_idx) in doc.stories().zip(self.story_parts.iter()) {
            let expansions = find_list_paragraphs(story, values);
            if expansions.is_empty() {
                continue;
            }
            let lists: HashMap<u32, &ListExpansion> =
                expansions.iter().map(|e| (e.paragraph.0, e)).collect();
            if let Some(part) = parts.get_mut(*part_idx) {
                expand_lists(&mut part.nodes, &lists, false);
            }
        }

        let path = self.path.as_str();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in self.entries.iter() {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)
                    .context(WritingDocxSnafu { path })?;
                continue;
            }
            let data = match parts.iter().find(|p| p.name == entry.name) {
                Some(part) => serialize_part(part)?,
                None => entry.data.clone(),
            };
            zip.start_file(entry.name.as_str(), options)
                .context(WritingDocxSnafu { path })?;
            zip.write_all(&data)
                .map_err(ZipError::from)
                .context(WritingDocxSnafu { path })?;
        }
        let cursor = zip.finish().context(WritingDocxSnafu { path })?;
        Ok(cursor.into_inner())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::report::ReportError;
    use survey_stats::PlaceholderValue;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {}><w:body>{}</w:body></w:document>"#,
            NS, body
        )
    }

    fn values() -> PlaceholderMap {
        let mut m = PlaceholderMap::new();
        m.insert("name".to_string(), PlaceholderValue::Text("Dana".to_string()));
        m.insert("unit".to_string(), PlaceholderValue::Text("A & B".to_string()));
        m.insert("number_answers".to_string(), PlaceholderValue::Number(4.0));
        m.insert(
            "bullets".to_string(),
            PlaceholderValue::List(vec!["first".to_string(), "second".to_string()]),
        );
        m.insert("nothing".to_string(), PlaceholderValue::List(vec![]));
        m
    }

    fn template(entries: &[(&str, &str)]) -> DocxTemplate {
        DocxTemplate::from_bytes("test.docx", docx_bytes(entries)).unwrap()
    }

    #[test]
    fn split_token_keeps_formatting() {
        let body = document(
            r#"<w:p><w:r><w:t>Hello {{na</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>me}}</w:t></w:r></w:p>"#,
        );
        let t = template(&[(DOCUMENT_PART, &body)]);
        assert_eq!(t.document().body.paragraph_texts(), vec!["Hello {{name}}"]);
        let out = read_part(&t.render(&values()).unwrap(), DOCUMENT_PART);
        assert!(out.contains(r#"<w:t xml:space="preserve">Hello Dana</w:t>"#));
        assert!(out.contains(r#"<w:rPr><w:i/></w:rPr><w:t xml:space="preserve"></w:t>"#));
    }

    #[test]
    fn values_are_escaped_and_unknown_tokens_kept() {
        let body = document(
            r#"<w:p><w:r><w:t xml:space="preserve">{{unit}} &amp; {{missing}}</w:t></w:r></w:p>"#,
        );
        let t = template(&[(DOCUMENT_PART, &body)]);
        assert_eq!(t.document().body.paragraph_texts(), vec!["{{unit}} & {{missing}}"]);
        let out = read_part(&t.render(&values()).unwrap(), DOCUMENT_PART);
        assert!(out.contains(r#"<w:t xml:space="preserve">A &amp; B &amp; {{missing}}</w:t>"#));
    }

    #[test]
    fn tables_and_lists() {
        let body = document(concat!(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{number_answers}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            r#"<w:p><w:pPr><w:numPr/></w:pPr><w:r><w:t> {{bullets}} </w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>{{nothing}}</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>end</w:t></w:r></w:p>"#,
        ));
        let t = template(&[(DOCUMENT_PART, &body)]);
        let out = read_part(&t.render(&values()).unwrap(), DOCUMENT_PART);
        assert!(out.contains(r#"<w:tc><w:p><w:r><w:t xml:space="preserve">4</w:t>"#));
        assert_eq!(out.matches("<w:numPr/>").count(), 2);
        assert!(out.contains(r#"<w:t xml:space="preserve">first</w:t>"#));
        assert!(out.contains(r#"<w:t xml:space="preserve">second</w:t>"#));
        assert!(!out.contains("{{"));
        assert!(out.contains("<w:t>end</w:t>"));
    }

    #[test]
    fn empty_list_keeps_a_paragraph_in_its_cell() {
        let body = document(concat!(
            r#"<w:tbl><w:tr>"#,
            r#"<w:tc><w:tcPr/><w:p><w:pPr><w:numPr/></w:pPr><w:r><w:t>{{nothing}}</w:t></w:r></w:p></w:tc>"#,
            r#"<w:tc><w:p><w:r><w:t>{{nothing}}</w:t></w:r></w:p><w:p><w:r><w:t>kept</w:t></w:r></w:p></w:tc>"#,
            r#"</w:tr></w:tbl>"#,
            r#"<w:p><w:r><w:t>{{nothing}}</w:t></w:r></w:p>"#,
        ));
        let t = template(&[(DOCUMENT_PART, &body)]);
        let out = read_part(&t.render(&values()).unwrap(), DOCUMENT_PART);
        // The only paragraph of the first cell stays, emptied.
        assert!(out.contains(
            r#"<w:tc><w:tcPr/><w:p><w:pPr><w:numPr/></w:pPr><w:r><w:t xml:space="preserve"></w:t></w:r></w:p></w:tc>"#
        ));
        // The second cell still has a paragraph: the list paragraph goes.
        assert!(out.contains(r#"<w:tc><w:p><w:r><w:t>kept</w:t></w:r></w:p></w:tc>"#));
        // Outside of tables, the paragraph goes.
        assert!(out.contains("</w:tbl></w:body>"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn headers_and_footers() {
        let body = document(concat!(
            r#"<w:p><w:r><w:t>body</w:t></w:r></w:p>"#,
            r#"<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:headerReference w:type="first" r:id="rId3"/></w:sectPr></w:pPr></w:p>"#,
            r#"<w:sectPr><w:headerReference w:type="default" r:id="rId1"/><w:footerReference r:id="rId2"/></w:sectPr>"#,
        ));
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Target="header1.xml"/><Relationship Id="rId2" Target="/word/footer1.xml"/><Relationship Id="rId3" Target="header2.xml"/></Relationships>"#;
        let header = format!(r#"<w:hdr {}><w:p><w:r><w:t>{{{{name}}}}</w:t></w:r></w:p></w:hdr>"#, NS);
        let first = format!(r#"<w:hdr {}><w:p><w:r><w:t>{{{{name}}}}</w:t></w:r></w:p></w:hdr>"#, NS);
        let footer = format!(
            r#"<w:ftr {}><w:p><w:r><w:t>{{{{number_answers}}}} answers</w:t></w:r></w:p></w:ftr>"#,
            NS
        );
        let t = template(&[
            ("[Content_Types].xml", "<Types/>"),
            (DOCUMENT_PART, &body),
            (DOCUMENT_RELS, rels),
            ("word/header1.xml", &header),
            ("word/header2.xml", &first),
            ("word/footer1.xml", &footer),
        ]);
        // The header shared by both sections is read once.
        assert_eq!(t.document().sections.len(), 2);
        assert!(t.document().sections[0].header.is_some());
        assert!(t.document().sections[1].header.is_none());
        assert_eq!(t.document().stories().count(), 3);

        let docx = t.render(&values()).unwrap();
        assert!(read_part(&docx, "word/header1.xml").contains(">Dana</w:t>"));
        assert!(read_part(&docx, "word/footer1.xml").contains(">4 answers</w:t>"));
        assert!(read_part(&docx, "word/header2.xml").contains("{{name}}"));
        assert_eq!(read_part(&docx, "[Content_Types].xml"), "<Types/>");
    }

    #[test]
    fn renders_are_independent() {
        let body = document(r#"<w:p><w:r><w:t>{{name}}</w:t></w:r></w:p>"#);
        let t = template(&[(DOCUMENT_PART, &body)]);
        let mut other = values();
        other.insert("name".to_string(), PlaceholderValue::Text("Avi".to_string()));
        let first = read_part(&t.render(&values()).unwrap(), DOCUMENT_PART);
        let second = read_part(&t.render(&other).unwrap(), DOCUMENT_PART);
        assert!(first.contains(">Dana<"));
        assert!(second.contains(">Avi<"));
    }

    #[test]
    fn not_a_document() {
        let bytes = docx_bytes(&[("word/styles.xml", "<w:styles/>")]);
        assert!(matches!(
            DocxTemplate::from_bytes("test.docx", bytes),
            Err(ReportError::Whatever { .. })
        ));
        assert!(matches!(
            DocxTemplate::from_bytes("test.docx", b"not a zip".to_vec()),
            Err(ReportError::ReadingDocx { .. })
        ));
        assert!(matches!(
            DocxTemplate::open(Path::new("/nonexistent/template.docx")),
            Err(ReportError::ReadingDocx { .. })
        ));
    }
}
