// ********* Document fragment tree ***********
//
// The text content of a word-processing document, without its formatting. A loader
// assigns ids to paragraphs and runs so that the edited text can be written back to
// the original markup.

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct RunId(pub u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ParagraphId(pub u32);

/// A span of text sharing one formatting definition.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Run {
    pub id: RunId,
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Paragraph {
    pub id: ParagraphId,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// The visible text: all the runs, concatenated in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TableCell {
    pub blocks: Vec<Block>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// A sequence of paragraphs and tables: the body, a header or a footer.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Story {
    pub blocks: Vec<Block>,
}

impl Story {
    /// Visits every paragraph in document order, including the ones in (nested) tables.
    pub fn for_each_paragraph<F: FnMut(&Paragraph)>(&self, f: &mut F) {
        visit(&self.blocks, f);
    }

    pub fn for_each_paragraph_mut<F: FnMut(&mut Paragraph)>(&mut self, f: &mut F) {
        visit_mut(&mut self.blocks, f);
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        let mut res = Vec::new();
        self.for_each_paragraph(&mut |p| res.push(p.text()));
        res
    }
}

fn visit<F: FnMut(&Paragraph)>(blocks: &[Block], f: &mut F) {
    for block in blocks.iter() {
        match block {
            Block::Paragraph(p) => f(p),
            Block::Table(t) => {
                for row in t.rows.iter() {
                    for cell in row.cells.iter() {
                        visit(&cell.blocks, f);
                    }
                }
            }
        }
    }
}

fn visit_mut<F: FnMut(&mut Paragraph)>(blocks: &mut [Block], f: &mut F) {
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(p) => f(p),
            Block::Table(t) => {
                for row in t.rows.iter_mut() {
                    for cell in row.cells.iter_mut() {
                        visit_mut(&mut cell.blocks, f);
                    }
                }
            }
        }
    }
}

/// Header and footer of a section. Either may be absent.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Section {
    pub header: Option<Story>,
    pub footer: Option<Story>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Document {
    pub body: Story,
    pub sections: Vec<Section>,
}

impl Document {
    /// All the stories: the body first, then the header and footer of every section.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        std::iter::once(&self.body).chain(
            self.sections
                .iter()
                .flat_map(|s| s.header.iter().chain(s.footer.iter())),
        )
    }

    pub fn stories_mut(&mut self) -> impl Iterator<Item = &mut Story> {
        std::iter::once(&mut self.body).chain(
            self.sections
                .iter_mut()
                .flat_map(|s| s.header.iter_mut().chain(s.footer.iter_mut())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(id: u32, texts: &[&str]) -> Block {
        Block::Paragraph(Paragraph {
            id: ParagraphId(id),
            runs: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Run {
                    id: RunId(id * 10 + i as u32),
                    text: t.to_string(),
                })
                .collect(),
        })
    }

    #[test]
    fn paragraphs_in_nested_tables_are_visited() {
        let inner = Table {
            rows: vec![TableRow {
                cells: vec![TableCell {
                    blocks: vec![para(3, &["inner"])],
                }],
            }],
        };
        let story = Story {
            blocks: vec![
                para(1, &["a", "b"]),
                Block::Table(Table {
                    rows: vec![TableRow {
                        cells: vec![TableCell {
                            blocks: vec![para(2, &["cell"]), Block::Table(inner)],
                        }],
                    }],
                }),
                para(4, &[]),
            ],
        };
        assert_eq!(story.paragraph_texts(), vec!["ab", "cell", "inner", ""]);
    }

    #[test]
    fn stories_in_order() {
        let doc = Document {
            body: Story {
                blocks: vec![para(1, &["body"])],
            },
            sections: vec![
                Section {
                    header: Some(Story {
                        blocks: vec![para(1, &["header"])],
                    }),
                    footer: None,
                },
                Section {
                    header: None,
                    footer: Some(Story {
                        blocks: vec![para(1, &["footer"])],
                    }),
                },
            ],
        };
        let texts: Vec<Vec<String>> = doc.stories().map(|s| s.paragraph_texts()).collect();
        assert_eq!(texts, vec![vec!["body"], vec!["header"], vec!["footer"]]);
    }
}
