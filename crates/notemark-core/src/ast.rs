use std::path::PathBuf;

pub type InlineSeq = Vec<Inline>;

/// A fully parsed Notemark document: validated front-matter metadata, the
/// mandatory title, and the block tree in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub title: String,
    pub meta: Meta,
    pub blocks: Vec<Block>,
}

/// Optional front-matter fields. `base_dir` is the absolute directory of the
/// source file when the caller supplied a path; `local:` image references are
/// resolved against it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    pub author: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
    pub base_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        content: InlineSeq,
    },
    Paragraph {
        content: InlineSeq,
        /// Set when the paragraph runs directly into a fenced block; the
        /// stylesheet uses it to tighten the gap.
        tight_after: bool,
    },
    List(List),
    Table(Table),
    BlockQuote {
        children: Vec<Block>,
    },
    Callout {
        title: InlineSeq,
        color: String,
        children: Vec<Block>,
    },
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    Diagram {
        language: String,
        text: String,
    },
    MathBlock {
        text: String,
    },
    Rule,
}

#[derive(Clone, Debug, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub content: InlineSeq,
    /// `None` for a plain item, `Some(false)`/`Some(true)` for `[ ]`/`[x]`.
    pub checkbox: Option<bool>,
    pub nested: Option<List>,
}

/// Header and body cells are kept independent; no equality constraint is
/// enforced between their lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub header: Vec<InlineSeq>,
    pub rows: Vec<Vec<InlineSeq>>,
}

/// Inline spans are leaves: their delimited text is kept raw and is not
/// re-parsed for further nesting.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Highlight(String),
    Strike(String),
    Code(String),
    Link {
        text: String,
        url: String,
    },
    Image {
        alt: String,
        url: String,
        width_percent: Option<f64>,
    },
    MathInline(String),
    LineBreak,
}
