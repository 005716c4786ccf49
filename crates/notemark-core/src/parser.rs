use crate::ast::{Block, Document, Inline, List, ListItem, Meta, Table};
use crate::error::ParseError;
use crate::inline::parse_inline;
use crate::progress::{Checkpoint, NoProgress, Progress};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The dialect version the parser accepts in the front-matter version marker.
pub const NOTEMARK_VERSION: &str = "1.0";

const VERSION_KEY: &str = "Notemark-Version";
const TITLE_PREFIX: &str = "#* ";

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<#.*?#>").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap());
static MATH_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$\$(.+?)\$\$").unwrap());
static CALLOUT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([^\]]+)\]\s*\{([^}]+)\}\s*$").unwrap());
static CALLOUT_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[;\s])(?:colour|color)\s*:\s*([^;]+)").unwrap());
static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").unwrap());
static SEPARATOR_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-{3,}:?$").unwrap());
static ORDERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.").unwrap());

/// Parses a complete Notemark source text into a [`Document`].
///
/// `source_path` is only used to derive the base directory for `local:` image
/// references; no file is read here.
pub fn parse(source: &str, source_path: Option<&Path>) -> Result<Document, ParseError> {
    parse_with_progress(source, source_path, &mut NoProgress)
}

/// Same as [`parse`], reporting [`Checkpoint::ParseStart`] and
/// [`Checkpoint::TreeBuilt`] to the observer.
pub fn parse_with_progress(
    source: &str,
    source_path: Option<&Path>,
    progress: &mut dyn Progress,
) -> Result<Document, ParseError> {
    progress.checkpoint(Checkpoint::ParseStart);

    let text = source.replace("\r\n", "\n").replace('\r', "\n");
    let text = strip_comments(&text);
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let mut idx = 0;

    if lines.first().map(|line| line.trim()) != Some("---") {
        return Err(ParseError::at(1, "Missing front-matter header"));
    }
    idx += 1;

    let mut header: HashMap<String, String> = HashMap::new();
    while idx < lines.len() && lines[idx].trim() != "---" {
        let line = &lines[idx];
        let Some((key, value)) = line.split_once(':') else {
            return Err(ParseError::at(idx + 1, format!("Invalid header line: {line}")));
        };
        header.insert(key.trim().to_string(), value.trim().to_string());
        idx += 1;
    }

    if header.get(VERSION_KEY).map(String::as_str) != Some(NOTEMARK_VERSION) {
        return Err(ParseError::new("Unsupported Notemark version"));
    }

    let author = header.get("author").cloned();
    if author.as_deref().is_some_and(|value| value.trim().is_empty()) {
        return Err(ParseError::new("Header author cannot be empty"));
    }
    let date = header.get("date").cloned();
    if let Some(date) = date.as_deref() {
        if !DATE.is_match(date) {
            return Err(ParseError::new(
                "Header date must use D.M.YYYY format (e.g. 1.1.2026)",
            ));
        }
    }
    let tags = match header.get("tags") {
        Some(raw) => {
            let list: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
            if list.is_empty() {
                return Err(ParseError::new("Header tags cannot be empty"));
            }
            Some(list)
        }
        None => None,
    };

    idx += 1;
    if idx >= lines.len() {
        return Err(ParseError::at(idx + 1, "Missing document title"));
    }
    let title_line = &lines[idx];
    if !title_line.starts_with(TITLE_PREFIX) {
        return Err(ParseError::at(
            idx + 1,
            "Document title must be the first line after the header",
        ));
    }
    let title = title_line[TITLE_PREFIX.len()..].trim().to_string();
    idx += 1;
    if title.is_empty() {
        return Err(ParseError::at(idx, "Missing document title"));
    }

    let blocks = parse_blocks(&lines[idx..], idx + 1)?;
    progress.checkpoint(Checkpoint::TreeBuilt);

    let base_dir = source_path.and_then(base_dir_of);
    Ok(Document {
        title,
        meta: Meta {
            author,
            date,
            tags,
            base_dir,
        },
        blocks,
    })
}

/// Removes `<# ... #>` comment spans, substituting the same number of
/// newlines so later error messages keep their line numbers.
fn strip_comments(text: &str) -> String {
    COMMENT
        .replace_all(text, |caps: &Captures| {
            "\n".repeat(caps[0].matches('\n').count())
        })
        .into_owned()
}

fn base_dir_of(path: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    absolute.parent().map(Path::to_path_buf)
}

/// Recursive block parser. `start_line` is the 1-based source line of
/// `lines[0]`, threaded through nested calls so errors inside blockquotes and
/// lists report global line numbers.
fn parse_blocks(lines: &[String], start_line: usize) -> Result<Vec<Block>, ParseError> {
    let mut children = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        let line_no = start_line + idx;

        if line.trim().is_empty() {
            idx += 1;
            continue;
        }

        // Display math fence.
        if line.trim() == "$$" {
            idx += 1;
            let open = idx;
            while idx < lines.len() && lines[idx].trim() != "$$" {
                idx += 1;
            }
            if idx >= lines.len() {
                return Err(ParseError::at(line_no, "Unterminated $$ block"));
            }
            let text = lines[open..idx].join("\n");
            idx += 1;
            children.push(Block::MathBlock { text });
            continue;
        }
        if let Some(caps) = MATH_SINGLE.captures(line) {
            children.push(Block::MathBlock {
                text: caps[1].to_string(),
            });
            idx += 1;
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            let level = caps[1].len() as u8;
            let content = parse_inline(caps.get(2).map_or("", |m| m.as_str()), line_no)?;
            children.push(Block::Heading { level, content });
            idx += 1;
            continue;
        }

        if RULE.is_match(line.trim()) {
            children.push(Block::Rule);
            idx += 1;
            continue;
        }

        // Blockquote, possibly promoted to a callout by its header line.
        if line.trim_start().starts_with('>') {
            let quote_start = line_no;
            let mut quote_lines: Vec<String> = Vec::new();
            while idx < lines.len() && lines[idx].trim_start().starts_with('>') {
                let raw = &lines[idx].trim_start()[1..];
                quote_lines.push(raw.strip_prefix(' ').unwrap_or(raw).to_string());
                idx += 1;
            }
            let header = quote_lines
                .first()
                .map(|line| line.trim().to_string())
                .unwrap_or_default();
            if let Some(callout) = callout_parts(&header) {
                let (title, color) = callout;
                let mut body = &quote_lines[1..];
                if body.first().is_some_and(|line| line.trim().is_empty()) {
                    body = &body[1..];
                }
                children.push(Block::Callout {
                    title: parse_inline(&title, quote_start)?,
                    color,
                    children: parse_blocks(body, quote_start + 1)?,
                });
                continue;
            }
            children.push(Block::BlockQuote {
                children: parse_blocks(&quote_lines, quote_start)?,
            });
            continue;
        }

        // Table: a pipe line over a valid separator row.
        if idx + 1 < lines.len() && line.contains('|') && is_table_separator(&lines[idx + 1]) {
            let mut header = Vec::new();
            for cell in split_table_row(line) {
                header.push(parse_inline(&cell, line_no)?);
            }
            idx += 2;
            let mut rows = Vec::new();
            while idx < lines.len() && lines[idx].contains('|') {
                let row_no = start_line + idx;
                let mut row = Vec::new();
                for cell in split_table_row(&lines[idx]) {
                    row.push(parse_inline(&cell, row_no)?);
                }
                rows.push(row);
                idx += 1;
            }
            children.push(Block::Table(Table { header, rows }));
            continue;
        }

        if let Some(info) = parse_list_line(line, line_no)? {
            let (items, next) = parse_list(lines, idx, info.indent, start_line, info.ordered)?;
            idx = next;
            children.push(Block::List(List {
                ordered: info.ordered,
                items,
            }));
            continue;
        }

        // Fenced code or diagram.
        if line.trim_start().starts_with("```") {
            let opening = line.trim();
            let ticks = opening.bytes().take_while(|byte| *byte == b'`').count();
            let info = opening[ticks..].trim().to_lowercase();
            idx += 1;
            let open = idx;
            let closer = "`".repeat(ticks);
            while idx < lines.len() && lines[idx].trim() != closer {
                idx += 1;
            }
            if idx >= lines.len() {
                return Err(ParseError::at(line_no, "Unterminated code block"));
            }
            let text = lines[open..idx].join("\n");
            idx += 1;
            if info == "mermaid" {
                children.push(Block::Diagram {
                    language: info,
                    text,
                });
            } else {
                children.push(Block::CodeBlock {
                    language: if info.is_empty() { None } else { Some(info) },
                    text,
                });
            }
            continue;
        }

        // Paragraph: contiguous non-blank lines with soft line breaks. A
        // following fence is left unconsumed and flags the paragraph tight.
        let para_start = idx;
        idx += 1;
        while idx < lines.len() && !lines[idx].trim().is_empty() {
            if lines[idx].trim_start().starts_with("```") {
                break;
            }
            idx += 1;
        }
        let tight_after = idx < lines.len() && lines[idx].trim_start().starts_with("```");
        let para = &lines[para_start..idx];
        let mut content = Vec::new();
        for (offset, part) in para.iter().enumerate() {
            content.extend(parse_inline(part, line_no + offset)?);
            if offset + 1 < para.len() {
                content.push(Inline::LineBreak);
            }
        }
        children.push(Block::Paragraph {
            content,
            tight_after,
        });
    }

    Ok(children)
}

/// `[Title] {color: value}` on the first quoted line makes the quote a
/// callout; the attribute list must carry a color (or colour) key.
fn callout_parts(header: &str) -> Option<(String, String)> {
    let caps = CALLOUT_HEADER.captures(header)?;
    let color_caps = CALLOUT_COLOR.captures(caps.get(2).map_or("", |m| m.as_str()))?;
    let title = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
    let color = color_caps
        .get(1)
        .map_or("", |m| m.as_str())
        .trim()
        .to_string();
    Some((title, color))
}

fn is_table_separator(line: &str) -> bool {
    let cells: Vec<&str> = line.trim_matches('|').split('|').map(str::trim).collect();
    cells.len() >= 2 && cells.iter().all(|cell| SEPARATOR_CELL.is_match(cell))
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

struct ListLine {
    indent: usize,
    ordered: bool,
    checkbox: Option<bool>,
    content: String,
}

/// Classifies one line as a list item, or `None` when it carries no marker.
/// Marker and indentation violations fail the parse with a line number.
fn parse_list_line(line: &str, line_no: usize) -> Result<Option<ListLine>, ParseError> {
    if line.is_empty() {
        return Ok(None);
    }
    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    let leading = &line[..indent];
    let stripped = &line[indent..];

    let (ordered, content_start) = if stripped.starts_with('-') {
        if !stripped.starts_with("- ") {
            return Err(ParseError::at(line_no, "List items must use '- '"));
        }
        (false, 2)
    } else if let Some(caps) = ORDERED_MARKER.captures(stripped) {
        let marker_end = caps.get(0).map_or(0, |m| m.end());
        if stripped.len() <= marker_end || stripped.as_bytes()[marker_end] != b' ' {
            return Err(ParseError::at(line_no, "Ordered list items must use '1. '"));
        }
        (true, marker_end + 1)
    } else {
        return Ok(None);
    };

    if leading.contains('\t') {
        return Err(ParseError::at(
            line_no,
            "List indentation must use spaces only (two spaces per level)",
        ));
    }
    if indent % 2 != 0 {
        return Err(ParseError::at(
            line_no,
            "List indentation must use two spaces per level",
        ));
    }

    let mut raw = stripped[content_start..].trim();
    let mut checkbox = None;
    if !ordered {
        if let Some(rest) = raw.strip_prefix("[x] ") {
            checkbox = Some(true);
            raw = rest;
        } else if let Some(rest) = raw.strip_prefix("[ ] ") {
            checkbox = Some(false);
            raw = rest;
        }
    }

    Ok(Some(ListLine {
        indent,
        ordered,
        checkbox,
        content: raw.to_string(),
    }))
}

/// Consumes a run of same-type items at `base_indent`; a deeper run becomes
/// the nested list of the item before it.
fn parse_list(
    lines: &[String],
    mut idx: usize,
    base_indent: usize,
    start_line: usize,
    ordered: bool,
) -> Result<(Vec<ListItem>, usize), ParseError> {
    let mut items: Vec<ListItem> = Vec::new();
    while idx < lines.len() {
        let line = &lines[idx];
        if line.trim().is_empty() {
            break;
        }
        let Some(info) = parse_list_line(line, start_line + idx)? else {
            break;
        };
        if info.ordered != ordered && info.indent == base_indent {
            break;
        }
        if info.indent < base_indent {
            break;
        }
        if info.indent > base_indent {
            if items.is_empty() {
                break;
            }
            let (nested_items, next) =
                parse_list(lines, idx, info.indent, start_line, info.ordered)?;
            idx = next;
            if !nested_items.is_empty() {
                if let Some(last) = items.last_mut() {
                    match &mut last.nested {
                        Some(existing) => existing.items.extend(nested_items),
                        None => {
                            last.nested = Some(List {
                                ordered: info.ordered,
                                items: nested_items,
                            })
                        }
                    }
                }
            }
            continue;
        }
        items.push(ListItem {
            content: parse_inline(&info.content, start_line + idx)?,
            checkbox: info.checkbox,
            nested: None,
        });
        idx += 1;
    }
    Ok((items, idx))
}
