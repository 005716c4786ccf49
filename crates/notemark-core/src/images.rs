use crate::ast::{Block, Inline, List};
use std::path::{Component, Path, PathBuf};

/// Marker prefix for image URLs that refer to files next to the source
/// document.
pub const LOCAL_PREFIX: &str = "local:";

/// Applies `visit` to the URL of every image in the tree, walking all
/// content-bearing positions: paragraphs, headings, blockquotes, callout
/// titles and bodies, list items with their nested lists, and table cells.
pub fn visit_image_urls(blocks: &mut [Block], visit: &mut dyn FnMut(&mut String)) {
    for block in blocks {
        match block {
            Block::Heading { content, .. } => visit_inlines(content, visit),
            Block::Paragraph { content, .. } => visit_inlines(content, visit),
            Block::BlockQuote { children } => visit_image_urls(children, visit),
            Block::Callout {
                title, children, ..
            } => {
                visit_inlines(title, visit);
                visit_image_urls(children, visit);
            }
            Block::List(list) => visit_list(list, visit),
            Block::Table(table) => {
                for cell in &mut table.header {
                    visit_inlines(cell, visit);
                }
                for row in &mut table.rows {
                    for cell in row {
                        visit_inlines(cell, visit);
                    }
                }
            }
            Block::CodeBlock { .. }
            | Block::Diagram { .. }
            | Block::MathBlock { .. }
            | Block::Rule => {}
        }
    }
}

fn visit_list(list: &mut List, visit: &mut dyn FnMut(&mut String)) {
    for item in &mut list.items {
        visit_inlines(&mut item.content, visit);
        if let Some(nested) = &mut item.nested {
            visit_list(nested, visit);
        }
    }
}

fn visit_inlines(nodes: &mut [Inline], visit: &mut dyn FnMut(&mut String)) {
    for node in nodes {
        if let Inline::Image { url, .. } = node {
            visit(url);
        }
    }
}

/// Rewrites `local:` image references into absolute `file://` URLs against
/// the document's base directory. Already-absolute paths are used as-is.
/// Without a base directory the pass is a no-op.
pub fn resolve_local_images(blocks: &mut [Block], base_dir: Option<&Path>) {
    let Some(base) = base_dir else {
        return;
    };
    visit_image_urls(blocks, &mut |url| {
        if let Some(rel) = url.strip_prefix(LOCAL_PREFIX) {
            let rel = rel.trim();
            if rel.is_empty() {
                return;
            }
            let path = if Path::new(rel).is_absolute() {
                PathBuf::from(rel)
            } else {
                normalize_path(&base.join(rel))
            };
            *url = path_to_file_url(&path);
        }
    });
}

/// Lexical normalization: drops `.` components and folds `..` against the
/// preceding component, without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Builds a `file://` URL for a path, percent-encoding everything outside the
/// unreserved set.
pub fn path_to_file_url(path: &Path) -> String {
    let mut value = path.to_string_lossy().replace('\\', "/");
    if !value.starts_with('/') {
        value = format!("/{value}");
    }
    let mut out = String::from("file://");
    for byte in value.as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~' | '/') {
            out.push(ch);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
