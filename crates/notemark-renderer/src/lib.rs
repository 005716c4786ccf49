mod images;
pub mod pdf;

pub use images::inline_file_images;
pub use pdf::{PdfBackend, PdfOptions, export_pdf};

use notemark_core::{
    Checkpoint, Document, NoProgress, Progress, emit_blocks, escape_html, resolve_local_images,
};

const MATHJAX_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";
const MERMAID_SRC: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";
const GENERATOR: &str = "Notemark 1.0";

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Stylesheet text inlined verbatim into the page; the caller is
    /// responsible for its content, it is not escaped.
    pub stylesheet: Option<String>,
    /// Replace readable `file://` images with base64 data URLs, for output
    /// contexts without file access (PDF export).
    pub inline_local_images: bool,
}

/// Renders a document to one self-contained HTML page.
///
/// Mutates the tree's image URLs in place (local-reference resolution and
/// optional inlining); rendering the same tree from two threads at once needs
/// outside synchronization, distinct trees do not. Without inlining the
/// output is byte-identical across repeated calls.
pub fn render_html(document: &mut Document, options: &RenderOptions) -> String {
    render_html_with_progress(document, options, &mut NoProgress)
}

/// Same as [`render_html`], reporting [`Checkpoint::RenderStart`] and
/// [`Checkpoint::RenderDone`] to the observer.
pub fn render_html_with_progress(
    document: &mut Document,
    options: &RenderOptions,
    progress: &mut dyn Progress,
) -> String {
    progress.checkpoint(Checkpoint::RenderStart);

    resolve_local_images(&mut document.blocks, document.meta.base_dir.as_deref());
    if options.inline_local_images {
        inline_file_images(&mut document.blocks);
    }

    let mut body = vec![format!("<h1>{}</h1>", escape_html(&document.title))];
    let meta_parts: Vec<&str> = [
        document.meta.author.as_deref(),
        document.meta.date.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !meta_parts.is_empty() {
        body.push(format!(
            "<i class=\"doc-meta\">{}</i>",
            escape_html(&meta_parts.join(" · "))
        ));
    }
    body.extend(emit_blocks(&document.blocks));

    let html = page(document, options, &body.join("\n"));
    progress.checkpoint(Checkpoint::RenderDone);
    html
}

fn page(document: &Document, options: &RenderOptions, body: &str) -> String {
    let mut head = String::new();
    head.push_str("<meta charset=\"utf-8\">\n");
    head.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(&document.title)
    ));
    if let Some(author) = document.meta.author.as_deref() {
        head.push_str(&format!(
            "<meta name=\"author\" content=\"{}\">\n",
            escape_html(author)
        ));
    }
    if let Some(date) = document.meta.date.as_deref() {
        head.push_str(&format!(
            "<meta name=\"date\" content=\"{}\">\n",
            escape_html(date)
        ));
    }
    if let Some(tags) = document.meta.tags.as_deref() {
        head.push_str(&format!(
            "<meta name=\"keywords\" content=\"{}\">\n",
            escape_html(&tags.join(", "))
        ));
    }
    head.push_str(&format!(
        "<meta name=\"generator\" content=\"{GENERATOR}\">\n"
    ));
    head.push_str(&format!("<script src=\"{MATHJAX_SRC}\"></script>\n"));
    head.push_str(&format!("<script src=\"{MERMAID_SRC}\"></script>\n"));
    head.push_str("<script>mermaid.initialize({ startOnLoad: true });</script>\n");
    if let Some(stylesheet) = options.stylesheet.as_deref() {
        head.push_str(&format!("<style>{stylesheet}</style>\n"));
    }

    format!(
        "<!doctype html>\n<html>\n<head>\n{head}</head>\n<body>\n<div id=\"doc\">\n{body}\n</div>\n</body>\n</html>\n"
    )
}
