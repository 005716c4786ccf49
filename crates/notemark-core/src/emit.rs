use crate::ast::{Block, Inline, List, ListItem};

/// Fixed callout color keywords and their style classes; anything else falls
/// back to a custom property carrying the literal value.
const CALLOUT_CLASSES: [(&str, &str); 7] = [
    ("info", "callout-info"),
    ("note", "callout-note"),
    ("tip", "callout-tip"),
    ("warning", "callout-warning"),
    ("danger", "callout-danger"),
    ("important", "callout-important"),
    ("caution", "callout-caution"),
];

/// Escapes text for both element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Emits body HTML for a block sequence, one string per top-level block.
/// Total over any tree this crate's parser produces; math is emitted as raw
/// TeX for the typesetting script, everything else is escaped.
pub fn emit_blocks(blocks: &[Block]) -> Vec<String> {
    let mut body = Vec::new();
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                let level = (level + 1).min(6);
                body.push(format!(
                    "<h{level}>{}</h{level}>",
                    render_inlines(content)
                ));
            }
            Block::Paragraph {
                content,
                tight_after,
            } => {
                let class = if *tight_after {
                    " class=\"tight-after\""
                } else {
                    ""
                };
                body.push(format!("<p{class}>{}</p>", render_inlines(content)));
            }
            Block::BlockQuote { children } => {
                body.push(format!(
                    "<blockquote>{}</blockquote>",
                    emit_blocks(children).join("\n")
                ));
            }
            Block::Callout {
                title,
                color,
                children,
            } => body.push(emit_callout(title, color, children)),
            Block::List(list) => body.push(emit_list(list)),
            Block::Table(table) => {
                let head: String = table
                    .header
                    .iter()
                    .map(|cell| format!("<th>{}</th>", render_inlines(cell)))
                    .collect();
                let rows: String = table
                    .rows
                    .iter()
                    .map(|row| {
                        let cells: String = row
                            .iter()
                            .map(|cell| format!("<td>{}</td>", render_inlines(cell)))
                            .collect();
                        format!("<tr>{cells}</tr>")
                    })
                    .collect();
                body.push(format!(
                    "<table><thead><tr>{head}</tr></thead><tbody>{rows}</tbody></table>"
                ));
            }
            Block::CodeBlock { language, text } => {
                let lang_attr = language
                    .as_deref()
                    .map(|lang| format!(" lang=\"{}\"", escape_html(lang)))
                    .unwrap_or_default();
                body.push(format!(
                    "<pre class=\"code-block\"{lang_attr}><code>{}</code></pre>",
                    escape_html(text)
                ));
            }
            Block::Diagram { text, .. } => {
                body.push(format!("<pre class=\"mermaid\">{}</pre>", escape_html(text)));
            }
            Block::MathBlock { text } => {
                body.push(format!("<div class=\"math\">\\[{text}\\]</div>"));
            }
            Block::Rule => body.push("<hr>".to_string()),
        }
    }
    body
}

fn emit_callout(title: &[Inline], color: &str, children: &[Block]) -> String {
    let mut classes = vec!["callout"];
    let color = color.trim();
    let color_key = color.to_lowercase();
    if let Some((_, class)) = CALLOUT_CLASSES
        .iter()
        .find(|(keyword, _)| *keyword == color_key)
    {
        classes.push(class);
    }
    let style = if !color.is_empty() && classes.len() == 1 {
        format!(" style=\"--callout-color: {};\"", escape_html(color))
    } else {
        String::new()
    };
    format!(
        "<div class=\"{}\"{style}><p><strong>{}</strong></p>{}</div>",
        classes.join(" "),
        render_inlines(title),
        emit_blocks(children).join("\n")
    )
}

fn emit_list(list: &List) -> String {
    let tag = if list.ordered { "ol" } else { "ul" };
    let items: String = list.items.iter().map(emit_list_item).collect();
    format!("<{tag}>{items}</{tag}>")
}

fn emit_list_item(item: &ListItem) -> String {
    let content = render_inlines(&item.content);
    let nested = item
        .nested
        .as_ref()
        .map(emit_list)
        .unwrap_or_default();
    match item.checkbox {
        Some(checked) => {
            let checked_attr = if checked { " checked" } else { "" };
            format!(
                "<li class=\"task-list-item\"><input type=\"checkbox\" disabled{checked_attr}> {content}{nested}</li>"
            )
        }
        None => format!("<li>{content}{nested}</li>"),
    }
}

/// Renders an inline sequence to HTML. Inline math stays raw TeX inside the
/// typesetting delimiters.
pub fn render_inlines(nodes: &[Inline]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Inline::Text(value) => out.push_str(&escape_html(value)),
            Inline::Bold(value) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(value));
                out.push_str("</strong>");
            }
            Inline::Italic(value) => {
                out.push_str("<em>");
                out.push_str(&escape_html(value));
                out.push_str("</em>");
            }
            Inline::Highlight(value) => {
                out.push_str("<mark>");
                out.push_str(&escape_html(value));
                out.push_str("</mark>");
            }
            Inline::Strike(value) => {
                out.push_str("<del>");
                out.push_str(&escape_html(value));
                out.push_str("</del>");
            }
            Inline::Code(value) => {
                out.push_str("<code>");
                out.push_str(&escape_html(value));
                out.push_str("</code>");
            }
            Inline::Link { text, url } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(text)
                ));
            }
            Inline::Image {
                alt,
                url,
                width_percent,
            } => {
                let style = width_percent
                    .map(|width| format!(" style=\"width: {width}%; height: auto;\""))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\"{style}>",
                    escape_html(url),
                    escape_html(alt)
                ));
            }
            Inline::MathInline(content) => {
                out.push_str(&format!("<span class=\"math\">\\({content}\\)</span>"));
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
    out
}
