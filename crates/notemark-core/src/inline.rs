use crate::ast::{Inline, InlineSeq};
use crate::error::ParseError;

/// Parses one line (or line fragment) of raw text into inline nodes.
///
/// Runs two passes: a validation scan that rejects unclosed or empty
/// delimiter spans with a line-numbered error, then an extraction loop that
/// repeatedly consumes whichever candidate (escape, code span, or delimited
/// span) starts earliest in the remaining text.
pub fn parse_inline(text: &str, line: usize) -> Result<InlineSeq, ParseError> {
    validate(text, line)?;

    let mut nodes: InlineSeq = Vec::new();
    let mut text = text;
    while !text.is_empty() {
        let escape_idx = text.find('\\');
        let code = find_code_span(text);
        let earliest = find_earliest_span(text);

        // A backslash wins only when it strictly precedes every span match.
        if let Some(idx) = escape_idx {
            let before_span = earliest.as_ref().map_or(true, |m| idx < m.start);
            let before_code = code.as_ref().map_or(true, |c| idx < c.start);
            if before_span && before_code {
                if idx > 0 {
                    push_text(&mut nodes, &text[..idx]);
                }
                let after = &text[idx + 1..];
                match after.chars().next() {
                    Some(ch) => {
                        push_text(&mut nodes, &after[..ch.len_utf8()]);
                        text = &after[ch.len_utf8()..];
                    }
                    None => {
                        push_text(&mut nodes, "\\");
                        text = "";
                    }
                }
                continue;
            }
        }

        if let Some(code) = code {
            if earliest.as_ref().map_or(true, |m| code.start < m.start) {
                if code.start > 0 {
                    push_text(&mut nodes, &text[..code.start]);
                }
                let rest = &text[code.end..];
                nodes.push(Inline::Code(code.content));
                text = rest;
                continue;
            }
        }

        let Some(found) = earliest else {
            push_text(&mut nodes, text);
            break;
        };
        if found.start > 0 {
            push_text(&mut nodes, &text[..found.start]);
        }
        let rest = &text[found.end..];
        nodes.push(found.node);
        text = rest;
    }

    Ok(nodes)
}

/// Adjacent literal runs collapse into one text node.
fn push_text(nodes: &mut InlineSeq, value: &str) {
    if let Some(Inline::Text(existing)) = nodes.last_mut() {
        existing.push_str(value);
    } else {
        nodes.push(Inline::Text(value.to_string()));
    }
}

struct SpanMatch {
    start: usize,
    end: usize,
    node: Inline,
}

/// Earliest match among the delimited-span kinds. On a start-offset tie the
/// kind listed first wins: image, inline math, link, bold, italic, highlight,
/// strike.
fn find_earliest_span(text: &str) -> Option<SpanMatch> {
    let finders: [fn(&str) -> Option<SpanMatch>; 7] = [
        find_image,
        find_math_inline,
        find_link,
        find_bold,
        find_italic,
        find_highlight,
        find_strike,
    ];
    let mut earliest: Option<SpanMatch> = None;
    for finder in finders {
        if let Some(found) = finder(text) {
            let is_earlier = earliest.as_ref().map_or(true, |e| found.start < e.start);
            if is_earlier {
                earliest = Some(found);
            }
        }
    }
    earliest
}

fn find_image(text: &str) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'!' && bytes[i + 1] == b'[' {
            if let Some(found) = image_at(text, i) {
                return Some(found);
            }
        }
        i += 1;
    }
    None
}

fn image_at(text: &str, start: usize) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let alt_start = start + 2;
    let close = alt_start + text[alt_start..].find(']')?;
    if close + 1 >= bytes.len() || bytes[close + 1] != b'(' {
        return None;
    }
    let url_start = close + 2;
    let paren = url_start + text[url_start..].find(')')?;
    if paren == url_start {
        return None;
    }
    let mut end = paren + 1;
    let mut width_percent = None;
    if let Some(width) = parse_width_suffix(text, end) {
        width_percent = Some(width.0);
        end = width.1;
    }
    Some(SpanMatch {
        start,
        end,
        node: Inline::Image {
            alt: text[alt_start..close].to_string(),
            url: text[url_start..paren].trim().to_string(),
            width_percent,
        },
    })
}

/// Optional `{N%}` suffix directly after an image, where N is an unsigned
/// decimal with an optional fraction. Returns the width and the end offset.
fn parse_width_suffix(text: &str, start: usize) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    if start >= bytes.len() || bytes[start] != b'{' {
        return None;
    }
    let mut i = start + 1;
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == frac_start {
            return None;
        }
        i = j;
    }
    if i + 1 >= bytes.len() || bytes[i] != b'%' || bytes[i + 1] != b'}' {
        return None;
    }
    let value = text[digits_start..i].parse::<f64>().ok()?;
    Some((value, i + 2))
}

fn find_math_inline(text: &str) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && !next_char_is_whitespace(text, i + 1) && i + 1 < bytes.len() {
            let after_first = i + 1 + char_len_at(text, i + 1);
            if let Some(rel) = text[after_first..].find('$') {
                let close = after_first + rel;
                return Some(SpanMatch {
                    start: i,
                    end: close + 1,
                    node: Inline::MathInline(text[i + 1..close].to_string()),
                });
            }
        }
        i += 1;
    }
    None
}

fn find_link(text: &str) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some(found) = link_at(text, i) {
                return Some(found);
            }
        }
        i += 1;
    }
    None
}

fn link_at(text: &str, start: usize) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let label_start = start + 1;
    let close = label_start + text[label_start..].find(']')?;
    if close == label_start {
        return None;
    }
    if close + 1 >= bytes.len() || bytes[close + 1] != b'(' {
        return None;
    }
    let url_start = close + 2;
    let paren = url_start + text[url_start..].find(')')?;
    if paren == url_start {
        return None;
    }
    Some(SpanMatch {
        start,
        end: paren + 1,
        node: Inline::Link {
            text: text[label_start..close].to_string(),
            url: text[url_start..paren].trim().to_string(),
        },
    })
}

fn find_bold(text: &str) -> Option<SpanMatch> {
    find_double_delimited(text, b'*', Inline::Bold)
}

fn find_highlight(text: &str) -> Option<SpanMatch> {
    find_double_delimited(text, b'=', Inline::Highlight)
}

/// Two-character delimiter pair (`**` or `==`): opener not followed by
/// whitespace, closer is the next occurrence of the same pair.
fn find_double_delimited(
    text: &str,
    delim: u8,
    build: fn(String) -> Inline,
) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let token: &str = match delim {
        b'*' => "**",
        _ => "==",
    };
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == delim && bytes[i + 1] == delim && !next_char_is_whitespace(text, i + 2) {
            if i + 2 < bytes.len() {
                let after_first = i + 2 + char_len_at(text, i + 2);
                if let Some(rel) = text[after_first..].find(token) {
                    let close = after_first + rel;
                    return Some(SpanMatch {
                        start: i,
                        end: close + 2,
                        node: build(text[i + 2..close].to_string()),
                    });
                }
            }
        }
        i += 1;
    }
    None
}

fn find_italic(text: &str) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'*'
            && i + 1 < bytes.len()
            && bytes[i + 1] != b'*'
            && !next_char_is_whitespace(text, i + 1)
        {
            let after_first = i + 1 + char_len_at(text, i + 1);
            if let Some(rel) = text[after_first..].find('*') {
                let close = after_first + rel;
                return Some(SpanMatch {
                    start: i,
                    end: close + 1,
                    node: Inline::Italic(text[i + 1..close].to_string()),
                });
            }
        }
        i += 1;
    }
    None
}

fn find_strike(text: &str) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'~' && i + 1 < bytes.len() && !next_char_is_whitespace(text, i + 1) {
            let after_first = i + 1 + char_len_at(text, i + 1);
            if let Some(rel) = text[after_first..].find('~') {
                let close = after_first + rel;
                return Some(SpanMatch {
                    start: i,
                    end: close + 1,
                    node: Inline::Strike(text[i + 1..close].to_string()),
                });
            }
        }
        i += 1;
    }
    None
}

struct CodeSpan {
    start: usize,
    end: usize,
    content: String,
}

/// Backtick code span: the closing run must have exactly the opening run's
/// length. Embedded newlines collapse to spaces; one balanced pair of outer
/// spaces is stripped when the content is not all-space.
fn find_code_span(text: &str) -> Option<CodeSpan> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut i = 0;
    while i < n {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let mut run = 1;
        while i + run < n && bytes[i + run] == b'`' {
            run += 1;
        }
        let mut j = i + run;
        while j < n {
            if bytes[j] == b'`' {
                let mut close = 1;
                while j + close < n && bytes[j + close] == b'`' {
                    close += 1;
                }
                if close == run {
                    let mut content = text[i + run..j].replace('\n', " ");
                    if content.len() >= 2
                        && content.starts_with(' ')
                        && content.ends_with(' ')
                        && !content.trim().is_empty()
                    {
                        content = content[1..content.len() - 1].to_string();
                    }
                    return Some(CodeSpan {
                        start: i,
                        end: j + close,
                        content,
                    });
                }
                j += close;
            } else {
                j += 1;
            }
        }
        i += run;
    }
    None
}

fn is_escaped(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = pos;
    while i > 0 && bytes[i - 1] == b'\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}

fn find_next_unescaped(text: &str, token: &str, start: usize) -> Option<usize> {
    let mut from = start;
    while let Some(rel) = text[from..].find(token) {
        let idx = from + rel;
        if is_escaped(text, idx) {
            from = idx + 1;
        } else {
            return Some(idx);
        }
    }
    None
}

/// Byte length of the character at `pos`, which must be a char boundary.
/// The closer search starts past the first content character, which may be
/// wider than one byte.
fn char_len_at(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(1, char::len_utf8)
}

fn next_char_is_whitespace(text: &str, pos: usize) -> bool {
    pos < text.len() && text[pos..].chars().next().is_some_and(char::is_whitespace)
}

/// Single left-to-right scan rejecting unclosed and empty spans before any
/// node is built. A delimiter directly followed by whitespace is literal and
/// is skipped here, matching the extraction pass.
fn validate(text: &str, line: usize) -> Result<(), ParseError> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut i = 0;
    while i < n {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'`' && !is_escaped(text, i) {
            let mut run = 1;
            while i + run < n && bytes[i + run] == b'`' {
                run += 1;
            }
            let token = "`".repeat(run);
            let close = find_next_unescaped(text, &token, i + run)
                .ok_or_else(|| ParseError::at(line, "Unclosed code span"))?;
            if text[i + run..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty code span"));
            }
            i = close + run;
            continue;
        }
        if bytes[i] == b'*' && i + 1 < n && bytes[i + 1] == b'*' && !is_escaped(text, i) {
            if next_char_is_whitespace(text, i + 2) {
                i += 2;
                continue;
            }
            let close = find_next_unescaped(text, "**", i + 2)
                .ok_or_else(|| ParseError::at(line, "Unclosed bold"))?;
            if text[i + 2..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty bold"));
            }
            i = close + 2;
            continue;
        }
        if bytes[i] == b'=' && i + 1 < n && bytes[i + 1] == b'=' && !is_escaped(text, i) {
            if next_char_is_whitespace(text, i + 2) {
                i += 2;
                continue;
            }
            let close = find_next_unescaped(text, "==", i + 2)
                .ok_or_else(|| ParseError::at(line, "Unclosed highlight"))?;
            if text[i + 2..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty highlight"));
            }
            i = close + 2;
            continue;
        }
        if bytes[i] == b'~' && !is_escaped(text, i) {
            if next_char_is_whitespace(text, i + 1) {
                i += 1;
                continue;
            }
            let close = find_next_unescaped(text, "~", i + 1)
                .ok_or_else(|| ParseError::at(line, "Unclosed strikethrough"))?;
            if text[i + 1..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty strikethrough"));
            }
            i = close + 1;
            continue;
        }
        if bytes[i] == b'*' && !is_escaped(text, i) {
            if i + 1 < n && bytes[i + 1] == b'*' {
                i += 1;
                continue;
            }
            if next_char_is_whitespace(text, i + 1) {
                i += 1;
                continue;
            }
            let close = find_next_unescaped(text, "*", i + 1)
                .ok_or_else(|| ParseError::at(line, "Unclosed italic"))?;
            if text[i + 1..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty italic"));
            }
            i = close + 1;
            continue;
        }
        if bytes[i] == b'$' && !is_escaped(text, i) {
            if i + 1 < n && bytes[i + 1] == b'$' {
                i += 2;
                continue;
            }
            if next_char_is_whitespace(text, i + 1) {
                i += 1;
                continue;
            }
            let close = find_next_unescaped(text, "$", i + 1)
                .ok_or_else(|| ParseError::at(line, "Unclosed inline math"))?;
            if text[i + 1..close].trim().is_empty() {
                return Err(ParseError::at(line, "Empty inline math"));
            }
            i = close + 1;
            continue;
        }
        i += 1;
    }
    Ok(())
}
