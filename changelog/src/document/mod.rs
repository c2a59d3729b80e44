use std::fmt;

/// A Document is a sequence of block nodes.
/// List items and blockquotes own one of these for their nested content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub nodes: Vec<DocumentNode>,
}

/// A single block-level node in the Markdown AST.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Paragraph(Vec<InlineNode>),
    Heading {
        level: u8,
        content: Vec<InlineNode>,
    },
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Blockquote(Document),
    Table {
        alignments: Vec<ColumnAlignment>,
        headers: Vec<Vec<InlineNode>>,
        rows: Vec<Vec<Vec<InlineNode>>>,
    },
    OrderedList {
        start: u64,
        items: Vec<Document>,
        /// Items are separated by blank lines in the source.
        loose: bool,
    },
    UnorderedList {
        items: Vec<Document>,
        loose: bool,
    },
    HtmlBlock(String),

    // Separator
    HorizontalRule,
}

impl DocumentNode {
    /// Heading level, or `None` for anything that isn't a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            DocumentNode::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn is_unordered_list(&self) -> bool {
        matches!(self, DocumentNode::UnorderedList { .. })
    }

    /// Flattened text of the node's inline content, with all markup removed.
    /// Only headings and paragraphs carry inline content; other nodes yield "".
    pub fn plain_text(&self) -> String {
        match self {
            DocumentNode::Heading { content, .. } | DocumentNode::Paragraph(content) => {
                plain_text(content)
            }
            _ => String::new(),
        }
    }
}

/// Inline elements that appear within a line of text.
/// Inline types nest freely within one another.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(String),
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    CodeSpan(String),
    Link {
        dest: String,
        title: String,
        content: Vec<InlineNode>,
    },
    Image {
        dest: String,
        title: String,
        alt: Vec<InlineNode>,
    },
    Html(String),
    SoftBreak,
    HardBreak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnAlignment {
    None,
    Left,
    Center,
    Right,
}

/// Concatenate the text of a run of inline nodes, dropping all markup.
pub fn plain_text(inlines: &[InlineNode]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}

impl InlineNode {
    fn push_plain_text(&self, out: &mut String) {
        match self {
            InlineNode::Text(s) | InlineNode::CodeSpan(s) | InlineNode::Html(s) => out.push_str(s),
            InlineNode::Strong(children)
            | InlineNode::Emphasis(children)
            | InlineNode::Strikethrough(children)
            | InlineNode::Link {
                content: children, ..
            }
            | InlineNode::Image { alt: children, .. } => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
            InlineNode::SoftBreak | InlineNode::HardBreak => out.push(' '),
        }
    }
}

// ---------------------------------------------------------------------------
// Markdown serialization
//
// Every block renders as complete lines ending in '\n'. Consecutive blocks in
// a Document are separated by one blank line; blocks inside a tight list item
// are not.
// ---------------------------------------------------------------------------

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_blocks(&self.nodes, true))
    }
}

impl fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentNode::Paragraph(inlines) => {
                write_inlines(f, inlines, true)?;
                writeln!(f)
            }
            DocumentNode::Heading { level, content } => {
                for _ in 0..*level {
                    write!(f, "#")?;
                }
                write!(f, " ")?;
                write_inlines(f, content, false)?;
                writeln!(f)
            }
            DocumentNode::CodeBlock { language, content } => {
                let fence = if content.contains("```") { "````" } else { "```" };
                write!(f, "{}", fence)?;
                if let Some(lang) = language {
                    write!(f, "{}", lang)?;
                }
                writeln!(f)?;
                write!(f, "{}", content)?;
                if !content.is_empty() && !content.ends_with('\n') {
                    writeln!(f)?;
                }
                writeln!(f, "{}", fence)
            }
            DocumentNode::Blockquote(doc) => {
                let text = format!("{}", doc);
                for line in text.lines() {
                    if line.is_empty() {
                        writeln!(f, ">")?;
                    } else {
                        writeln!(f, "> {}", line)?;
                    }
                }
                Ok(())
            }
            DocumentNode::Table {
                alignments,
                headers,
                rows,
            } => {
                write!(f, "|")?;
                for header in headers {
                    write!(f, " ")?;
                    write_inlines(f, header, false)?;
                    write!(f, " |")?;
                }
                writeln!(f)?;
                write!(f, "|")?;
                for i in 0..headers.len() {
                    let rule = match alignments.get(i).copied().unwrap_or(ColumnAlignment::None) {
                        ColumnAlignment::None => " --- |",
                        ColumnAlignment::Left => " :-- |",
                        ColumnAlignment::Center => " :-: |",
                        ColumnAlignment::Right => " --: |",
                    };
                    write!(f, "{}", rule)?;
                }
                writeln!(f)?;
                for row in rows {
                    write!(f, "|")?;
                    for cell in row {
                        write!(f, " ")?;
                        write_inlines(f, cell, false)?;
                        write!(f, " |")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            DocumentNode::OrderedList {
                start,
                items,
                loose,
            } => {
                for (i, item) in items.iter().enumerate() {
                    if *loose && i > 0 {
                        writeln!(f)?;
                    }
                    let marker = format!("{}. ", *start + i as u64);
                    write_item(f, &marker, item, *loose)?;
                }
                Ok(())
            }
            DocumentNode::UnorderedList { items, loose } => {
                for (i, item) in items.iter().enumerate() {
                    if *loose && i > 0 {
                        writeln!(f)?;
                    }
                    write_item(f, "- ", item, *loose)?;
                }
                Ok(())
            }
            DocumentNode::HtmlBlock(html) => {
                write!(f, "{}", html)?;
                if !html.ends_with('\n') {
                    writeln!(f)?;
                }
                Ok(())
            }
            // `***` rather than `---`: a dash rule directly under a paragraph
            // inside a tight item would re-parse as a setext heading.
            DocumentNode::HorizontalRule => writeln!(f, "***"),
        }
    }
}

fn render_blocks(nodes: &[DocumentNode], blank_between: bool) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if blank_between && i > 0 {
            out.push('\n');
        }
        out.push_str(&node.to_string());
    }
    out
}

/// Write one list item: the marker on the first line, continuation lines
/// indented to the width of the marker.
fn write_item(f: &mut fmt::Formatter<'_>, marker: &str, item: &Document, loose: bool) -> fmt::Result {
    let body = render_blocks(&item.nodes, loose);
    let indent = " ".repeat(marker.len());
    let mut lines = body.lines();

    match lines.next() {
        Some(first) => writeln!(f, "{}{}", marker, first)?,
        None => writeln!(f, "{}", marker.trim_end())?,
    }
    for line in lines {
        if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{}{}", indent, line)?;
        }
    }
    Ok(())
}

/// Write a run of inlines. `line_start` is true when the run begins a line,
/// where text must not be mistaken for a block marker.
fn write_inlines(
    f: &mut fmt::Formatter<'_>,
    inlines: &[InlineNode],
    mut line_start: bool,
) -> fmt::Result {
    for inline in inlines {
        match inline {
            InlineNode::Text(s) => write!(f, "{}", escape_text(s, line_start))?,
            other => write!(f, "{}", other)?,
        }
        line_start = matches!(inline, InlineNode::SoftBreak | InlineNode::HardBreak);
    }
    Ok(())
}

impl fmt::Display for InlineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineNode::Text(s) => write!(f, "{}", escape_text(s, false)),
            InlineNode::Strong(children) => {
                write!(f, "**")?;
                write_inlines(f, children, false)?;
                write!(f, "**")
            }
            InlineNode::Emphasis(children) => {
                write!(f, "*")?;
                write_inlines(f, children, false)?;
                write!(f, "*")
            }
            InlineNode::Strikethrough(children) => {
                write!(f, "~~")?;
                write_inlines(f, children, false)?;
                write!(f, "~~")
            }
            InlineNode::CodeSpan(code) => {
                let fence = "`".repeat(longest_backtick_run(code) + 1);
                // A parser strips one space from each side of a padded span.
                let padded = code.starts_with(' ')
                    && code.ends_with(' ')
                    && !code.chars().all(|c| c == ' ');
                if code.starts_with('`') || code.ends_with('`') || padded {
                    write!(f, "{} {} {}", fence, code, fence)
                } else {
                    write!(f, "{}{}{}", fence, code, fence)
                }
            }
            InlineNode::Link {
                dest,
                title,
                content,
            } => {
                if is_autolink(dest, title, content) {
                    return write!(f, "<{}>", dest);
                }
                write!(f, "[")?;
                write_inlines(f, content, false)?;
                write!(f, "](")?;
                write_destination(f, dest, title)?;
                write!(f, ")")
            }
            InlineNode::Image { dest, title, alt } => {
                write!(f, "![")?;
                write_inlines(f, alt, false)?;
                write!(f, "](")?;
                write_destination(f, dest, title)?;
                write!(f, ")")
            }
            InlineNode::Html(html) => write!(f, "{}", html),
            InlineNode::SoftBreak => writeln!(f),
            InlineNode::HardBreak => writeln!(f, "\\"),
        }
    }
}

fn write_destination(f: &mut fmt::Formatter<'_>, dest: &str, title: &str) -> fmt::Result {
    let chars: Vec<char> = dest.chars().collect();
    let bracketed = chars.iter().any(|c| matches!(c, ' ' | '(' | ')' | '<' | '>'));

    let mut out = String::with_capacity(dest.len() + 2);
    if bracketed {
        out.push('<');
    }
    for (i, &ch) in chars.iter().enumerate() {
        let escape = match ch {
            '\\' => true,
            '<' | '>' => bracketed,
            '&' => starts_entity(&chars[i + 1..]),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(ch);
    }
    if bracketed {
        out.push('>');
    }
    write!(f, "{}", out)?;

    if !title.is_empty() {
        let title = title.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, " \"{}\"", title)?;
    }
    Ok(())
}

fn is_autolink(dest: &str, title: &str, content: &[InlineNode]) -> bool {
    title.is_empty()
        && dest.contains("://")
        && matches!(content, [InlineNode::Text(text)] if text == dest)
}

fn longest_backtick_run(code: &str) -> usize {
    code.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Backslash-escape characters that would otherwise re-parse as markup.
/// Delimiters surrounded by whitespace, and underscores inside words, can't
/// open or close emphasis and are left alone. At the start of a line the
/// characters that open a block (headings, quotes, list markers, setext
/// underlines) are escaped too.
fn escape_text(text: &str, line_start: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let block_marker = if line_start { block_marker_at(&chars) } else { None };

    for (i, &ch) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let escape = block_marker == Some(i) || match ch {
            '\\' | '`' => true,
            '*' | '~' => !is_space(prev) || !is_space(next),
            '_' => !(is_word(prev) && is_word(next)) && (!is_space(prev) || !is_space(next)),
            ']' => matches!(next, Some('(') | Some('[')),
            '<' => next.is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')),
            '&' => starts_entity(&chars[i + 1..]),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(ch);
    }

    out
}

/// Index of the character that would make a line starting with `chars` open
/// a block: the punctuation of an ordered-list marker (`1.`, `2)`), or a
/// leading ATX heading, quote, bullet, thematic break or setext underline.
fn block_marker_at(chars: &[char]) -> Option<usize> {
    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let marker = matches!(chars.get(digits), Some('.' | ')'))
            && is_space(chars.get(digits + 1).copied());
        return marker.then_some(digits);
    }

    let first = *chars.first()?;
    let rule = |c: char| chars.iter().all(|&x| x == c || x == ' ');
    let marker = match first {
        '>' => true,
        '#' => {
            let hashes = chars.iter().take_while(|&&c| c == '#').count();
            hashes <= 6 && is_space(chars.get(hashes).copied())
        }
        '-' | '+' | '*' => is_space(chars.get(1).copied()) || rule(first),
        '=' | '_' => rule(first),
        _ => false,
    };
    marker.then_some(0)
}

/// Whether `rest` (the text after an `&`) reads as an entity or numeric
/// character reference such as `amp;`, `#38;` or `#x26;`.
fn starts_entity(rest: &[char]) -> bool {
    let body = match rest {
        ['#', 'x' | 'X', tail @ ..] => tail,
        ['#', tail @ ..] => tail,
        tail => tail,
    };
    let run = body.iter().take_while(|c| c.is_ascii_alphanumeric()).count();
    run > 0 && body.get(run) == Some(&';')
}

fn is_space(c: Option<char>) -> bool {
    c.is_none_or(char::is_whitespace)
}

fn is_word(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}
