use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd,
};

use crate::Block;
use crate::document::{ColumnAlignment, Document, DocumentNode, InlineNode};

type Events<'a> = [(Event<'a>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse Markdown source text into its top-level blocks, in document order.
pub fn parse_blocks(source: &str) -> Vec<Block> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut blocks = Vec::new();
    let mut i = 0;

    while i < events.len() {
        // A Start event's range covers the whole element.
        let span = events[i].1.clone();
        if let Some(node) = collect_block(&events, &mut i) {
            blocks.push(Block { node, span });
        }
    }

    blocks
}

// ---------------------------------------------------------------------------
// Block collection
// ---------------------------------------------------------------------------

/// Collect the block starting at `events[*i]`.
/// Always advances `i`; returns `None` for events that don't form a block.
fn collect_block(events: &Events<'_>, i: &mut usize) -> Option<DocumentNode> {
    let (ref ev, _) = events[*i];

    match ev {
        Event::Start(Tag::Heading { level, .. }) => {
            let level = heading_level_to_u8(level);
            *i += 1;
            let content = collect_inlines(events, i, &|e| matches!(e, TagEnd::Heading(_)));
            Some(DocumentNode::Heading { level, content })
        }

        Event::Start(Tag::Paragraph) => {
            *i += 1;
            let inlines = collect_inlines(events, i, &|e| matches!(e, TagEnd::Paragraph));
            Some(DocumentNode::Paragraph(inlines))
        }

        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.to_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            };
            *i += 1;
            let content = collect_text_until(events, i, |e| matches!(e, TagEnd::CodeBlock));
            Some(DocumentNode::CodeBlock { language, content })
        }

        Event::Start(Tag::Table(alignments)) => {
            let alignments = alignments
                .iter()
                .map(|a| match a {
                    Alignment::None => ColumnAlignment::None,
                    Alignment::Left => ColumnAlignment::Left,
                    Alignment::Center => ColumnAlignment::Center,
                    Alignment::Right => ColumnAlignment::Right,
                })
                .collect();
            *i += 1;
            let (headers, rows) = collect_table(events, i);
            Some(DocumentNode::Table {
                alignments,
                headers,
                rows,
            })
        }

        Event::Start(Tag::BlockQuote(_)) => {
            *i += 1;
            let nodes = collect_blocks(events, i, &|e| matches!(e, TagEnd::BlockQuote(_)));
            Some(DocumentNode::Blockquote(Document { nodes }))
        }

        Event::Start(Tag::List(start)) => {
            let start = *start;
            *i += 1;
            Some(collect_list(events, i, start))
        }

        Event::Start(Tag::HtmlBlock) => {
            *i += 1;
            let html = collect_text_until(events, i, |e| matches!(e, TagEnd::HtmlBlock));
            Some(DocumentNode::HtmlBlock(html))
        }

        Event::Rule => {
            *i += 1;
            Some(DocumentNode::HorizontalRule)
        }

        // Tight list items carry their text without a Paragraph wrapper.
        ev if is_inline_event(ev) => {
            let inlines = collect_inlines(events, i, &|_| false);
            Some(DocumentNode::Paragraph(inlines))
        }

        _ => {
            *i += 1;
            None
        }
    }
}

/// Collect blocks until a matching End tag.
fn collect_blocks(
    events: &Events<'_>,
    i: &mut usize,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<DocumentNode> {
    let mut nodes = Vec::new();

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::End(_) => {
                *i += 1;
            }
            _ => {
                if let Some(node) = collect_block(events, i) {
                    nodes.push(node);
                }
            }
        }
    }

    nodes
}

/// Collect list items until End(List). The list is loose when its items wrap
/// their text in Paragraph events.
fn collect_list(events: &Events<'_>, i: &mut usize, start: Option<u64>) -> DocumentNode {
    let mut items = Vec::new();
    let mut loose = false;

    while *i < events.len() {
        match &events[*i].0 {
            Event::End(TagEnd::List(_)) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::Item) => {
                *i += 1;
                loose |= matches!(events.get(*i), Some((Event::Start(Tag::Paragraph), _)));
                let nodes = collect_blocks(events, i, &|e| matches!(e, TagEnd::Item));
                items.push(Document { nodes });
            }
            _ => {
                *i += 1;
            }
        }
    }

    match start {
        Some(start) => DocumentNode::OrderedList {
            start,
            items,
            loose,
        },
        None => DocumentNode::UnorderedList { items, loose },
    }
}

/// Collect table headers and rows.
fn collect_table(
    events: &Events<'_>,
    i: &mut usize,
) -> (Vec<Vec<InlineNode>>, Vec<Vec<Vec<InlineNode>>>) {
    let mut headers: Vec<Vec<InlineNode>> = Vec::new();
    let mut rows: Vec<Vec<Vec<InlineNode>>> = Vec::new();
    let mut in_head = false;
    let mut current_row: Vec<Vec<InlineNode>> = Vec::new();

    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(TagEnd::Table) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::TableHead) => {
                in_head = true;
                *i += 1;
            }
            Event::End(TagEnd::TableHead) => {
                in_head = false;
                headers = std::mem::take(&mut current_row);
                *i += 1;
            }
            Event::Start(Tag::TableRow) => {
                current_row = Vec::new();
                *i += 1;
            }
            Event::End(TagEnd::TableRow) => {
                if !in_head {
                    rows.push(std::mem::take(&mut current_row));
                }
                *i += 1;
            }
            Event::Start(Tag::TableCell) => {
                *i += 1;
                let cell = collect_inlines(events, i, &|e| matches!(e, TagEnd::TableCell));
                current_row.push(cell);
            }
            _ => {
                *i += 1;
            }
        }
    }

    (headers, rows)
}

// ---------------------------------------------------------------------------
// Inline collection
// ---------------------------------------------------------------------------

/// Collect inline nodes until a matching End tag (consumed), or until a
/// block-level event (left in place).
fn collect_inlines(
    events: &Events<'_>,
    i: &mut usize,
    is_end: &dyn Fn(&TagEnd) -> bool,
) -> Vec<InlineNode> {
    let mut inlines = Vec::new();

    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::End(_) | Event::Rule => break,
            Event::Start(tag) if !is_inline_tag(tag) => break,
            Event::Text(s) => {
                push_text(&mut inlines, s);
                *i += 1;
            }
            Event::Code(s) => {
                inlines.push(InlineNode::CodeSpan(s.to_string()));
                *i += 1;
            }
            Event::InlineHtml(s) => {
                inlines.push(InlineNode::Html(s.to_string()));
                *i += 1;
            }
            Event::SoftBreak => {
                inlines.push(InlineNode::SoftBreak);
                *i += 1;
            }
            Event::HardBreak => {
                inlines.push(InlineNode::HardBreak);
                *i += 1;
            }
            Event::Start(Tag::Strong) => {
                *i += 1;
                let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strong));
                inlines.push(InlineNode::Strong(children));
            }
            Event::Start(Tag::Emphasis) => {
                *i += 1;
                let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Emphasis));
                inlines.push(InlineNode::Emphasis(children));
            }
            Event::Start(Tag::Strikethrough) => {
                *i += 1;
                let children = collect_inlines(events, i, &|e| matches!(e, TagEnd::Strikethrough));
                inlines.push(InlineNode::Strikethrough(children));
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                *i += 1;
                let content = collect_inlines(events, i, &|e| matches!(e, TagEnd::Link));
                inlines.push(InlineNode::Link {
                    dest,
                    title,
                    content,
                });
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let dest = dest_url.to_string();
                let title = title.to_string();
                *i += 1;
                let alt = collect_inlines(events, i, &|e| matches!(e, TagEnd::Image));
                inlines.push(InlineNode::Image { dest, title, alt });
            }
            _ => {
                *i += 1;
            }
        }
    }

    inlines
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append text, joining it onto a preceding Text node. The Markdown parser
/// splits text around escapes and entities.
fn push_text(inlines: &mut Vec<InlineNode>, s: &str) {
    match inlines.last_mut() {
        Some(InlineNode::Text(last)) => last.push_str(s),
        _ => inlines.push(InlineNode::Text(s.to_string())),
    }
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Strong | Tag::Emphasis | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_event(ev: &Event<'_>) -> bool {
    match ev {
        Event::Start(tag) => is_inline_tag(tag),
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineHtml(_)
        | Event::SoftBreak
        | Event::HardBreak => true,
        _ => false,
    }
}

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Collect all text content until a matching End tag.
fn collect_text_until(
    events: &Events<'_>,
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(tag_end) if is_end(tag_end) => {
                *i += 1;
                break;
            }
            Event::Text(s) | Event::Html(s) => {
                text.push_str(s);
                *i += 1;
            }
            _ => {
                *i += 1;
            }
        }
    }
    text
}
