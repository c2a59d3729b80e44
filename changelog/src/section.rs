//! Locating a release section and the bullet list beneath its heading.

use crate::document::DocumentNode;
use crate::release::Release;
use crate::{Block, Changelog};

/// Heading level that delimits release sections.
pub const SECTION_LEVEL: u8 = 2;

/// A level-2 heading that matched a release selector.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Position of the heading among the changelog's top-level blocks.
    pub index: usize,
    pub heading: &'a Block,
}

fn section_headings(changelog: &Changelog) -> impl Iterator<Item = (usize, &Block)> {
    changelog
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| block.node.heading_level() == Some(SECTION_LEVEL))
}

/// Find the first level-2 heading in document order that identifies `release`.
pub fn locate<'a>(changelog: &'a Changelog, release: &Release) -> Option<Section<'a>> {
    section_headings(changelog)
        .find(|(_, block)| release.matches(&block.node.plain_text()))
        .map(|(index, heading)| Section { index, heading })
}

/// The unordered list immediately following the heading at `heading_index`.
///
/// Only the adjacent block is considered: anything in between, even an empty
/// paragraph, means the section has no list.
pub fn extract(changelog: &Changelog, heading_index: usize) -> Option<&DocumentNode> {
    changelog
        .blocks
        .get(heading_index + 1)
        .map(|block| &block.node)
        .filter(|node| node.is_unordered_list())
}

/// Titles of every level-2 heading, in document order.
pub fn releases(changelog: &Changelog) -> Vec<String> {
    section_headings(changelog)
        .map(|(_, block)| block.node.plain_text())
        .collect()
}
