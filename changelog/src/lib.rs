pub mod document;
pub mod error;
pub mod parser;
pub mod release;
pub mod render;
pub mod section;

use std::ops::Range;

pub use error::ChangelogError;
pub use release::Release;

use crate::document::DocumentNode;

/// A parsed changelog: its top-level blocks in document order.
#[derive(Debug, Clone)]
pub struct Changelog {
    pub blocks: Vec<Block>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

/// A top-level block with its location in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub node: DocumentNode,
    /// Byte span in source for error reporting.
    pub span: Range<usize>,
}

/// What to do when a release heading isn't directly followed by a bullet list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptySectionPolicy {
    /// Report [`Extraction::Empty`] and let the caller print nothing.
    #[default]
    Lenient,
    /// Fail with [`ChangelogError::EmptySection`].
    Strict,
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The rendered bullet list, trimmed.
    Entries(String),
    /// The heading was found but has no list beneath it.
    Empty {
        /// Span of the matched heading.
        heading: Range<usize>,
    },
}

/// Locate the section for `release`, take the list directly under its heading
/// and render it back to Markdown.
pub fn extract_release(
    changelog: &Changelog,
    release: &Release,
    policy: EmptySectionPolicy,
) -> Result<Extraction, ChangelogError> {
    let Some(section) = section::locate(changelog, release) else {
        return Err(ChangelogError::SectionNotFound {
            release: release.clone(),
            available: section::releases(changelog),
        });
    };

    match section::extract(changelog, section.index) {
        Some(list) => Ok(Extraction::Entries(render::render(list))),
        None => match policy {
            EmptySectionPolicy::Lenient => Ok(Extraction::Empty {
                heading: section.heading.span.clone(),
            }),
            EmptySectionPolicy::Strict => Err(ChangelogError::EmptySection {
                release: release.clone(),
                span: section.heading.span.clone(),
            }),
        },
    }
}
