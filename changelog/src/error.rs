use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::parser::ParseError;
use crate::release::Release;

/// Everything that can stop a release from being extracted.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    /// The changelog file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No level-2 heading matches the requested release.
    #[error("Changelog does not contain '{}' section", release.display_name())]
    SectionNotFound {
        release: Release,
        /// Titles of the level-2 headings that do exist.
        available: Vec<String>,
    },

    /// The release heading exists but isn't directly followed by a bullet list.
    /// Only raised under [`EmptySectionPolicy::Strict`](crate::EmptySectionPolicy).
    #[error("Changelog does not contain elements in the '{}' section", release.display_name())]
    EmptySection {
        release: Release,
        /// Span of the matched heading.
        span: Range<usize>,
    },
}

impl ChangelogError {
    /// Convert to a codespan-reporting Diagnostic against the changelog's file id.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        match self {
            ChangelogError::Parse(err) => err.to_diagnostic(),
            ChangelogError::Io { .. } => Diagnostic::error().with_message(self.to_string()),
            ChangelogError::SectionNotFound { available, .. } => {
                let note = if available.is_empty() {
                    "the changelog has no level-2 release headings".to_string()
                } else {
                    format!("available sections: {}", available.join(", "))
                };
                Diagnostic::error()
                    .with_message(self.to_string())
                    .with_notes(vec![note])
            }
            ChangelogError::EmptySection { span, .. } => Diagnostic::error()
                .with_message(self.to_string())
                .with_labels(vec![
                    Label::primary(file_id, span.clone())
                        .with_message("expected a bullet list directly after this heading"),
                ]),
        }
    }
}
