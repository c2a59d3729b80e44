pub mod error;
mod structural;

pub use error::ParseError;

use crate::Changelog;

/// Parser entry point.
pub struct Parser {
    source: Vec<u8>,
    file_id: usize,
}

impl Parser {
    pub fn new(source: impl Into<Vec<u8>>, file_id: usize) -> Self {
        Parser {
            source: source.into(),
            file_id,
        }
    }

    /// Parse the raw file contents into a Changelog.
    ///
    /// Markdown itself never fails to parse; the only rejected input is
    /// content that isn't valid UTF-8.
    pub fn parse(&self) -> Result<Changelog, ParseError> {
        let source = std::str::from_utf8(&self.source).map_err(|err| {
            // The span stays within the valid prefix so it can be shown
            // against a lossily decoded copy of the file.
            let end = err.valid_up_to();
            let line_start = self.source[..end]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |p| p + 1);
            ParseError::error("changelog is not valid UTF-8", line_start..end, self.file_id)
                .with_note(format!("invalid byte sequence at offset {}", end))
        })?;

        let blocks = structural::parse_blocks(source);
        tracing::debug!(blocks = blocks.len(), "parsed changelog");

        Ok(Changelog {
            blocks,
            source_id: self.file_id,
        })
    }
}
