use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const UNRELEASED: &str = "unreleased";
const LATEST: &str = "latest";

/// Which changelog section to extract.
///
/// Parsing never fails: the reserved words `unreleased` and `latest` are
/// recognised case-insensitively and anything else names a release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Release {
    /// The `## Unreleased` section.
    #[default]
    Unreleased,
    /// The first level-2 heading that isn't `Unreleased`.
    Latest,
    /// A release heading matched by name, case-insensitively.
    /// The original casing is kept for messages.
    Named(String),
}

impl Release {
    /// Whether a level-2 heading with this plain text identifies the release.
    pub fn matches(&self, heading: &str) -> bool {
        let heading = heading.to_lowercase();
        match self {
            Release::Unreleased => heading == UNRELEASED,
            Release::Latest => heading != UNRELEASED,
            Release::Named(name) => heading == name.to_lowercase(),
        }
    }

    /// Canonical text with the first letter capitalized, for user-facing messages.
    pub fn display_name(&self) -> String {
        let text = self.to_string();
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for Release {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let release = match s.to_lowercase().as_str() {
            UNRELEASED => Release::Unreleased,
            LATEST => Release::Latest,
            _ => Release::Named(s.to_string()),
        };
        Ok(release)
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Release::Unreleased => f.write_str(UNRELEASED),
            Release::Latest => f.write_str(LATEST),
            Release::Named(name) => f.write_str(name),
        }
    }
}
