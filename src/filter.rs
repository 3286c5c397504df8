use crate::error::ExportError;
use regex::{Regex, RegexBuilder};

/// Case-insensitive regular expression matched against book titles.
#[derive(Debug, Clone)]
pub struct TitleFilter {
    regex: Regex,
}

impl TitleFilter {
    pub fn new(pattern: &str) -> Result<Self, ExportError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    /// True when the pattern matches anywhere in `title`.
    pub fn matches(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
