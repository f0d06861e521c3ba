use serde::{Deserialize, Serialize};

use crate::formats::date_stamp::{DateTokenStyle, PathDateParser};

/// Where to look for files and how their names are dated.
///
/// The tolerance of a lookup is not part of the configuration, it is chosen
/// by the caller per lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Glob pattern matching the data files. A leading `~` is the home directory.
    pub pattern: String,
    /// File extension following the date token, without the dot.
    pub extension: String,
    pub date_token: DateTokenStyle,
    /// Leave files without a date token out of the catalog instead of failing.
    pub skip_mismatched: bool,
}

impl IndexConfig {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_date_token(mut self, date_token: DateTokenStyle) -> Self {
        self.date_token = date_token;
        self
    }

    pub fn with_skip_mismatched(mut self, skip_mismatched: bool) -> Self {
        self.skip_mismatched = skip_mismatched;
        self
    }

    pub fn date_parser(&self) -> PathDateParser {
        PathDateParser::new(self.extension.as_str(), self.date_token)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            pattern: "*.nc".to_string(),
            extension: "nc".to_string(),
            date_token: DateTokenStyle::default(),
            skip_mismatched: false,
        }
    }
}

pub(crate) fn expand_home(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return pattern.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => pattern.to_string(),
    }
}
