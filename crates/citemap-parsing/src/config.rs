use regex::Regex;
use thiserror::Error;

/// Tunable thresholds and pattern overrides for the structuring pipeline.
///
/// The defaults are what the built-in heuristics were calibrated against;
/// use [`ParsingConfigBuilder`] to adjust them for unusual corpora (e.g. a
/// non-English reference numbering scheme).
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Blocks longer than this are never heading candidates.
    pub heading_len_limit: usize,
    /// Minimum fuzzy score for a normalized heading to match a lexicon alias.
    pub heading_min_score: f64,
    /// A leading block longer than this is not a plausible title line.
    pub title_len_limit: usize,
    /// Minimum length for a pre-heading block to count as paragraph-like
    /// (abstract candidate).
    pub paragraph_min_len: usize,
    /// Maximum number of author surnames kept per reference entry.
    pub max_authors: usize,
    /// Minimum count of line-start numeric markers required before the
    /// numeric split strategy is trusted.
    pub min_numeric_entries: usize,
    /// Override for the line-start numeric entry marker pattern. Capture
    /// group 1 or 2 must hold the printed number.
    pub numeric_entry_re: Option<Regex>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            heading_len_limit: 120,
            heading_min_score: 0.8,
            title_len_limit: 200,
            paragraph_min_len: 80,
            max_authors: 8,
            min_numeric_entries: 2,
            numeric_entry_re: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid regex for {field}: {source}")]
    InvalidRegex {
        field: &'static str,
        source: regex::Error,
    },
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
}

/// Builder for [`ParsingConfig`].
#[derive(Debug, Default)]
pub struct ParsingConfigBuilder {
    heading_len_limit: Option<usize>,
    heading_min_score: Option<f64>,
    title_len_limit: Option<usize>,
    paragraph_min_len: Option<usize>,
    max_authors: Option<usize>,
    min_numeric_entries: Option<usize>,
    numeric_entry_regex: Option<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading_len_limit(mut self, limit: usize) -> Self {
        self.heading_len_limit = Some(limit);
        self
    }

    pub fn heading_min_score(mut self, score: f64) -> Self {
        self.heading_min_score = Some(score);
        self
    }

    pub fn title_len_limit(mut self, limit: usize) -> Self {
        self.title_len_limit = Some(limit);
        self
    }

    pub fn paragraph_min_len(mut self, len: usize) -> Self {
        self.paragraph_min_len = Some(len);
        self
    }

    pub fn max_authors(mut self, max: usize) -> Self {
        self.max_authors = Some(max);
        self
    }

    pub fn min_numeric_entries(mut self, min: usize) -> Self {
        self.min_numeric_entries = Some(min);
        self
    }

    /// Custom line-start numeric entry pattern for the reference splitter.
    pub fn numeric_entry_regex(mut self, pattern: impl Into<String>) -> Self {
        self.numeric_entry_regex = Some(pattern.into());
        self
    }

    pub fn build(self) -> Result<ParsingConfig, ConfigError> {
        let defaults = ParsingConfig::default();

        let heading_min_score = self.heading_min_score.unwrap_or(defaults.heading_min_score);
        if !(0.0..=1.0).contains(&heading_min_score) {
            return Err(ConfigError::OutOfRange {
                field: "heading_min_score",
                range: "[0, 1]",
                value: heading_min_score,
            });
        }

        let numeric_entry_re = match self.numeric_entry_regex {
            Some(pattern) => {
                Some(
                    Regex::new(&pattern).map_err(|source| ConfigError::InvalidRegex {
                        field: "numeric_entry_regex",
                        source,
                    })?,
                )
            }
            None => None,
        };

        Ok(ParsingConfig {
            heading_len_limit: self.heading_len_limit.unwrap_or(defaults.heading_len_limit),
            heading_min_score,
            title_len_limit: self.title_len_limit.unwrap_or(defaults.title_len_limit),
            paragraph_min_len: self.paragraph_min_len.unwrap_or(defaults.paragraph_min_len),
            max_authors: self.max_authors.unwrap_or(defaults.max_authors),
            min_numeric_entries: self
                .min_numeric_entries
                .unwrap_or(defaults.min_numeric_entries),
            numeric_entry_re,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_matches_default_config() {
        let built = ParsingConfigBuilder::new().build().unwrap();
        let defaults = ParsingConfig::default();
        assert_eq!(built.heading_len_limit, defaults.heading_len_limit);
        assert_eq!(built.max_authors, defaults.max_authors);
        assert!(built.numeric_entry_re.is_none());
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = ParsingConfigBuilder::new()
            .numeric_entry_regex(r"([0-9")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn rejects_out_of_range_score() {
        let err = ParsingConfigBuilder::new()
            .heading_min_score(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn overrides_take_effect() {
        let config = ParsingConfigBuilder::new()
            .heading_len_limit(40)
            .max_authors(3)
            .numeric_entry_regex(r"(?m)^<<(\d+)>>\s+")
            .build()
            .unwrap();
        assert_eq!(config.heading_len_limit, 40);
        assert_eq!(config.max_authors, 3);
        assert!(config.numeric_entry_re.is_some());
    }
}
