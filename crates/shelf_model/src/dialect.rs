//! The token vocabulary of the interchange format.
//!
//! Section keywords, pin-attribute tokens, and marker tokens are not
//! hard-coded into the parsers; they live in an immutable [`Dialect`] value
//! that is passed explicitly to every parse and write call. The default
//! dialect matches released benchmark files. A custom dialect can be
//! loaded from a TOML file for tooling that has to read nonstandard
//! spellings.

use crate::error::FormatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The token vocabulary used by the parsers and writers.
///
/// All fields default to the spellings used in released benchmarks; any
/// subset can be overridden in a TOML dialect file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dialect {
    /// Prefix that starts a comment line.
    pub comment_prefix: String,
    /// Keyword opening a cell definition in `.lib`.
    pub cell_keyword: String,
    /// Keyword declaring a pin inside a cell definition.
    pub pin_keyword: String,
    /// Keyword closing a section (`END CELL`, `END SITE`, ...).
    pub end_keyword: String,
    /// Keyword opening a site-type definition in `.scl`.
    pub site_keyword: String,
    /// Keyword opening the cell-to-resource mapping section in `.scl`.
    pub resources_keyword: String,
    /// Keyword opening the device grid section in `.scl`.
    pub sitemap_keyword: String,
    /// Keyword opening a net in `.nets`.
    pub net_keyword: String,
    /// Keyword closing a net in `.nets`.
    pub endnet_keyword: String,
    /// Marker on a `.pl` entry that locks the placement.
    pub fixed_marker: String,
    /// Pin-direction token for inputs.
    pub input_token: String,
    /// Pin-direction token for outputs.
    pub output_token: String,
    /// Pin-direction token for bidirectional pins.
    pub bidir_token: String,
    /// Pin-flag token marking a clock pin.
    pub clock_token: String,
    /// Pin-flag token marking a control pin.
    pub control_token: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            comment_prefix: "#".to_string(),
            cell_keyword: "CELL".to_string(),
            pin_keyword: "PIN".to_string(),
            end_keyword: "END".to_string(),
            site_keyword: "SITE".to_string(),
            resources_keyword: "RESOURCES".to_string(),
            sitemap_keyword: "SITEMAP".to_string(),
            net_keyword: "net".to_string(),
            endnet_keyword: "endnet".to_string(),
            fixed_marker: "FIXED".to_string(),
            input_token: "INPUT".to_string(),
            output_token: "OUTPUT".to_string(),
            bidir_token: "BIDIR".to_string(),
            clock_token: "CLOCK".to_string(),
            control_token: "CTRL".to_string(),
        }
    }
}

impl Dialect {
    /// Loads a dialect from a TOML file.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FormatError::new(format!("failed to read dialect file: {e}")))?;
        Self::from_toml_str(&content).map_err(|e| e.with_file(path))
    }

    /// Parses and validates a dialect from TOML text.
    ///
    /// Useful for testing without filesystem dependencies.
    pub fn from_toml_str(content: &str) -> Result<Self, FormatError> {
        let dialect: Dialect = toml::from_str(content)
            .map_err(|e| FormatError::new(format!("failed to parse dialect: {e}")))?;
        dialect.validate()?;
        Ok(dialect)
    }

    /// Checks that no token is empty and the pin-attribute tokens are
    /// pairwise distinct (the `.lib` parser could not tell them apart
    /// otherwise).
    fn validate(&self) -> Result<(), FormatError> {
        let tokens = [
            ("comment_prefix", &self.comment_prefix),
            ("cell_keyword", &self.cell_keyword),
            ("pin_keyword", &self.pin_keyword),
            ("end_keyword", &self.end_keyword),
            ("site_keyword", &self.site_keyword),
            ("resources_keyword", &self.resources_keyword),
            ("sitemap_keyword", &self.sitemap_keyword),
            ("net_keyword", &self.net_keyword),
            ("endnet_keyword", &self.endnet_keyword),
            ("fixed_marker", &self.fixed_marker),
            ("input_token", &self.input_token),
            ("output_token", &self.output_token),
            ("bidir_token", &self.bidir_token),
            ("clock_token", &self.clock_token),
            ("control_token", &self.control_token),
        ];
        for (name, value) in &tokens {
            if value.is_empty() {
                return Err(FormatError::new(format!("dialect token '{name}' is empty")));
            }
        }

        let attrs = [
            &self.input_token,
            &self.output_token,
            &self.bidir_token,
            &self.clock_token,
            &self.control_token,
        ];
        for (i, a) in attrs.iter().enumerate() {
            for b in attrs.iter().skip(i + 1) {
                if a == b {
                    return Err(FormatError::new(format!(
                        "dialect pin-attribute token '{a}' is declared twice"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if the (already trimmed) line is blank or a comment.
    pub(crate) fn skips(&self, line: &str) -> bool {
        line.is_empty() || line.starts_with(&self.comment_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tokens() {
        let d = Dialect::default();
        assert_eq!(d.cell_keyword, "CELL");
        assert_eq!(d.fixed_marker, "FIXED");
        assert_eq!(d.control_token, "CTRL");
    }

    #[test]
    fn empty_toml_is_default() {
        let d = Dialect::from_toml_str("").unwrap();
        assert_eq!(d.sitemap_keyword, "SITEMAP");
    }

    #[test]
    fn partial_override() {
        let d = Dialect::from_toml_str("fixed_marker = \"LOCKED\"\n").unwrap();
        assert_eq!(d.fixed_marker, "LOCKED");
        assert_eq!(d.cell_keyword, "CELL");
    }

    #[test]
    fn unknown_key_rejected() {
        let err = Dialect::from_toml_str("no_such_token = \"X\"\n").unwrap_err();
        assert!(err.message.contains("failed to parse dialect"));
    }

    #[test]
    fn empty_token_rejected() {
        let err = Dialect::from_toml_str("pin_keyword = \"\"\n").unwrap_err();
        assert!(err.message.contains("'pin_keyword' is empty"));
    }

    #[test]
    fn duplicate_attribute_token_rejected() {
        let err = Dialect::from_toml_str("clock_token = \"CTRL\"\n").unwrap_err();
        assert!(err.message.contains("declared twice"));
    }

    #[test]
    fn skips_blank_and_comment() {
        let d = Dialect::default();
        assert!(d.skips(""));
        assert!(d.skips("# a comment"));
        assert!(!d.skips("CELL LUT6"));
    }
}
