//! Design manifest (`.aux`) parsing.
//!
//! The `.aux` file names a design and lists its member files:
//!
//! ```text
//! # generated by release 1.2 on 03/14/2025
//! demo : demo.lib demo.scl demo.nodes demo.nets demo.pl demo.wts
//! ```
//!
//! Release headers carry a version token and a `MM/DD/YYYY` date inside
//! comments; both are captured when present but are not required.

use crate::dialect::Dialect;
use crate::error::FormatError;
use serde::{Deserialize, Serialize};

/// A parsed `.aux` manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxManifest {
    /// The design name from the data line.
    pub design_name: String,
    /// The member files, in manifest order.
    pub files: Vec<String>,
    /// Release version from the header comment, if present.
    pub version: Option<String>,
    /// Release date (`MM/DD/YYYY`) from the header comment, if present.
    pub date: Option<String>,
}

impl AuxManifest {
    /// Returns the first member file with the given extension, if any.
    pub fn member_with_extension(&self, extension: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| {
                std::path::Path::new(f)
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
            })
            .map(|f| f.as_str())
    }
}

/// Parses a `.aux` manifest.
///
/// # Errors
///
/// Returns [`FormatError`] if the design line is missing, duplicated, or
/// lists no member files.
pub fn parse_aux(text: &str, dialect: &Dialect) -> Result<AuxManifest, FormatError> {
    let mut manifest: Option<AuxManifest> = None;
    let mut version = None;
    let mut date = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(&dialect.comment_prefix) {
            let comment = line.trim_start_matches(&dialect.comment_prefix).trim();
            let tokens: Vec<&str> = comment.split_whitespace().collect();
            for (i, token) in tokens.iter().enumerate() {
                if token.eq_ignore_ascii_case("version") {
                    if let Some(v) = tokens.get(i + 1) {
                        version.get_or_insert_with(|| v.to_string());
                    }
                }
                if is_date_token(token) {
                    date.get_or_insert_with(|| token.to_string());
                }
            }
            continue;
        }

        let Some((name_part, files_part)) = line.split_once(':') else {
            return Err(FormatError::at_line(
                line_no,
                "expected '<design> : <file> [<file> ...]'".to_string(),
            ));
        };
        if manifest.is_some() {
            return Err(FormatError::at_line(
                line_no,
                "manifest declares more than one design line".to_string(),
            ));
        }
        let design_name = name_part.trim();
        if design_name.is_empty() {
            return Err(FormatError::at_line(line_no, "empty design name".to_string()));
        }
        let files: Vec<String> = files_part
            .split_whitespace()
            .map(|f| f.to_string())
            .collect();
        if files.is_empty() {
            return Err(FormatError::at_line(
                line_no,
                format!("design '{design_name}' lists no member files"),
            ));
        }
        manifest = Some(AuxManifest {
            design_name: design_name.to_string(),
            files,
            version: None,
            date: None,
        });
    }

    let Some(mut manifest) = manifest else {
        return Err(FormatError::new("manifest has no design line".to_string()));
    };
    manifest.version = version;
    manifest.date = date;
    Ok(manifest)
}

/// Matches the `MM/DD/YYYY` date spelling used in release headers.
fn is_date_token(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 10
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && [0, 1, 3, 4, 6, 7, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Serializes a manifest back to `.aux` text.
pub fn write_aux(manifest: &AuxManifest, dialect: &Dialect) -> String {
    let mut out = String::new();
    match (&manifest.version, &manifest.date) {
        (Some(v), Some(d)) => {
            out.push_str(&format!("{} version {v} {d}\n", dialect.comment_prefix));
        }
        (Some(v), None) => out.push_str(&format!("{} version {v}\n", dialect.comment_prefix)),
        (None, Some(d)) => out.push_str(&format!("{} {d}\n", dialect.comment_prefix)),
        (None, None) => {}
    }
    out.push_str(&format!(
        "{} : {}\n",
        manifest.design_name,
        manifest.files.join(" ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        let text = "# generated by release version 1.2 03/14/2025\n\
                    demo : demo.lib demo.scl demo.nodes demo.nets demo.pl\n";
        let aux = parse_aux(text, &Dialect::default()).unwrap();
        assert_eq!(aux.design_name, "demo");
        assert_eq!(aux.files.len(), 5);
        assert_eq!(aux.version.as_deref(), Some("1.2"));
        assert_eq!(aux.date.as_deref(), Some("03/14/2025"));
    }

    #[test]
    fn parse_without_header() {
        let aux = parse_aux("demo : demo.lib demo.scl\n", &Dialect::default()).unwrap();
        assert!(aux.version.is_none());
        assert!(aux.date.is_none());
    }

    #[test]
    fn member_lookup_by_extension() {
        let aux = parse_aux("demo : a.lib b.scl c.nodes\n", &Dialect::default()).unwrap();
        assert_eq!(aux.member_with_extension("scl"), Some("b.scl"));
        assert_eq!(aux.member_with_extension("pl"), None);
    }

    #[test]
    fn missing_design_line_fails() {
        let err = parse_aux("# just a comment\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("no design line"));
    }

    #[test]
    fn duplicate_design_line_fails() {
        let err = parse_aux("a : a.lib\nb : b.lib\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("more than one design line"));
    }

    #[test]
    fn empty_file_list_fails() {
        let err = parse_aux("demo :\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("lists no member files"));
    }

    #[test]
    fn line_without_separator_fails() {
        let err = parse_aux("demo demo.lib\n", &Dialect::default()).unwrap_err();
        assert!(err.message.contains("expected '<design> :"));
    }

    #[test]
    fn date_token_shape() {
        assert!(is_date_token("03/14/2025"));
        assert!(!is_date_token("3/14/2025"));
        assert!(!is_date_token("03-14-2025"));
        assert!(!is_date_token("03/14/25"));
    }

    #[test]
    fn write_roundtrip() {
        let dialect = Dialect::default();
        let text = "# version 2.0 01/02/2024\ndemo : demo.lib demo.scl\n";
        let aux = parse_aux(text, &dialect).unwrap();
        let reparsed = parse_aux(&write_aux(&aux, &dialect), &dialect).unwrap();
        assert_eq!(reparsed.design_name, aux.design_name);
        assert_eq!(reparsed.files, aux.files);
        assert_eq!(reparsed.version, aux.version);
        assert_eq!(reparsed.date, aux.date);
    }
}
