//! Error types for parsing and loading interchange files.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A fatal syntax or consistency error in an interchange file.
///
/// All parse failures are reported through this one type, carrying the file
/// path (once known), the line number and/or section the failure was
/// detected in, and a human-readable cause. A `FormatError` aborts the load
/// of the file it occurred in; no partial model is returned.
#[derive(Debug, Clone)]
pub struct FormatError {
    /// The file the error occurred in, if known at the point of failure.
    ///
    /// Parsers operate on in-memory text and leave this empty; the design
    /// loader stamps the path on before propagating.
    pub file: Option<PathBuf>,
    /// The 1-based line number the error was detected at, if applicable.
    pub line: Option<u32>,
    /// The section keyword (e.g. `SITEMAP`, `RESOURCES`) active at the
    /// point of failure, if any.
    pub section: Option<String>,
    /// Human-readable cause of the failure.
    pub message: String,
}

impl FormatError {
    /// Creates an error with no location information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            section: None,
            message: message.into(),
        }
    }

    /// Creates an error anchored at a 1-based line number.
    pub fn at_line(line: u32, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: Some(line),
            section: None,
            message: message.into(),
        }
    }

    /// Attaches the section keyword the parser was inside.
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Attaches the file path the text came from.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file.display())?;
        }
        if let Some(line) = self.line {
            write!(f, "{line}:")?;
        }
        if self.file.is_some() || self.line.is_some() {
            write!(f, " ")?;
        }
        if let Some(section) = &self.section {
            write!(f, "in {section}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FormatError {}

/// Errors that can occur while loading a design bundle from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file named by the manifest could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file failed to parse.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// No `.aux` manifest was found in the design directory.
    #[error("no .aux manifest found in {0}")]
    NoManifest(PathBuf),

    /// The manifest names no file with a required extension.
    #[error("manifest for design '{design}' names no .{extension} file")]
    MissingMember {
        /// The design name from the manifest.
        design: String,
        /// The required file extension.
        extension: String,
    },
}

impl LoadError {
    /// Wraps an I/O failure for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
