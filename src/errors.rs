//! Error types for loading puzzle structures and word lists, and for writing rendered grids.
//!
//! Solving itself never produces a `ParseError`: an unsatisfiable grid is reported as a
//! [`FillFailure`](crate::FillFailure) instead.

use std::io;
use std::path::PathBuf;

/// Custom error type for input parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("could not read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("structure contains no rows")]
    EmptyStructure,
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::Io { .. } => "P001",
            ParseError::EmptyStructure => "P002",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::Io { .. } => None,
            ParseError::EmptyStructure => {
                Some("Use one line per grid row, with '_' for open cells and '#' for walls")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{} ({})\n  help: {help}", self, self.code()),
            None => format!("{} ({})", self, self.code()),
        }
    }
}

/// Errors raised while drawing a filled grid to an image file
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not read font \"{}\": {source}", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("\"{}\" is not a usable font", path.display())]
    InvalidFont { path: PathBuf },

    #[error("could not write image \"{}\": {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RenderError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::FontIo { .. } => "R001",
            RenderError::InvalidFont { .. } => "R002",
            RenderError::Image { .. } => "R003",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            RenderError::FontIo { .. } => None,
            RenderError::InvalidFont { .. } => Some("Pass a TrueType (.ttf) or OpenType (.otf) font"),
            RenderError::Image { .. } => {
                Some("Use an image extension such as .png, or any other extension for a text grid")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{} ({})\n  help: {help}", self, self.code()),
            None => format!("{} ({})", self, self.code()),
        }
    }
}
