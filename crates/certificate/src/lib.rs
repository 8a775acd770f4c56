//! Certificate - bilingual name certificates stamped over a PDF template
//!
//! This crate provides:
//! - Centered layout of names mixing a default and a fallback font
//! - Rendering of layouts onto copies of a template page
//! - A batch driver that skips bad names and keeps going
//! - JSON configuration and registration CSV ingestion
//!
//! # Example
//!
//! ```ignore
//! use certificate::{generate, CertificateConfig};
//!
//! let config = CertificateConfig::from_file("certgen.json")?;
//! let names = vec!["Alice Smith".to_string(), "Li Wei (李伟)".to_string()];
//! let report = generate(&config, &names, false)?;
//! println!("{} written, {} skipped", report.written, report.skipped.len());
//! ```

mod batch;
mod config;
mod layout;
pub mod participants;
mod renderer;

pub use batch::{generate, BatchReport, CertificateBatch, SkippedName};
pub use config::{
    CertificateConfig, FontsConfig, LayoutConfig, OutputConfig, TextColor, ALT_TEXT_KERNING,
    DEFAULT_BASELINE,
};
pub use layout::{Fragment, LayoutEngine, LayoutPlan};
pub use participants::{Eligibility, Registration};
pub use renderer::{CertificateRenderer, DocumentAssembler};

use bilingual_name::NameError;
use pdf_core::PdfError;
use thiserror::Error;

/// Errors that can occur while producing certificates
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("No font covers {text:?} in name {name:?}")]
    NoCoveringFont { name: String, text: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Name error: {0}")]
    NameError(#[from] NameError),

    #[error("PDF error: {0}")]
    PdfError(#[from] PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CertificateError {
    /// Whether the error concerns one name only
    ///
    /// Recoverable errors skip the name and let the batch continue; any
    /// other error aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoCoveringFont { .. }
                | Self::NameError(_)
                | Self::PdfError(PdfError::GlyphNotFound { .. })
        )
    }

    /// Whether a font lacked a glyph the layout needed
    pub fn is_missing_glyph(&self) -> bool {
        matches!(self, Self::PdfError(PdfError::GlyphNotFound { .. }))
    }
}

/// Result type for certificate operations
pub type Result<T> = std::result::Result<T, CertificateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(CertificateError::NoCoveringFont {
            name: "名前 (名前)".to_string(),
            text: "名前".to_string(),
        }
        .is_recoverable());
        assert!(
            CertificateError::from(NameError::Malformed("Bad (Name".to_string())).is_recoverable()
        );
        assert!(CertificateError::from(PdfError::GlyphNotFound {
            font: "Inter".to_string(),
            ch: 'é',
        })
        .is_recoverable());
    }

    #[test]
    fn test_missing_glyph() {
        let err = CertificateError::from(PdfError::GlyphNotFound {
            font: "Inter".to_string(),
            ch: '李',
        });
        assert!(err.is_missing_glyph());
        assert!(!CertificateError::from(NameError::Malformed("(".to_string())).is_missing_glyph());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(!CertificateError::from(PdfError::EmptyTemplate).is_recoverable());
        assert!(!CertificateError::from(PdfError::FontLoad {
            path: "Fonts/Inter-Regular.ttf".to_string(),
            reason: "not found".to_string(),
        })
        .is_recoverable());
        assert!(!CertificateError::ConfigError("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_no_covering_font_message() {
        let err = CertificateError::NoCoveringFont {
            name: "名前 (名前)".to_string(),
            text: "名前".to_string(),
        };
        assert_eq!(err.to_string(), "No font covers \"名前\" in name \"名前 (名前)\"");
    }
}
