//! PDF Core - Low-level PDF and font handling
//!
//! This crate provides functionality for:
//! - Loading fonts and their per-codepoint advance widths
//! - An ordered font registry with a designated default font
//! - Opening a single-page template and cloning it into new pages
//! - Drawing positioned text runs onto those pages with embedded fonts
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Anchor, FontRegistry, PdfDocument};
//!
//! let registry = FontRegistry::load("Fonts/Inter-Regular.ttf", "Fonts", 40.0)?;
//! let mut doc = PdfDocument::open("template.pdf")?;
//! let page = doc.add_page_from_template()?;
//! let font = registry.default_font();
//! doc.draw_text(page, font, "Alice Smith", 421.0, 217.0, Anchor::Center)?;
//! doc.save("certificates.pdf")?;
//! ```

mod document;
mod font;
mod registry;
mod text;

pub use document::{Color, PdfDocument, PageSize};
pub use font::{Font, FontObjects, Glyph, OutlineFormat};
pub use registry::{FontRegistry, DEFAULT_REFERENCE_SIZE};
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF and font operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Template has no pages")]
    EmptyTemplate,

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Failed to load font {path}: {reason}")]
    FontLoad { path: String, reason: String },

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Font '{font}' has no glyph for {ch:?}")]
    GlyphNotFound { font: String, ch: char },

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Horizontal anchor of a text run relative to its x coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    /// Text starts at x
    #[default]
    Start,
    /// Text is centered around x
    Center,
}
