//! Centered layout of a name line mixing two fonts
//!
//! A name with an alternate part is drawn as three runs:
//!
//! ```text
//! | primary (  | alternate | ) |
//!   default      fallback   default
//! ```
//!
//! The combined width is centered on the page. The primary run starts at
//! the left edge of that box and the `)` ends at its right edge. The
//! alternate run starts after the opening parenthesis, offset by half of
//! the `)` width less a kerning term. Names
//! without an alternate part are a single run centered at `pageWidth / 2`.

use crate::config::{ALT_TEXT_KERNING, DEFAULT_BASELINE};
use crate::{CertificateError, Result};
use bilingual_name::ParsedName;
use pdf_core::{Anchor, FontRegistry};

/// One independently positioned run of text
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Text to draw
    pub text: String,
    /// Registry name of the font to draw with
    pub font: String,
    /// X coordinate in points
    pub x: f64,
    /// Baseline in points from the bottom edge
    pub y: f64,
    /// Whether `x` is the start or the midpoint of the run
    pub anchor: Anchor,
    /// Width of the run in points
    pub width: f64,
}

/// Fragments making up one name line, in draw order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPlan {
    pub fragments: Vec<Fragment>,
}

impl LayoutPlan {
    /// Width of the whole line
    pub fn total_width(&self) -> f64 {
        self.fragments.iter().map(|f| f.width).sum()
    }
}

/// Computes fragment positions against a font registry
pub struct LayoutEngine<'a> {
    registry: &'a FontRegistry,
    page_width: f64,
    baseline: f64,
    alt_correction: f64,
}

impl<'a> LayoutEngine<'a> {
    /// Create an engine for pages `page_width` points wide
    pub fn new(registry: &'a FontRegistry, page_width: f64) -> Self {
        Self {
            registry,
            page_width,
            baseline: DEFAULT_BASELINE,
            alt_correction: ALT_TEXT_KERNING,
        }
    }

    /// Set the baseline (points from the bottom edge)
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the kerning term for alternate-script text
    ///
    /// A value equal to the `)` width places the alternate run flush
    /// against the opening parenthesis.
    pub fn with_alt_correction(mut self, alt_correction: f64) -> Self {
        self.alt_correction = alt_correction;
        self
    }

    /// Lay out one parsed name
    ///
    /// # Errors
    /// * [`CertificateError::NoCoveringFont`] if no registered font covers
    ///   every character of the alternate part
    /// * [`pdf_core::PdfError::GlyphNotFound`] if the default font cannot
    ///   draw the primary part
    pub fn layout(&self, name: &ParsedName) -> Result<LayoutPlan> {
        match name.alternate.as_deref() {
            None => self.layout_single(&name.primary),
            Some(alternate) => self.layout_bilingual(name, alternate),
        }
    }

    fn layout_single(&self, text: &str) -> Result<LayoutPlan> {
        let default = self.registry.default_font();
        let width = default.text_width(text)?;

        Ok(LayoutPlan {
            fragments: vec![Fragment {
                text: text.to_string(),
                font: default.name().to_string(),
                x: self.page_width / 2.0,
                y: self.baseline,
                anchor: Anchor::Center,
                width,
            }],
        })
    }

    fn layout_bilingual(&self, name: &ParsedName, alternate: &str) -> Result<LayoutPlan> {
        let default = self.registry.default_font();
        let used = self
            .registry
            .find_covering_font(alternate)
            .ok_or_else(|| CertificateError::NoCoveringFont {
                name: name.to_string(),
                text: alternate.to_string(),
            })?;

        let opening = format!("{} (", name.primary);
        let alt_width = used.text_width(alternate)?;
        let full_width = default.text_width(&format!("{} ()", name.primary))? + alt_width;
        let opening_width = default.text_width(&opening)?;
        let close_width = default.text_width(")")?;

        let left = (self.page_width - full_width) / 2.0;
        let close_x = left + full_width - close_width;
        let alt_x = left + opening_width + (close_width - self.alt_correction) / 2.0;

        log::debug!(
            "Layout {name}: font '{}', width {full_width}, left {left}",
            used.name()
        );

        let fragment = |text: &str, font: &str, x: f64, width: f64| Fragment {
            text: text.to_string(),
            font: font.to_string(),
            x,
            y: self.baseline,
            anchor: Anchor::Start,
            width,
        };

        Ok(LayoutPlan {
            fragments: vec![
                fragment(&opening, default.name(), left, opening_width),
                fragment(")", default.name(), close_x, close_width),
                fragment(alternate, used.name(), alt_x, alt_width),
            ],
        })
    }
}
