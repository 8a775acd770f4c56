//! Run configuration loaded from JSON

use crate::{CertificateError, Result};
use pdf_core::{Color, DEFAULT_REFERENCE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Baseline of the name line, in points from the template's bottom edge
pub const DEFAULT_BASELINE: f64 = 217.0;

/// Kerning term for alternate-script text, in points
///
/// The alternate run starts `(w(")") - ALT_TEXT_KERNING) / 2` after the end
/// of the opening run. Tuned by eye against Inter at 40pt; recalibrate if
/// the default font changes.
pub const ALT_TEXT_KERNING: f64 = 7.0;

/// RGB text color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for TextColor {
    fn default() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

impl From<TextColor> for Color {
    fn from(c: TextColor) -> Self {
        Color::rgb(c.r, c.g, c.b)
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateConfig {
    /// Single-page template PDF
    pub template: PathBuf,

    /// Default and fallback fonts
    pub fonts: FontsConfig,

    /// Name line placement
    pub layout: LayoutConfig,

    /// Where the output goes
    pub output: OutputConfig,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("template.pdf"),
            fonts: FontsConfig::default(),
            layout: LayoutConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Font locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FontsConfig {
    /// Font used for the primary text and the parentheses
    pub default: PathBuf,

    /// Directory scanned for `.ttf`/`.otf` fallback fonts
    pub fallback_dir: PathBuf,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            default: PathBuf::from("Fonts/Inter-Regular.ttf"),
            fallback_dir: PathBuf::from("Fonts"),
        }
    }
}

/// Name line placement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Point size for every fragment
    pub font_size: f64,

    /// Baseline in points from the page's bottom edge
    pub baseline: f64,

    /// Kerning term for alternate-script text, in points
    pub alt_correction: f64,

    /// Text color
    pub color: TextColor,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_REFERENCE_SIZE,
            baseline: DEFAULT_BASELINE,
            alt_correction: ALT_TEXT_KERNING,
            color: TextColor::default(),
        }
    }
}

/// Output location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    /// Directory the PDF is written to
    pub dir: PathBuf,

    /// Event identifier prefixed to the file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            id: None,
        }
    }
}

impl CertificateConfig {
    /// Parse a configuration from JSON, validating it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CertificateError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if !(self.layout.font_size.is_finite() && self.layout.font_size > 0.0) {
            return Err(CertificateError::ConfigError(format!(
                "layout.fontSize must be positive, got {}",
                self.layout.font_size
            )));
        }
        if !self.layout.baseline.is_finite() || !self.layout.alt_correction.is_finite() {
            return Err(CertificateError::ConfigError(
                "layout.baseline and layout.altCorrection must be finite".to_string(),
            ));
        }
        let c = self.layout.color;
        if [c.r, c.g, c.b].iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(CertificateError::ConfigError(format!(
                "layout.color components must be within 0..1, got ({}, {}, {})",
                c.r, c.g, c.b
            )));
        }
        if matches!(&self.output.id, Some(id) if id.contains(['/', '\\'])) {
            return Err(CertificateError::ConfigError(
                "output.id must not contain path separators".to_string(),
            ));
        }
        Ok(())
    }

    /// Output file name: `<id>-certificates.pdf`, or `certificates.pdf`
    pub fn output_file_name(&self) -> String {
        match self.output.id.as_deref() {
            Some(id) if !id.is_empty() => format!("{id}-certificates.pdf"),
            _ => "certificates.pdf".to_string(),
        }
    }

    /// Full path of the output file
    pub fn output_path(&self) -> PathBuf {
        self.output.dir.join(self.output_file_name())
    }
}
