//! Ordered font registry with a designated default font

use crate::{Font, PdfError, Result};
use std::path::{Path, PathBuf};

/// Point size width tables are computed at unless configured otherwise
pub const DEFAULT_REFERENCE_SIZE: f64 = 40.0;

/// Ordered collection of fonts
///
/// The default font always sits at index 0; fallback fonts follow in
/// registration order. The registry is built once and only read afterwards.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: Vec<Font>,
}

impl FontRegistry {
    /// Create a registry holding only the default font
    pub fn new(default: Font) -> Self {
        Self {
            fonts: vec![default],
        }
    }

    /// Load the default font and every font file in `fallback_dir`
    ///
    /// A missing or unreadable default font is fatal. Fallback fonts that
    /// fail to load are skipped with a warning, as is a missing fallback
    /// directory. Fallback files are registered in file-name order so the
    /// scan order of [`find_covering_font`](Self::find_covering_font) is
    /// stable across runs.
    ///
    /// # Arguments
    /// * `default_path` - Default font file
    /// * `fallback_dir` - Directory of additional `.ttf`/`.otf` files
    /// * `reference_size` - Point size widths are measured at
    pub fn load<P: AsRef<Path>, D: AsRef<Path>>(
        default_path: P,
        fallback_dir: D,
        reference_size: f64,
    ) -> Result<Self> {
        let default_path = default_path.as_ref();
        let default = Font::from_file(default_path, reference_size)?;
        log::info!(
            "Loaded default font '{}' ({} glyphs) from {}",
            default.name(),
            default.glyph_count(),
            default_path.display()
        );

        let default_canonical = default.source().and_then(|p| std::fs::canonicalize(p).ok());
        let mut registry = Self::new(default);

        for path in font_files(fallback_dir.as_ref()) {
            if default_canonical.is_some()
                && std::fs::canonicalize(&path).ok() == default_canonical
            {
                log::debug!("Skipping {}: same file as default font", path.display());
                continue;
            }

            match Font::from_file(&path, reference_size) {
                Ok(font) => {
                    let name = font.name().to_string();
                    let glyphs = font.glyph_count();
                    match registry.register(font) {
                        Ok(()) => log::debug!(
                            "Loaded fallback font '{name}' ({glyphs} glyphs) from {}",
                            path.display()
                        ),
                        Err(e) => log::warn!("Skipping fallback font {}: {e}", path.display()),
                    }
                }
                Err(e) => log::warn!("Skipping fallback font: {e}"),
            }
        }

        log::info!("Loaded {} fallback fonts", registry.fallbacks().len());
        Ok(registry)
    }

    /// Append a fallback font
    ///
    /// Names must be unique across the registry, including the default font.
    pub fn register(&mut self, font: Font) -> Result<()> {
        if self.fonts.iter().any(|f| f.name() == font.name()) {
            return Err(PdfError::FontParseError(format!(
                "a font named '{}' is already registered",
                font.name()
            )));
        }
        self.fonts.push(font);
        Ok(())
    }

    /// The default font
    pub fn default_font(&self) -> &Font {
        &self.fonts[0]
    }

    /// Fallback fonts in registration order
    pub fn fallbacks(&self) -> &[Font] {
        &self.fonts[1..]
    }

    /// All fonts, default first
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// Look up a font by name
    pub fn get(&self, name: &str) -> Result<&Font> {
        self.fonts
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Width of `text` in points at the reference size
    pub fn width_of(&self, font_name: &str, text: &str) -> Result<f64> {
        self.get(font_name)?.text_width(text)
    }

    /// First font, in registration order, covering every codepoint of `text`
    ///
    /// The default font is consulted first, then each fallback in turn.
    pub fn find_covering_font(&self, text: &str) -> Option<&Font> {
        self.fonts.iter().find(|f| f.covers_all(text))
    }
}

/// Font files directly inside `dir`, sorted by file name
fn font_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read fallback font directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}
