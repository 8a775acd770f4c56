//! Sequential batch driver

use crate::config::CertificateConfig;
use crate::layout::LayoutEngine;
use crate::renderer::DocumentAssembler;
use crate::{CertificateError, Result};
use bilingual_name::{parse, should_omit_alternate};
use pdf_core::FontRegistry;
use std::path::PathBuf;

/// A name that produced no certificate
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedName {
    pub name: String,
    pub reason: String,
    /// The default font has no glyph for a character of the primary part
    pub missing_glyph: bool,
}

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// Certificates written
    pub written: usize,
    /// Names skipped, in input order
    pub skipped: Vec<SkippedName>,
    /// Output file, once saved
    pub output: Option<PathBuf>,
}

impl BatchReport {
    /// Skipped names the default font cannot draw
    ///
    /// These are usually names written entirely in another script without
    /// parentheses, which never reach the fallback fonts.
    pub fn missing_glyphs(&self) -> impl Iterator<Item = &SkippedName> {
        self.skipped.iter().filter(|s| s.missing_glyph)
    }
}

/// Lays out and renders names one at a time
///
/// Per-name failures are logged and recorded; anything else aborts.
pub struct CertificateBatch<'a> {
    engine: LayoutEngine<'a>,
    ascii_only: bool,
}

impl<'a> CertificateBatch<'a> {
    pub fn new(engine: LayoutEngine<'a>) -> Self {
        Self {
            engine,
            ascii_only: false,
        }
    }

    /// Drop alternate-script parts before parsing
    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    /// Append one certificate per name to `assembler`, in input order
    pub fn run(
        &self,
        assembler: &mut DocumentAssembler<'a>,
        names: &[String],
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let total = names.len();

        for (i, raw) in names.iter().enumerate() {
            log::info!("[{}/{}] {}", i + 1, total, raw);

            match self.process(assembler, raw) {
                Ok(page) => {
                    log::debug!("Wrote page {page} for {raw:?}");
                    report.written += 1;
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {raw:?}: {e}");
                    report.skipped.push(SkippedName {
                        name: raw.clone(),
                        reason: e.to_string(),
                        missing_glyph: e.is_missing_glyph(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn process(&self, assembler: &mut DocumentAssembler<'a>, raw: &str) -> Result<usize> {
        let display = should_omit_alternate(raw, self.ascii_only);
        let name = parse(&display)?;
        let plan = self.engine.layout(&name)?;
        assembler.append(&plan)
    }
}

/// Run a whole job: load fonts and template, render `names`, save
///
/// Missing or corrupt fonts and templates fail before anything is written.
pub fn generate(
    config: &CertificateConfig,
    names: &[String],
    ascii_only: bool,
) -> Result<BatchReport> {
    config.validate()?;

    let registry = FontRegistry::load(
        &config.fonts.default,
        &config.fonts.fallback_dir,
        config.layout.font_size,
    )?;
    let mut assembler = DocumentAssembler::open(&config.template, &registry)?;
    assembler.set_text_color(config.layout.color.into());

    let engine = LayoutEngine::new(&registry, assembler.page_size().width)
        .with_baseline(config.layout.baseline)
        .with_alt_correction(config.layout.alt_correction);
    let mut report = CertificateBatch::new(engine)
        .ascii_only(ascii_only)
        .run(&mut assembler, names)?;

    if report.written == 0 {
        log::warn!("No certificates were produced; writing an empty document");
    }

    let output = config.output_path();
    if !config.output.dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output.dir).map_err(|e| {
            CertificateError::ConfigError(format!(
                "cannot create output directory {}: {e}",
                config.output.dir.display()
            ))
        })?;
    }
    assembler.save(&output)?;
    log::info!(
        "Wrote {} certificates to {} ({} skipped)",
        report.written,
        output.display(),
        report.skipped.len()
    );

    report.output = Some(output);
    Ok(report)
}
