//! Rendering layout plans onto template pages

use crate::layout::LayoutPlan;
use crate::Result;
use pdf_core::{Color, Font, FontRegistry, PageSize, PdfDocument};
use std::path::Path;

/// Draws layout plans as text overlays on fresh template pages
pub struct CertificateRenderer<'a> {
    registry: &'a FontRegistry,
}

impl<'a> CertificateRenderer<'a> {
    /// Create a renderer drawing with fonts from `registry`
    pub fn new(registry: &'a FontRegistry) -> Self {
        Self { registry }
    }

    /// Append one certificate page to `doc`
    ///
    /// Every fragment's font is resolved before the page is added, so a
    /// failing plan leaves the document untouched.
    ///
    /// # Returns
    /// Output page number (1-indexed)
    pub fn render(&self, doc: &mut PdfDocument<'a>, plan: &LayoutPlan) -> Result<usize> {
        let fonts: Vec<&'a Font> = plan
            .fragments
            .iter()
            .map(|fragment| self.registry.get(&fragment.font))
            .collect::<std::result::Result<_, _>>()?;

        let page = doc.add_page_from_template()?;
        for (fragment, font) in plan.fragments.iter().zip(fonts) {
            doc.draw_text(
                page,
                font,
                &fragment.text,
                fragment.x,
                fragment.y,
                fragment.anchor,
            )?;
        }

        Ok(page)
    }
}

/// Accumulates certificate pages into the single output document
///
/// Pages appear in the order they are appended.
pub struct DocumentAssembler<'a> {
    doc: PdfDocument<'a>,
    renderer: CertificateRenderer<'a>,
}

impl<'a> DocumentAssembler<'a> {
    /// Open the template at `path`
    pub fn open<P: AsRef<Path>>(path: P, registry: &'a FontRegistry) -> Result<Self> {
        let path = path.as_ref();
        let doc = PdfDocument::open(path)?;
        let size = doc.page_size();
        log::info!(
            "Loaded template {} ({} x {} pt)",
            path.display(),
            size.width,
            size.height
        );
        Ok(Self::from_document(doc, registry))
    }

    /// Wrap an already opened template
    pub fn from_document(doc: PdfDocument<'a>, registry: &'a FontRegistry) -> Self {
        Self {
            doc,
            renderer: CertificateRenderer::new(registry),
        }
    }

    /// Template page size
    pub fn page_size(&self) -> PageSize {
        self.doc.page_size()
    }

    /// Set the text color for pages appended from now on
    pub fn set_text_color(&mut self, color: Color) {
        self.doc.set_text_color(color);
    }

    /// Render `plan` onto a new page at the end of the document
    pub fn append(&mut self, plan: &LayoutPlan) -> Result<usize> {
        self.renderer.render(&mut self.doc, plan)
    }

    /// Number of certificates appended
    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Write the document to `path`
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<()> {
        self.doc.save(path)?;
        Ok(())
    }

    /// Serialize the document
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        Ok(self.doc.to_bytes()?)
    }
}
