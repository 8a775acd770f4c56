//! PDF document built from a single-page template

use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Anchor, Font, OutlineFormat, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Per-document usage of one font
struct FontUse<'a> {
    font: &'a Font,
    resource_name: String,
    used_chars: BTreeSet<char>,
}

/// A page cloned from the template plus the text drawn over it
struct OverlayPage {
    page_id: ObjectId,
    content: Vec<u8>,
    fonts: BTreeSet<String>,
}

/// PDF document that stamps text over copies of a template page
///
/// Every output page is a copy of the template's first page with its own
/// overlay. The template pages themselves are dropped when the document is
/// saved, so the output holds exactly the pages added through
/// [`add_page_from_template`](Self::add_page_from_template), in order.
///
/// Fonts are borrowed for the document's lifetime and embedded once each,
/// however many pages use them.
pub struct PdfDocument<'a> {
    /// The underlying lopdf document
    inner: Document,
    /// Template page (page 1 of the source)
    template_page_id: ObjectId,
    /// Template dimensions
    template_size: PageSize,
    /// Fonts drawn with so far (font name -> usage)
    fonts: BTreeMap<String, FontUse<'a>>,
    /// Output pages in order
    pages: Vec<OverlayPage>,
    /// Current text color
    text_color: Color,
    /// Set once the overlays have been written into the document
    finalized: bool,
}

impl<'a> PdfDocument<'a> {
    /// Open a template PDF from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path)
            .map_err(|e| PdfError::OpenError(format!("{}: {e}", path.display())))?;
        Self::from_document(inner)
    }

    /// Open a template PDF from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Self::from_document(inner)
    }

    fn from_document(inner: Document) -> Result<Self> {
        let template_page_id = *inner
            .get_pages()
            .get(&1)
            .ok_or(PdfError::EmptyTemplate)?;

        let mut doc = Self {
            inner,
            template_page_id,
            template_size: PageSize {
                width: 0.0,
                height: 0.0,
            },
            fonts: BTreeMap::new(),
            pages: Vec::new(),
            text_color: Color::default(),
            finalized: false,
        };
        let media_box = doc.get_inherited(template_page_id, b"MediaBox")?;
        doc.template_size = match media_box {
            Some(obj) => size_from_box(&doc.resolve_array(&obj)?)?,
            // A4 when nothing is declared
            None => PageSize {
                width: 595.28,
                height: 841.89,
            },
        };

        Ok(doc)
    }

    /// Size of the template page
    pub fn page_size(&self) -> PageSize {
        self.template_size
    }

    /// Number of output pages added so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Set the fill color for subsequent text
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    /// Append a fresh copy of the template page
    ///
    /// Inheritable attributes (MediaBox, CropBox, Resources, Rotate) are
    /// resolved onto the copy, and its content streams are shared with the
    /// template rather than duplicated.
    ///
    /// # Returns
    /// Output page number (1-indexed)
    pub fn add_page_from_template(&mut self) -> Result<usize> {
        if self.finalized {
            return Err(PdfError::SaveError(
                "document has already been saved".to_string(),
            ));
        }

        let template_dict = self
            .inner
            .get_object(self.template_page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        let mut page_dict = template_dict.clone();
        page_dict.remove(b"Parent");

        let inheritable: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];
        for key in inheritable {
            if page_dict.has(key) {
                continue;
            }
            if let Some(value) = self.get_inherited(self.template_page_id, key)? {
                page_dict.set(key, value);
            }
        }

        let page_id = self.inner.add_object(page_dict);
        self.pages.push(OverlayPage {
            page_id,
            content: Vec::new(),
            fonts: BTreeSet::new(),
        });

        Ok(self.pages.len())
    }

    /// Draw one run of text on an output page
    ///
    /// # Arguments
    /// * `page` - Output page number (1-indexed)
    /// * `font` - Font to draw with; must cover every character of `text`
    /// * `text` - Text to draw
    /// * `x` - X coordinate in points from the left edge
    /// * `y` - Baseline in points from the bottom edge
    /// * `anchor` - Whether `x` is the start or the midpoint of the run
    pub fn draw_text(
        &mut self,
        page: usize,
        font: &'a Font,
        text: &str,
        x: f64,
        y: f64,
        anchor: Anchor,
    ) -> Result<()> {
        let page_count = self.pages.len();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let text_width = font.text_width(text)?;

        let next_resource = self.fonts.len() + 1;
        let usage = self
            .fonts
            .entry(font.name().to_string())
            .or_insert_with(|| FontUse {
                font,
                resource_name: format!("CG{next_resource}"),
                used_chars: BTreeSet::new(),
            });
        usage.used_chars.extend(text.chars());

        let ctx = TextRenderContext {
            font_name: usage.resource_name.clone(),
            font_size: font.reference_size(),
            text_width,
            color: self.text_color,
        };
        let operators = generate_text_operators(&font.encode_text_hex(text), x, y, anchor, &ctx);

        let overlay = &mut self.pages[page - 1];
        overlay.content.extend_from_slice(&operators);
        overlay.fonts.insert(font.name().to_string());

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.finalize()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Write overlays and fonts, then make the output pages the page tree
    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }

        let embedded = self.embed_fonts()?;
        let pages_id = self.pages_root_id()?;

        let push_id = self.inner.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let pop_id = self.inner.add_object(Stream::new(Dictionary::new(), b"Q\n".to_vec()));

        let pages = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pages.len());
        for overlay in &pages {
            self.write_overlay(overlay, pages_id, push_id, pop_id, &embedded)?;
            kids.push(Object::Reference(overlay.page_id));
        }
        let count = kids.len() as i64;
        self.pages = pages;

        let mut pages_dict = self
            .inner
            .get_object(pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?
            .clone();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(count));
        self.inner.objects.insert(pages_id, pages_dict.into());

        // The template pages are unreachable now
        self.inner.prune_objects();
        self.finalized = true;

        Ok(())
    }

    /// Attach one overlay to its page: contents, fonts, parent
    fn write_overlay(
        &mut self,
        overlay: &OverlayPage,
        pages_id: ObjectId,
        push_id: ObjectId,
        pop_id: ObjectId,
        embedded: &BTreeMap<String, (String, ObjectId)>,
    ) -> Result<()> {
        let mut page_dict = self
            .inner
            .get_object(overlay.page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();

        // q <template> Q keeps the template's graphics state out of the overlay
        let mut contents = vec![Object::Reference(push_id)];
        contents.extend(self.content_refs(&page_dict)?);
        contents.push(Object::Reference(pop_id));
        if !overlay.content.is_empty() {
            let overlay_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), overlay.content.clone()));
            contents.push(Object::Reference(overlay_id));
        }
        page_dict.set("Contents", Object::Array(contents));

        if !overlay.fonts.is_empty() {
            let mut resources = match page_dict.get(b"Resources") {
                Ok(obj) => self.resolve_dict(obj)?,
                Err(_) => Dictionary::new(),
            };
            let mut font_dict = match resources.get(b"Font") {
                Ok(obj) => self.resolve_dict(obj)?,
                Err(_) => Dictionary::new(),
            };
            for font_name in &overlay.fonts {
                let (resource_name, font_id) = embedded
                    .get(font_name)
                    .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                font_dict.set(resource_name.as_bytes(), Object::Reference(*font_id));
            }
            resources.set("Font", Object::Dictionary(font_dict));
            page_dict.set("Resources", Object::Dictionary(resources));
        }

        page_dict.set("Parent", Object::Reference(pages_id));
        self.inner.objects.insert(overlay.page_id, page_dict.into());

        Ok(())
    }

    /// References to a page's existing content streams
    fn content_refs(&mut self, page_dict: &Dictionary) -> Result<Vec<Object>> {
        let refs = match page_dict.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.inner.get_object(*id)? {
                // An indirect array of streams
                Object::Array(arr) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Stream(stream)) => {
                let id = self.inner.add_object(stream.clone());
                vec![Object::Reference(id)]
            }
            _ => Vec::new(),
        };
        Ok(refs)
    }

    /// Embed every used font once
    ///
    /// # Returns
    /// Font name -> (resource name, Type0 font object ID)
    fn embed_fonts(&mut self) -> Result<BTreeMap<String, (String, ObjectId)>> {
        let mut embedded = BTreeMap::new();

        for (name, usage) in &self.fonts {
            let objects = usage.font.to_pdf_objects(&usage.used_chars)?;
            let font_file_key: &[u8] = match usage.font.outline() {
                OutlineFormat::TrueType => b"FontFile2",
                OutlineFormat::Cff => b"FontFile3",
            };

            let font_file_id = self.inner.add_object(objects.font_file_stream);

            let mut font_descriptor = objects.font_descriptor;
            font_descriptor.set(font_file_key, Object::Reference(font_file_id));
            let font_descriptor_id = self.inner.add_object(font_descriptor);

            let mut cid_font = objects.cid_font;
            cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
            let cid_font_id = self.inner.add_object(cid_font);

            let tounicode_id = self.inner.add_object(objects.tounicode_stream);

            let mut type0_font = objects.type0_font;
            type0_font.set(
                "DescendantFonts",
                Object::Array(vec![Object::Reference(cid_font_id)]),
            );
            type0_font.set("ToUnicode", Object::Reference(tounicode_id));
            let type0_font_id = self.inner.add_object(type0_font);

            log::debug!(
                "Embedded font '{name}' as /{} ({:?}, {} glyphs used)",
                usage.resource_name,
                usage.font.outline(),
                usage.used_chars.len()
            );
            embedded.insert(name.clone(), (usage.resource_name.clone(), type0_font_id));
        }

        Ok(embedded)
    }

    /// Object ID of the root Pages node
    fn pages_root_id(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Root is not a reference".to_string()))?;
        let catalog_dict = self
            .inner
            .get_object(catalog_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?;
        catalog_dict
            .get(b"Pages")
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))?
            .as_reference()
            .map_err(|_| PdfError::ParseError("Pages is not a reference".to_string()))
    }

    /// Look up a page attribute, following the Parent chain if needed
    fn get_inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    fn resolve_dict(&self, obj: &Object) -> Result<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Ok(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)?
                .as_dict()
                .cloned()
                .map_err(|_| PdfError::ParseError("Reference is not a dictionary".to_string())),
            _ => Err(PdfError::ParseError("Expected a dictionary".to_string())),
        }
    }

    fn resolve_array(&self, obj: &Object) -> Result<Vec<Object>> {
        match obj {
            Object::Array(arr) => Ok(arr.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)?
                .as_array()
                .cloned()
                .map_err(|_| {
                    PdfError::ParseError("MediaBox reference is not an array".to_string())
                }),
            _ => Err(PdfError::ParseError("MediaBox is not an array".to_string())),
        }
    }
}

fn number(obj: &Object) -> Result<f64> {
    match obj {
        Object::Integer(v) => Ok(*v as f64),
        Object::Real(v) => Ok(*v as f64),
        _ => Err(PdfError::ParseError("Invalid MediaBox entry".to_string())),
    }
}

/// Width and height from a `[x1 y1 x2 y2]` rectangle
fn size_from_box(rect: &[Object]) -> Result<PageSize> {
    if rect.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }
    let (x1, y1, x2, y2) = (
        number(&rect[0])?,
        number(&rect[1])?,
        number(&rect[2])?,
        number(&rect[3])?,
    );
    Ok(PageSize {
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    })
}
