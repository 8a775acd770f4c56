//! Font loading, coverage and PDF embedding

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single covered codepoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Glyph ID inside the font file
    pub id: u16,
    /// Advance width in font units
    pub advance: u16,
    /// Advance width in points at the font's reference size
    pub width: f64,
}

/// Outline flavour of the font program, decides how it is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineFormat {
    /// `glyf` outlines, embedded as FontFile2
    #[default]
    TrueType,
    /// `CFF ` outlines, embedded as FontFile3/OpenType
    Cff,
}

/// An immutable, fully measured font
///
/// Coverage and widths are computed once at construction; nothing about a
/// `Font` changes afterwards, so it can be shared freely between the layout
/// and rendering stages.
#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    source: Option<PathBuf>,
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    outline: OutlineFormat,
    reference_size: f64,
    glyphs: BTreeMap<char, Glyph>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// Descendant CIDFont dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Compressed font program stream
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl Font {
    /// Parse a font program and measure every codepoint it maps
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `data` - TrueType/OpenType file bytes
    /// * `reference_size` - Point size the width table is computed at
    pub fn from_bytes(name: &str, data: Vec<u8>, reference_size: f64) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        let units_per_em = face.units_per_em();
        let outline = if face.tables().cff.is_some() {
            OutlineFormat::Cff
        } else {
            OutlineFormat::TrueType
        };

        let mut glyphs = BTreeMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(c) = char::from_u32(code) else {
                        return;
                    };
                    if glyphs.contains_key(&c) {
                        return;
                    }
                    // GID 0 is .notdef, not real coverage
                    let Some(gid) = subtable.glyph_index(code).filter(|g| g.0 != 0) else {
                        return;
                    };
                    if let Some(advance) = face.glyph_hor_advance(gid) {
                        glyphs.insert(
                            c,
                            Glyph {
                                id: gid.0,
                                advance,
                                width: scale(advance, units_per_em, reference_size),
                            },
                        );
                    }
                });
            }
        }

        let ascender = face.ascender();
        let descender = face.descender();
        drop(face);

        Ok(Self {
            name: name.to_string(),
            source: None,
            data,
            units_per_em,
            ascender,
            descender,
            outline,
            reference_size,
            glyphs,
        })
    }

    /// Read and parse a font file, naming it after the file stem
    pub fn from_file<P: AsRef<Path>>(path: P, reference_size: f64) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |reason: String| PdfError::FontLoad {
            path: path.display().to_string(),
            reason,
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| load_err("file name is not valid UTF-8".to_string()))?;
        let data = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;

        let mut font = Self::from_bytes(name, data, reference_size).map_err(|e| match e {
            PdfError::FontParseError(reason) => load_err(reason),
            other => other,
        })?;
        font.source = Some(path.to_path_buf());
        Ok(font)
    }

    /// Build a font from an explicit glyph table
    ///
    /// The font carries no program bytes; it measures and encodes like any
    /// other font, and embeds as an empty font program.
    ///
    /// # Arguments
    /// * `glyphs` - `(char, glyph id, advance in font units)` triples
    pub fn from_glyphs<I>(name: &str, units_per_em: u16, reference_size: f64, glyphs: I) -> Self
    where
        I: IntoIterator<Item = (char, u16, u16)>,
    {
        let glyphs = glyphs
            .into_iter()
            .map(|(c, id, advance)| {
                (
                    c,
                    Glyph {
                        id,
                        advance,
                        width: scale(advance, units_per_em, reference_size),
                    },
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            source: None,
            data: Vec::new(),
            units_per_em,
            ascender: (units_per_em as i32 * 4 / 5) as i16,
            descender: -((units_per_em as i32 / 5) as i16),
            outline: OutlineFormat::TrueType,
            reference_size,
            glyphs,
        }
    }

    /// Font identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the font was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Font units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Point size the width table was computed at
    pub fn reference_size(&self) -> f64 {
        self.reference_size
    }

    /// Outline flavour of the font program
    pub fn outline(&self) -> OutlineFormat {
        self.outline
    }

    /// Glyph record for a codepoint
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Number of covered codepoints
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Covered codepoints in ascending order
    pub fn coverage(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }

    /// Check if the font can render a codepoint
    pub fn covers(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    /// Check if the font can render every codepoint of `text`
    pub fn covers_all(&self, text: &str) -> bool {
        text.chars().all(|c| self.covers(c))
    }

    /// Sum of advance widths in points at the reference size
    ///
    /// Fails on the first codepoint outside the font's coverage.
    pub fn text_width(&self, text: &str) -> Result<f64> {
        text.chars().try_fold(0.0, |acc, c| {
            self.glyphs
                .get(&c)
                .map(|g| acc + g.width)
                .ok_or_else(|| PdfError::GlyphNotFound {
                    font: self.name.clone(),
                    ch: c,
                })
        })
    }

    /// Encode text as a hex string of glyph IDs for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = self.glyphs.get(&c).map(|g| g.id).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// PostScript-safe name used for BaseFont/FontName
    fn postscript_name(&self) -> String {
        let cleaned: String = self
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if cleaned.is_empty() {
            "CertgenFont".to_string()
        } else {
            cleaned
        }
    }

    fn to_glyph_space(&self, value: i32) -> i64 {
        (value as i64 * 1000) / self.units_per_em.max(1) as i64
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// `used` limits the widths array and ToUnicode map to the codepoints a
    /// document actually draws. Cross-object references are left as
    /// placeholders for the document to fill in.
    pub fn to_pdf_objects(&self, used: &BTreeSet<char>) -> Result<FontObjects> {
        let font_name = Object::Name(self.postscript_name().into_bytes());

        let tounicode_content = self.generate_tounicode_cmap(used);
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&self.data)?;
        let compressed = encoder.finish()?;

        let (font_file_key, font_file_stream) = match self.outline {
            OutlineFormat::TrueType => (
                "FontFile2",
                Stream::new(
                    Dictionary::from_iter(vec![
                        ("Length1", (self.data.len() as i64).into()),
                        ("Filter", "FlateDecode".into()),
                    ]),
                    compressed,
                ),
            ),
            OutlineFormat::Cff => (
                "FontFile3",
                Stream::new(
                    Dictionary::from_iter(vec![
                        ("Subtype", "OpenType".into()),
                        ("Filter", "FlateDecode".into()),
                    ]),
                    compressed,
                ),
            ),
        };

        let ascent = self.to_glyph_space(self.ascender as i32);
        let descent = self.to_glyph_space(self.descender as i32);
        let font_bbox: Vec<Object> = vec![0.into(), descent.into(), 1000.into(), ascent.into()];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", ascent.into()),
            ("StemV", 80.into()),
            (font_file_key, Object::Reference((0, 0))),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let mut cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))),
            ("W", self.generate_widths_array(used).into()),
            ("DW", 1000.into()),
        ]);
        match self.outline {
            OutlineFormat::TrueType => {
                cid_font.set("Subtype", "CIDFontType2");
                cid_font.set("CIDToGIDMap", "Identity");
            }
            OutlineFormat::Cff => cid_font.set("Subtype", "CIDFontType0"),
        }

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()),
            ("ToUnicode", Object::Reference((0, 0))),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate /W array entries: `gid [width]` per used glyph, in glyph space
    fn generate_widths_array(&self, used: &BTreeSet<char>) -> Vec<Object> {
        let mut entries: Vec<(u16, u16)> = used
            .iter()
            .filter_map(|c| self.glyphs.get(c))
            .map(|g| (g.id, g.advance))
            .collect();
        entries.sort_unstable();
        entries.dedup_by_key(|(id, _)| *id);

        let mut widths = Vec::with_capacity(entries.len() * 2);
        for (gid, advance) in entries {
            widths.push((gid as i64).into());
            widths.push(vec![self.to_glyph_space(advance as i32).into()].into());
        }
        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self, used: &BTreeSet<char>) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mapped: Vec<(u16, char)> = used
            .iter()
            .filter_map(|&c| self.glyphs.get(&c).map(|g| (g.id, c)))
            .collect();

        // bfchar sections hold at most 100 entries
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

fn scale(advance: u16, units_per_em: u16, size: f64) -> f64 {
    advance as f64 * size / units_per_em.max(1) as f64
}
