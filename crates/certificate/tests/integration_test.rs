//! End-to-end tests: names in, certificate PDF out

use bilingual_name::parse;
use certificate::{
    generate, CertificateBatch, CertificateConfig, DocumentAssembler, LayoutEngine,
    ALT_TEXT_KERNING,
};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{Font, FontRegistry, PdfDocument};
use pretty_assertions::assert_eq;

const PAGE_WIDTH: i64 = 842;
const PAGE_HEIGHT: i64 = 595;

fn create_template() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let contents_id = doc.add_object(Stream::new(
        dictionary! {},
        b"0.9 g 0 0 842 595 re f\n".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => contents_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Latin default font plus one CJK fallback, 1000 upem at 40pt
fn create_registry() -> FontRegistry {
    let latin = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut glyphs: Vec<(char, u16, u16)> = latin
        .chars()
        .enumerate()
        .map(|(i, c)| (c, i as u16 + 1, 500))
        .collect();
    glyphs.extend([(' ', 100, 250), ('(', 101, 300), (')', 102, 300)]);

    let mut registry = FontRegistry::new(Font::from_glyphs("Inter", 1000, 40.0, glyphs));
    registry
        .register(Font::from_glyphs(
            "NotoSansSC",
            1000,
            40.0,
            [('李', 1, 1000), ('伟', 2, 1000)],
        ))
        .unwrap();
    registry
}

/// `(font resource, x, y)` for every text run on a page, in order
fn text_runs(doc: &Document, page: u32) -> Vec<(String, f64, f64)> {
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).unwrap();
    let content = String::from_utf8_lossy(&content).into_owned();

    let mut runs = Vec::new();
    let mut font = String::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [name, _, "Tf"] => font = name.trim_start_matches('/').to_string(),
            [x, y, "Td"] => runs.push((font.clone(), x.parse().unwrap(), y.parse().unwrap())),
            _ => {}
        }
    }
    runs
}

fn render(names: &[&str]) -> (Document, certificate::BatchReport) {
    let registry = create_registry();
    let doc = PdfDocument::open_from_bytes(&create_template()).unwrap();
    let mut assembler = DocumentAssembler::from_document(doc, &registry);
    let engine = LayoutEngine::new(&registry, assembler.page_size().width);

    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    let report = CertificateBatch::new(engine)
        .run(&mut assembler, &names)
        .unwrap();
    let bytes = assembler.to_bytes().unwrap();
    (Document::load_mem(&bytes).unwrap(), report)
}

#[test]
fn test_single_name_centered_on_page() {
    let (output, report) = render(&["Alice Smith"]);
    assert_eq!(report.written, 1);
    assert_eq!(output.get_pages().len(), 1);

    let runs = text_runs(&output, 1);
    assert_eq!(runs.len(), 1);

    // 10 letters at 20pt plus a 10pt space
    let width = 210.0;
    let (font, x, y) = &runs[0];
    assert_eq!(font, "CG1");
    assert_eq!(x + width / 2.0, PAGE_WIDTH as f64 / 2.0);
    assert_eq!(*y, 217.0);
}

#[test]
fn test_bilingual_name_three_runs() {
    let (output, report) = render(&["Li Wei (李伟)"]);
    assert_eq!(report.written, 1);

    let runs = text_runs(&output, 1);
    let fonts: Vec<&str> = runs.iter().map(|(f, _, _)| f.as_str()).collect();
    assert_eq!(fonts, vec!["CG1", "CG1", "CG2"]);

    // "Li Wei (" = 132pt, ")" = 12pt, "李伟" = 80pt
    let full_width = 132.0 + 12.0 + 80.0;
    let left = (PAGE_WIDTH as f64 - full_width) / 2.0;
    assert_eq!(runs[0].1, left);
    assert_eq!(runs[1].1, left + full_width - 12.0);
    assert_eq!(runs[2].1, left + 132.0 + (12.0 - ALT_TEXT_KERNING) / 2.0);
    assert!(runs.iter().all(|(_, _, y)| *y == 217.0));
}

#[test]
fn test_bad_names_skipped_order_preserved() {
    let (output, report) = render(&["Alice", "Bad (Name", "Bob", "名前 (名前)", "Carol"]);

    assert_eq!(report.written, 3);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].name, "Bad (Name");
    assert_eq!(report.skipped[1].name, "名前 (名前)");
    assert_eq!(output.get_pages().len(), 3);

    // Output order follows input order: widths 100, 60, 100
    let centers: Vec<f64> = (1..=3)
        .map(|page| text_runs(&output, page)[0].1)
        .collect();
    assert_eq!(centers, vec![371.0, 391.0, 371.0]);
}

#[test]
fn test_empty_primary_does_not_crash() {
    let (output, report) = render(&["(李)"]);
    assert_eq!(report.written, 1);
    assert_eq!(text_runs(&output, 1).len(), 3);
}

#[test]
fn test_all_names_skipped_gives_empty_document() {
    let (output, report) = render(&["Bad (Name"]);
    assert_eq!(report.written, 0);
    assert_eq!(output.get_pages().len(), 0);
}

#[test]
fn test_layout_matches_parsed_name() {
    let registry = create_registry();
    let engine = LayoutEngine::new(&registry, PAGE_WIDTH as f64);
    let plan = engine.layout(&parse("Li Wei (李伟)").unwrap()).unwrap();

    let texts: Vec<&str> = plan.fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["Li Wei (", ")", "李伟"]);
    assert_eq!(plan.total_width(), 224.0);
}

fn fixture_font(file: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fonts")
        .join(file)
}

/// Config rendering with DejaVuSerif, falling back to DejaVuSansMono
fn real_font_config(dir: &std::path::Path) -> CertificateConfig {
    let fallback_dir = dir.join("fonts");
    std::fs::create_dir(&fallback_dir).unwrap();
    std::fs::copy(
        fixture_font("DejaVuSansMono.ttf"),
        fallback_dir.join("DejaVuSansMono.ttf"),
    )
    .unwrap();
    std::fs::write(fallback_dir.join("Bad.ttf"), b"not a font").unwrap();

    let template = dir.join("template.pdf");
    std::fs::write(&template, create_template()).unwrap();

    let mut config = CertificateConfig::default();
    config.template = template;
    config.fonts.default = fixture_font("DejaVuSerif.ttf");
    config.fonts.fallback_dir = fallback_dir;
    config.output.dir = dir.join("out");
    config.output.id = Some("Open2024".to_string());
    config
}

#[test]
fn test_generate_with_real_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let config = real_font_config(dir.path());
    let names: Vec<String> = ["Sami (سامي)", "Bad (Name", "Zoe", "李伟"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let report = generate(&config, &names, false).unwrap();

    let output_path = dir.path().join("out").join("Open2024-certificates.pdf");
    assert_eq!(report.output.as_deref(), Some(output_path.as_path()));
    assert_eq!(report.written, 2);
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, vec!["Bad (Name", "李伟"]);
    let flagged: Vec<&str> = report.missing_glyphs().map(|s| s.name.as_str()).collect();
    assert_eq!(flagged, vec!["李伟"]);

    let output = Document::load(&output_path).unwrap();
    assert_eq!(output.get_pages().len(), 2);

    // Page 1: "Sami (" and ")" in the default font, the Arabic in the fallback
    let runs = text_runs(&output, 1);
    let fonts: Vec<&str> = runs.iter().map(|(f, _, _)| f.as_str()).collect();
    assert_eq!(fonts, vec!["CG1", "CG1", "CG2"]);

    // DejaVuSerif at 40pt: "Sami (" = 130.29296875pt, ")" = 15.60546875pt
    let opening_end = runs[0].1 + 130.29296875;
    let alt_x = runs[2].1;
    assert!(alt_x >= opening_end, "alt starts at {alt_x}, '(' run ends at {opening_end}");
    assert!((alt_x - opening_end - (15.60546875 - ALT_TEXT_KERNING) / 2.0).abs() < 1e-9);
    assert!(runs[1].1 > alt_x);

    // Page 2: a single centered run
    assert_eq!(text_runs(&output, 2).len(), 1);
}

#[test]
fn test_generate_ascii_only_with_real_fonts() {
    let dir = tempfile::tempdir().unwrap();
    let config = real_font_config(dir.path());
    let names = vec!["Sami (سامي)".to_string()];

    let report = generate(&config, &names, true).unwrap();
    assert_eq!(report.written, 1);

    let output = Document::load(config.output_path()).unwrap();
    let runs = text_runs(&output, 1);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].0, "CG1");
}
