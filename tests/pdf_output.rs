use pdf_report::renderer::{Align, Border, PageRenderer, PdfRenderer};
use pdf_report::{CellStyle, FontStyle, HeadingLevel, Info, LayoutConfig, LayoutEngine, Unit};

/// DejaVu Serif, bundled with the crate for tests
fn font() -> Vec<u8> {
    include_bytes!("../assets/DejaVuSerif.ttf").to_vec()
}

fn engine() -> LayoutEngine<PdfRenderer> {
    let config = LayoutConfig::default();
    let mut renderer = PdfRenderer::from_config(&config).unwrap();
    let mut info = Info::new();
    info.title("Layout test").author("pdf-report");
    renderer.set_info(info);
    LayoutEngine::new(renderer, &config).unwrap()
}

#[test]
fn boxes_only_document_writes_to_file() {
    let mut engine = engine();
    engine.add_page().unwrap();
    engine.set_fill_color(230, 230, 250);
    engine
        .cell(
            50.0,
            10.0,
            Unit::Millimeter,
            "",
            CellStyle::default().with_border(Border::ALL).filled(),
            false,
        )
        .unwrap();
    engine.line_break(1.0, Unit::Inch).unwrap();

    let (width, height) = engine.document_size();
    assert!((width - 210.0).abs() < 1e-2);
    assert!((height - 297.0).abs() < 1e-2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boxes.pdf");
    engine.output_to_file(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&bytes).contains("/Title (Layout test)"));
}

#[test]
fn text_document_with_embedded_font() {
    let font = font();

    let mut engine = engine();
    engine.add_page().unwrap();
    engine
        .register_font("Serif", FontStyle::Regular, font.clone(), true)
        .unwrap();
    engine
        .register_font("Serif", FontStyle::Bold, font, true)
        .unwrap();
    engine
        .set_font("Serif", FontStyle::Regular, 12.0, Unit::Point)
        .unwrap();

    engine
        .heading(HeadingLevel::H1, "Quarterly report", CellStyle::default(), None)
        .unwrap();
    engine
        .heading(
            HeadingLevel::H3,
            "Summary",
            CellStyle::default().with_align(Align::Center),
            Some(1),
        )
        .unwrap();

    let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    engine
        .text(
            &paragraph,
            CellStyle::default().with_align(Align::Justify),
            None,
        )
        .unwrap();
    engine.set_text_color(200, 0, 0);
    engine
        .cell(
            40.0,
            12.0,
            Unit::Point,
            "Total",
            CellStyle::default().with_align(Align::Right),
            true,
        )
        .unwrap();

    let mut out: Vec<u8> = Vec::new();
    engine.output(&mut out).unwrap();
    assert!(out.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("/Identity-H"));
    assert!(text.contains("/FontFile2"));
}

#[test]
fn long_text_breaks_pages() {
    let font = font();

    let mut renderer = PdfRenderer::new(pdf_report::pagesize::A5, Unit::Millimeter, None).unwrap();
    renderer.set_margins(10.0);
    renderer.add_page().unwrap();
    renderer
        .register_font("Serif", FontStyle::Regular, font.into())
        .unwrap();
    renderer
        .select_font("Serif", FontStyle::Regular, 11.0)
        .unwrap();

    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n".repeat(60);
    renderer
        .draw_multiline(0.0, 6.0, &text, Border::NONE, Align::Left, false)
        .unwrap();
    assert!(renderer.page_count() > 1);

    let (x, y) = renderer.cursor();
    assert!((x - 10.0).abs() < 1e-3);
    assert!(y > 10.0 && y <= 200.0);
}
