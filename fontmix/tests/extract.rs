//! Extracting contours from synthesized TrueType fonts

use fontmix::{
    extract::OutlineFormat,
    pens::CUBIC_STEPS,
    polygon::region_from_contours,
    Contour, EmptyReason, GlyphOutcome, GlyphSource, SourceFont,
};
use fontmix_test_data::{ComponentRef, TestFontBuilder};
use kurbo::{Point, Rect};
use pretty_assertions::assert_eq;
use write_fonts::{tables::head::Head, FontBuilder};

fn extract(font: Vec<u8>, glyph_name: &str) -> GlyphOutcome {
    let _ = env_logger::builder().is_test(true).try_init();
    SourceFont::from_bytes("test", font).extract(glyph_name)
}

fn bounds(contours: &[Contour]) -> Rect {
    fontmix::contour::bounds_of(contours).unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "{a} != {b}");
}

#[test]
fn simple_square() {
    let font = fontmix_test_data::squares(&['A'], 100, 200, 500);
    let outcome = extract(font, "A");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 1);
    assert_eq!(bounds(contours), Rect::new(100.0, 200.0, 600.0, 700.0));
    assert_close(contours[0].signed_area().abs(), 250_000.0);
}

#[test]
fn counter_keeps_opposite_winding() {
    let outcome = extract(fontmix_test_data::letter_with_hole(), "O");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 2);
    assert_ne!(contours[0].is_exterior(), contours[1].is_exterior());

    let region = region_from_contours(contours).unwrap();
    assert_close(region.area(), 500.0 * 700.0 - 200.0 * 400.0);
    assert_eq!(region.polygons().len(), 1);
    assert_eq!(region.polygons()[0].interiors().len(), 1);
}

#[test]
fn implied_on_curve_points() {
    // every span runs between midpoints of the diamond edges, pulled
    // halfway towards the diamond corners
    let outcome = extract(fontmix_test_data::all_off_curve(), "Q");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 1);
    let rect = bounds(contours);
    assert_close(rect.x0, 125.0);
    assert_close(rect.x1, 875.0);
    assert_close(rect.y0, 125.0);
    assert_close(rect.y1, 875.0);
}

#[test]
fn composite_components_are_placed() {
    let outcome = extract(fontmix_test_data::composites(), "E");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 3);
    assert_eq!(bounds(contours), Rect::new(0.0, 0.0, 400.0, 700.0));
}

#[test]
fn nested_composite_is_scaled() {
    let outcome = extract(fontmix_test_data::composites(), "F");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 3);
    let mut bars: Vec<Rect> = contours.iter().filter_map(Contour::bounds).collect();
    bars.sort_by(|a, b| a.y0.total_cmp(&b.y0));
    assert_eq!(
        bars,
        vec![
            Rect::new(100.0, 100.0, 300.0, 150.0),
            Rect::new(100.0, 250.0, 300.0, 300.0),
            Rect::new(100.0, 400.0, 300.0, 450.0),
        ]
    );
}

#[test]
fn cyclic_composite_terminates() {
    let outcome = extract(fontmix_test_data::cyclic_composite(), "Z");
    assert!(outcome.is_empty());
}

#[test]
fn postscript_outlines_flatten_cubics() {
    let source = SourceFont::from_bytes("cff", fontmix_test_data::cff_font());
    assert_eq!(source.outline_format(), Ok(OutlineFormat::PostScript));

    let outcome = extract(fontmix_test_data::cff_font(), "A");
    let contours = outcome.contours();
    assert_eq!(contours.len(), 1);
    let points = contours[0].points();
    // start, two lines, one cubic, one line, then the closing point
    assert_eq!(points.len(), 1 + 2 + CUBIC_STEPS + 1 + 1);
    assert_eq!(points[0], Point::new(100.0, 0.0));
    assert_eq!(points[1], Point::new(500.0, 0.0));
    assert_eq!(points[2], Point::new(500.0, 300.0));
    // halfway along the curve from (500, 300) to (200, 600)
    assert_eq!(points[2 + CUBIC_STEPS / 2], Point::new(425.0, 525.0));
    assert_eq!(points[2 + CUBIC_STEPS], Point::new(200.0, 600.0));
    assert_eq!(points[3 + CUBIC_STEPS], Point::new(100.0, 600.0));
    assert_eq!(points.last(), Some(&Point::new(100.0, 0.0)));

    assert!(contours[0].is_exterior());
    assert_eq!(bounds(contours), Rect::new(100.0, 0.0, 500.0, 600.0));
}

#[test]
fn postscript_glyph_missing_from_character_map() {
    assert_eq!(
        extract(fontmix_test_data::cff_font(), "B"),
        GlyphOutcome::Empty(EmptyReason::MissingGlyph("B".into()))
    );
}

#[test]
fn missing_glyph() {
    let font = fontmix_test_data::squares(&['A'], 0, 0, 100);
    assert_eq!(
        extract(font, "B"),
        GlyphOutcome::Empty(EmptyReason::MissingGlyph("B".into()))
    );
}

#[test]
fn glyph_names_before_character_map() {
    // the glyph named "A" is not the one mapped to 'A'
    let font = TestFontBuilder::new()
        .rect("A", None, 0, 0, 100, 100)
        .rect("A.alt", Some('A'), 0, 0, 300, 300)
        .build();
    let outcome = extract(font, "A");
    assert_eq!(bounds(outcome.contours()), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn character_map_without_glyph_names() {
    let font = TestFontBuilder::new()
        .without_glyph_names()
        .rect("uni0041", Some('A'), 0, 0, 300, 300)
        .rect("bar", None, 0, 0, 10, 10)
        .build();
    let outcome = extract(font.clone(), "A");
    assert_eq!(bounds(outcome.contours()), Rect::new(0.0, 0.0, 300.0, 300.0));
    assert!(matches!(
        extract(font, "bar"),
        GlyphOutcome::Empty(EmptyReason::MissingGlyph(_))
    ));
}

#[test]
fn component_defined_after_composite() {
    let font = TestFontBuilder::new()
        .composite("A", Some('A'), vec![ComponentRef::new("base", 50, 0)])
        .rect("base", None, 0, 0, 200, 200)
        .build();
    let outcome = extract(font, "A");
    assert_eq!(bounds(outcome.contours()), Rect::new(50.0, 0.0, 250.0, 200.0));
}

#[test]
fn font_without_outlines() {
    let mut builder = FontBuilder::new();
    builder.add_table(&Head::default()).unwrap();
    let font = builder.build();
    assert_eq!(
        extract(font.clone(), "A"),
        GlyphOutcome::Empty(EmptyReason::UnsupportedFormat)
    );
    assert_eq!(
        SourceFont::from_bytes("bare", font).outline_format(),
        Err(EmptyReason::UnsupportedFormat)
    );
}

#[test]
fn garbage_is_unreadable() {
    let source = SourceFont::from_bytes("junk", vec![0xAB; 32]);
    assert!(matches!(source.outline_format(), Err(EmptyReason::Unreadable(_))));
    assert!(matches!(
        source.extract("A"),
        GlyphOutcome::Empty(EmptyReason::Unreadable(_))
    ));
}

#[test]
fn path_sources_read_from_disk() {
    let dir = std::env::temp_dir().join(format!("fontmix-extract-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("square.ttf");
    std::fs::write(&path, fontmix_test_data::squares(&['A'], 0, 0, 400)).unwrap();

    let source = SourceFont::from_path(&path);
    assert_eq!(source.path(), Some(path.as_path()));
    assert_eq!(bounds(source.extract("A").contours()), Rect::new(0.0, 0.0, 400.0, 400.0));
    let _ = std::fs::remove_dir_all(&dir);

    let gone = source.extract("A");
    assert!(matches!(gone, GlyphOutcome::Empty(EmptyReason::Unreadable(_))));
}
