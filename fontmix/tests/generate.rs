//! Full runs: synthesized sources in, a font file out

use std::{
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

use fontmix::{CutMethod, GenerateError, Generated, Generator, MixConfig, SourceFont, LETTERS};
use kurbo::Rect;
use pretty_assertions::assert_eq;
use skrifa::{
    raw::{FontRef, TableProvider},
    GlyphId, MetadataProvider,
};

/// A scratch output directory, removed on drop.
struct OutputDir(PathBuf);

impl OutputDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("fontmix-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&path);
        OutputDir(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for OutputDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn base_config(output: &OutputDir, num_sources: usize) -> MixConfig {
    let names = (0..num_sources).map(|i| format!("source{i}.ttf"));
    MixConfig {
        cut_method: CutMethod::Equidistant,
        family_name: "Test Mix".into(),
        output_dir: output.path().to_owned(),
        ..MixConfig::new(names)
    }
}

type RunResult = (Result<Generated, GenerateError>, Vec<u8>);

fn run(config: MixConfig, sources: Vec<SourceFont>) -> RunResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let generator = Generator::new(config).with_sources(sources);
    let mut percents = Vec::new();
    let result = generator.run(&mut |p| percents.push(p.percent), &AtomicBool::new(false));
    (result, percents)
}

fn squares(label: &str, x0: i16, y0: i16, size: i16) -> SourceFont {
    SourceFont::from_bytes(label, fontmix_test_data::squares(&LETTERS, x0, y0, size))
}

fn letter_bounds(generated: &Generated, letter: char) -> Option<Rect> {
    fontmix::contour::bounds_of(&generated.letters[&letter])
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-6 * b.abs().max(1.0), "{a} != {b}");
}

#[test]
fn two_squares_fill_the_canonical_square() {
    let output = OutputDir::new("squares");
    let sources = vec![squares("a", 0, 0, 1000), squares("b", 2000, 500, 300)];
    let (result, percents) = run(base_config(&output, 2), sources);
    let generated = result.unwrap();

    assert_eq!(generated.letters.len(), 26);
    for letter in LETTERS {
        let contours = &generated.letters[&letter];
        assert_eq!(contours.len(), 1, "'{letter}'");
        assert!(contours[0].is_exterior());
        let bounds = letter_bounds(&generated, letter).unwrap();
        assert_close(bounds.width(), 1000.0);
        assert_close(bounds.height(), 1000.0);
    }

    assert_eq!(percents.first(), Some(&5));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(percents.contains(&90));
    // one notification per letter, plus start, build and done
    assert_eq!(percents.len(), 26 + 3);

    assert_eq!(generated.output_path, output.path().join("Test Mix.ttf"));
    assert!(!generated.used_alternate);
}

#[test]
fn written_font_is_consistent() {
    let output = OutputDir::new("font");
    let sources = vec![squares("a", 0, 0, 1000), squares("b", 0, 0, 1000)];
    let (result, _) = run(base_config(&output, 2), sources);
    let generated = result.unwrap();

    let bytes = std::fs::read(&generated.output_path).unwrap();
    let font = FontRef::new(&bytes).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 27);

    let charmap = font.charmap();
    for (i, letter) in LETTERS.iter().enumerate() {
        assert_eq!(charmap.map(*letter), Some(GlyphId::new(i as u32 + 1)));
    }
    assert_eq!(charmap.map('a'), None);

    let head = font.head().unwrap();
    assert_eq!(head.units_per_em(), 1000);
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    for gid in 0..27u32 {
        let glyph = loca.get_glyf(GlyphId::new(gid), &glyf).unwrap().unwrap();
        assert!(glyph.x_min() >= head.x_min() && glyph.x_max() <= head.x_max());
        assert!(glyph.y_min() >= head.y_min() && glyph.y_max() <= head.y_max());
    }
    assert_eq!((head.x_min(), head.y_min()), (0, 0));
    assert_eq!((head.x_max(), head.y_max()), (1000, 1000));

    let hmtx = font.hmtx().unwrap();
    let metrics = hmtx.h_metrics();
    assert_eq!(metrics.len(), 27);
    assert_eq!(metrics[1].advance(), 1200);
    assert_eq!(metrics[1].side_bearing(), 0);
}

#[test]
fn letters_missing_from_some_sources() {
    let output = OutputDir::new("partial");
    let first_half = fontmix_test_data::squares(&LETTERS[..13], 0, 0, 1000);
    let sources = vec![
        SourceFont::from_bytes("first half", first_half),
        squares("all", 0, 0, 500),
    ];
    let (result, _) = run(base_config(&output, 2), sources);
    let generated = result.unwrap();
    for letter in LETTERS {
        assert!(!generated.letters[&letter].is_empty(), "'{letter}'");
    }
}

#[test]
fn letter_no_source_has_is_blank() {
    let output = OutputDir::new("blank");
    let letters: Vec<char> = LETTERS.iter().copied().filter(|l| *l != 'Q').collect();
    let font = fontmix_test_data::squares(&letters, 0, 0, 1000);
    let sources = vec![
        SourceFont::from_bytes("a", font.clone()),
        SourceFont::from_bytes("b", font),
    ];
    let (result, _) = run(base_config(&output, 2), sources);
    let generated = result.unwrap();
    assert!(generated.letters[&'Q'].is_empty());

    let bytes = std::fs::read(&generated.output_path).unwrap();
    let font = FontRef::new(&bytes).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 27);
    let q = font.charmap().map('Q').unwrap();
    let glyph = font
        .loca(None)
        .unwrap()
        .get_glyf(q, &font.glyf().unwrap())
        .unwrap();
    assert!(glyph.is_none());
    let hmtx = font.hmtx().unwrap();
    let metrics = &hmtx.h_metrics()[q.to_u32() as usize];
    assert_eq!((metrics.advance(), metrics.side_bearing()), (500, 0));
}

#[test]
fn unusable_source_is_ignored() {
    let output = OutputDir::new("degraded");
    let sources = vec![
        squares("a", 0, 0, 1000),
        SourceFont::from_path("/nonexistent/font.ttf"),
        squares("c", 0, 0, 1000),
    ];
    let (result, _) = run(base_config(&output, 3), sources);
    let generated = result.unwrap();
    assert_eq!(generated.letters.len(), 26);
    let bounds = letter_bounds(&generated, 'M').unwrap();
    assert_close(bounds.height(), 1000.0);
}

#[test]
fn one_usable_source_fails_before_writing() {
    let output = OutputDir::new("precondition");
    let sources = vec![
        squares("a", 0, 0, 1000),
        SourceFont::from_bytes("junk", vec![0u8; 64]),
    ];
    let (result, percents) = run(base_config(&output, 2), sources);
    assert!(matches!(result, Err(GenerateError::Precondition(_))));
    assert_eq!(percents, vec![5]);
    assert!(!output.path().exists());
}

#[test]
fn checkerboard_keeps_holes() {
    let output = OutputDir::new("checkerboard");
    let hole = fontmix_test_data::letter_with_hole();
    let sources = vec![
        SourceFont::from_bytes("a", hole.clone()),
        SourceFont::from_bytes("b", hole),
    ];
    let config = MixConfig {
        vertical_cuts: true,
        ..base_config(&output, 2)
    };
    let (result, _) = run(config, sources);
    let generated = result.unwrap();

    let o = &generated.letters[&'O'];
    assert!(o.iter().any(|c| c.is_exterior()));
    assert!(o.iter().any(|c| c.is_hole()));
    let area: f64 = o.iter().map(|c| c.signed_area()).sum();
    // 500×700 with a 200×400 counter, scaled to a height of 1000
    let scale = 1000.0 / 700.0;
    assert_close(area, (500.0 * 700.0 - 200.0 * 400.0) * scale * scale);
    assert!(generated.letters[&'A'].is_empty());
}

#[test]
fn custom_cuts_without_normalizing() {
    let output = OutputDir::new("custom");
    let sources = vec![squares("a", 0, 0, 1000), squares("b", 0, 0, 1000)];
    let config = MixConfig {
        cut_method: CutMethod::Custom,
        h_cuts: vec![0.3],
        normalize: false,
        ..base_config(&output, 2)
    };
    let (result, _) = run(config, sources);
    let bounds = letter_bounds(&result.unwrap(), 'K').unwrap();
    for (actual, expected) in [(bounds.x0, 0.0), (bounds.y0, 0.0), (bounds.x1, 1000.0)] {
        assert_close(actual, expected);
    }
    assert_close(bounds.y1, 1000.0);
}

#[test]
fn spawned_run_reports_progress() {
    let output = OutputDir::new("spawn");
    let generator = Generator::new(base_config(&output, 2)).with_sources(vec![
        squares("a", 0, 0, 1000),
        squares("b", 100, 100, 800),
    ]);
    let handle = generator.spawn();
    let progress: Vec<_> = handle.progress().iter().collect();
    let generated = handle.join().unwrap();

    assert_eq!(progress.first().map(|p| p.message.as_str()), Some("Initializing"));
    assert_eq!(progress.last().map(|p| p.percent), Some(100));
    assert!(progress.iter().any(|p| p.message == "Mixing Z"));
    assert!(generated.output_path.exists());
}
