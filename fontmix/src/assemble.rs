//! Building a TrueType font from mixed letter contours
//!
//! The output has a `.notdef` glyph followed by one glyph per letter, in
//! alphabetical order. Every glyph is a simple glyph made only of on-curve
//! points; no hinting, kerning or layout tables are written.

mod metrics;

use std::{
    collections::BTreeMap,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use write_fonts::{
    read::tables::{glyf::CurvePoint, os2::SelectionFlags},
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Contour as GlyfContour, GlyfLocaBuilder, SimpleGlyph},
        head::{Flags, Head},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord},
    FontBuilder, OtRound,
};

pub use metrics::{GlyphMetrics, HorizontalExtents, EMPTY_ADVANCE, MIN_ADVANCE};

use crate::{
    config::DEFAULT_FAMILY,
    contour::Contour,
    error::{AssembleError, GenerateError},
    persist::{save_font, FileStorage, SaveOptions, SavedFont},
};

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;
pub const NOTDEF: &str = ".notdef";

const VENDOR_ID: Tag = Tag::new(b"FMIX");
const X_HEIGHT: i16 = 500;
const CAP_HEIGHT: i16 = 700;
const FIRST_CHAR: u16 = 0x41;
const LAST_CHAR: u16 = 0x5A;
const WIN_ASCENT: u16 = 1000;
const WIN_DESCENT: u16 = 200;

/// Seconds from 1904-01-01 (the OpenType epoch) to 1970-01-01.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Collects letter outlines and compiles them into a font binary.
#[derive(Clone, Debug)]
pub struct FontAssembler {
    family: String,
    created: i64,
    letters: BTreeMap<char, Vec<Contour>>,
}

impl FontAssembler {
    pub fn new(family: impl Into<String>) -> Self {
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs() as i64)
            .unwrap_or_default();
        FontAssembler {
            family: family.into(),
            created,
            letters: BTreeMap::new(),
        }
    }

    /// Set the creation time, in seconds since the Unix epoch.
    pub fn created(mut self, unix_seconds: i64) -> Self {
        self.created = unix_seconds;
        self
    }

    /// Add (or replace) the outline of a letter.
    ///
    /// A letter with no contours still gets a glyph and a cmap entry.
    pub fn add_letter(&mut self, letter: char, contours: Vec<Contour>) -> &mut Self {
        self.letters.insert(letter, contours);
        self
    }

    /// The number of glyphs the font will contain, `.notdef` included.
    pub fn num_glyphs(&self) -> usize {
        self.letters.len() + 1
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Compile the font.
    pub fn build(&self) -> Result<Vec<u8>, AssembleError> {
        let mut glyphs = vec![notdef_glyph()];
        glyphs.extend(self.letters.values().map(|contours| simple_glyph(contours)));
        let metrics: Vec<_> = std::iter::once(GlyphMetrics::NOTDEF)
            .chain(glyphs[1..].iter().map(GlyphMetrics::for_glyph))
            .collect();

        let mut glyf_builder = GlyfLocaBuilder::new();
        glyf_builder
            .add_glyph(&glyphs[0])
            .map_err(|inner| AssembleError::Glyph {
                letter: '\0',
                inner,
            })?;
        for (letter, glyph) in self.letters.keys().zip(&glyphs[1..]) {
            glyf_builder
                .add_glyph(glyph)
                .map_err(|inner| AssembleError::Glyph {
                    letter: *letter,
                    inner,
                })?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let mappings = self
            .letters
            .keys()
            .enumerate()
            .map(|(i, letter)| (*letter, GlyphId::new(i as u32 + 1)));
        let cmap = Cmap::from_mappings(mappings).map_err(AssembleError::Cmap)?;

        let num_glyphs = glyphs.len() as u16;
        let bbox = glyphs
            .iter()
            .filter(|glyph| !glyph.contours.is_empty())
            .map(|glyph| glyph.bbox)
            .reduce(Bbox::union)
            .unwrap_or_default();
        let extents = HorizontalExtents::compute(glyphs.iter().zip(metrics.iter().copied()));

        let head = self.head(bbox, loca_format);
        let hhea = Hhea {
            ascender: FWord::new(ASCENDER),
            descender: FWord::new(DESCENDER),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(extents.advance_width_max),
            min_left_side_bearing: FWord::new(extents.min_left_side_bearing),
            min_right_side_bearing: FWord::new(extents.min_right_side_bearing),
            x_max_extent: FWord::new(extents.x_max_extent),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };
        let maxp = maxp(&glyphs);
        let os2 = os2(&metrics);
        let hmtx = Hmtx {
            h_metrics: metrics
                .iter()
                .map(|m| LongMetric {
                    advance: m.advance,
                    side_bearing: m.lsb,
                })
                .collect(),
            left_side_bearings: Vec::new(),
        };
        let name = self.name();
        let mut glyph_names = vec![NOTDEF.to_string()];
        glyph_names.extend(self.letters.keys().map(char::to_string));
        let post = Post {
            underline_position: FWord::new(-100),
            underline_thickness: FWord::new(50),
            ..Default::default()
        }
        .with_glyph_names(glyph_names.iter().map(String::as_str));

        log::debug!(
            "assembling '{}' with {num_glyphs} glyphs, bbox {bbox:?}",
            self.family
        );

        let mut builder = FontBuilder::new();
        builder
            .add_table(&head)
            .and_then(|b| b.add_table(&hhea))
            .and_then(|b| b.add_table(&maxp))
            .and_then(|b| b.add_table(&os2))
            .and_then(|b| b.add_table(&hmtx))
            .and_then(|b| b.add_table(&cmap))
            .and_then(|b| b.add_table(&loca))
            .and_then(|b| b.add_table(&glyf))
            .and_then(|b| b.add_table(&name))
            .and_then(|b| b.add_table(&post))
            .map_err(AssembleError::Table)?;
        Ok(builder.build())
    }

    fn head(&self, bbox: Bbox, loca_format: LocaFormat) -> Head {
        let timestamp = LongDateTime::new(self.created + MAC_EPOCH_OFFSET);
        Head {
            font_revision: Fixed::from_f64(1.0),
            flags: Flags::BASELINE_AT_Y_0 | Flags::LSB_AT_X_0 | Flags::FORCE_INTEGER_PPEM,
            units_per_em: UNITS_PER_EM,
            created: timestamp,
            modified: timestamp,
            x_min: bbox.x_min,
            y_min: bbox.y_min,
            x_max: bbox.x_max,
            y_max: bbox.y_max,
            lowest_rec_ppem: 8,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
            ..Default::default()
        }
    }

    fn name(&self) -> Name {
        let family = self.family.as_str();
        let ps_name = postscript_name(family);
        let entries = [
            (1, family.to_string()),
            (2, "Regular".to_string()),
            (3, format!("{family} Regular")),
            (4, family.to_string()),
            (5, "Version 1.000".to_string()),
            (6, ps_name),
            (7, "Generated with Font Mixer".to_string()),
            (8, "Font Mixer".to_string()),
            (9, "Font Mixer".to_string()),
        ];
        let mut records: Vec<_> = entries
            .into_iter()
            .map(|(id, value)| NameRecord::new(3, 1, 0x409, NameId::new(id), value.into()))
            .collect();
        records.sort();
        Name::new(records)
    }
}

/// The PostScript name (name ID 6) for the regular style of `family`.
///
/// Only printable ASCII is kept, without spaces or the delimiters
/// `[](){}<>/%`, and the result fits the 63 byte limit.
pub fn postscript_name(family: &str) -> String {
    const STYLE: &str = "-Regular";
    const MAX_LEN: usize = 63;
    let mut base: String = family
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .take(MAX_LEN - STYLE.len())
        .collect();
    if base.is_empty() {
        base = DEFAULT_FAMILY.to_string();
    }
    base + STYLE
}

/// Build a simple glyph from closed polylines.
///
/// Exteriors come first, largest first, followed by holes in their input
/// order. Coordinates are rounded to font units; contours that collapse to
/// fewer than three points are dropped.
pub fn simple_glyph(contours: &[Contour]) -> SimpleGlyph {
    let mut exteriors: Vec<_> = contours.iter().filter(|c| c.is_exterior()).collect();
    exteriors.sort_by(|a, b| b.signed_area().abs().total_cmp(&a.signed_area().abs()));
    let holes = contours.iter().filter(|c| c.is_hole());

    let mut glyph = SimpleGlyph {
        contours: exteriors
            .into_iter()
            .chain(holes)
            .filter_map(glyf_contour)
            .collect(),
        ..Default::default()
    };
    glyph.recompute_bounding_box();
    glyph
}

fn glyf_contour(contour: &Contour) -> Option<GlyfContour> {
    let mut points: Vec<CurvePoint> = Vec::with_capacity(contour.len());
    for point in contour.ring() {
        let (x, y): (i16, i16) = (point.x.ot_round(), point.y.ot_round());
        if points.last().is_some_and(|last| (last.x, last.y) == (x, y)) {
            continue;
        }
        points.push(CurvePoint::on_curve(x, y));
    }
    if points.len() > 1 && points.first().map(|p| (p.x, p.y)) == points.last().map(|p| (p.x, p.y)) {
        points.pop();
    }
    (points.len() >= 3).then(|| points.into())
}

/// The fallback glyph: a rectangle with a rectangular counter.
pub fn notdef_glyph() -> SimpleGlyph {
    let rect = |x0: i16, y0: i16, x1: i16, y1: i16, clockwise: bool| -> GlyfContour {
        let mut points = vec![
            CurvePoint::on_curve(x0, y0),
            CurvePoint::on_curve(x1, y0),
            CurvePoint::on_curve(x1, y1),
            CurvePoint::on_curve(x0, y1),
        ];
        if clockwise {
            points.reverse();
        }
        points.into()
    };
    let mut glyph = SimpleGlyph {
        contours: vec![rect(100, 0, 500, 700, false), rect(200, 100, 400, 600, true)],
        ..Default::default()
    };
    glyph.recompute_bounding_box();
    glyph
}

fn maxp(glyphs: &[SimpleGlyph]) -> Maxp {
    let max_points = glyphs
        .iter()
        .map(|glyph| glyph.contours.iter().map(GlyfContour::len).sum::<usize>())
        .max()
        .unwrap_or_default();
    let max_contours = glyphs
        .iter()
        .map(|glyph| glyph.contours.len())
        .max()
        .unwrap_or_default();
    Maxp {
        num_glyphs: glyphs.len() as u16,
        max_points: Some(max_points.min(u16::MAX as usize) as u16),
        max_contours: Some(max_contours.min(u16::MAX as usize) as u16),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    }
}

fn os2(metrics: &[GlyphMetrics]) -> Os2 {
    let advances: Vec<u32> = metrics
        .iter()
        .map(|m| u32::from(m.advance))
        .filter(|advance| *advance > 0)
        .collect();
    let avg_width = if advances.is_empty() {
        0
    } else {
        (f64::from(advances.iter().sum::<u32>()) / advances.len() as f64).ot_round()
    };
    Os2 {
        x_avg_char_width: avg_width,
        us_weight_class: 400,
        us_width_class: 5,
        y_subscript_x_size: 650,
        y_subscript_y_size: 600,
        y_subscript_y_offset: 75,
        y_superscript_x_size: 650,
        y_superscript_y_size: 600,
        y_superscript_y_offset: 350,
        y_strikeout_size: 50,
        y_strikeout_position: 250,
        panose_10: [2, 0, 5, 0, 0, 0, 0, 0, 0, 0],
        ul_unicode_range_1: 1,
        ach_vend_id: VENDOR_ID,
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: FIRST_CHAR,
        us_last_char_index: LAST_CHAR,
        s_typo_ascender: ASCENDER,
        s_typo_descender: DESCENDER,
        s_typo_line_gap: 200,
        us_win_ascent: WIN_ASCENT,
        us_win_descent: WIN_DESCENT,
        ul_code_page_range_1: Some(1),
        ul_code_page_range_2: Some(0),
        sx_height: Some(X_HEIGHT),
        s_cap_height: Some(CAP_HEIGHT),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(1),
        ..Default::default()
    }
}

/// Build a font from `letters` and write it to `output_path`.
///
/// A font that cannot be written to `output_path` goes to a
/// timestamp-suffixed sibling path instead; see [`save_font`].
pub fn assemble_font(
    letters: &BTreeMap<char, Vec<Contour>>,
    output_path: &Path,
    family: &str,
) -> Result<SavedFont, GenerateError> {
    let mut assembler = FontAssembler::new(family);
    for (letter, contours) in letters {
        assembler.add_letter(*letter, contours.clone());
    }
    let bytes = assembler.build()?;
    let timestamp = assembler.created.to_string();
    let saved = save_font(
        &FileStorage,
        output_path,
        &bytes,
        &SaveOptions::default(),
        &timestamp,
    )?;
    log::info!("wrote {} ({} bytes)", saved.path.display(), bytes.len());
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use pretty_assertions::assert_eq;
    use skrifa::{
        raw::{FontRef, TableProvider},
        GlyphId as ReadGlyphId, MetadataProvider,
    };

    fn ring(points: &[(f64, f64)]) -> Contour {
        points.iter().map(|(x, y)| Point::new(*x, *y)).collect()
    }

    fn square(x0: f64, y0: f64, size: f64) -> Contour {
        ring(&[
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ])
    }

    fn letter_o() -> Vec<Contour> {
        vec![
            ring(&[(130.0, 170.0), (130.0, 530.0), (270.0, 530.0), (270.0, 170.0)]),
            square(100.0, 100.0, 500.0),
        ]
    }

    #[test]
    fn exteriors_come_before_holes() {
        let glyph = simple_glyph(&letter_o());
        assert_eq!(glyph.contours.len(), 2);
        let first: Vec<_> = glyph.contours[0].iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(first, vec![(100, 100), (600, 100), (600, 600), (100, 600)]);
        assert_eq!(
            glyph.bbox,
            Bbox {
                x_min: 100,
                y_min: 100,
                x_max: 600,
                y_max: 600
            }
        );
    }

    #[test]
    fn tiny_contours_are_dropped() {
        let sliver = ring(&[(0.0, 0.0), (0.2, 0.0), (0.2, 0.3), (0.0, 0.3)]);
        let glyph = simple_glyph(&[sliver]);
        assert!(glyph.contours.is_empty());
    }

    #[test]
    fn notdef_shape() {
        let glyph = notdef_glyph();
        assert_eq!(glyph.contours.len(), 2);
        assert_eq!(
            glyph.bbox,
            Bbox {
                x_min: 100,
                y_min: 0,
                x_max: 500,
                y_max: 700
            }
        );
    }

    #[test]
    fn postscript_names_are_sanitized() {
        assert_eq!(postscript_name("Test Mix"), "TestMix-Regular");
        assert_eq!(postscript_name("Blend (Test)/X"), "BlendTestX-Regular");
        assert_eq!(postscript_name("[a]{b}<c>%d"), "abcd-Regular");
        assert_eq!(postscript_name("Café Überschrift"), "Cafberschrift-Regular");
        assert_eq!(postscript_name("() ü"), "MixedFont-Regular");

        let long = postscript_name(&"Long".repeat(40));
        assert_eq!(long.len(), 63);
        assert!(long.ends_with("-Regular"));
        assert!(long.bytes().all(|b| (33..=126).contains(&b)));
    }

    #[test]
    fn built_font_reads_back() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut assembler = FontAssembler::new("Test Mix").created(0);
        assembler
            .add_letter('A', vec![square(0.0, 0.0, 1000.0)])
            .add_letter('B', letter_o())
            .add_letter('C', Vec::new());
        assert_eq!(assembler.num_glyphs(), 4);
        let bytes = assembler.build().unwrap();

        let font = FontRef::new(&bytes).unwrap();
        assert_eq!(font.maxp().unwrap().num_glyphs(), 4);
        let head = font.head().unwrap();
        assert_eq!(head.units_per_em(), 1000);
        assert_eq!(head.created().as_secs(), MAC_EPOCH_OFFSET);
        assert_eq!((head.x_min(), head.y_min()), (0, 0));
        assert_eq!((head.x_max(), head.y_max()), (1000, 1000));

        let charmap = font.charmap();
        assert_eq!(charmap.map('A'), Some(ReadGlyphId::new(1)));
        assert_eq!(charmap.map('C'), Some(ReadGlyphId::new(3)));
        assert_eq!(charmap.map('D'), None);

        let post = font.post().unwrap();
        assert_eq!(post.glyph_name(ReadGlyphId::new(0)), Some(".notdef"));
        assert_eq!(post.glyph_name(ReadGlyphId::new(2)), Some("B"));

        let hmtx = font.hmtx().unwrap();
        let metrics: Vec<_> = hmtx
            .h_metrics()
            .iter()
            .map(|m| (m.advance(), m.side_bearing()))
            .collect();
        assert_eq!(metrics, vec![(600, 100), (1200, 0), (600, 50), (500, 0)]);

        let hhea = font.hhea().unwrap();
        assert_eq!(hhea.ascender().to_i16(), 800);
        assert_eq!(hhea.descender().to_i16(), -200);
        assert_eq!(hhea.number_of_h_metrics(), 4);

        let names: Vec<_> = font
            .localized_strings(skrifa::string::StringId::FAMILY_NAME)
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Test Mix".to_string()]);
        let ps_names: Vec<_> = font
            .localized_strings(skrifa::string::StringId::POSTSCRIPT_NAME)
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ps_names, vec!["TestMix-Regular".to_string()]);
    }
}
