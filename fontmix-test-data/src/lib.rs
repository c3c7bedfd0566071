//! Small synthetic fonts for fontmix tests
//!
//! Fonts are compiled in memory with write-fonts and contain only the tables
//! glyph extraction needs: `head`, `maxp`, `cmap`, `glyf`, `loca` and,
//! optionally, `post` glyph names. [`cff_font`] has PostScript outlines
//! instead.

mod cff;

use std::collections::HashMap;

pub use cff::{cff_font, cff_table};

use write_fonts::{
    read::tables::glyf::CurvePoint,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            SimpleGlyph, Transform,
        },
        head::Head,
        loca::LocaFormat,
        maxp::Maxp,
        post::Post,
    },
    types::{F2Dot14, GlyphId, GlyphId16},
    FontBuilder,
};

/// A point in a test contour: `(x, y, on_curve)`.
pub type TestPoint = (i16, i16, bool);

/// A reference from a composite glyph to another glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRef {
    pub glyph: String,
    pub dx: i16,
    pub dy: i16,
    /// Uniform scale, in the range F2Dot14 can represent.
    pub scale: f32,
}

impl ComponentRef {
    pub fn new(glyph: &str, dx: i16, dy: i16) -> Self {
        ComponentRef {
            glyph: glyph.to_string(),
            dx,
            dy,
            scale: 1.0,
        }
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Clone, Debug)]
enum GlyphData {
    Simple(SimpleGlyph),
    Composite(Vec<ComponentRef>),
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    codepoint: Option<char>,
    data: GlyphData,
}

/// Builds a TrueType font glyph by glyph. Glyph 0 is an empty `.notdef`.
#[derive(Clone, Debug)]
pub struct TestFontBuilder {
    entries: Vec<Entry>,
    glyph_names: bool,
}

impl Default for TestFontBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFontBuilder {
    pub fn new() -> Self {
        TestFontBuilder {
            entries: vec![Entry {
                name: ".notdef".to_string(),
                codepoint: None,
                data: GlyphData::Simple(SimpleGlyph::default()),
            }],
            glyph_names: true,
        }
    }

    /// Leave out the `post` glyph names, so glyphs can only be found
    /// through `cmap`.
    pub fn without_glyph_names(mut self) -> Self {
        self.glyph_names = false;
        self
    }

    /// Add a simple glyph from explicit TrueType points.
    pub fn simple(
        mut self,
        name: &str,
        codepoint: Option<char>,
        contours: &[&[TestPoint]],
    ) -> Self {
        let contours: Vec<Contour> = contours
            .iter()
            .map(|points| {
                points
                    .iter()
                    .map(|(x, y, on_curve)| CurvePoint::new(*x, *y, *on_curve))
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect();
        let mut glyph = SimpleGlyph {
            contours,
            ..Default::default()
        };
        glyph.recompute_bounding_box();
        self.entries.push(Entry {
            name: name.to_string(),
            codepoint,
            data: GlyphData::Simple(glyph),
        });
        self
    }

    /// Add a glyph that is a single clockwise rectangle.
    pub fn rect(
        self,
        name: &str,
        codepoint: Option<char>,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
    ) -> Self {
        self.simple(name, codepoint, &[&rect_points(x0, y0, x1, y1)])
    }

    /// Add a glyph made of other glyphs.
    ///
    /// Components may name any glyph in the font, including ones added
    /// later or the glyph itself.
    pub fn composite(
        mut self,
        name: &str,
        codepoint: Option<char>,
        components: Vec<ComponentRef>,
    ) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            codepoint,
            data: GlyphData::Composite(components),
        });
        self
    }

    /// Compile the font.
    ///
    /// # Panics
    ///
    /// If a component names a glyph that does not exist, or a table fails
    /// to compile.
    pub fn build(&self) -> Vec<u8> {
        let gids: HashMap<&str, u16> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.as_str(), i as u16))
            .collect();
        let mut bboxes: Vec<Bbox> = Vec::with_capacity(self.entries.len());
        let mut glyf_builder = GlyfLocaBuilder::new();
        for entry in &self.entries {
            match &entry.data {
                GlyphData::Simple(glyph) => {
                    glyf_builder.add_glyph(glyph).unwrap();
                    bboxes.push(glyph.bbox);
                }
                GlyphData::Composite(parts) => {
                    let mut glyph: Option<CompositeGlyph> = None;
                    let mut bbox: Option<Bbox> = None;
                    for part in parts {
                        let gid = gids[part.glyph.as_str()];
                        let part_bbox = bboxes
                            .get(gid as usize)
                            .map(|b| Bbox {
                                x_min: b.x_min + part.dx,
                                y_min: b.y_min + part.dy,
                                x_max: b.x_max + part.dx,
                                y_max: b.y_max + part.dy,
                            })
                            .unwrap_or_default();
                        let scale = F2Dot14::from_f32(part.scale);
                        let component = Component::new(
                            GlyphId16::new(gid),
                            Anchor::Offset {
                                x: part.dx,
                                y: part.dy,
                            },
                            Transform {
                                xx: scale,
                                yy: scale,
                                ..Default::default()
                            },
                            ComponentFlags::default(),
                        );
                        match glyph.as_mut() {
                            None => glyph = Some(CompositeGlyph::new(component, part_bbox)),
                            Some(glyph) => glyph.add_component(component, part_bbox),
                        }
                        bbox = Some(bbox.map_or(part_bbox, |b| b.union(part_bbox)));
                    }
                    let glyph = glyph.expect("composite glyphs need at least one component");
                    glyf_builder.add_glyph(&glyph).unwrap();
                    bboxes.push(bbox.unwrap_or_default());
                }
            }
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let mappings = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.codepoint.map(|ch| (ch, GlyphId::new(i as u32))));
        let cmap = Cmap::from_mappings(mappings).unwrap();
        let head = Head {
            units_per_em: 1000,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
            ..Default::default()
        };
        let maxp = Maxp {
            num_glyphs: self.entries.len() as u16,
            ..Default::default()
        };

        let mut builder = FontBuilder::new();
        builder
            .add_table(&head)
            .unwrap()
            .add_table(&maxp)
            .unwrap()
            .add_table(&cmap)
            .unwrap()
            .add_table(&loca)
            .unwrap()
            .add_table(&glyf)
            .unwrap();
        if self.glyph_names {
            let post = Post::default()
                .with_glyph_names(self.entries.iter().map(|entry| entry.name.as_str()));
            builder.add_table(&post).unwrap();
        }
        builder.build()
    }
}

/// A clockwise rectangle, as TrueType draws outer contours.
pub fn rect_points(x0: i16, y0: i16, x1: i16, y1: i16) -> [TestPoint; 4] {
    [(x0, y0, true), (x0, y1, true), (x1, y1, true), (x1, y0, true)]
}

/// A font where every letter in `letters` is the same axis-aligned square.
pub fn squares(letters: &[char], x0: i16, y0: i16, size: i16) -> Vec<u8> {
    letters
        .iter()
        .fold(TestFontBuilder::new(), |font, letter| {
            font.rect(
                &letter.to_string(),
                Some(*letter),
                x0,
                y0,
                x0 + size,
                y0 + size,
            )
        })
        .build()
}

/// A font with an "O": a square with a square counter, the counter wound
/// the other way.
pub fn letter_with_hole() -> Vec<u8> {
    let outer = rect_points(100, 0, 600, 700);
    let inner = [
        (250, 150, true),
        (450, 150, true),
        (450, 550, true),
        (250, 550, true),
    ];
    TestFontBuilder::new()
        .simple("O", Some('O'), &[&outer, &inner])
        .build()
}

/// A font whose "Q" is a circle-ish shape drawn only with off-curve
/// points, so every on-curve point is implied.
pub fn all_off_curve() -> Vec<u8> {
    let diamond = [
        (0, 500, false),
        (500, 1000, false),
        (1000, 500, false),
        (500, 0, false),
    ];
    TestFontBuilder::new()
        .simple("Q", Some('Q'), &[&diamond])
        .build()
}

/// A font with composites: "bar" is a simple rectangle, "E" places three
/// bars, and "F" nests "E" again, scaled by half.
pub fn composites() -> Vec<u8> {
    TestFontBuilder::new()
        .rect("bar", None, 0, 0, 400, 100)
        .composite(
            "E",
            Some('E'),
            vec![
                ComponentRef::new("bar", 0, 0),
                ComponentRef::new("bar", 0, 300),
                ComponentRef::new("bar", 0, 600),
            ],
        )
        .composite(
            "F",
            Some('F'),
            vec![ComponentRef::new("E", 100, 100).scaled(0.5)],
        )
        .build()
}

/// A font where "Z" is a composite that contains itself.
pub fn cyclic_composite() -> Vec<u8> {
    TestFontBuilder::new()
        .composite("Z", Some('Z'), vec![ComponentRef::new("Z", 10, 0)])
        .build()
}
