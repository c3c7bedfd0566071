//! Horizontal metrics for generated glyphs

use write_fonts::tables::glyf::{Bbox, SimpleGlyph};

/// Advance used for letters without outlines.
pub const EMPTY_ADVANCE: u16 = 500;
/// The smallest advance given to a letter with outlines.
pub const MIN_ADVANCE: u16 = 500;

/// Advance width and left side bearing of one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub advance: u16,
    pub lsb: i16,
}

impl GlyphMetrics {
    /// Fixed metrics for `.notdef`.
    pub const NOTDEF: GlyphMetrics = GlyphMetrics {
        advance: 600,
        lsb: 100,
    };

    /// Derive metrics from a glyph's bounding box.
    ///
    /// The advance is 1.2 times the ink width (at least [`MIN_ADVANCE`]);
    /// the side bearing is a tenth of the width to the left of the ink,
    /// never negative.
    pub fn for_glyph(glyph: &SimpleGlyph) -> Self {
        if glyph.contours.is_empty() {
            return GlyphMetrics {
                advance: EMPTY_ADVANCE,
                lsb: 0,
            };
        }
        let Bbox { x_min, x_max, .. } = glyph.bbox;
        let width = f64::from(x_max) - f64::from(x_min);
        let advance = (width * 1.2).round().clamp(0.0, u16::MAX as f64) as u16;
        let lsb = (f64::from(x_min) - width * 0.1).round().max(0.0);
        GlyphMetrics {
            advance: advance.max(MIN_ADVANCE),
            lsb: lsb.min(i16::MAX as f64) as i16,
        }
    }
}

/// Summary values for `hhea`, computed over every glyph with ink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HorizontalExtents {
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
}

impl HorizontalExtents {
    pub fn compute<'a>(glyphs: impl IntoIterator<Item = (&'a SimpleGlyph, GlyphMetrics)>) -> Self {
        let mut extents: Option<HorizontalExtents> = None;
        let mut advance_width_max = 0;
        for (glyph, metrics) in glyphs {
            advance_width_max = advance_width_max.max(metrics.advance);
            if glyph.contours.is_empty() {
                continue;
            }
            let width = i32::from(glyph.bbox.x_max) - i32::from(glyph.bbox.x_min);
            let rsb = i32::from(metrics.advance) - (i32::from(metrics.lsb) + width);
            let extent = i32::from(metrics.lsb) + width;
            let rsb = saturate(rsb);
            let extent = saturate(extent);
            extents = Some(match extents {
                None => HorizontalExtents {
                    advance_width_max: 0,
                    min_left_side_bearing: metrics.lsb,
                    min_right_side_bearing: rsb,
                    x_max_extent: extent,
                },
                Some(prev) => HorizontalExtents {
                    advance_width_max: 0,
                    min_left_side_bearing: prev.min_left_side_bearing.min(metrics.lsb),
                    min_right_side_bearing: prev.min_right_side_bearing.min(rsb),
                    x_max_extent: prev.x_max_extent.max(extent),
                },
            });
        }
        HorizontalExtents {
            advance_width_max,
            ..extents.unwrap_or_default()
        }
    }
}

fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}
