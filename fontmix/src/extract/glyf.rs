//! Walking TrueType outlines

use kurbo::{Affine, Point};
use skrifa::{
    outline::OutlinePen,
    raw::{
        tables::{
            glyf::{
                Anchor, Component, CompositeGlyphFlags, CurvePoint, Glyf, Glyph, SimpleGlyph,
            },
            loca::Loca,
        },
        types::GlyphId,
        FontRef, ReadError, TableProvider,
    },
};

/// Components nested deeper than this are skipped.
pub const MAX_COMPOSITE_DEPTH: usize = 32;

/// Access to the `glyf` and `loca` tables of a font.
pub(crate) struct GlyfOutlines<'a> {
    glyf: Glyf<'a>,
    loca: Loca<'a>,
}

impl<'a> GlyfOutlines<'a> {
    pub(crate) fn new(font: &FontRef<'a>) -> Option<Self> {
        Some(GlyfOutlines {
            glyf: font.glyf().ok()?,
            loca: font.loca(None).ok()?,
        })
    }

    /// Draw the glyph, resolving components, into `pen`.
    ///
    /// Points are mapped into the coordinate space of the outermost glyph
    /// before they reach the pen. Quadratic spans are forwarded as `quad_to`,
    /// so the pen decides how curves are flattened.
    pub(crate) fn draw(&self, gid: GlyphId, pen: &mut impl OutlinePen) -> Result<(), ReadError> {
        let mut ancestors = Vec::new();
        self.draw_impl(gid, Affine::IDENTITY, &mut ancestors, pen)
    }

    fn draw_impl(
        &self,
        gid: GlyphId,
        transform: Affine,
        ancestors: &mut Vec<GlyphId>,
        pen: &mut dyn OutlinePen,
    ) -> Result<(), ReadError> {
        if ancestors.len() > MAX_COMPOSITE_DEPTH {
            log::warn!(
                "composite nesting exceeds {MAX_COMPOSITE_DEPTH} at glyph {}, skipping",
                gid.to_u32()
            );
            return Ok(());
        }
        match self.loca.get_glyf(gid, &self.glyf)? {
            None => Ok(()),
            Some(Glyph::Simple(simple)) => {
                draw_simple(&simple, transform, pen);
                Ok(())
            }
            Some(Glyph::Composite(composite)) => {
                ancestors.push(gid);
                for component in composite.components() {
                    let child = GlyphId::from(component.glyph);
                    if ancestors.contains(&child) {
                        log::warn!(
                            "glyph {} contains itself through glyph {}, skipping",
                            child.to_u32(),
                            gid.to_u32()
                        );
                        continue;
                    }
                    log::debug!(
                        "glyph {} references glyph {} at depth {}",
                        gid.to_u32(),
                        child.to_u32(),
                        ancestors.len()
                    );
                    let child_transform = transform * component_transform(&component);
                    self.draw_impl(child, child_transform, ancestors, pen)?;
                }
                ancestors.pop();
                Ok(())
            }
        }
    }
}

/// The 2×2 matrix plus offset a component is placed with.
///
/// With `SCALED_COMPONENT_OFFSET` the offset is scaled along with the
/// outline, using the same approximation of the axis scale as FreeType.
/// `ROUND_XY_TO_GRID` only affects hinted outlines and is ignored.
fn component_transform(component: &Component) -> Affine {
    let t = &component.transform;
    let [xx, yx, xy, yy] = [t.xx, t.yx, t.xy, t.yy].map(|v| v.to_f32() as f64);
    let (mut dx, mut dy) = match component.anchor {
        Anchor::Offset { x, y } => (x as f64, y as f64),
        Anchor::Point { base, component: point } => {
            log::warn!("point-matched component ({base}, {point}) placed at origin");
            (0.0, 0.0)
        }
    };
    let scaled = CompositeGlyphFlags::SCALED_COMPONENT_OFFSET;
    let offset_flags = scaled | CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET;
    if component.flags & offset_flags == scaled {
        log::debug!("scaling offset of component glyph {}", component.glyph.to_u16());
        dx *= axis_scale(xx, xy);
        dy *= axis_scale(yy, yx);
    }
    if component.flags.contains(CompositeGlyphFlags::ROUND_XY_TO_GRID) {
        log::trace!("ignoring grid rounding for component glyph {}", component.glyph.to_u16());
    }
    Affine::new([xx, yx, xy, yy, dx, dy])
}

/// Cheap estimate of the length of `(a, b)`.
fn axis_scale(a: f64, b: f64) -> f64 {
    let (a, b) = (a.abs(), b.abs());
    if a > b {
        a + 3.0 * b / 8.0
    } else {
        b + 3.0 * a / 8.0
    }
}

fn draw_simple(glyph: &SimpleGlyph, transform: Affine, pen: &mut dyn OutlinePen) {
    let points: Vec<(Point, bool)> = glyph
        .points()
        .map(|point| (transform * as_point(&point), point.on_curve))
        .collect();
    let mut start = 0;
    for end in glyph.end_pts_of_contours() {
        let end = end.get() as usize;
        if end < start || end >= points.len() {
            log::warn!("malformed contour end point {end}");
            break;
        }
        draw_contour(&points[start..=end], pen);
        start = end + 1;
    }
}

fn as_point(point: &CurvePoint) -> Point {
    Point::new(point.x as f64, point.y as f64)
}

/// Draw one TrueType contour of `(point, on_curve)` pairs, inserting the
/// implied on-curve midpoint between consecutive off-curve points.
fn draw_contour(points: &[(Point, bool)], pen: &mut dyn OutlinePen) {
    let (Some(&(first, first_on)), Some(&(last, last_on))) = (points.first(), points.last())
    else {
        return;
    };
    let (start, rest) = if first_on {
        (first, &points[1..])
    } else if last_on {
        (last, &points[..points.len() - 1])
    } else {
        (last.midpoint(first), points)
    };

    pen.move_to(start.x as f32, start.y as f32);
    let mut pending: Option<Point> = None;
    for &(pt, on_curve) in rest {
        match (on_curve, pending.take()) {
            (true, None) => pen.line_to(pt.x as f32, pt.y as f32),
            (true, Some(ctrl)) => quad_to(pen, ctrl, pt),
            (false, prev) => {
                if let Some(ctrl) = prev {
                    quad_to(pen, ctrl, ctrl.midpoint(pt));
                }
                pending = Some(pt);
            }
        }
    }
    if let Some(ctrl) = pending {
        quad_to(pen, ctrl, start);
    }
    pen.close();
}

fn quad_to(pen: &mut dyn OutlinePen, ctrl: Point, end: Point) {
    pen.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32);
}
