//! Splitting regions along an axis

use kurbo::Rect;

use crate::polygon::{repair_region, Region};

/// The minimum distance the clipping rectangles extend past the region.
pub const CUT_MARGIN: f64 = 1000.0;

/// The axis a cut coordinate is measured on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// A vertical cut line at an x coordinate.
    X,
    /// A horizontal cut line at a y coordinate.
    Y,
}

/// The two sides of a cut.
#[derive(Clone, Debug, PartialEq)]
pub struct Halves {
    /// The part below (for [`Axis::Y`]) or left of (for [`Axis::X`]) the cut.
    pub low: Region,
    /// The remaining part.
    pub high: Region,
}

/// Split `region` in two at `coordinate` along `axis`.
///
/// Each half is the intersection with a rectangle that extends well past the
/// region's bounds, so that no part of the outline is clipped by the
/// rectangle's far edges.
pub fn cut_at(region: &Region, axis: Axis, coordinate: f64) -> Halves {
    let Some(bounds) = region.bounds() else {
        return Halves {
            low: Region::empty(),
            high: Region::empty(),
        };
    };
    let margin = CUT_MARGIN.max(bounds.width()).max(bounds.height());
    let outer = bounds.inflate(margin, margin);
    let (low, high) = match axis {
        Axis::Y => {
            let y = coordinate.clamp(outer.y0, outer.y1);
            (
                Rect::new(outer.x0, outer.y0, outer.x1, y),
                Rect::new(outer.x0, y, outer.x1, outer.y1),
            )
        }
        Axis::X => {
            let x = coordinate.clamp(outer.x0, outer.x1);
            (
                Rect::new(outer.x0, outer.y0, x, outer.y1),
                Rect::new(x, outer.y0, outer.x1, outer.y1),
            )
        }
    };
    Halves {
        low: clip(region, low),
        high: clip(region, high),
    }
}

fn clip(region: &Region, rect: Rect) -> Region {
    if rect.area() <= 0.0 {
        return Region::empty();
    }
    repair_region(region.intersection(&Region::from_rect(rect)))
}

/// The part of `region` between `lo` and `hi` along `axis`.
pub fn strip(region: &Region, axis: Axis, lo: f64, hi: f64) -> Region {
    let above = cut_at(region, axis, lo).high;
    cut_at(&above, axis, hi).low
}

/// The part of `region` inside `rect`.
///
/// Cells cut from one region along shared grid lines meet exactly, so their
/// union closes up around counters again.
pub fn cell(region: &Region, rect: Rect) -> Region {
    clip(region, rect)
}
