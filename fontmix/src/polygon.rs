//! Polygon regions built from contours
//!
//! A [`Region`] is any number of disjoint polygons, each an exterior ring
//! with zero or more holes. Boolean operations go through `geo`'s overlay
//! engine, which also resolves self-intersecting input.

use geo::{
    Area, BooleanOps, BoundingRect, Coord, Intersects, Line, LineString, MapCoords, MultiPolygon,
    Polygon,
};
use kurbo::{Affine, Point, Rect};

use crate::contour::Contour;

/// The side of the square sources are normalized into.
pub const CANONICAL_SIZE: f64 = 1000.0;

/// Vertices closer than this are merged, and rings enclosing less than its
/// square are dropped, during repair.
pub const REPAIR_TOLERANCE: f64 = 0.1;

const MIN_AREA: f64 = REPAIR_TOLERANCE * REPAIR_TOLERANCE;

/// A set of disjoint polygons with holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Region(MultiPolygon<f64>);

impl Default for Region {
    fn default() -> Self {
        Region::empty()
    }
}

impl Region {
    pub fn empty() -> Self {
        Region(MultiPolygon::new(Vec::new()))
    }

    pub fn from_rect(rect: Rect) -> Self {
        let rect = geo::Rect::new(
            Coord {
                x: rect.x0,
                y: rect.y0,
            },
            Coord {
                x: rect.x1,
                y: rect.y1,
            },
        );
        Region(MultiPolygon::new(vec![rect.to_polygon()]))
    }

    /// `true` if the region encloses no area.
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    pub fn area(&self) -> f64 {
        self.0.unsigned_area()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.0
            .bounding_rect()
            .map(|rect| Rect::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.0 .0
    }

    pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.0
    }

    pub fn union(&self, other: &Region) -> Region {
        Region(self.0.union(&other.0))
    }

    pub fn intersection(&self, other: &Region) -> Region {
        Region(self.0.intersection(&other.0))
    }

    pub fn difference(&self, other: &Region) -> Region {
        Region(self.0.difference(&other.0))
    }

    /// Map every vertex through `transform`.
    pub fn transform(&self, transform: Affine) -> Region {
        Region(self.0.map_coords(|Coord { x, y }| {
            let pt = transform * Point::new(x, y);
            Coord { x: pt.x, y: pt.y }
        }))
    }
}

impl From<Polygon<f64>> for Region {
    fn from(value: Polygon<f64>) -> Self {
        Region(MultiPolygon::new(vec![value]))
    }
}

impl From<MultiPolygon<f64>> for Region {
    fn from(value: MultiPolygon<f64>) -> Self {
        Region(value)
    }
}

fn to_line_string(contour: &Contour) -> LineString<f64> {
    contour
        .ring()
        .iter()
        .map(|pt| Coord { x: pt.x, y: pt.y })
        .collect::<Vec<_>>()
        .into()
}

fn to_contour(ring: &LineString<f64>) -> Contour {
    ring.coords().map(|c| Point::new(c.x, c.y)).collect()
}

/// `true` if any two non-adjacent edges of the closed ring touch.
fn self_intersects(ring: &LineString<f64>) -> bool {
    let lines: Vec<Line<f64>> = ring.lines().collect();
    let n = lines.len();
    for i in 0..n {
        for j in (i + 2)..n {
            // first and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if lines[i].intersects(&lines[j]) {
                return true;
            }
        }
    }
    false
}

/// Build a polygon from a single closed contour.
///
/// The ring is wound as an exterior regardless of its input direction.
/// Self-intersecting rings are re-resolved by the overlay engine; this is
/// logged since it usually means the source outline is broken.
/// Returns `None` if fewer than three points remain or the result has no
/// area.
pub fn polygon_from_contour(contour: &Contour) -> Option<Region> {
    if contour.ring().len() < 3 {
        return None;
    }
    let cleaned = contour.dedup(REPAIR_TOLERANCE);
    if cleaned.ring().len() != contour.ring().len() {
        log::debug!(
            "merged {} near-duplicate vertices",
            contour.ring().len() - cleaned.ring().len()
        );
    }
    if cleaned.ring().len() < 3 {
        return None;
    }
    let cleaned = cleaned.oriented(true);
    let polygon = Polygon::new(to_line_string(&cleaned), Vec::new());
    let region = if self_intersects(polygon.exterior()) {
        log::warn!("repairing self-intersecting contour");
        repair(Region::from(polygon))
    } else {
        Region::from(polygon)
    };
    (!region.is_empty()).then_some(region)
}

/// Build a glyph region from all of its contours.
///
/// Contours are visited from the largest to the smallest. The winding of
/// the largest one marks ink: contours wound the same way are added and
/// contours wound the other way are cut out, so counters survive.
pub fn region_from_contours(contours: &[Contour]) -> Option<Region> {
    let mut pieces: Vec<(f64, Region)> = contours
        .iter()
        .filter_map(|c| polygon_from_contour(c).map(|region| (c.signed_area(), region)))
        .collect();
    pieces.sort_by(|(a, _), (b, _)| b.abs().total_cmp(&a.abs()));
    let ink_positive = pieces.first()?.0 >= 0.0;
    let region = pieces
        .into_iter()
        .fold(Region::empty(), |acc, (area, piece)| {
            if (area >= 0.0) == ink_positive {
                acc.union(&piece)
            } else {
                acc.difference(&piece)
            }
        });
    (!region.is_empty()).then_some(region)
}

/// Resolve self-intersections and overlaps by running the region through
/// the overlay engine, then drop slivers.
pub fn repair(region: Region) -> Region {
    let resolved = Region(region.0.union(&MultiPolygon::new(Vec::new())));
    repair_region(resolved)
}

/// Merge near-duplicate vertices and drop rings that enclose next to no
/// area.
pub fn repair_region(region: Region) -> Region {
    let before = region.0 .0.len();
    let polygons: Vec<_> = region.0.into_iter().filter_map(clean_polygon).collect();
    if polygons.len() != before {
        log::debug!("dropped {} degenerate pieces", before - polygons.len());
    }
    Region(MultiPolygon::new(polygons))
}

fn clean_polygon(polygon: Polygon<f64>) -> Option<Polygon<f64>> {
    let (exterior, interiors) = polygon.into_inner();
    let exterior = clean_ring(&exterior)?;
    let interiors = interiors.iter().filter_map(clean_ring).collect();
    let polygon = Polygon::new(exterior, interiors);
    (polygon.unsigned_area() > MIN_AREA).then_some(polygon)
}

fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let contour = to_contour(ring).dedup(REPAIR_TOLERANCE);
    if contour.ring().len() < 3 || contour.signed_area().abs() <= MIN_AREA {
        return None;
    }
    Some(to_line_string(&contour))
}

/// Scale a region uniformly to fit a `target`-sized square, centered in it.
///
/// A region whose bounds have zero width or height is returned unchanged.
pub fn normalize(region: &Region, target: f64) -> Region {
    let Some(bounds) = region.bounds() else {
        return region.clone();
    };
    let (width, height) = (bounds.width(), bounds.height());
    if width == 0.0 || height == 0.0 {
        return region.clone();
    }
    let scale = (target / height).min(target / width);
    let center = bounds.center();
    let transform = Affine::translate((target / 2.0, target / 2.0))
        * Affine::scale(scale)
        * Affine::translate((-center.x, -center.y));
    region.transform(transform)
}

/// Flatten a region into contours: for each polygon, its exterior wound
/// positively followed by its holes wound negatively.
pub fn polygon_to_contours(region: &Region) -> Vec<Contour> {
    let mut contours = Vec::new();
    for polygon in region.polygons() {
        let exterior = to_contour(polygon.exterior());
        if exterior.ring().len() < 3 {
            continue;
        }
        contours.push(exterior.oriented(true));
        contours.extend(
            polygon
                .interiors()
                .iter()
                .map(to_contour)
                .filter(|hole| hole.ring().len() >= 3)
                .map(|hole| hole.oriented(false)),
        );
    }
    contours
}
