//! Closed polylines and their orientation

use kurbo::{Point, Rect};

/// The letters a mixed font covers, in glyph order.
pub const LETTERS: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// An ordered ring of points.
///
/// The ring is implicitly closed: a trailing point equal to the first one
/// may or may not be present, and every computation here treats both forms
/// the same way.
///
/// Orientation follows the usual mathematical convention: a positive signed
/// area (counter-clockwise in y-up space) marks an exterior, a negative one
/// marks a hole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Contour { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// The number of points, including a closing point if present.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points without a duplicated closing point.
    pub fn ring(&self) -> &[Point] {
        match self.points.as_slice() {
            [first, rest @ .., last] if !rest.is_empty() && first == last => {
                &self.points[..self.points.len() - 1]
            }
            points => points,
        }
    }

    /// Shoelace sum over the ring.
    pub fn signed_area(&self) -> f64 {
        let ring = self.ring();
        if ring.len() < 3 {
            return 0.0;
        }
        let mut twice_area = 0.0;
        for (i, p0) in ring.iter().enumerate() {
            let p1 = ring[(i + 1) % ring.len()];
            twice_area += p0.x * p1.y - p1.x * p0.y;
        }
        twice_area * 0.5
    }

    pub fn is_exterior(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn is_hole(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Returns a copy whose last point repeats the first.
    pub fn closed(mut self) -> Self {
        if let (Some(first), Some(last)) = (self.points.first(), self.points.last()) {
            if first != last {
                let first = *first;
                self.points.push(first);
            }
        }
        self
    }

    /// Returns the contour with the opposite winding direction.
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    /// Returns the contour wound so that its signed area has the requested sign.
    pub fn oriented(self, exterior: bool) -> Self {
        let area = self.signed_area();
        if (exterior && area < 0.0) || (!exterior && area > 0.0) {
            self.reversed()
        } else {
            self
        }
    }

    /// Drop consecutive points closer than `tolerance` to their predecessor.
    pub fn dedup(&self, tolerance: f64) -> Self {
        let mut points: Vec<Point> = Vec::with_capacity(self.points.len());
        for pt in self.ring() {
            match points.last() {
                Some(prev) if prev.distance(*pt) <= tolerance => (),
                _ => points.push(*pt),
            }
        }
        while points.len() > 1 {
            let (first, last) = (points[0], points[points.len() - 1]);
            if first.distance(last) > tolerance {
                break;
            }
            points.pop();
        }
        Contour { points }
    }

    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        Some(
            rest.iter()
                .fold(Rect::from_points(*first, *first), |rect, pt| {
                    rect.union_pt(*pt)
                }),
        )
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Contour::new(points)
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Contour::new(iter.into_iter().collect())
    }
}

/// The union of the bounds of all contours.
pub fn bounds_of(contours: &[Contour]) -> Option<Rect> {
    contours
        .iter()
        .filter_map(Contour::bounds)
        .reduce(|acc, rect| acc.union(rect))
}
