//! Pens that turn glyph outlines into polylines

use kurbo::{CubicBez, ParamCurve, Point, QuadBez};
use skrifa::outline::OutlinePen;

use crate::contour::Contour;

/// Number of straight segments each cubic curve is split into.
pub const CUBIC_STEPS: usize = 20;
/// Number of straight segments each quadratic span is split into.
pub const QUAD_STEPS: usize = 10;

/// A pen that flattens curves at a fixed step count and collects closed
/// polylines.
///
/// Curves are sampled by evaluating their Bernstein form at evenly spaced
/// parameter values, so the number of emitted points does not depend on the
/// size or curvature of the segment.
#[derive(Debug, Default)]
pub struct FlatteningPen {
    contours: Vec<Contour>,
    current: Vec<Point>,
}

impl FlatteningPen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish any open contour and return everything drawn so far.
    pub fn into_contours(mut self) -> Vec<Contour> {
        self.finish_contour();
        self.contours
    }

    fn finish_contour(&mut self) {
        let points = std::mem::take(&mut self.current);
        // a lone move_to draws nothing
        if points.len() > 1 {
            self.contours.push(Contour::new(points).closed());
        }
    }

    fn last_point(&self) -> Point {
        self.current.last().copied().unwrap_or(Point::ZERO)
    }
}

fn to_point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

fn sample(curve: &impl ParamCurve, steps: usize, out: &mut Vec<Point>) {
    out.extend((1..=steps).map(|i| curve.eval(i as f64 / steps as f64)));
}

impl OutlinePen for FlatteningPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.finish_contour();
        self.current.push(to_point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current.push(to_point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let quad = QuadBez::new(self.last_point(), to_point(cx0, cy0), to_point(x, y));
        sample(&quad, QUAD_STEPS, &mut self.current);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let cubic = CubicBez::new(
            self.last_point(),
            to_point(cx0, cy0),
            to_point(cx1, cy1),
            to_point(x, y),
        );
        sample(&cubic, CUBIC_STEPS, &mut self.current);
    }

    fn close(&mut self) {
        self.finish_contour();
    }
}
