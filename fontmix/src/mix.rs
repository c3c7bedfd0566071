//! Mixing normalized source glyphs on a grid
//!
//! The canonical square is split into rows (and optionally columns) by the
//! cut coordinates; each cell takes its ink from one source, and the cells
//! are unioned back into a single glyph.

mod assign;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

pub use assign::{assign, GridShape};

use crate::{
    cut::cell,
    error::{EmptyReason, GlyphOutcome},
    extract::GlyphSource,
    polygon::{normalize, polygon_to_contours, region_from_contours, Region, CANONICAL_SIZE},
};

/// The cut used when no horizontal cut is given, in canonical units.
pub const DEFAULT_H_CUT: f64 = CANONICAL_SIZE / 2.0;

/// What to do when every grid cell comes out empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyUnionPolicy {
    /// Use the first source's glyph unmodified.
    #[default]
    FirstSource,
    /// Leave the letter blank.
    Blank,
}

/// How a letter is divided between sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CutMode {
    /// Horizontal strips only.
    #[default]
    Horizontal,
    /// Rows and columns.
    Checkerboard,
}

/// Cut positions for one mix, in canonical units (0 to 1000) measured
/// across the combined bounds of the sources.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MixSpec {
    pub h_cuts: Vec<f64>,
    /// Column cuts; `None` or empty means a single column.
    pub v_cuts: Option<Vec<f64>>,
    pub empty_union: EmptyUnionPolicy,
}

impl MixSpec {
    pub fn horizontal(h_cuts: Vec<f64>) -> Self {
        MixSpec {
            h_cuts,
            ..Default::default()
        }
    }

    pub fn grid(h_cuts: Vec<f64>, v_cuts: Vec<f64>) -> Self {
        MixSpec {
            h_cuts,
            v_cuts: Some(v_cuts),
            ..Default::default()
        }
    }
}

fn sorted(cuts: &[f64]) -> Vec<f64> {
    let mut cuts = cuts.to_vec();
    cuts.sort_by(f64::total_cmp);
    cuts
}

/// Grid line positions from `lo` to `hi`, with `cuts` in between.
fn boundaries(lo: f64, hi: f64, cuts: &[f64]) -> Vec<f64> {
    let inner = cuts.iter().map(|cut| lo + (hi - lo) * cut / CANONICAL_SIZE);
    std::iter::once(lo)
        .chain(inner)
        .chain(std::iter::once(hi))
        .collect()
}

/// Combine source regions into one.
///
/// Missing or empty sources are dropped first; the remaining ones keep their
/// relative order and are the `k` sources cells are assigned from. With a
/// single remaining source it is returned as is.
pub fn mix_regions(sources: &[Option<Region>], spec: &MixSpec) -> Option<Region> {
    let valid: Vec<&Region> = sources
        .iter()
        .flatten()
        .filter(|region| !region.is_empty())
        .collect();
    match valid.as_slice() {
        [] => return None,
        [only] => return Some((*only).clone()),
        _ => (),
    }
    let k = valid.len();
    let domain = valid
        .iter()
        .filter_map(|region| region.bounds())
        .reduce(|acc, rect| acc.union(rect))?;

    let h_cuts = if spec.h_cuts.is_empty() {
        vec![DEFAULT_H_CUT]
    } else {
        sorted(&spec.h_cuts)
    };
    let rows = boundaries(domain.y0, domain.y1, &h_cuts);
    let cols = match spec.v_cuts.as_deref() {
        Some(v_cuts) if !v_cuts.is_empty() => boundaries(domain.x0, domain.x1, &sorted(v_cuts)),
        _ => vec![domain.x0, domain.x1],
    };
    let shape = GridShape::new(rows.len() - 1, cols.len() - 1);
    log::debug!("mixing {k} sources on a {}×{} grid", shape.rows, shape.cols);

    let mut mixed = Region::empty();
    for (row, ys) in rows.windows(2).enumerate() {
        for (col, xs) in cols.windows(2).enumerate() {
            let source = assign(row, col, shape, k);
            let piece = cell(valid[source], Rect::new(xs[0], ys[0], xs[1], ys[1]));
            if piece.is_empty() {
                log::debug!("cell [{row},{col}] from source {source} is empty");
                continue;
            }
            log::debug!("cell [{row},{col}] from source {source}");
            mixed = mixed.union(&piece);
        }
    }

    if !mixed.is_empty() {
        return Some(mixed);
    }
    match spec.empty_union {
        EmptyUnionPolicy::FirstSource => {
            log::warn!("every cell was empty, using the first source unmodified");
            Some(valid[0].clone())
        }
        EmptyUnionPolicy::Blank => {
            log::warn!("every cell was empty, leaving the glyph blank");
            None
        }
    }
}

/// Mix two sources by quadrant: one horizontal and one vertical cut.
pub fn mix_quadrants(sources: &[Option<Region>], x_cut: f64, y_cut: f64) -> Option<Region> {
    mix_regions(sources, &MixSpec::grid(vec![y_cut], vec![x_cut]))
}

/// Options for mixing a single letter.
#[derive(Clone, Debug, PartialEq)]
pub struct LetterSettings {
    /// Row cut fractions, in (0, 1).
    pub h_cuts: Vec<f64>,
    /// Column cut fractions, in (0, 1).
    pub v_cuts: Vec<f64>,
    /// Scale each source into the canonical square before mixing.
    pub normalize: bool,
    pub mode: CutMode,
    pub empty_union: EmptyUnionPolicy,
}

impl Default for LetterSettings {
    fn default() -> Self {
        LetterSettings {
            h_cuts: Vec::new(),
            v_cuts: Vec::new(),
            normalize: true,
            mode: CutMode::Horizontal,
            empty_union: EmptyUnionPolicy::FirstSource,
        }
    }
}

impl LetterSettings {
    /// Columns are used in checkerboard mode or whenever vertical cuts
    /// are given.
    pub fn uses_columns(&self) -> bool {
        self.mode == CutMode::Checkerboard || !self.v_cuts.is_empty()
    }

    pub fn mix_spec(&self) -> MixSpec {
        let to_units =
            |cuts: &[f64]| -> Vec<f64> { cuts.iter().map(|cut| cut * CANONICAL_SIZE).collect() };
        MixSpec {
            h_cuts: to_units(&self.h_cuts),
            v_cuts: self.uses_columns().then(|| to_units(&self.v_cuts)),
            empty_union: self.empty_union,
        }
    }
}

/// Extract one source's glyph as a region, normalized if requested.
pub fn source_region(
    source: &impl GlyphSource,
    letter: &str,
    normalize_size: bool,
) -> Option<Region> {
    let outcome = source.extract(letter);
    if let Some(reason) = outcome.empty_reason() {
        log::info!("'{letter}' is blank in {}: {reason}", source.label());
        return None;
    }
    let Some(region) = region_from_contours(outcome.contours()) else {
        log::info!("'{letter}' is degenerate in {}", source.label());
        return None;
    };
    if !normalize_size {
        return Some(region);
    }
    let normalized = normalize(&region, CANONICAL_SIZE);
    (!normalized.is_empty()).then_some(normalized)
}

/// Extract `letter` from every source and mix the results.
pub fn mix_letter<S: GlyphSource>(
    sources: &[S],
    letter: &str,
    settings: &LetterSettings,
) -> GlyphOutcome {
    let regions: Vec<Option<Region>> = sources
        .iter()
        .map(|source| source_region(source, letter, settings.normalize))
        .collect();
    let usable = regions.iter().flatten().count();
    log::debug!("'{letter}': {usable} of {} sources usable", sources.len());
    match mix_regions(&regions, &settings.mix_spec()) {
        Some(mixed) => GlyphOutcome::from_contours(
            polygon_to_contours(&mixed),
            EmptyReason::DegenerateGeometry,
        ),
        None => GlyphOutcome::Empty(EmptyReason::NoInk),
    }
}
