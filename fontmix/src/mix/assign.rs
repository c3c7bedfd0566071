//! Assigning grid cells to sources

/// The number of rows and columns of a mixing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        GridShape { rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

// Alternating row patterns for small source counts. Rows past the end
// repeat the last row; columns past the end repeat the last entry.
const PATTERN_2: &[&[usize]] = &[&[0, 1], &[1, 0]];
const PATTERN_3: &[&[usize]] = &[&[0, 1, 2], &[2, 0, 1]];
const PATTERN_4: &[&[usize]] = &[&[0, 1, 2, 3], &[3, 2, 1, 0]];

/// Pick the source index for the cell at (`row`, `col`).
///
/// - A single column is pure strip mode: rows cycle through the sources.
/// - Two to four sources use a fixed alternating pattern.
/// - Other source counts use the diagonal rule `(row + col) mod k`.
///
/// Every source index in `0..k` appears at least once whenever
/// `rows × cols ≥ k`. For grid shapes where the pattern would leave a
/// source out, cells are instead assigned in row-major order, cycling
/// through the sources.
pub fn assign(row: usize, col: usize, shape: GridShape, k: usize) -> usize {
    if k <= 1 {
        return 0;
    }
    if shape.cols <= 1 {
        return row % k;
    }
    if pattern_covers(shape, k) {
        pattern_entry(row, col, k)
    } else {
        (row * shape.cols + col) % k
    }
}

fn pattern(k: usize) -> Option<&'static [&'static [usize]]> {
    match k {
        2 => Some(PATTERN_2),
        3 => Some(PATTERN_3),
        4 => Some(PATTERN_4),
        _ => None,
    }
}

fn pattern_entry(row: usize, col: usize, k: usize) -> usize {
    match pattern(k) {
        Some(rows) => {
            let entries = rows[row.min(rows.len() - 1)];
            entries[col.min(entries.len() - 1)]
        }
        None => (row + col) % k,
    }
}

/// `true` if the pattern meets the coverage guarantee for this shape (or
/// the grid is too small for the guarantee to apply).
fn pattern_covers(shape: GridShape, k: usize) -> bool {
    if shape.cell_count() < k {
        return true;
    }
    let mut seen = vec![false; k];
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            seen[pattern_entry(row, col, k)] = true;
        }
    }
    seen.into_iter().all(|hit| hit)
}
