//! Square transverse grids and the per-event fields defined on them.
//!
//! All grids in a run share one [`GridSpec`]: `n × n` cells of width
//! `step` covering `[-max, max]` in both directions, cell centres at
//! `-max + (i + 0.5) * step`. [`GridSpec::new`] makes `n` odd so a cell is
//! centred on the origin, as the hydro solver's `2·nls + 1` lattice
//! requires. Storage is row-major `Vec<f64>`.

use indexmap::IndexMap;

/// Geometry shared by every grid in a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    /// Cell width in fm.
    pub step: f64,
    /// Half-extent in fm; the grid spans `[-max, max]`.
    pub max: f64,
}

impl Default for GridSpec {
    /// 0.15 fm cells out to 15 fm, widened to 201 cells (`max = 15.075`).
    fn default() -> Self {
        Self::new(0.15, 15.0)
    }
}

impl GridSpec {
    /// A grid of `step`-wide cells covering at least `[-max, max]`.
    ///
    /// The cell count is rounded up to the next odd number and `max` is
    /// widened to `step · n / 2`. Non-positive or non-finite inputs are kept
    /// as given so [`is_valid`](Self::is_valid) can reject them.
    pub fn new(step: f64, max: f64) -> Self {
        let raw = 2.0 * max / step;
        if !(raw.is_finite() && raw > 0.0 && step > 0.0) {
            return Self { step, max };
        }
        let whole = if (raw - raw.round()).abs() < 1e-9 {
            raw.round()
        } else {
            raw.ceil()
        };
        let n = (whole as usize) | 1;
        Self {
            step,
            max: step * n as f64 / 2.0,
        }
    }

    /// Number of cells along one axis.
    pub fn cells(&self) -> usize {
        (2.0 * self.max / self.step).round() as usize
    }

    /// Area of one cell in fm².
    pub fn cell_area(&self) -> f64 {
        self.step * self.step
    }

    /// Coordinate of the centre of cell `i` along either axis.
    pub fn center(&self, i: usize) -> f64 {
        -self.max + (i as f64 + 0.5) * self.step
    }

    /// `true` if `step` and `max` are finite, positive and yield at least one cell.
    pub fn is_valid(&self) -> bool {
        self.step.is_finite()
            && self.max.is_finite()
            && self.step > 0.0
            && self.max > 0.0
            && self.cells() > 0
    }

    /// Bilinear interpolation of `grid` at `(x, y)`; zero outside the grid.
    ///
    /// Rows index `y`, columns index `x`.
    pub fn interpolate(&self, grid: &Grid2, x: f64, y: f64) -> f64 {
        let fx = (x + self.max) / self.step - 0.5;
        let fy = (y + self.max) / self.step - 0.5;
        let n = grid.cols() as f64;
        let m = grid.rows() as f64;
        if !(fx > -1.0 && fy > -1.0 && fx < n && fy < m) {
            return 0.0;
        }
        let c0 = fx.floor();
        let r0 = fy.floor();
        let tx = fx - c0;
        let ty = fy - r0;
        let c0 = c0 as isize;
        let r0 = r0 as isize;
        let at = |r: isize, c: isize| -> f64 {
            if r < 0 || c < 0 || r as usize >= grid.rows() || c as usize >= grid.cols() {
                0.0
            } else {
                grid.get(r as usize, c as usize)
            }
        };
        (1.0 - ty) * ((1.0 - tx) * at(r0, c0) + tx * at(r0, c0 + 1))
            + ty * ((1.0 - tx) * at(r0 + 1, c0) + tx * at(r0 + 1, c0 + 1))
    }
}

/// A dense row-major 2D array of `f64`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid2 {
    /// A `rows × cols` grid filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap a row-major buffer. Returns `None` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Build from equal-length rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return None;
        }
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Mutable value at `(row, col)`.
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }

    /// Row-major backing slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate over rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics, and an empty grid has nothing to yield anyway.
        self.data.chunks(self.cols.max(1))
    }

    /// Sum of all cells.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

}

/// One event's initial density profile plus its generator metadata.
///
/// Immutable after construction. The metadata map preserves the order in
/// which the generator wrote its `# key = value` header lines.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialConditionGrid {
    density: Grid2,
    metadata: IndexMap<String, f64>,
}

impl InitialConditionGrid {
    /// Metadata key holding the total multiplicity.
    pub const MULT_KEY: &'static str = "mult";

    /// Wrap a density grid with its metadata.
    pub fn new(density: Grid2, metadata: IndexMap<String, f64>) -> Self {
        Self { density, metadata }
    }

    /// Build with only a multiplicity attribute.
    pub fn with_multiplicity(density: Grid2, multiplicity: f64) -> Self {
        let mut metadata = IndexMap::new();
        metadata.insert(Self::MULT_KEY.to_string(), multiplicity);
        Self { density, metadata }
    }

    /// The density grid.
    pub fn density(&self) -> &Grid2 {
        &self.density
    }

    /// Total multiplicity, falling back to the grid sum when the generator
    /// did not record one.
    pub fn multiplicity(&self) -> f64 {
        self.metadata
            .get(Self::MULT_KEY)
            .copied()
            .unwrap_or_else(|| self.density.sum())
    }

    /// All metadata in header order.
    pub fn metadata(&self) -> &IndexMap<String, f64> {
        &self.metadata
    }
}

/// Free-streamed hydrodynamic initial fields, all on the input grid's shape.
#[derive(Clone, Debug, PartialEq)]
pub struct FreestreamedFields {
    /// Landau-frame energy density `e`.
    pub energy_density: Grid2,
    /// Flow velocity component `u^x`.
    pub u1: Grid2,
    /// Flow velocity component `u^y`.
    pub u2: Grid2,
    /// Shear stress `π^{xx}`.
    pub pi11: Grid2,
    /// Shear stress `π^{xy}`.
    pub pi12: Grid2,
    /// Shear stress `π^{yy}`.
    pub pi22: Grid2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_spec_geometry() {
        let spec = GridSpec::default();
        assert_eq!(spec.cells(), 201);
        assert!((spec.max - 15.075).abs() < 1e-12);
        assert!((spec.center(0) + 15.0).abs() < 1e-9);
        assert!(spec.center(100).abs() < 1e-9);
        assert!((spec.center(200) - 15.0).abs() < 1e-9);
        assert!(spec.is_valid());
    }

    #[test]
    fn new_rounds_cells_up_to_odd() {
        // Exact odd count: unchanged.
        assert_eq!(GridSpec::new(1.0, 1.5), GridSpec { step: 1.0, max: 1.5 });
        // Even count: one more cell.
        let g = GridSpec::new(1.0, 2.0);
        assert_eq!(g.cells(), 5);
        assert_eq!(g.max, 2.5);
        // Fractional count: rounded up, then odd.
        assert_eq!(GridSpec::new(1.0, 1.2).cells(), 3);
        assert_eq!(GridSpec::new(0.2, 6.0).cells(), 61);
        // Invalid input passes through for is_valid to reject.
        assert!(!GridSpec::new(0.0, 1.0).is_valid());
        assert!(!GridSpec::new(1.0, f64::NAN).is_valid());
    }

    #[test]
    fn invalid_specs() {
        assert!(!GridSpec { step: 0.0, max: 1.0 }.is_valid());
        assert!(!GridSpec { step: 1.0, max: f64::NAN }.is_valid());
        assert!(!GridSpec { step: 10.0, max: 1.0 }.is_valid());
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        let g = Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(g.get(1, 0), 3.0);
        assert_eq!(g.sum(), 10.0);
    }

    #[test]
    fn interpolation_hits_cell_centres_and_vanishes_outside() {
        let spec = GridSpec { step: 1.0, max: 1.0 };
        let g = Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        // Cell (row 0, col 1) is centred at x = 0.5, y = -0.5.
        assert!((spec.interpolate(&g, 0.5, -0.5) - 2.0).abs() < 1e-12);
        // Midpoint of all four centres.
        assert!((spec.interpolate(&g, 0.0, 0.0) - 2.5).abs() < 1e-12);
        assert_eq!(spec.interpolate(&g, 5.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn interpolation_stays_within_cell_bounds(
            values in proptest::collection::vec(0.0f64..100.0, 9),
            x in -1.5f64..1.5,
            y in -1.5f64..1.5,
        ) {
            let spec = GridSpec { step: 1.0, max: 1.5 };
            let g = Grid2::from_vec(3, 3, values.clone()).unwrap();
            let v = spec.interpolate(&g, x, y);
            let hi = values.iter().cloned().fold(0.0, f64::max);
            prop_assert!(v >= 0.0 && v <= hi + 1e-9);
        }
    }

    #[test]
    fn multiplicity_falls_back_to_sum() {
        let g = Grid2::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        let ic = InitialConditionGrid::new(g.clone(), IndexMap::new());
        assert_eq!(ic.multiplicity(), 3.0);
        let ic = InitialConditionGrid::with_multiplicity(g, 42.0);
        assert_eq!(ic.multiplicity(), 42.0);
    }
}
