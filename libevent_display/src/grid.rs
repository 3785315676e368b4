use ndarray::Array2;

use super::error::ExtractError;
use super::extractor::ReadingExtractor;
use super::geometry::{Cell, Extent, GlobalMapping};
use super::noise_table::NoiseTable;

/// Grid is the 2-D picture of one event.
///
/// The value matrix is stored row-major with rows along y and columns along x, offset by the
/// minimum of each axis. Filling a cell adds to whatever it already holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    x_min: i32,
    y_min: i32,
    values: Array2<f64>,
}

impl Grid {
    /// Create a grid of zeros covering the extent
    pub fn new(extent: Extent) -> Self {
        Self {
            x_min: extent.x_min,
            y_min: extent.y_min,
            values: Array2::zeros([extent.height(), extent.width()]),
        }
    }

    /// A grid with no cells
    pub fn empty() -> Self {
        Self {
            x_min: 0,
            y_min: 0,
            values: Array2::zeros([0, 0]),
        }
    }

    fn position(&self, cell: &Cell) -> Option<[usize; 2]> {
        let row = usize::try_from(cell.y - self.y_min).ok()?;
        let col = usize::try_from(cell.x - self.x_min).ok()?;
        if row < self.values.nrows() && col < self.values.ncols() {
            Some([row, col])
        } else {
            None
        }
    }

    /// Add value to a cell. Returns false if the cell lies outside of the grid
    pub fn fill(&mut self, cell: &Cell, value: f64) -> bool {
        match self.position(cell) {
            Some(idx) => {
                self.values[idx] += value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, cell: &Cell) -> Option<f64> {
        self.position(cell).map(|idx| self.values[idx])
    }

    /// The axis bounds of the grid. None for an empty grid
    pub fn extent(&self) -> Option<Extent> {
        if self.values.is_empty() {
            return None;
        }
        Some(Extent {
            x_min: self.x_min,
            x_max: self.x_min + self.values.ncols() as i32 - 1,
            y_min: self.y_min,
            y_max: self.y_min + self.values.nrows() as i32 - 1,
        })
    }

    /// The value matrix, indexed [[y - y_min, x - x_min]]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Subtract the baseline from a raw reading. The result is not clamped.
pub fn correct(raw: i64, baseline: f64) -> f64 {
    raw as f64 - baseline
}

/// Fold every channel of the mapping into a new grid.
///
/// The grid spans the bounding box of the mapping. Each channel's raw reading is corrected by its
/// baseline and added to the channel's cell.
pub fn aggregate(
    mapping: &GlobalMapping,
    noise: &NoiseTable,
    extractor: &ReadingExtractor,
) -> Result<Grid, ExtractError> {
    let mut grid = match mapping.extent() {
        Some(extent) => Grid::new(extent),
        None => return Ok(Grid::empty()),
    };

    for (key, cell) in mapping.iter() {
        let raw = extractor.read(key.board, key.channel)?;
        let corrected = correct(raw, noise.lookup(key.board, key.channel));
        grid.fill(cell, corrected);
    }

    Ok(grid)
}
