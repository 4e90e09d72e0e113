//! Toroidal grid of aged cells.
//!
//! Grids are immutable once built: stepping produces a new grid, so a renderer
//! can keep reading one generation while the next is computed.

use rand::Rng;

/// Moore neighbourhood offsets `(dx, dy)`, in rule weight order:
/// east, west, north, south, north-east, north-west, south-east, south-west.
///
/// `y` grows southwards.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, -1),
    (0, 1),
    (1, -1),
    (-1, -1),
    (1, 1),
    (-1, 1),
];

/// State of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Dead,
    /// Alive for `age` consecutive generations since birth (0 when just born).
    Alive(u64),
}

impl Cell {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Cell::Alive(_))
    }

    /// Age of a live cell, `None` when dead.
    #[inline]
    pub fn age(self) -> Option<u64> {
        match self {
            Cell::Dead => None,
            Cell::Alive(age) => Some(age),
        }
    }
}

/// Wrap a possibly negative coordinate onto `0..len`.
#[inline]
pub fn wrap(coord: isize, len: usize) -> usize {
    coord.rem_euclid(len as isize) as usize
}

/// A `width x height` toroidal grid of cells.
///
/// Data is stored row-major: `cells[y * width + x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; width * height],
        })
    }

    /// Create a grid from row-major cells.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        if cells.len() != width * height {
            return Err(GridError::CellCountMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a grid whose cell at `(x, y)` is `f(x, y)`.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize) -> Cell,
    {
        check_dimensions(width, height)?;
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Random grid: each cell is independently alive (age 0) with
    /// probability `fill_ratio`, otherwise dead.
    ///
    /// Fill ratios outside `[0, 1]` (or NaN) are rejected.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        fill_ratio: f64,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        if !(0.0..=1.0).contains(&fill_ratio) {
            return Err(GridError::InvalidFillRatio(fill_ratio));
        }
        Ok(Self::random_unchecked(width, height, fill_ratio, rng))
    }

    /// `random` for arguments the caller has already validated.
    pub(crate) fn random_unchecked<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        fill_ratio: f64,
        rng: &mut R,
    ) -> Self {
        let cells = (0..width * height)
            .map(|_| {
                if rng.gen_bool(fill_ratio) {
                    Cell::Alive(0)
                } else {
                    Cell::Dead
                }
            })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Assemble a grid from parts produced by the stepper.
    pub(crate) fn from_raw(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Return a copy with the cell at `(x, y)` (wrapped) replaced.
    pub fn with_cell(mut self, x: isize, y: isize, cell: Cell) -> Self {
        let idx = self.idx(wrap(x, self.width), wrap(y, self.height));
        self.cells[idx] = cell;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get total grid size (width * height).
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Convert in-range (x, y) coordinates to a flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Cell at `(x, y)`, wrapping both coordinates.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Cell {
        self.cells[self.idx(wrap(x, self.width), wrap(y, self.height))]
    }

    /// Cell at in-range `(x, y)`, `None` when out of bounds.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    /// Neighbour of `(x, y)` at `NEIGHBOR_OFFSETS[i]`.
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, i: usize) -> Cell {
        let (dx, dy) = NEIGHBOR_OFFSETS[i];
        self.get(x as isize + dx, y as isize + dy)
    }

    /// Row-major cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Number of live cells.
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// True when no cell is alive.
    pub fn is_extinct(&self) -> bool {
        !self.cells.iter().any(|c| c.is_alive())
    }

    /// Number of cells whose aliveness differs between two same-sized grids.
    pub fn aliveness_changes(&self, other: &Grid) -> usize {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        self.cells
            .iter()
            .zip(&other.cells)
            .filter(|(a, b)| a.is_alive() != b.is_alive())
            .count()
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), GridError> {
    if width == 0 || height == 0 || width > isize::MAX as usize || height > isize::MAX as usize {
        return Err(GridError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Grid construction errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Fill ratio must be within [0, 1], got {0}")]
    InvalidFillRatio(f64),
    #[error("Expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
}
