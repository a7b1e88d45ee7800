use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::cell::Cell;
use crate::cell::NullRenderer;
use crate::cell::Placement;
use crate::cell::Renderer;
use crate::error::ConfigError;
use crate::error::GridError;
use crate::pattern::Pattern;
use crate::rules;

/// A `(row, col)` position on the grid, `(0, 0)` being the top left corner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// `self` moved by `offset`, or `None` if either coordinate overflows.
    pub fn checked_add(self, offset: Pos) -> Option<Pos> {
        Some(Pos::new(
            self.row.checked_add(offset.row)?,
            self.col.checked_add(offset.col)?,
        ))
    }
}

/// Offsets of the eight neighbors of a cell, in row-major order.
const NEIGHBORHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A fixed-size grid of [`Cell`]s. Edges don't wrap around: cells on the border simply have fewer
/// neighbors.
///
/// A generation is computed in two phases. [`Grid::compute_change_list`] looks at the grid as it
/// is and records every position that is about to flip, then [`Grid::apply_change_list`] toggles
/// them. No cell is mutated before every decision is made, so no updated cell can influence the
/// decision of another one in the same generation.
pub struct Grid {
    rows: usize,
    cols: usize,
    cell_size: usize,

    /// Row-major, always `rows * cols` long.
    cells: Vec<Cell>,

    /// The change list of the last [`Grid::compute_change_list`], waiting to be applied.
    ///
    /// Any edit made after the list was computed makes it stale, so edits drop it.
    pending: Option<Vec<Pos>>,

    /// Number of generations applied so far
    generation: u64,
}

impl Grid {
    /// Build a grid of dead cells, all of them reporting to `renderer`.
    ///
    /// Every cell is drawn once as it is created.
    pub fn new(
        rows: usize,
        cols: usize,
        cell_size: usize,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::ZeroDimension { rows, cols });
        }

        if cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }

        let mut cells = Vec::with_capacity(rows * cols);

        for row in 0..rows {
            for col in 0..cols {
                let cell = Cell::builder()
                    .placement(Placement::for_cell(row, col, cell_size))
                    .renderer(Arc::clone(&renderer))
                    .build()?;

                cell.redraw();
                cells.push(cell);
            }
        }

        debug!(rows, cols, cell_size, "Built grid");

        Ok(Self {
            rows,
            cols,
            cell_size,
            cells,
            pending: None,
            generation: 0,
        })
    }

    /// A grid nobody draws.
    pub fn headless(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        Self::new(rows, cols, 1, Arc::new(NullRenderer))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        let i = self.index(row, col)?;

        Ok(&self.cells[i])
    }

    pub fn is_active_at(&self, row: usize, col: usize) -> Result<bool, GridError> {
        self.cell(row, col).map(Cell::is_active)
    }

    /// Flip a single cell, whatever the rules say.
    pub fn toggle_cell_at(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let i = self.index(row, col)?;

        self.pending = None;
        self.cells[i].toggle();

        Ok(())
    }

    pub fn make_alive_at(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let i = self.index(row, col)?;

        self.pending = None;
        self.cells[i].make_alive();

        Ok(())
    }

    /// Number of alive neighbors of the cell at `(row, col)`.
    pub fn neighbor_count(&self, row: usize, col: usize) -> Result<u8, GridError> {
        self.index(row, col)?;

        Ok(self.alive_neighbors(row, col))
    }

    // Assumes `(row, col)` is in bounds
    fn alive_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut n = 0;

        for (dr, dc) in NEIGHBORHOOD {
            let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
                continue;
            };

            if r < self.rows && c < self.cols && self.cells[r * self.cols + c].is_active() {
                n += 1;
            }
        }

        n
    }

    /// Record every position whose state changes in the next generation, in row-major order.
    ///
    /// Nothing is mutated: the returned list is the exact difference between this generation and
    /// the next one.
    pub fn compute_change_list(&mut self) -> &[Pos] {
        let mut changes = Vec::new();

        for row in 0..self.rows {
            for col in 0..self.cols {
                let state = self.cells[row * self.cols + col].state();
                let neighbors = self.alive_neighbors(row, col);

                if rules::transition(state, neighbors).flips() {
                    changes.push(Pos::new(row, col));
                }
            }
        }

        self.pending.insert(changes).as_slice()
    }

    /// The change list waiting to be applied, if any.
    pub fn pending_changes(&self) -> Option<&[Pos]> {
        self.pending.as_deref()
    }

    /// Toggle every position of the last computed change list and consume it. Returns the number
    /// of cells that flipped.
    ///
    /// Without a fresh change list, this does nothing.
    pub fn apply_change_list(&mut self) -> usize {
        let Some(changes) = self.pending.take() else {
            return 0;
        };

        for pos in &changes {
            self.cells[pos.row * self.cols + pos.col].toggle();
        }

        self.generation += 1;

        changes.len()
    }

    /// Advance by one generation. Returns the number of cells that flipped.
    pub fn step(&mut self) -> usize {
        self.compute_change_list();
        self.apply_change_list()
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active()).count()
    }

    /// Positions of all alive cells, in row-major order.
    pub fn alive_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active())
            .map(|(i, _)| Pos::new(i / self.cols, i % self.cols))
    }

    /// Kill every alive cell. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        self.pending = None;

        let mut n = 0;
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.kill();
            n += 1;
        }

        n
    }

    /// Bring the cells of `pattern` to life, its top left corner at `origin`.
    ///
    /// If any cell of the pattern falls outside of the grid, nothing is changed.
    pub fn place(&mut self, pattern: &Pattern, origin: Pos) -> Result<(), GridError> {
        let targets = pattern
            .cells()
            .iter()
            .map(|&offset| self.place_target(origin, offset))
            .collect::<Result<Vec<_>, _>>()?;

        self.pending = None;
        for i in targets {
            self.cells[i].make_alive();
        }

        Ok(())
    }

    fn place_target(&self, origin: Pos, offset: Pos) -> Result<usize, GridError> {
        match origin.checked_add(offset) {
            Some(pos) => self.index(pos.row, pos.col),
            None => Err(GridError::OutOfBounds {
                row: origin.row.saturating_add(offset.row),
                col: origin.col.saturating_add(offset.col),
                rows: self.rows,
                cols: self.cols,
            }),
        }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("generation", &self.generation)
            .field("alive", &self.alive_count())
            .finish_non_exhaustive()
    }
}

/// One line per row, `#` for alive cells and `.` for dead ones.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(self.cols).enumerate() {
            if r > 0 {
                f.write_str("\n")?;
            }

            for cell in row {
                f.write_str(if cell.is_active() { "#" } else { "." })?;
            }
        }

        Ok(())
    }
}
