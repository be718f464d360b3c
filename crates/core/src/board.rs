//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell is empty or holds the
//! kind of the piece that locked there. Storage is a flat row-major vector
//! sized once at construction; dimensions never change afterwards.
//! Coordinates: (x, y) where x is the column (left to right) and y is the row
//! (top to bottom). Negative rows are "above the board": they are never stored.

use crate::types::{
    cell_value, Cell, ConfigError, PieceKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
    MAX_BOARD_DIMENSION,
};

/// The game board using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u16,
    height: u16,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Fails fast on a zero (or absurdly large) dimension.
    pub fn new(width: u16, height: u16) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || width > MAX_BOARD_DIMENSION || height > MAX_BOARD_DIMENSION
        {
            return Err(ConfigError::InvalidBoardSize { width, height });
        }
        Ok(Self::empty(width, height))
    }

    fn empty(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether a single mino may sit at (x, y).
    ///
    /// Columns must be inside the board and rows must be above the floor.
    /// Rows above the top edge are always clear.
    pub fn is_clear(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        y < 0 || !self.is_occupied(x, y)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        match self.row(y) {
            Some(row) => row.iter().all(|cell| cell.is_some()),
            None => false,
        }
    }

    /// Borrow a single row
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height as usize {
            return None;
        }
        let w = self.width as usize;
        Some(&self.cells[y * w..(y + 1) * w])
    }

    /// Remove row `y`, shift every row above it down by one and
    /// insert an empty row at the top.
    ///
    /// Returns false if `y` is out of range.
    pub fn remove_row(&mut self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        let w = self.width as usize;
        // Rows [0, y) move to [1, y]; copy_within handles the overlap.
        self.cells.copy_within(0..y * w, w);
        self.cells[..w].fill(None);
        true
    }

    /// Remove every full row, scanning top to bottom.
    ///
    /// Each full row is removed as soon as it is found and an empty row is
    /// inserted at the top, so rows above it shift down while rows below stay
    /// where they are. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        for y in 0..self.height as usize {
            if self.is_row_full(y) {
                self.remove_row(y);
                cleared += 1;
            }
        }
        cleared
    }

    /// Write `kind` into every given (x, y) position.
    ///
    /// Positions above the board (negative rows) or outside it are skipped.
    /// Returns the number of cells actually written.
    pub fn lock_cells(&mut self, cells: impl IntoIterator<Item = (i32, i32)>, kind: PieceKind) -> usize {
        let mut written = 0;
        for (x, y) in cells {
            if y < 0 {
                continue;
            }
            if self.set(x, y, Some(kind)) {
                written += 1;
            }
        }
        written
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Write cell values (0..=7) into `out`, row-major, reusing its allocation.
    pub fn write_values(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|&c| cell_value(c)));
    }

    /// Build a board from rows of cell values (0 = empty, 1..=7 = color id).
    ///
    /// Handy for setting up positions; unknown values are treated as empty.
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) || height > u16::MAX as usize || width > u16::MAX as usize
        {
            return Err(ConfigError::InvalidBoardSize {
                width: width.min(u16::MAX as usize) as u16,
                height: height.min(u16::MAX as usize) as u16,
            });
        }
        let mut board = Self::new(width as u16, height as u16)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                board.cells[y * width + x] = PieceKind::from_color_id(v);
            }
        }
        Ok(board)
    }

    /// Rows of cell values, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|&c| cell_value(c)).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty(DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT)
    }
}
