//! 2D grid of ecosystem cells.

use flora_core::{cell_count, Cell, Direction, Error, Position, Result};
use serde::{Deserialize, Serialize};

/// A bounded square grid stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a zeroed `size`x`size` grid
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfiguration(
                "grid size must be positive".to_string(),
            ));
        }
        let count = cell_count(size).ok_or_else(|| {
            Error::InvalidConfiguration(format!("grid size {} is too large", size))
        })?;
        Ok(Self {
            size,
            cells: vec![Cell::default(); count],
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the cell at a position
    pub fn get(&self, pos: Position) -> Result<&Cell> {
        self.check_bounds(pos)?;
        Ok(&self.cells[pos.index(self.size)])
    }

    /// Overwrite the cell at a position
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<()> {
        self.check_bounds(pos)?;
        let index = pos.index(self.size);
        self.cells[index] = cell;
        Ok(())
    }

    /// Unchecked access for loops already bounded by `size`
    pub(crate) fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.index(self.size)]
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        let index = pos.index(self.size);
        &mut self.cells[index]
    }

    /// Overwrite every cell with the contents of a same-shape grid
    pub(crate) fn copy_from(&mut self, other: &Grid) {
        debug_assert_eq!(self.size, other.size);
        self.cells.copy_from_slice(&other.cells);
    }

    /// Check that the cell storage matches the declared size
    pub(crate) fn validate(&self) -> Result<()> {
        if self.size == 0 || cell_count(self.size) != Some(self.cells.len()) {
            return Err(Error::InvalidState(format!(
                "grid of size {} holds {} cells",
                self.size,
                self.cells.len()
            )));
        }
        Ok(())
    }

    fn check_bounds(&self, pos: Position) -> Result<()> {
        if pos.row >= self.size || pos.col >= self.size {
            return Err(Error::IndexOutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            });
        }
        Ok(())
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Rows of the grid, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index / self.size, index % self.size)
    }

    /// Iterator over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..self.cells.len()).map(move |i| Position::new(i / size, i % size))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }

    /// Moore neighbors of a position as visited by the update kernel
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> {
        moore_neighbors(pos, self.size)
    }
}

/// Moore neighbors in kernel order, stopping at the first coordinate that
/// leaves the grid.
///
/// The walk does not skip past an out-of-range neighbor: everything after it
/// in [`Direction::MOORE`] order is dropped too. Cells on the top row or left
/// column therefore see no neighbors at all.
pub fn moore_neighbors(pos: Position, size: usize) -> impl Iterator<Item = Position> {
    Direction::MOORE.into_iter().map_while(move |direction| {
        let (drow, dcol) = direction.to_delta();
        pos.offset(drow, dcol, size)
    })
}
