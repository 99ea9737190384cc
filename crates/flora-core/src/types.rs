//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};

/// Row/column coordinate on the square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by a delta, returning `None` if the result leaves a `size`x`size` grid
    pub fn offset(&self, drow: isize, dcol: isize, size: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(drow)?;
        let col = self.col.checked_add_signed(dcol)?;
        (row < size && col < size).then_some(Self { row, col })
    }

    /// Row-major index into a grid of side `size`
    pub fn index(&self, size: usize) -> usize {
        self.row * size + self.col
    }
}

/// Number of cells in a `size`x`size` grid, or `None` if that many cells
/// cannot be addressed in memory
pub fn cell_count(size: usize) -> Option<usize> {
    let count = size.checked_mul(size)?;
    let bytes = count.checked_mul(std::mem::size_of::<Cell>())?;
    (bytes <= isize::MAX as usize).then_some(count)
}

/// One of the 8 Moore neighborhood directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Direction {
    /// Neighbor visiting order used by the update kernel
    pub const MOORE: [Direction; 8] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    /// (row, col) delta
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::UpLeft => (-1, -1),
            Direction::Up => (-1, 0),
            Direction::UpRight => (-1, 1),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::DownLeft => (1, -1),
            Direction::Down => (1, 0),
            Direction::DownRight => (1, 1),
        }
    }
}

/// State of a single grid position: plant biomass, soil nutrient and
/// remaining plant lifetime.
///
/// None of the channels are clamped. Soil may go negative and plant may exceed
/// the configured plant limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub plant: f64,
    pub soil: f64,
    pub lifetime: f64,
}

impl Cell {
    pub fn new(plant: f64, soil: f64, lifetime: f64) -> Self {
        Self {
            plant,
            soil,
            lifetime,
        }
    }

    /// Bare soil with no plant
    pub fn soil(soil: f64) -> Self {
        Self {
            soil,
            ..Self::default()
        }
    }

    /// A living plant has remaining lifetime
    pub fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }

    pub fn has_plant(&self) -> bool {
        self.plant > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_offset_in_range() {
        let pos = Position::new(2, 2);
        assert_eq!(pos.offset(-1, -1, 5), Some(Position::new(1, 1)));
        assert_eq!(pos.offset(1, 1, 5), Some(Position::new(3, 3)));
    }

    #[test]
    fn test_position_offset_out_of_range() {
        assert_eq!(Position::new(0, 3).offset(-1, 0, 5), None);
        assert_eq!(Position::new(3, 0).offset(0, -1, 5), None);
        assert_eq!(Position::new(4, 4).offset(1, 0, 5), None);
        assert_eq!(Position::new(4, 4).offset(0, 1, 5), None);
    }

    #[test]
    fn test_position_index_is_row_major() {
        assert_eq!(Position::new(0, 0).index(10), 0);
        assert_eq!(Position::new(0, 9).index(10), 9);
        assert_eq!(Position::new(1, 0).index(10), 10);
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(cell_count(0), Some(0));
        assert_eq!(cell_count(200), Some(40_000));
        assert_eq!(cell_count(1usize << 32), None);
        assert_eq!(cell_count(usize::MAX), None);
    }

    #[test]
    fn test_moore_order() {
        let deltas: Vec<_> = Direction::MOORE.iter().map(|d| d.to_delta()).collect();
        assert_eq!(
            deltas,
            vec![(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn test_cell_state() {
        assert!(!Cell::default().is_alive());
        assert!(!Cell::soil(120.0).has_plant());
        let plant = Cell::new(128.0, 100.0, 10.0);
        assert!(plant.is_alive());
        assert!(plant.has_plant());
    }
}
