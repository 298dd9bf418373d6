//! The 3×3 board and win detection.

use tictac_protocol::{Cell, Mark, Outcome};

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// The eight winning lines, checked in this order: rows, columns,
/// then the two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A row-major 3×3 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells.
    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> [Cell; CELLS] {
        self.cells
    }

    /// Returns the cell at `index`, or `None` past the edge.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Writes `mark` at `index`. The caller has already checked that the
    /// index is in range and the cell is empty.
    pub(crate) fn place(&mut self, index: usize, mark: Mark) {
        self.cells[index] = Cell::from(mark);
    }

    pub fn count(&self, mark: Mark) -> usize {
        let cell = Cell::from(mark);
        self.cells.iter().filter(|c| **c == cell).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Evaluates the board.
    ///
    /// A line wins when its three cells hold the same mark. The first
    /// winning line in [`LINES`] order decides. With no winning line and
    /// no empty cell the result is a draw; otherwise `None`.
    pub fn check_winner(&self) -> Option<Outcome> {
        for [a, b, c] in LINES {
            if let Some(mark) = self.cells[a].mark() {
                if self.cells[b] == self.cells[a] && self.cells[c] == self.cells[a] {
                    return Some(Outcome::from(mark));
                }
            }
        }
        if self.is_full() { Some(Outcome::Draw) } else { None }
    }
}
