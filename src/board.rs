use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CELLS, DANGER_EMPTY_CELLS, LINES, SIDE};
use crate::piece::{Piece, share_attribute};

/// A cell index on the board, `0..16` in row-major order.
pub type Cell = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Piece>; CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece at `cell`, or `None` if the cell is empty or off the board.
    pub fn get(&self, cell: Cell) -> Option<Piece> {
        self.cells.get(cell).copied().flatten()
    }

    /// True if `cell` is on the board and empty.
    pub fn is_free(&self, cell: Cell) -> bool {
        matches!(self.cells.get(cell), Some(None))
    }

    pub fn cells(&self) -> &[Option<Piece>; CELLS] {
        &self.cells
    }

    pub(crate) fn set(&mut self, cell: Cell, piece: Piece) {
        self.cells[cell] = Some(piece);
    }

    /// Copy of this board with `piece` placed at `cell`.
    pub fn with_piece(&self, cell: Cell, piece: Piece) -> Board {
        let mut board = *self;
        board.set(cell, piece);
        board
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().flatten().copied()
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
    }

    pub fn occupied(&self) -> usize {
        self.pieces().count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    fn line(&self, line: &[Cell; SIDE]) -> Option<[Piece; SIDE]> {
        let [a, b, c, d] = *line;
        Some([self.cells[a]?, self.cells[b]?, self.cells[c]?, self.cells[d]?])
    }

    /// Does any row, column or diagonal currently form a quarto line?
    pub fn has_quarto(&self) -> bool {
        LINES
            .iter()
            .any(|line| self.line(line).is_some_and(share_attribute))
    }

    /// Number of empty cells on each line, in `LINES` order.
    pub fn line_vacancies(&self) -> [usize; LINES.len()] {
        LINES.map(|line| line.iter().filter(|&&c| self.cells[c].is_none()).count())
    }

    /// True once some line is one placement away from being complete.
    pub fn in_danger(&self) -> bool {
        self.line_vacancies().contains(&DANGER_EMPTY_CELLS)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(SIDE) {
            write!(f, "|")?;
            for cell in row {
                match cell {
                    Some(piece) => write!(f, "{piece}|")?,
                    None => write!(f, "      |")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
