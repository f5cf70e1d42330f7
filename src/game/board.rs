use serde::{Deserialize, Serialize};

use super::Player;
use crate::error::GameError;

pub const ROWS: usize = 6;
pub const COLUMNS: usize = 7;
pub const INAROW: usize = 4;

/// A winning run of four: the player and the exact cells, as
/// `(row, column)` pairs in line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLine {
    pub player: Player,
    pub cells: [(usize, usize); INAROW],
}

/// The 6×7 grid, stored flat in row-major order
/// (index = row × COLUMNS + column). Row 0 is the top, row 5 the bottom.
///
/// Gravity is not a storage invariant; it is guaranteed at runtime because
/// [`Board::drop_piece`] is the only mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Player>; ROWS * COLUMNS],
}

/// Scan directions for win detection, as (row, column) deltas. The order is
/// part of the winning-cell reporting contract: horizontal, vertical,
/// diagonal down-right, diagonal down-left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [None; ROWS * COLUMNS],
        }
    }

    fn index(row: usize, column: usize) -> usize {
        row * COLUMNS + column
    }

    /// Get the cell at a specific position.
    /// Requires `row < ROWS` and `column < COLUMNS`.
    pub fn get(&self, row: usize, column: usize) -> Option<Player> {
        self.cells[Self::index(row, column)]
    }

    /// True iff the column exists and its topmost cell is empty.
    pub fn is_valid_move(&self, column: usize) -> bool {
        column < COLUMNS && self.cells[column].is_none()
    }

    /// Drop a piece into a column. The piece settles in the lowest empty
    /// cell; returns the row where it landed. This is the only mutator of
    /// board contents.
    pub fn drop_piece(&mut self, column: usize, player: Player) -> Result<usize, GameError> {
        if column >= COLUMNS {
            return Err(GameError::InvalidColumn { column });
        }

        // Find the lowest empty row in this column
        for row in (0..ROWS).rev() {
            let index = Self::index(row, column);
            if self.cells[index].is_none() {
                self.cells[index] = Some(player);
                return Ok(row);
            }
        }

        Err(GameError::ColumnFull { column })
    }

    /// Scan the whole board for a run of four.
    ///
    /// The scan visits rows ascending, columns ascending, and at each
    /// occupied cell tests the four [`DIRECTIONS`] in order; the first
    /// window found is returned with its exact cells. When a constructed
    /// board contains more than one winning line, the reported one is
    /// therefore determined by this ordering.
    pub fn check_win(&self) -> Option<WinLine> {
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let Some(player) = self.get(row, column) else {
                    continue;
                };
                for (dr, dc) in DIRECTIONS {
                    if let Some(cells) = self.window(row, column, dr, dc, player) {
                        return Some(WinLine { player, cells });
                    }
                }
            }
        }
        None
    }

    /// The four cells from (row, column) along (dr, dc), if the window fits
    /// on the board and every cell belongs to `player`.
    fn window(
        &self,
        row: usize,
        column: usize,
        dr: isize,
        dc: isize,
        player: Player,
    ) -> Option<[(usize, usize); INAROW]> {
        let span = INAROW as isize - 1;
        let end_row = row as isize + dr * span;
        let end_col = column as isize + dc * span;
        if end_row < 0 || end_row >= ROWS as isize || end_col < 0 || end_col >= COLUMNS as isize {
            return None;
        }

        let mut cells = [(0, 0); INAROW];
        for (i, cell) in cells.iter_mut().enumerate() {
            let r = (row as isize + dr * i as isize) as usize;
            let c = (column as isize + dc * i as isize) as usize;
            if self.get(r, c) != Some(player) {
                return None;
            }
            *cell = (r, c);
        }
        Some(cells)
    }

    /// True iff every cell of the top row is occupied. This is the draw
    /// condition: a full top row means no column accepts another drop, so
    /// scanning the rest of the board is unnecessary.
    pub fn is_full(&self) -> bool {
        self.cells[..COLUMNS].iter().all(|cell| cell.is_some())
    }

    /// True iff no piece has been placed.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_none())
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Flat row-major snapshot of the board as wire marks
    /// (0 = empty, 1 = Player 1, 2 = Player 2).
    pub fn marks(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|cell| cell.map_or(0, Player::mark))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Board {
    /// Build a board directly from wire marks. Test-only: bypasses the drop
    /// rule, so it can express boards unreachable through play.
    pub(crate) fn from_marks(marks: [u8; ROWS * COLUMNS]) -> Self {
        let mut board = Board::new();
        for (index, &mark) in marks.iter().enumerate() {
            board.cells[index] = Player::from_mark(mark);
        }
        board
    }
}
