//! Constants for board geometry, search parameters, and network defaults.
//!
//! The board is a flat array of 16 cells in row-major order:
//!
//! ```text
//! 00 01 02 03
//! 04 05 06 07
//! 08 09 10 11
//! 12 13 14 15
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board side length.
pub const SIDE: usize = 4;

/// Number of cells on the board.
pub const CELLS: usize = SIDE * SIDE;

/// Number of distinct pieces (one per combination of four binary attributes).
pub const PIECE_COUNT: usize = 16;

/// Number of players in a match.
pub const PLAYERS: usize = 2;

/// Every line that can form a quarto: 4 rows, 4 columns, 2 diagonals.
pub const LINES: [[usize; SIDE]; 10] = [
    // Rows
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    // Columns
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
    // Diagonals
    [0, 5, 10, 15],
    [3, 6, 9, 12],
];

// =============================================================================
// Search Parameters
// =============================================================================

/// Default negamax depth in plies.
pub const DEFAULT_DEPTH: u8 = 3;

/// Base score of a decided game. The remaining depth is added so that
/// quicker wins (and slower losses) are preferred.
pub const WIN_SCORE: i32 = 100;

/// Transposition table entries kept before the table is flushed.
pub const TT_CAPACITY: usize = 1 << 22;

/// A line with this many empty cells left switches the automated player
/// from random play to full search.
pub const DANGER_EMPTY_CELLS: usize = 1;

// =============================================================================
// Network Defaults
// =============================================================================

/// Default host for both server and client.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Consecutive rejected moves after which a side forfeits the match.
pub const MAX_INVALID_MOVES: usize = 3;
