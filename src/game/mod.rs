//! Core Connect Four rules: board representation, move legality, win and
//! draw detection. Pure state, no I/O.

mod board;
mod player;

pub use board::{Board, WinLine, COLUMNS, INAROW, ROWS};
pub use player::Player;
