//! Tic-tac-toe rules, turn order and session scores

pub mod board;
pub mod score;
pub mod state;

pub use board::{Board, Cell, Line, Player, CELL_COUNT, WIN_LINES};
pub use score::Scoreboard;
pub use state::{Commit, GameState, GameStatus, MoveRequest};
