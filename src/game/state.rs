//! Turn-based game state machine
//!
//! `GameState` owns the board, the per-cell locks, whose turn it is, the
//! game status and the session scores. Moves are two-phase: `attempt_move`
//! validates and locks a cell while its piece is falling, `commit_move`
//! writes the mark once the piece has settled.

use tracing::{debug, info};

use super::board::{Board, Cell, Line, Player, CELL_COUNT};
use super::score::Scoreboard;

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won { winner: Player, line: Line },
    Tied,
}

impl GameStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Permission to start dropping a piece into `index` for `player`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub index: usize,
    pub player: Player,
}

/// Result of committing a settled piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Mark written; the game is now in this status
    Applied(GameStatus),
    /// The game finished while this piece was still falling, so it was dropped
    Discarded,
}

#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    locked: [bool; CELL_COUNT],
    current: Player,
    status: GameStatus,
    scores: Scoreboard,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::new(),
            locked: [false; CELL_COUNT],
            current: Player::X,
            status: GameStatus::InProgress,
            scores: Scoreboard::default(),
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a cell selection and lock the cell.
    ///
    /// Returns `None` without touching anything when the game is over, the
    /// index is off the board, the cell is taken, or a piece is already
    /// falling into it.
    pub fn attempt_move(&mut self, index: usize) -> Option<MoveRequest> {
        if self.status.is_finished() {
            return None;
        }
        if !self.board.get(index)?.is_empty() || self.locked[index] {
            return None;
        }

        self.locked[index] = true;
        debug!(index, player = %self.current, "move requested");
        Some(MoveRequest {
            index,
            player: self.current,
        })
    }

    /// Write a settled piece into the board and evaluate the outcome.
    ///
    /// # Panics
    /// If the cell is not empty.
    pub fn commit_move(&mut self, index: usize, player: Player) -> Commit {
        assert!(
            self.board.get(index).is_some_and(Cell::is_empty),
            "commit into non-empty or missing cell {}",
            index
        );
        self.locked[index] = false;

        if self.status.is_finished() {
            debug!(index, %player, "game already over, discarding move");
            return Commit::Discarded;
        }

        self.board.place(index, player);

        self.status = if let Some((winner, line)) = self.board.winning_line() {
            self.scores.record_win(winner);
            info!(%winner, ?line, "game won");
            GameStatus::Won { winner, line }
        } else if self.board.is_full() {
            info!("game tied");
            GameStatus::Tied
        } else {
            self.current = self.current.opponent();
            GameStatus::InProgress
        };

        Commit::Applied(self.status)
    }

    /// Unlock a cell whose drop was abandoned without committing
    pub fn release(&mut self, index: usize) {
        if let Some(lock) = self.locked.get_mut(index) {
            *lock = false;
        }
    }

    /// Clear the board for a new round.
    ///
    /// With `keep_current_player` the player whose turn it was stays on
    /// move; otherwise X starts.
    pub fn reset(&mut self, keep_current_player: bool) {
        self.board.clear();
        self.locked = [false; CELL_COUNT];
        self.status = GameStatus::InProgress;
        if !keep_current_player {
            self.current = Player::X;
        }
        debug!(player = %self.current, "board reset");
    }

    pub fn reset_scores(&mut self) {
        self.scores.clear();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.board.get(index)
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.locked.get(index).copied().unwrap_or(false)
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_finished()
    }

    /// Text for the status line
    pub fn status_message(&self) -> String {
        match self.status {
            GameStatus::InProgress => format!("Player {}'s turn", self.current),
            GameStatus::Won { winner, .. } => format!("Player {} wins!", winner),
            GameStatus::Tied => "It's a tie!".to_string(),
        }
    }
}
