//! Game session: input events in, drawing commands out
//!
//! The session is the only place the game state, the drop animator and the
//! render surface meet. A cell selection locks the cell and launches a drop;
//! every frame advances the drops; a settled drop commits its move, leaves
//! its piece resting briefly, then the piece is removed.

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::game::{Commit, GameState, GameStatus, CELL_COUNT};
use crate::physics::{DropAnimator, DropJob, Settled};
use crate::surface::{PieceLayout, RenderSurface, SurfaceError};

/// Drawing failures are cosmetic; the game carries on
fn report(result: Result<(), SurfaceError>) {
    if let Err(err) = result {
        warn!(%err, "render surface command failed");
    }
}

pub struct Session<S: RenderSurface, C: Clock> {
    state: GameState,
    animator: DropAnimator<S::Piece>,
    /// Settled pieces waiting for removal, with their expiry time
    lingering: Vec<(f64, S::Piece)>,
    surface: S,
    clock: C,
    config: GameConfig,
}

impl<S: RenderSurface, C: Clock> Session<S, C> {
    /// New session with an empty board; paints the initial status and scores
    pub fn new(surface: S, clock: C, config: GameConfig) -> Self {
        let mut session = Self {
            state: GameState::new(),
            animator: DropAnimator::new(),
            lingering: Vec::new(),
            surface,
            clock,
            config,
        };
        session.paint_status();
        session
    }

    /// Handle a click on cell `index`. Returns whether a drop started.
    pub fn select_cell(&mut self, index: usize) -> bool {
        let Some(request) = self.state.attempt_move(index) else {
            return false;
        };
        let Some(cell) = self.surface.cell_rect(index) else {
            warn!(index, "no geometry for cell");
            self.state.release(index);
            return false;
        };

        let layout = PieceLayout::compute(self.surface.board_rect(), cell, &self.config.piece);
        let piece = match self.surface.create_piece(request.player, &layout) {
            Ok(piece) => Some(piece),
            Err(err) => {
                warn!(%err, index, "drawing piece failed, dropping without it");
                None
            }
        };
        report(self.surface.set_cell_locked(index, true));

        let job = DropJob::new(
            request,
            layout.start_top,
            layout.rest_top,
            self.clock.now_ms(),
            self.config.physics,
        );
        self.animator.launch(job, piece);
        true
    }

    /// Advance to animation-frame time `now_ms`.
    ///
    /// Returns whether another frame is needed.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.expire_lingering(now_ms);

        let surface = &mut self.surface;
        let settled = self
            .animator
            .advance(now_ms, |piece, top| report(surface.move_piece(piece, top)));

        if !settled.is_empty() {
            for drop in settled {
                self.finalize(drop, now_ms);
            }
            self.paint_status();
        }

        self.is_busy()
    }

    /// Start a new round, keeping whoever is on move
    pub fn restart(&mut self) {
        self.reset_board(true);
    }

    /// Clear the board, abandoning any drops still in flight
    pub fn reset_board(&mut self, keep_current_player: bool) {
        for (index, piece) in self.animator.abort_all() {
            self.state.release(index);
            if let Some(piece) = piece {
                report(self.surface.remove_piece(piece));
            }
        }
        for (_, piece) in std::mem::take(&mut self.lingering) {
            report(self.surface.remove_piece(piece));
        }

        self.state.reset(keep_current_player);
        for index in 0..CELL_COUNT {
            report(self.surface.set_cell_mark(index, None));
            report(self.surface.set_cell_locked(index, false));
            report(self.surface.set_cell_highlight(index, false));
        }
        self.paint_status();
    }

    /// Zero both scores and start a new round
    pub fn reset_scores(&mut self) {
        self.state.reset_scores();
        self.restart();
    }

    /// Drops in flight or pieces still lingering
    pub fn is_busy(&self) -> bool {
        !self.animator.is_idle() || !self.lingering.is_empty()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn animator(&self) -> &DropAnimator<S::Piece> {
        &self.animator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn finalize(&mut self, drop: Settled<S::Piece>, now_ms: f64) {
        let Settled {
            index,
            player,
            rest,
            piece,
        } = drop;

        let commit = self.state.commit_move(index, player);
        report(self.surface.set_cell_locked(index, false));
        match commit {
            Commit::Applied(_) => report(self.surface.set_cell_mark(index, Some(player))),
            Commit::Discarded => debug!(index, "settled after game end"),
        }

        if let Some(piece) = piece {
            report(self.surface.move_piece(&piece, rest));
            if self.config.piece.linger_ms > 0.0 {
                self.lingering.push((now_ms + self.config.piece.linger_ms, piece));
            } else {
                report(self.surface.remove_piece(piece));
            }
        }
    }

    fn expire_lingering(&mut self, now_ms: f64) {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.lingering)
            .into_iter()
            .partition(|(expires, _)| *expires <= now_ms);
        self.lingering = kept;
        for (_, piece) in expired {
            report(self.surface.remove_piece(piece));
        }
    }

    fn paint_status(&mut self) {
        if let GameStatus::Won { line, .. } = self.state.status() {
            for index in line {
                report(self.surface.set_cell_highlight(index, true));
            }
        }
        let message = self.state.status_message();
        report(self.surface.show_status(&message));
        report(self.surface.show_scores(&self.state.scores()));
    }
}
