//! In-memory surface for exercising the session without a browser

use std::collections::BTreeMap;

use super::{GeometryProvider, PieceLayout, Rect, RenderSurface, SurfaceError};
use crate::game::{Player, Scoreboard, CELL_COUNT};

/// 3x3 grid of 100px cells with the board at (10, 20); records what is drawn
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub marks: [Option<Player>; CELL_COUNT],
    pub locked: [bool; CELL_COUNT],
    pub highlighted: [bool; CELL_COUNT],
    /// Live pieces by id, with their last drawn top
    pub pieces: BTreeMap<u32, (Player, f64)>,
    pub removed: Vec<u32>,
    pub status: String,
    pub scores: Scoreboard,
    /// Make `create_piece` fail
    pub fail_pieces: bool,
    next_id: u32,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeometryProvider for RecordingSurface {
    fn board_rect(&self) -> Rect {
        Rect::new(10.0, 20.0, 300.0, 300.0)
    }

    fn cell_rect(&self, index: usize) -> Option<Rect> {
        (index < CELL_COUNT).then(|| {
            let (row, col) = (index / 3, index % 3);
            Rect::new(10.0 + col as f64 * 100.0, 20.0 + row as f64 * 100.0, 100.0, 100.0)
        })
    }
}

impl RenderSurface for RecordingSurface {
    type Piece = u32;

    fn create_piece(&mut self, player: Player, layout: &PieceLayout) -> Result<u32, SurfaceError> {
        if self.fail_pieces {
            return Err(SurfaceError::new("piece creation disabled"));
        }
        self.next_id += 1;
        self.pieces.insert(self.next_id, (player, layout.start_top));
        Ok(self.next_id)
    }

    fn move_piece(&mut self, piece: &u32, top: f64) -> Result<(), SurfaceError> {
        let entry = self
            .pieces
            .get_mut(piece)
            .ok_or_else(|| SurfaceError::new(format!("piece {} is gone", piece)))?;
        entry.1 = top;
        Ok(())
    }

    fn remove_piece(&mut self, piece: u32) -> Result<(), SurfaceError> {
        self.pieces
            .remove(&piece)
            .ok_or_else(|| SurfaceError::new(format!("piece {} removed twice", piece)))?;
        self.removed.push(piece);
        Ok(())
    }

    fn set_cell_mark(&mut self, index: usize, mark: Option<Player>) -> Result<(), SurfaceError> {
        self.marks[index] = mark;
        Ok(())
    }

    fn set_cell_locked(&mut self, index: usize, locked: bool) -> Result<(), SurfaceError> {
        self.locked[index] = locked;
        Ok(())
    }

    fn set_cell_highlight(&mut self, index: usize, on: bool) -> Result<(), SurfaceError> {
        self.highlighted[index] = on;
        Ok(())
    }

    fn show_status(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.status = text.to_string();
        Ok(())
    }

    fn show_scores(&mut self, scores: &Scoreboard) -> Result<(), SurfaceError> {
        self.scores = *scores;
        Ok(())
    }
}
