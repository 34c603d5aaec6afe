//! Render surface the game core draws on
//!
//! The core reads board and cell geometry and issues drawing commands
//! through these traits; it never depends on a particular rendering
//! technology. [`dom::DomSurface`] is the browser implementation.

pub mod dom;
#[cfg(test)]
pub(crate) mod recording;

use derive_more::{Display, Error};

use crate::config::PieceConfig;
use crate::game::{Player, Scoreboard};

pub use dom::DomSurface;

/// A drawing command the surface could not carry out
#[derive(Debug, Clone, Display, Error)]
#[display("render surface error: {message}")]
pub struct SurfaceError {
    pub message: String,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Axis-aligned rectangle in viewport pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Placement of a falling piece, relative to the board's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceLayout {
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Top at spawn, fully above the board
    pub start_top: f64,
    /// Top once resting, centred in the cell
    pub rest_top: f64,
    pub font_size: f64,
}

impl PieceLayout {
    /// Size and centre a piece inside `cell`
    pub fn compute(board: Rect, cell: Rect, piece: &PieceConfig) -> Self {
        let width = (cell.width * piece.scale).floor();
        let height = (cell.height * piece.scale).floor();
        Self {
            left: cell.left - board.left + (cell.width - width) / 2.0,
            width,
            height,
            start_top: -height - piece.start_gap,
            rest_top: cell.top - board.top + (cell.height - height) / 2.0,
            font_size: (width * piece.font_scale).floor(),
        }
    }

    /// Distance the piece falls before its first bounce
    pub fn drop_height(&self) -> f64 {
        self.rest_top - self.start_top
    }
}

/// Read access to the board's on-screen geometry
pub trait GeometryProvider {
    fn board_rect(&self) -> Rect;

    /// `None` when there is no cell `index`
    fn cell_rect(&self, index: usize) -> Option<Rect>;
}

/// Drawing primitives for pieces, cells and the scoreboard
pub trait RenderSurface: GeometryProvider {
    /// Handle to a drawn piece
    type Piece;

    fn create_piece(
        &mut self,
        player: Player,
        layout: &PieceLayout,
    ) -> Result<Self::Piece, SurfaceError>;

    /// Move a piece so its top sits at `top` board pixels
    fn move_piece(&mut self, piece: &Self::Piece, top: f64) -> Result<(), SurfaceError>;

    fn remove_piece(&mut self, piece: Self::Piece) -> Result<(), SurfaceError>;

    /// Show `mark` in the cell, or clear it
    fn set_cell_mark(&mut self, index: usize, mark: Option<Player>) -> Result<(), SurfaceError>;

    fn set_cell_locked(&mut self, index: usize, locked: bool) -> Result<(), SurfaceError>;

    /// Highlight a cell as part of the winning line
    fn set_cell_highlight(&mut self, index: usize, on: bool) -> Result<(), SurfaceError>;

    fn show_status(&mut self, text: &str) -> Result<(), SurfaceError>;

    fn show_scores(&mut self, scores: &Scoreboard) -> Result<(), SurfaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_centres_piece_in_cell() {
        let board = Rect::new(100.0, 50.0, 300.0, 300.0);
        let cell = Rect::new(200.0, 150.0, 100.0, 100.0);
        let layout = PieceLayout::compute(board, cell, &PieceConfig::default());

        assert_eq!(layout.width, 90.0);
        assert_eq!(layout.height, 90.0);
        assert_eq!(layout.left, 105.0);
        assert_eq!(layout.rest_top, 105.0);
        assert_eq!(layout.start_top, -110.0);
        assert_eq!(layout.font_size, 49.0);
        assert_eq!(layout.drop_height(), 215.0);
    }

    #[test]
    fn test_layout_floors_fractional_sizes() {
        let board = Rect::new(0.0, 0.0, 301.0, 301.0);
        let cell = Rect::new(0.0, 0.0, 101.0, 99.5);
        let layout = PieceLayout::compute(board, cell, &PieceConfig::default());

        assert_eq!(layout.width, 90.0);
        assert_eq!(layout.height, 89.0);
        assert_eq!(layout.left, 5.5);
        assert_eq!(layout.rest_top, 5.25);
    }

    #[test]
    fn test_surface_error_display() {
        let err = SurfaceError::new("no board");
        assert_eq!(err.to_string(), "render surface error: no board");
    }
}
