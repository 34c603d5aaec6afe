//! Browser DOM implementation of the render surface
//!
//! Expects a board element containing nine `.cell` elements carrying
//! `data-index="0".."8"`. Falling pieces are absolutely positioned `div`s
//! appended to the board, so the board should be `position: relative`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use super::{GeometryProvider, PieceLayout, Rect, RenderSurface, SurfaceError};
use crate::game::{Player, Scoreboard, CELL_COUNT};

fn js_error(context: &str, err: JsValue) -> SurfaceError {
    SurfaceError::new(format!("{}: {:?}", context, err))
}

fn rect_of(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.x(), r.y(), r.width(), r.height())
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

/// Board, cells and status/score elements of the game page
pub struct DomSurface {
    document: Document,
    board: HtmlElement,
    cells: Vec<HtmlElement>,
    status: Option<Element>,
    score_x: Option<Element>,
    score_o: Option<Element>,
}

impl DomSurface {
    /// Look up `#board` and its cells, plus the optional `#status`,
    /// `#scoreX` and `#scoreO` elements
    pub fn from_document(document: &Document) -> Result<Self, SurfaceError> {
        let board = document
            .get_element_by_id("board")
            .ok_or_else(|| SurfaceError::new("no #board element"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SurfaceError::new("#board is not an HTML element"))?;

        Self::new(
            document,
            board,
            document.get_element_by_id("status"),
            document.get_element_by_id("scoreX"),
            document.get_element_by_id("scoreO"),
        )
    }

    pub fn new(
        document: &Document,
        board: HtmlElement,
        status: Option<Element>,
        score_x: Option<Element>,
        score_o: Option<Element>,
    ) -> Result<Self, SurfaceError> {
        let cells = Self::collect_cells(&board)?;
        Ok(Self {
            document: document.clone(),
            board,
            cells,
            status,
            score_x,
            score_o,
        })
    }

    /// `.cell` children of `board`, ordered by `data-index`
    fn collect_cells(board: &HtmlElement) -> Result<Vec<HtmlElement>, SurfaceError> {
        let nodes = board
            .query_selector_all(".cell")
            .map_err(|e| js_error("querying cells", e))?;

        let mut slots: Vec<Option<HtmlElement>> = vec![None; CELL_COUNT];
        for i in 0..nodes.length() {
            let Some(cell) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let index = cell
                .dataset()
                .get("index")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(i as usize);
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(cell);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, cell)| cell.ok_or_else(|| SurfaceError::new(format!("missing cell {}", i))))
            .collect()
    }

    /// Cell elements in index order
    pub fn cells(&self) -> &[HtmlElement] {
        &self.cells
    }

    fn cell(&self, index: usize) -> Result<&HtmlElement, SurfaceError> {
        self.cells
            .get(index)
            .ok_or_else(|| SurfaceError::new(format!("no cell {}", index)))
    }
}

impl GeometryProvider for DomSurface {
    fn board_rect(&self) -> Rect {
        rect_of(&self.board)
    }

    fn cell_rect(&self, index: usize) -> Option<Rect> {
        self.cells.get(index).map(|c| rect_of(c))
    }
}

impl RenderSurface for DomSurface {
    type Piece = HtmlElement;

    fn create_piece(
        &mut self,
        player: Player,
        layout: &PieceLayout,
    ) -> Result<HtmlElement, SurfaceError> {
        let piece = self
            .document
            .create_element("div")
            .map_err(|e| js_error("creating piece", e))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SurfaceError::new("piece is not an HTML element"))?;

        piece.set_class_name(&format!("piece {}", player.css_class()));
        piece.set_text_content(Some(&player.to_string()));

        let style = piece.style();
        for (name, value) in [
            ("width", px(layout.width)),
            ("height", px(layout.height)),
            ("left", px(layout.left)),
            ("top", px(layout.start_top)),
            ("font-size", px(layout.font_size)),
        ] {
            style
                .set_property(name, &value)
                .map_err(|e| js_error("styling piece", e))?;
        }

        self.board
            .append_child(&piece)
            .map_err(|e| js_error("attaching piece", e))?;
        Ok(piece)
    }

    fn move_piece(&mut self, piece: &HtmlElement, top: f64) -> Result<(), SurfaceError> {
        piece
            .style()
            .set_property("top", &px(top))
            .map_err(|e| js_error("moving piece", e))
    }

    fn remove_piece(&mut self, piece: HtmlElement) -> Result<(), SurfaceError> {
        piece.remove();
        Ok(())
    }

    fn set_cell_mark(&mut self, index: usize, mark: Option<Player>) -> Result<(), SurfaceError> {
        let cell = self.cell(index)?;
        let classes = cell.class_list();
        classes
            .remove_2("x", "o")
            .map_err(|e| js_error("clearing mark", e))?;
        match mark {
            Some(player) => {
                cell.set_text_content(Some(&player.to_string()));
                classes
                    .add_1(player.css_class())
                    .map_err(|e| js_error("marking cell", e))
            }
            None => {
                cell.set_text_content(Some(""));
                Ok(())
            }
        }
    }

    fn set_cell_locked(&mut self, index: usize, locked: bool) -> Result<(), SurfaceError> {
        self.cell(index)?
            .dataset()
            .set("locked", if locked { "true" } else { "" })
            .map_err(|e| js_error("locking cell", e))
    }

    fn set_cell_highlight(&mut self, index: usize, on: bool) -> Result<(), SurfaceError> {
        self.cell(index)?
            .class_list()
            .toggle_with_force("win", on)
            .map(|_| ())
            .map_err(|e| js_error("highlighting cell", e))
    }

    fn show_status(&mut self, text: &str) -> Result<(), SurfaceError> {
        if let Some(status) = &self.status {
            status.set_text_content(Some(text));
        }
        Ok(())
    }

    fn show_scores(&mut self, scores: &Scoreboard) -> Result<(), SurfaceError> {
        if let Some(el) = &self.score_x {
            el.set_text_content(Some(&scores.x.to_string()));
        }
        if let Some(el) = &self.score_o {
            el.set_text_content(Some(&scores.o.to_string()));
        }
        Ok(())
    }
}
