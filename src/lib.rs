//! Drop Toe: two-player tic-tac-toe where every mark falls into its cell
//! under gravity and bounces to rest before it counts.
//!
//! The page is expected to provide `#board` (positioned) holding nine
//! `.cell[data-index]` elements, and optionally `#status`, `#scoreX`,
//! `#scoreO`, `#restart` and `#resetScores`.
//!
//! ```js
//! import init, { mount } from "./pkg/drop_toe.js";
//! await init();
//! const game = mount("physics:\n  gravity: 2500\n");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

pub mod clock;
pub mod config;
pub mod game;
pub mod logging;
pub mod physics;
pub mod session;
pub mod surface;
pub mod web;

pub use config::{ConfigError, GameConfig, PhysicsConfig, PieceConfig};
pub use game::{GameState, GameStatus, Player};
pub use physics::{DropAnimator, DropJob};
pub use session::Session;

use clock::PerformanceClock;
use surface::DomSurface;
use web::{FrameLoop, SharedSession};

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Game instance exposed to JavaScript
#[wasm_bindgen]
pub struct TicTacDrop {
    session: SharedSession,
    frames: Rc<FrameLoop>,
    document: Document,
    cells: Vec<HtmlElement>,
}

#[wasm_bindgen]
impl TicTacDrop {
    /// Bind to the current page. `config_yaml` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>) -> Result<TicTacDrop, JsValue> {
        let config =
            GameConfig::from_yaml(config_yaml.as_deref().unwrap_or("")).map_err(js_error)?;
        logging::init(config.level().map_err(js_error)?);

        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let clock = PerformanceClock::from_window(&window).ok_or("No performance timer")?;
        let surface = DomSurface::from_document(&document).map_err(js_error)?;
        let cells = surface.cells().to_vec();

        let session = Rc::new(RefCell::new(Session::new(surface, clock, config)));
        let frames = Rc::new(FrameLoop::new(window, session.clone()));

        tracing::info!("game ready");
        Ok(Self {
            session,
            frames,
            document,
            cells,
        })
    }

    /// Listen for cell clicks and the restart / reset-scores buttons
    #[wasm_bindgen]
    pub fn attach(&self) -> Result<(), JsValue> {
        web::wire_inputs(&self.document, &self.cells, &self.session, &self.frames)
    }

    /// Select a cell as if it were clicked. Returns whether a piece started falling.
    #[wasm_bindgen]
    pub fn select_cell(&self, index: usize) -> bool {
        let started = self.session.borrow_mut().select_cell(index);
        if started {
            self.frames.wake();
        }
        started
    }

    /// Clear the board; whoever was on move stays on move
    #[wasm_bindgen]
    pub fn restart(&self) {
        self.session.borrow_mut().restart();
    }

    /// Zero the scores and clear the board
    #[wasm_bindgen]
    pub fn reset_scores(&self) {
        self.session.borrow_mut().reset_scores();
    }

    #[wasm_bindgen]
    pub fn status_text(&self) -> String {
        self.session.borrow().state().status_message()
    }

    /// `"X"` or `"O"`
    #[wasm_bindgen]
    pub fn current_player(&self) -> String {
        self.session.borrow().state().current_player().to_string()
    }

    #[wasm_bindgen]
    pub fn score_x(&self) -> u32 {
        self.session.borrow().state().scores().x
    }

    #[wasm_bindgen]
    pub fn score_o(&self) -> u32 {
        self.session.borrow().state().scores().o
    }

    /// Check if any piece is falling or still resting on screen
    #[wasm_bindgen]
    pub fn is_animating(&self) -> bool {
        self.session.borrow().is_busy()
    }
}

/// Create the game and wire it to the page in one call
#[wasm_bindgen]
pub fn mount(config_yaml: Option<String>) -> Result<TicTacDrop, JsValue> {
    let game = TicTacDrop::new(config_yaml)?;
    game.attach()?;
    Ok(game)
}
