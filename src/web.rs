//! Browser event loop glue
//!
//! One shared session sits behind `Rc<RefCell<_>>`. Click listeners and the
//! animation-frame callback borrow it synchronously, so every mutation runs
//! to completion on the single browser thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, HtmlElement, Window};

use crate::clock::PerformanceClock;
use crate::session::Session;
use crate::surface::DomSurface;

pub type BrowserSession = Session<DomSurface, PerformanceClock>;
pub type SharedSession = Rc<RefCell<BrowserSession>>;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
/// Id of the animation frame currently requested, if any
type PendingFrame = Rc<Cell<Option<i32>>>;

fn request_frame(window: &Window, callback: &FrameCallback, pending: &PendingFrame) {
    let slot = callback.borrow();
    let Some(closure) = slot.as_ref() else {
        return;
    };
    match window.request_animation_frame(closure.as_ref().unchecked_ref::<js_sys::Function>()) {
        Ok(id) => pending.set(Some(id)),
        Err(err) => warn!(?err, "requestAnimationFrame failed"),
    }
}

/// Animation-frame loop that runs only while the session is busy
pub struct FrameLoop {
    window: Window,
    callback: FrameCallback,
    pending: PendingFrame,
}

impl FrameLoop {
    pub fn new(window: Window, session: SharedSession) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let pending: PendingFrame = Rc::new(Cell::new(None));

        let next = callback.clone();
        let frame_window = window.clone();
        let frame_pending = pending.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            frame_pending.set(None);
            if session.borrow_mut().frame(now) {
                request_frame(&frame_window, &next, &frame_pending);
            }
        }) as Box<dyn FnMut(f64)>));

        Self {
            window,
            callback,
            pending,
        }
    }

    /// Make sure a frame is scheduled
    pub fn wake(&self) {
        if self.pending.get().is_none() {
            request_frame(&self.window, &self.callback, &self.pending);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        // The callback closure is freed with us; a frame still queued would call into it.
        if let Some(id) = self.pending.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                warn!(?err, "cancelAnimationFrame failed");
            }
        }
    }
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

/// Wire cell clicks and the `#restart` / `#resetScores` buttons
pub fn wire_inputs(
    document: &Document,
    cells: &[HtmlElement],
    session: &SharedSession,
    frames: &Rc<FrameLoop>,
) -> Result<(), JsValue> {
    for (index, cell) in cells.iter().enumerate() {
        let session = session.clone();
        let frames = frames.clone();
        listen(cell, "click", move |_| {
            if session.borrow_mut().select_cell(index) {
                frames.wake();
            }
        })?;
    }

    if let Some(button) = document.get_element_by_id("restart") {
        let session = session.clone();
        listen(&button, "click", move |_| session.borrow_mut().restart())?;
    }

    if let Some(button) = document.get_element_by_id("resetScores") {
        let session = session.clone();
        listen(&button, "click", move |_| session.borrow_mut().reset_scores())?;
    }

    Ok(())
}
