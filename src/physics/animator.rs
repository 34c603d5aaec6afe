use std::collections::BTreeMap;

use tracing::debug;

use super::drop_job::{DropJob, Step};
use crate::game::Player;

/// A job that came to rest this frame, handed back for finalizing
#[derive(Debug)]
pub struct Settled<P> {
    pub index: usize,
    pub player: Player,
    /// Resting position of the piece top
    pub rest: f64,
    pub piece: Option<P>,
}

struct InFlight<P> {
    job: DropJob,
    piece: Option<P>,
}

/// Every piece currently falling, keyed by target cell.
///
/// `P` is the render surface's handle for the visual piece. A drop whose
/// piece could not be drawn still runs with `None` so the move commits.
pub struct DropAnimator<P> {
    jobs: BTreeMap<usize, InFlight<P>>,
}

impl<P> Default for DropAnimator<P> {
    fn default() -> Self {
        Self {
            jobs: BTreeMap::new(),
        }
    }
}

impl<P> DropAnimator<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `job`.
    ///
    /// # Panics
    /// If a drop into the same cell is already in flight.
    pub fn launch(&mut self, job: DropJob, piece: Option<P>) {
        let index = job.index;
        assert!(
            !self.jobs.contains_key(&index),
            "cell {} already has a drop in flight",
            index
        );
        debug!(index, player = %job.player, start = job.position, rest = job.rest, "drop launched");
        self.jobs.insert(index, InFlight { job, piece });
    }

    /// Advance every drop to `now_ms`.
    ///
    /// `on_move` receives each still-falling piece with its new top. Drops
    /// that settle are removed and returned, each exactly once, in cell order.
    pub fn advance<F>(&mut self, now_ms: f64, mut on_move: F) -> Vec<Settled<P>>
    where
        F: FnMut(&P, f64),
    {
        let mut done = Vec::new();
        for (&index, flight) in self.jobs.iter_mut() {
            match flight.job.advance_to(now_ms) {
                Step::Falling(top) => {
                    if let Some(piece) = &flight.piece {
                        on_move(piece, top);
                    }
                }
                Step::Settled => done.push(index),
            }
        }

        done.into_iter()
            .filter_map(|index| self.jobs.remove(&index))
            .map(|InFlight { job, piece }| {
                debug!(index = job.index, steps = job.steps(), "drop settled");
                Settled {
                    index: job.index,
                    player: job.player,
                    rest: job.rest,
                    piece,
                }
            })
            .collect()
    }

    /// Drop every in-flight job without settling it.
    ///
    /// Returns `(cell index, piece)` pairs so the caller can clean up.
    pub fn abort_all(&mut self) -> Vec<(usize, Option<P>)> {
        if !self.jobs.is_empty() {
            debug!(count = self.jobs.len(), "aborting drops");
        }
        std::mem::take(&mut self.jobs)
            .into_iter()
            .map(|(index, flight)| (index, flight.piece))
            .collect()
    }

    pub fn is_in_flight(&self, index: usize) -> bool {
        self.jobs.contains_key(&index)
    }

    /// Cells with a drop in flight, ascending
    pub fn in_flight(&self) -> impl Iterator<Item = usize> + '_ {
        self.jobs.keys().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Physics state of the drop into `index`, if any
    pub fn job(&self, index: usize) -> Option<&DropJob> {
        self.jobs.get(&index).map(|f| &f.job)
    }
}
