//! Falling-piece simulation
//!
//! A `DropJob` integrates one piece under gravity with a damped bounce on
//! its target cell. The `DropAnimator` owns every job in flight and steps
//! them from frame timestamps.

mod animator;
mod drop_job;

pub use animator::{DropAnimator, Settled};
pub use drop_job::{DropJob, Step};
