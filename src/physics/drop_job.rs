//! A single falling piece
//!
//! Semi-implicit Euler along the vertical axis: velocity first, then
//! position. Crossing the rest line clamps the piece to it and reflects the
//! velocity scaled by the restitution. When the rebound is slower than the
//! settle speed the piece stops exactly on the rest line.

use crate::config::PhysicsConfig;
use crate::game::{MoveRequest, Player};

/// Outcome of one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Still moving; piece top is at this position
    Falling(f64),
    /// Came to rest on the target this step
    Settled,
}

/// Transient physics state for one move
#[derive(Debug, Clone)]
pub struct DropJob {
    pub index: usize,
    pub player: Player,
    /// Piece top, in board pixels (grows downward)
    pub position: f64,
    /// px/s, positive downward
    pub velocity: f64,
    /// Position the piece comes to rest at
    pub rest: f64,
    /// Clock time (ms) the job was launched
    pub started_at: f64,
    last_time: f64,
    steps: u32,
    settled: bool,
    physics: PhysicsConfig,
}

impl DropJob {
    /// New job for `request`, starting at `start` and resting at `rest`
    pub fn new(
        request: MoveRequest,
        start: f64,
        rest: f64,
        now_ms: f64,
        physics: PhysicsConfig,
    ) -> Self {
        Self {
            index: request.index,
            player: request.player,
            position: start,
            velocity: 0.0,
            rest,
            started_at: now_ms,
            last_time: now_ms,
            steps: 0,
            settled: false,
            physics,
        }
    }

    /// Integrate `dt` seconds, clamped to `[0, max_step]`.
    ///
    /// A settled job stays settled and reports `Settled` again without moving.
    pub fn step(&mut self, dt: f64) -> Step {
        if self.settled {
            return Step::Settled;
        }
        let dt = dt.clamp(0.0, self.physics.max_step);
        self.steps += 1;

        self.velocity += self.physics.gravity * dt;
        self.position += self.velocity * dt;

        if self.position >= self.rest {
            self.position = self.rest;
            self.velocity = -self.velocity * self.physics.restitution;
            if self.velocity.abs() < self.physics.settle_speed {
                self.velocity = 0.0;
                self.settled = true;
                return Step::Settled;
            }
        }
        Step::Falling(self.position)
    }

    /// Step by the wall-clock time elapsed since the previous frame
    pub fn advance_to(&mut self, now_ms: f64) -> Step {
        let dt = (now_ms - self.last_time) / 1000.0;
        self.last_time = now_ms;
        self.step(dt)
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Steps integrated so far
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Upper bound on the steps needed to settle after falling
    /// `drop_height` pixels, when every dt lies in `[min_dt, max_step]`.
    ///
    /// Each impact is at most the previous rebound plus one step of
    /// gravity, and each flight lasts at most one step longer than the
    /// continuous rebound arc.
    pub fn step_bound(physics: &PhysicsConfig, drop_height: f64, min_dt: f64) -> usize {
        let PhysicsConfig {
            gravity: g,
            restitution: r,
            settle_speed,
            max_step,
        } = *physics;
        let kick = g * max_step;
        let impact = (2.0 * g * drop_height.max(0.0)).sqrt() + kick;

        let bounces = ((settle_speed / impact).ln() / r.ln()).ceil().max(1.0) as usize + 1;

        let mut time = (2.0 * drop_height.max(0.0) / g).sqrt() + max_step;
        let mut speed = impact;
        for _ in 0..bounces {
            speed = speed * r + kick;
            time += 2.0 * speed / g + max_step;
        }
        (time / min_dt).ceil() as usize + bounces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn job(start: f64, rest: f64) -> DropJob {
        let request = MoveRequest {
            index: 4,
            player: Player::O,
        };
        DropJob::new(request, start, rest, 0.0, PhysicsConfig::default())
    }

    /// Step until settled, returning the step count
    fn settle(job: &mut DropJob, dts: impl IntoIterator<Item = f64>) -> Option<u32> {
        for dt in dts {
            if job.step(dt) == Step::Settled {
                return Some(job.steps());
            }
        }
        None
    }

    /// Seeded LCG dt stream in `[min, max]`
    fn random_dts(mut seed: u32, min: f64, max: f64) -> impl Iterator<Item = f64> {
        std::iter::repeat_with(move || {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            let t = (seed >> 8) as f64 / (1u32 << 24) as f64;
            min + (max - min) * t
        })
    }

    #[test]
    fn test_first_step_accelerates() {
        let mut j = job(-120.0, 80.0);
        let step = j.step(0.01);
        // v = 3000 * 0.01 = 30, y = -120 + 30 * 0.01
        assert!((j.velocity - 30.0).abs() < 1e-9);
        match step {
            Step::Falling(y) => assert!((y + 119.7).abs() < 1e-9),
            Step::Settled => panic!("settled mid-air"),
        }
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut a = job(-120.0, 80.0);
        let mut b = job(-120.0, 80.0);
        a.step(10.0);
        b.step(0.05);
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);

        let mut c = job(-120.0, 80.0);
        c.step(-1.0);
        assert_eq!(c.position, -120.0);
        assert_eq!(c.velocity, 0.0);
    }

    #[test]
    fn test_bounce_reflects_velocity() {
        let mut j = job(79.0, 80.0);
        j.velocity = 1000.0;
        let step = j.step(0.01);

        assert_eq!(step, Step::Falling(80.0));
        // (1000 + 30) * 0.45, now moving up
        assert!((j.velocity + 463.5).abs() < 1e-9);
    }

    #[test]
    fn test_slow_impact_settles_exactly_at_rest() {
        let mut j = job(79.9, 80.0);
        j.velocity = 50.0;
        assert_eq!(j.step(0.01), Step::Settled);
        assert_eq!(j.position, 80.0);
        assert_eq!(j.velocity, 0.0);
        assert!(j.is_settled());

        // Further steps are inert.
        assert_eq!(j.step(0.05), Step::Settled);
        assert_eq!(j.position, 80.0);
        assert_eq!(j.steps(), 1);
    }

    #[test]
    fn test_never_passes_rest() {
        let mut j = job(-120.0, 80.0);
        for dt in random_dts(3, 0.001, 0.05).take(10_000) {
            match j.step(dt) {
                Step::Falling(y) => assert!(y <= 80.0),
                Step::Settled => break,
            }
        }
        assert!(j.is_settled());
    }

    #[test]
    fn test_deterministic() {
        let dts: Vec<f64> = random_dts(11, 0.004, 0.05).take(5_000).collect();
        let mut a = job(-120.0, 80.0);
        let mut b = job(-120.0, 80.0);

        let first = settle(&mut a, dts.iter().copied());
        let second = settle(&mut b, dts.iter().copied());
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(a.index, b.index);
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn test_fixed_frame_rate_settles_quickly() {
        let mut j = job(-120.0, 80.0);
        let steps = settle(&mut j, std::iter::repeat(FRAME).take(1_000)).unwrap();
        assert!(steps > 10 && steps < 120, "settled after {} steps", steps);
        assert_eq!(j.position, 80.0);
    }

    #[test]
    fn test_settles_within_bound_for_random_dts() {
        let physics = PhysicsConfig::default();
        let min_dt = 0.001;
        for (seed, height) in (0..300u32).zip([10.0, 50.0, 200.0, 400.0, 800.0].iter().cycle()) {
            let bound = DropJob::step_bound(&physics, *height, min_dt);
            let mut j = job(-20.0, height - 20.0);
            let steps = settle(&mut j, random_dts(seed, min_dt, physics.max_step).take(bound));
            assert!(
                steps.is_some(),
                "seed {} height {} did not settle within {} steps",
                seed,
                height,
                bound
            );
        }
    }

    #[test]
    fn test_low_restitution_settles_on_first_impact() {
        let physics = PhysicsConfig {
            restitution: 0.01,
            ..PhysicsConfig::default()
        };
        let request = MoveRequest {
            index: 0,
            player: Player::X,
        };
        let mut j = DropJob::new(request, -120.0, 80.0, 0.0, physics);
        while j.step(FRAME) != Step::Settled {
            assert!(j.velocity >= 0.0, "should not bounce");
        }
    }

    #[test]
    fn test_advance_to_uses_elapsed_time() {
        let request = MoveRequest {
            index: 1,
            player: Player::X,
        };
        let mut j = DropJob::new(request, 0.0, 1000.0, 500.0, PhysicsConfig::default());

        j.advance_to(520.0);
        // 20 ms: v = 60, y = 1.2
        assert!((j.velocity - 60.0).abs() < 1e-9);
        assert!((j.position - 1.2).abs() < 1e-9);

        // A long stall integrates at most max_step.
        let before = j.velocity;
        j.advance_to(5_000.0);
        assert!((j.velocity - before - 150.0).abs() < 1e-9);
        assert_eq!(j.started_at, 500.0);
    }
}
