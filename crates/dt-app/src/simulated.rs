use std::time::Duration;
use rand::Rng;

pub const STAGE_LABELS: [&str; 5] = [
    "Analyzing video content...",
    "Processing facial features...",
    "Training voice model...",
    "Generating avatar...",
    "Finalizing digital twin...",
];

/// One update of the simulated progress bar
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTick {
    pub percent: f32,
    pub label: &'static str,
    /// Pause before the next tick
    pub delay: Duration,
}

/// Canned progress that fills a bar through the stage labels at a random pace
pub struct SimulatedProgress<R> {
    rng: R,
    stage: usize,
    inner: f32,
    finished: bool,
}

impl<R: Rng> SimulatedProgress<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            stage: 0,
            inner: 0.0,
            finished: false,
        }
    }
}

impl<R: Rng> Iterator for SimulatedProgress<R> {
    type Item = ProgressTick;

    fn next(&mut self) -> Option<ProgressTick> {
        if self.finished {
            return None;
        }

        if self.stage >= STAGE_LABELS.len() {
            self.finished = true;
            return Some(ProgressTick {
                percent: 100.0,
                label: STAGE_LABELS[STAGE_LABELS.len() - 1],
                delay: Duration::ZERO,
            });
        }

        let share = 100.0 / STAGE_LABELS.len() as f32;
        let tick = ProgressTick {
            percent: (self.stage as f32 * share + self.inner * share / 100.0).min(100.0),
            label: STAGE_LABELS[self.stage],
            delay: Duration::from_millis(self.rng.gen_range(50..150)),
        };

        self.inner += self.rng.gen_range(1.0..6.0);
        if self.inner > 100.0 {
            self.stage += 1;
            self.inner = 0.0;
        }

        Some(tick)
    }
}
