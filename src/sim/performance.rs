//! Frame timing and spawn admission
//!
//! Tracks how long `Solver::advance` takes against the frame budget, and
//! estimates how many bodies the budget can carry so the driver knows when
//! to stop adding them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames kept in the rolling window (two seconds at 60 fps)
const WINDOW: usize = 120;

/// Frames needed before the monitor judges anything
const MIN_SAMPLES: usize = 10;

/// Share of the frame budget spawning may grow into
const SPAWN_CEILING: f32 = 0.6;

/// Budget share below which each status applies, best first
const STATUS_LADDER: [(f32, PerformanceStatus); 4] = [
    (0.3, PerformanceStatus::Excellent),
    (0.7, PerformanceStatus::Good),
    (0.9, PerformanceStatus::Warning),
    (1.5, PerformanceStatus::Critical),
];

/// Performance status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceStatus {
    /// Well within budget
    Excellent,
    /// Normal operation
    Good,
    /// Degraded, stop adding bodies
    Warning,
    /// Frame budget nearly exhausted
    Critical,
    /// Sustained overload
    Catastrophic,
}

impl PerformanceStatus {
    fn from_budget_share(share: f32) -> Self {
        STATUS_LADDER
            .iter()
            .find(|(limit, _)| share < *limit)
            .map(|&(_, status)| status)
            .unwrap_or(PerformanceStatus::Catastrophic)
    }

    pub fn can_spawn(&self) -> bool {
        matches!(self, PerformanceStatus::Excellent | PerformanceStatus::Good)
    }
}

/// One timed frame
#[derive(Debug, Clone, Copy)]
struct FrameSample {
    duration: Duration,
    bodies: usize,
}

/// Rolling monitor of frame durations and body counts
pub struct PerformanceMonitor {
    samples: VecDeque<FrameSample>,
    /// Frame budget
    budget: Duration,
    status: PerformanceStatus,
    frame_start: Option<Instant>,
}

impl PerformanceMonitor {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW),
            budget: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            status: PerformanceStatus::Excellent,
            frame_start: None,
        }
    }

    /// Start timing a frame
    pub fn frame_start(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// End timing a frame of `body_count` bodies
    pub fn frame_end(&mut self, body_count: usize) {
        if let Some(start) = self.frame_start.take() {
            self.record_frame(start.elapsed(), body_count);
        }
    }

    fn record_frame(&mut self, duration: Duration, bodies: usize) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(FrameSample { duration, bodies });

        if self.samples.len() >= MIN_SAMPLES {
            self.status = PerformanceStatus::from_budget_share(self.budget_share());
        }
    }

    pub fn average_frame_duration(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.samples.iter().map(|s| s.duration).sum();
        sum / self.samples.len() as u32
    }

    /// 95th percentile frame duration
    pub fn p95_frame_duration(&self) -> Duration {
        let mut sorted: Vec<_> = self.samples.iter().map(|s| s.duration).collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted
            .get(idx.min(sorted.len().saturating_sub(1)))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Average frame time as a fraction of the budget
    fn budget_share(&self) -> f32 {
        self.average_frame_duration().as_secs_f32() / self.budget.as_secs_f32()
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    /// Average frame time as a percentage of the budget (0-100+)
    pub fn budget_usage_percent(&self) -> f32 {
        self.budget_share() * 100.0
    }

    pub fn last_body_count(&self) -> usize {
        self.samples.back().map_or(0, |s| s.bodies)
    }

    /// Bodies the frame budget can carry up to the spawn ceiling, assuming
    /// frame cost grows linearly with body count.
    ///
    /// `None` until the window holds enough frames with bodies in them.
    pub fn body_capacity(&self) -> Option<usize> {
        if self.samples.len() < MIN_SAMPLES {
            return None;
        }
        let bodies = self.samples.iter().map(|s| s.bodies).sum::<usize>() as f32
            / self.samples.len() as f32;
        let share = self.budget_share();
        if bodies < 1.0 || share <= 0.0 {
            return None;
        }
        Some((bodies * SPAWN_CEILING / share) as usize)
    }

    /// Whether the driver may add another body
    pub fn can_spawn(&self) -> bool {
        if !self.status.can_spawn() {
            return false;
        }
        match self.body_capacity() {
            Some(capacity) => self.last_body_count() < capacity,
            None => true,
        }
    }

    pub fn status_message(&self) -> String {
        let capacity = match self.body_capacity() {
            Some(capacity) => capacity.to_string(),
            None => "?".to_string(),
        };
        format!(
            "{:?} - {:.1}% budget (p95 {:.2} ms), {}/{} bodies",
            self.status,
            self.budget_usage_percent(),
            self.p95_frame_duration().as_secs_f64() * 1000.0,
            self.last_body_count(),
            capacity
        )
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(60)
    }
}
