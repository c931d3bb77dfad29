use std::{collections::VecDeque, time::Instant};

use log::info;

pub struct SimpleMovingAverage {
    window: VecDeque<f32>,
    period: usize,
    sum: f32,
}

impl SimpleMovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period,
            sum: 0.0,
        }
    }

    pub fn add(&mut self, value: f32) -> f32 {
        self.window.push_back(value);
        self.sum += value;

        if self.window.len() > self.period {
            if let Some(removed) = self.window.pop_front() {
                self.sum -= removed;
            }
        }

        self.get()
    }

    pub fn get(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.sum / self.window.len() as f32
    }
}

/// Timing of one benchmark stage
pub struct StageStats {
    title: String,
    runs: u32,
    hits: u32,
    first: Instant,
    sma_run_time: SimpleMovingAverage,
}

impl StageStats {
    pub fn new(title: &str) -> StageStats {
        Self {
            title: title.to_string(),
            runs: 0,
            hits: 0,
            first: Instant::now(),
            sma_run_time: SimpleMovingAverage::new(100),
        }
    }

    /// Times `f`, a `true` result counts as a hit
    pub fn run(&mut self, f: impl FnOnce() -> bool) {
        let start = Instant::now();
        let hit = f();
        self.sma_run_time
            .add(start.elapsed().as_secs_f32() * 1_000_000.0);
        self.runs += 1;
        self.hits += hit as u32;
    }

    pub fn log_stats(&self) {
        let elapsed = self.first.elapsed().as_secs_f32();
        info!(
            "{}: {} runs, {} hits, total {:.3}s, recent avg {:.1} micro-s per run",
            self.title,
            self.runs,
            self.hits,
            elapsed,
            self.sma_run_time.get()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{SimpleMovingAverage, StageStats};

    #[test]
    fn test_moving_average_window() {
        let mut sma = SimpleMovingAverage::new(2);
        assert_eq!(sma.get(), 0.0);
        assert_eq!(sma.add(2.0), 2.0);
        assert_eq!(sma.add(4.0), 3.0);
        // Oldest sample drops out
        assert_eq!(sma.add(8.0), 6.0);
    }

    #[test]
    fn test_stage_counts_hits() {
        let mut stats = StageStats::new("test");
        stats.run(|| true);
        stats.run(|| false);
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.hits, 1);
    }
}
