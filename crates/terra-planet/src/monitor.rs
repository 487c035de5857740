use std::collections::VecDeque;

use terra_ui::pane::GraphSnapshot;

/// Rolling window of frame times.
#[derive(Debug, Clone)]
pub struct FrameMonitor {
    capacity: usize,
    frames:   VecDeque<f32>,
    /// FPS that maps to a full-height bar.
    ceiling:  f32,
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new(120, 120.0)
    }
}

impl FrameMonitor {
    pub fn new(capacity: usize, ceiling: f32) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, frames: VecDeque::with_capacity(capacity), ceiling: ceiling.max(1.0) }
    }

    pub fn record(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(dt);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames per second over the window; zero before the first frame.
    pub fn fps(&self) -> f32 {
        let total: f32 = self.frames.iter().sum();
        if total > 0.0 { self.frames.len() as f32 / total } else { 0.0 }
    }

    /// Instantaneous FPS per frame as a share of the ceiling, oldest first.
    pub fn samples(&self) -> Vec<f32> {
        self.frames.iter().map(|dt| (1.0 / dt / self.ceiling).min(1.0)).collect()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot { samples: self.samples(), caption: format!("{:.0} fps", self.fps()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_is_mean_over_window() {
        let mut m = FrameMonitor::new(4, 120.0);
        assert_eq!(m.fps(), 0.0);
        for dt in [0.01, 0.02, 0.01, 0.02] {
            m.record(dt);
        }
        assert!((m.fps() - 4.0 / 0.06).abs() < 1e-3);
    }

    #[test]
    fn window_drops_oldest() {
        let mut m = FrameMonitor::new(2, 4.0);
        m.record(1.0);
        m.record(0.5);
        m.record(0.25);
        assert_eq!(m.len(), 2);
        assert_eq!(m.samples(), vec![0.5, 1.0]);
    }

    #[test]
    fn ignores_degenerate_frames() {
        let mut m = FrameMonitor::default();
        m.record(0.0);
        m.record(f32::NAN);
        m.record(-1.0);
        assert!(m.is_empty());
    }

    #[test]
    fn snapshot_captions_fps() {
        let mut m = FrameMonitor::new(8, 60.0);
        m.record(0.02);
        let snap = m.snapshot();
        assert_eq!(snap.caption, "50 fps");
        assert_eq!(snap.samples.len(), 1);
    }
}
