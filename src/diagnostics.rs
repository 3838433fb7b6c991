//! Wall-time trace attached to every track report.
use serde::{Deserialize, Serialize};

/// Time spent on one frame of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTiming {
    pub frame_index: usize,
    /// Columns stepped before the frame completed or terminated.
    pub columns: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub frames: Vec<FrameTiming>,
}

impl TimingBreakdown {
    pub fn record(&mut self, frame_index: usize, columns: usize, elapsed_ms: f64) {
        self.frames.push(FrameTiming {
            frame_index,
            columns,
            elapsed_ms,
        });
    }

    /// Tracking throughput over the recorded frames, `None` before any
    /// measurable time has passed.
    pub fn columns_per_second(&self) -> Option<f64> {
        let columns: usize = self.frames.iter().map(|f| f.columns).sum();
        let ms: f64 = self.frames.iter().map(|f| f.elapsed_ms).sum();
        (ms > 0.0).then(|| columns as f64 * 1000.0 / ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_over_recorded_frames() {
        let mut timing = TimingBreakdown::default();
        assert_eq!(timing.columns_per_second(), None);
        timing.record(0, 300, 100.0);
        timing.record(1, 100, 100.0);
        assert_eq!(timing.columns_per_second(), Some(2000.0));
    }
}
