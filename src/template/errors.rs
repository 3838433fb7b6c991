//! Categorised error bookkeeping of the template tracker.
//!
//! Flags describe the column just processed and are cleared at the start of
//! every column. Counters accumulate over a wire's lifetime and are only
//! zeroed by a wire reset.
use super::params::TemplateParams;
use crate::types::{EdgeErrorLog, EdgeId};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeFlags {
    pub skip: bool,
    pub diff: bool,
    pub no_edge: bool,
}

impl EdgeFlags {
    /// The raw match was rejected and the trend fallback used.
    pub fn rejected(&self) -> bool {
        self.skip || self.diff || self.no_edge
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFlags {
    pub edges: [EdgeFlags; 2],
    pub width_small: bool,
    pub width_large: bool,
    /// Both edges flat: the column carries no position.
    pub missing: bool,
}

impl ColumnFlags {
    pub fn edge(&self, edge: EdgeId) -> &EdgeFlags {
        &self.edges[edge.index()]
    }

    /// Per-edge error log of this column; width flags are shared.
    pub fn error_log(&self) -> [EdgeErrorLog; 2] {
        self.edges.map(|f| EdgeErrorLog {
            skip: f.skip,
            diff: f.diff,
            no_edge: f.no_edge,
            width_small: self.width_small,
            width_large: self.width_large,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeCounter {
    pub skip: u32,
    pub diff: u32,
    pub no_edge: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCounters {
    pub edges: [EdgeCounter; 2],
    pub width_small: u32,
    pub width_large: u32,
    pub missing_streak: u32,
}

impl ErrorCounters {
    pub fn record(&mut self, flags: &ColumnFlags) {
        for (counter, f) in self.edges.iter_mut().zip(flags.edges.iter()) {
            counter.skip += u32::from(f.skip);
            counter.diff += u32::from(f.diff);
            counter.no_edge += u32::from(f.no_edge);
        }
        self.width_small += u32::from(flags.width_small);
        self.width_large += u32::from(flags.width_large);
        self.missing_streak += u32::from(flags.missing);
    }

    pub fn edge(&self, edge: EdgeId) -> &EdgeCounter {
        &self.edges[edge.index()]
    }

    /// Combined count compared between duplicate wires.
    pub fn loss_score(&self) -> u32 {
        self.width_small + self.width_large + self.missing_streak
    }

    /// Wire-loss condition reached by these counters, if any.
    pub fn loss_cause(&self, params: &TemplateParams) -> Option<ResetCause> {
        if self.missing_streak >= params.missing_streak_reset {
            Some(ResetCause::MissingStreak)
        } else if self.width_small > params.small_width_reset {
            Some(ResetCause::SmallWidth)
        } else if self.width_large > params.large_width_reset {
            Some(ResetCause::LargeWidth)
        } else {
            None
        }
    }
}

/// Why a wire slot was cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetCause {
    SmallWidth,
    LargeWidth,
    MissingStreak,
    /// Search window left the frame (secondary wires only).
    OutOfFrame,
    /// Worse of two simultaneous duplicates.
    Duplicate,
    /// State handed over to the primary slot.
    Promoted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_flags() {
        let mut c = ErrorCounters::default();
        let mut flags = ColumnFlags::default();
        flags.edges[0].skip = true;
        flags.width_large = true;
        c.record(&flags);
        c.record(&flags);
        assert_eq!(c.edge(EdgeId::Upper).skip, 2);
        assert_eq!(c.edge(EdgeId::Lower).skip, 0);
        assert_eq!(c.loss_score(), 2);
    }

    #[test]
    fn error_log_shares_width_flags() {
        let mut flags = ColumnFlags::default();
        flags.edges[1].no_edge = true;
        flags.width_small = true;
        let log = flags.error_log();
        assert!(!log[0].no_edge && log[1].no_edge);
        assert!(log[0].width_small && log[1].width_small);
        assert!(!log[0].width_large);
    }

    #[test]
    fn loss_cause_thresholds() {
        let params = TemplateParams::default();
        let mut c = ErrorCounters {
            width_small: 150,
            ..Default::default()
        };
        assert_eq!(c.loss_cause(&params), None);
        c.width_small = 151;
        assert_eq!(c.loss_cause(&params), Some(ResetCause::SmallWidth));
        c.missing_streak = 100;
        assert_eq!(c.loss_cause(&params), Some(ResetCause::MissingStreak));
    }
}
