use super::arbiter::SwitchoverAction;
use super::slot::WireSlot;
use crate::template::{ResetCause, TemplateParams, TemplateTrack};
use crate::types::Termination;
use log::{debug, warn};

/// Primary wire plus the two duplicate slots.
#[derive(Clone, Debug)]
pub struct WireSet {
    tracks: [TemplateTrack; 3],
}

impl WireSet {
    /// Primary at the seed rows, duplicates inactive.
    pub fn new(upper: f64, lower: f64, params: &TemplateParams) -> Self {
        Self {
            tracks: [
                TemplateTrack::start(upper, lower, params),
                TemplateTrack::inactive(params),
                TemplateTrack::inactive(params),
            ],
        }
    }

    pub fn track(&self, slot: WireSlot) -> &TemplateTrack {
        &self.tracks[slot.index()]
    }

    pub fn track_mut(&mut self, slot: WireSlot) -> &mut TemplateTrack {
        &mut self.tracks[slot.index()]
    }

    /// Edge rows of the in-frame duplicates other than `slot`.
    pub fn occupied_rows(&self, slot: WireSlot) -> Vec<[f64; 2]> {
        WireSlot::SECONDARY
            .into_iter()
            .filter(|&s| s != slot && self.track(s).in_frame())
            .map(|s| self.track(s).positions())
            .collect()
    }

    /// Reset every in-frame wire whose counters reached a loss condition.
    pub fn reset_lost(
        &mut self,
        column: usize,
        params: &TemplateParams,
    ) -> Vec<(WireSlot, ResetCause)> {
        let mut out = Vec::new();
        for slot in WireSlot::ALL {
            let track = self.track_mut(slot);
            if let Some(cause) = track.loss_cause(params) {
                warn!(
                    "WireSet::reset_lost column={} {} wire lost ({:?})",
                    column,
                    slot.label(),
                    cause
                );
                track.reset(cause);
                out.push((slot, cause));
            }
        }
        out
    }

    /// Execute switchover actions in order. Returns the termination the
    /// actions asked for, or `Termination::None`.
    pub fn apply(&mut self, actions: &[SwitchoverAction]) -> Termination {
        let mut termination = Termination::None;
        for action in actions {
            debug!("WireSet::apply {:?}", action);
            match *action {
                SwitchoverAction::Reset { slot, cause } => self.track_mut(slot).reset(cause),
                SwitchoverAction::Promote { from } => {
                    let [primary, rest @ ..] = &mut self.tracks;
                    if let Some(source) = from.index().checked_sub(1).and_then(|i| rest.get(i)) {
                        primary.adopt(source);
                    }
                }
                SwitchoverAction::Terminate(t) => termination = t,
            }
        }
        termination
    }
}
