//! End-of-frame ownership decisions between the wire slots.
//!
//! [`decide_switchover`] only inspects the wire set; [`WireSet::apply`]
//! carries the decisions out. Keeping the two apart lets the rules be tested
//! on hand-built wire sets.
//!
//! [`WireSet::apply`]: super::WireSet::apply
use super::set::WireSet;
use super::slot::WireSlot;
use crate::template::ResetCause;
use crate::types::Termination;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchoverAction {
    Reset { slot: WireSlot, cause: ResetCause },
    /// Copy templates, trend and in-frame status of `from` onto the primary.
    Promote { from: WireSlot },
    Terminate(Termination),
}

/// Decide the end-of-frame transitions for `set`.
///
/// 1. Both duplicates in frame: reset the one with the larger loss score
///    (width-small + width-large + missing-streak); a tie drops the air-gap
///    duplicate.
/// 2. Primary out of frame: promote the first remaining duplicate in frame
///    (splice before air-gap) and reset it; with nothing to promote the track
///    terminates, as a width failure when the primary was lost to a width
///    count and as a missing-count failure otherwise.
pub fn decide_switchover(set: &WireSet) -> Vec<SwitchoverAction> {
    let mut actions = Vec::new();
    let mut dropped = None;

    let splice = set.track(WireSlot::Splice);
    let air_gap = set.track(WireSlot::AirGap);
    if splice.in_frame() && air_gap.in_frame() {
        let worse = if splice.counters().loss_score() > air_gap.counters().loss_score() {
            WireSlot::Splice
        } else {
            WireSlot::AirGap
        };
        actions.push(SwitchoverAction::Reset {
            slot: worse,
            cause: ResetCause::Duplicate,
        });
        dropped = Some(worse);
    }

    let primary = set.track(WireSlot::Primary);
    if !primary.in_frame() {
        let promotable = WireSlot::SECONDARY
            .into_iter()
            .find(|&s| Some(s) != dropped && set.track(s).in_frame());
        match promotable {
            Some(from) => {
                actions.push(SwitchoverAction::Promote { from });
                actions.push(SwitchoverAction::Reset {
                    slot: from,
                    cause: ResetCause::Promoted,
                });
            }
            None => {
                let reason = match primary.last_reset() {
                    Some(ResetCause::SmallWidth | ResetCause::LargeWidth) => {
                        Termination::ExceedWidth
                    }
                    _ => Termination::ExceedMissingCount,
                };
                actions.push(SwitchoverAction::Terminate(reason));
            }
        }
    }
    actions
}
