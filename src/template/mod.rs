//! Template similarity tracker.
//!
//! Each edge keeps a rolling mean of the intensity profiles accepted at that
//! edge. Per column the profile closest to the template (SAD) within a small
//! window is taken, unless the match skips, differs too much or the column is
//! flat, in which case the recent trend is used instead. Counters of those
//! error categories decide when a wire is considered lost.
pub mod edge_template;
pub mod errors;
pub mod params;
pub mod tracker;

pub use edge_template::{best_match, search_offsets, EdgeTemplate, TemplateMatch};
pub use errors::{ColumnFlags, EdgeCounter, EdgeFlags, ErrorCounters, ResetCause};
pub use params::TemplateParams;
pub use tracker::{edge_profile, trend, TemplateTrack, WindowOutOfFrame};
