//! Column measurement extraction.
//!
//! Both trackers look at one 1-pixel-wide vertical slice per column:
//!
//! - [`column::ColumnExtractor`] bounds a search box by the previous watershed
//!   and the previous edge row, picks the row of the strongest gradient and
//!   applies the validity policy (position deviation, sharpness, brightness
//!   jump) after a short warm-up.
//! - [`locate`] finds the first seed from a rough strip centre.
//! - [`stats`] holds the brightness statistics, SAD and gradient helpers
//!   shared with the template tracker.
pub mod column;
pub mod locate;
pub mod stats;

pub use column::{
    search_box, strongest_transition, BrightnessMemory, ColumnExtractor, EdgeCandidate,
    EdgeReading, OutOfSight, SearchBox, WARM_UP_OBSERVATIONS,
};
pub use locate::locate_edges;
pub use stats::{brightness_stats, column_profile, interior_gradient, mean_std, sad};
