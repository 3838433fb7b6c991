//! Primary and duplicate wires of the template tracker.
//!
//! A splice section or an air-gap joint briefly shows two contact wires side
//! by side. The wire set keeps the primary plus one slot per duplicate kind;
//! [`detector`] finds duplicates, [`arbiter`] decides resets and promotions at
//! frame end, and [`TemplateTracker`] drives the set column by column.
pub mod arbiter;
pub mod detector;
pub mod set;
pub mod slot;
pub mod tracker;

pub use arbiter::{decide_switchover, SwitchoverAction};
pub use detector::{detect_pair, Detection};
pub use set::WireSet;
pub use slot::WireSlot;
pub use tracker::TemplateTracker;
