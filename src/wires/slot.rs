use serde::{Deserialize, Serialize};

/// Position of a wire in the fixed-size wire set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireSlot {
    Primary,
    /// Duplicate close to the primary (splice section).
    Splice,
    /// Duplicate further out (air-gap joint).
    AirGap,
}

impl WireSlot {
    pub const ALL: [WireSlot; 3] = [WireSlot::Primary, WireSlot::Splice, WireSlot::AirGap];
    pub const SECONDARY: [WireSlot; 2] = [WireSlot::Splice, WireSlot::AirGap];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            WireSlot::Primary => 0,
            WireSlot::Splice => 1,
            WireSlot::AirGap => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WireSlot::Primary => "primary",
            WireSlot::Splice => "splice",
            WireSlot::AirGap => "air_gap",
        }
    }
}
