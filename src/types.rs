use serde::{Deserialize, Serialize};

/// Which boundary of the contact strip a measurement refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeId {
    Upper,
    Lower,
}

impl EdgeId {
    pub const BOTH: [EdgeId; 2] = [EdgeId::Upper, EdgeId::Lower];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            EdgeId::Upper => 0,
            EdgeId::Lower => 1,
        }
    }
}

/// Starting point of a track: wire identity, first column and the two edge
/// rows at that column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub wire_id: String,
    pub x: usize,
    pub y_upper: f64,
    pub y_lower: f64,
}

impl Seed {
    pub fn new(wire_id: impl Into<String>, x: usize, y_upper: f64, y_lower: f64) -> Self {
        Self {
            wire_id: wire_id.into(),
            x,
            y_upper,
            y_lower,
        }
    }

    /// Seed for the next frame: same wire, column reset to 0.
    pub fn continuation(&self, y_upper: f64, y_lower: f64) -> Self {
        Self {
            wire_id: self.wire_id.clone(),
            x: 0,
            y_upper,
            y_lower,
        }
    }

    pub fn watershed(&self) -> f64 {
        0.5 * (self.y_upper + self.y_lower)
    }
}

/// Why a track stopped before the requested frames were processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    #[default]
    None,
    ExceedMissingCount,
    ExceedWidth,
    OutOfSight,
}

impl Termination {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Termination::None)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Termination::None => "tracking completed",
            Termination::ExceedMissingCount => "exceeded missing-count limit",
            Termination::ExceedWidth => "exceeded width limit",
            Termination::OutOfSight => "gone out of sight",
        }
    }
}

/// Brightness of the strip at one column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrightnessStats {
    pub center: f64,
    pub mean: f64,
    pub std: f64,
}

impl BrightnessStats {
    pub const MISSING: BrightnessStats = BrightnessStats {
        center: f64::NAN,
        mean: f64::NAN,
        std: f64::NAN,
    };
}

/// Diagonal of the filter covariance after the column update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVariances {
    pub upper: f64,
    pub lower: f64,
    pub slope: f64,
}

/// Error log of one edge at one column: the three match checks plus the
/// two width checks shared by both edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeErrorLog {
    pub skip: bool,
    pub diff: bool,
    pub no_edge: bool,
    pub width_small: bool,
    pub width_large: bool,
}

/// Per-column match diagnostics of the template tracker, indexed by
/// [`EdgeId::index`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDiagnostics {
    /// SAD of the best template match; `None` when no match was scored.
    pub score: [Option<f64>; 2],
    /// Standard deviation of the profile at the expected row.
    pub edge_std: [f64; 2],
    pub errors: [EdgeErrorLog; 2],
}

/// One processed column of one wire.
///
/// Edge rows are `NaN` when the wire was not observed at this column (template
/// tracker with both edges flat, or a wire slot that is not in frame).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSample {
    pub column: usize,
    pub upper_edge: f64,
    pub lower_edge: f64,
    pub width: f64,
    /// Slope state of the recursive tracker.
    pub slope: Option<f64>,
    /// Covariance diagonal of the recursive tracker.
    pub variances: Option<StateVariances>,
    pub brightness: BrightnessStats,
    /// Raw extractor candidates (recursive tracker only).
    pub measured: Option<[f64; 2]>,
    /// Per-edge flag: the raw reading was rejected and a fallback used.
    pub missing: [bool; 2],
    /// Template tracker only.
    pub matching: Option<MatchDiagnostics>,
    pub in_frame: bool,
}

impl ColumnSample {
    /// Placeholder row for a wire that is not in frame at `column`.
    pub fn absent(column: usize) -> Self {
        Self {
            column,
            upper_edge: f64::NAN,
            lower_edge: f64::NAN,
            width: f64::NAN,
            slope: None,
            variances: None,
            brightness: BrightnessStats::MISSING,
            measured: None,
            missing: [true, true],
            matching: None,
            in_frame: false,
        }
    }

    pub fn is_observed(&self) -> bool {
        self.in_frame && self.upper_edge.is_finite() && self.lower_edge.is_finite()
    }
}
