pub mod comparison;
pub mod pace;
pub mod progression;
pub mod qualifying;
pub mod view;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::LapvizError;
use crate::session::LapRecord;

pub use comparison::{
    ComparisonLapEntry, ComparisonLapSummary, LapRef, LapSelection, summarize_comparison,
};
pub use pace::{DriverPaceSummary, PaceDistribution, PaceDistributionAnalyzer, pace_distribution};
pub use progression::{Progression, ProgressionAligner, ProgressionRow, align_progression};
pub use qualifying::{DriverQualifyingEntry, QualifyingSummarizer, summarize_qualifying};
pub use view::{ProgressionOptions, SessionView, build_session_view};

/// Outlier fence multiplier applied to the IQR. Tighter than the textbook 1.5
/// so pit-stop and safety-car laps drop out of the whiskers.
pub const DEFAULT_FENCE_MULTIPLIER: f64 = 1.0;
/// Fraction of the value spread added on each side of a chart domain.
pub const DEFAULT_PADDING_RATIO: f64 = 0.1;
/// Padding in seconds used when all values are equal.
pub const DEFAULT_FALLBACK_PADDING_S: f64 = 1.0;

/// Turns a batch of laps from one session into a chart-ready structure.
pub trait SessionAnalyzer {
    type Output;

    fn analyze(&self, laps: &[LapRecord]) -> Self::Output;
}

/// Tunables shared by the analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub fence_multiplier: f64,
    pub padding_ratio: f64,
    pub fallback_padding_s: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fence_multiplier: DEFAULT_FENCE_MULTIPLIER,
            padding_ratio: DEFAULT_PADDING_RATIO,
            fallback_padding_s: DEFAULT_FALLBACK_PADDING_S,
        }
    }
}

impl AnalysisConfig {
    /// Rejects settings that would break the box plot ordering or invert a domain.
    pub fn validate(&self) -> Result<(), LapvizError> {
        for (field, value) in [
            ("fence_multiplier", self.fence_multiplier),
            ("padding_ratio", self.padding_ratio),
            ("fallback_padding_s", self.fallback_padding_s),
        ] {
            check_non_negative(field, value)?;
        }
        Ok(())
    }

    fn padding_for(&self, low: f64, high: f64) -> f64 {
        let spread = high - low;
        if spread > 0. {
            spread * self.padding_ratio
        } else {
            self.fallback_padding_s
        }
    }
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), LapvizError> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(LapvizError::InvalidUserInput {
            field: field.to_string(),
            reason: format!("must be a finite number >= 0, got {}", value),
        })
    }
}

/// Value axis of a chart, shared between charts so they stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ValueDomain {
    /// Let the renderer scale to the data
    #[default]
    Auto,
    Fixed { low: f64, high: f64 },
}

impl ValueDomain {
    /// Pads `[low, high]` per `config`, optionally clamping the lower bound.
    /// Non-finite bounds give [`ValueDomain::Auto`].
    pub fn padded(low: f64, high: f64, floor: Option<f64>, config: &AnalysisConfig) -> Self {
        if !low.is_finite() || !high.is_finite() || low > high {
            return ValueDomain::Auto;
        }
        let padding = config.padding_for(low, high);
        let padded_low = match floor {
            Some(floor) => (low - padding).max(floor),
            None => low - padding,
        };
        let padded_high = high + padding;
        if !padded_low.is_finite() || !padded_high.is_finite() || padded_low > padded_high {
            return ValueDomain::Auto;
        }
        ValueDomain::Fixed {
            low: padded_low,
            high: padded_high,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, ValueDomain::Auto)
    }

    /// Identifies the scale so a renderer can redraw when it changes.
    pub fn chart_key(&self) -> String {
        match self {
            ValueDomain::Auto => "auto".to_string(),
            ValueDomain::Fixed { low, high } => format!("{}-{}", low, high),
        }
    }
}

// Serialized the way chart axes take it: `["auto", "auto"]` or `[low, high]`
impl Serialize for ValueDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        match self {
            ValueDomain::Auto => {
                tuple.serialize_element("auto")?;
                tuple.serialize_element("auto")?;
            }
            ValueDomain::Fixed { low, high } => {
                tuple.serialize_element(low)?;
                tuple.serialize_element(high)?;
            }
        }
        tuple.end()
    }
}
