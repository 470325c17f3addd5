pub mod loader;
pub mod schedule;
pub mod telemetry;

use std::{borrow::Borrow, collections::HashSet, fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize};

pub use loader::{load_comparison, load_laps};
pub use schedule::{DriverInfo, RaceEvent, SessionOption, find_event};
pub use telemetry::{Channel, DominanceSegment, TelemetryComparison, TelemetrySample};

/// Short driver code as emitted by the data service (e.g. `VER`).
///
/// Opaque: nothing is assumed about length or alphabet. Clones share the
/// same allocation, see [`intern_driver_codes`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DriverCode(Arc<str>);

impl DriverCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(Arc::from(code.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DriverCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DriverCode {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<DriverCode> for String {
    fn from(value: DriverCode) -> Self {
        value.0.to_string()
    }
}

impl Borrow<str> for DriverCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time as the data service emits it: seconds, a duration string, or nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Seconds(f64),
    Text(String),
    #[default]
    Missing,
}

impl From<f64> for TimeValue {
    fn from(value: f64) -> Self {
        TimeValue::Seconds(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        TimeValue::Text(value.to_string())
    }
}

/// One lap of one driver in a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LapRecord {
    pub driver: DriverCode,
    /// 1-based lap number, `0` when the service did not provide one
    #[serde(default, deserialize_with = "deserialize_lap_number")]
    pub lap_number: u32,
    #[serde(default)]
    pub lap_time: TimeValue,
    #[serde(default)]
    pub sector1_time: TimeValue,
    #[serde(default)]
    pub sector2_time: TimeValue,
    #[serde(default)]
    pub sector3_time: TimeValue,
    /// Track limits / flag validity. Unknown accuracy counts as inaccurate.
    #[serde(default, deserialize_with = "deserialize_nullable_bool")]
    pub is_accurate: bool,
}

impl LapRecord {
    pub fn new(driver: impl Into<DriverCode>, lap_number: u32, lap_time: impl Into<TimeValue>) -> Self {
        Self {
            driver: driver.into(),
            lap_number,
            lap_time: lap_time.into(),
            sector1_time: TimeValue::Missing,
            sector2_time: TimeValue::Missing,
            sector3_time: TimeValue::Missing,
            is_accurate: true,
        }
    }

    pub fn with_sectors(
        mut self,
        sector1: impl Into<TimeValue>,
        sector2: impl Into<TimeValue>,
        sector3: impl Into<TimeValue>,
    ) -> Self {
        self.sector1_time = sector1.into();
        self.sector2_time = sector2.into();
        self.sector3_time = sector3.into();
        self
    }

    pub fn with_accuracy(mut self, is_accurate: bool) -> Self {
        self.is_accurate = is_accurate;
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLapNumber {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

// pandas hands lap numbers over as floats (`12.0`), sometimes as strings
pub(crate) fn deserialize_lap_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let lap_number = match Option::<RawLapNumber>::deserialize(deserializer)? {
        Some(RawLapNumber::Whole(n)) => u32::try_from(n).unwrap_or(0),
        Some(RawLapNumber::Fractional(n)) if n.is_finite() && n >= 0. && n.fract() == 0. => {
            n as u32
        }
        Some(RawLapNumber::Text(s)) => s.trim().parse::<f64>().map_or(0, |n| {
            if n.is_finite() && n >= 0. && n.fract() == 0. {
                n as u32
            } else {
                0
            }
        }),
        _ => 0,
    };
    Ok(lap_number)
}

fn deserialize_nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Makes every record of the same driver share one code allocation.
pub fn intern_driver_codes(records: &mut [LapRecord]) {
    let mut known: HashSet<DriverCode> = HashSet::new();
    for record in records.iter_mut() {
        if let Some(existing) = known.get(record.driver.as_str()) {
            record.driver = existing.clone();
        } else {
            known.insert(record.driver.clone());
        }
    }
}

/// How a session is charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// Only each driver's single fastest lap matters
    Qualifying,
    /// Every lap matters, pace is a distribution
    Race,
}

impl SessionKind {
    /// Classifies a session identifier (`Q`, `SQ`, `SS`, `R`, `S`, `FP1`...).
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim() {
            "Q" | "SQ" | "SS" => SessionKind::Qualifying,
            _ => SessionKind::Race,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Qualifying => write!(f, "Qualifying"),
            SessionKind::Race => write!(f, "Race"),
        }
    }
}

/// Which chart the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Qualifying breakdown or race pace distribution
    #[default]
    Summary,
    /// Lap-by-lap progression of selected drivers
    Progression,
}

/// The upstream "summary vs. all laps" request flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    Summary,
    All,
}

impl ViewMode {
    pub fn fetch_mode(&self) -> FetchMode {
        match self {
            ViewMode::Summary => FetchMode::Summary,
            ViewMode::Progression => FetchMode::All,
        }
    }

    /// Driver subset to request upstream. Summary views always fetch the full field.
    pub fn requested_drivers<'a>(&self, selected: &'a [DriverCode]) -> &'a [DriverCode] {
        match self {
            ViewMode::Summary => &[],
            ViewMode::Progression => selected,
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Summary => write!(f, "summary"),
            FetchMode::All => write!(f, "all"),
        }
    }
}
