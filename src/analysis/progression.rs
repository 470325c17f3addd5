use std::collections::{BTreeMap, HashSet};

use log::warn;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{AnalysisConfig, SessionAnalyzer, ValueDomain};
use crate::session::{DriverCode, LapRecord};
use crate::timing::lap_seconds;

/// Key of the lap number in a serialized row. Driver times share the object.
pub const LAP_KEY: &str = "lap";

/// One lap number across the selected drivers. Drivers without a valid time
/// on this lap have no entry, so a line chart draws a gap rather than a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionRow {
    pub lap: u32,
    pub times: BTreeMap<DriverCode, f64>,
}

// Flat `{"lap": 3, "VER": 92.1}`. A driver coded like the lap key is left out
// so the object never carries the same key twice.
impl Serialize for ProgressionRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let times = self.times.iter().filter(|(driver, _)| driver.as_str() != LAP_KEY);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LAP_KEY, &self.lap)?;
        for (driver, seconds) in times {
            map.serialize_entry(driver.as_str(), seconds)?;
        }
        map.end()
    }
}

impl ProgressionRow {
    fn new(lap: u32) -> Self {
        Self {
            lap,
            times: BTreeMap::new(),
        }
    }

    pub fn time_for(&self, driver: &str) -> Option<f64> {
        self.times.get(driver).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    pub rows: Vec<ProgressionRow>,
    pub domain: ValueDomain,
}

impl Progression {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aligns the laps of a set of drivers by lap number.
#[derive(Debug, Clone)]
pub struct ProgressionAligner {
    selected: HashSet<DriverCode>,
    include_outliers: bool,
    config: AnalysisConfig,
}

impl ProgressionAligner {
    pub fn new(selected: &[DriverCode], include_outliers: bool) -> Self {
        Self::with_config(selected, include_outliers, AnalysisConfig::default())
    }

    pub fn with_config(
        selected: &[DriverCode],
        include_outliers: bool,
        config: AnalysisConfig,
    ) -> Self {
        let selected = selected
            .iter()
            .filter(|driver| {
                let clashes = driver.as_str() == LAP_KEY;
                if clashes {
                    warn!(
                        "Driver code {:?} clashes with the lap number key, leaving it out of the progression",
                        driver.as_str()
                    );
                }
                !clashes
            })
            .cloned()
            .collect();
        Self {
            selected,
            include_outliers,
            config,
        }
    }

    fn keeps(&self, record: &LapRecord) -> bool {
        // lap 0 is a record without a lap number
        record.lap_number >= 1
            && self.selected.contains(&record.driver)
            && (self.include_outliers || record.is_accurate)
    }
}

impl SessionAnalyzer for ProgressionAligner {
    type Output = Progression;

    fn analyze(&self, laps: &[LapRecord]) -> Self::Output {
        let mut rows: BTreeMap<u32, ProgressionRow> = BTreeMap::new();
        let mut min_time = f64::INFINITY;
        let mut max_time = f64::NEG_INFINITY;

        for record in laps.iter().filter(|r| self.keeps(r)) {
            let row = rows
                .entry(record.lap_number)
                .or_insert_with(|| ProgressionRow::new(record.lap_number));
            if let Some(seconds) = lap_seconds(&record.lap_time) {
                row.times.insert(record.driver.clone(), seconds);
                min_time = min_time.min(seconds);
                max_time = max_time.max(seconds);
            }
        }

        Progression {
            rows: rows.into_values().collect(),
            // lap times can't be negative, neither can the axis
            domain: ValueDomain::padded(min_time, max_time, Some(0.), &self.config),
        }
    }
}

pub fn align_progression(
    laps: &[LapRecord],
    selected: &[DriverCode],
    include_outliers: bool,
) -> Progression {
    ProgressionAligner::new(selected, include_outliers).analyze(laps)
}
