use log::warn;
use serde::{Deserialize, Serialize};

use crate::session::{DriverCode, LapRecord};
use crate::timing::lap_seconds;

/// A specific lap of a specific driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LapRef {
    pub driver: DriverCode,
    pub lap_number: u32,
}

impl LapRef {
    pub fn new(driver: impl Into<DriverCode>, lap_number: u32) -> Self {
        Self {
            driver: driver.into(),
            lap_number,
        }
    }
}

/// Laps picked for a detailed comparison, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapSelection {
    laps: Vec<LapRef>,
}

impl LapSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lap. Picking an already selected lap is a no-op and returns `false`.
    pub fn select(&mut self, lap: LapRef) -> bool {
        if self.laps.contains(&lap) {
            return false;
        }
        self.laps.push(lap);
        true
    }

    pub fn deselect(&mut self, lap: &LapRef) -> bool {
        let before = self.laps.len();
        self.laps.retain(|l| l != lap);
        self.laps.len() != before
    }

    pub fn clear(&mut self) {
        self.laps.clear();
    }

    pub fn contains(&self, lap: &LapRef) -> bool {
        self.laps.contains(lap)
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LapRef> {
        self.laps.iter()
    }

    /// Joins each selected lap with its lap time from `laps`. The first record
    /// with a usable time wins; selections without one are left out.
    pub fn resolve(&self, laps: &[LapRecord]) -> Vec<ComparisonLapEntry> {
        self.laps
            .iter()
            .filter_map(|selected| {
                let total_seconds = laps
                    .iter()
                    .filter(|r| r.driver == selected.driver && r.lap_number == selected.lap_number)
                    .find_map(|r| lap_seconds(&r.lap_time));
                if total_seconds.is_none() {
                    warn!(
                        "No usable lap time for {} lap {}, leaving it out of the comparison",
                        selected.driver, selected.lap_number
                    );
                }
                total_seconds.map(|total_seconds| ComparisonLapEntry {
                    driver: selected.driver.clone(),
                    lap_number: selected.lap_number,
                    total_seconds,
                })
            })
            .collect()
    }
}

impl FromIterator<LapRef> for LapSelection {
    fn from_iter<I: IntoIterator<Item = LapRef>>(iter: I) -> Self {
        let mut selection = LapSelection::new();
        for lap in iter {
            selection.select(lap);
        }
        selection
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonLapEntry {
    pub driver: DriverCode,
    pub lap_number: u32,
    pub total_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonLapSummary {
    pub driver: DriverCode,
    pub lap_number: u32,
    pub total_seconds: f64,
    /// Gap to the fastest compared lap, `0` for the fastest itself
    pub delta_to_fastest: f64,
}

impl ComparisonLapSummary {
    /// Whether this is the reference ("purple") lap of the comparison.
    pub fn is_reference(&self) -> bool {
        self.delta_to_fastest == 0.
    }
}

/// Deltas of each compared lap to the fastest one, in input order.
///
/// Entries without a finite positive total are dropped.
pub fn summarize_comparison(entries: &[ComparisonLapEntry]) -> Vec<ComparisonLapSummary> {
    let valid: Vec<&ComparisonLapEntry> = entries
        .iter()
        .filter(|e| {
            let usable = e.total_seconds.is_finite() && e.total_seconds > 0.;
            if !usable {
                warn!(
                    "Dropping {} lap {} from the comparison, total time {} is unusable",
                    e.driver, e.lap_number, e.total_seconds
                );
            }
            usable
        })
        .collect();

    let fastest = valid
        .iter()
        .map(|e| e.total_seconds)
        .fold(f64::INFINITY, f64::min);

    valid
        .into_iter()
        .map(|e| ComparisonLapSummary {
            driver: e.driver.clone(),
            lap_number: e.lap_number,
            total_seconds: e.total_seconds,
            delta_to_fastest: e.total_seconds - fastest,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(driver: &str, lap_number: u32, total_seconds: f64) -> ComparisonLapEntry {
        ComparisonLapEntry {
            driver: driver.into(),
            lap_number,
            total_seconds,
        }
    }

    #[test]
    fn test_deltas_in_input_order() {
        let summaries = summarize_comparison(&[
            entry("VER", 12, 91.234),
            entry("LEC", 14, 90.900),
            entry("NOR", 9, 92.0),
        ]);
        let expected = [0.334, 0.0, 1.1];
        assert_eq!(summaries.len(), 3);
        for (summary, delta) in summaries.iter().zip(expected) {
            assert!(
                (summary.delta_to_fastest - delta).abs() < 1e-9,
                "{} expected {delta}, got {}",
                summary.driver,
                summary.delta_to_fastest
            );
        }
        assert_eq!(summaries[0].driver.as_str(), "VER");
        assert_eq!(summaries.iter().filter(|s| s.is_reference()).count(), 1);
        assert!(summaries[1].is_reference());
    }

    #[test]
    fn test_deltas_follow_the_compared_set() {
        let mut entries = vec![entry("VER", 12, 91.234), entry("NOR", 9, 92.0)];
        assert!(summarize_comparison(&entries)[0].is_reference());

        entries.push(entry("LEC", 14, 90.9));
        let summaries = summarize_comparison(&entries);
        assert!(!summaries[0].is_reference());
        assert!(summaries[2].is_reference());
    }

    #[test]
    fn test_unusable_totals_are_dropped() {
        let summaries = summarize_comparison(&[
            entry("VER", 1, f64::NAN),
            entry("LEC", 2, 0.),
            entry("SAI", 3, 93.),
        ]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].delta_to_fastest, 0.);
        assert!(summarize_comparison(&[]).is_empty());
    }

    #[test]
    fn test_selection_is_deduplicated_and_ordered() {
        let mut selection = LapSelection::new();
        assert!(selection.select(LapRef::new("HAM", 20)));
        assert!(selection.select(LapRef::new("RUS", 18)));
        assert!(!selection.select(LapRef::new("HAM", 20)));
        assert!(selection.select(LapRef::new("HAM", 21)));

        let picked: Vec<(String, u32)> = selection
            .iter()
            .map(|l| (l.driver.to_string(), l.lap_number))
            .collect();
        assert_eq!(
            picked,
            vec![("HAM".into(), 20), ("RUS".into(), 18), ("HAM".into(), 21)]
        );

        assert!(selection.deselect(&LapRef::new("RUS", 18)));
        assert!(!selection.deselect(&LapRef::new("RUS", 18)));
        assert_eq!(selection.len(), 2);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_from_iterator_skips_duplicates() {
        let selection: LapSelection = [LapRef::new("VER", 1), LapRef::new("VER", 1)]
            .into_iter()
            .collect();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_resolve_joins_lap_times() {
        let laps = vec![
            LapRecord::new("HAM", 20, "NaT"),
            LapRecord::new("HAM", 20, "1:32.100"),
            LapRecord::new("RUS", 18, 91.8),
        ];
        let selection: LapSelection = [
            LapRef::new("RUS", 18),
            LapRef::new("HAM", 20),
            LapRef::new("HAM", 99),
        ]
        .into_iter()
        .collect();

        let entries = selection.resolve(&laps);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].driver.as_str(), "RUS");
        assert!((entries[1].total_seconds - 92.1).abs() < 1e-9);

        let summaries = summarize_comparison(&entries);
        assert!(summaries[0].is_reference());
        assert!((summaries[1].delta_to_fastest - 0.3).abs() < 1e-9);
    }
}
