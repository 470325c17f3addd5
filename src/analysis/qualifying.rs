use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use super::SessionAnalyzer;
use crate::session::{DriverCode, LapRecord, TimeValue};
use crate::timing::{lap_seconds, parse_duration};

/// A driver's fastest lap split into sectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverQualifyingEntry {
    pub driver: DriverCode,
    pub sector1: f64,
    pub sector2: f64,
    pub sector3: f64,
    pub total: f64,
}

impl DriverQualifyingEntry {
    fn from_record(record: &LapRecord, total: f64) -> Self {
        Self {
            driver: record.driver.clone(),
            sector1: sector_seconds(&record.sector1_time),
            sector2: sector_seconds(&record.sector2_time),
            sector3: sector_seconds(&record.sector3_time),
            total,
        }
    }
}

// A missing or broken split should not cost the driver their lap, it just renders as empty
fn sector_seconds(value: &TimeValue) -> f64 {
    match parse_duration(value) {
        Ok(seconds) if seconds.is_finite() && seconds > 0. => seconds,
        _ => 0.,
    }
}

/// Reduces a qualifying-type session to one best lap per driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualifyingSummarizer;

impl SessionAnalyzer for QualifyingSummarizer {
    type Output = Vec<DriverQualifyingEntry>;

    /// Entries come out fastest first. Equal totals keep the order in which
    /// drivers first appeared.
    fn analyze(&self, laps: &[LapRecord]) -> Self::Output {
        let mut entries: Vec<DriverQualifyingEntry> = Vec::new();
        let mut index_by_driver: HashMap<DriverCode, usize> = HashMap::new();

        for record in laps {
            let Some(total) = lap_seconds(&record.lap_time) else {
                debug!(
                    "Skipping lap {} of {} without a usable lap time",
                    record.lap_number, record.driver
                );
                continue;
            };

            match index_by_driver.get(&record.driver) {
                Some(&idx) => {
                    if total < entries[idx].total {
                        entries[idx] = DriverQualifyingEntry::from_record(record, total);
                    }
                }
                None => {
                    index_by_driver.insert(record.driver.clone(), entries.len());
                    entries.push(DriverQualifyingEntry::from_record(record, total));
                }
            }
        }

        entries.sort_by(|a, b| a.total.total_cmp(&b.total));
        entries
    }
}

pub fn summarize_qualifying(laps: &[LapRecord]) -> Vec<DriverQualifyingEntry> {
    QualifyingSummarizer.analyze(laps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_lap_wins_with_its_own_sectors() {
        let laps = vec![
            LapRecord::new("NOR", 3, 80.1).with_sectors(26.0, 28.0, 26.1),
            LapRecord::new("NOR", 5, 79.8).with_sectors(25.5, 28.3, 26.0),
        ];
        let entries = summarize_qualifying(&laps);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total, 79.8);
        assert_eq!(entries[0].sector1, 25.5);
        assert_eq!(entries[0].sector2, 28.3);
        assert_eq!(entries[0].sector3, 26.0);
    }

    #[test]
    fn test_slower_later_lap_does_not_replace_best() {
        let laps = vec![
            LapRecord::new("NOR", 5, 79.8).with_sectors(25.5, 28.3, 26.0),
            LapRecord::new("NOR", 6, 80.1).with_sectors(26.0, 28.0, 26.1),
            LapRecord::new("NOR", 7, 79.8).with_sectors(1.0, 1.0, 1.0),
        ];
        let entries = summarize_qualifying(&laps);
        assert_eq!(entries[0].total, 79.8);
        assert_eq!(entries[0].sector1, 25.5);
    }

    #[test]
    fn test_sorted_by_total_with_stable_ties() {
        let laps = vec![
            LapRecord::new("LEC", 1, "1:20.500"),
            LapRecord::new("SAI", 1, "1:19.900"),
            LapRecord::new("PIA", 1, "1:20.500"),
            LapRecord::new("HAM", 1, "0 days 00:01:21.000000"),
        ];
        let order: Vec<String> = summarize_qualifying(&laps)
            .into_iter()
            .map(|e| e.driver.to_string())
            .collect();
        assert_eq!(order, vec!["SAI", "LEC", "PIA", "HAM"]);
    }

    #[test]
    fn test_unusable_lap_times_never_establish_a_best() {
        let laps = vec![
            LapRecord::new("ALB", 1, "NaT"),
            LapRecord::new("ALB", 2, 0.),
            LapRecord::new("SAR", 1, TimeValue::Missing),
            LapRecord::new("ALB", 3, 82.0).with_sectors(27.0, 28.0, 27.0),
        ];
        let entries = summarize_qualifying(&laps);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].driver.as_str(), "ALB");
        assert_eq!(entries[0].total, 82.0);
    }

    #[test]
    fn test_broken_sector_renders_as_zero() {
        let laps = vec![LapRecord::new("TSU", 2, 81.0).with_sectors("NaT", 28.0, TimeValue::Missing)];
        let entries = summarize_qualifying(&laps);
        assert_eq!(entries[0].sector1, 0.);
        assert_eq!(entries[0].sector2, 28.0);
        assert_eq!(entries[0].sector3, 0.);
        assert!(entries.iter().all(|e| e.total.is_finite()));
    }

    #[test]
    fn test_empty_input() {
        assert!(summarize_qualifying(&[]).is_empty());
    }
}
