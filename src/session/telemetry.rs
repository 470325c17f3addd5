// Detailed telemetry comparison payload returned by the data service

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{DriverCode, deserialize_lap_number};
use crate::analysis::comparison::{ComparisonLapEntry, LapRef};

/// Distance-indexed channels available in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Speed,
    Rpm,
    Gear,
    Throttle,
    Brake,
    Drs,
    /// Time gap to the reference lap at this distance
    Delta,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Speed,
        Channel::Rpm,
        Channel::Gear,
        Channel::Throttle,
        Channel::Brake,
        Channel::Drs,
        Channel::Delta,
    ];

    fn key_prefix(&self) -> &'static str {
        match self {
            Channel::Speed => "Speed",
            Channel::Rpm => "RPM",
            Channel::Gear => "nGear",
            Channel::Throttle => "Throttle",
            Channel::Brake => "Brake",
            Channel::Drs => "DRS",
            Channel::Delta => "Delta",
        }
    }

    /// Key of this channel for one lap in a [`TelemetrySample`], e.g. `Speed_VER_12`.
    pub fn series_key(&self, lap: &LapRef) -> String {
        format!("{}_{}_{}", self.key_prefix(), lap.driver, lap.lap_number)
    }
}

/// One distance step with the value of every channel for every compared lap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    #[serde(rename = "Distance")]
    pub distance: f64,
    #[serde(flatten)]
    pub channels: BTreeMap<String, Option<f64>>,
}

impl TelemetrySample {
    pub fn value(&self, channel: Channel, lap: &LapRef) -> Option<f64> {
        self.channels
            .get(&channel.series_key(lap))
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

/// A mini-sector and the driver who was fastest through it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DominanceSegment {
    pub x: f64,
    pub y: f64,
    pub fastest_driver: DriverCode,
}

/// The service's own per-lap summary row. `diff` is ignored and recomputed locally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummaryRow {
    pub driver: DriverCode,
    #[serde(deserialize_with = "deserialize_lap_number")]
    pub lap: u32,
    pub time: f64,
    #[serde(default)]
    pub diff: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryComparison {
    #[serde(default)]
    pub summary: Vec<ComparisonSummaryRow>,
    #[serde(default)]
    pub telemetry: Vec<TelemetrySample>,
    #[serde(default)]
    pub dominance: Vec<DominanceSegment>,
}

impl TelemetryComparison {
    /// The compared laps with their total times, in the order the service listed them.
    pub fn lap_entries(&self) -> Vec<ComparisonLapEntry> {
        self.summary
            .iter()
            .map(|row| ComparisonLapEntry {
                driver: row.driver.clone(),
                lap_number: row.lap,
                total_seconds: row.time,
            })
            .collect()
    }

    /// `(distance, value)` points of one channel for one lap. Gaps are skipped.
    pub fn series(&self, channel: Channel, lap: &LapRef) -> Vec<(f64, f64)> {
        self.telemetry
            .iter()
            .filter_map(|sample| sample.value(channel, lap).map(|v| (sample.distance, v)))
            .collect()
    }

    /// Share of mini-sectors won by each driver, in first-seen order.
    pub fn dominance_share(&self) -> Vec<(DriverCode, f64)> {
        if self.dominance.is_empty() {
            return Vec::new();
        }
        let mut order: Vec<DriverCode> = Vec::new();
        let mut counts: HashMap<DriverCode, usize> = HashMap::new();
        for segment in &self.dominance {
            let count = counts.entry(segment.fastest_driver.clone()).or_insert_with(|| {
                order.push(segment.fastest_driver.clone());
                0
            });
            *count += 1;
        }
        let total = self.dominance.len() as f64;
        order
            .into_iter()
            .map(|driver| {
                let share = counts.get(&driver).copied().unwrap_or(0) as f64 / total;
                (driver, share)
            })
            .collect()
    }
}
