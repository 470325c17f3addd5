use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::{AnalysisConfig, SessionAnalyzer, ValueDomain};
use crate::session::{DriverCode, LapRecord};
use crate::timing::lap_seconds;

/// Box-plot statistics of one driver's race pace, in seconds.
///
/// `min`/`max` are the fenced whisker ends; the quartiles are taken over all
/// valid laps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPaceSummary {
    pub driver: DriverCode,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// `(median - min, max - median)`, for asymmetric error bars
    pub whisker_span: (f64, f64),
}

impl DriverPaceSummary {
    /// Builds the summary from laps sorted ascending. `None` when empty.
    fn from_sorted(driver: DriverCode, sorted: &[f64], fence_multiplier: f64) -> Option<Self> {
        let (&first, &last) = (sorted.first()?, sorted.last()?);
        let n = sorted.len();
        let q1 = sorted[quartile_index(n, 0.25)];
        let median = sorted[quartile_index(n, 0.5)];
        let q3 = sorted[quartile_index(n, 0.75)];

        // a negative multiplier would pull the fences inside the box
        let fence_multiplier = fence_multiplier.max(0.);
        let iqr = q3 - q1;
        let lower_fence = q1 - fence_multiplier * iqr;
        let upper_fence = q3 + fence_multiplier * iqr;
        let (min, max) = sorted
            .iter()
            .filter(|t| **t >= lower_fence && **t <= upper_fence)
            .minmax()
            .into_option()
            .map(|(lo, hi)| (*lo, *hi))
            .unwrap_or((first, last));

        Some(Self {
            driver,
            min,
            q1,
            median,
            q3,
            max,
            whisker_span: (median - min, max - median),
        })
    }
}

// nearest-rank, no interpolation
fn quartile_index(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).floor() as usize).min(n - 1)
}

/// Per-driver summaries, fastest median first, plus the axis they share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceDistribution {
    pub summaries: Vec<DriverPaceSummary>,
    pub domain: ValueDomain,
}

impl PaceDistribution {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaceDistributionAnalyzer {
    config: AnalysisConfig,
}

impl PaceDistributionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Display domain across all summaries: the extreme whisker ends, padded.
    pub fn domain(&self, summaries: &[DriverPaceSummary]) -> ValueDomain {
        if summaries.is_empty() {
            return ValueDomain::Auto;
        }
        let global_min = summaries.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
        let global_max = summaries
            .iter()
            .map(|s| s.max)
            .fold(f64::NEG_INFINITY, f64::max);
        ValueDomain::padded(global_min, global_max, None, &self.config)
    }
}

impl SessionAnalyzer for PaceDistributionAnalyzer {
    type Output = PaceDistribution;

    fn analyze(&self, laps: &[LapRecord]) -> Self::Output {
        // grouped in first-seen driver order so ties in the median sort stay stable
        let mut grouped: Vec<(DriverCode, Vec<f64>)> = Vec::new();
        let mut index_by_driver: HashMap<DriverCode, usize> = HashMap::new();
        for record in laps {
            let Some(seconds) = lap_seconds(&record.lap_time) else {
                continue;
            };
            let idx = *index_by_driver
                .entry(record.driver.clone())
                .or_insert_with(|| {
                    grouped.push((record.driver.clone(), Vec::new()));
                    grouped.len() - 1
                });
            grouped[idx].1.push(seconds);
        }

        let mut summaries: Vec<DriverPaceSummary> = grouped
            .into_iter()
            .filter_map(|(driver, mut times)| {
                times.sort_by(f64::total_cmp);
                DriverPaceSummary::from_sorted(driver, &times, self.config.fence_multiplier)
            })
            .collect();
        summaries.sort_by(|a, b| a.median.total_cmp(&b.median));

        let domain = self.domain(&summaries);
        debug!(
            "Computed pace distribution for {} drivers, domain {}",
            summaries.len(),
            domain.chart_key()
        );
        PaceDistribution { summaries, domain }
    }
}

pub fn pace_distribution(laps: &[LapRecord]) -> PaceDistribution {
    PaceDistributionAnalyzer::new().analyze(laps)
}
