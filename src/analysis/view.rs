use log::info;
use serde::Serialize;

use super::{
    AnalysisConfig, DriverQualifyingEntry, PaceDistribution, PaceDistributionAnalyzer,
    Progression, ProgressionAligner, QualifyingSummarizer, SessionAnalyzer, ValueDomain,
};
use crate::session::{DriverCode, LapRecord, SessionKind, ViewMode};

/// What the dashboard renders for a session.
///
/// `NoData` is the explicit empty state: nothing in the batch was usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SessionView {
    Qualifying {
        entries: Vec<DriverQualifyingEntry>,
        domain: ValueDomain,
    },
    RacePace(PaceDistribution),
    Progression(Progression),
    NoData,
}

impl SessionView {
    pub fn is_empty(&self) -> bool {
        matches!(self, SessionView::NoData)
    }
}

/// Driver selection and outlier toggle of the progression view.
#[derive(Debug, Clone, Default)]
pub struct ProgressionOptions {
    pub drivers: Vec<DriverCode>,
    pub include_outliers: bool,
}

/// Picks the transformation for `session_id` and `view_mode` and runs it over `laps`.
pub fn build_session_view(
    session_id: &str,
    view_mode: ViewMode,
    laps: &[LapRecord],
    progression: &ProgressionOptions,
    config: &AnalysisConfig,
) -> SessionView {
    let kind = SessionKind::from_identifier(session_id);
    info!(
        "Building {:?} view of {} session {} from {} laps",
        view_mode,
        kind,
        session_id,
        laps.len()
    );

    match (view_mode, kind) {
        (ViewMode::Progression, _) => {
            let aligned = ProgressionAligner::with_config(
                &progression.drivers,
                progression.include_outliers,
                *config,
            )
            .analyze(laps);
            if aligned.is_empty() {
                SessionView::NoData
            } else {
                SessionView::Progression(aligned)
            }
        }
        (ViewMode::Summary, SessionKind::Qualifying) => {
            let entries = QualifyingSummarizer.analyze(laps);
            if entries.is_empty() {
                SessionView::NoData
            } else {
                SessionView::Qualifying {
                    entries,
                    domain: ValueDomain::Auto,
                }
            }
        }
        (ViewMode::Summary, SessionKind::Race) => {
            let distribution = PaceDistributionAnalyzer::with_config(*config).analyze(laps);
            if distribution.is_empty() {
                SessionView::NoData
            } else {
                SessionView::RacePace(distribution)
            }
        }
    }
}
