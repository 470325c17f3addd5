// Integration tests for the session views with saved data service payloads
//
// This test suite validates the complete workflow:
// 1. Load lap records from sample files (JSON envelope and JSON Lines)
// 2. Build the qualifying, race pace and progression views
// 3. Compare selected laps and saved telemetry comparisons

use std::path::Path;

use lapviz::analysis::{
    LapRef, LapSelection, PaceDistributionAnalyzer, SessionAnalyzer, align_progression,
    summarize_comparison, summarize_qualifying,
};
use lapviz::session::{Channel, load_comparison, load_laps};
use lapviz::{
    AnalysisConfig, DriverCode, LapvizError, ProgressionOptions, SessionView, ValueDomain,
    ViewMode, build_session_view, format_duration,
};

const RACE_SAMPLE: &str = "lap_samples/race_short.jsonl";
const QUALIFYING_SAMPLE: &str = "lap_samples/qualifying.json";
const COMPARISON_SAMPLE: &str = "lap_samples/comparison.json";

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn fixed_domain(domain: ValueDomain) -> (f64, f64) {
    match domain {
        ValueDomain::Fixed { low, high } => (low, high),
        ValueDomain::Auto => panic!("Expected a fixed domain"),
    }
}

#[test]
fn test_load_race_sample() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).expect("Failed to load race sample");
    assert_eq!(laps.len(), 10);

    // lap numbers come as integers, strings and floats
    let lap_numbers: Vec<u32> = laps.iter().map(|l| l.lap_number).collect();
    assert_eq!(lap_numbers, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    assert!(!laps[8].is_accurate);
}

#[test]
fn test_qualifying_sample() {
    let laps = load_laps(Path::new(QUALIFYING_SAMPLE)).expect("Failed to load qualifying sample");
    assert_eq!(laps.len(), 5);

    let entries = summarize_qualifying(&laps);
    let drivers: Vec<&str> = entries.iter().map(|e| e.driver.as_str()).collect();
    assert_eq!(drivers, vec!["VER", "LEC"], "NOR has no valid lap");

    // the 1:19.800 lap wins over the 1:20.100 one, sectors included
    assert_close(entries[0].total, 79.8);
    assert_close(entries[0].sector1, 25.9);
    assert_close(entries[0].sector2, 26.9);
    assert_close(entries[0].sector3, 27.0);
    assert_eq!(format_duration(entries[0].total), "1:19.800");

    assert_close(entries[1].total, 80.0);
    assert_close(entries[1].sector1, 26.1);
}

#[test]
fn test_qualifying_view_for_sprint_shootout() {
    let laps = load_laps(Path::new(QUALIFYING_SAMPLE)).unwrap();
    let view = build_session_view(
        "SS",
        ViewMode::Summary,
        &laps,
        &ProgressionOptions::default(),
        &AnalysisConfig::default(),
    );
    match view {
        SessionView::Qualifying { entries, domain } => {
            assert_eq!(entries.len(), 2);
            assert!(domain.is_auto());
        }
        other => panic!("Expected qualifying view, got {:?}", other),
    }
}

#[test]
fn test_race_pace_sample() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let distribution = PaceDistributionAnalyzer::new().analyze(&laps);
    assert_eq!(distribution.summaries.len(), 2);

    let ver = &distribution.summaries[0];
    assert_eq!(ver.driver.as_str(), "VER");
    assert_close(ver.min, 94.0);
    assert_close(ver.q1, 94.2);
    assert_close(ver.median, 94.5);
    assert_close(ver.q3, 95.0);
    // the 2:00 pit lap falls outside the fence
    assert_close(ver.max, 95.0);

    let lec = &distribution.summaries[1];
    assert_eq!(lec.driver.as_str(), "LEC");
    assert_close(lec.min, 94.8);
    assert_close(lec.median, 95.1);
    assert_close(lec.max, 95.5);

    let (low, high) = fixed_domain(distribution.domain);
    assert_close(low, 93.85);
    assert_close(high, 95.65);
}

#[test]
fn test_race_pace_view_matches_analyzer() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let view = build_session_view(
        "R",
        ViewMode::Summary,
        &laps,
        &ProgressionOptions::default(),
        &AnalysisConfig::default(),
    );
    assert_eq!(
        view,
        SessionView::RacePace(PaceDistributionAnalyzer::new().analyze(&laps))
    );
}

#[test]
fn test_progression_sample() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let selected = vec![DriverCode::from("VER"), DriverCode::from("LEC")];

    let progression = align_progression(&laps, &selected, false);
    let lap_numbers: Vec<u32> = progression.rows.iter().map(|r| r.lap).collect();
    assert_eq!(lap_numbers, vec![1, 2, 3, 4, 5]);

    // VER's lap 5 is not accurate and LEC's has no time
    let last = &progression.rows[4];
    assert_eq!(last.time_for("VER"), None);
    assert_eq!(last.time_for("LEC"), None);
    assert_close(progression.rows[2].time_for("VER").unwrap(), 94.5);

    let (low, high) = fixed_domain(progression.domain);
    assert_close(low, 93.85);
    assert_close(high, 95.65);

    let with_outliers = align_progression(&laps, &selected, true);
    assert_close(with_outliers.rows[4].time_for("VER").unwrap(), 120.0);
    assert_eq!(with_outliers.rows[4].time_for("LEC"), None);
}

#[test]
fn test_progression_serializes_gaps_as_missing_keys() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let progression = align_progression(&laps, &[DriverCode::from("LEC")], false);
    let json = serde_json::to_value(&progression).unwrap();

    let last_row = &json["rows"][4];
    assert_eq!(last_row["lap"], 5);
    assert!(last_row.get("LEC").is_none());
    assert_eq!(json["rows"][0]["LEC"], 95.5);
}

#[test]
fn test_progression_view_without_selection_is_no_data() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let view = build_session_view(
        "R",
        ViewMode::Progression,
        &laps,
        &ProgressionOptions::default(),
        &AnalysisConfig::default(),
    );
    assert!(view.is_empty());
}

#[test]
fn test_compare_selected_laps() {
    let laps = load_laps(Path::new(RACE_SAMPLE)).unwrap();
    let selection: LapSelection = [
        LapRef::new("LEC", 2),
        LapRef::new("VER", 2),
        LapRef::new("LEC", 2),
        LapRef::new("LEC", 5),
    ]
    .into_iter()
    .collect();
    assert_eq!(selection.len(), 3);

    let summaries = summarize_comparison(&selection.resolve(&laps));
    assert_eq!(summaries.len(), 2, "LEC lap 5 has no time");
    assert_eq!(summaries[0].driver.as_str(), "LEC");
    assert_close(summaries[0].delta_to_fastest, 0.8);
    assert!(summaries[1].is_reference());
}

#[test]
fn test_comparison_sample() {
    let comparison =
        load_comparison(Path::new(COMPARISON_SAMPLE)).expect("Failed to load comparison sample");

    let summaries = summarize_comparison(&comparison.lap_entries());
    let deltas: Vec<f64> = summaries.iter().map(|s| s.delta_to_fastest).collect();
    assert_eq!(deltas.len(), 3);
    assert_close(deltas[0], 0.334);
    assert_eq!(deltas[1], 0.0);
    assert_close(deltas[2], 1.1);
    assert_eq!(summaries.iter().filter(|s| s.is_reference()).count(), 1);

    let speed = comparison.series(Channel::Speed, &LapRef::new("NOR", 9));
    assert_eq!(speed, vec![(0.0, 279.0), (50.0, 284.0)]);

    let shares = comparison.dominance_share();
    let leaders: Vec<&str> = shares.iter().map(|(d, _)| d.as_str()).collect();
    assert_eq!(leaders, vec!["LEC", "VER", "NOR"]);
    assert_close(shares[0].1, 0.6);
}

#[test]
fn test_missing_sample_file() {
    let result = load_laps(Path::new("lap_samples/does_not_exist.json"));
    assert!(matches!(result, Err(LapvizError::LapFileNotFound { .. })));
}
