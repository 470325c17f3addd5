use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{LapRecord, TelemetryComparison, intern_driver_codes};
use crate::errors::LapvizError;

const JSON_LINES_EXTENSION: &str = "jsonl";

// The data service wraps its payloads in `{"data": ...}`; saved files may or may not keep it
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Envelope { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Envelope { data } => data,
            Payload::Bare(data) => data,
        }
    }
}

/// Loads lap records from a JSON file (array, or the service envelope) or
/// from a JSON Lines file with one record per line.
pub fn load_laps(source_file: &Path) -> Result<Vec<LapRecord>, LapvizError> {
    ensure_exists(source_file)?;

    let mut laps: Vec<LapRecord> = if is_json_lines(source_file) {
        serde_jsonlines::json_lines(source_file)
            .map_err(|e| LapvizError::LapLoaderError { source: e })?
            .collect::<Result<Vec<LapRecord>, std::io::Error>>()
            .map_err(|e| LapvizError::LapLoaderError { source: e })?
    } else {
        load_json(source_file)?
    };
    intern_driver_codes(&mut laps);

    info!("Loaded {:?}, found {} lap records", source_file, laps.len());
    Ok(laps)
}

/// Loads a telemetry comparison payload saved from the data service.
pub fn load_comparison(source_file: &Path) -> Result<TelemetryComparison, LapvizError> {
    ensure_exists(source_file)?;
    let comparison: TelemetryComparison = load_json(source_file)?;
    info!(
        "Loaded {:?}, found {} compared laps over {} samples",
        source_file,
        comparison.summary.len(),
        comparison.telemetry.len()
    );
    Ok(comparison)
}

fn ensure_exists(source_file: &Path) -> Result<(), LapvizError> {
    if !source_file.exists() {
        return Err(LapvizError::LapFileNotFound {
            path: format!("{:?}", source_file),
        });
    }
    Ok(())
}

fn is_json_lines(source_file: &Path) -> bool {
    source_file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(JSON_LINES_EXTENSION))
}

fn load_json<T: DeserializeOwned>(source_file: &Path) -> Result<T, LapvizError> {
    let file = File::open(source_file).map_err(|e| LapvizError::LapLoaderError { source: e })?;
    let payload: Payload<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| LapvizError::LapDecodeError { source: e })?;
    Ok(payload.into_inner())
}
