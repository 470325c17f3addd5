// Error types for lapviz

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LapvizError {
    // Time parsing errors. Aggregations never surface these, they drop the record instead
    #[snafu(display("Invalid duration: {value:?}"))]
    InvalidDuration { value: String },
    #[snafu(display("Duration {value:?} has {parts} ':'-separated parts, expected at most 3"))]
    TooManyTimeParts { value: String, parts: usize },

    // Nothing usable in the input batch
    #[snafu(display("No usable data: {what}"))]
    EmptyInput { what: String },

    // Lap file loading errors
    #[snafu(display("Lap file not found: {path}"))]
    LapFileNotFound { path: String },
    #[snafu(display("Error loading lap file"))]
    LapLoaderError { source: io::Error },
    #[snafu(display("Error decoding lap file"))]
    LapDecodeError { source: serde_json::Error },

    // Output errors
    #[snafu(display("Error writing output"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing output"))]
    OutputSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}

impl LapvizError {
    /// True for the errors produced while decoding a time value.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            LapvizError::InvalidDuration { .. } | LapvizError::TooManyTimeParts { .. }
        )
    }
}
