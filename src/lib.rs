// Library interface for lapviz
// Turns raw session lap data into chart-ready structures

pub mod analysis;
pub mod config;
pub mod errors;
pub mod session;
pub mod timing;
pub mod writer;

// Re-export commonly used types
pub use analysis::{
    AnalysisConfig, ProgressionOptions, SessionAnalyzer, SessionView, ValueDomain,
    build_session_view,
};
pub use config::AppConfig;
pub use errors::LapvizError;
pub use session::{DriverCode, LapRecord, SessionKind, TimeValue, ViewMode};
pub use timing::{format_duration, parse_duration};
