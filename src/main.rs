use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use lapviz::{
    AppConfig, LapvizError, ProgressionOptions, SessionView, ViewMode,
    analysis::{
        LapRef, LapSelection, PaceDistributionAnalyzer, ProgressionAligner, SessionAnalyzer,
        summarize_comparison, summarize_qualifying,
    },
    build_session_view, format_duration,
    session::{DriverCode, load_comparison, load_laps},
    writer::write_output,
};
use log::{LevelFilter, info, warn};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Write JSON output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Indent JSON output
    #[arg(long, global = true, conflicts_with = "compact")]
    pretty: bool,

    /// Single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    /// IQR multiplier for the outlier fences, overrides the config file
    #[arg(
        long,
        global = true,
        allow_negative_numbers = true,
        value_parser = parse_fence_multiplier
    )]
    fence_multiplier: Option<f64>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Best lap and sectors per driver
    Quali {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Lap time distribution per driver
    Pace {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Lap-by-lap times of the selected drivers
    Progression {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long = "driver")]
        drivers: Vec<String>,

        /// Keep laps not flagged as accurate
        #[arg(long)]
        outliers: bool,
    },
    /// Gaps between laps to the fastest of them
    Compare {
        #[arg(
            short,
            long,
            conflicts_with = "comparison",
            required_unless_present = "comparison"
        )]
        input: Option<PathBuf>,

        /// Lap to compare, as DRIVER:LAP
        #[arg(short, long = "lap")]
        laps: Vec<String>,

        /// Telemetry comparison payload
        #[arg(short, long)]
        comparison: Option<PathBuf>,
    },
    /// Dashboard view for a session
    View {
        #[arg(short, long)]
        input: PathBuf,

        /// Session identifier (Q, SQ, SS, R, S, FP1...)
        #[arg(short, long, default_value = "R")]
        session: String,

        #[arg(short, long, value_enum, default_value_t = ModeArg::Summary)]
        mode: ModeArg,

        #[arg(short, long = "driver")]
        drivers: Vec<String>,

        #[arg(long)]
        outliers: bool,
    },
    /// Render seconds as M:SS.mmm
    FormatTime {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Summary,
    Progression,
}

impl From<ModeArg> for ViewMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Summary => ViewMode::Summary,
            ModeArg::Progression => ViewMode::Progression,
        }
    }
}

#[derive(Serialize, Debug)]
struct ComparisonReport {
    laps: Vec<lapviz::analysis::ComparisonLapSummary>,
    dominance: Vec<(DriverCode, f64)>,
}

fn parse_lap_ref(value: &str) -> Result<LapRef, LapvizError> {
    let invalid = |reason: &str| LapvizError::InvalidUserInput {
        field: "lap".to_string(),
        reason: format!("{reason}: {value:?}"),
    };
    let (driver, lap) = value
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected DRIVER:LAP"))?;
    if driver.trim().is_empty() {
        return Err(invalid("missing driver code"));
    }
    let lap_number = lap
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid("lap must be a positive number"))?;
    if lap_number == 0 {
        return Err(invalid("lap numbers start at 1"));
    }
    Ok(LapRef::new(driver.trim(), lap_number))
}

fn parse_fence_multiplier(value: &str) -> Result<f64, String> {
    let multiplier = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{value:?} is not a number"))?;
    if !multiplier.is_finite() || multiplier < 0. {
        return Err(format!("must be a finite number >= 0, got {value}"));
    }
    Ok(multiplier)
}

fn driver_codes(drivers: &[String]) -> Vec<DriverCode> {
    drivers.iter().map(DriverCode::new).collect()
}

fn load_config(fence_multiplier: Option<f64>) -> Result<AppConfig, LapvizError> {
    let mut app_config = match AppConfig::from_local_file() {
        Ok(config) => config.unwrap_or_default(),
        // settings that parse but make no sense are not silently replaced
        Err(e @ LapvizError::InvalidUserInput { .. }) => return Err(e),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            AppConfig::default()
        }
    };
    if let Some(fence_multiplier) = fence_multiplier {
        app_config.analysis.fence_multiplier = fence_multiplier;
    }
    app_config.analysis.validate()?;
    Ok(app_config)
}

fn empty(what: &str) -> LapvizError {
    LapvizError::EmptyInput {
        what: what.to_string(),
    }
}

fn init_config(force: bool) -> Result<(), LapvizError> {
    let config_path = AppConfig::default_path()?;
    if config_path.exists() && !force {
        info!("Config file already exists at {:?}", config_path);
        println!("{}", config_path.display());
        return Ok(());
    }
    let saved = AppConfig::default().save()?;
    println!("{}", saved.display());
    Ok(())
}

fn run(cli: &Args) -> Result<(), LapvizError> {
    let app_config = load_config(cli.fence_multiplier)?;
    let analysis = app_config.analysis;
    let pretty = if cli.pretty {
        true
    } else if cli.compact {
        false
    } else {
        app_config.pretty_output
    };
    let output: Option<&Path> = cli.output.as_deref();

    match &cli.command {
        Commands::Quali { input } => {
            let entries = summarize_qualifying(&load_laps(input)?);
            if entries.is_empty() {
                return Err(empty("no driver has a valid lap time"));
            }
            write_output(output, &entries, pretty)
        }
        Commands::Pace { input } => {
            let distribution =
                PaceDistributionAnalyzer::with_config(analysis).analyze(&load_laps(input)?);
            if distribution.is_empty() {
                return Err(empty("no lap times to build a pace distribution from"));
            }
            write_output(output, &distribution, pretty)
        }
        Commands::Progression {
            input,
            drivers,
            outliers,
        } => {
            let selected = driver_codes(drivers);
            let progression = ProgressionAligner::with_config(&selected, *outliers, analysis)
                .analyze(&load_laps(input)?);
            if progression.is_empty() {
                return Err(empty("no laps for the selected drivers"));
            }
            write_output(output, &progression, pretty)
        }
        Commands::Compare {
            input,
            laps,
            comparison,
        } => {
            let report = match (comparison, input) {
                (Some(comparison), _) => {
                    let payload = load_comparison(comparison)?;
                    ComparisonReport {
                        laps: summarize_comparison(&payload.lap_entries()),
                        dominance: payload.dominance_share(),
                    }
                }
                (None, Some(input)) => {
                    let selection = laps
                        .iter()
                        .map(|lap| parse_lap_ref(lap))
                        .collect::<Result<LapSelection, LapvizError>>()?;
                    if selection.is_empty() {
                        return Err(LapvizError::InvalidUserInput {
                            field: "lap".to_string(),
                            reason: "select at least one lap to compare".to_string(),
                        });
                    }
                    ComparisonReport {
                        laps: summarize_comparison(&selection.resolve(&load_laps(input)?)),
                        dominance: Vec::new(),
                    }
                }
                (None, None) => {
                    return Err(LapvizError::InvalidUserInput {
                        field: "input".to_string(),
                        reason: "pass a lap file or a comparison payload".to_string(),
                    });
                }
            };
            if report.laps.is_empty() {
                return Err(empty("none of the selected laps has a usable time"));
            }
            write_output(output, &report, pretty)
        }
        Commands::View {
            input,
            session,
            mode,
            drivers,
            outliers,
        } => {
            let view_mode = ViewMode::from(*mode);
            let selected = driver_codes(drivers);
            info!(
                "Upstream request for session {}: mode={} drivers={:?}",
                session,
                view_mode.fetch_mode(),
                view_mode.requested_drivers(&selected)
            );
            let options = ProgressionOptions {
                drivers: selected,
                include_outliers: *outliers,
            };
            let laps = load_laps(input)?;
            let view = build_session_view(session, view_mode, &laps, &options, &analysis);
            if let SessionView::NoData = view {
                return Err(empty("no data available for this session"));
            }
            write_output(output, &view, pretty)
        }
        Commands::FormatTime { seconds } => {
            println!("{}", format_duration(*seconds));
            Ok(())
        }
        Commands::InitConfig { force } => init_config(*force),
    }
}

fn init_logging(verbose: bool) {
    if verbose {
        colog::basic_builder()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        colog::init();
    }
}

fn main() {
    let cli = Args::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}", snafu::Report::from_error(e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lap_ref() {
        let lap = parse_lap_ref("VER:12").unwrap();
        assert_eq!(lap, LapRef::new("VER", 12));
        assert_eq!(parse_lap_ref(" LEC : 3 ").unwrap(), LapRef::new("LEC", 3));
    }

    #[test]
    fn test_parse_lap_ref_rejects_malformed_input() {
        for value in ["VER", "VER:", ":12", "VER:abc", "VER:0", "VER:-1"] {
            assert!(
                matches!(
                    parse_lap_ref(value),
                    Err(LapvizError::InvalidUserInput { .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "lapviz",
            "view",
            "--input",
            "laps.json",
            "--session",
            "Q",
            "--mode",
            "progression",
            "--driver",
            "VER",
            "--driver",
            "LEC",
            "--compact",
        ])
        .unwrap();
        assert!(args.compact);
        match args.command {
            Commands::View {
                session,
                mode,
                drivers,
                ..
            } => {
                assert_eq!(session, "Q");
                assert!(matches!(mode, ModeArg::Progression));
                assert_eq!(drivers, vec!["VER", "LEC"]);
            }
            other => panic!("Expected view command, got {:?}", other),
        }
    }

    #[test]
    fn test_fence_multiplier_is_range_checked_at_parse_time() {
        let args =
            Args::try_parse_from(["lapviz", "--fence-multiplier", "1.5", "format-time", "1"])
                .unwrap();
        assert_eq!(args.fence_multiplier, Some(1.5));

        for value in ["-1", "-0.25", "NaN", "inf", "abc"] {
            let err =
                Args::try_parse_from(["lapviz", "--fence-multiplier", value, "format-time", "1"])
                    .unwrap_err();
            assert_eq!(
                err.kind(),
                clap::error::ErrorKind::ValueValidation,
                "{value} should fail validation"
            );
        }
    }

    #[test]
    fn test_compare_needs_a_source() {
        assert!(Args::try_parse_from(["lapviz", "compare", "--lap", "VER:1"]).is_err());
        assert!(Args::try_parse_from(["lapviz", "format-time", "-5.4"]).is_ok());
    }
}
