//! Demo unspooler CLI.
//!
//! A command-line tool for inspecting demo recordings and extracting
//! per-tick entity records.
//!
//! # Usage
//!
//! ```bash
//! # Show header and frame statistics
//! demoreel info match.dem
//!
//! # Stream records as JSON lines
//! demoreel unspool match.dem --path "$.players[*].health" --tick-freq 66
//!
//! # List players
//! demoreel roster match.dem
//!
//! # Record the map bounds each time they change
//! demoreel bounds match.dem --class world
//!
//! # Check that every frame decodes
//! demoreel validate match.dem --verbose
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use demoreel::bounds::WORLD_CLASS;
use demoreel::unspool::{DEFAULT_JSON_PATH, DEFAULT_TICK_FREQ};
use demoreel::{DemoFile, DemoHeader, DemoStats, Profile, Record, StateTable};

/// Demo recording unspooler.
#[derive(Parser)]
#[command(name = "demoreel")]
#[command(about = "Unspool demo recordings into per-tick entity records", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display header information and frame statistics
    Info {
        /// Path to the demo file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Evaluate a path query at sampled ticks
    Unspool {
        /// Path to the demo file
        file: PathBuf,

        /// Path query selecting the records
        #[arg(short, long, default_value = DEFAULT_JSON_PATH)]
        path: String,

        /// Sample every N ticks
        #[arg(short, long, default_value_t = DEFAULT_TICK_FREQ)]
        tick_freq: u32,

        /// Output format
        #[arg(short, long, default_value = "json")]
        output: OutputFormat,
    },

    /// Record the entities of one class whenever their state changes
    Bounds {
        /// Path to the demo file
        file: PathBuf,

        /// Entity class to follow
        #[arg(short, long, default_value = WORLD_CLASS)]
        class: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        output: OutputFormat,
    },

    /// List the players found in the recording
    Roster {
        /// Path to the demo file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Validate a demo file
    Validate {
        /// Path to the demo file
        file: PathBuf,

        /// Show detailed validation results
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Pretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file, output } => cmd_info(&file, &output),
        Commands::Unspool {
            file,
            path,
            tick_freq,
            output,
        } => cmd_unspool(&file, &path, tick_freq, &output),
        Commands::Bounds {
            file,
            class,
            output,
        } => cmd_bounds(&file, &class, &output),
        Commands::Roster { file, output } => cmd_roster(&file, &output),
        Commands::Validate { file, verbose } => cmd_validate(&file, verbose),
    }
}

fn read_file(file: &Path) -> Option<Vec<u8>> {
    match std::fs::read(file) {
        Ok(data) => Some(data),
        Err(e) => {
            eprintln!("Error reading file: {e}");
            None
        }
    }
}

// ============================================================================
// Info Command
// ============================================================================

#[derive(Serialize)]
struct InfoOutput {
    file_size: usize,
    header: DemoHeader,
    statistics: DemoStats,
}

fn cmd_info(file: &Path, output: &OutputFormat) -> ExitCode {
    let Some(data) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    let demo = match DemoFile::parse(&data) {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Error parsing header: {e}");
            return ExitCode::FAILURE;
        }
    };

    let statistics = match DemoStats::from_frames(demo.frames()) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error decoding frames: {e}");
            return ExitCode::FAILURE;
        }
    };

    let info = InfoOutput {
        file_size: data.len(),
        header: demo.header().clone(),
        statistics,
    };

    match output {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Pretty => print_info(&info),
    }

    ExitCode::SUCCESS
}

fn print_info(info: &InfoOutput) {
    let header = &info.header;
    println!("=== Demo Information ===\n");
    println!("File Size:        {} bytes", info.file_size);
    println!("Demo Protocol:    {}", header.demo_protocol);
    println!("Network Protocol: {}", header.network_protocol);
    println!("Server:           {}", header.server_name);
    println!("Client:           {}", header.client_name);
    println!("Map:              {}", header.map_name);
    println!("Game Directory:   {}", header.game_directory);
    println!("Duration:         {}", header.duration_string());
    println!("Ticks:            {}", header.tick_count);
    println!("Tick Interval:    {:.4}s", header.tick_interval());

    let stats = &info.statistics;
    println!("\n=== Frames ===\n");
    println!("Frames decoded:   {}", stats.frame_count);
    if let (Some(first), Some(last)) = (stats.first_tick, stats.last_tick) {
        println!("Tick range:       {first}..={last}");
    }
    println!("Skipped bytes:    {}", stats.skipped_bytes);
    if !stats.message_counts.is_empty() {
        println!("\nMessages by Kind:");
        for (kind, count) in &stats.message_counts {
            println!("  {kind:<20} {count:>8}");
        }
    }
}

// ============================================================================
// Unspool Command
// ============================================================================

fn cmd_unspool(file: &Path, path: &str, tick_freq: u32, output: &OutputFormat) -> ExitCode {
    let Some(data) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    let records = match demoreel::unspool(&data, path, tick_freq) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    for record in records {
        match record {
            Ok(record) => print_record(&record, output),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_record(record: &Record, output: &OutputFormat) {
    match output {
        OutputFormat::Json => match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error serializing to JSON: {e}"),
        },
        OutputFormat::Pretty => {
            let values: Vec<String> = record
                .values
                .iter()
                .map(|(path, value)| format!("{path}={value}"))
                .collect();
            println!(
                "[{:>6}] #{:<5} {}",
                record.tick,
                record.entity,
                values.join(" ")
            );
        }
    }
}

// ============================================================================
// Bounds Command
// ============================================================================

fn cmd_bounds(file: &Path, class: &str, output: &OutputFormat) -> ExitCode {
    let Some(data) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    match demoreel::bounds(&data, class) {
        Ok(records) => {
            for record in &records {
                print_record(record, output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Roster Command
// ============================================================================

fn cmd_roster(file: &Path, output: &OutputFormat) -> ExitCode {
    let Some(data) = read_file(file) else {
        return ExitCode::FAILURE;
    };

    let players = match demoreel::roster(&data) {
        Ok(players) => players,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Json => print_json(&players),
        OutputFormat::Pretty => print_roster(&players),
    }

    ExitCode::SUCCESS
}

fn print_roster(players: &[Profile]) {
    println!("=== Players ({}) ===", players.len());
    for player in players {
        println!(
            "  Slot {:>2}: {} (from tick {})",
            player.slot, player.name, player.first_tick
        );
    }
}

// ============================================================================
// Validate Command
// ============================================================================

/// Decoding stages, in the order they run.
const STAGES: [&str; 3] = ["Header parsing", "Frame decoding", "State reconstruction"];

/// Outcome of validating one demo file.
#[derive(Debug, Default)]
struct Validation {
    /// Number of stages that completed, a prefix of [`STAGES`].
    passed: usize,
    error: Option<String>,
    warnings: Vec<String>,
}

impl Validation {
    fn is_valid(&self) -> bool {
        self.passed == STAGES.len() && self.error.is_none()
    }

    fn fail(mut self, error: impl std::fmt::Display) -> Self {
        self.error = Some(format!("{} failed: {error}", STAGES[self.passed]));
        self
    }
}

fn cmd_validate(file: &Path, verbose: bool) -> ExitCode {
    let validation = match std::fs::read(file) {
        Ok(data) => validate_demo(&data),
        Err(e) => Validation {
            error: Some(format!("Failed to read file: {e}")),
            ..Validation::default()
        },
    };

    let verdict = if validation.is_valid() { "VALID" } else { "INVALID" };
    if verbose {
        print_validation(&validation, file);
        println!("\nResult: {verdict}");
    } else {
        println!("{}: {verdict}", file.display());
    }

    if validation.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn validate_demo(data: &[u8]) -> Validation {
    let mut validation = Validation::default();

    let demo = match DemoFile::parse(data) {
        Ok(demo) => demo,
        Err(e) => return validation.fail(e),
    };
    validation.passed += 1;

    let stats = match DemoStats::from_frames(demo.frames()) {
        Ok(stats) => stats,
        Err(e) => return validation.fail(e),
    };
    validation.passed += 1;

    let declared = demo.header().frame_count;
    if usize::try_from(declared).map_or(true, |declared| declared != stats.frame_count) {
        validation.warnings.push(format!(
            "Frame count mismatch: header declares {declared}, decoded {}",
            stats.frame_count
        ));
    }

    let mut table = StateTable::new();
    for frame in demo.frames() {
        if let Err(e) = frame.and_then(|frame| table.apply(&frame)) {
            return validation.fail(e);
        }
    }
    validation.passed += 1;

    if table.snapshot().is_empty() {
        validation
            .warnings
            .push("No entities alive at the end of the recording".to_string());
    }

    validation
}

fn print_validation(validation: &Validation, file: &Path) {
    println!("Validating: {}\n", file.display());

    println!("Checks:");
    for (i, stage) in STAGES.iter().enumerate() {
        let icon = if i < validation.passed {
            "[OK]"
        } else if i == validation.passed && validation.error.is_some() {
            "[FAIL]"
        } else {
            "[SKIP]"
        };
        println!("  {stage:<22} {icon}");
    }

    if let Some(error) = &validation.error {
        println!("\nError:\n  - {error}");
    }
    if !validation.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &validation.warnings {
            println!("  - {warning}");
        }
    }
}

fn print_json<T: Serialize + ?Sized>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing to JSON: {e}"),
    }
}
