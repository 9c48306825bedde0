use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;

use wafer_grid::{
    compute_from_spans, BoundaryDieConstraints, BoundaryDieSolver, BoundaryModel,
    ClassifiedDie, Derivation, DieGridParams, DomainError, GridClassifier, LogFormat,
    SpanDieConstraints, WaferIoError, WaferMapConfig, WaferSpec, DEFAULT_SCRIBE_WIDTH_MM,
    DEFAULT_WAFER_DIAMETER_MM,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    WaferIo(#[from] WaferIoError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "wafer-grid", version, about = "Derive and classify wafer die grids")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit log lines as JSON objects.
    #[arg(long, global = true)]
    log_json: bool,

    /// Write JSON output to this file instead of stdout.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive die size and offset from integer boundary indices and die counts.
    Boundary(BoundaryArgs),
    /// Derive die size and offset from real-valued boundary spans and die counts.
    Span(SpanArgs),
    /// Classify the dies of an explicit grid.
    Classify(ClassifyArgs),
    /// Run a JSON wafer map config and emit the report.
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct BoundaryArgs {
    #[arg(long, allow_negative_numbers = true)]
    diex_min: i32,
    #[arg(long, allow_negative_numbers = true)]
    diex_max: i32,
    #[arg(long, allow_negative_numbers = true)]
    diey_min: i32,
    #[arg(long, allow_negative_numbers = true)]
    diey_max: i32,
    #[arg(long)]
    die_count_at_xmin: u32,
    #[arg(long)]
    die_count_at_xmax: u32,
    #[arg(long)]
    die_count_at_ymin: u32,
    #[arg(long)]
    die_count_at_ymax: u32,
    #[arg(long, default_value_t = DEFAULT_WAFER_DIAMETER_MM)]
    diameter: f64,
    /// Solve the chord at `index·pitch` instead of the tangent point.
    #[arg(long)]
    exact_chord: bool,
    /// Also list the dies of the observed range lying fully on the wafer.
    #[arg(long)]
    list_dies: bool,
}

#[derive(Args, Debug)]
struct SpanArgs {
    #[arg(long, allow_negative_numbers = true)]
    xmin: f64,
    #[arg(long, allow_negative_numbers = true)]
    xmax: f64,
    #[arg(long, allow_negative_numbers = true)]
    ymin: f64,
    #[arg(long, allow_negative_numbers = true)]
    ymax: f64,
    #[arg(long)]
    xmin_count: u32,
    #[arg(long)]
    xmax_count: u32,
    #[arg(long)]
    ymin_count: u32,
    #[arg(long)]
    ymax_count: u32,
    #[arg(long, default_value_t = DEFAULT_WAFER_DIAMETER_MM)]
    diameter: f64,
    #[arg(long, default_value_t = DEFAULT_SCRIBE_WIDTH_MM)]
    scribe_width: f64,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    #[arg(long)]
    die_width: f64,
    #[arg(long)]
    die_height: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset_x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset_y: f64,
    #[arg(long, default_value_t = DEFAULT_WAFER_DIAMETER_MM)]
    diameter: f64,
    #[arg(long, default_value_t = DEFAULT_SCRIBE_WIDTH_MM)]
    scribe_width: f64,
    #[arg(long, default_value_t = 0.0, conflicts_with = "display_exclusion")]
    edge_exclusion: f64,
    /// Use the edge exclusion of wafer map renderings.
    #[arg(long)]
    display_exclusion: bool,
}

impl BoundaryArgs {
    fn constraints(&self) -> BoundaryDieConstraints {
        BoundaryDieConstraints {
            diex_min: self.diex_min,
            diex_max: self.diex_max,
            diey_min: self.diey_min,
            diey_max: self.diey_max,
            die_count_at_xmin: self.die_count_at_xmin,
            die_count_at_xmax: self.die_count_at_xmax,
            die_count_at_ymin: self.die_count_at_ymin,
            die_count_at_ymax: self.die_count_at_ymax,
        }
    }

    fn model(&self) -> BoundaryModel {
        if self.exact_chord {
            BoundaryModel::ExactChord
        } else {
            BoundaryModel::CardinalTangent
        }
    }
}

impl SpanArgs {
    fn constraints(&self) -> SpanDieConstraints {
        SpanDieConstraints {
            xmin: self.xmin,
            xmax: self.xmax,
            ymin: self.ymin,
            ymax: self.ymax,
            xmin_count: self.xmin_count,
            xmax_count: self.xmax_count,
            ymin_count: self.ymin_count,
            ymax_count: self.ymax_count,
        }
    }
}

impl ClassifyArgs {
    fn config(&self) -> WaferMapConfig {
        let wafer = WaferSpec::new(self.diameter, self.scribe_width);
        let wafer = if self.display_exclusion {
            wafer.with_display_exclusion()
        } else {
            wafer.with_edge_exclusion(self.edge_exclusion)
        };
        WaferMapConfig {
            wafer,
            derivation: Derivation::Explicit {
                params: DieGridParams::new(
                    self.die_width,
                    self.die_height,
                    self.offset_x,
                    self.offset_y,
                ),
            },
        }
    }
}

/// Boundary solve plus its fully-inside die listing.
#[derive(Serialize, Debug)]
struct BoundaryListing {
    params: DieGridParams,
    inside_count: usize,
    dies: Vec<ClassifiedDie>,
}

fn emit<T: Serialize>(value: &T, output: Option<&PathBuf>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let output = cli.output.as_ref();
    match cli.command {
        Command::Boundary(args) => {
            let constraints = args.constraints();
            let params = BoundaryDieSolver::new(args.model()).solve(&constraints, args.diameter)?;
            if !args.list_dies {
                return emit(&params, output);
            }
            let map = GridClassifier::new(WaferSpec::new(args.diameter, 0.0))
                .fully_inside_in_range(&constraints, &params)?;
            log::info!("{} dies fully inside the wafer", map.inside_count);
            emit(
                &BoundaryListing {
                    params,
                    inside_count: map.inside_count,
                    dies: map.dies,
                },
                output,
            )
        }
        Command::Span(args) => {
            let params = compute_from_spans(&args.constraints(), args.diameter, args.scribe_width)?;
            emit(&params, output)
        }
        Command::Classify(args) => {
            let report = args.config().run()?;
            log::info!(
                "{} dies: {} inside, {} edge",
                report.total,
                report.inside_count,
                report.edge_count
            );
            emit(&report, output)
        }
        Command::Run { config } => {
            let cfg = WaferMapConfig::load_json(&config)?;
            log::info!(
                "loaded {} ({} strategy)",
                config.display(),
                cfg.derivation.strategy_name()
            );
            let report = cfg.run()?;
            log::info!(
                "{} dies: {} inside, {} edge",
                report.total,
                report.inside_count,
                report.edge_count
            );
            emit(&report, output)
        }
    }
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter, format: LogFormat) {
    if let Err(err) = wafer_grid::init_logger(level, format) {
        eprintln!("failed to install logger: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter, format: LogFormat) {
    if !wafer_grid::init_tracing(level, format) {
        eprintln!("failed to install tracing subscriber");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_logging(log_level(cli.verbose), format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
