use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use quiz_tally::config::{self, Config, OutputFormat};
use quiz_tally::diagnostics::Diagnostics;
use quiz_tally::input::{self, LOG_EXTENSION, SET_EXTENSION};
use quiz_tally::output;
use quiz_tally::tally::{self, QuestionType};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tabulate quiz logs into individual and team results (default if no subcommand)
    Report(ReportArgs),
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// List the question-type codes in report order
    Types,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Question set files (.rtf). Accepts comma-separated lists and glob patterns
    #[arg(short, long, num_args = 1..)]
    sets: Vec<String>,

    /// Quiz log files (.csv). Accepts comma-separated lists and glob patterns
    #[arg(short, long, num_args = 1..)]
    logs: Vec<String>,

    /// Question types to report, e.g. "AGQ" (default: all)
    #[arg(short, long)]
    types: Option<String>,

    /// Field delimiter for text output
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Only tabulate this tournament
    #[arg(long)]
    tournament: Option<String>,

    /// Include the per-round score breakdown
    #[arg(short, long)]
    rounds: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    /// Command line values as a config layer to put over the file config
    fn overrides(&self) -> Config {
        Config {
            delimiter: self.delimiter.clone(),
            tournament: self.tournament.clone(),
            question_types: self.types.clone(),
            display_rounds: self.rounds.then_some(true),
            format: self.format,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "quiz-tally")]
#[command(about = "Quiz tournament statistics and team standings", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/quiz-tally/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(flatten)]
    report: ReportArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    // Warnings are printed once at the end of a run; keep the log quiet otherwise
    let default = if verbose { "quiz_tally=debug,warn" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);
    let command = cli.command.unwrap_or(Commands::Report(cli.report));

    let code = match command {
        Commands::Report(args) => run_report(args, config_path),
        Commands::Init { force } => run_init(config_path, force),
        Commands::Types => {
            for t in QuestionType::ALL {
                if t == QuestionType::M {
                    println!("{}  memory verse total (Q, R and V)", t);
                } else {
                    println!("{}", t);
                }
            }
            EXIT_SUCCESS
        }
    };

    std::process::exit(code);
}

fn run_init(config_path: Option<PathBuf>, force: bool) -> i32 {
    let path = match config_path {
        Some(p) => p,
        None => {
            if let Err(e) = config::ensure_config_dir() {
                eprintln!("Config error: {:#}", e);
                return EXIT_CONFIG;
            }
            match config::get_config_path() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    return EXIT_CONFIG;
                }
            }
        }
    };

    match config::write_default_config(&path, force) {
        Ok(()) => {
            println!("Wrote default config to {}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            EXIT_CONFIG
        }
    }
}

fn run_report(args: ReportArgs, config_path: Option<PathBuf>) -> i32 {
    let start_time = Instant::now();

    // Load config
    let file_config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            return EXIT_CONFIG;
        }
    };
    let merged = file_config.merge(args.overrides());

    if let Err(errors) = config::validate_config(&merged) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return EXIT_CONFIG;
    }
    let settings = merged.settings();
    debug!(
        types = %settings.question_types.iter().map(|t| t.as_char()).collect::<String>(),
        delimiter = %settings.delimiter,
        tournament = settings.tournament.as_deref().unwrap_or(""),
        "Report settings"
    );

    let set_paths = match input::resolve_paths(&args.sets, SET_EXTENSION, "question sets") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };
    let log_paths = match input::resolve_paths(&args.logs, LOG_EXTENSION, "quiz data") {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };

    let mut warnings = Diagnostics::new();
    let (types, set_warnings) = input::load_question_types(&set_paths);
    warnings.merge(set_warnings);
    let (records, log_warnings) = input::load_records(&log_paths);
    warnings.merge(log_warnings);

    let mut tabulation = tally::tabulate(records, &types, settings.tournament.as_deref());
    warnings.merge(std::mem::take(&mut tabulation.diagnostics));

    let report = match settings.format {
        OutputFormat::Csv => output::format_report(
            &tabulation,
            &settings.question_types,
            &settings.delimiter,
            settings.display_rounds,
        ),
        OutputFormat::Json => match output::format_json(&tabulation, &settings.question_types, &warnings) {
            Ok(json) => json + "\n",
            Err(e) => {
                eprintln!("Output error: failed to serialize report: {}", e);
                return EXIT_OUTPUT;
            }
        },
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = output::write_atomically(path, &report) {
                eprintln!("Output error: {:#}", e);
                return EXIT_OUTPUT;
            }
            info!(path = %path.display(), "Wrote report");
        }
        None => print!("{}", report),
    }

    if !warnings.is_empty() {
        eprintln!("{}", output::format_warnings(&warnings, output::should_use_colors()));
    }

    info!(
        quizzers = tabulation.directory.len(),
        teams = tabulation.rankings.len(),
        warnings = warnings.len(),
        "Finished in {:?}",
        start_time.elapsed()
    );

    EXIT_SUCCESS
}
