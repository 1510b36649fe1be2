use clap::{Parser, Subcommand};
use photocleaner::config::{self, CleanerConfig};
use photocleaner::types::TimestampSource;
use photocleaner::{output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status for any failed run.
const FAILURE: u8 = 255;

#[derive(Parser)]
#[command(name = "photocleaner")]
#[command(about = "Drop duplicate photos and re-archive the rest by year and month")]
#[command(long_about = "\
Drop duplicate photos and re-archive the rest by year and month

Every .jpg, .jpeg and .png under INPUT_PATH is decoded and fingerprinted by
its pixel histogram. Photos with identical fingerprints are duplicates; only
one of each set is kept. Survivors are copied (never moved) into OUTPUT_PATH:

  OUTPUT_PATH/
  ├── 2020/
  │   └── 03/
  │       └── 000000_A.jpg       # run-wide sequence + original name
  └── 2021/
      └── 11/
          └── 000001_C.png

The year and month come from each file's modification time (or creation
time with --timestamp created), in the local time zone.

Run 'photocleaner gen-config' to generate a documented photocleaner.toml.")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    /// Directory tree to scan for photos
    #[arg(required = true)]
    input_path: Option<PathBuf>,

    /// Directory to archive kept photos into (created if missing)
    #[arg(required = true)]
    output_path: Option<PathBuf>,

    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Filesystem timestamp used to date photos (overrides config)
    #[arg(long, value_enum)]
    timestamp: Option<TimestampSource>,

    /// Empty an existing output directory before archiving (overrides config)
    #[arg(long)]
    clear_output: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock photocleaner.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let (Some(input), Some(output_path)) = (cli.input_path, cli.output_path) else {
        return Err("INPUT_PATH and OUTPUT_PATH are required".into());
    };

    let mut cleaner_config = config::load_config(&cli.config)?;
    apply_overrides(&mut cleaner_config, cli.timestamp, cli.clear_output);
    init_thread_pool(&cleaner_config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = pipeline::run(&input, &output_path, &cleaner_config, Some(tx));
    printer.join().ok();

    let summary = result?;
    output::print_summary(&summary);
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(
    config: &mut CleanerConfig,
    timestamp: Option<TimestampSource>,
    clear_output: bool,
) {
    if let Some(source) = timestamp {
        config.archive.timestamp = source;
    }
    if clear_output {
        config.output.clear_existing = true;
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
