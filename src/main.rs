//! River crossing simulation CLI.
//!
//! Runs one simulation and writes its transcript to a file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use river_crossing::{CrossingError, FileTranscript, Simulation, SimulationConfig, SimulationReport};

#[derive(Parser)]
#[command(name = "river-crossing")]
#[command(about = "Hackers and serfs crossing a river, four at a time")]
struct Cli {
    /// totalPersons hackerIntervalMs serfIntervalMs cruiseDurationMs pierReturnBoundMs pierCapacity
    #[arg(allow_hyphen_values = true, value_name = "VALUES")]
    values: Vec<String>,

    /// Transcript file
    #[arg(long, short, default_value = "proj2.out")]
    output: PathBuf,

    /// Enable verbose output on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let err = CrossingError::argument_format("options", format!("{:?}", e.kind()));
            eprintln!("{}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match run(&cli) {
        Ok(report) => {
            debug!(?report, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            let code = e
                .downcast_ref::<CrossingError>()
                .map_or(1, CrossingError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<SimulationReport> {
    let config = SimulationConfig::from_args(cli.values.as_slice())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CrossingError::worker_creation("failed to start worker runtime", e))?;

    let transcript = FileTranscript::create(&cli.output)?;
    let simulation = Simulation::new(config, transcript)?;

    let result = runtime.block_on(simulation.run());
    simulation.teardown();
    Ok(result?)
}
