use clap::Parser;
use vocab_cli::{Cli, run};
use vocab_core::{LoggingDestination, init_logging, load_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let destination = if cli.verbose {
        LoggingDestination::FileAndStderr
    } else {
        LoggingDestination::FileOnly
    };
    if let Err(err) = init_logging(destination) {
        eprintln!("Warning: logging disabled: {err}");
    }

    let load = load_config();
    for warning in &load.warnings {
        eprintln!("Warning: {warning}");
    }

    if let Err(err) = run(cli, &load.config).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
