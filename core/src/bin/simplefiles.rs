/// SimpleFiles CLI
///
/// Runs, checks and inspects SimpleFiles programs.
use clap::Parser;
use simplefiles_core::cli::{run_cli_with_args, Cli, Outcome};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run_cli_with_args(&cli, &config) {
        Ok(Outcome::Success) => {}
        Ok(Outcome::Failure) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
