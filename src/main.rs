use clap::Parser;
use embedroute::cli::{run_cli, Cli};
use embedroute::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    run_cli(Cli::parse())
}
