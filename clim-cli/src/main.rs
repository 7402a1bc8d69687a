//! CLIM CLI - Command line tool for daily temperature series statistics.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "clim-cli",
    version,
    about = "Daily temperature series aggregation toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: clim_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("running {:?}", cli.command);
    clim_cmd::run(cli.command)
}
