use boardbank::interfaces::cli::{self, Cli};
use clap::Parser;
use miette::Result;
use std::io;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.log_level());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(cli, &mut out).await
}
