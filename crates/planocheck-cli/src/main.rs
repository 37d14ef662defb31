//! Planocheck - retail shelf compliance auditing
//!
//! A CLI tool that compares shelf photos against store planograms.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,planocheck=debug"
    } else {
        "warn,planocheck=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = commands::execute(cli) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
