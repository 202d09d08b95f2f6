//! `fieldforge` command line tool.
//!
//! Run with: `cargo run -p fieldforge -- generate --schema fields.xml`

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    cli::Cli::parse().run()
}
