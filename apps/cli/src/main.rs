//! ClauseGuard CLI: contract clause risk and compliance analysis.
//!
//! Segments uploaded contracts into clauses, classifies and risk-scores each
//! clause, and generates an augmented contract when mandatory HIPAA/GDPR
//! clauses are missing.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
