use clap::Parser;

mod cli;
mod domain;
mod services;

use crate::domain::models::MergeOptions;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let options = MergeOptions {
        output_path: Some(cli.output.clone()),
        temp_path: cli.temp.clone().unwrap_or_else(std::env::temp_dir),
        verbose: cli.verbose,
        lint_output: !cli.no_lint,
        ..MergeOptions::default()
    };
    let report = services::merger::merge(&cli.paths, &options)?;
    services::output::print_report(cli.json, &report)?;
    Ok(())
}
