use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vmerge",
    version,
    about = "Merge FiveM vehicle resources into a single streamed resource"
)]
pub struct Cli {
    /// Resource directories to merge, earliest first
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// The merge destination; must not already exist
    #[arg(short, long)]
    pub output: PathBuf,
    /// Print per-step progress information
    #[arg(short, long)]
    pub verbose: bool,
    /// Disable pretty-printing of merged meta documents
    #[arg(long = "no-lint")]
    pub no_lint: bool,
    /// Directory for the staging area (defaults to the platform temp dir)
    #[arg(long)]
    pub temp: Option<PathBuf>,
    /// Output a machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}
