//! Progress/warning reporting and report printing.

use crate::domain::models::{JsonOut, MergeReport};

/// Info lines are dropped unless verbose mode is on; warnings always reach
/// stderr and never affect the run's outcome.
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if self.verbose {
            println!("{}", message.as_ref());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        eprintln!("warning: {}", message.as_ref());
    }
}

pub fn print_report(json: bool, report: &MergeReport) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: report
            })?
        );
    } else {
        for b in &report.bundles {
            let status = if b.skipped { "skipped" } else { "merged" };
            println!(
                "{}\t{}\t{}\t{} grouped assets",
                status,
                b.name,
                b.data_files.join(","),
                b.grouped_assets
            );
        }
        println!("output written to {}", report.output.display());
    }
    Ok(())
}
