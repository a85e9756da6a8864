//! Starter-CSV generator for operators.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Sample policy numbers in the portal's format.
const SAMPLE_POLICY_NUMBERS: &[&str] = &[
    "ISCPC04000058472",
    "ISCPC04000058215",
    "ISCPC04000058337",
];

/// Template CLI arguments.
#[derive(Args)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(long, default_value = "isc_template.csv")]
    pub output: PathBuf,
}

pub fn run(args: &TemplateArgs) -> Result<()> {
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    writer.write_record(["policy_number"])?;
    for sample in SAMPLE_POLICY_NUMBERS {
        writer.write_record([*sample])?;
    }
    writer.flush()?;
    eprintln!("Template written to {}", args.output.display());
    Ok(())
}
