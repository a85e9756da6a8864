//! The batch command: read policy numbers, drive the orchestrator, write CSVs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use iscslayer_lib::iscslayer_api::Client;
use iscslayer_lib::{run_batch, validation, BatchResult, PortalSession};

use crate::output::{self, OutputFormat};

/// Batch-run CLI arguments.
#[derive(Args)]
pub struct RunArgs {
    /// Input CSV containing a policy_number column
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the enriched records
    #[arg(long, default_value = "enriched_data.csv")]
    pub output: PathBuf,

    /// Where to write the failed policy numbers
    #[arg(long, default_value = "failed_policies.csv")]
    pub failed: PathBuf,

    /// Maximum concurrent policy pipelines
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    /// Portal username (falls back to ISC_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Portal password (falls back to ISC_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Portal base URL override
    #[arg(long)]
    pub base_url: Option<String>,

    /// Stdout preview format: table or json
    #[arg(long, default_value = "table")]
    pub format: String,
}

pub async fn run(args: &RunArgs) -> Result<()> {
    let username = credential(args.username.as_deref(), "ISC_USERNAME")?;
    let password = credential(args.password.as_deref(), "ISC_PASSWORD")?;

    let format = match args.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let policy_numbers = read_policy_numbers(&args.input)?;
    if policy_numbers.is_empty() {
        bail!(
            "no valid policy numbers found in {}",
            args.input.display()
        );
    }
    eprintln!("Processing {} policy numbers...", policy_numbers.len());

    let client = match &args.base_url {
        Some(base) => Client::with_base_url(base)?,
        None => Client::new()?,
    };
    let session = PortalSession::new(client);

    session
        .authenticate(&username, &password)
        .await
        .context("login failed; check credentials")?;

    let pb = ProgressBar::new(policy_numbers.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
        )
        .unwrap(),
    );
    pb.set_message("fetching policies...");

    let result = run_batch(
        Arc::new(session),
        &policy_numbers,
        args.concurrency,
        |progress| {
            pb.set_position(progress.completed as u64);
            pb.set_message(format!(
                "{} ok, {} failed",
                progress.succeeded, progress.failed
            ));
        },
    )
    .await;

    pb.finish_with_message(format!(
        "{} ok, {} failed",
        result.succeeded(),
        result.failed_count()
    ));

    output::write_records_csv(&args.output, &result.records)
        .with_context(|| format!("writing {}", args.output.display()))?;
    if !result.failed.is_empty() {
        output::write_failed_csv(&args.failed, &result.failed)
            .with_context(|| format!("writing {}", args.failed.display()))?;
    }

    print_summary(&result, &format, args)
}

fn read_policy_numbers(path: &Path) -> Result<Vec<String>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("policy_number"))
        .context("input CSV must have a policy_number column")?;

    let mut raw = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(column) {
            raw.push(value.to_string());
        }
    }
    Ok(validation::prepare_policy_numbers(raw))
}

fn credential(flag: Option<&str>, env_key: &str) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value.to_string());
    }
    std::env::var(env_key)
        .with_context(|| format!("{} is not set and no flag was given", env_key))
}

fn print_summary(result: &BatchResult, format: &OutputFormat, args: &RunArgs) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if !result.records.is_empty() {
                output::print_records_table(&result.records);
            }
        }
        OutputFormat::Json => output::print_records_json(&result.records)?,
    }

    eprintln!();
    eprintln!(
        "Done: {}/{} policies enriched, {} failed",
        result.succeeded(),
        result.attempted,
        result.failed_count()
    );
    eprintln!("Results written to {}", args.output.display());
    if !result.failed.is_empty() {
        eprintln!(
            "Failed policy numbers (also in {}):",
            args.failed.display()
        );
        for failure in &result.failed {
            eprintln!("  {} - {}", failure.policy_number, failure.error);
        }
    }
    Ok(())
}
