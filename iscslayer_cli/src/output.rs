use std::io::Write;
use std::path::Path;

use anyhow::Result;
use iscslayer_lib::{PolicyFailure, PolicyRecord};
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Policy")]
    policy_number: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Company")]
    applicant_company: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Cost")]
    total_cost: String,
    #[tabled(rename = "Effective")]
    effective_date: String,
    #[tabled(rename = "Expiration")]
    expiration_date: String,
    #[tabled(rename = "Cancelled")]
    cancellation_date: String,
}

/// Failure row for the failed-policies CSV.
#[derive(Serialize)]
struct FailedRow<'a> {
    policy_number: &'a str,
    error: String,
}

// -- Row builders --

fn build_record_rows(records: &[PolicyRecord]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            policy_number: r.policy_number.clone(),
            status: r.status.clone(),
            applicant_company: r.applicant_company.clone(),
            state: r.state.clone(),
            program: r.program.clone(),
            total_cost: r.total_cost.clone(),
            effective_date: r.effective_date.clone(),
            expiration_date: r.expiration_date.clone(),
            cancellation_date: r.cancellation_date.clone().unwrap_or_default(),
        })
        .collect()
}

// -- Stdout output --

pub fn print_records_table(records: &[PolicyRecord]) {
    println!("{}", Table::new(build_record_rows(records)));
}

pub fn print_records_json(records: &[PolicyRecord]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

// -- CSV output --

pub fn write_records_csv(path: &Path, records: &[PolicyRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

pub fn write_failed_csv(path: &Path, failed: &[PolicyFailure]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for failure in failed {
        writer.serialize(FailedRow {
            policy_number: &failure.policy_number,
            error: failure.error.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_records<W: Write>(writer: &mut csv::Writer<W>, records: &[PolicyRecord]) -> Result<()> {
    for record in records {
        writer.serialize(record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PolicyRecord {
        PolicyRecord {
            policy_number: "SCB-GL-000077835".to_string(),
            app_id: "482913".to_string(),
            status: "Active".to_string(),
            applicant_company: "Acme Widgets LLC".to_string(),
            state: "TX".to_string(),
            program: "Contractors GL".to_string(),
            total_cost: "$1,250.00".to_string(),
            effective_date: "06/13/2025".to_string(),
            expiration_date: "06/13/2026".to_string(),
            cancellation_date: None,
        }
    }

    #[test]
    fn csv_columns_match_the_export_contract() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_records(&mut writer, &[sample_record()]).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "policy_number,app_id,status,applicant_company,state,program,total_cost,\
             effective_date,expiration_date,cancellation_date"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("SCB-GL-000077835,482913,Active"));
        assert!(row.ends_with("06/13/2025,06/13/2026,"));
    }

    #[test]
    fn cancellation_renders_blank_when_absent() {
        let rows = build_record_rows(&[sample_record()]);
        assert_eq!(rows[0].cancellation_date, "");
    }
}
