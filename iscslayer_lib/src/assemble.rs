//! Per-policy assembly: search-row fetch, detail fetch, and field merge.

use crate::client::PortalSession;
use crate::error::SlayerError;
use crate::extract::{extract_detail_dates, parse_summary_row};
use crate::types::PolicyRecord;

/// Builds one [`PolicyRecord`] for `policy_number`.
///
/// The search-results row supplies the identity and summary columns and must
/// exist; a missing row is a failure. The detail page supplies authoritative
/// dates but is best-effort: when that fetch fails the record is emitted with
/// summary data only, which beats losing the policy altogether.
///
/// Merge precedence: detail-page effective/expiration dates override the
/// summary values only when the extractor actually produced them; the
/// cancellation date only ever comes from the detail page.
///
/// Holds no state between calls; any number of assemblies may run
/// concurrently against the same session.
pub async fn assemble_record(
    session: &PortalSession,
    policy_number: &str,
) -> Result<PolicyRecord, SlayerError> {
    let summary_html = session.fetch_summary(policy_number).await?;
    let row = parse_summary_row(&summary_html, policy_number)
        .ok_or_else(|| SlayerError::PolicyNotFound(policy_number.to_string()))?;

    let mut record = PolicyRecord {
        policy_number: policy_number.to_string(),
        app_id: row.app_id,
        status: row.status,
        applicant_company: row.applicant_company,
        state: row.state,
        program: row.program,
        total_cost: row.total_cost,
        effective_date: row.effective_date,
        expiration_date: String::new(),
        cancellation_date: None,
    };

    let detail_html = match session.fetch_detail(&record.app_id).await {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(
                "Detail fetch failed for policy {} (app {}), keeping summary data: {}",
                policy_number,
                record.app_id,
                err
            );
            return Ok(record);
        }
    };

    let dates = extract_detail_dates(&detail_html);
    if let Some(effective) = dates.effective_date {
        record.effective_date = effective;
    }
    if let Some(expiration) = dates.expiration_date {
        record.expiration_date = expiration;
    }
    record.cancellation_date = dates.cancellation_date;

    Ok(record)
}
