//! Detail-page and search-results field extraction.
//!
//! Everything that knows about the portal's markup lives here: the label
//! texts, the row classes, and the positional column contract. A portal
//! layout change should only ever require touching this module.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

/// Date fields pulled from a policy detail page.
///
/// All optional: the portal renders several layout variants and some omit
/// fields entirely. A missing cancellation date simply means the policy is
/// not cancelled.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailDates {
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub cancellation_date: Option<String>,
}

/// Fields pulled from a policy's row in the advanced-search results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub app_id: String,
    pub status: String,
    pub applicant_company: String,
    pub state: String,
    pub program: String,
    pub total_cost: String,
    pub effective_date: String,
}

/// Extracts policy-term and cancellation dates from detail-page markup.
///
/// Term extraction tries three strategies in order and stops at the first
/// hit: the `Policy Term:` label followed anywhere by a `MM/DD/YYYY -
/// MM/DD/YYYY` range, the label/value definition-list structure, and finally
/// any plausible date range on the page. Returns an empty set when nothing
/// matches; callers keep whatever dates they already have.
pub fn extract_detail_dates(html: &str) -> DetailDates {
    extract_detail_dates_in_year(html, Local::now().year())
}

fn extract_detail_dates_in_year(html: &str, current_year: i32) -> DetailDates {
    let mut dates = DetailDates {
        cancellation_date: cancellation_date(html),
        ..DetailDates::default()
    };

    let term = term_after_label(html)
        .or_else(|| term_from_definition_list(html))
        .or_else(|| term_unanchored(html, current_year));

    match term {
        Some((effective, expiration)) => {
            dates.effective_date = Some(effective);
            dates.expiration_date = Some(expiration);
        }
        None => {
            tracing::warn!("No policy term found in detail page with any strategy");
        }
    }

    dates
}

/// Cancelled policies carry a `Cancellation Date:` entry in the detail
/// definition list. Tries the strict label+date form first, then falls back
/// to capturing the whole value element and fishing the first date out of
/// it. No match means the policy is not cancelled.
fn cancellation_date(html: &str) -> Option<String> {
    let strict =
        Regex::new(r"(?s)Cancellation Date:\s*</dt>\s*<dd[^>]*>\s*(\d{2}/\d{2}/\d{4})").ok()?;
    if let Some(cap) = strict.captures(html) {
        return Some(cap[1].trim().to_string());
    }

    let loose = Regex::new(r"(?s)Cancellation Date:\s*</dt>\s*<dd[^>]*>([^<]+)</dd>").ok()?;
    let value = loose.captures(html)?;
    let embedded = Regex::new(r"(\d{2}/\d{2}/\d{4})").ok()?;
    embedded
        .captures(&value[1])
        .map(|cap| cap[1].to_string())
}

/// The `Policy Term:` label followed anywhere (non-greedy, across markup) by
/// a hyphenated date range. The label anchor makes false positives unlikely,
/// so the match is accepted unconditionally.
fn term_after_label(html: &str) -> Option<(String, String)> {
    let re = Regex::new(r"(?s)Policy Term:.*?(\d{2}/\d{2}/\d{4})\s*-\s*(\d{2}/\d{2}/\d{4})").ok()?;
    let cap = re.captures(html)?;
    Some((cap[1].trim().to_string(), cap[2].trim().to_string()))
}

/// A `<dt>Policy Term:</dt>` element immediately followed by a value
/// element. Splits the value text on a hyphen; succeeds only when that
/// yields exactly two non-empty parts. Catches layouts where the dates are
/// not in the strict `MM/DD/YYYY` shape the label scan requires.
fn term_from_definition_list(html: &str) -> Option<(String, String)> {
    let re = Regex::new(r"(?s)<dt[^>]*>Policy Term:</dt>\s*<dd[^>]*>([^<]+)</dd>").ok()?;
    let cap = re.captures(html)?;
    let parts: Vec<&str> = cap[1].split('-').map(str::trim).collect();
    match parts.as_slice() {
        [start, end] if !start.is_empty() && !end.is_empty() => {
            Some((start.to_string(), end.to_string()))
        }
        _ => None,
    }
}

/// No label anchor at all. Some detail variants drop the label entirely, so
/// scan the whole document for date ranges in order and take the first one
/// that parses and looks like a real policy term: starts no earlier than last
/// year, ends within two years, and ends strictly after it starts. The
/// window keeps audit timestamps and other stray ranges from winning.
fn term_unanchored(html: &str, current_year: i32) -> Option<(String, String)> {
    let re = Regex::new(r"(\d{2}/\d{2}/\d{4})\s*-\s*(\d{2}/\d{2}/\d{4})").ok()?;
    for cap in re.captures_iter(html) {
        let (start_raw, end_raw) = (&cap[1], &cap[2]);
        let Ok(start) = NaiveDate::parse_from_str(start_raw, "%m/%d/%Y") else {
            continue;
        };
        let Ok(end) = NaiveDate::parse_from_str(end_raw, "%m/%d/%Y") else {
            continue;
        };
        if start.year() >= current_year - 1 && end.year() <= current_year + 2 && end > start {
            return Some((start_raw.to_string(), end_raw.to_string()));
        }
        tracing::debug!("Rejected implausible date range {} - {}", start_raw, end_raw);
    }
    None
}

/// Finds the search-results row for `policy_number` and maps its cells.
///
/// Column positions are a fixed contract with the portal: `[0]` checkbox,
/// `[1]` app id, `[2]` policy number, `[3]` status, `[4]` applicant company,
/// `[5]` state, `[6]` program, `[7]` total cost, `[8]` effective date. Some
/// layouts render only 8 cells; those drop the effective-date column and the
/// detail page supplies the date instead. The portal emits single-quoted
/// attributes.
pub fn parse_summary_row(html: &str, policy_number: &str) -> Option<SummaryRow> {
    let row_re = Regex::new(&format!(
        r"(?s)<tr[^>]*class='[^']*itemRow[^']*'[^>]*data-id='(\d+)'[^>]*>.*?{}.*?</tr>",
        regex::escape(policy_number)
    ))
    .ok()?;
    let row_cap = row_re.captures(html)?;
    let app_id = row_cap[1].to_string();
    let row_html = row_cap.get(0)?.as_str();

    let cell_re = Regex::new(r"(?s)<td[^>]*>(.*?)</td>").ok()?;
    let cells: Vec<String> = cell_re
        .captures_iter(row_html)
        .map(|cap| clean_cell_text(&cap[1]))
        .collect();

    let mut row = SummaryRow {
        app_id,
        status: String::new(),
        applicant_company: String::new(),
        state: String::new(),
        program: String::new(),
        total_cost: String::new(),
        effective_date: String::new(),
    };
    if cells.len() >= 8 {
        row.status = cells[3].clone();
        row.applicant_company = cells[4].clone();
        row.state = cells[5].clone();
        row.program = cells[6].clone();
        row.total_cost = cells[7].clone();
    }
    if cells.len() >= 9 {
        row.effective_date = cells[8].clone();
    }
    Some(row)
}

/// Strips tags and common entity artifacts from a table cell and collapses
/// whitespace.
fn clean_cell_text(cell: &str) -> String {
    let tagless = match Regex::new(r"<[^>]+>") {
        Ok(re) => re.replace_all(cell, "").into_owned(),
        Err(_) => cell.to_string(),
    };
    let decoded = tagless
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
