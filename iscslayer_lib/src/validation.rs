//! Input cleanup for operator-supplied policy numbers.

use std::collections::HashSet;

/// Longest policy number we accept; anything beyond this is spreadsheet junk.
pub const MAX_POLICY_NUMBER_LENGTH: usize = 64;

/// Values spreadsheet exports produce for blank cells.
const JUNK_VALUES: &[&str] = &["nan", "NaN", "None"];

/// Cleans a raw policy-number column: strips ASCII control characters, trims
/// whitespace and surrounding quotes, drops blanks, junk values, and overlong
/// entries, and de-duplicates preserving first occurrence.
///
/// The batch orchestrator assumes its input has been through this.
pub fn prepare_policy_numbers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for value in raw {
        let value: String = value.chars().filter(|c| !c.is_ascii_control()).collect();
        let value = value
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        if value.is_empty() || value.len() > MAX_POLICY_NUMBER_LENGTH {
            continue;
        }
        if JUNK_VALUES.contains(&value) {
            continue;
        }
        if seen.insert(value.to_string()) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}
