//! Parsing of newline-delimited TLD lists.
//!
//! The format is the one IANA publishes: a header line, then one suffix per
//! line. Entries containing `--` (punycode) form the hyphen-permitted class.

use hilite_core::TldList;

use crate::error::TldError;

/// Parse a TLD list body.
///
/// The first line is always skipped; blank lines and `#` comments are
/// ignored; entries are lowercased.
pub fn parse_tld_list(body: &str) -> Result<TldList, TldError> {
    let mut entries = Vec::new();
    for (index, raw) in body.lines().enumerate().skip(1) {
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        if !entry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TldError::Malformed {
                line: index + 1,
                content: entry.to_string(),
            });
        }
        entries.push(entry.to_ascii_lowercase());
    }

    let list = TldList::from_entries(entries);
    if list.is_empty() {
        return Err(TldError::Empty);
    }
    tracing::debug!(
        main = list.main.len(),
        hyphenated = list.hyphenated.len(),
        "parsed TLD list"
    );
    Ok(list)
}
