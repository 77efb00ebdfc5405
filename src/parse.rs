use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::{fmt, str::FromStr};
use tracing::{debug, trace, warn};

use crate::record::Record;

/// How rows whose field count disagrees with the header are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Short rows omit their missing columns; surplus fields are dropped.
    #[default]
    Lenient,
    /// Any field-count mismatch fails the whole parse.
    Strict,
}

impl ParsePolicy {
    pub fn as_str(&self) -> &str {
        match self {
            ParsePolicy::Lenient => "lenient",
            ParsePolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParsePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ParsePolicy::Lenient),
            "strict" => Ok(ParsePolicy::Strict),
            other => bail!("unknown parse policy `{}` (expected lenient or strict)", other),
        }
    }
}

/// Parse CSV `text` whose first row names the columns.
///
/// Every later row becomes one [`Record`]. Lines with no content are
/// skipped rather than emitted as empty records, and a leading UTF-8 BOM is
/// ignored. An empty input yields no records.
pub fn parse_records(text: &str, policy: ParsePolicy) -> Result<Vec<Record>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    // flexible so whitespace-only lines reach `is_blank` instead of failing
    // the field-count check inside the reader
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().context("reading CSV header row")?.clone();
    debug!(columns = headers.len(), ?headers, "parsed header");

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        let line = row.position().map_or(0, |p| p.line());

        if is_blank(&row, &headers) {
            trace!(line, "skipping blank line");
            continue;
        }

        if row.len() != headers.len() {
            match policy {
                ParsePolicy::Strict => bail!(
                    "line {}: expected {} fields, found {}",
                    line,
                    headers.len(),
                    row.len()
                ),
                ParsePolicy::Lenient if row.len() > headers.len() => warn!(
                    line,
                    expected = headers.len(),
                    found = row.len(),
                    "dropping surplus fields"
                ),
                ParsePolicy::Lenient => {}
            }
        }

        records.push(headers.iter().zip(row.iter()).collect());
    }

    Ok(records)
}

/// A lone whitespace-only field on a multi-column header is a stray blank
/// line. With a single column that same row is a real (empty) value and is
/// kept.
fn is_blank(row: &StringRecord, headers: &StringRecord) -> bool {
    headers.len() > 1 && row.len() == 1 && row.get(0).map_or(true, |f| f.trim().is_empty())
}
