//! Turns parser entries into output records.
//!
//! The only state carried between entries is the carry-forward timestamp,
//! passed explicitly from one [`step`] to the next.

use std::io::{self, Write};

use super::model::{Entry, MetadataKind, Sample};
use super::parser::ParseEntryError;
use crate::output::RecordWriter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformSummary {
    pub emitted: usize,
    pub skipped: usize,
}

/// Applies one entry to the carry-forward timestamp `carry`.
///
/// Returns the sample to emit, if any, and the carry-forward value for the
/// next entry. An explicit timestamp always becomes the new carry-forward
/// value, even when the sample itself is dropped for a NaN or infinite value.
pub fn step(entry: Entry<'_>, carry: i64) -> (Option<Sample<'_>>, i64) {
    match entry {
        Entry::Series {
            series,
            value,
            timestamp,
        } => {
            let carry = timestamp.unwrap_or(carry);
            if !value.is_finite() {
                return (None, carry);
            }
            let sample = Sample {
                series,
                value,
                timestamp_ms: carry,
            };
            (Some(sample), carry)
        }
        Entry::Comment(_) | Entry::Metadata { .. } => (None, carry),
    }
}

/// Drains `entries` into `out` in scan order, starting the carry-forward
/// timestamp at `scrape_start_ms`. Bad lines are logged and skipped; only a
/// write failure stops the scan.
pub fn transform<'a, I, W>(
    entries: I,
    scrape_start_ms: i64,
    out: &mut RecordWriter<W>,
) -> io::Result<TransformSummary>
where
    I: IntoIterator<Item = Result<Entry<'a>, ParseEntryError>>,
    W: Write,
{
    let mut summary = TransformSummary::default();
    let mut carry = scrape_start_ms;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping malformed exposition {err}");
                summary.skipped += 1;
                continue;
            }
        };
        if let Entry::Metadata {
            metric,
            kind: MetadataKind::Type(metric_type),
        } = &entry
        {
            log::debug!("{metric} declared as {metric_type}");
        }
        let (sample, next) = step(entry, carry);
        carry = next;
        if let Some(sample) = sample {
            out.write_sample(&sample)?;
            summary.emitted += 1;
        }
    }
    Ok(summary)
}
