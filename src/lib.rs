//! Scrapes a Prometheus text-format endpoint once and writes every usable
//! sample as a `<series> <value> <timestamp-ms>` line.

use std::io::{self, Write};

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;
pub mod prom;
pub mod scheme;

use crate::config::ScrapeConfig;
use crate::output::RecordWriter;
use crate::prom::{FetchError, MetricScraper, Parser, TransformSummary};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write records")]
    Output(#[from] io::Error),
}

/// Runs one scrape of `config` and writes the accepted samples to `out`.
///
/// Samples without their own timestamp are stamped with the wall clock taken
/// just before the request is sent.
pub async fn scrape_into<W: Write>(
    config: &ScrapeConfig,
    out: W,
) -> Result<TransformSummary, ScrapeError> {
    let scraper = MetricScraper::new(config)?;
    let scrape_start = chrono::Utc::now().timestamp_millis();
    let body = scraper.scrape().await?;

    let mut writer = RecordWriter::new(out);
    let summary = prom::transform(Parser::new(&body), scrape_start, &mut writer)?;
    writer.finish()?;
    Ok(summary)
}
