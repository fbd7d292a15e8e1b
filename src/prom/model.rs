use std::fmt;
use std::str::FromStr;

/// The metric kinds a `# TYPE` line can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Untyped,
}

impl FromStr for MetricType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "histogram" => Ok(MetricType::Histogram),
            "summary" => Ok(MetricType::Summary),
            "untyped" => Ok(MetricType::Untyped),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
            MetricType::Untyped => "untyped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataKind<'a> {
    Help(&'a str),
    Type(MetricType),
}

/// One unit of the exposition stream. All text borrows from the scraped body.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    /// Any `#` line that is not `HELP` or `TYPE`; holds the text after the `#`.
    Comment(&'a str),
    Metadata {
        metric: &'a str,
        kind: MetadataKind<'a>,
    },
    /// `series` is the metric name and label block exactly as they appeared.
    Series {
        series: &'a str,
        value: f64,
        timestamp: Option<i64>,
    },
}

/// A sample that survived filtering, ready to be written out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub series: &'a str,
    pub value: f64,
    pub timestamp_ms: i64,
}

impl fmt::Display for Sample<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6} {}", self.series, self.value, self.timestamp_ms)
    }
}
