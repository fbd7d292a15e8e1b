mod model;
pub use self::model::Entry;
pub use self::model::MetadataKind;
pub use self::model::MetricType;
pub use self::model::Sample;
pub mod parser;
pub use self::parser::{ParseEntryError, ParseErrorKind, Parser};

mod transform;
pub use self::transform::{step, transform, TransformSummary};

mod metric_scraper;
pub use self::metric_scraper::{scrape_url, FetchError, MetricScraper};

#[doc(hidden)]
pub mod test_data;
