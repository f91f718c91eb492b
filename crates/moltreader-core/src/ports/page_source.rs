//! Page retrieval and segment extraction ports.
//!
//! Both collaborators sit outside the reusable core: rendering may be a plain
//! HTTP fetch or a headless browser, and extraction is layout-specific. The
//! core only relies on the shapes below.

use async_trait::async_trait;

use crate::domain::Segment;
use crate::error::{ExtractionError, FetchError};

/// Retrieves the fully rendered markup for a URL.
///
/// Implementations own their timeouts (page load, selector waits) and map
/// failures to [`FetchError`].
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, FetchError>;
}

/// Turns rendered markup into segments in reading order.
///
/// Returning an empty list is allowed here; the loader decides that an empty
/// page is an error.
pub trait SegmentExtractor: Send + Sync {
    fn extract(&self, raw_html: &str) -> Result<Vec<Segment>, ExtractionError>;
}
