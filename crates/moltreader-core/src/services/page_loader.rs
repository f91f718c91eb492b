//! Page loader - URL in, ordered segments out.

use std::sync::Arc;

use crate::domain::Segment;
use crate::error::{ExtractionError, FetchError, LoadError};
use crate::ports::{PageRenderer, SegmentExtractor};

/// Validates a URL, renders the page and extracts its segments.
///
/// Failures are surfaced as-is; nothing is retried.
#[derive(Clone)]
pub struct PageLoader {
    renderer: Arc<dyn PageRenderer>,
    extractor: Arc<dyn SegmentExtractor>,
    allowed_host: String,
}

impl PageLoader {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        extractor: Arc<dyn SegmentExtractor>,
        allowed_host: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            extractor,
            allowed_host: allowed_host.into(),
        }
    }

    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    /// Check that `url` is non-blank and mentions the allowed host.
    ///
    /// Returns the trimmed URL.
    pub fn validate_url<'a>(&self, url: &'a str) -> Result<&'a str, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::InvalidUrl("No URL provided".to_string()));
        }
        if !url.contains(self.allowed_host.as_str()) {
            return Err(FetchError::InvalidUrl(format!(
                "URL must be from {}",
                self.allowed_host
            )));
        }
        Ok(url)
    }

    /// Load `url` into segments in reading order.
    ///
    /// An empty result is reported as [`ExtractionError::NoContent`].
    pub async fn load(&self, url: &str) -> Result<Vec<Segment>, LoadError> {
        let url = self.validate_url(url)?;

        tracing::info!(%url, "Loading page");
        let markup = self.renderer.render(url).await?;
        let segments = self.extractor.extract(&markup)?;

        if segments.is_empty() {
            tracing::warn!(%url, "Page produced no segments");
            return Err(ExtractionError::NoContent.into());
        }

        tracing::info!(%url, count = segments.len(), "Loaded segments");
        Ok(segments)
    }
}

impl std::fmt::Debug for PageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageLoader")
            .field("allowed_host", &self.allowed_host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Renderer {}

        #[async_trait]
        impl PageRenderer for Renderer {
            async fn render(&self, url: &str) -> Result<String, FetchError>;
        }
    }

    mock! {
        Extractor {}

        impl SegmentExtractor for Extractor {
            fn extract(&self, raw_html: &str) -> Result<Vec<Segment>, ExtractionError>;
        }
    }

    fn loader(renderer: MockRenderer, extractor: MockExtractor) -> PageLoader {
        PageLoader::new(Arc::new(renderer), Arc::new(extractor), "moltbook.com")
    }

    #[tokio::test]
    async fn rejects_blank_url_without_rendering() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().never();
        let loader = loader(renderer, MockExtractor::new());

        let err = loader.load("   ").await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Fetch(FetchError::InvalidUrl("No URL provided".into()))
        );
    }

    #[tokio::test]
    async fn rejects_foreign_host() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().never();
        let loader = loader(renderer, MockExtractor::new());

        let err = loader.load("https://example.com/post/1").await.unwrap_err();
        assert_eq!(err.to_string(), "URL must be from moltbook.com");
    }

    #[tokio::test]
    async fn renders_trimmed_url_and_extracts() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .with(eq("https://moltbook.com/post/1"))
            .times(1)
            .returning(|_| Ok("<html/>".to_string()));

        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .with(eq("<html/>"))
            .returning(|_| Ok(vec![Segment::new("A", "hi"), Segment::new("B", "yo")]));

        let segments = loader(renderer, extractor)
            .load("  https://moltbook.com/post/1 ")
            .await
            .unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, "A");
    }

    #[tokio::test]
    async fn empty_extraction_is_no_content() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().returning(|_| Ok(String::new()));
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().returning(|_| Ok(Vec::new()));

        let err = loader(renderer, extractor)
            .load("https://moltbook.com/post/1")
            .await
            .unwrap_err();
        assert_eq!(err, LoadError::Extraction(ExtractionError::NoContent));
        assert_eq!(err.to_string(), "No posts or comments found on this page");
    }

    #[tokio::test]
    async fn fetch_errors_surface_verbatim() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .times(1)
            .returning(|_| Err(FetchError::Timeout));
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().never();

        let err = loader(renderer, extractor)
            .load("https://moltbook.com/post/1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Page load timed out. Please try again.");
    }
}
