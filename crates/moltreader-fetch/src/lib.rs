//! Page retrieval and segment extraction adapters.
//!
//! - [`HttpPageRenderer`] implements [`PageRenderer`](moltreader_core::PageRenderer)
//!   with a plain reqwest GET.
//! - [`JsonSegmentExtractor`] implements
//!   [`SegmentExtractor`](moltreader_core::SegmentExtractor) for pages that
//!   are already a JSON list of `{speaker, text}` entries.
//!
//! Layout-specific HTML scraping is not provided; plug in a custom
//! extractor for that.

mod extractor;
mod renderer;

pub use extractor::{JsonSegmentExtractor, normalize_speaker, normalize_text};
pub use renderer::{HttpPageRenderer, RendererConfig};
