//! Core services - orchestration between ports and domain logic.
//!
//! Services here don't know about concrete implementations; adapters inject
//! them through the port traits.

mod page_loader;

pub use page_loader::PageLoader;
