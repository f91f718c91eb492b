//! Axum web adapter for moltreader.
//!
//! Serves the web variant of the reader: the browser loads a page into a
//! server-side session, then fetches one MP3 per segment and plays them in
//! order itself. Sessions are keyed by the `x-session-key` header.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session_store;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use session_store::InMemorySessionStore;
pub use state::AppState;
