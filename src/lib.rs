//! clarifai-search: search client for the Clarifai platform
//!
//! Builds filter and rank queries over the inputs of an app, validates
//! user supplied filter documents before anything is sent, and pages
//! through the returned hits. The search engine itself runs server-side.

pub mod config;
pub mod error;
pub mod models;
pub mod network;
pub mod resources;
pub mod schema;
pub mod search;

pub use config::Settings;
pub use error::{Error, Result};
pub use models::{Hit, SearchResponse};
pub use network::ApiClient;
pub use resources::{App, Dataset, InputBuilder, Inputs, User, UPLOAD_BATCH_SIZE};
pub use schema::{Clause, ConceptFilter, InputType};
pub use search::{QueryPages, Search, SearchBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.clarifai.com";

/// Hits returned per query when pagination is off
pub const DEFAULT_TOP_K: usize = 10;

/// Hits requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
