//! Search module
//!
//! Turns validated rank and filter clauses into input searches and pages
//! through the hits.

mod executor;
mod pager;

pub use executor::{Search, SearchBuilder};
pub use pager::QueryPages;
