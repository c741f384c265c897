//! API payload types
//!
//! JSON shapes exchanged with the v2 REST API. Empty fields are skipped on
//! serialization so requests only carry what the caller set.

mod search;
mod types;

pub use search::*;
pub use types::*;
