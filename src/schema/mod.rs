//! Rank and filter schema
//!
//! Validates user supplied rank/filter documents and converts them to the
//! wire query. Clauses in a list are ANDed; conditions inside one clause are
//! ORed by the server.

mod clause;

pub use clause::{Clause, ConceptFilter, GeoPointFilter, InputType};

use crate::error::Result;
use serde_json::Value;

/// Validate a list of JSON rank clauses
pub fn validate_ranks(ranks: &[Value]) -> Result<Vec<Clause>> {
    ranks.iter().map(Clause::rank_from_json).collect()
}

/// Validate a list of JSON filter clauses
pub fn validate_filters(filters: &[Value]) -> Result<Vec<Clause>> {
    filters.iter().map(Clause::from_json).collect()
}
