//! Search request and response payloads

use super::types::{Data, Input, Status};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

/// Ranks order hits by similarity to the annotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

/// Filters restrict hits by annotation content and input properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranks: Vec<Rank>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

/// Distance metric used for ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    #[default]
    EuclideanDistance,
    CosineDistance,
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "euclidean" => Ok(Self::EuclideanDistance),
            "cosine" => Ok(Self::CosineDistance),
            other => Err(Error::user(format!(
                "Metric should be either cosine or euclidean, got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    #[default]
    NearestNeighbor,
    BruteForce,
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nearest_neighbor" => Ok(Self::NearestNeighbor),
            "brute_force" => Ok(Self::BruteForce),
            other => Err(Error::user(format!(
                "Algorithm should be either nearest_neighbor or brute_force, got '{}'",
                other
            ))),
        }
    }
}

/// One search: a query plus how to score it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBody {
    pub query: Query,
    pub metric: Metric,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

/// Body of `POST /v2/users/{user}/apps/{app}/inputs/searches`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostInputsSearchesRequest {
    pub searches: Vec<SearchBody>,
    pub pagination: Pagination,
}

/// A matched input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub input: Input,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub hits: Vec<Hit>,
}
