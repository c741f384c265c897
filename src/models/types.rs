//! Resource types shared by the input and search endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code returned on success
pub const SUCCESS: u32 = 10000;

/// Input status once the platform has fetched the media
pub const INPUT_DOWNLOAD_SUCCESS: u32 = 30000;

/// Status block attached to every response and to stored inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl Status {
    /// Status carrying only `code`
    pub fn with_code(code: u32) -> Self {
        Self {
            code,
            ..Default::default()
        }
    }

    /// Whether the code is SUCCESS
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS
    }
}

/// Media reference: either a URL or inline base64 content.
///
/// An empty value serializes to `{}`, which input filters use as a
/// "has this media type" marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl Media {
    /// Media hosted at `url`
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            base64: None,
        }
    }

    /// Inline media, already base64 encoded
    pub fn base64(encoded: impl Into<String>) -> Self {
        Self {
            url: None,
            base64: Some(encoded.into()),
        }
    }
}

/// Text payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A labelled concept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLimit {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

impl GeoLimit {
    /// Radius in kilometers
    pub fn kilometers(value: f64) -> Self {
        Self {
            kind: "withinKilometers".to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_point: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_limit: Option<GeoLimit>,
}

/// Content of an input or an annotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

impl Data {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Data::default()
    }
}

/// A stored input, or the input half of a search filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dataset_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl Input {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
            && self.data.as_ref().map_or(true, Data::is_empty)
            && self.dataset_ids.is_empty()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
