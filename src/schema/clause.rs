//! Filter and rank clauses
//!
//! A clause is one object in a `ranks` or `filters` list. JSON clauses are
//! checked against a closed schema: unknown keys anywhere (top level,
//! `geo_point`, concept objects) are rejected, as are out-of-range values.

use crate::error::{Error, Result};
use crate::models::{
    Annotation, Concept, Data, Filter, Geo, GeoLimit, GeoPoint, Input, Media, Rank, Status, Text,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Media type of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Image,
    Text,
    Audio,
    Video,
}

impl InputType {
    /// Name used in filter documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(Error::user(format!(
                "Invalid input type '{}': expected one of image, text, audio, video",
                other
            ))),
        }
    }
}

/// Concept condition; `value` 1 means present, 0 means absent
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptFilter {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ConceptFilter {
    /// Concept matched by name; `present = false` asks for its absence
    pub fn named(name: impl Into<String>, present: bool) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            value: Some(if present { 1.0 } else { 0.0 }),
            language: None,
        }
    }

    /// Concept matched by id
    pub fn with_id(id: impl Into<String>, present: bool) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            value: Some(if present { 1.0 } else { 0.0 }),
            language: None,
        }
    }

    fn validate(&self) -> Result<()> {
        let has_id = self.id.as_deref().is_some_and(|s| !s.is_empty());
        let has_name = self.name.as_deref().is_some_and(|s| !s.is_empty());
        if !has_id && !has_name {
            return Err(invalid("concept needs a non-empty 'id' or 'name'"));
        }
        if self.id.as_deref() == Some("") || self.name.as_deref() == Some("") {
            return Err(invalid("concept 'id' and 'name' must not be empty strings"));
        }
        if self.language.as_deref() == Some("") {
            return Err(invalid("concept 'language' must not be empty"));
        }
        if let Some(v) = self.value {
            if v != 0.0 && v != 1.0 {
                return Err(invalid(format!("concept value must be 0 or 1, got {}", v)));
            }
        }
        Ok(())
    }

    fn to_concept(&self) -> Concept {
        Concept {
            id: self.id.clone(),
            name: self.name.clone(),
            value: Some(self.value.unwrap_or(1.0) as f32),
            language: self.language.clone(),
        }
    }
}

/// Geo condition: inputs within `geo_limit` kilometers of a point
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPointFilter {
    pub longitude: f64,
    pub latitude: f64,
    pub geo_limit: u32,
}

impl GeoPointFilter {
    fn validate(&self) -> Result<()> {
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(format!("longitude {} out of range", self.longitude)));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid(format!("latitude {} out of range", self.latitude)));
        }
        Ok(())
    }

    fn to_geo(self) -> Geo {
        Geo {
            geo_point: Some(GeoPoint {
                longitude: self.longitude,
                latitude: self.latitude,
            }),
            geo_limit: Some(GeoLimit::kilometers(f64::from(self.geo_limit))),
        }
    }
}

/// Shape of a JSON clause before semantic checks
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClause {
    image_url: Option<String>,
    image_bytes: Option<String>,
    text_raw: Option<String>,
    metadata: Option<Map<String, Value>>,
    geo_point: Option<GeoPointFilter>,
    concepts: Option<Vec<ConceptFilter>>,
    input_types: Option<Vec<InputType>>,
    input_dataset_ids: Option<Vec<String>>,
    input_status_code: Option<u32>,
}

/// A validated rank or filter clause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    pub image_url: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    pub text_raw: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub geo_point: Option<GeoPointFilter>,
    pub concepts: Vec<ConceptFilter>,
    pub input_types: Vec<InputType>,
    pub input_dataset_ids: Vec<String>,
    pub input_status_code: Option<u32>,
}

impl Clause {
    /// Empty clause
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate one JSON clause
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: RawClause = serde_json::from_value(value.clone()).map_err(invalid)?;

        let image_bytes = match raw.image_bytes {
            Some(encoded) => Some(
                base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| invalid(format!("image_bytes is not valid base64: {}", e)))?,
            ),
            None => None,
        };

        let clause = Self {
            image_url: raw.image_url,
            image_bytes,
            text_raw: raw.text_raw,
            metadata: raw.metadata,
            geo_point: raw.geo_point,
            concepts: raw.concepts.unwrap_or_default(),
            input_types: raw.input_types.unwrap_or_default(),
            input_dataset_ids: raw.input_dataset_ids.unwrap_or_default(),
            input_status_code: raw.input_status_code,
        };
        clause.validate()?;
        Ok(clause)
    }

    /// Parse a JSON clause for use as a rank
    pub fn rank_from_json(value: &Value) -> Result<Self> {
        let clause = Self::from_json(value)?;
        clause.validate_rank()?;
        Ok(clause)
    }

    /// Semantic checks shared by JSON and builder clauses
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.image_url {
            url::Url::parse(url)
                .map_err(|e| invalid(format!("image_url '{}' is not a valid URL: {}", url, e)))?;
        }
        if self.text_raw.as_deref() == Some("") {
            return Err(invalid("text_raw must not be empty"));
        }
        if let Some(ref geo) = self.geo_point {
            geo.validate()?;
        }
        for concept in &self.concepts {
            concept.validate()?;
        }
        Ok(())
    }

    /// Ranks only compare annotations, so input keys are rejected
    pub fn validate_rank(&self) -> Result<()> {
        self.validate()?;
        if self.has_input_part() {
            return Err(invalid(
                "ranks do not support input_types, input_dataset_ids or input_status_code",
            ));
        }
        Ok(())
    }

    /// Rank or filter by an image URL
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Rank or filter by raw image bytes
    pub fn image_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            image_bytes: Some(bytes.into()),
            ..Default::default()
        }
    }

    /// Rank or filter by raw text
    pub fn text(raw: impl Into<String>) -> Self {
        Self {
            text_raw: Some(raw.into()),
            ..Default::default()
        }
    }

    /// Add a concept condition
    pub fn with_concept(mut self, concept: ConceptFilter) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Match inputs whose metadata contains `metadata`
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Match inputs within `limit_km` of a point
    pub fn with_geo_point(mut self, longitude: f64, latitude: f64, limit_km: u32) -> Self {
        self.geo_point = Some(GeoPointFilter {
            longitude,
            latitude,
            geo_limit: limit_km,
        });
        self
    }

    /// Match inputs of this type
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_types.push(input_type);
        self
    }

    /// Match inputs in this dataset
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.input_dataset_ids.push(dataset_id.into());
        self
    }

    /// Match inputs with this status code
    pub fn with_status_code(mut self, code: u32) -> Self {
        self.input_status_code = Some(code);
        self
    }

    fn has_input_part(&self) -> bool {
        !self.input_types.is_empty()
            || !self.input_dataset_ids.is_empty()
            || self.input_status_code.is_some()
    }

    /// Annotation half of the clause, `None` if it sets no annotation keys
    pub fn annotation_data(&self) -> Option<Data> {
        let mut data = Data::default();

        if let Some(ref url) = self.image_url {
            data.image = Some(Media::url(url.clone()));
        }
        if let Some(ref bytes) = self.image_bytes {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            let image = data.image.get_or_insert_with(Media::default);
            image.base64 = Some(encoded);
        }
        if let Some(ref raw) = self.text_raw {
            data.text = Some(Text {
                raw: Some(raw.clone()),
                url: None,
            });
        }
        data.concepts = self.concepts.iter().map(ConceptFilter::to_concept).collect();
        data.metadata = self.metadata.clone();
        data.geo = self.geo_point.map(GeoPointFilter::to_geo);

        (!data.is_empty()).then_some(data)
    }

    /// Input half of the clause, `None` if it sets no input keys
    pub fn input_filter(&self) -> Option<Input> {
        let mut data = Data::default();
        for input_type in &self.input_types {
            let marker = Some(Media::default());
            match input_type {
                InputType::Image => data.image = marker,
                InputType::Video => data.video = marker,
                InputType::Audio => data.audio = marker,
                InputType::Text => data.text = Some(Text::default()),
            }
        }

        let input = Input {
            id: String::new(),
            data: (!data.is_empty()).then_some(data),
            dataset_ids: self.input_dataset_ids.clone(),
            status: self.input_status_code.map(Status::with_code),
        };

        (!input.is_empty()).then_some(input)
    }

    /// Wire form as a filter, `None` for an empty clause
    pub fn to_filter(&self) -> Option<Filter> {
        let annotation = self
            .annotation_data()
            .map(|data| Annotation { data: Some(data) });
        let input = self.input_filter();
        if annotation.is_none() && input.is_none() {
            return None;
        }
        Some(Filter { annotation, input })
    }

    /// Wire form as a rank, `None` for an empty clause
    pub fn to_rank(&self) -> Option<Rank> {
        self.annotation_data().map(|data| Rank {
            annotation: Some(Annotation { data: Some(data) }),
        })
    }
}

fn invalid(err: impl fmt::Display) -> Error {
    Error::user(format!("Invalid rank or filter input: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_user_error(value: Value) {
        let err = Clause::from_json(&value).unwrap_err();
        assert!(err.is_user_error(), "expected user error, got {:?}", err);
    }

    #[test]
    fn test_geo_point_clause() {
        let clause = Clause::from_json(&json!({
            "geo_point": {"longitude": -29.0, "latitude": 40.0, "geo_limit": 10}
        }))
        .unwrap();
        let filter = clause.to_filter().unwrap();
        assert!(filter.input.is_none());
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"annotation": {"data": {"geo": {
                "geo_point": {"longitude": -29.0, "latitude": 40.0},
                "geo_limit": {"type": "withinKilometers", "value": 10.0}
            }}}})
        );
    }

    #[test]
    fn test_geo_point_extra_key() {
        assert_user_error(json!({
            "geo_point": {"longitude": -29.0, "latitude": 40.0, "geo_limit": 10, "extra": 1}
        }));
    }

    #[test]
    fn test_geo_point_missing_key() {
        assert_user_error(json!({"geo_point": {"longitude": -29.0, "latitude": 40.0}}));
    }

    #[test]
    fn test_concepts_keep_order() {
        let clause = Clause::from_json(&json!({
            "concepts": [{"name": "deer", "value": 1}, {"name": "dog", "value": 1}]
        }))
        .unwrap();
        let data = clause.annotation_data().unwrap();
        let names: Vec<_> = data.concepts.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["deer", "dog"]);
    }

    #[test]
    fn test_concept_unknown_key() {
        assert_user_error(json!({
            "concepts": [{"value": 1, "concept_id": "deer"}, {"name": "dog", "value": 1}]
        }));
    }

    #[test]
    fn test_concept_value_out_of_range() {
        assert_user_error(json!({
            "concepts": [{"name": "deer", "value": 2}, {"name": "dog", "value": 1}]
        }));
    }

    #[test]
    fn test_concept_needs_id_or_name() {
        assert_user_error(json!({"concepts": [{"value": 0}]}));
        assert_user_error(json!({"concepts": [{"name": "", "value": 1}]}));
    }

    #[test]
    fn test_concept_default_value() {
        let clause = Clause::from_json(&json!({"concepts": [{"id": "dog"}]})).unwrap();
        let data = clause.annotation_data().unwrap();
        assert_eq!(data.concepts[0].value, Some(1.0));
    }

    #[test]
    fn test_unknown_input_type() {
        assert_user_error(json!({"input_types": ["imaage"]}));
    }

    #[test]
    fn test_unknown_filter_key() {
        assert_user_error(json!({"input_id": "test"}));
    }

    #[test]
    fn test_non_object_clause() {
        assert_user_error(json!("concepts"));
        assert_user_error(json!({"input_status_code": "30000"}));
    }

    #[test]
    fn test_invalid_image_url() {
        assert_user_error(json!({"image_url": "not a url"}));
    }

    #[test]
    fn test_invalid_image_bytes() {
        assert_user_error(json!({"image_bytes": "%%%"}));
    }

    #[test]
    fn test_input_and_annotation_parts_split() {
        let clause = Clause::from_json(&json!({
            "concepts": [{"name": "dog", "value": 1}],
            "input_types": ["text", "audio", "video"],
            "input_status_code": 30000
        }))
        .unwrap();
        let filter = serde_json::to_value(clause.to_filter().unwrap()).unwrap();
        assert_eq!(
            filter["input"],
            json!({"data": {"video": {}, "audio": {}, "text": {}}, "status": {"code": 30000}})
        );
        assert_eq!(filter["annotation"]["data"]["concepts"][0]["name"], "dog");
    }

    #[test]
    fn test_dataset_filter() {
        let clause = Clause::from_json(&json!({"input_dataset_ids": ["random_dataset"]})).unwrap();
        let filter = clause.to_filter().unwrap();
        assert!(filter.annotation.is_none());
        assert_eq!(filter.input.unwrap().dataset_ids, vec!["random_dataset"]);
    }

    #[test]
    fn test_empty_clause() {
        let clause = Clause::from_json(&json!({})).unwrap();
        assert!(clause.to_filter().is_none());
        assert!(clause.to_rank().is_none());
    }

    #[test]
    fn test_rank_rejects_input_keys() {
        let err = Clause::rank_from_json(&json!({"input_types": ["image"]})).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_rank_by_image_url() {
        let rank = Clause::rank_from_json(&json!({"image_url": "https://samples.clarifai.com/dog.tiff"}))
            .unwrap()
            .to_rank()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&rank).unwrap(),
            json!({"annotation": {"data": {"image": {"url": "https://samples.clarifai.com/dog.tiff"}}}})
        );
    }

    #[test]
    fn test_builder_matches_json() {
        let built = Clause::new()
            .with_concept(ConceptFilter::named("dog", true))
            .with_input_type(InputType::Image)
            .with_status_code(30000);
        let parsed = Clause::from_json(&json!({
            "concepts": [{"name": "dog", "value": 1}],
            "input_types": ["image"],
            "input_status_code": 30000
        }))
        .unwrap();
        assert_eq!(built.to_filter(), parsed.to_filter());
    }

    #[test]
    fn test_builder_still_validated() {
        let clause = Clause::new().with_geo_point(200.0, 0.0, 5);
        assert!(clause.validate().unwrap_err().is_user_error());
    }

    #[test]
    fn test_input_type_from_str() {
        assert_eq!("video".parse::<InputType>().unwrap(), InputType::Video);
        assert!("imaage".parse::<InputType>().is_err());
    }
}
