//! Input construction and upload

use crate::error::{Error, Result};
use crate::models::{Concept, Data, Geo, GeoPoint, Input, Media, Text};
use crate::network::{ApiClient, UserAppId};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Maximum inputs sent in one upload request
pub const UPLOAD_BATCH_SIZE: usize = 128;

/// Builds an [`Input`] with optional labels, geo info and metadata
#[derive(Debug, Clone)]
pub struct InputBuilder {
    id: String,
    data: Data,
    dataset_id: Option<String>,
    labels: Vec<String>,
    geo_info: Option<Vec<f64>>,
    metadata: Option<Map<String, Value>>,
}

impl InputBuilder {
    fn with_data(id: impl Into<String>, data: Data) -> Self {
        Self {
            id: id.into(),
            data,
            dataset_id: None,
            labels: Vec::new(),
            geo_info: None,
            metadata: None,
        }
    }

    /// Image input fetched from `url`
    pub fn image_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_data(
            id,
            Data {
                image: Some(Media::url(url)),
                ..Default::default()
            },
        )
    }

    /// Image input uploaded inline
    pub fn image_bytes(id: impl Into<String>, bytes: &[u8]) -> Self {
        Self::with_data(
            id,
            Data {
                image: Some(Media::base64(
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                )),
                ..Default::default()
            },
        )
    }

    /// Video input fetched from `url`
    pub fn video_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_data(
            id,
            Data {
                video: Some(Media::url(url)),
                ..Default::default()
            },
        )
    }

    /// Audio input fetched from `url`
    pub fn audio_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_data(
            id,
            Data {
                audio: Some(Media::url(url)),
                ..Default::default()
            },
        )
    }

    /// Raw text input
    pub fn text(id: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::with_data(
            id,
            Data {
                text: Some(Text {
                    raw: Some(raw.into()),
                    url: None,
                }),
                ..Default::default()
            },
        )
    }

    /// Text input fetched from `url`
    pub fn text_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_data(
            id,
            Data {
                text: Some(Text {
                    raw: None,
                    url: Some(url.into()),
                }),
                ..Default::default()
            },
        )
    }

    /// Add the input to a dataset
    pub fn dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Tag the input with present concepts, one per label
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// `[longitude, latitude]`
    pub fn geo_info(mut self, geo_info: &[f64]) -> Self {
        self.geo_info = Some(geo_info.to_vec());
        self
    }

    /// Attach free-form metadata
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Finish the input; an empty id is replaced with a random one
    pub fn build(self) -> Result<Input> {
        let mut data = self.data;

        if let Some(geo_info) = self.geo_info {
            let (longitude, latitude) = match geo_info.as_slice() {
                [longitude, latitude] => (*longitude, *latitude),
                _ => {
                    return Err(Error::user(format!(
                        "geo_info must be [longitude, latitude], got {} values",
                        geo_info.len()
                    )))
                }
            };
            data.geo = Some(Geo {
                geo_point: Some(GeoPoint {
                    longitude,
                    latitude,
                }),
                geo_limit: None,
            });
        }

        data.concepts = self
            .labels
            .iter()
            .map(|label| Concept {
                id: Some(format!("id-{}", label.replace(' ', ""))),
                name: Some(label.clone()),
                value: Some(1.0),
                language: None,
            })
            .collect();
        data.metadata = self.metadata;

        let id = if self.id.is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            self.id
        };

        Ok(Input {
            id,
            data: Some(data),
            dataset_ids: self.dataset_id.into_iter().collect(),
            status: None,
        })
    }
}

#[derive(Serialize)]
struct PostInputsRequest<'a> {
    inputs: &'a [Input],
}

#[derive(Debug, Default, Deserialize)]
struct MultiInputResponse {
    #[serde(default)]
    inputs: Vec<Input>,
}

#[derive(Serialize)]
struct DeleteInputsRequest<'a> {
    ids: &'a [String],
}

#[derive(Deserialize)]
struct EmptyResponse {}

/// Input operations of one app
#[derive(Clone)]
pub struct Inputs {
    client: ApiClient,
    user_app: UserAppId,
}

impl Inputs {
    /// Input operations for one app
    pub fn new(client: ApiClient, user_app: UserAppId) -> Self {
        Self { client, user_app }
    }

    /// Upload inputs in batches, returning the ids accepted by the platform
    pub async fn upload_inputs(&self, inputs: &[Input]) -> Result<Vec<String>> {
        if inputs.is_empty() {
            return Err(Error::user("No inputs to upload"));
        }

        let path = self.user_app.path("inputs");
        let mut ids = Vec::with_capacity(inputs.len());

        for (batch_no, batch) in inputs.chunks(UPLOAD_BATCH_SIZE).enumerate() {
            debug!("Uploading batch {} ({} inputs)", batch_no + 1, batch.len());
            let response: MultiInputResponse = self
                .client
                .post(&path, &PostInputsRequest { inputs: batch })
                .await?;
            ids.extend(response.inputs.into_iter().map(|input| input.id));
        }

        info!(
            "Uploaded {} inputs to {}/{}",
            ids.len(),
            self.user_app.user_id,
            self.user_app.app_id
        );
        Ok(ids)
    }

    /// List one page of inputs
    pub async fn list_inputs(&self, page: u32, per_page: u32) -> Result<Vec<Input>> {
        let response: MultiInputResponse = self
            .client
            .get(
                &self.user_app.path("inputs"),
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(response.inputs)
    }

    pub async fn delete_inputs(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let _: EmptyResponse = self
            .client
            .delete(&self.user_app.path("inputs"), Some(&DeleteInputsRequest { ids }))
            .await?;
        info!("Deleted {} inputs", ids.len());
        Ok(())
    }
}
