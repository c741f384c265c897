//! App handle

use super::dataset::Dataset;
use super::inputs::Inputs;
use crate::error::Result;
use crate::models;
use crate::network::{ApiClient, UserAppId};
use crate::search::{Search, SearchBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize)]
struct PostDatasetsRequest {
    datasets: Vec<models::Dataset>,
}

#[derive(Deserialize)]
struct MultiDatasetResponse {
    #[serde(default)]
    datasets: Vec<models::Dataset>,
}

/// An app owned by a user
#[derive(Clone)]
pub struct App {
    client: ApiClient,
    user_app: UserAppId,
}

impl App {
    /// Handle on an existing app
    pub fn new(client: ApiClient, user_app: UserAppId) -> Self {
        Self { client, user_app }
    }

    /// App id
    pub fn id(&self) -> &str {
        &self.user_app.app_id
    }

    /// Owner and app ids
    pub fn user_app(&self) -> &UserAppId {
        &self.user_app
    }

    pub async fn create_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let request = PostDatasetsRequest {
            datasets: vec![models::Dataset {
                id: dataset_id.to_string(),
                description: None,
            }],
        };
        let response: MultiDatasetResponse = self
            .client
            .post(&self.user_app.path("datasets"), &request)
            .await?;
        let id = response
            .datasets
            .into_iter()
            .next()
            .map(|d| d.id)
            .unwrap_or_else(|| dataset_id.to_string());

        info!("Created dataset {} in app {}", id, self.user_app.app_id);
        Ok(self.dataset(id))
    }

    /// Handle to an existing dataset
    pub fn dataset(&self, dataset_id: impl Into<String>) -> Dataset {
        Dataset::new(dataset_id, self.inputs())
    }

    /// Input operations of this app
    pub fn inputs(&self) -> Inputs {
        Inputs::new(self.client.clone(), self.user_app.clone())
    }

    /// Search builder scoped to this app
    pub fn search(&self) -> SearchBuilder {
        Search::builder(
            self.client.clone(),
            self.user_app.user_id.clone(),
            self.user_app.app_id.clone(),
        )
    }
}
