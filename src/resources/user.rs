//! User account: app management

use super::app::App;
use crate::error::Result;
use crate::models;
use crate::network::{user_path, ApiClient, UserAppId};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize)]
struct PostAppsRequest {
    apps: Vec<models::App>,
}

#[derive(Deserialize)]
struct MultiAppResponse {
    #[serde(default)]
    apps: Vec<models::App>,
}

#[derive(Deserialize)]
struct EmptyResponse {}

/// Account-level operations for one user
#[derive(Clone)]
pub struct User {
    client: ApiClient,
    user_id: String,
}

impl User {
    /// Handle on the account `user_id`
    pub fn new(client: ApiClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }

    /// User id
    pub fn id(&self) -> &str {
        &self.user_id
    }

    /// Create an app using `base_workflow` (e.g. "General") as its default workflow
    pub async fn create_app(&self, app_id: &str, base_workflow: &str) -> Result<App> {
        let request = PostAppsRequest {
            apps: vec![models::App {
                id: app_id.to_string(),
                default_workflow_id: Some(base_workflow.to_string()),
                description: None,
            }],
        };
        let response: MultiAppResponse = self
            .client
            .post(&format!("{}/apps", user_path(&self.user_id)), &request)
            .await?;
        let id = response
            .apps
            .into_iter()
            .next()
            .map(|a| a.id)
            .unwrap_or_else(|| app_id.to_string());

        info!("Created app {} for user {}", id, self.user_id);
        Ok(self.app(id))
    }

    /// Handle to an existing app
    pub fn app(&self, app_id: impl Into<String>) -> App {
        App::new(self.client.clone(), UserAppId::new(self.user_id.clone(), app_id))
    }

    pub async fn list_apps(&self, page: u32, per_page: u32) -> Result<Vec<models::App>> {
        let response: MultiAppResponse = self
            .client
            .get(
                &format!("{}/apps", user_path(&self.user_id)),
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(response.apps)
    }

    pub async fn delete_app(&self, app_id: &str) -> Result<()> {
        let path = UserAppId::new(self.user_id.clone(), app_id).path("");
        let _: EmptyResponse = self.client.delete::<(), _>(&path, None).await?;
        info!("Deleted app {} for user {}", app_id, self.user_id);
        Ok(())
    }
}
