//! Datasets and folder uploads

use super::inputs::{InputBuilder, Inputs};
use crate::error::{Error, Result};
use crate::schema::InputType;
use std::path::Path;
use tracing::{info, warn};

/// A dataset inside an app
#[derive(Clone)]
pub struct Dataset {
    id: String,
    inputs: Inputs,
}

impl Dataset {
    pub(crate) fn new(id: impl Into<String>, inputs: Inputs) -> Self {
        Self {
            id: id.into(),
            inputs,
        }
    }

    /// Dataset id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Upload every file in `folder` into this dataset.
    ///
    /// Input ids are the file stems. With `labels` set, each input is
    /// labelled with the folder name. Only image and text folders are
    /// supported.
    pub async fn upload_from_folder(
        &self,
        folder: impl AsRef<Path>,
        input_type: InputType,
        labels: bool,
    ) -> Result<Vec<String>> {
        if !matches!(input_type, InputType::Image | InputType::Text) {
            return Err(Error::user(format!(
                "Invalid input type '{}': folder uploads support image or text",
                input_type
            )));
        }

        let folder = folder.as_ref();
        let label = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(folder).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut inputs = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                warn!("Skipping file without a name: {}", path.display());
                continue;
            };

            let builder = match input_type {
                InputType::Image => InputBuilder::image_bytes(stem, &tokio::fs::read(&path).await?),
                _ => match tokio::fs::read_to_string(&path).await {
                    Ok(text) => InputBuilder::text(stem, text),
                    Err(e) => {
                        warn!("Skipping non-text file {}: {}", path.display(), e);
                        continue;
                    }
                },
            };

            let mut builder = builder.dataset_id(&self.id);
            if labels {
                builder = builder.labels(label.clone());
            }
            inputs.push(builder.build()?);
        }

        if inputs.is_empty() {
            return Err(Error::user(format!(
                "No files to upload in {}",
                folder.display()
            )));
        }

        info!(
            "Uploading {} {} inputs from {} to dataset {}",
            inputs.len(),
            input_type,
            folder.display(),
            self.id
        );
        self.inputs.upload_inputs(&inputs).await
    }
}
