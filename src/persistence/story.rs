//! Creation story documents, one `story_<id>.json` per production run

use crate::core::CreationStory;
use crate::persistence::atomic::write_atomic;
use crate::persistence::store::{validate_id, StoreError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
pub struct StoryStore {
    dir: PathBuf,
}

impl StoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn story_path(&self, story_id: &str) -> PathBuf {
        self.dir.join(format!("story_{}.json", story_id))
    }

    pub async fn save(&self, story: &CreationStory) -> Result<PathBuf, StoreError> {
        validate_id(&story.story_id)?;
        let path = self.story_path(&story.story_id);
        write_atomic(&path, serde_json::to_string_pretty(story)?).await?;
        info!("Saved creation story: {}", path.display());
        Ok(path)
    }

    pub async fn load(&self, story_id: &str) -> Result<CreationStory, StoreError> {
        validate_id(story_id)?;
        let path = self.story_path(story_id);
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(story_id.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })
    }
}
