//! Site index and sitemap ownership
//!
//! `recipes.json` and `sitemap.xml` are shared by every publish, so all
//! read-modify-write cycles on them go through a single `SiteIndexWriter`.

use crate::persistence::write_atomic;
use crate::publishing::publisher::PublishError;
use crate::publishing::templates::render_sitemap;
use crate::publishing::translator::WebRecipeView;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The `{ "recipes": [...] }` document, unique by slug
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexRepr")]
pub struct SiteIndex {
    pub recipes: Vec<WebRecipeView>,
}

/// Older sites stored the index as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Wrapped { recipes: Vec<WebRecipeView> },
    Bare(Vec<WebRecipeView>),
}

impl From<IndexRepr> for SiteIndex {
    fn from(repr: IndexRepr) -> Self {
        match repr {
            IndexRepr::Wrapped { recipes } | IndexRepr::Bare(recipes) => SiteIndex { recipes },
        }
    }
}

impl SiteIndex {
    /// Replace the entry with the same slug, or append. Returns true when an
    /// existing entry was replaced.
    pub fn upsert(&mut self, view: WebRecipeView) -> bool {
        match self.recipes.iter_mut().find(|r| r.slug == view.slug) {
            Some(existing) => {
                *existing = view;
                true
            }
            None => {
                self.recipes.push(view);
                false
            }
        }
    }

    pub fn get(&self, slug: &str) -> Option<&WebRecipeView> {
        self.recipes.iter().find(|r| r.slug == slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.recipes.iter().map(|r| r.slug.as_str())
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Single writer for the site index and sitemap
#[derive(Debug)]
pub struct SiteIndexWriter {
    index_path: PathBuf,
    sitemap_path: PathBuf,
    site_url: String,
    lock: Mutex<()>,
}

impl SiteIndexWriter {
    pub fn new(output_dir: &Path, site_url: impl Into<String>) -> Self {
        Self {
            index_path: output_dir.join("recipes.json"),
            sitemap_path: output_dir.join("sitemap.xml"),
            site_url: site_url.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn sitemap_path(&self) -> &Path {
        &self.sitemap_path
    }

    async fn load_unlocked(&self) -> Result<SiteIndex, PublishError> {
        if !fs::try_exists(&self.index_path).await? {
            warn!("{} not found, starting an empty index", self.index_path.display());
            return Ok(SiteIndex::default());
        }

        let content = fs::read_to_string(&self.index_path).await?;
        serde_json::from_str(&content).map_err(|source| PublishError::Index {
            path: self.index_path.clone(),
            source,
        })
    }

    async fn persist_unlocked(&self, index: &SiteIndex, today: NaiveDate) -> Result<(), PublishError> {
        write_atomic(&self.index_path, serde_json::to_string_pretty(index)?).await?;
        let sitemap = render_sitemap(&self.site_url, index.slugs(), today);
        write_atomic(&self.sitemap_path, sitemap).await?;
        Ok(())
    }

    /// Current index contents
    pub async fn read(&self) -> Result<SiteIndex, PublishError> {
        let _guard = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Insert or replace one recipe, then regenerate the sitemap
    pub async fn upsert(&self, view: WebRecipeView, today: NaiveDate) -> Result<SiteIndex, PublishError> {
        let _guard = self.lock.lock().await;

        let mut index = self.load_unlocked().await?;
        let slug = view.slug.clone();
        if index.upsert(view) {
            info!("Updated existing recipe in index: {}", slug);
        } else {
            info!("Added new recipe to index: {}", slug);
        }

        self.persist_unlocked(&index, today).await?;
        Ok(index)
    }

    /// Replace the whole index, then regenerate the sitemap
    pub async fn replace_all(
        &self,
        views: Vec<WebRecipeView>,
        today: NaiveDate,
    ) -> Result<SiteIndex, PublishError> {
        let _guard = self.lock.lock().await;

        let mut index = SiteIndex::default();
        for view in views {
            index.upsert(view);
        }

        self.persist_unlocked(&index, today).await?;
        info!("Rewrote site index with {} recipes", index.len());
        Ok(index)
    }
}
