//! Publisher - turns approved records into live site artifacts

use crate::core::{is_valid_slug, RecipeRecord, RecipeStatus, SiteConfig};
use crate::persistence::{write_atomic, RecordStore, StoreError};
use crate::publishing::index::SiteIndexWriter;
use crate::publishing::notify::{Notice, Notifier};
use crate::publishing::sync::{SiteSync, SyncOutcome};
use crate::publishing::templates::{render_page, DEFAULT_TEMPLATE};
use crate::publishing::translator::{translate, WebRecipeView};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

/// Note stored on records when they go live
pub const PUBLISHED_NOTE: &str = "Published to live site";

/// Error types for publishing
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Recipe {id} is {status}, only approved recipes can be published")]
    InvalidState { id: String, status: RecipeStatus },

    #[error("Recipe {id} has an unusable slug: {slug:?}")]
    InvalidSlug { id: String, slug: String },

    #[error("Failed to parse site index {path}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(StoreError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for PublishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => PublishError::NotFound(id),
            other => PublishError::Store(other),
        }
    }
}

/// Result of one successful publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub recipe_id: String,
    pub title: String,
    pub slug: String,
    pub page_path: PathBuf,
    pub index_size: usize,
    pub sync: SyncOutcome,
}

/// Per-recipe line of a batch publish
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub recipe_id: String,
    pub title: String,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Totals and per-recipe outcomes of `publish_all`
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    pub items: Vec<BatchItem>,
}

/// Result of a full rebuild
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub pages: usize,
    pub indexed: usize,
    pub output_dir: PathBuf,
}

/// Publishing pipeline for a single site
pub struct Publisher {
    store: RecordStore,
    index: SiteIndexWriter,
    output_dir: PathBuf,
    template_path: PathBuf,
    site_url: String,
    sync: Option<Arc<dyn SiteSync>>,
    notifier: Option<Arc<dyn Notifier>>,
    date: Option<NaiveDate>,
}

impl Publisher {
    pub fn new(
        store: RecordStore,
        output_dir: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
        site_url: impl Into<String>,
    ) -> Self {
        let output_dir = output_dir.into();
        let site_url = site_url.into();
        Self {
            store,
            index: SiteIndexWriter::new(&output_dir, site_url.clone()),
            output_dir,
            template_path: template_path.into(),
            site_url,
            sync: None,
            notifier: None,
            date: None,
        }
    }

    /// Publisher wired to the paths of a site config
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            RecordStore::new(config.data_path()),
            config.output_path(),
            config.template_path(),
            config.site_url.clone(),
        )
    }

    pub fn with_sync(mut self, sync: Arc<dyn SiteSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Pin the sitemap `lastmod` date instead of using today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn index(&self) -> &SiteIndexWriter {
        &self.index
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.output_dir.join("recipes").join(slug).join("index.html")
    }

    async fn load_template(&self) -> Result<String, PublishError> {
        if !fs::try_exists(&self.template_path).await? {
            warn!(
                "Template {} not found, using the bundled default",
                self.template_path.display()
            );
            return Ok(DEFAULT_TEMPLATE.to_string());
        }
        Ok(fs::read_to_string(&self.template_path).await?)
    }

    async fn write_page(&self, template: &str, view: &WebRecipeView) -> Result<PathBuf, PublishError> {
        let html = render_page(template, view, &self.site_url);
        let path = self.page_path(&view.slug);
        write_atomic(&path, html).await?;
        info!("Saved recipe page: {}", path.display());
        Ok(path)
    }

    async fn notify(&self, notice: Notice) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(&notice).await {
                error!("Notification failed: {}", e);
            }
        }
    }

    /// Publish one approved recipe to the live site
    pub async fn publish(&self, recipe_id: &str) -> Result<PublishReceipt, PublishError> {
        info!("Starting publish for recipe: {}", recipe_id);

        let mut record = self.store.load(recipe_id).await?;
        if record.status != RecipeStatus::Approved {
            error!(
                "Recipe {} is not approved (status: {})",
                recipe_id, record.status
            );
            return Err(PublishError::InvalidState {
                id: recipe_id.to_string(),
                status: record.status,
            });
        }

        if !is_valid_slug(&record.slug) {
            error!("Recipe {} has an unusable slug: {:?}", recipe_id, record.slug);
            return Err(PublishError::InvalidSlug {
                id: recipe_id.to_string(),
                slug: record.slug.clone(),
            });
        }

        let template = self.load_template().await?;
        let view = translate(&record);
        let page_path = self.write_page(&template, &view).await?;

        let index = self.index.upsert(view, self.today()).await?;

        self.store
            .transition(&mut record, RecipeStatus::Published, Some(PUBLISHED_NOTE))
            .await?;

        let sync = self.sync_site(&record).await;

        self.notify(Notice::Published {
            recipe_id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            ingredient_count: record.ingredients.len(),
            url: format!("{}/recipes/{}", self.site_url, record.slug),
        })
        .await;

        info!("Successfully published: {}", record.title);
        Ok(PublishReceipt {
            recipe_id: record.id,
            title: record.title,
            slug: record.slug,
            page_path,
            index_size: index.len(),
            sync,
        })
    }

    async fn sync_site(&self, record: &RecipeRecord) -> SyncOutcome {
        let Some(sync) = &self.sync else {
            return SyncOutcome::Skipped;
        };

        match sync.sync(&format!("Publish recipe: {}", record.title)).await {
            Ok(pushed) => SyncOutcome::Synced { pushed },
            Err(e) => {
                warn!("Sync failed, but recipe {} was published locally: {}", record.id, e);
                SyncOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Publish every approved recipe, continuing past failures
    pub async fn publish_all(&self) -> Result<BatchReport, PublishError> {
        info!("Starting batch publish of all approved recipes");

        let approved = self.store.list_by_status(RecipeStatus::Approved).await?;
        let mut report = BatchReport {
            total: approved.len(),
            ..BatchReport::default()
        };

        if approved.is_empty() {
            info!("No approved recipes to publish");
            return Ok(report);
        }

        for record in approved {
            match self.publish(&record.id).await {
                Ok(_) => {
                    report.succeeded += 1;
                    report.items.push(BatchItem {
                        recipe_id: record.id,
                        title: record.title,
                        published: true,
                        error: None,
                    });
                }
                Err(e) => {
                    error!("Failed to publish recipe {}: {}", record.id, e);
                    report.failed += 1;
                    report.items.push(BatchItem {
                        recipe_id: record.id,
                        title: record.title,
                        published: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            "Batch publish complete: {} published, {} failed out of {} total",
            report.succeeded, report.failed, report.total
        );

        self.notify(Notice::BatchComplete {
            published: report.succeeded,
            failed: report.failed,
            titles: report
                .items
                .iter()
                .filter(|i| i.published)
                .map(|i| i.title.clone())
                .collect(),
        })
        .await;

        Ok(report)
    }

    /// Regenerate every published page, the index and the sitemap from the store
    pub async fn rebuild(&self) -> Result<RebuildReport, PublishError> {
        info!("Starting full site rebuild");

        let template = self.load_template().await?;
        let mut published = self.store.list_by_status(RecipeStatus::Published).await?;
        published.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        published.retain(|record| {
            let usable = is_valid_slug(&record.slug);
            if !usable {
                warn!("Skipping recipe {} with unusable slug {:?}", record.id, record.slug);
            }
            usable
        });

        if published.is_empty() {
            warn!("No published recipes found");
        }

        let recipes_dir = self.output_dir.join("recipes");
        if fs::try_exists(&recipes_dir).await? {
            fs::remove_dir_all(&recipes_dir).await?;
            info!("Deleted old recipes directory");
        }
        fs::create_dir_all(&recipes_dir).await?;

        let mut views = Vec::with_capacity(published.len());
        for record in &published {
            let view = translate(record);
            self.write_page(&template, &view).await?;
            views.push(view);
        }

        let index = self.index.replace_all(views, self.today()).await?;

        info!("Site rebuild complete: {} recipes", published.len());
        Ok(RebuildReport {
            pages: published.len(),
            indexed: index.len(),
            output_dir: self.output_dir.clone(),
        })
    }
}
