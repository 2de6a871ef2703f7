//! Webhook notifications for reviewers

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const PREVIEW_CHARS: usize = 200;
const READY_COLOR: u32 = 0xF5A623;
const PUBLISHED_COLOR: u32 = 0x3B82F6;
const BATCH_COLOR: u32 = 0x27AE60;

/// Error types for notifications
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Something a reviewer should hear about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    ReadyForReview {
        recipe_id: String,
        title: String,
        description: String,
        ingredient_count: usize,
    },
    Published {
        recipe_id: String,
        title: String,
        description: String,
        ingredient_count: usize,
        url: String,
    },
    BatchComplete {
        published: usize,
        failed: usize,
        titles: Vec<String>,
    },
}

/// Trait for notification sinks
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// First 200 characters of `text`, with an ellipsis when cut
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> Value {
    json!({"name": name, "value": value.into(), "inline": inline})
}

/// Posts Discord-style embeds to a webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    admin_base_url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, admin_base_url: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.into(),
            admin_base_url: admin_base_url
                .unwrap_or_else(|| "http://localhost:8000".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn review_url(&self, recipe_id: &str) -> String {
        format!("{}/admin/recipes/{}", self.admin_base_url, recipe_id)
    }

    /// Webhook body for a notice
    pub fn payload(&self, notice: &Notice) -> Value {
        let embed = match notice {
            Notice::ReadyForReview {
                recipe_id,
                title,
                description,
                ingredient_count,
            } => {
                let review_url = self.review_url(recipe_id);
                let mut fields = vec![
                    field("Recipe ID", recipe_id.as_str(), true),
                    field("Ingredients", ingredient_count.to_string(), true),
                    field("Review Link", review_url.as_str(), false),
                ];
                if !description.is_empty() {
                    fields.push(field("Description Preview", preview(description), false));
                }
                json!({
                    "title": "New Recipe Ready for Review",
                    "description": format!("**{}**\n**Review now:** [Open admin review page]({})", title, review_url),
                    "url": review_url,
                    "color": READY_COLOR,
                    "fields": fields,
                })
            }
            Notice::Published {
                recipe_id,
                title,
                description,
                ingredient_count,
                url,
            } => {
                let mut fields = vec![
                    field("Recipe ID", recipe_id.as_str(), true),
                    field("Ingredients", ingredient_count.to_string(), true),
                ];
                if !description.is_empty() {
                    fields.push(field("Description Preview", preview(description), false));
                }
                json!({
                    "title": "Recipe Published",
                    "description": format!("**{}** is live", title),
                    "url": url,
                    "color": PUBLISHED_COLOR,
                    "fields": fields,
                })
            }
            Notice::BatchComplete {
                published,
                failed,
                titles,
            } => {
                let mut listing = titles
                    .iter()
                    .take(5)
                    .map(|t| format!("• {}", t))
                    .collect::<Vec<_>>()
                    .join("\n");
                if titles.len() > 5 {
                    listing.push_str(&format!("\n... and {} more", titles.len() - 5));
                }
                if listing.is_empty() {
                    listing.push_str("(none)");
                }
                json!({
                    "title": "Recipe Batch Complete",
                    "description": format!("**{} published**, {} failed", published, failed),
                    "color": BATCH_COLOR,
                    "fields": [field("Recipes", listing, false)],
                })
            }
        };

        json!({ "embeds": [embed] })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(&self.payload(notice)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!("Webhook notification sent");
        Ok(())
    }
}
