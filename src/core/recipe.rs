//! Durable recipe records and their building blocks

use crate::core::state::RecipeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingredient line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IngredientRepr")]
pub struct Ingredient {
    pub item: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Older documents store ingredients as plain display strings
#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientRepr {
    Plain(String),
    Structured {
        item: String,
        #[serde(default)]
        amount: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl From<IngredientRepr> for Ingredient {
    fn from(repr: IngredientRepr) -> Self {
        match repr {
            IngredientRepr::Plain(item) => Ingredient {
                item,
                amount: None,
                notes: None,
            },
            IngredientRepr::Structured { item, amount, notes } => Ingredient { item, amount, notes },
        }
    }
}

impl Ingredient {
    pub fn new(amount: &str, item: &str) -> Self {
        Self {
            item: item.to_string(),
            amount: Some(amount.to_string()).filter(|a| !a.is_empty()),
            notes: None,
        }
    }

    /// Text shown on the site: "<amount> <item>", or just the item
    pub fn display(&self) -> String {
        match self.amount.as_deref().map(str::trim) {
            Some(amount) if !amount.is_empty() => format!("{} {}", amount, self.item),
            _ => self.item.clone(),
        }
    }
}

fn default_servings() -> u32 {
    12
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_category() -> String {
    "savory".to_string()
}

/// A recipe as persisted in the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Internal identifier, also the document file stem
    #[serde(alias = "recipe_id")]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub concept: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default = "default_servings")]
    pub servings: u32,

    #[serde(default)]
    pub prep_time_minutes: u32,

    #[serde(default)]
    pub cook_time_minutes: u32,

    #[serde(default = "default_difficulty")]
    pub difficulty: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Image references produced by the photography stage
    #[serde(default)]
    pub photos: Vec<String>,

    #[serde(default)]
    pub featured_photo: Option<String>,

    /// URL-safe public identifier, distinct from `id`
    pub slug: String,

    pub status: RecipeStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub review_notes: Option<String>,

    /// Creation story written alongside the record, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
}

impl RecipeRecord {
    /// Create a pending record with empty content
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            concept: String::new(),
            description: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            servings: default_servings(),
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            difficulty: default_difficulty(),
            category: default_category(),
            tags: Vec::new(),
            photos: Vec::new(),
            featured_photo: None,
            slug: slug.into(),
            status: RecipeStatus::Pending,
            created_at: now,
            updated_at: now,
            published_at: None,
            review_notes: None,
            story_id: None,
        }
    }

    /// Featured photo, else the first photo
    pub fn hero_image(&self) -> Option<&str> {
        self.featured_photo
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.photos.first().map(String::as_str))
    }
}

/// Turn free text into a URL-safe slug (lowercase, dash separated, at most 50 chars)
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > 50 {
        slug.truncate(50);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Whether `slug` has the shape `slugify` produces and is safe as a path segment
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
