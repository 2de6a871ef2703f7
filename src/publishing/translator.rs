//! Record to web view mapping

use crate::core::RecipeRecord;
use serde::{Deserialize, Serialize};

/// Flattened recipe shape used by the site index and page templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRecipeView {
    pub slug: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub category: String,

    /// Relative image path, empty when the recipe has no photos
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub prep: String,

    #[serde(default)]
    pub cook: String,

    #[serde(default, rename = "yield")]
    pub yields: String,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Build the web view for a record
pub fn translate(record: &RecipeRecord) -> WebRecipeView {
    WebRecipeView {
        slug: record.slug.clone(),
        title: record.title.clone(),
        category: record.category.clone(),
        image: record.hero_image().unwrap_or_default().to_string(),
        description: record.description.clone(),
        prep: format!("{} mins", record.prep_time_minutes),
        cook: format!("{} mins", record.cook_time_minutes),
        yields: format!("{} portions", record.servings),
        ingredients: record.ingredients.iter().map(|i| i.display()).collect(),
        instructions: record.instructions.clone(),
    }
}
