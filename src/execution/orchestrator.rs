//! Orchestrator - drives one production run from concept to pending record

use crate::{
    agent::{AgentError, ContentGenerator},
    core::{
        slugify, CreationStory, PipelineContext, PipelineStage, RecipeRecord, RecipeStatus, Review,
        WorkProduct,
    },
    execution::engine::{StageEngine, StageError},
    persistence::{validate_id, RecordStore, StoreError, StoryStore},
    publishing::notify::{Notice, Notifier},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Error types for production runs
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Content generation failed: {0}")]
    Generator(#[from] AgentError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Recipe {id} exceeded the revision limit of {limit}")]
    RevisionLimit { id: String, limit: u32 },

    #[error("Production run {0} finished without a completed context")]
    Incomplete(String),
}

/// A finished production run
#[derive(Debug, Clone)]
pub struct ProductionOutcome {
    pub record: RecipeRecord,
    pub story: CreationStory,
    pub revisions: u32,
    pub stored_at: PathBuf,
    pub story_path: PathBuf,
}

/// Runs stages through a content generator and stores the result for review
pub struct Orchestrator<G> {
    engine: StageEngine,
    generator: G,
    store: RecordStore,
    stories: StoryStore,
    notifier: Option<Arc<dyn Notifier>>,
    max_revisions: u32,
}

impl<G: ContentGenerator> Orchestrator<G> {
    pub fn new(generator: G, store: RecordStore) -> Self {
        let stories = StoryStore::new(store.base().join("stories"));
        Self {
            engine: StageEngine::new(),
            generator,
            store,
            stories,
            notifier: None,
            max_revisions: 3,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Where creation stories are written (defaults to `<store>/stories`)
    pub fn with_stories(mut self, stories: StoryStore) -> Self {
        self.stories = stories;
        self
    }

    pub fn with_max_revisions(mut self, max_revisions: u32) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    pub fn engine(&self) -> &StageEngine {
        &self.engine
    }

    /// Mutable engine access, e.g. to register event handlers
    pub fn engine_mut(&mut self) -> &mut StageEngine {
        &mut self.engine
    }

    /// Produce a recipe for `concept` under a fresh short id
    pub async fn produce(&mut self, concept: &str) -> Result<ProductionOutcome, OrchestratorError> {
        let recipe_id = short_id();
        self.produce_with_id(&recipe_id, concept).await
    }

    /// Produce a recipe under a caller-chosen id
    pub async fn produce_with_id(
        &mut self,
        recipe_id: &str,
        concept: &str,
    ) -> Result<ProductionOutcome, OrchestratorError> {
        validate_id(recipe_id)?;
        info!("Producing recipe {} for concept: {}", recipe_id, concept);
        self.engine.start(recipe_id, concept)?;

        if let Err(e) = self.drive(recipe_id).await {
            error!("Production run {} failed: {}", recipe_id, e);
            self.engine.abandon(recipe_id);
            return Err(e);
        }

        let ctx = self
            .engine
            .completed_context(recipe_id)
            .ok_or_else(|| OrchestratorError::Incomplete(recipe_id.to_string()))?;
        let revisions = ctx.revision_count;
        let story = CreationStory::from_context(short_id(), ctx);
        let mut record = compile_record(ctx);
        record.story_id = Some(story.story_id.clone());

        let story_path = self.stories.save(&story).await?;
        let stored_at = self.store.save(&mut record).await?;
        info!(
            "Recipe {} saved for review: {} (story {})",
            record.id, record.title, story.story_id
        );

        if let Some(notifier) = &self.notifier {
            let notice = Notice::ReadyForReview {
                recipe_id: record.id.clone(),
                title: record.title.clone(),
                description: record.description.clone(),
                ingredient_count: record.ingredients.len(),
            };
            if let Err(e) = notifier.notify(&notice).await {
                warn!("Review notification failed for {}: {}", record.id, e);
            }
        }

        Ok(ProductionOutcome {
            record,
            story,
            revisions,
            stored_at,
            story_path,
        })
    }

    async fn drive(&mut self, recipe_id: &str) -> Result<(), OrchestratorError> {
        while let Some(stage) = self.engine.context(recipe_id).map(|c| c.stage) {
            let product = match self.engine.task_for(recipe_id) {
                Some(task) => Some(self.generator.generate(&task).await?),
                None => None,
            };

            let rejected = match &product {
                Some(WorkProduct::Review(review))
                    if stage == PipelineStage::CreativeReview && !review.approved =>
                {
                    Some(review.clone())
                }
                _ => None,
            };
            if let Some(review) = rejected {
                self.send_back(recipe_id, stage, review, product)?;
                continue;
            }

            self.engine.advance(recipe_id, product)?;
        }
        Ok(())
    }

    fn send_back(
        &mut self,
        recipe_id: &str,
        stage: PipelineStage,
        review: Review,
        product: Option<WorkProduct>,
    ) -> Result<(), OrchestratorError> {
        let revisions = self
            .engine
            .context(recipe_id)
            .map(|c| c.revision_count)
            .unwrap_or_default();
        if revisions >= self.max_revisions {
            return Err(OrchestratorError::RevisionLimit {
                id: recipe_id.to_string(),
                limit: self.max_revisions,
            });
        }

        if let Some(product) = product {
            self.engine.record(recipe_id, product)?;
        }

        let target = review
            .revise_stage
            .filter(|s| stage.can_revise_to(*s))
            .unwrap_or(PipelineStage::Revisions);
        let reason = if review.feedback.is_empty() {
            "Changes requested".to_string()
        } else {
            review.feedback.clone()
        };

        self.engine
            .request_revision(recipe_id, target, &reason, &review.reviewer)?;
        Ok(())
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Build the pending record for a completed production run
pub fn compile_record(ctx: &PipelineContext) -> RecipeRecord {
    let title = ctx.title().to_string();
    let slug = match slugify(&title) {
        slug if slug.is_empty() => slugify(&ctx.recipe_id),
        slug => slug,
    };
    let mut record = RecipeRecord::new(ctx.recipe_id.clone(), title, slug);
    record.concept = ctx.concept.clone();

    if let Some(draft) = &ctx.recipe {
        record.ingredients = draft.ingredients.clone();
        record.instructions = draft.instructions.clone();
        record.tags = draft.tags.clone();
        if let Some(servings) = draft.servings {
            record.servings = servings;
        }
        record.prep_time_minutes = draft.prep_time_minutes.unwrap_or(15);
        record.cook_time_minutes = draft.cook_time_minutes.unwrap_or(20);
        if let Some(difficulty) = &draft.difficulty {
            record.difficulty = difficulty.clone();
        }
        if let Some(category) = &draft.category {
            record.category = category.clone();
        }
    } else {
        record.prep_time_minutes = 15;
        record.cook_time_minutes = 20;
    }

    record.description = ctx
        .copy
        .as_ref()
        .map(|c| c.body.clone())
        .filter(|b| !b.is_empty())
        .or_else(|| ctx.recipe.as_ref().map(|d| d.description.clone()))
        .unwrap_or_default();

    record.photos = ctx.photos.clone();
    record.featured_photo = ctx.photos.first().cloned();
    record.status = RecipeStatus::Pending;
    record.created_at = ctx.created_at;
    record.updated_at = Utc::now();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CopyText, RecipeDraft};

    #[test]
    fn test_compile_record_defaults() {
        let mut ctx = PipelineContext::new("r1", "Savory Oat Cups");
        ctx.stage = PipelineStage::Complete;

        let record = compile_record(&ctx);
        assert_eq!(record.title, "Savory Oat Cups");
        assert_eq!(record.slug, "savory-oat-cups");
        assert_eq!(record.servings, 12);
        assert_eq!(record.prep_time_minutes, 15);
        assert_eq!(record.cook_time_minutes, 20);
        assert_eq!(record.difficulty, "medium");
        assert_eq!(record.category, "savory");
        assert!(record.featured_photo.is_none());
        assert_eq!(record.status, RecipeStatus::Pending);
    }

    #[test]
    fn test_compile_record_slug_falls_back_to_id() {
        let ctx = PipelineContext::new("a1b2c3d4", "???");
        let record = compile_record(&ctx);
        assert_eq!(record.title, "???");
        assert_eq!(record.slug, "a1b2c3d4");
    }

    #[test]
    fn test_compile_record_prefers_copy_body() {
        let mut ctx = PipelineContext::new("r1", "Lemon");
        ctx.recipe = Some(RecipeDraft {
            title: "Lemon Ricotta Muffins".to_string(),
            description: "Baker's note".to_string(),
            ingredients: vec![],
            instructions: vec!["Bake.".to_string()],
            servings: Some(10),
            prep_time_minutes: Some(12),
            cook_time_minutes: None,
            difficulty: Some("easy".to_string()),
            category: Some("sweet".to_string()),
            tags: vec![],
        });
        ctx.photos = vec!["a.jpg".to_string(), "b.jpg".to_string()];

        assert_eq!(compile_record(&ctx).description, "Baker's note");

        ctx.copy = Some(CopyText {
            headline: String::new(),
            body: "Sunny little muffins.".to_string(),
            seo_description: String::new(),
        });
        let record = compile_record(&ctx);
        assert_eq!(record.description, "Sunny little muffins.");
        assert_eq!(record.slug, "lemon-ricotta-muffins");
        assert_eq!(record.servings, 10);
        assert_eq!(record.cook_time_minutes, 20);
        assert_eq!(record.category, "sweet");
        assert_eq!(record.featured_photo.as_deref(), Some("a.jpg"));
    }
}
