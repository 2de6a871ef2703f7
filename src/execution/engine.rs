//! Stage engine - the production pipeline state machine

use crate::{
    core::{PipelineContext, PipelineStage, RevisionRequest, Role, WorkProduct},
    execution::task::StageTask,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error types for stage engine operations
#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("Recipe {0} already has an active production run")]
    AlreadyActive(String),

    #[error("Recipe {0} has no active production run")]
    NotActive(String),

    #[error("Stage {0} has no successor")]
    NoSuccessor(PipelineStage),

    #[error("Cannot route a revision from {from} to {to}")]
    InvalidRevisionTarget {
        from: PipelineStage,
        to: PipelineStage,
    },

    #[error("Work product '{kind}' does not belong to stage {stage}")]
    WorkProductMismatch {
        kind: &'static str,
        stage: PipelineStage,
    },
}

/// Events that can occur while a recipe moves through the pipeline
#[derive(Debug, Clone)]
pub enum StageEvent {
    RunStarted {
        recipe_id: String,
        concept: String,
    },
    StageAdvanced {
        recipe_id: String,
        from: PipelineStage,
        to: PipelineStage,
    },
    RevisionRequested {
        recipe_id: String,
        from: PipelineStage,
        to: PipelineStage,
        reason: String,
    },
    RunCompleted {
        recipe_id: String,
        revisions: u32,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(StageEvent) + Send + Sync>;

/// Snapshot of the engine's bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStatistics {
    pub active: usize,
    pub completed: usize,
    /// Active runs per stage
    pub by_stage: BTreeMap<String, usize>,
    /// Revisions requested across active runs
    pub total_revisions: u32,
}

/// In-memory state machine for production runs
///
/// Mutation takes `&mut self`; callers that share an engine serialize access
/// themselves.
#[derive(Default)]
pub struct StageEngine {
    active: HashMap<String, PipelineContext>,
    completed: Vec<PipelineContext>,
    event_handlers: Vec<EventHandler>,
}

impl StageEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(StageEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: StageEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Begin a production run at ideation
    pub fn start(&mut self, recipe_id: &str, concept: &str) -> Result<&PipelineContext, StageError> {
        if self.active.contains_key(recipe_id) {
            return Err(StageError::AlreadyActive(recipe_id.to_string()));
        }

        info!("Starting production run {} ({})", recipe_id, concept);
        self.emit_event(StageEvent::RunStarted {
            recipe_id: recipe_id.to_string(),
            concept: concept.to_string(),
        });

        let ctx = self
            .active
            .entry(recipe_id.to_string())
            .or_insert_with(|| PipelineContext::new(recipe_id, concept));
        Ok(ctx)
    }

    /// Record the current stage's work product and move to the next stage.
    ///
    /// Returns the stage the run is at afterwards. Reaching `complete` moves
    /// the context into the completed list.
    pub fn advance(
        &mut self,
        recipe_id: &str,
        work_product: Option<WorkProduct>,
    ) -> Result<PipelineStage, StageError> {
        let ctx = self
            .active
            .get_mut(recipe_id)
            .ok_or_else(|| StageError::NotActive(recipe_id.to_string()))?;

        let from = ctx.stage;
        let next = from.next().ok_or(StageError::NoSuccessor(from))?;

        if let Some(product) = work_product {
            if let Err(product) = ctx.record(product) {
                warn!(
                    "Rejected {} work product for {} at {}",
                    product.kind(),
                    recipe_id,
                    from
                );
                return Err(StageError::WorkProductMismatch {
                    kind: product.kind(),
                    stage: from,
                });
            }
        }

        ctx.stage = next;
        ctx.updated_at = Utc::now();
        debug!("Recipe {} advanced {} -> {}", recipe_id, from, next);

        self.emit_event(StageEvent::StageAdvanced {
            recipe_id: recipe_id.to_string(),
            from,
            to: next,
        });

        if next.is_terminal() {
            if let Some(mut ctx) = self.active.remove(recipe_id) {
                ctx.completed_at = Some(Utc::now());
                let revisions = ctx.revision_count;
                self.completed.push(ctx);

                info!("Production run {} complete ({} revisions)", recipe_id, revisions);
                self.emit_event(StageEvent::RunCompleted {
                    recipe_id: recipe_id.to_string(),
                    revisions,
                });
            }
        }

        Ok(next)
    }

    /// Send a run back to an upstream stage for rework
    pub fn request_revision(
        &mut self,
        recipe_id: &str,
        target: PipelineStage,
        reason: &str,
        requested_by: &str,
    ) -> Result<(), StageError> {
        let ctx = self
            .active
            .get_mut(recipe_id)
            .ok_or_else(|| StageError::NotActive(recipe_id.to_string()))?;

        let from = ctx.stage;
        if !from.can_revise_to(target) {
            return Err(StageError::InvalidRevisionTarget { from, to: target });
        }

        let now = Utc::now();
        ctx.revision_requests.push(RevisionRequest {
            from_stage: from,
            to_stage: target,
            reason: reason.to_string(),
            requested_by: requested_by.to_string(),
            timestamp: now,
        });
        ctx.revision_count += 1;
        ctx.stage = target;
        ctx.updated_at = now;

        info!(
            "Revision #{} for {}: {} -> {} ({})",
            ctx.revision_count, recipe_id, from, target, requested_by
        );
        self.emit_event(StageEvent::RevisionRequested {
            recipe_id: recipe_id.to_string(),
            from,
            to: target,
            reason: reason.to_string(),
        });

        Ok(())
    }

    /// Store a work product at the current stage without advancing
    pub fn record(&mut self, recipe_id: &str, work_product: WorkProduct) -> Result<(), StageError> {
        let ctx = self
            .active
            .get_mut(recipe_id)
            .ok_or_else(|| StageError::NotActive(recipe_id.to_string()))?;

        let stage = ctx.stage;
        ctx.record(work_product)
            .map_err(|product| StageError::WorkProductMismatch {
                kind: product.kind(),
                stage,
            })
    }

    /// Drop an active run, returning its context
    pub fn abandon(&mut self, recipe_id: &str) -> Option<PipelineContext> {
        let ctx = self.active.remove(recipe_id);
        if ctx.is_some() {
            warn!("Abandoned production run {}", recipe_id);
        }
        ctx
    }

    /// The role responsible for the run's current stage
    pub fn owner_of(&self, recipe_id: &str) -> Option<Role> {
        self.active.get(recipe_id).and_then(|ctx| ctx.stage.owner())
    }

    /// The task the current stage's owner should carry out
    pub fn task_for(&self, recipe_id: &str) -> Option<StageTask> {
        self.active.get(recipe_id).and_then(StageTask::for_context)
    }

    pub fn context(&self, recipe_id: &str) -> Option<&PipelineContext> {
        self.active.get(recipe_id)
    }

    pub fn completed(&self) -> &[PipelineContext] {
        &self.completed
    }

    /// The most recent completed run for `recipe_id`
    pub fn completed_context(&self, recipe_id: &str) -> Option<&PipelineContext> {
        self.completed.iter().rev().find(|c| c.recipe_id == recipe_id)
    }

    pub fn is_active(&self, recipe_id: &str) -> bool {
        self.active.contains_key(recipe_id)
    }

    pub fn statistics(&self) -> PipelineStatistics {
        let mut by_stage = BTreeMap::new();
        let mut total_revisions = 0;

        for ctx in self.active.values() {
            *by_stage.entry(ctx.stage.to_string()).or_insert(0) += 1;
            total_revisions += ctx.revision_count;
        }

        PipelineStatistics {
            active: self.active.len(),
            completed: self.completed.len(),
            by_stage,
            total_revisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CopyText, RecipeDraft, Review, CANONICAL_ORDER};
    use std::sync::Mutex;

    fn draft() -> WorkProduct {
        WorkProduct::Recipe(RecipeDraft {
            title: "Lemon Ricotta Muffins".to_string(),
            description: "Bright and tender".to_string(),
            ingredients: vec![],
            instructions: vec![],
            servings: Some(12),
            prep_time_minutes: Some(15),
            cook_time_minutes: Some(20),
            difficulty: None,
            category: None,
            tags: vec![],
        })
    }

    fn review(approved: bool) -> WorkProduct {
        WorkProduct::Review(Review {
            reviewer: "creative_director".to_string(),
            approved,
            feedback: "Needs more zest".to_string(),
            revise_stage: None,
        })
    }

    #[test]
    fn test_advance_visits_canonical_order() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon Ricotta Muffins").unwrap();

        let mut visited = vec![engine.context("r1").unwrap().stage];
        for _ in 0..7 {
            visited.push(engine.advance("r1", None).unwrap());
        }

        assert_eq!(visited, CANONICAL_ORDER.to_vec());
        assert!(!engine.is_active("r1"));
        assert_eq!(engine.completed().len(), 1);

        let done = engine.completed_context("r1").unwrap();
        assert_eq!(done.stage, PipelineStage::Complete);
        assert!(done.completed_at.is_some());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut engine = StageEngine::new();
        engine.start("r1", "a").unwrap();
        assert_eq!(
            engine.start("r1", "b").unwrap_err(),
            StageError::AlreadyActive("r1".to_string())
        );
    }

    #[test]
    fn test_unknown_id_is_not_active() {
        let mut engine = StageEngine::new();
        assert!(matches!(engine.advance("nope", None), Err(StageError::NotActive(_))));
        assert!(matches!(
            engine.request_revision("nope", PipelineStage::Ideation, "x", "y"),
            Err(StageError::NotActive(_))
        ));
        assert!(engine.owner_of("nope").is_none());
        assert!(engine.task_for("nope").is_none());
    }

    #[test]
    fn test_work_products_fill_slots() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();
        engine.advance("r1", None).unwrap();
        engine.advance("r1", Some(draft())).unwrap();
        engine
            .advance("r1", Some(WorkProduct::Photos { photos: vec!["hero.jpg".to_string()] }))
            .unwrap();
        engine
            .advance(
                "r1",
                Some(WorkProduct::Copy(CopyText {
                    headline: "Sunny".to_string(),
                    body: "Zesty little muffins.".to_string(),
                    seo_description: String::new(),
                })),
            )
            .unwrap();
        engine.advance("r1", Some(review(true))).unwrap();

        let ctx = engine.context("r1").unwrap();
        assert_eq!(ctx.stage, PipelineStage::FinalApproval);
        assert_eq!(ctx.title(), "Lemon Ricotta Muffins");
        assert_eq!(ctx.photos, vec!["hero.jpg".to_string()]);
        assert_eq!(ctx.copy.as_ref().unwrap().body, "Zesty little muffins.");
        assert_eq!(ctx.reviews.len(), 1);
    }

    #[test]
    fn test_mismatched_work_product_is_rejected() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();

        let err = engine.advance("r1", Some(draft())).unwrap_err();
        assert_eq!(
            err,
            StageError::WorkProductMismatch {
                kind: "recipe",
                stage: PipelineStage::Ideation
            }
        );

        let ctx = engine.context("r1").unwrap();
        assert_eq!(ctx.stage, PipelineStage::Ideation);
        assert!(ctx.recipe.is_none());
    }

    #[test]
    fn test_revision_routing() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();
        for _ in 0..4 {
            engine.advance("r1", None).unwrap();
        }
        assert_eq!(engine.owner_of("r1"), Some(Role::CreativeDirector));

        engine
            .request_revision("r1", PipelineStage::Photography, "Too dark", "creative_director")
            .unwrap();

        let ctx = engine.context("r1").unwrap();
        assert_eq!(ctx.stage, PipelineStage::Photography);
        assert_eq!(ctx.revision_count, 1);
        assert_eq!(ctx.revision_requests[0].from_stage, PipelineStage::CreativeReview);
        assert_eq!(engine.task_for("r1").unwrap().feedback.as_deref(), Some("Too dark"));
        assert_eq!(engine.statistics().total_revisions, 1);
    }

    #[test]
    fn test_downstream_revision_target_is_rejected() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();
        engine.advance("r1", None).unwrap();

        let err = engine
            .request_revision("r1", PipelineStage::Deployment, "skip ahead", "baker")
            .unwrap_err();
        assert!(matches!(err, StageError::InvalidRevisionTarget { .. }));

        let ctx = engine.context("r1").unwrap();
        assert_eq!(ctx.stage, PipelineStage::RecipeDevelopment);
        assert_eq!(ctx.revision_count, 0);
        assert!(ctx.revision_requests.is_empty());
    }

    #[test]
    fn test_revisions_stage_returns_to_review() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();
        for _ in 0..4 {
            engine.advance("r1", None).unwrap();
        }
        engine
            .request_revision("r1", PipelineStage::Revisions, "general polish", "creative_director")
            .unwrap();
        assert_eq!(engine.owner_of("r1"), None);
        assert!(engine.task_for("r1").is_none());

        assert_eq!(engine.advance("r1", None).unwrap(), PipelineStage::CreativeReview);
    }

    #[test]
    fn test_record_without_advancing_and_abandon() {
        let mut engine = StageEngine::new();
        engine.start("r1", "Lemon").unwrap();
        for _ in 0..4 {
            engine.advance("r1", None).unwrap();
        }

        engine.record("r1", review(false)).unwrap();
        let ctx = engine.context("r1").unwrap();
        assert_eq!(ctx.stage, PipelineStage::CreativeReview);
        assert!(!ctx.latest_review().unwrap().approved);

        assert!(engine.record("r1", draft()).is_err());

        let dropped = engine.abandon("r1").unwrap();
        assert_eq!(dropped.reviews.len(), 1);
        assert!(!engine.is_active("r1"));
        assert!(engine.completed().is_empty());
    }

    #[test]
    fn test_statistics_and_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let mut engine = StageEngine::new();
        engine.add_event_handler(move |event| sink.lock().unwrap().push(event));

        engine.start("a", "one").unwrap();
        engine.start("b", "two").unwrap();
        engine.advance("b", None).unwrap();

        let stats = engine.statistics();
        assert_eq!(stats.active, 2);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.by_stage.get("ideation"), Some(&1));
        assert_eq!(stats.by_stage.get("recipe_development"), Some(&1));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], StageEvent::StageAdvanced { ref recipe_id, .. } if recipe_id == "b"));
    }
}
