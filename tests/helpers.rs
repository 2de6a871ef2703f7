//! Test utilities for recipe-press

#![allow(dead_code)]

use async_trait::async_trait;
use recipe_press::agent::{AgentError, ContentGenerator};
use recipe_press::core::{
    CopyText, Ingredient, PipelineStage, RecipeDraft, RecipeRecord, RecipeStatus, Review, WorkProduct,
};
use recipe_press::execution::{StageTask, TaskKind};
use recipe_press::persistence::RecordStore;
use recipe_press::publishing::Publisher;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const SITE_URL: &str = "https://muffinpanrecipes.com";

/// Mock generator that answers every task with canned work products
///
/// Reviews are scripted: each `review_package` task pops the next verdict,
/// approving once the script runs out.
#[derive(Clone, Default)]
pub struct MockGenerator {
    reviews: Arc<Mutex<VecDeque<Review>>>,
    calls: Arc<Mutex<Vec<TaskKind>>>,
    feedback_seen: Arc<Mutex<Vec<Option<String>>>>,
    fail_on: Option<TaskKind>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue review verdicts in the order they should be returned
    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        if let Ok(mut queue) = self.reviews.lock() {
            queue.extend(reviews);
        }
        self
    }

    /// Fail with an API error whenever `kind` is requested
    pub fn failing_on(mut self, kind: TaskKind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    /// Task kinds seen so far, in order
    pub fn calls(&self) -> Vec<TaskKind> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, kind: TaskKind) -> usize {
        self.calls().into_iter().filter(|k| *k == kind).count()
    }

    /// Feedback carried by each task, in order
    pub fn feedback_seen(&self) -> Vec<Option<String>> {
        self.feedback_seen.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(&self, task: &StageTask) -> Result<WorkProduct, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(task.kind);
        }
        if let Ok(mut seen) = self.feedback_seen.lock() {
            seen.push(task.feedback.clone());
        }

        if self.fail_on == Some(task.kind) {
            return Err(AgentError::Api(format!("{} unavailable", task.kind.as_str())));
        }

        let product = match task.kind {
            TaskKind::CreateRecipe => WorkProduct::Recipe(lemon_ricotta_draft()),
            TaskKind::PhotographRecipe => WorkProduct::Photos {
                photos: vec![
                    "images/lemon-ricotta-hero.jpg".to_string(),
                    "images/lemon-ricotta-crumb.jpg".to_string(),
                ],
            },
            TaskKind::WriteDescription => WorkProduct::Copy(CopyText {
                headline: "Bright, tender, lemony".to_string(),
                body: "Ricotta keeps these muffins soft for days.".to_string(),
                seo_description: "Lemon ricotta muffins baked in a standard muffin pan.".to_string(),
            }),
            TaskKind::ReviewPackage => {
                let next = self.reviews.lock().ok().and_then(|mut q| q.pop_front());
                WorkProduct::Review(next.unwrap_or_else(|| approve("Ready to ship")))
            }
            TaskKind::DeployRecipe => WorkProduct::Note {
                author: "site_architect".to_string(),
                text: format!("Staged {}", task.recipe_id),
            },
        };
        Ok(product)
    }
}

pub fn approve(feedback: &str) -> Review {
    Review {
        reviewer: "creative_director".to_string(),
        approved: true,
        feedback: feedback.to_string(),
        revise_stage: None,
    }
}

pub fn reject(feedback: &str, revise_stage: Option<PipelineStage>) -> Review {
    Review {
        reviewer: "creative_director".to_string(),
        approved: false,
        feedback: feedback.to_string(),
        revise_stage,
    }
}

pub fn lemon_ricotta_draft() -> RecipeDraft {
    RecipeDraft {
        title: "Lemon Ricotta Muffins".to_string(),
        description: "Soft muffins with lemon zest.".to_string(),
        ingredients: vec![
            Ingredient::new("2 cups", "all-purpose flour"),
            Ingredient::new("1 cup", "whole-milk ricotta"),
            Ingredient::new("2 tbsp", "lemon zest"),
        ],
        instructions: vec![
            "Heat the oven to 375F and line the pan.".to_string(),
            "Whisk the dry ingredients.".to_string(),
            "Fold in ricotta and zest, then bake 20 minutes.".to_string(),
        ],
        servings: Some(12),
        prep_time_minutes: Some(15),
        cook_time_minutes: Some(20),
        difficulty: Some("easy".to_string()),
        category: Some("sweet".to_string()),
        tags: vec!["lemon".to_string(), "breakfast".to_string()],
    }
}

/// A fully filled record as the orchestrator would have produced it
pub fn sample_record(id: &str, title: &str, slug: &str) -> RecipeRecord {
    let draft = lemon_ricotta_draft();
    let mut record = RecipeRecord::new(id, title, slug);
    record.concept = title.to_string();
    record.description = format!("{} from the test kitchen.", title);
    record.ingredients = draft.ingredients;
    record.instructions = draft.instructions;
    record.prep_time_minutes = 15;
    record.cook_time_minutes = 20;
    record.photos = vec![format!("images/{}.jpg", slug)];
    record.featured_photo = record.photos.first().cloned();
    record
}

/// Save a record and move it to `approved`
pub async fn seed_approved(store: &RecordStore, id: &str, title: &str, slug: &str) -> RecipeRecord {
    let mut record = sample_record(id, title, slug);
    store.save(&mut record).await.expect("save pending record");
    let record = store.approve(id, None).await.expect("approve record");
    assert_eq!(record.status, RecipeStatus::Approved);
    record
}

/// Save a record under an arbitrary status
pub async fn seed_with_status(
    store: &RecordStore,
    id: &str,
    title: &str,
    slug: &str,
    status: RecipeStatus,
) -> RecipeRecord {
    let mut record = sample_record(id, title, slug);
    store.save(&mut record).await.expect("save pending record");
    match status {
        RecipeStatus::Pending => record,
        RecipeStatus::Approved => store.approve(id, None).await.expect("approve"),
        RecipeStatus::Rejected => store.reject(id, Some("Not this week")).await.expect("reject"),
        RecipeStatus::Published => {
            let mut record = store.approve(id, None).await.expect("approve");
            store
                .transition(&mut record, RecipeStatus::Published, None)
                .await
                .expect("publish");
            record
        }
    }
}

/// Publisher rooted in a temp directory, with a fixed sitemap date
pub fn test_publisher(root: &Path) -> Publisher {
    Publisher::new(
        RecordStore::new(root.join("data")),
        root.join("site"),
        root.join("templates/missing.html"),
        SITE_URL,
    )
    .with_date(NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date"))
}

/// Every file below `dir`, relative and sorted
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(base, &path, out);
            } else if let Ok(rel) = path.strip_prefix(base) {
                out.push(rel.to_string_lossy().to_string());
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_scripted_reviews() {
        let generator = MockGenerator::new().with_reviews(vec![reject("Too pale", None)]);
        let mut ctx = recipe_press::core::PipelineContext::new("r1", "Lemon");
        ctx.stage = PipelineStage::CreativeReview;
        let task = StageTask::for_context(&ctx).unwrap();

        match generator.generate(&task).await.unwrap() {
            WorkProduct::Review(review) => assert!(!review.approved),
            other => panic!("unexpected product: {:?}", other),
        }
        match generator.generate(&task).await.unwrap() {
            WorkProduct::Review(review) => assert!(review.approved),
            other => panic!("unexpected product: {:?}", other),
        }
        assert_eq!(generator.count(TaskKind::ReviewPackage), 2);
    }

    #[test]
    fn test_list_files_missing_dir() {
        assert!(list_files(Path::new("/definitely/not/here")).is_empty());
    }
}
