//! Behind-the-scenes account of a production run

use crate::core::{PipelineContext, PipelineStage, ReviewRecord, RevisionRequest, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one role did during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub role: Role,
    pub stage: PipelineStage,

    /// Short description of the work, e.g. "Developed the recipe"
    pub contribution: String,

    /// Notable decisions and remarks, in the order they were made
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// The story of how a recipe was produced, persisted next to the record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationStory {
    pub story_id: String,
    pub recipe_id: String,
    pub title: String,

    /// One-line digest of the first few contributions
    #[serde(default)]
    pub summary: String,

    /// Markdown narrative built from the contributions
    #[serde(default)]
    pub full_story: String,

    #[serde(default)]
    pub contributions: Vec<Contribution>,

    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,

    #[serde(default)]
    pub revision_history: Vec<RevisionRequest>,

    #[serde(default)]
    pub total_revisions: u32,

    #[serde(default)]
    pub time_to_complete_minutes: Option<i64>,

    pub started_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CreationStory {
    /// Compile the story of a finished run
    pub fn from_context(story_id: impl Into<String>, ctx: &PipelineContext) -> Self {
        let contributions = contributions(ctx);
        let title = format!("How We Made: {}", ctx.title());

        let summary = contributions
            .iter()
            .take(3)
            .map(|c| match c.highlights.first() {
                Some(first) => format!("{} ({}): {}", c.role, c.contribution, first),
                None => format!("{} ({})", c.role, c.contribution),
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let mut full_story = format!("# {}\n", title);
        for c in &contributions {
            full_story.push_str(&format!("\n## {} - {}\n", c.role, c.contribution));
            for highlight in &c.highlights {
                full_story.push_str(&format!("- {}\n", highlight));
            }
        }
        if !ctx.revision_requests.is_empty() {
            full_story.push_str("\n## Revisions\n");
            for r in &ctx.revision_requests {
                full_story.push_str(&format!(
                    "- {} sent {} back to {}: {}\n",
                    r.requested_by, r.from_stage, r.to_stage, r.reason
                ));
            }
        }

        Self {
            story_id: story_id.into(),
            recipe_id: ctx.recipe_id.clone(),
            title,
            summary,
            full_story,
            contributions,
            reviews: ctx.reviews.clone(),
            revision_history: ctx.revision_requests.clone(),
            total_revisions: ctx.revision_count,
            time_to_complete_minutes: ctx
                .completed_at
                .map(|done| (done - ctx.created_at).num_minutes()),
            started_at: ctx.created_at,
            completed_at: ctx.completed_at,
        }
    }

    /// File name the story is stored under
    pub fn file_name(&self) -> String {
        format!("story_{}.json", self.story_id)
    }
}

fn notes_at(ctx: &PipelineContext, stage: PipelineStage) -> impl Iterator<Item = String> + '_ {
    ctx.notes
        .iter()
        .filter(move |n| n.stage == stage)
        .map(|n| n.content.clone())
}

fn contributions(ctx: &PipelineContext) -> Vec<Contribution> {
    let mut out = Vec::new();

    if let Some(draft) = &ctx.recipe {
        let mut highlights = vec![format!(
            "{} ingredients, {} steps",
            draft.ingredients.len(),
            draft.instructions.len()
        )];
        highlights.extend(notes_at(ctx, PipelineStage::RecipeDevelopment));
        out.push(Contribution {
            role: Role::Baker,
            stage: PipelineStage::RecipeDevelopment,
            contribution: "Developed the recipe".to_string(),
            highlights,
        });
    }

    if !ctx.photos.is_empty() {
        let mut highlights = vec![format!("{} photos", ctx.photos.len())];
        highlights.extend(notes_at(ctx, PipelineStage::Photography));
        out.push(Contribution {
            role: Role::ArtDirector,
            stage: PipelineStage::Photography,
            contribution: "Photographed the recipe".to_string(),
            highlights,
        });
    }

    if let Some(copy) = &ctx.copy {
        let mut highlights = Vec::new();
        if !copy.headline.is_empty() {
            highlights.push(copy.headline.clone());
        }
        highlights.extend(notes_at(ctx, PipelineStage::Copywriting));
        out.push(Contribution {
            role: Role::Copywriter,
            stage: PipelineStage::Copywriting,
            contribution: "Wrote the description".to_string(),
            highlights,
        });
    }

    if !ctx.reviews.is_empty() {
        let highlights = ctx
            .reviews
            .iter()
            .filter(|r| !r.review.feedback.is_empty())
            .map(|r| r.review.feedback.clone())
            .collect();
        out.push(Contribution {
            role: Role::CreativeDirector,
            stage: PipelineStage::CreativeReview,
            contribution: "Reviewed the package".to_string(),
            highlights,
        });
    }

    let deployment: Vec<String> = notes_at(ctx, PipelineStage::Deployment).collect();
    if !deployment.is_empty() {
        out.push(Contribution {
            role: Role::SiteArchitect,
            stage: PipelineStage::Deployment,
            contribution: "Prepared the deployment".to_string(),
            highlights: deployment,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CopyText, Review, WorkProduct};

    fn review(approved: bool, feedback: &str) -> WorkProduct {
        WorkProduct::Review(Review {
            reviewer: "creative_director".to_string(),
            approved,
            feedback: feedback.to_string(),
            revise_stage: None,
        })
    }

    #[test]
    fn test_story_from_sparse_context() {
        let ctx = PipelineContext::new("r1", "Savory Oat Cups");
        let story = CreationStory::from_context("s1", &ctx);

        assert_eq!(story.title, "How We Made: Savory Oat Cups");
        assert!(story.contributions.is_empty());
        assert!(story.summary.is_empty());
        assert_eq!(story.total_revisions, 0);
        assert!(story.time_to_complete_minutes.is_none());
        assert_eq!(story.file_name(), "story_s1.json");
    }

    #[test]
    fn test_story_collects_contributions_and_revisions() {
        let mut ctx = PipelineContext::new("r1", "Lemon");
        ctx.photos = vec!["a.jpg".to_string()];
        ctx.copy = Some(CopyText {
            headline: "Bright and tender".to_string(),
            body: String::new(),
            seo_description: String::new(),
        });

        ctx.stage = PipelineStage::CreativeReview;
        ctx.record(review(false, "Too dark")).unwrap();
        ctx.revision_requests.push(RevisionRequest {
            from_stage: PipelineStage::CreativeReview,
            to_stage: PipelineStage::Photography,
            reason: "Too dark".to_string(),
            requested_by: "creative_director".to_string(),
            timestamp: Utc::now(),
        });
        ctx.revision_count = 1;
        ctx.record(review(true, "Ship it")).unwrap();

        ctx.stage = PipelineStage::Deployment;
        ctx.record(WorkProduct::Note {
            author: "site_architect".to_string(),
            text: "Staged r1".to_string(),
        })
        .unwrap();
        ctx.completed_at = Some(ctx.created_at + chrono::Duration::minutes(7));

        let story = CreationStory::from_context("s1", &ctx);
        let roles: Vec<Role> = story.contributions.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::ArtDirector,
                Role::Copywriter,
                Role::CreativeDirector,
                Role::SiteArchitect
            ]
        );
        assert_eq!(story.contributions[2].highlights, vec!["Too dark", "Ship it"]);
        assert_eq!(story.total_revisions, 1);
        assert_eq!(story.revision_history.len(), 1);
        assert_eq!(story.reviews.len(), 2);
        assert_eq!(story.time_to_complete_minutes, Some(7));
        assert!(story.summary.starts_with("art_director (Photographed the recipe): 1 photos"));
        assert!(story.full_story.contains("creative_director sent creative_review back to photography: Too dark"));
    }
}
