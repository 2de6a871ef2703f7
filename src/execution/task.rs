//! Role-specific tasks handed to content generators

use crate::core::{PipelineContext, PipelineStage, RecipeDraft, RevisionRequest, Role};
use serde::{Deserialize, Serialize};

/// What a role is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CreateRecipe,
    PhotographRecipe,
    WriteDescription,
    ReviewPackage,
    DeployRecipe,
}

impl TaskKind {
    /// The task attached to a stage, if the stage has one
    pub fn for_stage(stage: PipelineStage) -> Option<TaskKind> {
        match stage {
            PipelineStage::RecipeDevelopment => Some(TaskKind::CreateRecipe),
            PipelineStage::Photography => Some(TaskKind::PhotographRecipe),
            PipelineStage::Copywriting => Some(TaskKind::WriteDescription),
            PipelineStage::CreativeReview => Some(TaskKind::ReviewPackage),
            PipelineStage::Deployment => Some(TaskKind::DeployRecipe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::CreateRecipe => "create_recipe",
            TaskKind::PhotographRecipe => "photograph_recipe",
            TaskKind::WriteDescription => "write_description",
            TaskKind::ReviewPackage => "review_package",
            TaskKind::DeployRecipe => "deploy_recipe",
        }
    }
}

/// A unit of work for the role that owns the current stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTask {
    pub kind: TaskKind,
    pub role: Role,
    pub stage: PipelineStage,
    pub recipe_id: String,
    pub concept: String,

    /// Draft so far, for every task after recipe development
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeDraft>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,

    /// Feedback from the most recent revision request, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl StageTask {
    /// Build the task for the context's current stage
    pub fn for_context(ctx: &PipelineContext) -> Option<StageTask> {
        let kind = TaskKind::for_stage(ctx.stage)?;
        let role = ctx.stage.owner()?;

        Some(StageTask {
            kind,
            role,
            stage: ctx.stage,
            recipe_id: ctx.recipe_id.clone(),
            concept: ctx.concept.clone(),
            recipe: ctx.recipe.clone(),
            photos: ctx.photos.clone(),
            feedback: ctx
                .revision_requests
                .last()
                .filter(|r| feedback_applies(r, ctx.stage))
                .map(|r| r.reason.clone()),
        })
    }
}

/// A revision's feedback is for the reworked stage and the stages after it,
/// up to and including the stage that asked for it.
fn feedback_applies(request: &RevisionRequest, stage: PipelineStage) -> bool {
    let Some(asked_at) = request.from_stage.position() else {
        return false;
    };
    // `revisions` has no position; only the reviewer sees that feedback again
    let reworked = request.to_stage.position().unwrap_or(asked_at);
    stage
        .position()
        .is_some_and(|p| reworked <= p && p <= asked_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_only_for_working_stages() {
        use PipelineStage::*;
        assert_eq!(TaskKind::for_stage(RecipeDevelopment), Some(TaskKind::CreateRecipe));
        assert_eq!(TaskKind::for_stage(Deployment), Some(TaskKind::DeployRecipe));
        for stage in [Ideation, FinalApproval, Revisions, Complete] {
            assert_eq!(TaskKind::for_stage(stage), None);
        }
    }

    #[test]
    fn test_task_for_context() {
        let mut ctx = PipelineContext::new("r1", "Lemon muffins");
        assert!(StageTask::for_context(&ctx).is_none());

        ctx.stage = PipelineStage::Photography;
        let task = StageTask::for_context(&ctx).unwrap();
        assert_eq!(task.kind, TaskKind::PhotographRecipe);
        assert_eq!(task.role, Role::ArtDirector);
        assert_eq!(task.recipe_id, "r1");

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["kind"], "photograph_recipe");
        assert!(json.get("feedback").is_none());
    }

    #[test]
    fn test_feedback_limited_to_reworked_stages() {
        use PipelineStage::*;
        let mut ctx = PipelineContext::new("r1", "Lemon muffins");
        ctx.revision_requests.push(RevisionRequest {
            from_stage: CreativeReview,
            to_stage: Photography,
            reason: "Too dark".to_string(),
            requested_by: "creative_director".to_string(),
            timestamp: chrono::Utc::now(),
        });

        let feedback_at = |ctx: &mut PipelineContext, stage| {
            ctx.stage = stage;
            StageTask::for_context(ctx).and_then(|t| t.feedback)
        };

        assert_eq!(feedback_at(&mut ctx, RecipeDevelopment), None);
        assert_eq!(feedback_at(&mut ctx, Photography).as_deref(), Some("Too dark"));
        assert_eq!(feedback_at(&mut ctx, Copywriting).as_deref(), Some("Too dark"));
        assert_eq!(feedback_at(&mut ctx, CreativeReview).as_deref(), Some("Too dark"));
        assert_eq!(feedback_at(&mut ctx, Deployment), None);
    }

    #[test]
    fn test_feedback_through_revisions_reaches_reviewer_only() {
        use PipelineStage::*;
        let mut ctx = PipelineContext::new("r1", "Lemon muffins");
        ctx.revision_requests.push(RevisionRequest {
            from_stage: CreativeReview,
            to_stage: Revisions,
            reason: "Tighten it up".to_string(),
            requested_by: "creative_director".to_string(),
            timestamp: chrono::Utc::now(),
        });

        ctx.stage = CreativeReview;
        let task = StageTask::for_context(&ctx).unwrap();
        assert_eq!(task.feedback.as_deref(), Some("Tighten it up"));

        ctx.stage = Deployment;
        assert!(StageTask::for_context(&ctx).unwrap().feedback.is_none());
    }
}
