//! Production stages and the roles that own them

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named step of the recipe production pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Ideation,
    RecipeDevelopment,
    Photography,
    Copywriting,
    CreativeReview,
    /// Pseudo-stage for rework that has no single owner
    Revisions,
    FinalApproval,
    Deployment,
    Complete,
}

/// The canonical order a run visits when no revisions are requested
pub const CANONICAL_ORDER: [PipelineStage; 8] = [
    PipelineStage::Ideation,
    PipelineStage::RecipeDevelopment,
    PipelineStage::Photography,
    PipelineStage::Copywriting,
    PipelineStage::CreativeReview,
    PipelineStage::FinalApproval,
    PipelineStage::Deployment,
    PipelineStage::Complete,
];

impl PipelineStage {
    /// The stage that follows this one, `None` for the terminal stage
    pub fn next(self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Ideation => Some(RecipeDevelopment),
            RecipeDevelopment => Some(Photography),
            Photography => Some(Copywriting),
            Copywriting => Some(CreativeReview),
            CreativeReview => Some(FinalApproval),
            Revisions => Some(CreativeReview),
            FinalApproval => Some(Deployment),
            Deployment => Some(Complete),
            Complete => None,
        }
    }

    /// The role responsible for this stage, if a single role owns it
    pub fn owner(self) -> Option<Role> {
        use PipelineStage::*;
        match self {
            Ideation | CreativeReview | FinalApproval => Some(Role::CreativeDirector),
            RecipeDevelopment => Some(Role::Baker),
            Photography => Some(Role::ArtDirector),
            Copywriting => Some(Role::Copywriter),
            Deployment => Some(Role::SiteArchitect),
            Revisions | Complete => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Position in the canonical order (`Revisions` has none)
    pub fn position(self) -> Option<usize> {
        CANONICAL_ORDER.iter().position(|s| *s == self)
    }

    /// Stages a revision may be routed to from this stage.
    ///
    /// Only stages strictly upstream of the current one that produce work are
    /// eligible, plus the `Revisions` holding stage while a review is underway.
    pub fn revision_targets(self) -> Vec<PipelineStage> {
        use PipelineStage::*;
        let reworkable = [
            Ideation,
            RecipeDevelopment,
            Photography,
            Copywriting,
            CreativeReview,
        ];

        let mut targets: Vec<PipelineStage> = match self.position() {
            Some(current) => reworkable
                .into_iter()
                .filter(|s| s.position().is_some_and(|p| p < current))
                .collect(),
            // Revisions sits between copywriting and review
            None => vec![Ideation, RecipeDevelopment, Photography, Copywriting],
        };

        if matches!(self, CreativeReview | FinalApproval) {
            targets.push(Revisions);
        }

        targets
    }

    pub fn can_revise_to(self, target: PipelineStage) -> bool {
        self.revision_targets().contains(&target)
    }

    pub fn as_str(self) -> &'static str {
        use PipelineStage::*;
        match self {
            Ideation => "ideation",
            RecipeDevelopment => "recipe_development",
            Photography => "photography",
            Copywriting => "copywriting",
            CreativeReview => "creative_review",
            Revisions => "revisions",
            FinalApproval => "final_approval",
            Deployment => "deployment",
            Complete => "complete",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-generation roles that own stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    CreativeDirector,
    Baker,
    ArtDirector,
    Copywriter,
    SiteArchitect,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::CreativeDirector => "creative_director",
            Role::Baker => "baker",
            Role::ArtDirector => "art_director",
            Role::Copywriter => "copywriter",
            Role::SiteArchitect => "site_architect",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
