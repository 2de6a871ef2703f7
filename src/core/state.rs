//! Review lifecycle states for stored recipes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A record's position in the review lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    /// Produced by the pipeline, waiting for a human reviewer
    Pending,
    /// Accepted by a reviewer, ready to publish
    Approved,
    /// Live on the site
    Published,
    /// Turned down by a reviewer
    Rejected,
}

impl RecipeStatus {
    /// Fixed scan order used when looking a record up by id
    pub const ALL: [RecipeStatus; 4] = [
        RecipeStatus::Pending,
        RecipeStatus::Approved,
        RecipeStatus::Published,
        RecipeStatus::Rejected,
    ];

    /// Directory name under the record base
    pub fn as_str(self) -> &'static str {
        match self {
            RecipeStatus::Pending => "pending",
            RecipeStatus::Approved => "approved",
            RecipeStatus::Published => "published",
            RecipeStatus::Rejected => "rejected",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `Published -> Published` is allowed so a live recipe can be republished.
    /// Nothing leaves `Rejected`.
    pub fn can_transition_to(self, next: RecipeStatus) -> bool {
        use RecipeStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Published)
                | (Approved, Rejected)
                | (Published, Published)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RecipeStatus::Rejected)
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(RecipeStatus::Pending),
            "approved" => Ok(RecipeStatus::Approved),
            "published" => Ok(RecipeStatus::Published),
            "rejected" => Ok(RecipeStatus::Rejected),
            other => Err(format!("Unknown recipe status: {}", other)),
        }
    }
}
