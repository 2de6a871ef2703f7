//! Production context - the in-memory state of one recipe run

use crate::core::recipe::Ingredient;
use crate::core::stage::PipelineStage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recipe content produced by the baker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default)]
    pub servings: Option<u32>,

    #[serde(default)]
    pub prep_time_minutes: Option<u32>,

    #[serde(default)]
    pub cook_time_minutes: Option<u32>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Marketing copy produced by the copywriter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyText {
    #[serde(default)]
    pub headline: String,

    pub body: String,

    #[serde(default)]
    pub seo_description: String,
}

/// A reviewer's verdict on the package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: String,

    pub approved: bool,

    #[serde(default)]
    pub feedback: String,

    /// Stage the reviewer wants reworked, if any
    #[serde(default)]
    pub revise_stage: Option<PipelineStage>,
}

/// Output handed to `advance` by whoever did the work for the current stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkProduct {
    Recipe(RecipeDraft),
    Photos { photos: Vec<String> },
    Copy(CopyText),
    Review(Review),
    Note { author: String, text: String },
}

impl WorkProduct {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkProduct::Recipe(_) => "recipe",
            WorkProduct::Photos { .. } => "photos",
            WorkProduct::Copy(_) => "copy",
            WorkProduct::Review(_) => "review",
            WorkProduct::Note { .. } => "note",
        }
    }

    /// Whether this product may be recorded while the run sits at `stage`
    pub fn fits(&self, stage: PipelineStage) -> bool {
        use PipelineStage::*;
        match self {
            WorkProduct::Recipe(_) => stage == RecipeDevelopment,
            WorkProduct::Photos { .. } => stage == Photography,
            WorkProduct::Copy(_) => stage == Copywriting,
            WorkProduct::Review(_) => matches!(stage, CreativeReview | FinalApproval),
            WorkProduct::Note { .. } => true,
        }
    }
}

/// A review kept on the context, tagged with the stage it was given at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub stage: PipelineStage,
    pub review: Review,
    pub timestamp: DateTime<Utc>,
}

/// One entry of the revision log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub from_stage: PipelineStage,
    pub to_stage: PipelineStage,
    pub reason: String,
    pub requested_by: String,
    pub timestamp: DateTime<Utc>,
}

/// A note or piece of feedback in the context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextNote {
    /// The note content
    pub content: String,

    /// Who left the note
    pub author: String,

    /// Stage the run was at when the note was left
    pub stage: PipelineStage,

    pub timestamp: DateTime<Utc>,
}

/// State of a single production run
///
/// Owned by the stage engine while the run is active, then moved into its
/// completed list once the run reaches `complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    pub recipe_id: String,

    pub concept: String,

    pub stage: PipelineStage,

    /// Latest draft from recipe development
    pub recipe: Option<RecipeDraft>,

    /// Image references from photography
    pub photos: Vec<String>,

    /// Latest copy from copywriting
    pub copy: Option<CopyText>,

    pub reviews: Vec<ReviewRecord>,

    pub revision_requests: Vec<RevisionRequest>,

    pub revision_count: u32,

    pub notes: Vec<ContextNote>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineContext {
    /// Create a new context at ideation
    pub fn new(recipe_id: impl Into<String>, concept: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            recipe_id: recipe_id.into(),
            concept: concept.into(),
            stage: PipelineStage::Ideation,
            recipe: None,
            photos: Vec::new(),
            copy: None,
            reviews: Vec::new(),
            revision_requests: Vec::new(),
            revision_count: 0,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Store a work product in the slot for the current stage.
    ///
    /// Returns the product back untouched if it does not belong here.
    pub fn record(&mut self, product: WorkProduct) -> Result<(), WorkProduct> {
        if !product.fits(self.stage) {
            return Err(product);
        }

        let now = Utc::now();
        match product {
            WorkProduct::Recipe(draft) => self.recipe = Some(draft),
            WorkProduct::Photos { photos } => self.photos = photos,
            WorkProduct::Copy(copy) => self.copy = Some(copy),
            WorkProduct::Review(review) => self.reviews.push(ReviewRecord {
                stage: self.stage,
                review,
                timestamp: now,
            }),
            WorkProduct::Note { author, text } => self.notes.push(ContextNote {
                content: text,
                author,
                stage: self.stage,
                timestamp: now,
            }),
        }
        self.updated_at = now;
        Ok(())
    }

    /// The most recent review, if any
    pub fn latest_review(&self) -> Option<&Review> {
        self.reviews.last().map(|r| &r.review)
    }

    /// Title from the draft, falling back to the concept
    pub fn title(&self) -> &str {
        self.recipe
            .as_ref()
            .map(|d| d.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.concept)
    }

    /// Get all notes as a formatted string
    pub fn format_notes(&self) -> String {
        self.notes
            .iter()
            .enumerate()
            .map(|(i, note)| format!("{}. [{} @ {}] {}\n", i + 1, note.author, note.stage, note.content))
            .collect()
    }
}
