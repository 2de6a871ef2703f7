//! recipe-press - recipe production pipeline and static site publisher

pub mod agent;
pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod publishing;

// Re-export commonly used types
pub use agent::{AgentError, CommandGenerator, ContentGenerator, GeneratorClientConfig};
pub use core::{PipelineContext, PipelineStage, RecipeRecord, RecipeStatus, Role, SiteConfig, WorkProduct};
pub use execution::{Orchestrator, StageEngine, StageError, StageEvent};
pub use persistence::{RecordStore, StoreError};
pub use publishing::{PublishError, Publisher, SiteIndexWriter, WebRecipeView};
