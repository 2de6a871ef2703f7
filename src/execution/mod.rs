//! Production pipeline execution

pub mod engine;
pub mod orchestrator;
pub mod task;

pub use engine::{EventHandler, PipelineStatistics, StageEngine, StageError, StageEvent};
pub use orchestrator::{compile_record, Orchestrator, OrchestratorError, ProductionOutcome};
pub use task::{StageTask, TaskKind};
