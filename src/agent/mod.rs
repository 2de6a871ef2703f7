//! Content generators that do the work of each stage

pub mod client;
pub mod response;
pub mod subprocess_client;

use crate::core::WorkProduct;
use crate::execution::StageTask;
use async_trait::async_trait;
pub use client::GeneratorClientConfig;
pub use response::{parse_work_product, AgentError};
pub use subprocess_client::CommandGenerator;

/// Trait for content generation - allows for different implementations
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce the work product for a stage task
    async fn generate(&self, task: &StageTask) -> Result<WorkProduct, AgentError>;
}
