//! Command-backed content generator

use crate::agent::client::GeneratorClientConfig;
use crate::agent::response::parse_work_product;
use crate::agent::{AgentError, ContentGenerator};
use crate::core::WorkProduct;
use crate::execution::StageTask;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs an external command for every task
///
/// Invoked as `<program> <args...> <task-json>`; stdout must hold a work
/// product document.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: GeneratorClientConfig,
}

impl CommandGenerator {
    pub fn new(config: GeneratorClientConfig) -> Self {
        Self { config }
    }

    pub fn program(&self) -> &str {
        &self.config.program
    }

    async fn run(&self, task_json: &str) -> Result<String, AgentError> {
        debug!(
            "Spawning generator {} with task of {} bytes",
            self.config.program,
            task_json.len()
        );

        let result = timeout(
            Duration::from_secs(self.config.timeout_secs),
            Command::new(&self.config.program)
                .args(&self.config.args)
                .arg(task_json)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AgentError::Timeout(self.config.timeout_secs))?;

        let output = result.map_err(|e| {
            AgentError::Internal(format!("Failed to execute {}: {}", self.config.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(
                "{} exited with code {}: {}",
                self.config.program,
                exit_code,
                stderr.trim()
            );
            return Err(AgentError::Api(format!(
                "{} exited with code {}: {}",
                self.config.program,
                exit_code,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AgentError::Internal(format!("Failed to decode generator output: {}", e)))
    }
}

#[async_trait]
impl ContentGenerator for CommandGenerator {
    async fn generate(&self, task: &StageTask) -> Result<WorkProduct, AgentError> {
        let task_json =
            serde_json::to_string(task).map_err(|e| AgentError::Internal(e.to_string()))?;
        let stdout = self.run(&task_json).await?;
        let product = parse_work_product(&stdout)?;
        debug!("Generator returned {} for {}", product.kind(), task.kind.as_str());
        Ok(product)
    }
}
