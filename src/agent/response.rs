//! Generator response handling

use crate::core::WorkProduct;
use thiserror::Error;

/// Error types for content generator operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Generator error: {0}")]
    Api(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Malformed work product: {0}")]
    Malformed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Parse a generator's stdout into a work product.
///
/// Generators tend to wrap their JSON in chatter or code fences, so when the
/// whole output is not a document the outermost `{...}` span is tried.
pub fn parse_work_product(output: &str) -> Result<WorkProduct, AgentError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(AgentError::Malformed("empty output".to_string()));
    }

    if let Ok(product) = serde_json::from_str::<WorkProduct>(trimmed) {
        return Ok(product);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&trimmed[start..=end]).map_err(|e| AgentError::Malformed(e.to_string()))
        }
        _ => Err(AgentError::Malformed("no JSON object in output".to_string())),
    }
}
