//! Content generator client configuration

use crate::core::config::GeneratorConfig;

/// Configuration for the command-backed generator
#[derive(Debug, Clone)]
pub struct GeneratorClientConfig {
    /// Executable invoked once per task
    pub program: String,

    /// Arguments placed before the task document
    pub args: Vec<String>,

    /// Timeout per task in seconds
    pub timeout_secs: u64,
}

impl Default for GeneratorClientConfig {
    fn default() -> Self {
        Self {
            program: "recipe-generator".to_string(),
            args: Vec::new(),
            timeout_secs: 600,
        }
    }
}

impl GeneratorClientConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl From<&GeneratorConfig> for GeneratorClientConfig {
    fn from(config: &GeneratorConfig) -> Self {
        let mut client = Self::default();
        if let Some(program) = &config.program {
            client.program = program.clone();
        }
        client.args = config.args.clone();
        if let Some(timeout_secs) = config.timeout_secs {
            client.timeout_secs = timeout_secs;
        }
        client
    }
}
