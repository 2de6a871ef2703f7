//! CLI command definitions

use crate::core::RecipeStatus;
use clap::Args;

/// Run the production pipeline
#[derive(Debug, Args, Clone)]
pub struct ProduceCommand {
    /// Recipe concept, e.g. "lemon ricotta muffins"
    pub concept: String,

    /// Use this recipe id instead of a generated one
    #[arg(long)]
    pub id: Option<String>,

    /// Don't send the ready-for-review notification
    #[arg(long)]
    pub no_notify: bool,
}

/// Approve or reject a recipe
#[derive(Debug, Args, Clone)]
pub struct ReviewCommand {
    /// Recipe id
    pub id: String,

    /// Reviewer notes stored on the record
    #[arg(short, long)]
    pub notes: Option<String>,
}

/// List stored recipes
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Only show recipes with this status
    #[arg(short, long, value_enum)]
    pub status: Option<RecipeStatusArg>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show one recipe
#[derive(Debug, Args, Clone)]
pub struct ShowCommand {
    /// Recipe id
    pub id: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Publish one recipe
#[derive(Debug, Args, Clone)]
pub struct PublishCommand {
    /// Recipe id
    pub id: String,

    /// Skip the git sync even if enabled in the config
    #[arg(long)]
    pub no_sync: bool,

    /// Don't send the published notification
    #[arg(long)]
    pub no_notify: bool,
}

/// Publish every approved recipe
#[derive(Debug, Args, Clone)]
pub struct PublishAllCommand {
    /// Skip the git sync even if enabled in the config
    #[arg(long)]
    pub no_sync: bool,

    /// Don't send notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Rebuild the site
#[derive(Debug, Args, Clone)]
pub struct RebuildCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a site configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to site YAML file (defaults to the discovered config)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Recipe status argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecipeStatusArg {
    Pending,
    Approved,
    Published,
    Rejected,
}

impl From<RecipeStatusArg> for RecipeStatus {
    fn from(arg: RecipeStatusArg) -> Self {
        match arg {
            RecipeStatusArg::Pending => RecipeStatus::Pending,
            RecipeStatusArg::Approved => RecipeStatus::Approved,
            RecipeStatusArg::Published => RecipeStatus::Published,
            RecipeStatusArg::Rejected => RecipeStatus::Rejected,
        }
    }
}
