//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{
    ListCommand, ProduceCommand, PublishAllCommand, PublishCommand, RebuildCommand, ReviewCommand,
    ShowCommand, ValidateCommand,
};
use std::ffi::OsString;

/// Recipe production pipeline and static site publisher
#[derive(Debug, Parser, Clone)]
#[command(name = "recipe-press")]
#[command(version)]
#[command(about = "Produce, review and publish recipes to a static site", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to site configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the production pipeline for a new concept
    Produce(ProduceCommand),

    /// Approve a pending recipe
    Approve(ReviewCommand),

    /// Reject a pending or approved recipe
    Reject(ReviewCommand),

    /// List stored recipes
    List(ListCommand),

    /// Show one stored recipe
    Show(ShowCommand),

    /// Publish an approved recipe to the site
    Publish(PublishCommand),

    /// Publish every approved recipe
    PublishAll(PublishAllCommand),

    /// Regenerate the site from published recipes
    Rebuild(RebuildCommand),

    /// Validate a site configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
