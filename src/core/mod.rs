//! Core domain models for recipe production
//!
//! This module defines the fundamental data structures that represent
//! pipeline stages, production contexts, stored records, creation stories
//! and configuration.

pub mod config;
pub mod context;
pub mod recipe;
pub mod stage;
pub mod state;
pub mod story;

pub use config::SiteConfig;
pub use context::*;
pub use recipe::*;
pub use stage::*;
pub use state::*;
pub use story::*;
