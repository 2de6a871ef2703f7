//! CLI output formatting

use crate::{
    core::{PipelineStage, RecipeRecord, RecipeStatus},
    execution::StageEvent,
    publishing::SyncOutcome,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static MUFFIN: Emoji<'_, '_> = Emoji("🧁 ", "* ");

/// Create a progress bar over the pipeline stages
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Create a spinner for a single long-running action
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a recipe status for display
pub fn format_status(status: RecipeStatus) -> String {
    match status {
        RecipeStatus::Pending => style("PENDING").yellow().to_string(),
        RecipeStatus::Approved => style("APPROVED").cyan().to_string(),
        RecipeStatus::Published => style("PUBLISHED").green().to_string(),
        RecipeStatus::Rejected => style("REJECTED").red().to_string(),
    }
}

/// Format a pipeline stage for display
pub fn format_stage(stage: PipelineStage) -> String {
    let owner = stage
        .owner()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    format!("{}{}", style(stage).cyan(), style(owner).dim())
}

/// One-line summary of a stored recipe
pub fn format_record_line(record: &RecipeRecord) -> String {
    format!(
        "{} {} - {} - {}",
        MUFFIN,
        style(&record.id).dim(),
        style(&record.title).bold(),
        format_status(record.status)
    )
}

/// Format a stage engine event for display
pub fn format_stage_event(event: &StageEvent) -> String {
    match event {
        StageEvent::RunStarted { recipe_id, concept } => format!(
            "{} Starting production of {} ({})",
            ROCKET,
            style(concept).bold(),
            style(recipe_id).dim()
        ),
        StageEvent::StageAdvanced { from, to, .. } => {
            format!("{} {} → {}", CHECK, style(from).green(), format_stage(*to))
        }
        StageEvent::RevisionRequested { from, to, reason, .. } => format!(
            "{} {} sent back to {}: {}",
            WARN,
            style(from).yellow(),
            format_stage(*to),
            style(reason).dim()
        ),
        StageEvent::RunCompleted { recipe_id, revisions } => format!(
            "{} Production of {} complete ({} revisions)",
            INFO,
            style(recipe_id).dim(),
            style(revisions).cyan()
        ),
    }
}

/// Format the sync step of a publish
pub fn format_sync_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Skipped => format!("{} Sync skipped", INFO),
        SyncOutcome::Synced { pushed: true } => format!("{} Committed and pushed", CHECK),
        SyncOutcome::Synced { pushed: false } => format!("{} Committed", CHECK),
        SyncOutcome::Failed { error } => {
            format!("{} Sync failed: {}", WARN, style(error).red())
        }
    }
}

/// Format long text with line truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_output_truncates() {
        let text = "a\nb\nc\nd";
        assert_eq!(format_output(text, 5), text);

        let cut = format_output(text, 2);
        assert!(cut.starts_with("a\nb\n"));
        assert!(cut.contains("(2 more lines)"));
    }

    #[test]
    fn test_format_stage_event_mentions_stages() {
        let line = format_stage_event(&StageEvent::RevisionRequested {
            recipe_id: "r1".to_string(),
            from: PipelineStage::CreativeReview,
            to: PipelineStage::Photography,
            reason: "Too dark".to_string(),
        });
        let plain = console::strip_ansi_codes(&line);
        assert!(plain.contains("creative_review"));
        assert!(plain.contains("photography (art_director)"));
        assert!(plain.contains("Too dark"));
    }
}
