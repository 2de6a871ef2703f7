use anyhow::{Context, Result};
use recipe_press::agent::{CommandGenerator, GeneratorClientConfig};
use recipe_press::cli::commands::{
    ListCommand, ProduceCommand, PublishAllCommand, PublishCommand, RebuildCommand, ReviewCommand,
    ShowCommand, ValidateCommand,
};
use recipe_press::cli::output::*;
use recipe_press::cli::{Cli, Command};
use recipe_press::core::{RecipeStatus, SiteConfig, CANONICAL_ORDER};
use recipe_press::execution::{Orchestrator, StageEvent};
use recipe_press::persistence::{RecordStore, StoryStore};
use recipe_press::publishing::{translate, GitSync, Publisher, WebhookNotifier};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging, RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    if let Command::Validate(cmd) = &cli.command {
        return validate_config(cmd, cli.config.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Produce(cmd) => produce(cmd, &config).await?,
        Command::Approve(cmd) => review(cmd, &config, RecipeStatus::Approved).await?,
        Command::Reject(cmd) => review(cmd, &config, RecipeStatus::Rejected).await?,
        Command::List(cmd) => list_recipes(cmd, &config).await?,
        Command::Show(cmd) => show_recipe(cmd, &config).await?,
        Command::Publish(cmd) => publish(cmd, &config).await?,
        Command::PublishAll(cmd) => publish_all(cmd, &config).await?,
        Command::Rebuild(cmd) => rebuild(cmd, &config).await?,
        Command::Validate(_) => {}
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<SiteConfig> {
    match path {
        Some(path) => SiteConfig::from_file(path)
            .with_context(|| format!("Failed to load site config from {}", path)),
        None => SiteConfig::discover().context("Failed to load site config"),
    }
}

fn notifier(config: &SiteConfig) -> Result<Option<Arc<WebhookNotifier>>> {
    match &config.notify.webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::new(url.clone(), config.notify.admin_base_url.clone())
                .context("Failed to build webhook client")?;
            Ok(Some(Arc::new(notifier)))
        }
        None => Ok(None),
    }
}

fn publisher(config: &SiteConfig, no_sync: bool, no_notify: bool) -> Result<Publisher> {
    let mut publisher = Publisher::from_config(config);

    if config.sync.enabled && !no_sync {
        let sync = GitSync::new(&config.project_root, &config.output_dir)
            .with_push(config.sync.push)
            .with_timeout(config.sync.timeout_secs);
        publisher = publisher.with_sync(Arc::new(sync));
    }

    if !no_notify {
        if let Some(notifier) = notifier(config)? {
            publisher = publisher.with_notifier(notifier);
        }
    }

    Ok(publisher)
}

async fn produce(cmd: &ProduceCommand, config: &SiteConfig) -> Result<()> {
    let generator = CommandGenerator::new(GeneratorClientConfig::from(&config.generator));
    let store = RecordStore::new(config.data_path());

    let mut orchestrator =
        Orchestrator::new(generator, store)
            .with_stories(StoryStore::new(config.stories_path()))
            .with_max_revisions(config.max_revisions);
    if !cmd.no_notify {
        if let Some(notifier) = notifier(config)? {
            orchestrator = orchestrator.with_notifier(notifier);
        }
    }

    let progress = create_progress_bar(CANONICAL_ORDER.len() - 1);
    let bar = progress.clone();
    orchestrator.engine_mut().add_event_handler(move |event| {
        match &event {
            StageEvent::StageAdvanced { to, .. } => {
                bar.inc(1);
                bar.set_message(to.to_string());
            }
            StageEvent::RevisionRequested { to, .. } => {
                if let Some(position) = to.position() {
                    bar.set_position(position as u64);
                }
            }
            _ => {}
        }
        bar.println(format_stage_event(&event));
    });

    let result = match &cmd.id {
        Some(id) => orchestrator.produce_with_id(id, &cmd.concept).await,
        None => orchestrator.produce(&cmd.concept).await,
    };
    progress.finish_and_clear();

    match result {
        Ok(outcome) => {
            println!(
                "\n{} {} saved for review",
                CHECK,
                style(&outcome.record.title).bold()
            );
            println!("  ID: {}", style(&outcome.record.id).cyan());
            println!("  Revisions: {}", outcome.revisions);
            println!("  Stored at: {}", style(outcome.stored_at.display()).dim());
            println!("  Story: {}", style(outcome.story_path.display()).dim());
            Ok(())
        }
        Err(e) => {
            println!("\n{} Production {}", CROSS, style("failed").red());
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn review(cmd: &ReviewCommand, config: &SiteConfig, status: RecipeStatus) -> Result<()> {
    let store = RecordStore::new(config.data_path());
    let notes = cmd.notes.as_deref();

    let record = match status {
        RecipeStatus::Approved => store.approve(&cmd.id, notes).await,
        _ => store.reject(&cmd.id, notes).await,
    }
    .with_context(|| format!("Failed to mark {} as {}", cmd.id, status))?;

    println!("{}", format_record_line(&record));
    Ok(())
}

async fn list_recipes(cmd: &ListCommand, config: &SiteConfig) -> Result<()> {
    let store = RecordStore::new(config.data_path());
    let records = match cmd.status {
        Some(status) => store.list_by_status(status.into()).await?,
        None => store.list_all().await?,
    };

    if cmd.json {
        let data = serde_json::json!({ "recipes": records });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No recipes found", INFO);
        return Ok(());
    }

    for record in &records {
        println!("  {}", format_record_line(record));
    }
    Ok(())
}

async fn show_recipe(cmd: &ShowCommand, config: &SiteConfig) -> Result<()> {
    let store = RecordStore::new(config.data_path());
    let record = store
        .load(&cmd.id)
        .await
        .with_context(|| format!("Failed to load recipe {}", cmd.id))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let view = translate(&record);
    println!("{}", format_record_line(&record));
    println!("  Slug: {}", style(&record.slug).cyan());
    println!("  Category: {}", view.category);
    println!("  Prep / Cook / Yield: {} / {} / {}", view.prep, view.cook, view.yields);
    if !view.description.is_empty() {
        println!("\n{}", format_output(&view.description, 6));
    }
    if !view.ingredients.is_empty() {
        println!("\n  {}", style("Ingredients").bold());
        for line in &view.ingredients {
            println!("    - {}", line);
        }
    }
    if let Some(notes) = &record.review_notes {
        println!("\n  Notes: {}", style(notes).dim());
    }
    Ok(())
}

async fn publish(cmd: &PublishCommand, config: &SiteConfig) -> Result<()> {
    let publisher = publisher(config, cmd.no_sync, cmd.no_notify)?;

    let spinner = create_spinner(format!("Publishing {}", cmd.id));
    let result = publisher.publish(&cmd.id).await;
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            println!("{} Published {}", ROCKET, style(&receipt.title).bold());
            println!("  Page: {}", style(receipt.page_path.display()).dim());
            println!("  Index: {} recipes", receipt.index_size);
            println!("  {}", format_sync_outcome(&receipt.sync));
            Ok(())
        }
        Err(e) => {
            println!("{} Publish {}", CROSS, style("failed").red());
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn publish_all(cmd: &PublishAllCommand, config: &SiteConfig) -> Result<()> {
    let publisher = publisher(config, cmd.no_sync, cmd.no_notify)?;

    let spinner = create_spinner("Publishing approved recipes");
    let report = publisher.publish_all().await;
    spinner.finish_and_clear();
    let report = report.context("Batch publish failed")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for item in &report.items {
        match &item.error {
            None => println!("  {} {}", CHECK, style(&item.title).bold()),
            Some(err) => println!("  {} {}: {}", CROSS, style(&item.title).bold(), style(err).red()),
        }
    }
    println!(
        "\n{} {} published, {} failed, {} total",
        INFO,
        style(report.succeeded).green(),
        style(report.failed).red(),
        report.total
    );

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn rebuild(cmd: &RebuildCommand, config: &SiteConfig) -> Result<()> {
    let publisher = publisher(config, true, true)?;

    let spinner = create_spinner("Rebuilding site");
    let report = publisher.rebuild().await;
    spinner.finish_and_clear();
    let report = report.context("Site rebuild failed")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} Rebuilt {} pages into {}",
            CHECK,
            style(report.pages).cyan(),
            style(report.output_dir.display()).dim()
        );
    }
    Ok(())
}

fn validate_config(cmd: &ValidateCommand, global: Option<&str>) -> Result<()> {
    println!("{} Validating site config...", INFO);

    let path = cmd.file.as_deref().or(global);
    match load_config(path) {
        Ok(config) => {
            println!("{} Site configuration is valid!", CHECK);
            println!("  Site: {}", style(&config.site_url).bold());
            println!("  Records: {}", style(config.data_path().display()).cyan());
            println!("  Output: {}", style(config.output_path().display()).cyan());
            println!(
                "  Sync: {}",
                if config.sync.enabled { style("enabled").green() } else { style("disabled").dim() }
            );

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}
