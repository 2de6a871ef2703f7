//! Site configuration from YAML

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `notify.webhook_url`
pub const WEBHOOK_ENV: &str = "RECIPE_PRESS_WEBHOOK_URL";

/// File name looked up when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "site.yaml";

/// Top-level site configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory every relative path below is resolved against
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Base of the status-partitioned record store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Creation stories, one `story_<id>.json` per production run
    #[serde(default = "default_stories_dir")]
    pub stories_dir: PathBuf,

    /// Root of the generated site (pages, index, sitemap)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Recipe page template
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Public base URL, no trailing slash
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Revision loops allowed per production run
    #[serde(default = "default_max_revisions")]
    pub max_revisions: u32,
}

/// Version-control sync after publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Push after committing
    #[serde(default)]
    pub push: bool,

    /// Timeout for each git invocation (in seconds)
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,
}

/// Review and publish notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Linked from ready-for-review notices
    #[serde(default)]
    pub admin_base_url: Option<String>,
}

/// External command that produces work products
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout per task (in seconds)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/recipes")
}

fn default_stories_dir() -> PathBuf {
    PathBuf::from("data/stories")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_template() -> PathBuf {
    PathBuf::from("src/templates/recipe_page.html")
}

fn default_site_url() -> String {
    "https://muffinpanrecipes.com".to_string()
}

fn default_sync_timeout() -> u64 {
    60
}

fn default_max_revisions() -> u32 {
    3
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            push: false,
            timeout_secs: default_sync_timeout(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            data_dir: default_data_dir(),
            stories_dir: default_stories_dir(),
            output_dir: default_output_dir(),
            template: default_template(),
            site_url: default_site_url(),
            sync: SyncConfig::default(),
            notify: NotifyConfig::default(),
            generator: GeneratorConfig::default(),
            max_revisions: default_max_revisions(),
        }
    }
}

impl SiteConfig {
    /// Load site configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse site configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: SiteConfig = serde_yaml::from_str(yaml)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config to use when none is given on the command line.
    ///
    /// Looks for `site.yaml` in the working directory, then under the user
    /// config directory, and falls back to defaults.
    pub fn discover() -> Result<Self> {
        let candidates = [
            Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
            dirs::config_dir().map(|d| d.join("recipe-press").join(DEFAULT_CONFIG_FILE)),
        ];

        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                tracing::debug!("Loading site config from {}", path.display());
                return Self::from_file(&path);
            }
        }

        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Validate the site configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.site_url.starts_with("http://") || self.site_url.starts_with("https://")) {
            anyhow::bail!("site_url must be an http(s) URL: {}", self.site_url);
        }

        if self.site_url.ends_with('/') {
            anyhow::bail!("site_url must not end with '/': {}", self.site_url);
        }

        if self.data_dir.as_os_str().is_empty() {
            anyhow::bail!("data_dir must not be empty");
        }

        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir must not be empty");
        }

        if self.sync.timeout_secs == 0 {
            anyhow::bail!("sync.timeout_secs must be greater than zero");
        }

        if let Some(url) = &self.notify.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("notify.webhook_url must be an http(s) URL: {}", url);
            }
        }

        if let Some(program) = &self.generator.program {
            if program.trim().is_empty() {
                anyhow::bail!("generator.program must not be blank");
            }
        }

        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV) {
            if !url.trim().is_empty() {
                self.notify.webhook_url = Some(url);
            }
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.project_root.join(&self.data_dir)
    }

    pub fn stories_path(&self) -> PathBuf {
        self.project_root.join(&self.stories_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.project_root.join(&self.output_dir)
    }

    pub fn template_path(&self) -> PathBuf {
        self.project_root.join(&self.template)
    }
}
