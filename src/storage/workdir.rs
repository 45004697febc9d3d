//! Deployment directory management
//!
//! Every erxes deployment lives in one directory holding `configs.json`,
//! the generated compose files, downloaded UI bundles and locales, and
//! the datastore volume directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{ConfigStore, Configuration};

/// Name of the persisted configuration file
pub const CONFIGS_FILE: &str = "configs.json";

#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("No configs.json found at {0}. Run 'erxes init' first.")]
    NotInitialized(PathBuf),
}

/// An erxes deployment directory
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    /// Opens an existing deployment directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(CONFIGS_FILE).is_file() {
            return Err(WorkdirError::NotInitialized(root).into());
        }

        Ok(Self { root })
    }

    /// Opens the deployment directory at the current directory
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::open(cwd)
    }

    /// Initializes a deployment directory with a minimal configuration
    ///
    /// Existing files are left alone so re-running is safe.
    pub fn init(root: impl Into<PathBuf>, domain: &str) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;

        let plugin_uis = root.join("plugin-uis");
        fs::create_dir_all(&plugin_uis).with_context(|| {
            format!(
                "Failed to create plugin-uis directory: {}",
                plugin_uis.display()
            )
        })?;

        let locales = root.join("locales");
        fs::create_dir_all(&locales).with_context(|| {
            format!("Failed to create locales directory: {}", locales.display())
        })?;

        let config_path = root.join(CONFIGS_FILE);
        if !config_path.exists() {
            let config = Configuration {
                domain: domain.to_string(),
                ..Default::default()
            };
            ConfigStore::new(&config_path).save(&config, None)?;
        }

        Self::open(root)
    }

    /// Returns the deployment root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns a store for this deployment's `configs.json`
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(self.root.join(CONFIGS_FILE))
    }

    /// Returns the directory holding downloaded plugin UI bundles
    pub fn plugin_uis_dir(&self) -> PathBuf {
        self.root.join("plugin-uis")
    }

    /// Returns the bundle directory for one plugin
    pub fn ui_dir(&self, plugin_name: &str) -> PathBuf {
        self.plugin_uis_dir().join(format!("plugin-{}-ui", plugin_name))
    }

    /// Returns the global locale directory
    pub fn locales_dir(&self) -> PathBuf {
        self.root.join("locales")
    }

    /// Returns the generated datastore-stack compose file path
    pub fn db_manifest_path(&self) -> PathBuf {
        self.root.join("docker-compose-dbs.yml")
    }

    /// Returns the generated application-stack compose file path
    pub fn app_manifest_path(&self) -> PathBuf {
        self.root.join("docker-compose.yml")
    }

    /// Creates the volume directories for the co-located datastores
    ///
    /// Skipped entirely when the datastores are externally hosted.
    pub fn ensure_data_dirs(&self, config: &Configuration) -> Result<()> {
        if config.db_server_address.is_some() {
            return Ok(());
        }

        let mut dirs = Vec::new();
        if config.mongo.is_some() {
            dirs.push("mongodata");
        }
        if config.elasticsearch.is_some() {
            dirs.push("elasticsearchData");
        }
        if config.redis.is_some() {
            dirs.push("redisdata");
        }
        if config.rabbitmq.is_some() {
            dirs.push("rabbitmq-data");
        }

        for dir in dirs {
            let path = self.root.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        }

        Ok(())
    }
}
