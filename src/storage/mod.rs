//! Persistence layer
//!
//! The configuration document (`configs.json`) and the deployment
//! directory it lives in. Everything else the tool writes (compose
//! files, UI bundles, locales) is addressed through [`Workdir`] paths.

mod config;
mod workdir;

pub use config::{
    ConfigError, ConfigStore, Configuration, ElasticsearchConfig, KibanaConfig, MongoConfig,
    PluginRef, RabbitmqConfig, RedisConfig, Revision, WidgetsConfig,
};
pub use workdir::{Workdir, WorkdirError, CONFIGS_FILE};
