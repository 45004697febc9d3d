//! Installed-plugin list transitions
//!
//! Install and uninstall each read the whole configuration, mutate the
//! plugin list in memory, and persist the whole document back with the
//! revision check, so the file never holds a partial update.

use anyhow::Result;

use crate::storage::{ConfigStore, PluginRef};

/// Adds a plugin to the configuration
///
/// Returns `false` without touching the file when the plugin is already
/// installed, so repeating an install is safe.
pub fn install(store: &ConfigStore, name: &str) -> Result<bool> {
    let (mut config, revision) = store.load()?;

    if config.plugin(name).is_some() {
        return Ok(false);
    }

    config.plugins.push(PluginRef::named(name));
    store.save(&config, Some(&revision))?;

    Ok(true)
}

/// Removes a plugin from the configuration
///
/// Returns `false` without touching the file when no such plugin is
/// installed.
pub fn uninstall(store: &ConfigStore, name: &str) -> Result<bool> {
    let (mut config, revision) = store.load()?;

    let before = config.plugins.len();
    config.plugins.retain(|p| p.name != name);

    if config.plugins.len() == before {
        return Ok(false);
    }

    store.save(&config, Some(&revision))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(json: &str) -> (TempDir, ConfigStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("configs.json");
        fs::write(&path, json).unwrap();
        let store = ConfigStore::new(path);
        (dir, store)
    }

    #[test]
    fn install_appends_once() {
        let (_dir, store) = store_with(r#"{"domain": "example.erxes.io", "plugins": []}"#);

        assert!(install(&store, "sales").unwrap());
        assert!(!install(&store, "sales").unwrap());

        let (config, _) = store.load().unwrap();
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.plugins[0].name, "sales");
    }

    #[test]
    fn install_keeps_existing_entries() {
        let (_dir, store) = store_with(
            r#"{"domain": "example.erxes.io", "plugins": [{"name": "inbox", "replicas": 2}]}"#,
        );

        assert!(install(&store, "sales").unwrap());

        let (config, _) = store.load().unwrap();
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins[0].name, "inbox");
        assert_eq!(config.plugins[0].replicas, Some(2));
        assert_eq!(config.plugins[1].name, "sales");
    }

    #[test]
    fn uninstall_removes_entry() {
        let (_dir, store) = store_with(
            r#"{"domain": "example.erxes.io", "plugins": [{"name": "sales"}, {"name": "inbox"}]}"#,
        );

        assert!(uninstall(&store, "sales").unwrap());

        let (config, _) = store.load().unwrap();
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.plugins[0].name, "inbox");
    }

    #[test]
    fn uninstall_absent_is_noop() {
        let (_dir, store) =
            store_with(r#"{"domain": "example.erxes.io", "plugins": [{"name": "inbox"}]}"#);

        assert!(!uninstall(&store, "sales").unwrap());

        let (config, _) = store.load().unwrap();
        assert_eq!(config.plugins.len(), 1);
    }
}
