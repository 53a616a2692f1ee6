// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use quickmenu_app::MenuConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "quickmenu";
pub const CONFIG_PATH_ENV: &str = "QUICKMENU_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TICK: &str = "120ms";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub menu: Menu,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            menu: Menu::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Menu {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub version: Option<String>,
    /// Newest release known to the host; turns the Help tab's update row
    /// into an upgrade entry when it differs from `version`.
    pub latest_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub pinned: Option<bool>,
    pub tick: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            pinned: Some(false),
            tick: Some(DEFAULT_TICK.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [menu], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(name) = &self.menu.name
            && name.trim().is_empty()
        {
            bail!("menu.name in {} must not be blank", path.display());
        }

        if let Some(tick) = &self.ui.tick {
            let parsed = parse_duration(tick)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.tick in {} must be positive, got {}",
                    path.display(),
                    tick
                );
            }
        }

        Ok(())
    }

    pub fn menu_config(&self) -> MenuConfig {
        MenuConfig {
            name: self.menu.name.clone().unwrap_or_else(|| "demo".to_owned()),
            namespace: self
                .menu
                .namespace
                .clone()
                .unwrap_or_else(|| "default".to_owned()),
            version: self
                .menu
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned()),
        }
    }

    pub fn latest_version(&self) -> Option<&str> {
        let latest = self.menu.latest_version.as_deref()?.trim();
        let current = self.menu_config().version;
        if latest.is_empty() || latest.trim_start_matches('v') == current.trim_start_matches('v') {
            return None;
        }
        Some(latest)
    }

    pub fn pinned(&self) -> bool {
        self.ui.pinned.unwrap_or(false)
    }

    pub fn tick(&self) -> Result<Duration> {
        parse_duration(self.ui.tick.as_deref().unwrap_or(DEFAULT_TICK))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join("quickmenu.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# quickmenu config\n# Place this file at: {}\n\nversion = 1\n\n[menu]\nname = \"demo\"\nnamespace = \"default\"\n# version = \"{}\"\n# latest_version = \"1.2.0\"\n\n[ui]\n# Render the menu pinned above the input line instead of centered.\npinned = false\ntick = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/quickmenu/quickmenu.log)\n# path = \"/absolute/path/to/quickmenu.log\"\n",
            path.display(),
            env!("CARGO_PKG_VERSION"),
            DEFAULT_TICK,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid tick duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid tick duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use <N>ms or <N>s (for example 120ms or 1s)")
}

#[cfg(test)]
mod tests {
    use super::{CONFIG_PATH_ENV, Config, parse_duration};
    use anyhow::Result;
    use crate::test_support::env_lock;
    use std::path::PathBuf;
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert!(!config.pinned());
        assert_eq!(config.tick()?, Duration::from_millis(120));
        assert_eq!(config.log_level(), "info");
        let menu = config.menu_config();
        assert_eq!(menu.name, "demo");
        assert_eq!(menu.namespace, "default");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npinned = true\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[menu], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[menu]\nname = \"support-bot\"\nnamespace = \"prod\"\nversion = \"2.1.0\"\n[ui]\npinned = true\ntick = \"1s\"\n[log]\nlevel = \"debug\"\npath = \"/tmp/qm.log\"\n",
        )?;

        let config = Config::load(&path)?;
        let menu = config.menu_config();
        assert_eq!(menu.name, "support-bot");
        assert_eq!(menu.namespace, "prod");
        assert_eq!(menu.version, "2.1.0");
        assert!(config.pinned());
        assert_eq!(config.tick()?, Duration::from_secs(1));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/qm.log"));
        Ok(())
    }

    #[test]
    fn latest_version_is_reported_only_when_newer_than_current() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[menu]\nversion = \"1.0.0\"\nlatest_version = \"1.1.0\"\n",
        )?;
        assert_eq!(Config::load(&path)?.latest_version(), Some("1.1.0"));

        let (_temp, path) = write_config(
            "version = 1\n[menu]\nversion = \"1.0.0\"\nlatest_version = \"v1.0.0\"\n",
        )?;
        assert_eq!(Config::load(&path)?.latest_version(), None);
        assert_eq!(Config::default().latest_version(), None);
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 3\n")?;
        let error = Config::load(&path).expect_err("v3 config should fail");
        assert!(error.to_string().contains("unsupported config version 3"));
        Ok(())
    }

    #[test]
    fn blank_menu_name_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[menu]\nname = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank name should fail");
        assert!(error.to_string().contains("must not be blank"));
        Ok(())
    }

    #[test]
    fn zero_tick_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ntick = \"0ms\"\n")?;
        let error = Config::load(&path).expect_err("zero tick should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn tick_parses_millis_and_seconds() -> Result<()> {
        assert_eq!(parse_duration("250ms")?, Duration::from_millis(250));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("quickmenu/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("[menu]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.menu_config().name, "demo");
        Ok(())
    }
}
