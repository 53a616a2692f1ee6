// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "QUICKMENU_LOG";

/// The terminal belongs to the UI, so logs always go to a file.
pub fn init(path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level)?)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("invalid log filter {default_level:?}; check [log].level"))
}

#[cfg(test)]
mod tests {
    use super::{LOG_FILTER_ENV, filter};
    use crate::test_support::env_lock;

    #[test]
    fn config_level_is_used_without_env_override() {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_FILTER_ENV);
        }
        assert!(filter("debug").is_ok());
        assert!(filter("quickmenu_app=trace,warn").is_ok());
    }

    #[test]
    fn malformed_level_is_rejected() {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_FILTER_ENV);
        }
        let error = filter("quickmenu=loud").expect_err("malformed filter should fail");
        assert!(error.to_string().contains("[log].level"));
    }
}
