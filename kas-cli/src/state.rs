use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

/// `$KAS_HOME`, else `~/.kas-virtual`.
pub fn kas_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("KAS_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set KAS_HOME)")?;
    Ok(PathBuf::from(home).join(".kas-virtual"))
}

pub fn ensure_kas_home() -> Result<PathBuf> {
    let dir = kas_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where the transaction blob lives: `[storage].data_dir` or `<home>/data`.
pub fn data_dir(cfg: &Config) -> Result<PathBuf> {
    match &cfg.storage.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(ensure_kas_home()?.join("data")),
    }
}
