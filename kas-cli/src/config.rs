use anyhow::{Context, Result, bail};
use kas_core::time::parse_timezone;
use kas_core::{DEFAULT_RECENT_LIMIT, MAX_WINDOW_DAYS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_kas_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Directory holding the transaction blob (default: <home>/data)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA timezone that decides what "today" is
    pub timezone: String,
    /// Rows in the dashboard's recent list
    pub recent_limit: usize,
    /// Trend window when --range is not given
    pub default_range_days: usize,
    pub currency_symbol: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Jakarta".to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            default_range_days: 7,
            currency_symbol: "Rp".to_string(),
        }
    }
}

impl Config {
    /// Reject settings the commands cannot work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.display;
        parse_timezone(&d.timezone).context("[display].timezone")?;
        if d.recent_limit == 0 {
            bail!("[display].recent_limit must be at least 1");
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&d.default_range_days) {
            bail!(
                "[display].default_range_days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
                d.default_range_days
            );
        }
        if d.currency_symbol.trim().is_empty() {
            bail!("[display].currency_symbol must not be empty");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_kas_home()?.join("config.toml"))
}

/// A missing file means defaults; a present one must parse and validate.
pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    let raw = match fs::read_to_string(&p) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e).with_context(|| format!("read {}", p.display())),
    };
    parse_config(&raw).with_context(|| format!("invalid config {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.validate()?;
    Ok(cfg)
}

fn render_config(cfg: &Config) -> Result<String> {
    let body = toml::to_string_pretty(cfg).context("serialize config")?;
    Ok(format!(
        "# Kas Virtual settings. Delete a key to fall back to its default.\n\n{body}"
    ))
}

/// Writes the default config unless one exists. Returns the path and
/// whether it was created.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let p = config_path()?;
    if p.exists() {
        return Ok((p, false));
    }
    fs::write(&p, render_config(&Config::default())?)
        .with_context(|| format!("write {}", p.display()))?;
    tracing::info!(path = %p.display(), "wrote default config");
    Ok((p, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = parse_config("[display]\ntimezone = \"Asia/Makassar\"\n").unwrap();
        assert_eq!(cfg.display.timezone, "Asia/Makassar");
        assert_eq!(cfg.display.recent_limit, 10);
        assert_eq!(cfg.display.currency_symbol, "Rp");
        assert!(cfg.storage.data_dir.is_none());
    }

    #[test]
    fn test_empty_config() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.display.default_range_days, 7);
    }

    #[test]
    fn test_rendered_default_parses_back() {
        let s = render_config(&Config::default()).unwrap();
        assert!(s.starts_with("# Kas Virtual settings"));
        let back = parse_config(&s).unwrap();
        assert_eq!(back.display.timezone, "Asia/Jakarta");
    }

    #[test]
    fn test_rejects_unusable_display_settings() {
        for bad in [
            "[display]\nrecent_limit = 0\n",
            "[display]\ndefault_range_days = 0\n",
            "[display]\ndefault_range_days = 100000\n",
            "[display]\ntimezone = \"Mars/Olympus\"\n",
            "[display]\ncurrency_symbol = \" \"\n",
        ] {
            assert!(parse_config(bad).is_err(), "accepted {bad:?}");
        }
        let cfg = parse_config("[display]\ndefault_range_days = 90\n").unwrap();
        assert_eq!(cfg.display.default_range_days, 90);
    }
}
