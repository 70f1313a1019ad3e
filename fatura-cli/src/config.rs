use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{default_ledger_dir, ensure_fatura_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ledger: LedgerSection,
    #[serde(default)]
    pub clock: ClockSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSection {
    /// Directory holding cards.csv, categories.csv, transactions.csv and incomes.csv
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSection {
    /// IANA name used to decide what "today" is
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    /// `tracing` filter directive, overridden by RUST_LOG
    pub filter: String,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: "America/Sao_Paulo".to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn with_ledger_dir(dir: PathBuf) -> Self {
        Self {
            ledger: LedgerSection { dir },
            clock: ClockSection::default(),
            log: LogSection::default(),
        }
    }

    pub fn default_for_home() -> Result<Self> {
        Ok(Self::with_ledger_dir(default_ledger_dir()?))
    }
}

impl ClockSection {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown timezone '{}': {e}", self.timezone))
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.tz()?).date_naive())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_fatura_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Config::default_for_home();
    }
    load_config_from(&p)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default_for_home()?;
    save_config_to(&cfg, &p)?;
    fs::create_dir_all(&cfg.ledger.dir).with_context(|| format!("create {}", cfg.ledger.dir.display()))?;
    println!("Wrote {}", p.display());
    println!("Put your CSVs in {}", cfg.ledger.dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::with_ledger_dir(dir.path().join("ledger"));
        cfg.clock.timezone = "Europe/Lisbon".to_string();

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ledger]\ndir = \"/tmp/ledger\"\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.ledger.dir, PathBuf::from("/tmp/ledger"));
        assert_eq!(cfg.clock, ClockSection::default());
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn test_timezone_is_validated() {
        let clock = ClockSection::default();
        assert_eq!(clock.tz().unwrap(), chrono_tz::America::Sao_Paulo);

        let bad = ClockSection {
            timezone: "Mars/Olympus".to_string(),
        };
        let err = bad.today().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_broken_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ledger\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
