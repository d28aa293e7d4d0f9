use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ConfigRecord;

const CONFIG_FILE: &str = "config.json";
const TEMP_FILE: &str = "config.json.tmp";

/// Result of reading the persisted configuration.
///
/// There is deliberately no error variant: a missing mount, missing file,
/// unreadable file, or malformed document all collapse to `Absent` so the
/// caller always falls back to re-provisioning instead of crashing or
/// trusting a garbled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedConfig {
    Present(ConfigRecord),
    Absent,
}

/// Persisted configuration store: one JSON document at a fixed path under
/// the non-volatile filesystem root.
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Reads the configuration record, treating every failure as absence.
    pub fn load(&self) -> LoadedConfig {
        let path = self.config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no configuration file, forcing provisioning");
                return LoadedConfig::Absent;
            }
            Err(e) => {
                log::warn!("failed to read {}: {}", path.display(), e);
                return LoadedConfig::Absent;
            }
        };

        log::debug!("raw configuration document: {}", raw.trim_end());

        match serde_json::from_str::<ConfigRecord>(&raw) {
            Ok(record) => {
                log::info!("loaded configuration for host '{}'", record.wifi_hostname);
                LoadedConfig::Present(record)
            }
            Err(e) => {
                log::warn!("malformed configuration document ({}), forcing provisioning", e);
                LoadedConfig::Absent
            }
        }
    }

    /// Writes the full record, replacing any prior one.
    ///
    /// The document is written to a temp file, fsynced, then renamed over
    /// the live path, so a crash mid-write leaves either the old record or
    /// the new one, never a half-written document that parses.
    pub fn save(&self, record: &ConfigRecord) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating config dir {}", self.root.display()))?;

        let tmp = self.root.join(TEMP_FILE);
        let json = serde_json::to_vec(record).context("serializing configuration")?;
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.config_path())
            .with_context(|| format!("replacing {}", self.config_path().display()))?;

        log::info!("configuration saved");
        Ok(())
    }

    /// Deletes the configuration storage so subsequent loads see `Absent`.
    pub fn wipe(&self) -> Result<()> {
        for name in [CONFIG_FILE, TEMP_FILE] {
            remove_if_present(&self.root.join(name))?;
        }
        log::info!("configuration storage wiped");
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}
