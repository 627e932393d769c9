use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use ratecat_common::fold_text;

use crate::bundle::BusinessLineConfig;
use crate::error::{ConfigError, Result};

/// Overrides the directory scanned for additional bundles.
pub const CONFIG_DIR_ENV_VAR: &str = "RATECAT_CONFIG_DIR";

/// Business line used when detection finds no indicator.
pub const DEFAULT_BUSINESS_LINE: &str = "accounts";

const BUILTIN_BUNDLES: &[(&str, &str)] = &[
    (
        "builtin/accounts.toml",
        include_str!("../bundles/accounts.toml"),
    ),
    ("builtin/loans.toml", include_str!("../bundles/loans.toml")),
];

/// Score a sheet name adds per matching indicator; the file name counts double.
const SHEET_HIT: usize = 1;
const FILENAME_HIT: usize = 2;

pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Validated bundles keyed by business line.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    bundles: BTreeMap<String, BusinessLineConfig>,
}

impl ConfigRegistry {
    /// Bundles compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::default();
        for (origin, text) in BUILTIN_BUNDLES {
            registry.insert(BusinessLineConfig::from_toml_str(text, *origin)?)?;
        }
        Ok(registry)
    }

    /// Reads every `*.toml` file in `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::default();
        registry.extend_from_dir(dir)?;
        Ok(registry)
    }

    /// Built-in bundles, replaced or extended by the bundles in `dir`.
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self> {
        let mut registry = Self::builtin()?;
        if let Some(dir) = dir {
            let overrides = Self::load_dir(dir)?;
            for (name, config) in overrides.bundles {
                debug!(business_line = %name, dir = %dir.display(), "bundle override");
                registry.bundles.insert(name, config);
            }
        }
        Ok(registry)
    }

    fn extend_from_dir(&mut self, dir: &Path) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::io(dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
            let config = BusinessLineConfig::from_toml_str(&text, &path)?;
            info!(business_line = %config.business_line, path = %path.display(), "loaded bundle");
            self.insert(config)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, config: BusinessLineConfig) -> Result<()> {
        if self.bundles.contains_key(&config.business_line) {
            return Err(ConfigError::DuplicateBusinessLine {
                name: config.business_line,
            });
        }
        self.bundles.insert(config.business_line.clone(), config);
        Ok(())
    }

    pub fn get(&self, business_line: &str) -> Result<&BusinessLineConfig> {
        self.bundles
            .get(business_line)
            .ok_or_else(|| ConfigError::UnknownBusinessLine {
                name: business_line.to_string(),
                available: self.business_lines().collect::<Vec<_>>().join(", "),
            })
    }

    /// Picks the business line whose detection indicators best match the input.
    ///
    /// Each indicator found in a folded sheet name scores one point and each
    /// found in the file name scores two. The highest score wins and ties go
    /// to the first business line by name. Without any hit the result is
    /// [`DEFAULT_BUSINESS_LINE`] if registered, else the first bundle.
    pub fn detect<S: AsRef<str>>(&self, sheet_names: &[S], filename: &str) -> Option<&str> {
        let sheets: Vec<String> = sheet_names
            .iter()
            .map(|name| fold_text(name.as_ref()))
            .collect();
        let filename = fold_text(filename);

        let mut best: Option<(&str, usize)> = None;
        for (name, config) in &self.bundles {
            let mut score = 0;
            for indicator in &config.detection.indicators {
                // Checked when the bundle was validated.
                let Ok(regex) = Regex::new(indicator) else {
                    continue;
                };
                score += SHEET_HIT * sheets.iter().filter(|sheet| regex.is_match(sheet)).count();
                if !filename.is_empty() && regex.is_match(&filename) {
                    score += FILENAME_HIT;
                }
            }
            debug!(business_line = %name, score, "detection score");
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((name.as_str(), score));
            }
        }

        match best {
            Some((name, score)) => {
                info!(business_line = %name, score, "business line detected");
                Some(name)
            }
            None => {
                let fallback = self
                    .bundles
                    .get_key_value(DEFAULT_BUSINESS_LINE)
                    .or_else(|| self.bundles.first_key_value())
                    .map(|(name, _)| name.as_str());
                info!(business_line = ?fallback, "no detection indicator matched");
                fallback
            }
        }
    }

    pub fn business_lines(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn bundles(&self) -> impl Iterator<Item = &BusinessLineConfig> {
        self.bundles.values()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
