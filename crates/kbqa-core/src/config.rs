//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml` +
//! `APP_*` env vars (nested keys separated by `__`, e.g. `APP_SEARCH__THRESHOLD`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub dataset_dir: String,
    pub lexicon_dir: Option<String>,
    pub feedback_log: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { dataset_dir: "data".to_string(), lexicon_dir: None, feedback_log: "feedback.log".to_string() }
    }
}

/// Term-weighting parameters. `ngram_min..=ngram_max` word n-grams are indexed and the
/// vocabulary keeps at most `max_features` terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexSettings {
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub max_features: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { ngram_min: 1, ngram_max: 2, max_features: 1000 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    /// Candidates must score strictly above this.
    pub threshold: f32,
    pub candidate_pool: usize,
    pub final_count: usize,
    /// Zero disables the query cache.
    pub cache_capacity: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { threshold: 0.05, candidate_pool: 5, final_count: 3, cache_capacity: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BonusSettings {
    pub category_exact: f32,
    pub category_generic: f32,
    pub type_match: f32,
    /// Category value meaning "applies to every category".
    pub generic_marker: String,
    /// Upper bound for adjusted confidence; `None` leaves it unbounded.
    pub clamp: Option<f32>,
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            category_exact: 0.2,
            category_generic: 0.1,
            type_match: 0.3,
            generic_marker: "tất cả".to_string(),
            clamp: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub bonus: BonusSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        let i = &self.index;
        if i.ngram_min == 0 || i.ngram_min > i.ngram_max {
            return Err(Error::InvalidConfig(format!("ngram range ({}, {}) is empty", i.ngram_min, i.ngram_max)));
        }
        if i.max_features == 0 {
            return Err(Error::InvalidConfig("index.max_features must be > 0".into()));
        }
        let s = &self.search;
        if !(0.0..1.0).contains(&s.threshold) {
            return Err(Error::InvalidConfig(format!("search.threshold {} outside [0, 1)", s.threshold)));
        }
        if s.final_count == 0 || s.final_count > s.candidate_pool {
            return Err(Error::InvalidConfig(format!(
                "search.final_count {} must be in 1..={} (candidate_pool)",
                s.final_count, s.candidate_pool
            )));
        }
        let b = &self.bonus;
        for (name, w) in [("category_exact", b.category_exact), ("category_generic", b.category_generic), ("type_match", b.type_match)] {
            if w < 0.0 || !w.is_finite() {
                return Err(Error::InvalidConfig(format!("bonus.{name} must be a non-negative number, got {w}")));
            }
        }
        if let Some(c) = b.clamp {
            if c <= 0.0 {
                return Err(Error::InvalidConfig(format!("bonus.clamp must be > 0, got {c}")));
            }
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Self::defaults().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document. Used by tests and embedders.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let config = Self { figment: Self::defaults().merge(Toml::string(toml)) };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
