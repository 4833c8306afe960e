//! Seed datasets stored as JSON arrays, one file per record collection.
//!
//! A dataset directory holds files such as `violations.json` or
//! `health_advice.json`. Files are matched by stem; a missing collection loads
//! as empty so a domain can ship only the collections it has.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::records::{EmergencyCondition, Exercise, HealthAdvice, HealthItem, LegalDocument, Nutrition, Violation};

pub struct DatasetLoader {
    root: PathBuf,
}

impl DatasetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the collection stored in `<stem>.json` anywhere under the root.
    pub fn load<T: DeserializeOwned>(&self, stem: &str) -> Result<Vec<T>> {
        let Some(path) = self.list_json_files().into_iter().find(|p| self.extract_stem(p) == stem) else {
            debug!(collection = stem, root = %self.root.display(), "collection file not found; loading empty");
            return Ok(vec![]);
        };
        let content = self.read_file_content(&path)?;
        let records: Vec<T> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(collection = stem, count = records.len(), path = %path.display(), "loaded collection");
        Ok(records)
    }

    pub fn list_json_files(&self) -> Vec<PathBuf> {
        let mut json_files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                json_files.push(path.to_path_buf());
            }
        }
        json_files.sort();
        json_files
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        fs::read_to_string(file_path).with_context(|| format!("Failed to read {} as UTF-8", file_path.display()))
    }

    fn extract_stem(&self, file_path: &Path) -> String {
        file_path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrafficDataset {
    pub violations: Vec<Violation>,
    pub documents: Vec<LegalDocument>,
}

impl TrafficDataset {
    pub fn load(loader: &DatasetLoader) -> Result<Self> {
        Ok(Self {
            violations: loader.load(Violation::SOURCE)?,
            documents: loader.load(LegalDocument::SOURCE)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthDataset {
    pub advice: Vec<HealthAdvice>,
    pub nutrition: Vec<Nutrition>,
    pub exercise: Vec<Exercise>,
    pub emergencies: Vec<EmergencyCondition>,
}

impl HealthDataset {
    pub fn load(loader: &DatasetLoader) -> Result<Self> {
        Ok(Self {
            advice: loader.load(HealthAdvice::SOURCE)?,
            nutrition: loader.load(Nutrition::SOURCE)?,
            exercise: loader.load(Exercise::SOURCE)?,
            emergencies: loader.load(EmergencyCondition::SOURCE)?,
        })
    }

    /// Advice, then nutrition, then exercise: the order rows take in the shared index.
    pub fn indexed_items(&self) -> Vec<HealthItem> {
        self.advice
            .iter()
            .cloned()
            .map(HealthItem::from)
            .chain(self.nutrition.iter().cloned().map(HealthItem::from))
            .chain(self.exercise.iter().cloned().map(HealthItem::from))
            .collect()
    }
}
