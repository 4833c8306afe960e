//! Ready-made engines for the two shipped knowledge domains.
//!
//! A profile combines settings, a lexicon and a dataset:
//! - lexicon: `<lexicon_dir>/<domain>.toml` when configured and present, else the built-in table
//! - dataset: JSON collections under `<dataset_dir>/<domain>/`
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kbqa_core::config::{resolve_with_base, Settings};
use kbqa_core::dataset::{DatasetLoader, HealthDataset, TrafficDataset};
use kbqa_core::records::{HealthItem, LegalDocument, Violation};
use kbqa_text::{EntityExtractor, Lexicon};

use crate::documents::LegalLibrary;
use crate::emergency::EmergencyDirectory;
use crate::engine::KnowledgeEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Traffic,
    Health,
}

impl Domain {
    pub fn name(self) -> &'static str {
        match self {
            Domain::Traffic => "traffic",
            Domain::Health => "health",
        }
    }

    pub fn builtin_lexicon(self) -> Lexicon {
        match self {
            Domain::Traffic => Lexicon::traffic(),
            Domain::Health => Lexicon::health(),
        }
    }

    /// Lexicon for this domain, relative paths resolved against `base`.
    pub fn lexicon(self, settings: &Settings, base: &Path) -> Result<Lexicon> {
        let Some(dir) = &settings.data.lexicon_dir else {
            return Ok(self.builtin_lexicon());
        };
        let path = resolve_with_base(base, dir).join(format!("{}.toml", self.name()));
        if !path.is_file() {
            warn!(domain = self.name(), path = %path.display(), "lexicon file not found; using built-in table");
            return Ok(self.builtin_lexicon());
        }
        info!(domain = self.name(), path = %path.display(), "loading lexicon");
        Lexicon::from_toml_file(&path)
    }

    pub fn dataset_loader(self, settings: &Settings, base: &Path) -> DatasetLoader {
        DatasetLoader::new(resolve_with_base(base, &settings.data.dataset_dir).join(self.name()))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Domain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "traffic" => Ok(Domain::Traffic),
            "health" | "healthcare" => Ok(Domain::Health),
            other => Err(anyhow!("unknown domain '{other}' (expected traffic or health)")),
        }
    }
}

pub fn traffic_engine(settings: &Settings, lexicon: &Lexicon, dataset: TrafficDataset) -> Result<KnowledgeEngine<Violation>> {
    let extractor = EntityExtractor::from_lexicon(lexicon)?;
    let engine = KnowledgeEngine::new(Domain::Traffic.name(), extractor, settings)?;
    engine.rebuild(dataset.violations).context("Failed to index traffic violations")?;
    Ok(engine)
}

pub fn legal_library(settings: &Settings, lexicon: &Lexicon, documents: Vec<LegalDocument>) -> Result<LegalLibrary> {
    let extractor = EntityExtractor::from_lexicon(lexicon)?;
    let library = LegalLibrary::new(extractor.normalizer().clone(), settings)?;
    library.replace_all(documents).context("Failed to index legal documents")?;
    Ok(library)
}

pub fn health_engine(settings: &Settings, lexicon: &Lexicon, dataset: HealthDataset) -> Result<KnowledgeEngine<HealthItem>> {
    let extractor = EntityExtractor::from_lexicon(lexicon)?;
    let emergencies = EmergencyDirectory::new(dataset.emergencies.clone()).context("Invalid emergency condition")?;
    let engine = KnowledgeEngine::new(Domain::Health.name(), extractor, settings)?.with_emergencies(emergencies);
    engine.rebuild(dataset.indexed_items()).context("Failed to index health records")?;
    Ok(engine)
}

/// Build the traffic engine from the configured lexicon and dataset directories.
pub fn load_traffic(settings: &Settings, base: &Path) -> Result<KnowledgeEngine<Violation>> {
    let lexicon = Domain::Traffic.lexicon(settings, base)?;
    let dataset = TrafficDataset::load(&Domain::Traffic.dataset_loader(settings, base))?;
    traffic_engine(settings, &lexicon, dataset)
}

pub fn load_legal_library(settings: &Settings, base: &Path) -> Result<LegalLibrary> {
    let lexicon = Domain::Traffic.lexicon(settings, base)?;
    let dataset = TrafficDataset::load(&Domain::Traffic.dataset_loader(settings, base))?;
    legal_library(settings, &lexicon, dataset.documents)
}

pub fn load_health(settings: &Settings, base: &Path) -> Result<KnowledgeEngine<HealthItem>> {
    let lexicon = Domain::Health.lexicon(settings, base)?;
    let dataset = HealthDataset::load(&Domain::Health.dataset_loader(settings, base))?;
    health_engine(settings, &lexicon, dataset)
}
