use regex::Regex;
use tracing::debug;

use kbqa_core::error::{Error, Result};
use kbqa_core::types::{Entities, Urgency};

use crate::lexicon::{KeywordGroup, Lexicon};
use crate::normalize::Normalizer;

/// Rule-based tagger: substring membership against the lexicon's keyword groups.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    normalizer: Normalizer,
    categories: Vec<KeywordGroup>,
    tags: Vec<KeywordGroup>,
    topics: Vec<KeywordGroup>,
    number: Option<Regex>,
    emergency_keywords: Vec<String>,
}

impl EntityExtractor {
    pub fn from_lexicon(lexicon: &Lexicon) -> Result<Self> {
        let number = match &lexicon.number_pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| Error::InvalidConfig(format!("number_pattern '{p}': {e}")))?),
            None => None,
        };
        debug!(
            synonyms = lexicon.synonyms.len(),
            categories = lexicon.categories.len(),
            tags = lexicon.tags.len(),
            topics = lexicon.topics.len(),
            "entity extractor built"
        );
        Ok(Self {
            normalizer: Normalizer::new(lexicon.synonyms.iter().cloned()),
            categories: lexicon.categories.iter().map(KeywordGroup::lowercased).collect(),
            tags: lexicon.tags.iter().map(KeywordGroup::lowercased).collect(),
            topics: lexicon.topics.iter().map(KeywordGroup::lowercased).collect(),
            number,
            emergency_keywords: lexicon.emergency_keywords.iter().map(|k| k.to_lowercase()).collect(),
        })
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn extract(&self, text: &str) -> Entities {
        self.extract_normalized(&self.normalizer.normalize(text))
    }

    /// Same as [`extract`](Self::extract) for text that was already normalized.
    pub fn extract_normalized(&self, normalized: &str) -> Entities {
        let category = self.categories.iter().find(|g| g.matches(normalized)).map(|g| g.label.clone());
        let tags = self.tags.iter().filter(|g| g.matches(normalized)).map(|g| g.label.clone()).collect();
        let topics = self.topics.iter().filter(|g| g.matches(normalized)).map(|g| g.label.clone()).collect();
        let number = self
            .number
            .as_ref()
            .and_then(|re| re.captures(normalized))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        let urgency = if self.is_emergency(normalized) { Urgency::Emergency } else { Urgency::Normal };
        Entities { category, tags, topics, number, urgency }
    }

    pub fn is_emergency(&self, normalized: &str) -> bool {
        self.emergency_keywords.iter().any(|k| normalized.contains(k.as_str()))
    }
}
