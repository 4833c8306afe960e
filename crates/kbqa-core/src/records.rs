//! Concrete knowledge-base records for the traffic-law and healthcare domains.
//!
//! Required text fields deserialize to an empty string when absent so that the
//! index builder, not serde, decides whether a record is malformed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::Record;
use crate::types::{RankFields, RecordId};

fn require<'a>(origin: &'static str, id: RecordId, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::MissingField { origin, id, field });
    }
    Ok(value)
}

fn join_fields<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_normal() -> String {
    "normal".to_string()
}

fn default_active() -> String {
    "active".to_string()
}

fn default_all() -> String {
    "all".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub violation_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub fine_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_penalty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<RecordId>,
}

impl Violation {
    pub const SOURCE: &'static str = "violations";
}

impl Record for Violation {
    fn id(&self) -> RecordId { self.id }
    fn set_id(&mut self, id: RecordId) { self.id = id; }
    fn source(&self) -> &'static str { Self::SOURCE }

    fn searchable_text(&self) -> Result<String> {
        let description = require(Self::SOURCE, self.id, "description", &self.description)?;
        let violation_type = require(Self::SOURCE, self.id, "violation_type", &self.violation_type)?;
        let vehicle_type = require(Self::SOURCE, self.id, "vehicle_type", &self.vehicle_type)?;
        Ok(join_fields([
            Some(description),
            Some(violation_type),
            Some(vehicle_type),
            self.keywords.as_deref(),
        ]))
    }

    fn rank_fields(&self) -> RankFields<'_> {
        RankFields { category: Some(&self.vehicle_type), kind: Some(&self.violation_type) }
    }
}

/// Decree or circular that violations cite through `Violation::document_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegalDocument {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(default = "default_active")]
    pub status: String,
}

impl LegalDocument {
    pub const SOURCE: &'static str = "legal_documents";
}

impl Record for LegalDocument {
    fn id(&self) -> RecordId { self.id }
    fn set_id(&mut self, id: RecordId) { self.id = id; }
    fn source(&self) -> &'static str { Self::SOURCE }

    fn searchable_text(&self) -> Result<String> {
        let title = require(Self::SOURCE, self.id, "title", &self.title)?;
        let code = require(Self::SOURCE, self.id, "code", &self.code)?;
        Ok(join_fields([Some(title), Some(code), self.content.as_deref()]))
    }

    fn rank_fields(&self) -> RankFields<'_> {
        RankFields::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthAdvice {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub advice: String,
    #[serde(default = "default_normal")]
    pub warning_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default = "default_all")]
    pub age_group: String,
}

impl HealthAdvice {
    pub const SOURCE: &'static str = "health_advice";
}

impl Record for HealthAdvice {
    fn id(&self) -> RecordId { self.id }
    fn set_id(&mut self, id: RecordId) { self.id = id; }
    fn source(&self) -> &'static str { Self::SOURCE }

    fn searchable_text(&self) -> Result<String> {
        let condition = require(Self::SOURCE, self.id, "condition_name", &self.condition_name)?;
        let category = require(Self::SOURCE, self.id, "category", &self.category)?;
        require(Self::SOURCE, self.id, "advice", &self.advice)?;
        Ok(join_fields([
            Some(condition),
            self.symptoms.as_deref(),
            self.keywords.as_deref(),
            Some(category),
        ]))
    }

    fn rank_fields(&self) -> RankFields<'_> {
        RankFields { category: None, kind: self.symptoms.as_deref() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cautions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl Nutrition {
    pub const SOURCE: &'static str = "nutrition";
}

impl Record for Nutrition {
    fn id(&self) -> RecordId { self.id }
    fn set_id(&mut self, id: RecordId) { self.id = id; }
    fn source(&self) -> &'static str { Self::SOURCE }

    fn searchable_text(&self) -> Result<String> {
        let name = require(Self::SOURCE, self.id, "food_name", &self.food_name)?;
        let category = require(Self::SOURCE, self.id, "category", &self.category)?;
        Ok(join_fields([Some(name), self.benefits.as_deref(), self.keywords.as_deref(), Some(category)]))
    }

    fn rank_fields(&self) -> RankFields<'_> {
        RankFields::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suitable_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl Exercise {
    pub const SOURCE: &'static str = "exercise";
}

impl Record for Exercise {
    fn id(&self) -> RecordId { self.id }
    fn set_id(&mut self, id: RecordId) { self.id = id; }
    fn source(&self) -> &'static str { Self::SOURCE }

    fn searchable_text(&self) -> Result<String> {
        let name = require(Self::SOURCE, self.id, "exercise_name", &self.exercise_name)?;
        let category = require(Self::SOURCE, self.id, "category", &self.category)?;
        Ok(join_fields([Some(name), self.benefits.as_deref(), self.keywords.as_deref(), Some(category)]))
    }

    fn rank_fields(&self) -> RankFields<'_> {
        RankFields::default()
    }
}

/// Conditions that bypass ranked search entirely. Not indexed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmergencyCondition {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub condition_name: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub immediate_action: String,
    #[serde(default)]
    pub keywords: String,
}

impl EmergencyCondition {
    pub const SOURCE: &'static str = "emergency_conditions";

    pub fn validate(&self) -> Result<()> {
        require(Self::SOURCE, self.id, "condition_name", &self.condition_name)?;
        require(Self::SOURCE, self.id, "symptoms", &self.symptoms)?;
        require(Self::SOURCE, self.id, "immediate_action", &self.immediate_action)?;
        Ok(())
    }
}

/// Health collections that share one index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum HealthItem {
    HealthAdvice(HealthAdvice),
    Nutrition(Nutrition),
    Exercise(Exercise),
}

impl HealthItem {
    fn inner(&self) -> &dyn RecordView {
        match self {
            HealthItem::HealthAdvice(r) => r,
            HealthItem::Nutrition(r) => r,
            HealthItem::Exercise(r) => r,
        }
    }
}

// Object-safe subset of `Record` so `HealthItem` can delegate without a match per method.
trait RecordView {
    fn view_id(&self) -> RecordId;
    fn view_source(&self) -> &'static str;
    fn view_text(&self) -> Result<String>;
    fn view_fields(&self) -> RankFields<'_>;
}

impl<R: Record> RecordView for R {
    fn view_id(&self) -> RecordId { self.id() }
    fn view_source(&self) -> &'static str { self.source() }
    fn view_text(&self) -> Result<String> { self.searchable_text() }
    fn view_fields(&self) -> RankFields<'_> { self.rank_fields() }
}

impl Record for HealthItem {
    fn id(&self) -> RecordId { self.inner().view_id() }

    fn set_id(&mut self, id: RecordId) {
        match self {
            HealthItem::HealthAdvice(r) => r.set_id(id),
            HealthItem::Nutrition(r) => r.set_id(id),
            HealthItem::Exercise(r) => r.set_id(id),
        }
    }

    fn source(&self) -> &'static str { self.inner().view_source() }
    fn searchable_text(&self) -> Result<String> { self.inner().view_text() }
    fn rank_fields(&self) -> RankFields<'_> { self.inner().view_fields() }
}

impl From<HealthAdvice> for HealthItem {
    fn from(r: HealthAdvice) -> Self { HealthItem::HealthAdvice(r) }
}

impl From<Nutrition> for HealthItem {
    fn from(r: Nutrition) -> Self { HealthItem::Nutrition(r) }
}

impl From<Exercise> for HealthItem {
    fn from(r: Exercise) -> Self { HealthItem::Exercise(r) }
}
