use parking_lot::RwLock;
use tracing::info;

use kbqa_core::error::Result;
use kbqa_core::records::EmergencyCondition;
use kbqa_core::types::RecordId;

/// Conditions that short-circuit ranked search when an emergency query mentions them.
///
/// Conditions can be added while queries are being served.
#[derive(Debug, Default)]
pub struct EmergencyDirectory {
    conditions: RwLock<Vec<EmergencyCondition>>,
}

impl EmergencyDirectory {
    pub fn new(conditions: Vec<EmergencyCondition>) -> Result<Self> {
        for c in &conditions {
            c.validate()?;
        }
        Ok(Self { conditions: RwLock::new(conditions) })
    }

    pub fn len(&self) -> usize { self.conditions.read().len() }
    pub fn is_empty(&self) -> bool { self.conditions.read().is_empty() }
    pub fn conditions(&self) -> Vec<EmergencyCondition> { self.conditions.read().clone() }

    /// Validate and append a condition. A non-positive id is replaced by the next free one.
    pub fn add(&self, mut condition: EmergencyCondition) -> Result<RecordId> {
        let mut conditions = self.conditions.write();
        if condition.id <= 0 {
            condition.id = conditions.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        }
        condition.validate()?;
        let id = condition.id;
        info!(id, condition = %condition.condition_name, "emergency condition added");
        conditions.push(condition);
        Ok(id)
    }

    /// First condition, in directory order, with any keyword inside `normalized`.
    /// Keywords are lowercased before comparison.
    pub fn lookup(&self, normalized: &str) -> Option<EmergencyCondition> {
        self.conditions
            .read()
            .iter()
            .find(|c| {
                c.keywords
                    .split_whitespace()
                    .any(|k| normalized.contains(k.to_lowercase().as_str()))
            })
            .cloned()
    }
}
