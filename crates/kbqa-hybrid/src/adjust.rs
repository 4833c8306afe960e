use kbqa_core::config::BonusSettings;
use kbqa_core::traits::Record;
use kbqa_core::types::{Entities, RankFields, RankedResult, RecordRef};

/// Adds domain bonuses on top of cosine similarity and keeps the best `final_count`.
///
/// Bonuses are non-negative, so `confidence >= similarity` unless a clamp below the
/// similarity itself is configured.
#[derive(Debug, Clone)]
pub struct ConfidenceAdjuster {
    bonus: BonusSettings,
    final_count: usize,
}

impl ConfidenceAdjuster {
    pub fn new(bonus: BonusSettings, final_count: usize) -> Self {
        Self { bonus, final_count }
    }

    pub fn final_count(&self) -> usize { self.final_count }

    pub fn bonus(&self, fields: RankFields<'_>, entities: &Entities) -> f32 {
        let mut bonus = 0.0;
        if let Some(category) = fields.category {
            match entities.category.as_deref() {
                Some(wanted) if category.contains(wanted) => bonus += self.bonus.category_exact,
                _ if category == self.bonus.generic_marker => bonus += self.bonus.category_generic,
                _ => {}
            }
        }
        if let Some(kind) = fields.kind {
            if entities.tags.iter().any(|t| kind.contains(t.as_str())) {
                bonus += self.bonus.type_match;
            }
        }
        bonus
    }

    /// `scored` is in similarity order; ties after the bonus keep that order.
    pub fn adjust<R: Record>(&self, scored: Vec<(R, RecordRef, f32)>, entities: &Entities) -> Vec<RankedResult<R>> {
        let mut out: Vec<RankedResult<R>> = scored
            .into_iter()
            .map(|(record, origin, similarity)| {
                let mut confidence = similarity + self.bonus(record.rank_fields(), entities);
                if let Some(max) = self.bonus.clamp {
                    confidence = confidence.min(max);
                }
                RankedResult { record, origin, similarity, confidence }
            })
            .collect();
        out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        out.truncate(self.final_count);
        out
    }
}
