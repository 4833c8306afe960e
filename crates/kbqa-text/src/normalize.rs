use serde::{Deserialize, Serialize};

/// One literal rewrite: every occurrence of `from` becomes `to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynonymRule {
    pub from: String,
    pub to: String,
}

impl SynonymRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}

/// Lowercases text and then applies synonym rules in table order.
///
/// Each rule scans the output of the previous one, so later rules see earlier
/// rewrites. Tables with rules whose replacement contains another rule's
/// pattern are not idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    rules: Vec<SynonymRule>,
}

impl Normalizer {
    pub fn new(rules: impl IntoIterator<Item = SynonymRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|r| !r.from.is_empty())
            .map(|r| SynonymRule { from: r.from.to_lowercase(), to: r.to })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[SynonymRule] {
        &self.rules
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.to_lowercase();
        for rule in &self.rules {
            if out.contains(&rule.from) {
                out = out.replace(&rule.from, &rule.to);
            }
        }
        out
    }
}
