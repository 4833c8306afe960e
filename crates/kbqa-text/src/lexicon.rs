//! Word lists that drive normalization and entity extraction.
//!
//! A lexicon is data, not code: the built-in traffic and health tables can be
//! replaced by a TOML file with the same shape, e.g.
//!
//! ```toml
//! emergency_keywords = ["cấp cứu"]
//! number_pattern = '(\d+)\s*km/h'
//!
//! [[synonyms]]
//! from = "xe gắn máy"
//! to = "xe máy"
//!
//! [[categories]]
//! label = "xe máy"
//! keywords = ["xe máy"]
//! ```
//!
//! Array order is significant for `synonyms` and `categories`.
use anyhow::{anyhow, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::normalize::SynonymRule;

/// Emits `label` when any keyword is a substring of the normalized query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordGroup {
    pub label: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn new<I, S>(label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { label: label.into(), keywords: keywords.into_iter().map(Into::into).collect() }
    }

    /// A group that emits its only keyword.
    pub fn literal(keyword: impl Into<String>) -> Self {
        let k = keyword.into();
        Self { label: k.clone(), keywords: vec![k] }
    }

    /// Same group with lowercased keywords, ready to match normalized text.
    pub fn lowercased(&self) -> Self {
        Self { label: self.label.clone(), keywords: self.keywords.iter().map(|k| k.to_lowercase()).collect() }
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Lexicon {
    pub synonyms: Vec<SynonymRule>,
    /// Mutually exclusive; the first matching group sets the category.
    pub categories: Vec<KeywordGroup>,
    pub tags: Vec<KeywordGroup>,
    pub topics: Vec<KeywordGroup>,
    /// First capture group is parsed as the numeric entity.
    pub number_pattern: Option<String>,
    pub emergency_keywords: Vec<String>,
}

impl Lexicon {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(anyhow!("Lexicon file {} does not exist", path.display()));
        }
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| anyhow!("Failed to parse lexicon {}: {}", path.display(), e))
    }

    pub fn traffic() -> Self {
        let synonyms = [
            ("xe gắn máy", "xe máy"),
            ("xe mô tô", "xe máy"),
            ("mô tô", "xe máy"),
            ("xe hơi", "ô tô"),
            ("ô tô con", "ô tô"),
            ("xe ô tô", "ô tô"),
            ("chạy nhanh", "tốc độ"),
            ("quá tốc độ", "tốc độ"),
            ("vượt tốc độ", "tốc độ"),
            ("uống rượu", "nồng độ cồn"),
            ("uống bia", "nồng độ cồn"),
            ("say xỉn", "nồng độ cồn"),
            ("vượt đèn đỏ", "đèn đỏ"),
            ("nón bảo hiểm", "mũ bảo hiểm"),
            ("bằng lái xe", "giấy phép lái xe"),
            ("bằng lái", "giấy phép lái xe"),
        ];
        Self {
            synonyms: synonyms.into_iter().map(|(f, t)| SynonymRule::new(f, t)).collect(),
            categories: vec![
                KeywordGroup::new("xe máy", ["xe máy"]),
                KeywordGroup::new("ô tô", ["ô tô", "xe tải", "xe khách"]),
                KeywordGroup::new("xe đạp", ["xe đạp"]),
            ],
            tags: vec![
                KeywordGroup::new("tốc độ", ["tốc độ", "km/h", "nhanh"]),
                KeywordGroup::new("nồng độ cồn", ["nồng độ cồn", "rượu", "bia", "cồn"]),
                KeywordGroup::new("đèn đỏ", ["đèn đỏ", "đèn tín hiệu", "tín hiệu"]),
                KeywordGroup::new("mũ bảo hiểm", ["mũ bảo hiểm"]),
                KeywordGroup::new("giấy tờ", ["giấy phép lái xe", "đăng ký xe", "giấy tờ"]),
            ],
            topics: vec![],
            number_pattern: Some(r"(\d+)\s*km/h".to_string()),
            emergency_keywords: ["tai nạn", "cấp cứu", "bị thương", "khẩn cấp"].map(String::from).to_vec(),
        }
    }

    pub fn health() -> Self {
        let synonyms = [
            ("đau đầu", "nhức đầu"),
            ("nhức đầu", "đau đầu"),
            ("cảm cúm", "cảm lạnh"),
            ("cảm lạnh", "cảm cúm"),
            ("ho có đờm", "ho có đờm balgam"),
            ("ho khan", "ho khô"),
            ("sốt cao", "nhiệt độ cao"),
            ("đau bụng", "đau dạ dày"),
            ("mệt mỏi", "mệt mỏi uể oải"),
            ("uể oải", "mệt mỏi uể oải"),
            ("căng thẳng", "stress"),
            ("stress", "căng thẳng stress"),
            ("lo âu", "lo lắng"),
            ("lo lắng", "lo âu lo lắng"),
            ("khó ngủ", "mất ngủ"),
            ("mất ngủ", "khó ngủ mất ngủ"),
            ("tập thể dục", "vận động"),
            ("thể thao", "vận động"),
            ("ăn uống", "dinh dưỡng"),
            ("chế độ ăn", "dinh dưỡng"),
        ];
        let symptoms = [
            "đau đầu", "nhức đầu", "sốt", "ho", "đau bụng", "buồn nôn", "chóng mặt", "mệt mỏi",
            "khó ngủ", "căng thẳng", "lo âu", "uể oải", "mất ngủ", "stress", "lo lắng",
        ];
        let body_parts = [
            "đầu", "cổ", "vai", "lưng", "bụng", "chân", "tay", "mắt", "tai", "mũi", "họng", "ngực", "tim", "phổi",
        ];
        let mut topics: Vec<KeywordGroup> = body_parts.into_iter().map(KeywordGroup::literal).collect();
        topics.push(KeywordGroup::new("nutrition", ["ăn", "thức ăn", "dinh dưỡng", "vitamin"]));
        topics.push(KeywordGroup::new("exercise", ["tập", "thể dục", "vận động", "gym"]));
        Self {
            synonyms: synonyms.into_iter().map(|(f, t)| SynonymRule::new(f, t)).collect(),
            categories: vec![],
            tags: symptoms.into_iter().map(KeywordGroup::literal).collect(),
            topics,
            number_pattern: None,
            emergency_keywords: [
                "cấp cứu", "khẩn cấp", "nguy hiểm", "dữ dội", "nghiêm trọng", "bất tỉnh", "choáng váng", "khó thở",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}
