use std::fs;

use kbqa_core::config::{resolve_with_base, Config, Settings};
use kbqa_core::dataset::{DatasetLoader, HealthDataset, TrafficDataset};
use kbqa_core::Record;

#[test]
fn loader_reads_collections_by_stem() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("traffic");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("violations.json"),
        r#"[{"id": 1, "violation_type": "tốc độ", "description": "Xe máy chạy quá tốc độ", "vehicle_type": "xe máy", "fine_amount": "400.000 VND"}]"#,
    )
    .unwrap();

    let loader = DatasetLoader::new(tmp.path());
    let traffic = TrafficDataset::load(&loader).expect("load traffic");
    assert_eq!(traffic.violations.len(), 1);
    assert_eq!(traffic.violations[0].vehicle_type, "xe máy");
    assert_eq!(traffic.violations[0].keywords, None);
}

#[test]
fn missing_collections_load_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let loader = DatasetLoader::new(tmp.path());
    let health = HealthDataset::load(&loader).expect("load health");
    assert!(health.advice.is_empty());
    assert!(health.emergencies.is_empty());
}

#[test]
fn health_items_keep_collection_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("exercise.json"), r#"[{"id": 9, "exercise_name": "Yoga", "category": "flexibility"}]"#).unwrap();
    fs::write(tmp.path().join("health_advice.json"), r#"[{"id": 4, "category": "symptom", "condition_name": "Ho khan", "advice": "Uống nước ấm"}]"#).unwrap();

    let health = HealthDataset::load(&DatasetLoader::new(tmp.path())).unwrap();
    let sources: Vec<&str> = health.indexed_items().iter().map(|i| i.source()).collect();
    assert_eq!(sources, vec!["health_advice", "exercise"]);
    assert_eq!(health.advice[0].warning_level, "normal");
}

#[test]
fn legal_documents_load_alongside_violations() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("legal_documents.json"),
        r#"[{"id": 1, "title": "Nghị định 100/2019/NĐ-CP", "code": "NĐ100", "effective_date": "2020-01-01"}]"#,
    )
    .unwrap();

    let traffic = TrafficDataset::load(&DatasetLoader::new(tmp.path())).unwrap();
    assert!(traffic.violations.is_empty());
    assert_eq!(traffic.documents.len(), 1);
    assert_eq!(traffic.documents[0].code, "NĐ100");
    assert_eq!(traffic.documents[0].status, "active");
}

#[test]
fn non_utf8_dataset_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut bytes = br#"[{"id": 1, "violation_type": "t"#.to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(br#"c", "description": "x", "vehicle_type": "y", "fine_amount": "z"}]"#);
    fs::write(tmp.path().join("violations.json"), bytes).unwrap();

    let err = TrafficDataset::load(&DatasetLoader::new(tmp.path())).unwrap_err();
    assert!(format!("{err:#}").contains("UTF-8"));
}

#[test]
fn malformed_json_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("violations.json"), "{not json").unwrap();
    assert!(TrafficDataset::load(&DatasetLoader::new(tmp.path())).is_err());
}

#[test]
fn defaults_match_documented_values() {
    let s = Settings::default();
    assert_eq!((s.index.ngram_min, s.index.ngram_max, s.index.max_features), (1, 2, 1000));
    assert_eq!(s.search.threshold, 0.05);
    assert_eq!((s.search.candidate_pool, s.search.final_count), (5, 3));
    assert_eq!((s.bonus.category_exact, s.bonus.category_generic, s.bonus.type_match), (0.2, 0.1, 0.3));
    assert_eq!(s.bonus.clamp, None);
    s.validate().expect("defaults are valid");
}

#[test]
fn inline_toml_overrides_defaults() {
    let config = Config::from_toml_str("[search]\nthreshold = 0.1\n\n[bonus]\nclamp = 1.0\n").expect("config");
    let s = config.settings().unwrap();
    assert_eq!(s.search.threshold, 0.1);
    assert_eq!(s.search.candidate_pool, 5);
    assert_eq!(s.bonus.clamp, Some(1.0));
    let pool: usize = config.get("search.candidate_pool").unwrap();
    assert_eq!(pool, 5);
}

#[test]
fn invalid_settings_are_rejected() {
    assert!(Config::from_toml_str("[index]\nngram_min = 3\nngram_max = 2\n").is_err());
    assert!(Config::from_toml_str("[search]\nfinal_count = 6\n").is_err());
    assert!(Config::from_toml_str("[bonus]\ntype_match = -0.3\n").is_err());
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/srv/kbqa");
    assert_eq!(resolve_with_base(base, "data/traffic"), base.join("data/traffic"));
    assert_eq!(resolve_with_base(base, "/abs/data"), std::path::PathBuf::from("/abs/data"));
}
