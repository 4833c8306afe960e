use std::path::PathBuf;

use kbqa_core::config::{BonusSettings, Settings};
use kbqa_core::dataset::TrafficDataset;
use kbqa_core::records::{EmergencyCondition, HealthItem, LegalDocument, Violation};
use kbqa_core::types::{Entities, RankFields, RecordId, RecordRef, Urgency};
use kbqa_core::{Error, Record};
use kbqa_hybrid::{
    legal_library, load_health, load_legal_library, load_traffic, traffic_engine, ConfidenceAdjuster, FeedbackLog,
    KnowledgeEngine, Response, SearchOutcome,
};
use kbqa_text::{EntityExtractor, Lexicon};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn violation(id: i64, kind: &str, description: &str, vehicle: &str, keywords: &str) -> Violation {
    Violation {
        id,
        violation_type: kind.into(),
        description: description.into(),
        vehicle_type: vehicle.into(),
        fine_amount: "400.000 - 600.000 VND".into(),
        keywords: Some(keywords.into()),
        ..Default::default()
    }
}

fn fixture() -> Vec<Violation> {
    vec![
        violation(1, "tốc độ", "Xe máy chạy quá tốc độ 60-80km/h", "xe máy", "tốc độ xe máy"),
        violation(2, "nồng độ cồn", "Điều khiển xe máy có nồng độ cồn", "xe máy", "cồn rượu bia xe máy"),
        violation(3, "đèn đỏ", "Vượt đèn đỏ", "tất cả", "đèn đỏ tín hiệu"),
    ]
}

fn traffic() -> KnowledgeEngine<Violation> {
    traffic_engine(&Settings::default(), &Lexicon::traffic(), TrafficDataset { violations: fixture(), ..Default::default() }).expect("traffic engine")
}

#[test]
fn speed_question_finds_motorbike_speed_rule() {
    let engine = traffic();
    let outcome = engine.search("xe máy chạy 80km/h bị phạt bao nhiêu").unwrap();

    let entities = outcome.entities().unwrap();
    assert_eq!(entities.category.as_deref(), Some("xe máy"));
    assert!(entities.tags.contains(&"tốc độ".to_string()));
    assert_eq!(entities.number, Some(80));

    let results = outcome.results();
    assert!(results.len() <= 3);
    let hit = results.iter().find(|r| r.record.id == 1).expect("speed rule in top 3");
    assert!(hit.confidence > hit.similarity);
    assert_eq!(hit.origin.source, "violations");
    assert!(results.windows(2).all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn blank_queries_are_marked_empty() {
    let engine = traffic();
    for q in ["", "   ", "\n\t"] {
        assert_eq!(engine.search(q).unwrap(), SearchOutcome::EmptyQuery);
        assert_eq!(engine.respond(q), Response::Answer { outcome: SearchOutcome::EmptyQuery });
    }
}

#[test]
fn unrelated_query_returns_no_results() {
    let outcome = traffic().search("thời tiết hôm nay").unwrap();
    assert!(outcome.results().is_empty());
    assert!(matches!(outcome, SearchOutcome::Ranked { .. }));
}

#[test]
fn category_match_outranks_identical_mismatch() {
    let adjuster = ConfidenceAdjuster::new(BonusSettings::default(), 3);
    let entities = Entities { category: Some("xe máy".into()), ..Default::default() };
    let car = violation(1, "tốc độ", "Chạy quá tốc độ", "ô tô", "tốc độ");
    let bike = violation(2, "tốc độ", "Chạy quá tốc độ", "xe máy", "tốc độ");
    let origin = |id: RecordId, i: usize| RecordRef { source: "violations".into(), local_index: i, id };
    let ranked = adjuster.adjust(vec![(car, origin(1, 0), 0.4), (bike, origin(2, 1), 0.4)], &entities);
    assert_eq!(ranked[0].record.id, 2);
    assert!(ranked[0].confidence > ranked[1].confidence);
}

#[test]
fn clamp_caps_confidence_when_configured() {
    let bonus = BonusSettings { clamp: Some(1.0), ..Default::default() };
    let adjuster = ConfidenceAdjuster::new(bonus, 3);
    let entities = Entities { category: Some("xe máy".into()), tags: vec!["tốc độ".into()], ..Default::default() };
    let v = violation(1, "tốc độ", "Chạy quá tốc độ", "xe máy", "tốc độ");
    let origin = RecordRef { source: "violations".into(), local_index: 0, id: 1 };
    let ranked = adjuster.adjust(vec![(v, origin, 0.9)], &entities);
    assert_eq!(ranked[0].confidence, 1.0);
}

#[test]
fn store_mutations_rebuild_the_index() {
    let engine = traffic();
    let store = engine.store();
    assert_eq!(store.len(), 3);

    let id = store
        .add(violation(0, "mũ bảo hiểm", "Không đội mũ bảo hiểm", "xe máy", "mũ bảo hiểm nón bảo hiểm"))
        .unwrap();
    assert_eq!(id, 4);
    let top = engine.search("không đội nón bảo hiểm").unwrap();
    assert_eq!(top.results()[0].record.id, 4);

    let mut changed = store.get(Violation::SOURCE, 4).unwrap();
    changed.fine_amount = "600.000 VND".into();
    store.update(4, changed).unwrap();
    assert_eq!(store.get(Violation::SOURCE, 4).unwrap().fine_amount, "600.000 VND");

    store.delete(Violation::SOURCE, 4).unwrap();
    assert!(engine.search("không đội nón bảo hiểm").unwrap().results().iter().all(|r| r.record.id != 4));
    assert!(matches!(store.delete(Violation::SOURCE, 4), Err(Error::NotFound(_))));

    // ids are not reused after a delete
    let next = store.add(violation(0, "đèn đỏ", "Vượt đèn vàng", "tất cả", "đèn vàng")).unwrap();
    assert_eq!(next, 5);
}

#[test]
fn rejected_record_changes_nothing() {
    let engine = traffic();
    let before = engine.stats();

    let err = engine.store().add(violation(0, "tốc độ", "   ", "ô tô", "tốc độ")).unwrap_err();
    assert_eq!(err.code(), "missing_field");
    let batch = vec![
        violation(0, "tốc độ", "Ô tô chạy quá tốc độ", "ô tô", "tốc độ"),
        violation(0, "", "Thiếu loại vi phạm", "ô tô", ""),
    ];
    assert!(engine.store().add_batch(batch).is_err());

    assert_eq!(engine.stats(), before);
    assert_eq!(engine.store().len(), 3);
}

#[test]
fn repeated_ids_are_rejected_on_rebuild() {
    let engine = traffic();
    let before = engine.stats();

    let mut records = fixture();
    records[1].id = 1;
    let err = engine.rebuild(records).unwrap_err();
    assert!(matches!(err, Error::DuplicateId { origin: "violations", id: 1 }));
    assert_eq!(err.code(), "duplicate_id");
    assert_eq!(engine.stats(), before);

    // one delete removes exactly one record
    engine.store().delete(Violation::SOURCE, 1).unwrap();
    assert_eq!(engine.store().len(), 2);
}

#[test]
fn duplicate_ids_in_a_dataset_fail_to_load() {
    let mut records = fixture();
    records[2].id = 2;
    let dataset = TrafficDataset { violations: records, ..Default::default() };
    assert!(traffic_engine(&Settings::default(), &Lexicon::traffic(), dataset).is_err());
}

#[test]
fn update_of_unknown_id_is_not_found() {
    let engine = traffic();
    let err = engine.store().update(99, violation(0, "tốc độ", "x y", "ô tô", "")).unwrap_err();
    assert_eq!(err.code(), "not_found");
}

#[test]
fn cached_answers_do_not_survive_a_rebuild() {
    let engine = traffic();
    let first = engine.search("vượt đèn đỏ").unwrap();
    assert_eq!(engine.search("Vượt đèn đỏ").unwrap(), first);
    assert_eq!(engine.stats().cached_queries, 1);

    engine.rebuild(vec![violation(0, "đèn đỏ", "Vượt đèn đỏ khi rẽ phải", "ô tô", "đèn đỏ")]).unwrap();
    let second = engine.search("vượt đèn đỏ").unwrap();
    assert_eq!(second.results().len(), 1);
    assert_eq!(second.results()[0].record.vehicle_type, "ô tô");
}

#[test]
fn health_emergency_bypasses_ranking() {
    let engine = load_health(&Settings::default(), &workspace_root()).expect("health engine");
    match engine.search("cấp cứu đau ngực dữ dội").unwrap() {
        SearchOutcome::Emergency { condition, entities } => {
            assert_eq!(condition.condition_name, "Đau ngực dữ dội");
            assert_eq!(entities.urgency, Urgency::Emergency);
        }
        other => panic!("expected emergency, got {other:?}"),
    }
}

#[test]
fn emergency_added_at_runtime_short_circuits_search() {
    let engine = load_health(&Settings::default(), &workspace_root()).unwrap();
    let query = "bị rắn cắn nguy hiểm";
    assert!(matches!(engine.search(query).unwrap(), SearchOutcome::Ranked { .. }));

    let incomplete = EmergencyCondition { condition_name: "Rắn cắn".into(), keywords: "rắn".into(), ..Default::default() };
    assert_eq!(engine.add_emergency(incomplete).unwrap_err().code(), "missing_field");
    assert_eq!(engine.stats().emergency_conditions, 5);

    let id = engine
        .add_emergency(EmergencyCondition {
            condition_name: "Rắn cắn".into(),
            symptoms: "Vết cắn sưng đau, chóng mặt".into(),
            immediate_action: "Giữ yên chi bị cắn, gọi 115".into(),
            keywords: "rắn cắn".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(id, 6);
    assert_eq!(engine.stats().emergency_conditions, 6);
    match engine.search(query).unwrap() {
        SearchOutcome::Emergency { condition, .. } => assert_eq!(condition.condition_name, "Rắn cắn"),
        other => panic!("expected emergency, got {other:?}"),
    }
    // without an emergency keyword the ranked path still runs
    assert!(matches!(engine.search("rắn cắn").unwrap(), SearchOutcome::Ranked { .. }));
}

#[test]
fn health_symptom_query_gets_symptom_bonus() {
    let engine = load_health(&Settings::default(), &workspace_root()).unwrap();
    let outcome = engine.search("tôi bị đau đầu và mệt mỏi").unwrap();
    let hit = outcome
        .results()
        .iter()
        .find(|r| matches!(&r.record, HealthItem::HealthAdvice(a) if a.condition_name == "Đau đầu thông thường"))
        .expect("headache advice ranked");
    assert!((hit.confidence - hit.similarity - 0.3).abs() < 1e-5);
    assert_eq!(hit.origin.source, "health_advice");
}

#[test]
fn seeded_datasets_report_stats() {
    let root = workspace_root();
    let health = load_health(&Settings::default(), &root).unwrap().stats();
    assert_eq!(health.records_by_source.get("health_advice"), Some(&6));
    assert_eq!(health.records_by_source.get("nutrition"), Some(&5));
    assert_eq!(health.records_by_source.get("exercise"), Some(&5));
    assert_eq!(health.emergency_conditions, 5);
    assert!(health.vocabulary_size > 0);

    let traffic = load_traffic(&Settings::default(), &root).unwrap();
    assert_eq!(traffic.stats().generation, 1);
    let helmet = traffic.search("Không đội nón bảo hiểm").unwrap();
    assert_eq!(helmet.results()[0].record.violation_type, "mũ bảo hiểm");
}

#[test]
fn legal_documents_support_crud_and_citations() {
    let seed = vec![LegalDocument {
        id: 1,
        title: "Nghị định 100/2019/NĐ-CP".into(),
        code: "NĐ100".into(),
        content: Some("Quy định xử phạt vi phạm hành chính về giao thông".into()),
        effective_date: Some("2020-01-01".into()),
        status: "active".into(),
    }];
    let library = legal_library(&Settings::default(), &Lexicon::traffic(), seed).unwrap();
    let cited = Violation { document_id: Some(1), ..fixture().remove(0) };
    assert_eq!(library.cited_by(&cited).map(|d| d.code), Some("NĐ100".to_string()));

    let id = library
        .add(LegalDocument {
            title: "Test Document".into(),
            code: "TEST001".into(),
            content: Some("Test content".into()),
            effective_date: Some("2024-01-01".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(id, 2);
    assert_eq!(library.search("test document")[0].0.id, 2);

    let mut changed = library.get(1).unwrap();
    changed.title = "Updated Title".into();
    changed.content = Some("Updated content".into());
    library.update(1, changed).unwrap();
    assert_eq!(library.get(1).unwrap().title, "Updated Title");
    assert_eq!(library.update(9, LegalDocument::default()).unwrap_err().code(), "not_found");

    library.delete(1).unwrap();
    assert!(library.cited_by(&cited).is_none());
    assert_eq!(library.delete(1).unwrap_err().code(), "not_found");
    assert_eq!(library.len(), 1);

    let untitled = LegalDocument { code: "TT01".into(), ..Default::default() };
    assert_eq!(library.add(untitled).unwrap_err().code(), "missing_field");
    assert_eq!(library.len(), 1);
}

#[test]
fn seeded_violations_cite_seeded_documents() {
    let root = workspace_root();
    let library = load_legal_library(&Settings::default(), &root).unwrap();
    let traffic = load_traffic(&Settings::default(), &root).unwrap();
    for v in traffic.store().list() {
        let doc = library.cited_by(&v).expect("cited document exists");
        assert_eq!(Some(doc.title), v.legal_reference);
    }
}

#[test]
fn missing_dataset_directory_yields_empty_engine() {
    let tmp = tempfile::TempDir::new().unwrap();
    let engine = load_traffic(&Settings::default(), tmp.path()).unwrap();
    assert_eq!(engine.stats().vocabulary_size, 0);
    assert!(engine.search("xe máy").unwrap().results().is_empty());
}

#[derive(Clone)]
struct Exploding;

impl Record for Exploding {
    fn id(&self) -> RecordId { 1 }
    fn set_id(&mut self, _id: RecordId) {}
    fn source(&self) -> &'static str { "exploding" }
    fn searchable_text(&self) -> kbqa_core::Result<String> { Ok("xe máy tốc độ".into()) }
    fn rank_fields(&self) -> RankFields<'_> { panic!("rank fields unavailable") }
}

#[test]
fn panics_become_failure_codes() {
    let extractor = EntityExtractor::from_lexicon(&Lexicon::traffic()).unwrap();
    let engine = KnowledgeEngine::new("exploding", extractor, &Settings::default()).unwrap();
    engine.rebuild(vec![Exploding]).unwrap();
    match engine.respond("xe máy tốc độ") {
        Response::Failure { code } => assert_eq!(code, "internal"),
        Response::Answer { .. } => panic!("expected failure"),
    }
}

#[test]
fn feedback_is_appended_as_json_lines() {
    let tmp = tempfile::TempDir::new().unwrap();
    let log = FeedbackLog::new(tmp.path().join("feedback.log"));
    assert!(log.entries().unwrap().is_empty());

    let at = chrono::DateTime::parse_from_rfc3339("2024-05-01T08:30:00Z").unwrap().with_timezone(&chrono::Utc);
    log.record_at(at, "xe máy vượt đèn đỏ", true).unwrap();
    log.record("mũ bảo hiểm", false).unwrap();

    let entries = log.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].timestamp, "2024-05-01T08:30:00Z");
    assert_eq!(entries[0].query, "xe máy vượt đèn đỏ");
    assert!(entries[0].helpful);
    assert!(!entries[1].helpful);

    let raw = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(raw.lines().count(), 2);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn confidence_never_below_similarity(
            sims in proptest::collection::vec(0.0f32..1.0, 1..6),
            vehicle in prop::sample::select(vec!["xe máy", "ô tô", "tất cả", "xe đạp"]),
            wanted in prop::option::of(prop::sample::select(vec!["xe máy", "ô tô"])),
            tags in proptest::collection::vec(prop::sample::select(vec!["tốc độ", "đèn đỏ", "nồng độ cồn"]), 0..3),
        ) {
            let adjuster = ConfidenceAdjuster::new(BonusSettings::default(), 3);
            let entities = Entities {
                category: wanted.map(String::from),
                tags: tags.into_iter().map(String::from).collect(),
                ..Default::default()
            };
            let scored = sims
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let v = violation(i as i64 + 1, "tốc độ", "Chạy quá tốc độ", vehicle, "");
                    (v, RecordRef { source: "violations".into(), local_index: i, id: i as i64 + 1 }, *s)
                })
                .collect();
            let ranked = adjuster.adjust(scored, &entities);
            prop_assert!(ranked.len() <= 3);
            for r in &ranked {
                prop_assert!(r.confidence >= r.similarity);
            }
        }
    }
}
