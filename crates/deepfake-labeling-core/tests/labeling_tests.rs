//! End-to-end labeling tests: whitelist on disk, sessions, label documents.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use deepfake_labeling_core::whitelist::GeneratorOutcome;
use deepfake_labeling_core::{
    load_whitelist, open_labeling_service, save_whitelist, Difficulty, DoctorId,
    FfiAuthorization, FfiLabelSubmission, LabelSubmission, LabelingConfig, LabelingError,
    LabelingService, SessionError, Whitelist, WhitelistGenerator,
};
use tempfile::TempDir;

fn write_whitelist(dir: &Path, ids: &[&str]) -> PathBuf {
    let path = dir.join("doctor_whitelist.json");
    let ids: BTreeSet<String> = ids.iter().map(|s| s.to_string()).collect();
    save_whitelist(&path, &Whitelist::from_ids(ids)).unwrap();
    path
}

fn service(dir: &TempDir, ids: &[&str]) -> LabelingService {
    let whitelist_path = write_whitelist(dir.path(), ids);
    LabelingService::new(
        LabelingConfig::default()
            .with_whitelist_path(whitelist_path)
            .with_labels_dir(dir.path().join("doctor_labels")),
    )
}

fn store_path(dir: &TempDir, id: &str) -> PathBuf {
    let hash = DoctorId::parse(id).unwrap().hash();
    dir.path()
        .join("doctor_labels")
        .join(format!("doctor_{}.json", hash.as_str()))
}

fn rated(filename: &str, difficulty: Difficulty) -> LabelSubmission {
    let mut submission = LabelSubmission::new(filename.into(), difficulty, "medium".into());
    submission.seed = Some(7);
    submission.ehr_text = "58-year-old with chest pain.".into();
    submission.metadata.insert("realism".into(), 0.8);
    submission
}

#[test]
fn test_single_doctor_scenario() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, &["DOC1234"]);

    assert!(service.validator().is_authorized("DOC1234"));
    assert!(!service.validator().is_authorized("doc1234"));

    let mut session = service.start_session("DOC1234").unwrap();
    session.submit(rated("img1.png", Difficulty::Hard)).unwrap();

    let raw = std::fs::read_to_string(store_path(&dir, "DOC1234")).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &document["img1.png"];
    assert_eq!(document.as_object().unwrap().len(), 1);
    assert_eq!(entry["doctor_difficulty"], "hard");
    assert_eq!(entry["original_difficulty"], "medium");
    assert_eq!(entry["seed"], 7);
    assert_eq!(entry["metadata"]["realism"], 0.8);
    assert!(entry["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(!raw.contains("DOC1234"));
}

#[test]
fn test_labels_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let service = service(&dir, &["DOC1", "DOC2"]);
        let mut session = service.start_session("DOC1").unwrap();
        for i in 0..25 {
            let difficulty = Difficulty::ALL[i % Difficulty::ALL.len()];
            session
                .submit(rated(&format!("img{:03}.png", i), difficulty))
                .unwrap();
        }
    }

    let service = service(&dir, &["DOC1", "DOC2"]);
    let session = service.start_session("DOC1").unwrap();
    assert_eq!(session.labels().len(), 25);
    assert_eq!(session.summary()[&Difficulty::VeryEasy], 5);
    assert_eq!(
        session.labels()["img004.png"].doctor_difficulty,
        Difficulty::VeryHard
    );

    // Other doctors see only their own labels
    let other = service.start_session("DOC2").unwrap();
    assert!(other.labels().is_empty());
}

#[test]
fn test_corrupt_store_recovers_on_login() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, &["DOC1234"]);
    let path = store_path(&dir, "DOC1234");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ truncated").unwrap();

    let mut session = service.start_session("DOC1234").unwrap();
    assert!(session.labels().is_empty());
    assert_eq!(session.warnings().len(), 1);
    assert!(session.warnings()[0].to_string().contains("could not be read"));

    session.submit(rated("img1.png", Difficulty::Easy)).unwrap();
    let reloaded: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded.as_object().unwrap().len(), 1);

    let quarantined = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(quarantined, 1);
}

#[test]
fn test_missing_whitelist_blocks_everyone() {
    let dir = TempDir::new().unwrap();
    let service = LabelingService::new(
        LabelingConfig::default()
            .with_whitelist_path(dir.path().join("nowhere.json"))
            .with_labels_dir(dir.path().join("doctor_labels")),
    );

    let err = service.start_session("DOC1234").unwrap_err();
    assert!(matches!(err, SessionError::Configuration(_)));
    assert_ne!(err.user_message(), SessionError::NotAuthorized.user_message());
}

#[test]
fn test_generator_output_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("doctors.txt");
    std::fs::write(&source, "DOC1\nDOC1\nDOC2\n").unwrap();

    let generate = || {
        let mut generator = WhitelistGenerator::new();
        generator.collect_text_file(&source);
        match generator.finish().unwrap() {
            GeneratorOutcome::Built(whitelist) => whitelist,
            GeneratorOutcome::Empty => panic!("expected IDs"),
        }
    };

    let first = generate();
    let second = generate();
    assert_eq!(first.whitelist, vec!["DOC1", "DOC2"]);
    assert_eq!(first.total_doctors, 2);
    assert_eq!(first.whitelist, second.whitelist);

    let path = dir.path().join("doctor_whitelist.json");
    save_whitelist(&path, &first).unwrap();
    assert_eq!(load_whitelist(&path).unwrap(), first);
}

#[test]
fn test_ffi_session_round_trip() {
    let dir = TempDir::new().unwrap();
    let whitelist_path = write_whitelist(dir.path(), &["DOC1234"]);
    let core = open_labeling_service(
        whitelist_path.display().to_string(),
        dir.path().join("doctor_labels").display().to_string(),
    );

    assert!(core.configuration_problems().is_empty());
    assert_eq!(core.authorized_count(), Some(1));
    assert_eq!(core.authorize("nobody".into()), FfiAuthorization::NotAuthorized);
    assert!(matches!(
        core.start_session("nobody".into()),
        Err(LabelingError::NotAuthorized(_))
    ));

    let session = core.start_session("DOC1234".into()).unwrap();
    let submission = FfiLabelSubmission {
        filename: "img1.png".into(),
        doctor_difficulty: "Very Hard".into(),
        original_difficulty: "hard".into(),
        seed: None,
        ehr_text: String::new(),
        metadata: Default::default(),
    };
    let record = session.submit_label(submission.clone()).unwrap();
    assert_eq!(record.doctor_difficulty, "very_hard");

    let bad = FfiLabelSubmission {
        doctor_difficulty: "skipped".into(),
        ..submission
    };
    assert!(matches!(
        session.submit_label(bad),
        Err(LabelingError::Validation(_))
    ));

    let progress = session.progress(4).unwrap();
    assert_eq!(progress.labeled, 1);
    assert_eq!(progress.fraction, 0.25);

    let summary = session.summary().unwrap();
    assert_eq!(summary.len(), 5);
    assert_eq!(
        summary.iter().find(|c| c.difficulty == "very_hard").unwrap().count,
        1
    );
    assert_eq!(
        session
            .next_unlabeled(vec!["img1.png".into(), "img2.png".into()])
            .unwrap(),
        Some("img2.png".to_string())
    );
    assert_eq!(session.doctor_hash().unwrap().len(), 16);
}
