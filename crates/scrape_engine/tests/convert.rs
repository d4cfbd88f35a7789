use std::fs;

use pretty_assertions::assert_eq;
use scrape_core::GithubTopicRecord;
use scrape_engine::{
    convert_file, convert_files, ConvertOptions, FileHandler, HandlerError, Mime, WriteOptions,
};
use serde_json::json;
use tempfile::TempDir;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

#[test]
fn tabular_scrape_converts_to_an_envelope_document() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("20241125_gdpr.csv");
    fs::write(&source, "user,name,stars\nocto,consent,12\n").unwrap();

    let output = convert_file(&source, Mime::Json, &ConvertOptions::default()).unwrap();
    assert_eq!(output, temp.path().join("20241125_gdpr.json"));

    let converted = FileHandler::open(&output).unwrap();
    let meta = converted.meta();
    assert_eq!(meta.get_str("topic"), Some("gdpr"));
    assert_eq!(meta.get_str("timestamp"), Some("20241125"));
    let data = converted.read().unwrap().as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0], json!({"user": "octo", "name": "consent", "stars": 12}));
}

#[test]
fn conversion_preserves_the_payload() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("20240101_numbers.csv");
    fs::write(&source, "a,b\n1,2\n").unwrap();

    let output = convert_file(&source, Mime::Json, &ConvertOptions::default()).unwrap();
    let converted = FileHandler::open(&output).unwrap();
    assert_eq!(converted.read(), Some(&json!([{"a": 1, "b": 2}])));
}

#[test]
fn envelope_converts_to_tabular_and_back() {
    let temp = TempDir::new().unwrap();
    let env = GithubTopicRecord::envelope(
        "gdpr",
        1,
        "https://github.com/topics/gdpr",
        vec![GithubTopicRecord {
            topic: "gdpr".into(),
            user: "octo".into(),
            name: "consent".into(),
            url: "https://github.com/octo/consent".into(),
            img: None,
            stars: 7,
            description: Some("Consent, made simple".into()),
            tags: vec![],
            last_update: "2024-11-20T10:00:00Z".into(),
            lang: Some("Rust".into()),
        }],
    );
    let source = FileHandler::from_envelope(Mime::Json, &env)
        .unwrap()
        .write(&WriteOptions {
            fname: Some(temp.path().join("20241125_gdpr.json")),
            ..Default::default()
        })
        .unwrap();

    let csv_path = convert_file(&source, Mime::Csv, &ConvertOptions::default()).unwrap();
    assert_eq!(csv_path, temp.path().join("20241125_gdpr.csv"));
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("topic,user,name,url,img,stars,description,tags,last_update,lang\n"));
    assert!(text.contains("\"Consent, made simple\""));

    let rows = FileHandler::open(&csv_path).unwrap();
    let row = &rows.read().unwrap()[0];
    assert_eq!(row["stars"], json!(7));
    assert_eq!(row["description"], json!("Consent, made simple"));
    assert_eq!(row["tags"], json!("[]"));
}

#[test]
fn repeated_conversion_picks_a_fresh_name_unless_overwriting() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("20241125_gdpr.csv");
    fs::write(&source, "a\n1\n").unwrap();

    let first = convert_file(&source, Mime::Json, &ConvertOptions::default()).unwrap();
    let second = convert_file(&source, Mime::Json, &ConvertOptions::default()).unwrap();
    assert_eq!(first, temp.path().join("20241125_gdpr.json"));
    assert_eq!(second, temp.path().join("20241125_gdpr 1.json"));

    let overwrite = ConvertOptions {
        overwrite: true,
        ..Default::default()
    };
    let third = convert_file(&source, Mime::Json, &overwrite).unwrap();
    assert_eq!(third, first);
}

#[test]
fn output_directory_can_be_redirected() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("20241125_gdpr.csv");
    fs::write(&source, "a\n1\n").unwrap();
    let out_dir = temp.path().join("converted");

    let options = ConvertOptions {
        dir: Some(out_dir.clone()),
        ..Default::default()
    };
    let output = convert_file(&source, Mime::Json, &options).unwrap();
    assert_eq!(output, out_dir.join("20241125_gdpr.json"));
    assert!(output.is_file());
}

#[test]
fn batch_failures_do_not_stop_later_files() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("20240101_first.csv");
    let missing = temp.path().join("20240102_missing.csv");
    let unsupported = temp.path().join("notes.txt");
    let also_good = temp.path().join("20240103_third.csv");
    fs::write(&good, "a\n1\n").unwrap();
    fs::write(&unsupported, "hello").unwrap();
    fs::write(&also_good, "b\n2\n").unwrap();

    let sources = [&good, &missing, &unsupported, &also_good];
    let report = convert_files(&sources, Mime::Json, &ConvertOptions::default());

    assert_eq!(report.len(), 4);
    assert!(!report.is_success());
    let succeeded: Vec<_> = report.succeeded().map(|(src, _)| src.to_path_buf()).collect();
    assert_eq!(succeeded, vec![good.clone(), also_good.clone()]);

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].0, missing.as_path());
    assert!(matches!(failed[0].1, HandlerError::Io { .. }));
    assert_eq!(failed[1].0, unsupported.as_path());
    assert!(matches!(failed[1].1, HandlerError::UnsupportedFormat { .. }));

    assert!(temp.path().join("20240103_third.json").is_file());
}

#[test]
fn pass_through_target_reports_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("20241125_gdpr.csv");
    fs::write(&source, "a\n1\n").unwrap();

    let err = convert_file(&source, Mime::Out, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, HandlerError::Configuration(_)));
}
