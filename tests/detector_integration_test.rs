//! Integration tests for the detector registry over realistic documents

use piiscan::core::collect::MatchCollector;
use piiscan::detectors::DetectorRegistry;
use piiscan::domain::DedupeScope;
use serde_json::json;

#[test]
fn test_builtin_registry_loads() {
    let registry = DetectorRegistry::builtin().unwrap();
    assert!(registry.len() >= 8);
    assert!(registry.get("NAS").is_some());
    assert!(registry.get("EMAIL").is_some());
    assert!(registry.get("QC_RAMQ").is_some());
}

#[test]
fn test_sin_detected_through_unicode_separators() {
    let registry = DetectorRegistry::builtin().unwrap();

    // En dash and non-breaking space between digit groups
    let matches = registry.apply("NAS: 046\u{2013}454\u{00A0}286 on file");
    let sin: Vec<_> = matches
        .iter()
        .filter(|m| m.detector_name == "NAS")
        .collect();
    assert_eq!(sin.len(), 1);
    assert_eq!(sin[0].normalized_text, "046-454-286");
}

#[test]
fn test_sin_in_arabic_indic_digits_normalizes_to_ascii() {
    let registry = DetectorRegistry::builtin().unwrap();

    let matches = registry.apply("NAS: ٠٤٦ ٤٥٤ ٢٨٦");
    let sin: Vec<_> = matches
        .iter()
        .filter(|m| m.detector_name == "NAS")
        .collect();
    assert_eq!(sin.len(), 1);
    assert_eq!(sin[0].normalized_text, "046-454-286");
}

#[test]
fn test_invalid_checksum_is_silently_dropped() {
    let registry = DetectorRegistry::builtin().unwrap();

    let matches = registry.apply("candidate 123 456 789 here");
    assert!(matches.iter().all(|m| m.detector_name != "NAS"));
}

#[test]
fn test_email_case_folded() {
    let registry = DetectorRegistry::builtin().unwrap();

    let matches = registry.apply("write To: John.DOE@Example.COM today");
    let emails: Vec<_> = matches
        .iter()
        .filter(|m| m.detector_name == "EMAIL")
        .collect();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].raw_text, "John.DOE@Example.COM");
    assert_eq!(emails[0].normalized_text, "john.doe@example.com");
}

#[test]
fn test_postal_code_and_phone() {
    let registry = DetectorRegistry::builtin().unwrap();

    let matches = registry.apply("Ship to H2X 1Y4, call (514) 555-0199");
    assert!(matches
        .iter()
        .any(|m| m.detector_name == "POSTAL_CA" && m.normalized_text == "H2X1Y4"));
    assert!(matches
        .iter()
        .any(|m| m.detector_name == "PHONE_CA" && m.normalized_text == "5145550199"));
}

#[test]
fn test_overlapping_detectors_both_report() {
    let registry = DetectorRegistry::builtin().unwrap();

    // A seven-digit run inside a URL path: both URL_HTTP and STUDENT_ID fire
    let matches = registry.apply("see https://intra.example.ca/students/1234567 for details");
    assert!(matches.iter().any(|m| m.detector_name == "URL_HTTP"));
    assert!(matches
        .iter()
        .any(|m| m.detector_name == "STUDENT_ID" && m.normalized_text == "1234567"));
}

#[test]
fn test_collector_per_document_scope_resets_between_documents() {
    let registry = DetectorRegistry::builtin().unwrap();
    let mut collector = MatchCollector::new(DedupeScope::PerDocument);

    let doc = json!({ "body": "a@x.ca again a@x.ca" });
    let first = collector.collect("doc-1", &doc, &registry);
    assert_eq!(first.len(), 1);
    assert_eq!(collector.suppressed(), 1);

    // Same value in a different document is retained again
    let second = collector.collect("doc-2", &doc, &registry);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_collector_global_scope_spans_documents() {
    let registry = DetectorRegistry::builtin().unwrap();
    let mut collector = MatchCollector::new(DedupeScope::Global);

    let doc = json!({ "body": "a@x.ca" });
    assert_eq!(collector.collect("doc-1", &doc, &registry).len(), 1);
    assert_eq!(collector.collect("doc-2", &doc, &registry).len(), 0);
    assert_eq!(collector.suppressed(), 1);
}

#[test]
fn test_collector_none_scope_keeps_everything() {
    let registry = DetectorRegistry::builtin().unwrap();
    let mut collector = MatchCollector::new(DedupeScope::None);

    let doc = json!({ "body": "a@x.ca again a@x.ca" });
    assert_eq!(collector.collect("doc-1", &doc, &registry).len(), 2);
    assert_eq!(collector.suppressed(), 0);
}

#[test]
fn test_collector_walks_nested_fields() {
    let registry = DetectorRegistry::builtin().unwrap();
    let mut collector = MatchCollector::new(DedupeScope::PerDocument);

    let doc = json!({
        "meta": { "author": "mail curator@archive.qc.ca" },
        "attachments": [
            { "content": "SIN 046 454 286" }
        ]
    });

    let matches = collector.collect("doc-1", &doc, &registry);
    assert!(matches
        .iter()
        .any(|m| m.field_path == "meta.author" && m.detector_name == "EMAIL"));
    assert!(matches
        .iter()
        .any(|m| m.field_path == "attachments[0].content" && m.detector_name == "NAS"));
}

#[test]
fn test_custom_detector_file_extends_builtins() {
    let toml_content = r#"
[[detectors]]
name = "BADGE"
pattern = '\bB-\d{6}\b'
normalize = "alnum-upper"
"#;

    let mut definitions = DetectorRegistry::builtin_definitions().unwrap();
    definitions.extend(DetectorRegistry::definitions_from_toml(toml_content).unwrap());
    let registry = DetectorRegistry::load(definitions).unwrap();

    let matches = registry.apply("badge B-004217 issued");
    assert!(matches
        .iter()
        .any(|m| m.detector_name == "BADGE" && m.normalized_text == "B004217"));
}

#[test]
fn test_duplicate_detector_names_rejected() {
    let toml_content = r#"
[[detectors]]
name = "X"
pattern = 'a'

[[detectors]]
name = "X"
pattern = 'b'
"#;

    assert!(DetectorRegistry::from_toml(toml_content).is_err());
}

#[test]
fn test_unknown_rule_identifier_rejected() {
    let toml_content = r#"
[[detectors]]
name = "X"
pattern = 'a'
normalize = "rot13"
"#;

    let err = DetectorRegistry::from_toml(toml_content).unwrap_err();
    assert!(err.to_string().contains("rot13"));
}
