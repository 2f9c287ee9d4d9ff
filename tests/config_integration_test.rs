//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use piiscan::config::load_config;
use piiscan::domain::DedupeScope;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("PIISCAN_URL");
    std::env::remove_var("PIISCAN_INDEX");
    std::env::remove_var("PIISCAN_USERNAME");
    std::env::remove_var("PIISCAN_PASSWORD");
    std::env::remove_var("PIISCAN_API_KEY");
    std::env::remove_var("TEST_ES_PASSWORD");
}

fn write_temp_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "https://search.example.com:9200"
name = "documents"
username = "scanner"
password = "s3cret"
verify_tls = false
ca_cert = "certs/cluster-ca.pem"
timeout_seconds = 30
scroll_keepalive = "5m"

[index.retry]
max_retries = 5
initial_delay_ms = 250
max_delay_ms = 10000
backoff_multiplier = 1.5

[scan]
batch_size = 250
query_file = "query.json"
dedupe = "global"

[detectors]
builtin = true
path = "extra_detectors.toml"

[reconcile]
apply_updates = true
bulk_size = 500
retry_on_conflict = 5
field_prefix = "pii."

[reconcile.field_map]
NAS = "nas_norm"
EMAIL = "emails"

[audit]
path = "out/matches.csv"

[logging]
level = "debug"
file_enabled = true
file_path = "logs"
file_rotation = "hourly"
"#;

    let temp_file = write_temp_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.index.url, "https://search.example.com:9200");
    assert_eq!(config.index.name, "documents");
    assert_eq!(config.index.username, Some("scanner".to_string()));
    assert!(config.index.password.is_some());
    assert!(!config.index.verify_tls);
    assert_eq!(
        config.index.ca_cert,
        Some("certs/cluster-ca.pem".to_string())
    );
    assert_eq!(config.index.timeout_seconds, 30);
    assert_eq!(config.index.scroll_keepalive, "5m");
    assert_eq!(config.index.retry.max_retries, 5);

    assert_eq!(config.scan.batch_size, 250);
    assert_eq!(config.scan.query_file, Some("query.json".to_string()));
    assert_eq!(config.scan.dedupe, DedupeScope::Global);

    assert!(config.detectors.builtin);
    assert_eq!(
        config.detectors.path,
        Some("extra_detectors.toml".to_string())
    );

    assert!(config.reconcile.apply_updates);
    assert_eq!(config.reconcile.bulk_size, 500);
    assert_eq!(config.reconcile.retry_on_conflict, 5);
    assert_eq!(config.reconcile.field_prefix, Some("pii.".to_string()));
    assert_eq!(
        config.reconcile.field_map.get("NAS"),
        Some(&"nas_norm".to_string())
    );

    assert_eq!(config.audit.path, "out/matches.csv");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file_rotation, "hourly");
}

#[test]
fn test_minimal_config_gets_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"
"#;

    let temp_file = write_temp_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert!(config.index.verify_tls);
    assert!(config.index.ca_cert.is_none());
    assert_eq!(config.index.timeout_seconds, 60);
    assert_eq!(config.index.scroll_keepalive, "2m");
    assert_eq!(config.scan.batch_size, 500);
    assert_eq!(config.scan.dedupe, DedupeScope::PerDocument);
    assert!(!config.reconcile.apply_updates);
    assert_eq!(config.reconcile.bulk_size, 1000);
    assert_eq!(config.reconcile.retry_on_conflict, 3);
    assert_eq!(config.audit.path, "pii_matches.csv");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_ES_PASSWORD", "from-environment");

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"
username = "scanner"
password = "${TEST_ES_PASSWORD}"
"#;

    let temp_file = write_temp_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    use secrecy::ExposeSecret;
    assert_eq!(
        config.index.password.unwrap().expose_secret().as_ref(),
        "from-environment"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_fails() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"
password = "${PIISCAN_DEFINITELY_UNSET_VAR}"
"#;

    let temp_file = write_temp_config(toml_content);
    let result = load_config(temp_file.path());

    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("PIISCAN_DEFINITELY_UNSET_VAR"));
}

#[test]
fn test_env_var_in_comment_is_ignored() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"
# password = "${PIISCAN_DEFINITELY_UNSET_VAR}"
"#;

    let temp_file = write_temp_config(toml_content);
    assert!(load_config(temp_file.path()).is_ok());
}

#[test]
fn test_env_overrides_take_precedence() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("PIISCAN_INDEX", "override-index");
    std::env::set_var("PIISCAN_API_KEY", "override-key");

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"
"#;

    let temp_file = write_temp_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.index.name, "override-index");
    assert!(config.index.api_key.is_some());

    cleanup_env_vars();
}

#[test]
fn test_invalid_url_scheme_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "ftp://localhost:9200"
name = "documents"
"#;

    let temp_file = write_temp_config(toml_content);
    let result = load_config(temp_file.path());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("http://"));
}

#[test]
fn test_zero_bulk_size_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"

[reconcile]
bulk_size = 0
"#;

    let temp_file = write_temp_config(toml_content);
    let result = load_config(temp_file.path());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("bulk_size"));
}

#[test]
fn test_invalid_dedupe_scope_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[index]
url = "http://localhost:9200"
name = "documents"

[scan]
dedupe = "sometimes"
"#;

    let temp_file = write_temp_config(toml_content);
    assert!(load_config(temp_file.path()).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let result = load_config("/nonexistent/piiscan.toml");
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("/nonexistent/piiscan.toml"));
}
