//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PiiScanConfig;
use crate::domain::errors::PiiScanError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`PiiScanConfig`]
/// 4. Applies `PIISCAN_*` environment variable overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<PiiScanConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PiiScanError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PiiScanError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PiiScanConfig = toml::from_str(&contents)
        .map_err(|e| PiiScanError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| PiiScanError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. All missing variables are collected
/// and reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PiiScanError::Configuration(e.to_string()))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines so ${VAR} in documentation stays literal
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PiiScanError::Configuration(format!(
            "Missing environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `PIISCAN_*` environment variable overrides onto a parsed config
fn apply_env_overrides(config: &mut PiiScanConfig) {
    if let Ok(url) = std::env::var("PIISCAN_URL") {
        config.index.url = url;
    }
    if let Ok(index) = std::env::var("PIISCAN_INDEX") {
        config.index.name = index;
    }
    if let Ok(username) = std::env::var("PIISCAN_USERNAME") {
        config.index.username = Some(username);
    }
    if let Ok(password) = std::env::var("PIISCAN_PASSWORD") {
        config.index.password = Some(secrecy::Secret::new(password.into()));
    }
    if let Ok(api_key) = std::env::var("PIISCAN_API_KEY") {
        config.index.api_key = Some(secrecy::Secret::new(api_key.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config(
            r#"
            [index]
            url = "http://localhost:9200"
            name = "documents"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.index.name, "documents");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = load_config("/nonexistent/piiscan.toml").unwrap_err();
        assert!(matches!(err, PiiScanError::Configuration(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PIISCAN_TEST_INDEX_NAME", "substituted");
        let file = write_config(
            r#"
            [index]
            url = "http://localhost:9200"
            name = "${PIISCAN_TEST_INDEX_NAME}"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.index.name, "substituted");
        std::env::remove_var("PIISCAN_TEST_INDEX_NAME");
    }

    #[test]
    fn test_missing_env_var_reported() {
        let file = write_config(
            r#"
            [index]
            url = "http://localhost:9200"
            name = "${PIISCAN_TEST_UNSET_VARIABLE}"
            "#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("PIISCAN_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let file = write_config(
            r#"
            # set name via ${PIISCAN_TEST_COMMENTED_VARIABLE}
            [index]
            url = "http://localhost:9200"
            name = "documents"
            "#,
        );

        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected_on_load() {
        let file = write_config(
            r#"
            [index]
            url = "http://localhost:9200"
            name = ""
            "#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("index.name"));
    }
}
