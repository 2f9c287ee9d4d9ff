//! Secure credential handling using the secrecy crate
//!
//! Credentials (passwords, api keys, bearer tokens) are held in
//! `Secret<SecretValue>`: memory is zeroed on drop, Debug output is
//! redacted, and access requires an explicit `expose_secret()` call.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the traits Secret requires
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret-wrapped string credential
pub type SecretString = Secret<SecretValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret: SecretString = Secret::new(SecretValue::from("hunter2".to_string()));
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_secret_exposes_value() {
        let secret: SecretString = Secret::new(SecretValue::from("hunter2".to_string()));
        assert_eq!(secret.expose_secret().as_ref(), "hunter2");
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            password: SecretString,
        }

        let wrapper: Wrapper = toml::from_str(r#"password = "s3cret""#).unwrap();
        assert_eq!(wrapper.password.expose_secret().as_ref(), "s3cret");
    }
}
