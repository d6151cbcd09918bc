//! Validation middleware configuration
//!
//! The attribute names under which results are attached to a request can
//! be set in code, from JSON, or from the environment:
//!
//! | Variable                      | Default      |
//! |-------------------------------|--------------|
//! | `SIEVE_ERRORS_ATTRIBUTE`      | `errors`     |
//! | `SIEVE_HAS_ERRORS_ATTRIBUTE`  | `has_errors` |
//! | `SIEVE_VALIDATORS_ATTRIBUTE`  | `validators` |
//! | `SIEVE_TRANSLATOR_ATTRIBUTE`  | `translator` |

use crate::error::{HttpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ERRORS_VAR: &str = "SIEVE_ERRORS_ATTRIBUTE";
pub const HAS_ERRORS_VAR: &str = "SIEVE_HAS_ERRORS_ATTRIBUTE";
pub const VALIDATORS_VAR: &str = "SIEVE_VALIDATORS_ATTRIBUTE";
pub const TRANSLATOR_VAR: &str = "SIEVE_TRANSLATOR_ATTRIBUTE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub errors_attribute: String,
    pub has_errors_attribute: String,
    pub validators_attribute: String,
    pub translator_attribute: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            errors_attribute: "errors".to_string(),
            has_errors_attribute: "has_errors".to_string(),
            validators_attribute: "validators".to_string(),
            translator_attribute: "translator".to_string(),
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors_attribute(mut self, name: impl Into<String>) -> Self {
        self.errors_attribute = name.into();
        self
    }

    pub fn has_errors_attribute(mut self, name: impl Into<String>) -> Self {
        self.has_errors_attribute = name.into();
        self
    }

    pub fn validators_attribute(mut self, name: impl Into<String>) -> Self {
        self.validators_attribute = name.into();
        self
    }

    pub fn translator_attribute(mut self, name: impl Into<String>) -> Self {
        self.translator_attribute = name.into();
        self
    }

    /// Options from a JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| HttpError::Config(format!("Invalid validation options: {}", e)))?;
        options.check()
    }

    /// Defaults overridden by the `SIEVE_*_ATTRIBUTE` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Like [`from_env`](Self::from_env), with variables from a `.env`
    /// file underneath the process environment.
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_vars = dotenvy::from_path_iter(path)
            .map_err(|e| HttpError::Config(format!("Failed to load {}: {}", path.display(), e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HttpError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), vars = file_vars.len(), "Loaded validation options file");
        Self::from_vars(file_vars.into_iter().chain(std::env::vars()))
    }

    /// Defaults overridden by matching `(name, value)` pairs; later pairs
    /// win and empty values are ignored. The result is run through
    /// [`check`](Self::check).
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::default();
        for (key, value) in vars {
            let value = value.into();
            if value.trim().is_empty() {
                continue;
            }
            match key.as_ref() {
                ERRORS_VAR => options.errors_attribute = value,
                HAS_ERRORS_VAR => options.has_errors_attribute = value,
                VALIDATORS_VAR => options.validators_attribute = value,
                TRANSLATOR_VAR => options.translator_attribute = value,
                _ => {}
            }
        }
        options.check()
    }

    /// Reject empty or clashing attribute names.
    pub fn check(self) -> Result<Self> {
        let names = [
            &self.errors_attribute,
            &self.has_errors_attribute,
            &self.validators_attribute,
            &self.translator_attribute,
        ];
        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(HttpError::Config("attribute names must not be empty".to_string()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[i + 1..].contains(name) {
                return Err(HttpError::Config(format!(
                    "attribute name '{}' is used more than once",
                    name
                )));
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert_eq!(options.errors_attribute, "errors");
        assert_eq!(options.has_errors_attribute, "has_errors");
        assert_eq!(options.validators_attribute, "validators");
        assert_eq!(options.translator_attribute, "translator");
        assert!(options.check().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let options = ValidationOptions::from_json(r#"{"errors_attribute": "validation_errors"}"#).unwrap();
        assert_eq!(options.errors_attribute, "validation_errors");
        assert_eq!(options.translator_attribute, "translator");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            ValidationOptions::from_json("[1, 2]"),
            Err(HttpError::Config(_))
        ));
        assert!(matches!(
            ValidationOptions::from_json(r#"{"errors_attribute": "translator"}"#),
            Err(HttpError::Config(_))
        ));
        assert!(matches!(
            ValidationOptions::from_json(r#"{"has_errors_attribute": " "}"#),
            Err(HttpError::Config(_))
        ));
    }

    #[test]
    fn test_from_vars() {
        let options = ValidationOptions::from_vars([
            ("SIEVE_ERRORS_ATTRIBUTE", "problems"),
            ("SIEVE_TRANSLATOR_ATTRIBUTE", ""),
            ("UNRELATED", "x"),
            ("SIEVE_ERRORS_ATTRIBUTE", "issues"),
        ])
        .unwrap();
        assert_eq!(options.errors_attribute, "issues");
        assert_eq!(options.translator_attribute, "translator");
    }

    #[test]
    fn test_from_vars_rejects_clashing_names() {
        let err = ValidationOptions::from_vars([("SIEVE_ERRORS_ATTRIBUTE", "has_errors")]).unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));

        let err = ValidationOptions::from_vars([
            ("SIEVE_VALIDATORS_ATTRIBUTE", "rules"),
            ("SIEVE_TRANSLATOR_ATTRIBUTE", "rules"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("'rules'"));
    }

    #[test]
    fn test_from_dotenv_rejects_clashing_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SIEVE_HAS_ERRORS_ATTRIBUTE=errors").unwrap();

        let err = ValidationOptions::from_dotenv(file.path()).unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }

    #[test]
    fn test_from_dotenv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SIEVE_VALIDATORS_ATTRIBUTE=rule_tree").unwrap();
        writeln!(file, "SIEVE_HAS_ERRORS_ATTRIBUTE=invalid").unwrap();

        let options = ValidationOptions::from_dotenv(file.path()).unwrap();
        assert_eq!(options.validators_attribute, "rule_tree");
        assert_eq!(options.has_errors_attribute, "invalid");
        assert_eq!(options.errors_attribute, "errors");
    }

    #[test]
    fn test_missing_dotenv_file() {
        let err = ValidationOptions::from_dotenv("/nonexistent/sieve.env").unwrap_err();
        assert!(matches!(err, HttpError::Config(_)));
    }
}
