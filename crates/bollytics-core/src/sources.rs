use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Community name exactly as the upstream API spells it, e.g. `"MalayalamMovies"`.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// The validated set of tracked sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    names: Vec<String>,
}

impl Sources {
    /// Build a registry from already-validated names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the names are empty, malformed,
    /// or duplicated.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let file = SourcesFile {
            sources: names
                .into_iter()
                .map(|n| SourceConfig { name: n.into() })
                .collect(),
        };
        validate_sources(&file)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: SourcesFile) -> Self {
        Self {
            names: file.sources.into_iter().map(|s| s.name).collect(),
        }
    }

    /// Resolve a caller-supplied source name. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownSource`] if the name is not tracked.
    pub fn resolve(&self, raw: &str) -> Result<&str, ValidationError> {
        self.names
            .iter()
            .find(|n| n.as_str() == raw)
            .map(String::as_str)
            .ok_or_else(|| ValidationError::UnknownSource(raw.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Load and validate the tracked sources from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<Sources, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: SourcesFile = serde_yaml::from_str(&content)?;
    validate_sources(&file)?;

    Ok(Sources::from_file(file))
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    if file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in &file.sources {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if name != source.name
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "source '{}' may only contain ASCII letters, digits, and '_'",
                source.name
            )));
        }

        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source: '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(yaml: &str) -> Result<Sources, ConfigError> {
        let file: SourcesFile = serde_yaml::from_str(yaml)?;
        validate_sources(&file)?;
        Ok(Sources::from_file(file))
    }

    #[test]
    fn parses_valid_sources() {
        let sources = parse("sources:\n  - name: kollywood\n  - name: MalayalamMovies\n").unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(
            sources.names().collect::<Vec<_>>(),
            vec!["kollywood", "MalayalamMovies"]
        );
    }

    #[test]
    fn rejects_empty_list() {
        let err = parse("sources: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_case_insensitive_duplicates() {
        let err = parse("sources:\n  - name: bollywood\n  - name: Bollywood\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_names_with_path_characters() {
        let err = parse("sources:\n  - name: \"../etc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn resolve_is_exact() {
        let sources = Sources::new(["kollywood", "MalayalamMovies"]).unwrap();
        assert_eq!(sources.resolve("kollywood").unwrap(), "kollywood");
        assert_eq!(
            sources.resolve("malayalammovies").unwrap_err(),
            ValidationError::UnknownSource("malayalammovies".to_string())
        );
    }

    #[test]
    fn shipped_sources_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/sources.yaml");
        let sources = load_sources(&path).expect("config/sources.yaml should load");
        assert!(sources.resolve("kollywood").is_ok());
        assert_eq!(sources.len(), 4);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_sources(Path::new("/nonexistent/sources.yaml")).unwrap_err();
        assert!(
            matches!(err, ConfigError::SourcesFileIo { ref path, .. } if path.contains("nonexistent"))
        );
    }
}
