//! Weaver configuration.
//!
//! Loaded from TOML (default location `<config_dir>/weaver/config.toml`).
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [engine]
//! max_steps = 25
//!
//! [researcher]
//! max_results = 4
//!
//! [coder]
//! extension = "py"
//!
//! [[knowledge]]
//! id = "doc-team-style"
//! kind = "doc"
//! text = "Team style guide: functions validate their input first."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::error::{Result, WeaverError};
use crate::lookup::{KnowledgeEntry, StaticKnowledgeBase};
use crate::worker::{coder, researcher};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineSection {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResearcherSection {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ResearcherSection {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CoderSection {
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CoderSection {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaverConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub researcher: ResearcherSection,
    #[serde(default)]
    pub coder: CoderSection,
    /// Extra entries appended to the built-in knowledge base.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge: Vec<KnowledgeEntry>,
}

fn default_max_steps() -> usize {
    EngineConfig::DEFAULT_MAX_STEPS
}

fn default_max_results() -> usize {
    researcher::DEFAULT_MAX_RESULTS
}

fn default_extension() -> String {
    coder::DEFAULT_EXTENSION.to_string()
}

impl WeaverConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Loads `path` if given, otherwise the default location. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// `<config_dir>/weaver/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weaver").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.max_steps == 0 {
            return Err(WeaverError::config("engine.max_steps must be at least 1"));
        }
        if self.researcher.max_results == 0 {
            return Err(WeaverError::config(
                "researcher.max_results must be at least 1",
            ));
        }
        if self.coder.extension.trim_start_matches('.').is_empty() {
            return Err(WeaverError::config("coder.extension must not be empty"));
        }
        if let Some(entry) = self.knowledge.iter().find(|entry| entry.id.trim().is_empty()) {
            return Err(WeaverError::config(format!(
                "knowledge entry with text '{}' has an empty id",
                entry.text
            )));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::new(self.engine.max_steps)
    }

    /// Built-in entries plus any configured `[[knowledge]]` entries.
    pub fn knowledge_base(&self) -> StaticKnowledgeBase {
        let mut kb = StaticKnowledgeBase::with_defaults();
        for entry in &self.knowledge {
            kb.insert(entry.clone());
        }
        kb
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ResultKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = WeaverConfig::from_toml("").unwrap();
        assert_eq!(config, WeaverConfig::default());
        assert_eq!(config.engine.max_steps, EngineConfig::DEFAULT_MAX_STEPS);
        assert_eq!(config.coder.extension, "py");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = WeaverConfig::from_toml("[engine]\nmax_steps = 5\n").unwrap();
        assert_eq!(config.engine_config().unwrap().max_steps(), 5);
        assert_eq!(config.researcher.max_results, 4);
    }

    #[test]
    fn test_zero_max_steps_is_rejected() {
        let err = WeaverConfig::from_toml("[engine]\nmax_steps = 0\n").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_toml_is_a_serialization_error() {
        let err = WeaverConfig::from_toml("[engine\n").unwrap_err();
        assert!(matches!(err, WeaverError::Serialization { .. }));
    }

    #[test]
    fn test_load_from_file_with_knowledge() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[coder]
extension = "rs"

[[knowledge]]
id = "doc-team-style"
kind = "doc"
text = "Team style guide: functions validate their input first."
"#
        )
        .unwrap();

        let config = WeaverConfig::load(file.path()).unwrap();
        assert_eq!(config.coder.extension, "rs");
        assert_eq!(config.knowledge.len(), 1);
        assert_eq!(config.knowledge[0].kind, ResultKind::Doc);

        let kb = config.knowledge_base();
        assert_eq!(kb.len(), StaticKnowledgeBase::with_defaults().len() + 1);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WeaverConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, WeaverError::Io { .. }));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = WeaverConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("max_steps = 25"));
        assert_eq!(WeaverConfig::from_toml(&rendered).unwrap(), config);
    }
}
