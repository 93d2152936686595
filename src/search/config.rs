//! Search-run configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};
use crate::search::bm25::Bm25Params;

/// Field selections used by the evaluated run configurations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldPreset {
    /// `english_body`
    En,
    /// `english_body`, `ngram`
    EnNgram,
    /// `english_body`, `french_body`, `ngram`
    EnFrNgram,
}

impl FieldPreset {
    pub fn fields(&self) -> Vec<String> {
        let names: &[&str] = match self {
            FieldPreset::En => &["english_body"],
            FieldPreset::EnNgram => &["english_body", "ngram"],
            FieldPreset::EnFrNgram => &["english_body", "french_body", "ngram"],
        };
        names.iter().map(|name| name.to_string()).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPreset::En => "en",
            FieldPreset::EnNgram => "en-ngram",
            FieldPreset::EnFrNgram => "en-fr-ngram",
        }
    }
}

impl fmt::Display for FieldPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPreset {
    type Err = XiphosError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(FieldPreset::En),
            "en-ngram" => Ok(FieldPreset::EnNgram),
            "en-fr-ngram" => Ok(FieldPreset::EnFrNgram),
            other => Err(XiphosError::invalid_config(format!(
                "Unknown field preset {other:?} (expected en, en-ngram or en-fr-ngram)"
            ))),
        }
    }
}

/// Configuration of one search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Committed index to search.
    pub index_dir: PathBuf,

    /// Topic XML file.
    pub topics_path: PathBuf,

    /// Directory receiving `<run_id>.txt`; created if absent.
    pub run_dir: PathBuf,

    pub run_id: String,

    /// Depth of every ranked list.
    pub max_docs_retrieved: usize,

    /// Expected number of topics. A mismatch only logs a warning.
    pub expected_topics: Option<usize>,

    /// Fields searched by every topic.
    pub fields: Vec<String>,

    /// Overrides the parameters recorded in the index.
    pub bm25: Option<Bm25Params>,

    /// Worker threads for topic evaluation. `None` uses the global pool.
    pub threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            index_dir: PathBuf::from("index"),
            topics_path: PathBuf::from("topics.xml"),
            run_dir: PathBuf::from("runs"),
            run_id: String::new(),
            max_docs_retrieved: 1000,
            expected_topics: None,
            fields: FieldPreset::EnNgram.fields(),
            bm25: None,
            threads: None,
        }
    }
}

impl SearchConfig {
    pub fn new<P, Q, R>(index_dir: P, topics_path: Q, run_dir: R, run_id: &str) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        SearchConfig {
            index_dir: index_dir.into(),
            topics_path: topics_path.into(),
            run_dir: run_dir.into(),
            run_id: run_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_preset(mut self, preset: FieldPreset) -> Self {
        self.fields = preset.fields();
        self
    }

    /// Check every run parameter. Performs no I/O.
    pub fn validate(&self) -> Result<()> {
        if self.run_id.trim().is_empty() {
            return Err(XiphosError::invalid_config("Run identifier must not be empty"));
        }
        if self.run_id.contains(['/', '\\']) {
            return Err(XiphosError::invalid_config(format!(
                "Run identifier {:?} must not contain path separators",
                self.run_id
            )));
        }
        if self.max_docs_retrieved == 0 {
            return Err(XiphosError::invalid_config(
                "Maximum documents retrieved must be greater than zero",
            ));
        }
        if self.fields.is_empty() {
            return Err(XiphosError::invalid_config("At least one search field is required"));
        }
        if self.threads == Some(0) {
            return Err(XiphosError::invalid_config("Thread count must be greater than zero"));
        }
        if let Some(bm25) = &self.bm25 {
            bm25.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig::new("index", "topics.xml", "runs", "run1")
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.max_docs_retrieved, 1000);
        assert_eq!(config.fields, vec!["english_body", "ngram"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        for preset in [FieldPreset::En, FieldPreset::EnNgram, FieldPreset::EnFrNgram] {
            assert_eq!(preset.as_str().parse::<FieldPreset>().unwrap(), preset);
        }
        assert_eq!(
            config().with_preset(FieldPreset::EnFrNgram).fields,
            vec!["english_body", "french_body", "ngram"]
        );
        assert!("fr".parse::<FieldPreset>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut bad = config();
        bad.run_id = String::new();
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.run_id = "a/b".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.max_docs_retrieved = 0;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.fields.clear();
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.threads = Some(0);
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.bm25 = Some(Bm25Params { k1: 1.2, b: 1.5 });
        assert!(bad.validate().is_err());
    }
}
