//! Field definitions.
//!
//! Every index has the stored, untokenized `id` field plus a list of body
//! fields. A body field names the document stream it reads from and the
//! analyzer variant that produces its terms.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::analysis::analyzer::variant::{AnalyzerFactory, AnalyzerVariant};
use crate::document::document::{Document, ParsedDocument};
use crate::error::{Result, XiphosError};

/// Name of the identifier field.
pub const ID_FIELD: &str = "id";

/// What a postings entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexGranularity {
    /// Document numbers only; every match counts as frequency 1.
    Docs,
    /// Document numbers and term frequencies.
    DocsAndFreqs,
}

/// Which input stream feeds a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Primary,
    Secondary,
    /// Primary text followed by secondary text.
    Both,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub tokenized: bool,
    pub stored: bool,
    pub granularity: IndexGranularity,
    pub source: FieldSource,
    pub analyzer: AnalyzerVariant,
}

impl FieldDefinition {
    /// A tokenized, unstored body field with term frequencies.
    pub fn text<S: Into<String>>(name: S, analyzer: AnalyzerVariant) -> Self {
        FieldDefinition {
            name: name.into(),
            tokenized: true,
            stored: false,
            granularity: IndexGranularity::DocsAndFreqs,
            source: FieldSource::Primary,
            analyzer,
        }
    }

    /// The identifier field: stored, indexed as one verbatim term.
    pub fn identifier() -> Self {
        FieldDefinition {
            name: ID_FIELD.to_string(),
            tokenized: false,
            stored: true,
            granularity: IndexGranularity::Docs,
            source: FieldSource::Primary,
            analyzer: AnalyzerVariant::Keyword,
        }
    }

    pub fn with_source(mut self, source: FieldSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_stored(mut self, stored: bool) -> Self {
        self.stored = stored;
        self
    }

    /// Untokenized fields are analyzed as a single keyword regardless of
    /// the configured variant.
    pub fn effective_analyzer(&self) -> AnalyzerVariant {
        if self.tokenized {
            self.analyzer.clone()
        } else {
            AnalyzerVariant::Keyword
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDefinition>,
}

impl Schema {
    /// Build a schema from body fields. The `id` field is added in front.
    pub fn new(body_fields: Vec<FieldDefinition>) -> Self {
        let mut fields = vec![FieldDefinition::identifier()];
        fields.extend(body_fields.into_iter().filter(|f| f.name != ID_FIELD));
        Schema { fields }
    }

    /// `english_body` (english) and `ngram` (ngram 3) over one stream.
    pub fn single_language() -> Self {
        Schema::new(vec![
            FieldDefinition::text("english_body", AnalyzerVariant::english()),
            FieldDefinition::text("ngram", AnalyzerVariant::ngram(3)),
        ])
    }

    /// English from the primary stream, French from the secondary stream
    /// and 4-grams over both.
    pub fn multilingual() -> Self {
        Schema::new(vec![
            FieldDefinition::text("english_body", AnalyzerVariant::english()),
            FieldDefinition::text("french_body", AnalyzerVariant::french())
                .with_source(FieldSource::Secondary),
            FieldDefinition::text("ngram", AnalyzerVariant::ngram(4))
                .with_source(FieldSource::Both),
        ])
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fields other than `id` that are stored.
    pub fn stored_body_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.stored && f.name != ID_FIELD)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// True if any field reads the secondary stream.
    pub fn needs_secondary(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f.source, FieldSource::Secondary | FieldSource::Both))
    }

    /// Check field names and whether the schema fits the input mode.
    pub fn validate(&self, paired: bool) -> Result<()> {
        if self.fields.len() < 2 {
            return Err(XiphosError::invalid_config(
                "Schema must define at least one body field",
            ));
        }

        let mut seen = AHashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(XiphosError::invalid_config("Field name must not be empty"));
            }
            if field.name.contains(['\t', '\n', ',']) {
                return Err(XiphosError::invalid_config(format!(
                    "Field name {:?} contains a reserved character",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(XiphosError::invalid_config(format!(
                    "Field {} is defined twice",
                    field.name
                )));
            }
        }

        if !paired && self.needs_secondary() {
            return Err(XiphosError::invalid_config(
                "Schema reads a secondary stream but no secondary corpus is configured",
            ));
        }
        Ok(())
    }

    /// Check analyzer parameters and inline file-based resources, so the
    /// schema saved with the index is self-contained.
    pub fn resolve(&self) -> Result<Schema> {
        let fields = self
            .fields
            .iter()
            .map(|field| {
                Ok(FieldDefinition {
                    analyzer: field.analyzer.resolve()?,
                    ..field.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema { fields })
    }

    /// One analyzer per field, sharing stopword sets between fields.
    pub fn build_analyzers(&self) -> Result<PerFieldAnalyzer> {
        let mut factory = AnalyzerFactory::new();
        let mut analyzers = PerFieldAnalyzer::new();
        for field in &self.fields {
            analyzers.add_analyzer(field.name.clone(), factory.build(&field.effective_analyzer())?);
        }
        Ok(analyzers)
    }

    /// Assemble the record to index from one or two parsed documents.
    ///
    /// Identifiers must already have been checked for equality by the
    /// caller when `secondary` is given.
    pub fn assemble(
        &self,
        primary: ParsedDocument,
        secondary: Option<ParsedDocument>,
    ) -> Result<Document> {
        let mut document = Document::new(primary.id.clone());
        for field in &self.fields {
            if field.name == ID_FIELD {
                document.add_field(ID_FIELD, primary.id.clone());
                continue;
            }
            let text = match (field.source, secondary.as_ref()) {
                (FieldSource::Primary, _) => primary.contents.clone(),
                (FieldSource::Secondary, Some(secondary)) => secondary.contents.clone(),
                (FieldSource::Both, Some(secondary)) => {
                    format!("{}\n{}", primary.contents, secondary.contents)
                }
                (FieldSource::Both, None) => primary.contents.clone(),
                (FieldSource::Secondary, None) => {
                    return Err(XiphosError::index(format!(
                        "Field {} needs a secondary document for {}",
                        field.name, primary.id
                    )));
                }
            };
            document.add_field(field.name.clone(), text);
        }
        Ok(document)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::single_language()
    }
}
