//! Query planning.
//!
//! A topic title is analyzed once per selected field, with the analyzer
//! rebuilt from that field's index-time configuration. Each field becomes a
//! disjunction of its terms and the field clauses are OR-ed together.

use std::fmt;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::{Result, XiphosError};
use crate::index::posting::term_frequencies;
use crate::index::reader::IndexReader;

/// Analyzed terms of one field, in query order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldTerms {
    pub field: String,
    pub terms: Vec<String>,
}

/// A weighted query term. Repeated query terms add up to one weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryTerm {
    pub term: String,
    pub weight: u32,
}

/// Disjunction over the terms of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldQuery {
    pub field: String,
    pub terms: Vec<QueryTerm>,
}

/// Top-level OR of field clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub clauses: Vec<FieldQuery>,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.clauses.iter().all(|clause| clause.terms.is_empty())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let terms: Vec<String> = clause
                    .terms
                    .iter()
                    .map(|t| match t.weight {
                        1 => format!("{}:{}", clause.field, t.term),
                        w => format!("{}:{}^{w}", clause.field, t.term),
                    })
                    .collect();
                format!("({})", terms.join(" OR "))
            })
            .collect();
        write!(f, "{}", clauses.join(" OR "))
    }
}

/// Builds queries for a fixed field selection.
pub struct QueryPlanner {
    analyzers: PerFieldAnalyzer,
    fields: Vec<String>,
}

impl QueryPlanner {
    /// Planner over `fields` of `reader`. Every field must exist and be
    /// tokenized.
    pub fn new(reader: &IndexReader, fields: &[String]) -> Result<Self> {
        if fields.is_empty() {
            return Err(XiphosError::invalid_config("At least one search field is required"));
        }
        for name in fields {
            let field = reader.field(name)?;
            if !field.definition().tokenized {
                return Err(XiphosError::invalid_config(format!(
                    "Field {name} is not tokenized and cannot be searched with free text"
                )));
            }
        }
        Ok(QueryPlanner {
            analyzers: reader.analyzers()?,
            fields: fields.to_vec(),
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Analyze a topic title for every selected field.
    pub fn analyze_topic(&self, title: &str) -> Result<Vec<FieldTerms>> {
        self.fields
            .iter()
            .map(|field| {
                Ok(FieldTerms {
                    field: field.clone(),
                    terms: self.analyzers.get_analyzer(field)?.terms(title)?,
                })
            })
            .collect()
    }

    /// Combine analyzed field terms into one query. Fields that produced no
    /// terms contribute no clause.
    pub fn plan(&self, analyzed: Vec<FieldTerms>) -> Query {
        let clauses = analyzed
            .into_iter()
            .filter(|field| !field.terms.is_empty())
            .map(|field| FieldQuery {
                field: field.field,
                terms: term_frequencies(field.terms)
                    .into_iter()
                    .map(|(term, weight)| QueryTerm { term, weight })
                    .collect(),
            })
            .collect();
        Query { clauses }
    }

    /// Analyze and plan in one step.
    pub fn query(&self, title: &str) -> Result<Query> {
        Ok(self.plan(self.analyze_topic(title)?))
    }
}

impl fmt::Debug for QueryPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlanner")
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::document::document::ParsedDocument;
    use crate::index::builder::IndexBuilder;
    use crate::index::config::IndexConfig;
    use crate::storage::memory::MemoryStorage;

    fn reader() -> IndexReader {
        let storage = Arc::new(MemoryStorage::new());
        let config = IndexConfig {
            background_flush: false,
            ..Default::default()
        };
        let mut builder = IndexBuilder::with_storage(config, storage.clone()).unwrap();
        builder.add_parsed(ParsedDocument::new("d1", "cats and dogs")).unwrap();
        builder.commit().unwrap();
        IndexReader::open_storage(storage.as_ref()).unwrap()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_analyze_topic_per_field() {
        let planner = QueryPlanner::new(&reader(), &fields(&["english_body", "ngram"])).unwrap();
        let analyzed = planner.analyze_topic("The Cats!").unwrap();

        assert_eq!(analyzed[0].field, "english_body");
        assert_eq!(analyzed[0].terms, vec!["cats"]);
        assert_eq!(analyzed[1].field, "ngram");
        assert_eq!(analyzed[1].terms, vec!["the", "cat", "ats"]);
    }

    #[test]
    fn test_plan_merges_repeated_terms() {
        let planner = QueryPlanner::new(&reader(), &fields(&["english_body"])).unwrap();
        let query = planner.query("fox fox dog").unwrap();

        assert_eq!(query.clauses.len(), 1);
        assert_eq!(
            query.clauses[0].terms,
            vec![
                QueryTerm {
                    term: "fox".to_string(),
                    weight: 2
                },
                QueryTerm {
                    term: "dog".to_string(),
                    weight: 1
                },
            ]
        );
        assert_eq!(query.to_string(), "(english_body:fox^2 OR english_body:dog)");
    }

    #[test]
    fn test_stopword_only_topic_is_empty() {
        let planner = QueryPlanner::new(&reader(), &fields(&["english_body"])).unwrap();
        let query = planner.query("the and of").unwrap();
        assert!(query.is_empty());
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn test_unknown_or_untokenized_field() {
        let reader = reader();
        assert!(QueryPlanner::new(&reader, &fields(&["french_body"])).is_err());
        assert!(QueryPlanner::new(&reader, &fields(&["id"])).is_err());
        assert!(QueryPlanner::new(&reader, &[]).is_err());
    }
}
