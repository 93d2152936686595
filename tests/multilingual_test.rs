//! Paired English/French corpora combined record by record.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use xiphos::error::{Result, XiphosError};
use xiphos::index::meta::META_FILE;
use xiphos::index::{IndexConfig, IndexReader, build_index};
use xiphos::search::{FieldPreset, SearchConfig, search_topics};

const ENGLISH: &str = r#"[
  {"id": "d1", "contents": "The cat sleeps on the sofa"},
  {"id": "d2", "contents": "A dog barks at night"}
]"#;

const FRENCH: &str = r#"[
  {"id": "d1", "contents": "Le chat dort sur le canapé"},
  {"id": "d2", "contents": "Un chien aboie la nuit"}
]"#;

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), content)?;
    Ok(())
}

fn paired_config(root: &Path) -> IndexConfig {
    IndexConfig {
        secondary_docs_dir: Some(root.join("fr")),
        ..IndexConfig::new(root.join("index"), root.join("en"))
    }
}

fn setup(french: &str) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_path_buf();
    write(&root.join("en"), "corpus.json", ENGLISH)?;
    write(&root.join("fr"), "corpus.json", french)?;
    Ok((temp_dir, root))
}

#[test]
fn test_paired_build() -> Result<()> {
    let (_temp_dir, root) = setup(FRENCH)?;

    let stats = build_index(&paired_config(&root))?;
    assert_eq!(stats.docs_added, 2);

    let reader = IndexReader::open(root.join("index"))?;
    assert_eq!(reader.doc_count(), 2);
    assert_eq!(reader.identifier(1), Some("d2"));

    let french = reader.field("french_body")?;
    assert_eq!(french.doc_freq("chat"), 1);
    assert_eq!(french.doc_freq("cat"), 0);

    let english = reader.field("english_body")?;
    assert_eq!(english.doc_freq("cat"), 1);
    assert_eq!(english.doc_freq("chat"), 0);

    // The n-gram field sees both languages.
    let ngram = reader.field("ngram")?;
    assert_eq!(ngram.doc_freq("chat"), 1);
    assert_eq!(ngram.doc_freq("barks"), 0);
    assert_eq!(ngram.doc_freq("bark"), 1);
    Ok(())
}

#[test]
fn test_paired_search() -> Result<()> {
    let (_temp_dir, root) = setup(FRENCH)?;
    build_index(&paired_config(&root))?;
    fs::write(
        root.join("topics.xml"),
        "<top><num>101</num><title>chien</title></top>",
    )?;

    let config = SearchConfig::new(
        root.join("index"),
        root.join("topics.xml"),
        root.join("runs"),
        "fr-run",
    )
    .with_preset(FieldPreset::EnFrNgram);
    let summary = search_topics(&config)?;

    let run = fs::read_to_string(summary.run_path)?;
    let lines: Vec<&str> = run.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("101\tQ0\td2\t0\t"));
    assert!(lines[0].ends_with("\tfr-run"));
    Ok(())
}

#[test]
fn test_identifier_mismatch_is_fatal() -> Result<()> {
    let (_temp_dir, root) = setup(
        r#"[{"id": "d1", "contents": "Le chat"}, {"id": "d3", "contents": "Un chien"}]"#,
    )?;

    match build_index(&paired_config(&root)) {
        Err(XiphosError::Consistency(_)) => {}
        other => panic!("expected consistency error, got {other:?}"),
    }
    assert!(!root.join("index").join(META_FILE).exists());
    Ok(())
}

#[test]
fn test_unequal_lengths_are_fatal() -> Result<()> {
    let (_temp_dir, root) = setup(r#"[{"id": "d1", "contents": "Le chat"}]"#)?;

    assert!(matches!(
        build_index(&paired_config(&root)),
        Err(XiphosError::Consistency(_))
    ));
    assert!(!root.join("index").join(META_FILE).exists());
    Ok(())
}
