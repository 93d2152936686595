//! TREC run files.
//!
//! One line per retrieved document:
//!
//! ```text
//! <topic>\tQ0\t<doc id>\t<rank>\t<score>\t<run id>
//! ```
//!
//! Ranks start at 0 and scores carry exactly six decimals.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, XiphosError};
use crate::storage::file::ensure_writable_dir;

/// Format one run line (without the trailing newline).
pub fn format_line(topic: &str, doc_id: &str, rank: usize, score: f64, run_id: &str) -> String {
    format!("{topic}\tQ0\t{doc_id}\t{rank}\t{score:.6}\t{run_id}")
}

/// Path of the run file for `run_id` inside `run_dir`.
pub fn run_path<P: AsRef<Path>>(run_dir: P, run_id: &str) -> PathBuf {
    run_dir.as_ref().join(format!("{run_id}.txt"))
}

/// Writes ranked lists topic by topic.
#[derive(Debug)]
pub struct RunWriter<W: Write> {
    out: W,
    run_id: String,
    topics: usize,
    lines: usize,
}

impl RunWriter<BufWriter<File>> {
    /// Create `<run_dir>/<run_id>.txt`, creating `run_dir` if needed.
    pub fn create<P: AsRef<Path>>(run_dir: P, run_id: &str) -> Result<Self> {
        if run_id.trim().is_empty() {
            return Err(XiphosError::invalid_config("Run identifier must not be empty"));
        }
        ensure_writable_dir(&run_dir)?;
        let path = run_path(&run_dir, run_id);
        let file = File::create(&path).map_err(|e| {
            XiphosError::invalid_config(format!("Cannot create run file {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufWriter::new(file), run_id))
    }
}

impl<W: Write> RunWriter<W> {
    pub fn new(out: W, run_id: &str) -> Self {
        RunWriter {
            out,
            run_id: run_id.to_string(),
            topics: 0,
            lines: 0,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn topics_written(&self) -> usize {
        self.topics
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Write the ranked `(doc id, score)` list of one topic and flush it.
    pub fn write_topic<'a, I>(&mut self, topic: &str, ranked: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut count = 0;
        for (rank, (doc_id, score)) in ranked.into_iter().enumerate() {
            writeln!(
                self.out,
                "{}",
                format_line(topic, doc_id, rank, score, &self.run_id)
            )?;
            count += 1;
        }
        self.out.flush()?;

        self.topics += 1;
        self.lines += count;
        debug!("Wrote {count} line(s) for topic {topic}");
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
