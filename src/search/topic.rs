//! Topic files.
//!
//! Topics are `<top>` elements holding a `<num>` and a `<title>`:
//!
//! ```xml
//! <top><num>q062</num><title>car shelter</title></top>
//! <top><num>q063</num><title>cheap flights</title></top>
//! ```
//!
//! The file is read as a flat stream of `<top>` elements, so files made of
//! several concatenated root fragments (or with no root at all) are
//! accepted. Other elements inside `<top>` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashSet;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::error::{Result, XiphosError};

/// A numbered query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub num: String,
    pub title: String,
}

impl Topic {
    pub fn new<N: Into<String>, T: Into<String>>(num: N, title: T) -> Self {
        Topic {
            num: num.into(),
            title: title.into(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Capture {
    None,
    Num,
    Title,
}

/// Streaming reader of `<top>` elements.
pub struct TopicReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
    source: String,
}

impl TopicReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            XiphosError::invalid_config(format!(
                "Unable to open topic file {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::from_reader(
            BufReader::new(file),
            &path.display().to_string(),
        ))
    }
}

impl<R: BufRead> TopicReader<R> {
    pub fn from_reader(reader: R, source: &str) -> Self {
        TopicReader {
            reader: Reader::from_reader(reader),
            buffer: Vec::new(),
            source: source.to_string(),
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> XiphosError {
        XiphosError::xml(format!(
            "{} at byte {}: {message}",
            self.source,
            self.reader.buffer_position()
        ))
    }

    /// The next topic, or `None` at the end of the input.
    pub fn next_topic(&mut self) -> Result<Option<Topic>> {
        let mut in_top = false;
        let mut capture = Capture::None;
        let mut num: Option<String> = None;
        let mut title: Option<String> = None;
        let mut text = String::new();

        loop {
            self.buffer.clear();
            let result = self
                .reader
                .read_event_into(&mut self.buffer)
                .map(Event::into_owned);
            let event = match result {
                Ok(event) => event,
                Err(e) => return Err(self.error(e)),
            };

            match event {
                Event::Start(start) => match start.name().as_ref() {
                    b"top" if in_top => return Err(self.error("nested <top>")),
                    b"top" => in_top = true,
                    b"num" if in_top => {
                        capture = Capture::Num;
                        text.clear();
                    }
                    b"title" if in_top => {
                        capture = Capture::Title;
                        text.clear();
                    }
                    _ => {}
                },
                Event::Text(content) if capture != Capture::None => {
                    let unescaped = content.unescape().map_err(|e| self.error(e))?;
                    text.push_str(&unescaped);
                }
                Event::CData(content) if capture != Capture::None => {
                    let raw = content.into_inner();
                    text.push_str(&String::from_utf8_lossy(&raw));
                }
                Event::End(end) => match end.name().as_ref() {
                    b"num" if capture == Capture::Num => {
                        num = Some(text.trim().to_string());
                        capture = Capture::None;
                    }
                    b"title" if capture == Capture::Title => {
                        title = Some(text.trim().to_string());
                        capture = Capture::None;
                    }
                    b"top" if in_top => {
                        let num = num
                            .take()
                            .filter(|n| !n.is_empty())
                            .ok_or_else(|| self.error("<top> without a <num>"))?;
                        let title = title
                            .take()
                            .ok_or_else(|| self.error(format!("topic {num} has no <title>")))?;
                        return Ok(Some(Topic { num, title }));
                    }
                    _ => {}
                },
                Event::Eof => {
                    if in_top {
                        return Err(self.error("unexpected end of input inside <top>"));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Read every topic, rejecting duplicate numbers.
    pub fn read_all(mut self) -> Result<Vec<Topic>> {
        let mut topics = Vec::new();
        let mut seen = AHashSet::new();
        while let Some(topic) = self.next_topic()? {
            if !seen.insert(topic.num.clone()) {
                return Err(XiphosError::parse(format!(
                    "Duplicate topic number {} in {}",
                    topic.num, self.source
                )));
            }
            topics.push(topic);
        }
        Ok(topics)
    }
}

/// Read all topics of a file.
pub fn read_topics<P: AsRef<Path>>(path: P) -> Result<Vec<Topic>> {
    TopicReader::open(path)?.read_all()
}
