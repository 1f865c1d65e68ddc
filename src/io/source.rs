//! Message sources
//!
//! A source is a finite, ordered sequence of raw messages. It may be
//! reopened but not rewound mid-stream. Its optional name (usually a path)
//! is only used for the `mmsi=<value>` declaration heuristic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value as JsonValue;

use super::errors::{SourceError, SourceResult};
use crate::schema::Message;

/// Anything that yields raw messages in order.
pub trait MessageSource: Iterator<Item = SourceResult<Message>> {
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Newline-delimited JSON objects. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    name: Option<String>,
    line_no: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            name: None,
            line_no: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Line number of the record read last (1-based).
    pub fn line(&self) -> usize {
        self.line_no
    }

    fn decode(&self, line: &str) -> SourceResult<Message> {
        let json: JsonValue = serde_json::from_str(line).map_err(|e| self.decode_error(e.to_string()))?;
        Message::from_json(json).ok_or_else(|| self.decode_error("record is not a JSON object".into()))
    }

    fn decode_error(&self, reason: String) -> SourceError {
        SourceError::Decode {
            name: self.name.clone(),
            line: self.line_no,
            reason,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = SourceResult<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_no += 1;
                    // a line that is not UTF-8 is a bad record, not a bad stream
                    let text = match std::str::from_utf8(&self.buf) {
                        Ok(text) => text,
                        Err(e) => return Some(Err(self.decode_error(format!("invalid UTF-8: {}", e)))),
                    };
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(self.decode(line));
                }
                Err(source) => {
                    // An I/O failure ends the stream.
                    self.done = true;
                    return Some(Err(SourceError::Io {
                        name: self.name.clone(),
                        source,
                    }));
                }
            }
        }
        None
    }
}

impl<R: BufRead> MessageSource for JsonLinesSource<R> {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Opens a JSON-lines file, naming the source after its path.
pub fn open_json_lines(path: &Path) -> SourceResult<JsonLinesSource<BufReader<File>>> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| SourceError::Io {
        name: Some(name.clone()),
        source,
    })?;
    Ok(JsonLinesSource::new(BufReader::new(file)).with_name(name))
}

/// In-memory source, mostly for tests and embedding.
pub struct VecSource {
    name: Option<String>,
    items: std::vec::IntoIter<SourceResult<Message>>,
}

impl VecSource {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            name: None,
            items: messages.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
        }
    }

    /// Source whose items may include read failures.
    pub fn from_results(items: Vec<SourceResult<Message>>) -> Self {
        Self {
            name: None,
            items: items.into_iter(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Iterator for VecSource {
    type Item = SourceResult<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl MessageSource for VecSource {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
