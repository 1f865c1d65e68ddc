//! Source and sink error types

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error{}: {source}", in_source(.name))]
    Io {
        name: Option<String>,
        #[source]
        source: io::Error,
    },

    #[error("undecodable record{}: {reason}", at_line(.name, .line))]
    Decode {
        name: Option<String>,
        line: usize,
        reason: String,
    },

    #[error("scan of {name} panicked")]
    Panicked { name: String },
}

fn in_source(name: &Option<String>) -> String {
    name.as_ref().map(|n| format!(" in {}", n)).unwrap_or_default()
}

fn at_line(name: &Option<String>, line: &usize) -> String {
    match name {
        Some(name) => format!(" at {}:{}", name, line),
        None => format!(" at line {}", line),
    }
}

impl SourceError {
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::Io { .. } => "AIS_SOURCE_IO",
            SourceError::Decode { .. } => "AIS_SOURCE_DECODE",
            SourceError::Panicked { .. } => "AIS_SOURCE_PANICKED",
        }
    }

    /// Whether the source can keep yielding records after this error
    pub fn is_record_level(&self) -> bool {
        matches!(self, SourceError::Decode { .. })
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
