//! Message sources and sinks
//!
//! The analyzer and engine never perform I/O themselves; they consume
//! already-decoded messages from a [`MessageSource`] and hand normalized
//! messages to a [`MessageSink`].

mod errors;
mod sink;
mod source;

pub use errors::{SourceError, SourceResult};
pub use sink::{JsonLinesSink, MessageSink, VecSink};
pub use source::{open_json_lines, JsonLinesSource, MessageSource, VecSource};
