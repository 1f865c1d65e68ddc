//! Message sinks

use std::io::{self, Write};

use crate::schema::Message;

/// Accepts one normalized message at a time.
pub trait MessageSink {
    /// Hook for container formats that need a header; no-op by default.
    fn write_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write(&mut self, msg: &Message) -> io::Result<()>;
}

/// Writes one compact JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> MessageSink for JsonLinesSink<W> {
    fn write(&mut self, msg: &Message) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, &msg.to_json())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub messages: Vec<Message>,
}

impl MessageSink for VecSink {
    fn write(&mut self, msg: &Message) -> io::Result<()> {
        self.messages.push(msg.clone());
        Ok(())
    }
}
