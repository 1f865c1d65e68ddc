//! aiscorpus - schema engine and streaming corpus analyzer for decoded
//! AIS/GPS messages

pub mod analyzer;
pub mod cli;
pub mod io;
pub mod observability;
pub mod schema;
