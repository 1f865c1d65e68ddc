//! Schema subsystem for AIS/GPS messages
//!
//! A field registry (per-field kind, domain, default, coercion) and a
//! message-type registry (per-type field sets) drive the `SchemaEngine`.
//!
//! # Design Principles
//!
//! - Registries are immutable values built once per process
//! - Domain constraints are inspectable data, not opaque closures
//! - Exact kind matching, with two named relaxations (int for float,
//!   narrow for wide strings)
//! - Coercion failures raise unless quarantine is requested
//! - Validation failures never raise; they quarantine the field

pub mod coerce;
mod engine;
mod errors;
mod fields;
mod message_types;
mod registry;
mod types;
mod value;

pub use coerce::{NULL_SENTINEL, TIMESTAMP_FORMAT};
pub use engine::{check_value, SchemaEngine};
pub use errors::{SchemaError, SchemaResult, Severity};
pub use registry::{Registry, RegistryBuilder};
pub use types::{Coercion, Domain, FieldSpec, MessageTypeSpec, ValueKind};
pub use value::{Message, Quarantine, Reason, Rejection, Value, MISSING_FIELDS_KEY, QUARANTINE_KEY};
