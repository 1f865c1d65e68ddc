//! Schema engine
//!
//! Default construction, completion, stripping, import/export coercion and
//! validation of messages against a `Registry`.
//!
//! Semantics:
//! - Every operation is a function of its inputs and the registry
//! - Coercion failures raise unless the caller asks for quarantine
//! - Validation failures never raise; failing fields are removed and,
//!   when asked, recorded in the message quarantine
//! - Unknown message types raise for operations that need the type's field set

use std::collections::BTreeMap;

use tracing::trace;

use super::coerce;
use super::errors::{SchemaError, SchemaResult};
use super::registry::Registry;
use super::types::{FieldSpec, MessageTypeSpec};
use super::value::{Message, Reason, Rejection, Value};
use crate::observability::Event;

/// Checks one value against its field spec: nullability, kind, then domain.
pub fn check_value(spec: &FieldSpec, value: &Value) -> Result<(), Reason> {
    if value.is_null() {
        return if spec.nullable {
            Ok(())
        } else {
            Err(Reason::Null)
        };
    }
    if !spec.kind.accepts(value) {
        return Err(Reason::Type {
            expected: spec.kind.expected_tag(),
        });
    }
    match &spec.domain {
        Some(domain) if !domain.test(value) => Err(Reason::Domain),
        _ => Ok(()),
    }
}

/// Schema engine bound to a registry.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEngine<'r> {
    registry: &'r Registry,
}

impl SchemaEngine<'static> {
    /// Engine over the canonical registry.
    pub fn current() -> Self {
        Self::new(Registry::current())
    }
}

impl<'r> SchemaEngine<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolves the message's `type` field to its registered spec.
    pub fn message_type_of(&self, msg: &Message) -> SchemaResult<&'r MessageTypeSpec> {
        let raw = msg.message_type().ok_or(SchemaError::MissingMessageType)?;
        let type_id = raw.as_i64().ok_or_else(|| SchemaError::unknown_type(raw))?;
        self.registry.message_type_spec(type_id)
    }

    /// Builds a message holding every defaulted field of `type_id`.
    ///
    /// With `include_optional = false` only required fields are included.
    /// `type` is always set.
    pub fn default_message(&self, type_id: i64, include_optional: bool) -> SchemaResult<Message> {
        let spec = self.registry.message_type_spec(type_id)?;
        let mut msg = Message::new();
        for name in spec.field_names() {
            let Some(field) = self.registry.field(name) else {
                continue;
            };
            if let Some(default) = &field.default {
                if include_optional || field.required {
                    msg.insert(name.clone(), default.clone());
                }
            }
        }
        msg.insert("type", Value::Int(type_id));
        Ok(msg)
    }

    /// Names of the fields `type_id` requires, sorted.
    pub fn required_fields(&self, type_id: i64) -> SchemaResult<Vec<String>> {
        Ok(self
            .default_message(type_id, false)?
            .field_names()
            .map(str::to_string)
            .collect())
    }

    /// Overlays `msg` on the full default message of its type.
    ///
    /// Fields in `msg` win over defaults; fields outside the type's field
    /// set are preserved. The quarantine is carried over.
    pub fn complete(&self, msg: &Message) -> SchemaResult<Message> {
        let spec = self.message_type_of(msg)?;
        let mut out = self.default_message(spec.type_id, true)?;
        for (name, value) in msg.iter() {
            out.insert(name, value.clone());
        }
        *out.quarantine_mut() = msg.quarantine().clone();
        Ok(out)
    }

    /// Keeps only the fields belonging to the message's type.
    pub fn strip(&self, msg: &Message) -> SchemaResult<Message> {
        let spec = self.message_type_of(msg)?;
        let fields: BTreeMap<String, Value> = msg
            .iter()
            .filter(|(name, _)| spec.contains(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        Ok(Message::from_parts(fields, msg.quarantine().clone()))
    }

    /// Canonical form for re-emission: `strip` then `complete`, or only
    /// `complete` when extraneous fields are kept.
    pub fn normalize(&self, msg: &Message, keep_extraneous: bool) -> SchemaResult<Message> {
        if keep_extraneous {
            self.complete(msg)
        } else {
            self.complete(&self.strip(msg)?)
        }
    }

    /// Converts wire values to typed values.
    ///
    /// Fields with an import function are always converted; with
    /// `force_cast` every other known field is cast to its declared kind.
    /// On failure the call fails with `SchemaError::Coercion`, or with
    /// `skip_failures` the field is moved to the quarantine as
    /// `coercion-failed`.
    pub fn import_values(
        &self,
        msg: Message,
        skip_failures: bool,
        force_cast: bool,
    ) -> SchemaResult<Message> {
        let (fields, mut quarantine) = msg.into_parts();
        let mut out = BTreeMap::new();

        for (name, raw) in fields {
            let Some(spec) = self.registry.field(&name) else {
                out.insert(name, raw);
                continue;
            };
            let result = match spec.coercion {
                Some(coercion) => (coercion.import)(&raw),
                None if force_cast => coerce::cast(spec.kind, &raw),
                None => {
                    out.insert(name, raw);
                    continue;
                }
            };
            match result {
                Ok(value) => {
                    out.insert(name, value);
                }
                Err(cause) if skip_failures => {
                    trace!(event = Event::RowRejected.as_str(), field = %name, %cause, "import failed");
                    quarantine.reject(name, Rejection::new(Reason::CoercionFailed { cause }, raw));
                }
                Err(cause) => return Err(SchemaError::coercion(name, &raw, cause)),
            }
        }

        Ok(Message::from_parts(out, quarantine))
    }

    /// Converts typed values back to wire values.
    ///
    /// A failed export never drops data: with `skip_failures` the value is
    /// stringified and kept in the quarantine as `export-failed`.
    pub fn export_values(&self, msg: Message, skip_failures: bool) -> SchemaResult<Message> {
        let (fields, mut quarantine) = msg.into_parts();
        let mut out = BTreeMap::new();

        for (name, value) in fields {
            let coercion = self.registry.field(&name).and_then(|spec| spec.coercion);
            let Some(coercion) = coercion else {
                out.insert(name, value);
                continue;
            };
            match (coercion.export)(&value) {
                Ok(wire) => {
                    out.insert(name, wire);
                }
                Err(cause) if skip_failures => {
                    trace!(event = Event::RowRejected.as_str(), field = %name, %cause, "export failed");
                    let raw = Value::Text(value.to_string());
                    quarantine.reject(name, Rejection::new(Reason::ExportFailed { cause }, raw));
                }
                Err(cause) => return Err(SchemaError::coercion(name, &value, cause)),
            }
        }

        Ok(Message::from_parts(out, quarantine))
    }

    /// Per-field outcome: the value back when it passes, or a `Rejection`
    /// carrying the reason and the raw value. Unknown fields always pass.
    pub fn check_field(&self, name: &str, value: Value) -> Result<Value, Rejection> {
        match self.registry.field(name) {
            Some(spec) => match check_value(spec, &value) {
                Ok(()) => Ok(value),
                Err(reason) => Err(Rejection::new(reason, value)),
            },
            None => Ok(value),
        }
    }

    /// Validates `msg` in place.
    ///
    /// Every known field is checked; failing fields are removed and, with
    /// `quarantine_in_place`, recorded in the quarantine. Unless
    /// `ignore_missing_required`, the message must carry `type` and every
    /// required field of that type; absent names go to the `missing-fields`
    /// entry.
    ///
    /// Returns `Ok(true)` when nothing failed. Fails only when `type` names
    /// a message type the registry does not know.
    pub fn validate(
        &self,
        msg: &mut Message,
        ignore_missing_required: bool,
        quarantine_in_place: bool,
    ) -> SchemaResult<bool> {
        let registry = self.registry;
        let mut valid = true;

        let (fields, quarantine) = msg.parts_mut();
        fields.retain(|name, value| {
            let Some(spec) = registry.field(name) else {
                return true;
            };
            match check_value(spec, value) {
                Ok(()) => true,
                Err(reason) => {
                    valid = false;
                    if quarantine_in_place {
                        let raw = std::mem::replace(value, Value::Null);
                        quarantine.reject(name.clone(), Rejection::new(reason, raw));
                    }
                    false
                }
            }
        });

        if !ignore_missing_required {
            let missing = self.missing_required(msg)?;
            if !missing.is_empty() {
                valid = false;
                if quarantine_in_place {
                    msg.quarantine_mut().set_missing(missing);
                }
            }
        }

        Ok(valid)
    }

    /// Required field names absent from `msg`; `["type"]` when the type
    /// itself is absent.
    pub fn missing_required(&self, msg: &Message) -> SchemaResult<Vec<String>> {
        let Some(raw) = msg.message_type() else {
            return Ok(vec!["type".to_string()]);
        };
        let type_id = raw.as_i64().ok_or_else(|| SchemaError::unknown_type(raw))?;
        Ok(self
            .required_fields(type_id)?
            .into_iter()
            .filter(|name| !msg.contains(name))
            .collect())
    }
}
