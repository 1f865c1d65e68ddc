//! Field and message-type registries
//!
//! A `Registry` is an immutable value. The canonical tables are built once
//! per process behind `Registry::current()`; extending the schema means
//! building a new registry with `RegistryBuilder`, never mutating the shared
//! one.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::errors::{SchemaError, SchemaResult};
use super::fields::current_fields;
use super::message_types::current_types;
use super::types::{FieldSpec, MessageTypeSpec};

static CURRENT: OnceLock<Registry> = OnceLock::new();

/// Field registry plus message-type registry
#[derive(Debug, Clone)]
pub struct Registry {
    fields: BTreeMap<String, FieldSpec>,
    types: BTreeMap<i64, MessageTypeSpec>,
}

impl Registry {
    /// The canonical AIS registry.
    pub fn current() -> &'static Registry {
        CURRENT.get_or_init(|| {
            let mut builder = RegistryBuilder::new();
            for (name, spec) in current_fields() {
                builder = builder.field(name, spec);
            }
            for spec in current_types() {
                builder = builder.message_type(spec);
            }
            match builder.build() {
                Ok(registry) => registry,
                // The canonical tables are covered by tests; a failure here
                // is a programming error in fields.rs or message_types.rs.
                Err(e) => panic!("canonical registry is inconsistent: {}", e),
            }
        })
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Starts a builder from this registry's tables.
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            fields: self.fields.clone(),
            types: self.types.clone(),
        }
    }

    /// Looks up a field definition.
    pub fn field_spec(&self, name: &str) -> SchemaResult<&FieldSpec> {
        self.fields
            .get(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }

    /// Looks up a field definition, `None` when unknown.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Looks up a message type.
    pub fn message_type_spec(&self, type_id: i64) -> SchemaResult<&MessageTypeSpec> {
        self.types
            .get(&type_id)
            .ok_or_else(|| SchemaError::unknown_type(type_id))
    }

    pub fn has_type(&self, type_id: i64) -> bool {
        self.types.contains_key(&type_id)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Message types in ascending id order.
    pub fn message_types(&self) -> impl Iterator<Item = &MessageTypeSpec> {
        self.types.values()
    }
}

/// Assembles a `Registry`; `build` checks cross-table consistency.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    fields: BTreeMap<String, FieldSpec>,
    types: BTreeMap<i64, MessageTypeSpec>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field definition.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Adds or replaces a message type.
    pub fn message_type(mut self, spec: MessageTypeSpec) -> Self {
        self.types.insert(spec.type_id, spec);
        self
    }

    /// Verifies that every type's field names exist in the field table.
    pub fn build(self) -> SchemaResult<Registry> {
        if !self.types.is_empty() && !self.fields.contains_key("type") {
            return Err(SchemaError::InvalidRegistry(
                "field table must define 'type'".into(),
            ));
        }
        for spec in self.types.values() {
            if let Some(missing) = spec
                .field_names()
                .iter()
                .find(|name| !self.fields.contains_key(name.as_str()))
            {
                return Err(SchemaError::InvalidRegistry(format!(
                    "message type {} references unknown field '{}'",
                    spec.type_id, missing
                )));
            }
        }
        Ok(Registry {
            fields: self.fields,
            types: self.types,
        })
    }
}
