//! Field and message-type definitions
//!
//! Supported value kinds:
//! - int: 64-bit signed integer
//! - float: 64-bit floating point (accepts int on the wire)
//! - bool: Boolean
//! - text: string (accepts wide or narrow strings on the wire)
//! - timestamp: UTC calendar timestamp
//! - list: list of opaque values
//! - any: no type constraint

use std::fmt;

use super::value::Value;

/// Declared kind of a field's decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
    List,
    Any,
}

impl ValueKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
            ValueKind::Timestamp => "timestamp",
            ValueKind::List => "list",
            ValueKind::Any => "any",
        }
    }

    /// Wire types accepted for this kind, as used in rejection tags.
    ///
    /// Exact-kind matching has two named exceptions: a float field accepts
    /// an int (container formats demote whole floats), and a text field
    /// accepts a narrow string.
    pub fn accepted_wire_types(&self) -> &'static [&'static str] {
        match self {
            ValueKind::Int => &["int"],
            ValueKind::Float => &["float", "int"],
            ValueKind::Bool => &["bool"],
            ValueKind::Text => &["text", "bytes"],
            ValueKind::Timestamp => &["timestamp"],
            ValueKind::List => &["list"],
            ValueKind::Any => &[],
        }
    }

    /// Whether `value` (non-null) satisfies this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Any, _) => true,
            (ValueKind::Int, Value::Int(_)) => true,
            (ValueKind::Float, Value::Float(_) | Value::Int(_)) => true,
            (ValueKind::Bool, Value::Bool(_)) => true,
            (ValueKind::Text, Value::Text(_) | Value::Bytes(_)) => true,
            (ValueKind::Timestamp, Value::Timestamp(_)) => true,
            (ValueKind::List, Value::List(_)) => true,
            _ => false,
        }
    }

    /// Rejection tag naming the accepted wire types.
    pub fn expected_tag(&self) -> String {
        self.accepted_wire_types().join("|")
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Domain constraint on a decoded value
#[derive(Clone)]
pub enum Domain {
    /// Inclusive numeric range
    Range { min: f64, max: f64 },
    /// Value must equal one of these (ints and floats compare loosely)
    OneOf(Vec<Value>),
    /// Maximum length in chars (text), bytes (narrow strings) or items (lists)
    MaxLength(usize),
    /// At least one constraint holds
    AnyOf(Vec<Domain>),
    /// Every constraint holds
    AllOf(Vec<Domain>),
    /// Named predicate
    Custom {
        name: &'static str,
        test: fn(&Value) -> bool,
    },
}

impl Domain {
    pub fn range(min: f64, max: f64) -> Self {
        Domain::Range { min, max }
    }

    /// `Range(min, max)` or exactly `sentinel`.
    pub fn range_or(min: f64, max: f64, sentinel: f64) -> Self {
        Domain::AnyOf(vec![
            Domain::Range { min, max },
            Domain::OneOf(vec![Value::Float(sentinel)]),
        ])
    }

    /// Runs the constraint against a value.
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Domain::Range { min, max } => value
                .as_f64()
                .map_or(false, |x| *min <= x && x <= *max),
            Domain::OneOf(allowed) => allowed.iter().any(|a| a.loose_eq(value)),
            Domain::MaxLength(n) => match value {
                Value::Text(s) => s.chars().count() <= *n,
                Value::Bytes(b) => b.len() <= *n,
                Value::List(items) => items.len() <= *n,
                _ => false,
            },
            Domain::AnyOf(options) => options.iter().any(|d| d.test(value)),
            Domain::AllOf(parts) => parts.iter().all(|d| d.test(value)),
            Domain::Custom { test, .. } => test(value),
        }
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { min, max } => write!(f, "Range({}, {})", min, max),
            Domain::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Domain::MaxLength(n) => write!(f, "MaxLength({})", n),
            Domain::AnyOf(options) => f.debug_tuple("AnyOf").field(options).finish(),
            Domain::AllOf(parts) => f.debug_tuple("AllOf").field(parts).finish(),
            Domain::Custom { name, .. } => write!(f, "Custom({})", name),
        }
    }
}

/// Wire-to-typed coercion pair for fields whose wire form is not the
/// target kind.
#[derive(Clone, Copy)]
pub struct Coercion {
    pub name: &'static str,
    pub import: fn(&Value) -> Result<Value, String>,
    pub export: fn(&Value) -> Result<Value, String>,
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coercion({})", self.name)
    }
}

/// Per-field rules
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub kind: ValueKind,
    pub domain: Option<Domain>,
    pub default: Option<Value>,
    /// Required whenever a default exists, unless overridden
    pub required: bool,
    pub nullable: bool,
    pub coercion: Option<Coercion>,
}

impl FieldSpec {
    /// A field of `kind` with no default, no domain and not required.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            domain: None,
            default: None,
            required: false,
            nullable: false,
            coercion: None,
        }
    }

    pub fn int() -> Self {
        Self::new(ValueKind::Int)
    }

    pub fn float() -> Self {
        Self::new(ValueKind::Float)
    }

    pub fn boolean() -> Self {
        Self::new(ValueKind::Bool)
    }

    pub fn text() -> Self {
        Self::new(ValueKind::Text)
    }

    /// Sets the default value; the field becomes required.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = true;
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Clears the required flag while keeping any default.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }
}

/// Field set of one message type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTypeSpec {
    pub type_id: i64,
    pub label: String,
    field_names: Vec<String>,
}

impl MessageTypeSpec {
    /// Creates a type spec. `type` is always part of the field set and
    /// duplicate names are dropped, keeping first-seen order.
    pub fn new<I, S>(type_id: i64, label: impl Into<String>, field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = vec!["type".to_string()];
        for name in field_names {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self {
            type_id,
            label: label.into(),
            field_names: names,
        }
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_names.iter().any(|n| n == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_accepts_int_but_not_reverse() {
        assert!(ValueKind::Float.accepts(&Value::Int(3)));
        assert!(!ValueKind::Int.accepts(&Value::Float(3.0)));
    }

    #[test]
    fn test_text_accepts_narrow_and_wide() {
        assert!(ValueKind::Text.accepts(&Value::Text("x".into())));
        assert!(ValueKind::Text.accepts(&Value::Bytes(b"x".to_vec())));
        assert!(!ValueKind::Text.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_expected_tags() {
        assert_eq!(ValueKind::Float.expected_tag(), "float|int");
        assert_eq!(ValueKind::Text.expected_tag(), "text|bytes");
        assert_eq!(ValueKind::Int.expected_tag(), "int");
    }

    #[test]
    fn test_range_or_sentinel() {
        let lat = Domain::range_or(-90.0, 90.0, 91.0);
        assert!(lat.test(&Value::Float(-90.0)));
        assert!(lat.test(&Value::Int(91)));
        assert!(!lat.test(&Value::Float(-100.0)));
        assert!(!lat.test(&Value::Float(90.5)));
        assert!(!lat.test(&Value::Float(f64::NAN)));
    }

    #[test]
    fn test_max_length_units() {
        let d = Domain::MaxLength(3);
        assert!(d.test(&Value::Text("äöü".into())));
        assert!(!d.test(&Value::Bytes("äöü".as_bytes().to_vec())));
        assert!(d.test(&Value::List(vec![Value::Null; 3])));
        assert!(!d.test(&Value::Int(1)));
    }

    #[test]
    fn test_custom_domain_debug_names_predicate() {
        let d = Domain::Custom {
            name: "even",
            test: |v| v.as_i64().map_or(false, |i| i % 2 == 0),
        };
        assert!(d.test(&Value::Int(4)));
        assert!(!d.test(&Value::Int(5)));
        assert_eq!(format!("{:?}", d), "Custom(even)");
    }

    #[test]
    fn test_message_type_always_has_type() {
        let spec = MessageTypeSpec::new(5, "Static", ["mmsi", "mmsi", "shipname"]);
        assert_eq!(spec.field_names(), &["type", "mmsi", "shipname"]);
        assert!(spec.contains("type"));
        assert!(!spec.contains("lat"));
    }

    #[test]
    fn test_default_makes_required_until_optional() {
        let spec = FieldSpec::int().default_value(0);
        assert!(spec.required);
        assert!(!spec.optional().required);
    }
}
