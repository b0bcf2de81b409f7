//! # Attribute Engine
//!
//! Every resource kind declares its attributes once, in a static [`Schema`]:
//! the canonical name, a declared [`AttrType`] that drives coercion, and an
//! optional external alias (the field name the platform uses on the wire).
//!
//! Inbound payloads are resolved external → canonical ([`Schema::hydrate`]),
//! outbound payloads canonical → external ([`Schema::serialize`]).
//!
//! Coercion never fails loudly: a value the declared type cannot represent
//! becomes [`Value::Null`]. Remote payloads are not trusted to be well-formed.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::framework::descriptor::Params;

/// Control keys accepted by constructors that are never attributes.
pub const RESERVED_KEYS: &[&str] = &["validate", "stale"];

/// Canonical attribute name → current value, in declaration order.
pub type Attributes = IndexMap<&'static str, Value>;

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Integer,
    Boolean,
    DateTime,
    Array,
    /// Opaque structure, stored as received.
    Json,
    /// Platform enum value, cast to its string form.
    Enum,
}

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Array(Vec<Json>),
    Json(Json),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, whitespace-only strings and empty collections.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Json(Json::Null) => true,
            Value::Json(Json::Object(o)) => o.is_empty(),
            Value::Json(Json::Array(a)) => a.is_empty(),
            Value::Json(Json::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Json]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::String(s) => Json::String(s.clone()),
            Value::Integer(i) => Json::from(*i),
            Value::Boolean(b) => Json::Bool(*b),
            Value::DateTime(d) => Json::String(d.to_rfc3339()),
            Value::Array(a) => Json::Array(a.clone()),
            Value::Json(j) => j.clone(),
        }
    }
}

// Path-segment form, used when an attribute ends up in a URL.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(d) => f.write_str(&d.to_rfc3339()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    // Graph API style: 2021-06-01T10:00:00+0000
    if let Ok(d) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(d.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|n| Utc.from_utc_datetime(&n))
}

/// `1.0` is an integer; `1.9` and anything outside `i64` are not.
fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl AttrType {
    /// Coerces a raw JSON value into this type, or `Null` when it cannot.
    pub fn cast(&self, raw: &Json) -> Value {
        if raw.is_null() {
            return Value::Null;
        }
        match self {
            AttrType::String | AttrType::Enum => match raw {
                Json::String(s) => Value::String(s.clone()),
                Json::Number(n) => Value::String(n.to_string()),
                Json::Bool(b) => Value::String(b.to_string()),
                _ => Value::Null,
            },
            AttrType::Integer => match raw {
                Json::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(whole_number))
                    .map(Value::Integer)
                    .unwrap_or(Value::Null),
                Json::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .unwrap_or(Value::Null),
                Json::Bool(b) => Value::Integer(i64::from(*b)),
                _ => Value::Null,
            },
            AttrType::Boolean => match raw {
                Json::Bool(b) => Value::Boolean(*b),
                Json::Number(n) => Value::Boolean(n.as_f64().is_some_and(|f| f != 0.0)),
                Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" | "yes" => Value::Boolean(true),
                    "false" | "f" | "0" | "no" => Value::Boolean(false),
                    _ => Value::Null,
                },
                _ => Value::Null,
            },
            AttrType::DateTime => match raw {
                Json::String(s) => parse_datetime(s).map(Value::DateTime).unwrap_or(Value::Null),
                Json::Number(n) => n
                    .as_i64()
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .map(Value::DateTime)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            },
            AttrType::Array => match raw {
                Json::Array(a) => Value::Array(a.clone()),
                other => Value::Array(vec![other.clone()]),
            },
            AttrType::Json => Value::Json(raw.clone()),
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub ty: AttrType,
    pub alias: Option<&'static str>,
    pub default: Option<Json>,
}

impl Attribute {
    /// The name used on the wire.
    pub fn external_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }
}

/// The attribute declarations of one resource kind.
#[derive(Debug, Clone)]
pub struct Schema {
    attributes: IndexMap<&'static str, Attribute>,
    external: IndexMap<&'static str, &'static str>,
    identity: &'static str,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            attributes: IndexMap::new(),
            identity: "id",
        }
    }

    pub fn identity(&self) -> &'static str {
        self.identity
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.keys().copied()
    }

    /// Maps a wire name to the canonical one, if this kind declares it.
    pub fn resolve(&self, external: &str) -> Option<&'static str> {
        self.external.get(external).copied()
    }

    pub fn external_name(&self, canonical: &str) -> Option<&'static str> {
        self.attributes.get(canonical).map(Attribute::external_name)
    }

    /// Initial attribute values: declared defaults, `Null` elsewhere.
    pub fn defaults(&self) -> Attributes {
        self.attributes
            .values()
            .map(|a| {
                let value = a.default.as_ref().map(|d| a.ty.cast(d)).unwrap_or_default();
                (a.name, value)
            })
            .collect()
    }

    /// Resolves and coerces a raw payload. Keys this kind does not declare are
    /// returned in the second list instead of failing the whole payload.
    pub fn hydrate(&self, raw: &Map<String, Json>) -> (Vec<(&'static str, Value)>, Vec<String>) {
        let mut values = Vec::with_capacity(raw.len());
        let mut ignored = Vec::new();
        for (key, value) in raw {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            match self.resolve(key) {
                Some(name) => values.push((name, self.attributes[name].ty.cast(value))),
                None => ignored.push(key.clone()),
            }
        }
        (values, ignored)
    }

    /// Serializes the named attributes under their wire names. The identity
    /// attribute is always left out.
    pub fn serialize<'a>(
        &self,
        attributes: &Attributes,
        names: impl IntoIterator<Item = &'a str>,
        skip_null: bool,
    ) -> Params {
        let mut out = Params::new();
        for name in names {
            if name == self.identity {
                continue;
            }
            let (Some(attribute), Some(value)) = (self.attributes.get(name), attributes.get(name))
            else {
                continue;
            };
            if skip_null && value.is_null() {
                continue;
            }
            out.insert(attribute.external_name().to_string(), value.to_json());
        }
        out
    }
}

/// Builder for [`Schema`], used once per kind behind a `OnceLock`.
pub struct SchemaBuilder {
    attributes: IndexMap<&'static str, Attribute>,
    identity: &'static str,
}

impl SchemaBuilder {
    pub fn attribute(mut self, name: &'static str, ty: AttrType) -> Self {
        self.attributes.insert(
            name,
            Attribute {
                name,
                ty,
                alias: None,
                default: None,
            },
        );
        self
    }

    pub fn attributes(mut self, names: &[&'static str], ty: AttrType) -> Self {
        for name in names {
            self = self.attribute(name, ty);
        }
        self
    }

    /// Maps the platform's `external` field onto the declared `canonical` one.
    ///
    /// # Panics
    /// If `canonical` is undeclared or `external` is already mapped. Both are
    /// definition-time mistakes in a resource kind.
    pub fn alias(mut self, external: &'static str, canonical: &'static str) -> Self {
        assert!(
            !self.attributes.values().any(|a| a.alias == Some(external)),
            "alias `{external}` is mapped twice"
        );
        let attribute = self
            .attributes
            .get_mut(canonical)
            .unwrap_or_else(|| panic!("alias `{external}` targets undeclared attribute `{canonical}`"));
        attribute.alias = Some(external);
        self
    }

    pub fn default(mut self, name: &'static str, value: impl Into<Json>) -> Self {
        if let Some(attribute) = self.attributes.get_mut(name) {
            attribute.default = Some(value.into());
        }
        self
    }

    pub fn identity(mut self, name: &'static str) -> Self {
        self.identity = name;
        self
    }

    pub fn build(self) -> Schema {
        let mut external = IndexMap::new();
        for attribute in self.attributes.values() {
            let previous = external.insert(attribute.external_name(), attribute.name);
            assert!(
                previous.is_none(),
                "wire name `{}` is mapped twice",
                attribute.external_name()
            );
        }
        Schema {
            attributes: self.attributes,
            external,
            identity: self.identity,
        }
    }
}
