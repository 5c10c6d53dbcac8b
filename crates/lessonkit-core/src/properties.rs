//! Property bags and the closed set of value kinds they hold.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Serializable color representation (RGBA8), stored as `{"$color": "#rrggbbaa"}`.
///
/// The wrapper keeps colors apart from plain text that happens to look like
/// a hex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaggedColor", into = "TaggedColor")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                byte(&hex[0..1])? * 17,
                byte(&hex[1..2])? * 17,
                byte(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Wire form of [`SerializableColor`].
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaggedColor {
    #[serde(rename = "$color")]
    hex: String,
}

impl TryFrom<TaggedColor> for SerializableColor {
    type Error = String;

    fn try_from(value: TaggedColor) -> Result<Self, Self::Error> {
        Self::parse_hex(&value.hex).ok_or_else(|| format!("not a hex color: {}", value.hex))
    }
}

impl From<SerializableColor> for TaggedColor {
    fn from(color: SerializableColor) -> Self {
        Self { hex: color.to_hex() }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A single property value.
///
/// The set of kinds is closed so the update pipeline can compare a value
/// against a field's domain without knowing the widget that owns it.
/// Untagged on the wire. Colors carry their own `$color` wrapper, so every
/// JSON string loads back as [`PropertyValue::Text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Color(SerializableColor),
    Text(String),
    List(Vec<PropertyValue>),
    Record(BTreeMap<String, PropertyValue>),
}

/// Discriminant of [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    Color,
    Text,
    List,
    Record,
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Number(_) => ValueKind::Number,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Text(_) => ValueKind::Text,
            PropertyValue::List(_) => ValueKind::List,
            PropertyValue::Record(_) => ValueKind::Record,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Convenience for building record values in tests and editors.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, PropertyValue)>,
        K: Into<String>,
    {
        PropertyValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Color(c) => f.write_str(&c.to_hex()),
            PropertyValue::Text(s) => write!(f, "{s:?}"),
            PropertyValue::List(items) => write!(f, "[{} items]", items.len()),
            PropertyValue::Record(fields) => write!(f, "{{{} fields}}", fields.len()),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<SerializableColor> for PropertyValue {
    fn from(value: SerializableColor) -> Self {
        PropertyValue::Color(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        PropertyValue::List(value)
    }
}

/// Open key/value configuration of an element.
///
/// Keys absent from the bag are valid; readers fall back to the registry
/// default for the element's variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, PropertyValue>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Store a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of this bag.
    pub fn merge(&mut self, other: PropertyBag) {
        self.0.extend(other.0);
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
