//! Per-variant property schemas.

use super::ElementKind;
use crate::properties::{PropertyBag, PropertyValue, SerializableColor};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// The set of values a field is designed to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Any,
    Bool,
    Number { min: Option<f64>, max: Option<f64> },
    Text,
    Color,
    Choice(&'static [&'static str]),
    List,
    Record,
}

impl Domain {
    /// Check whether a value lies inside this domain.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (Domain::Any, _) => true,
            (Domain::Bool, PropertyValue::Bool(_)) => true,
            (Domain::Number { min, max }, PropertyValue::Number(n)) => {
                min.is_none_or(|m| *n >= m) && max.is_none_or(|m| *n <= m)
            }
            (Domain::Text, PropertyValue::Text(_)) => true,
            (Domain::Color, PropertyValue::Color(_)) => true,
            (Domain::Choice(options), PropertyValue::Text(s)) => options.contains(&s.as_str()),
            (Domain::List, PropertyValue::List(_)) => true,
            (Domain::Record, PropertyValue::Record(_)) => true,
            _ => false,
        }
    }
}

/// One legal field of a variant.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub default: PropertyValue,
    pub domain: Domain,
}

/// Field table of a variant.
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: ElementKind,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn default_for(&self, key: &str) -> Option<&PropertyValue> {
        self.field(key).map(|f| &f.default)
    }

    /// All defaults as a fresh property bag.
    pub fn defaults(&self) -> PropertyBag {
        self.fields
            .iter()
            .map(|f| (f.key, f.default.clone()))
            .collect()
    }
}

static SCHEMAS: LazyLock<HashMap<ElementKind, Schema>> = LazyLock::new(|| {
    ElementKind::ALL
        .iter()
        .map(|&kind| (kind, Schema { kind, fields: fields_for(kind) }))
        .collect()
});

static KNOWN_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    SCHEMAS
        .values()
        .flat_map(|schema| schema.fields.iter().map(|f| f.key))
        .collect()
});

/// Look up the schema of a variant.
pub fn schema_for(kind: ElementKind) -> &'static Schema {
    // Every variant is inserted when the table is built.
    &SCHEMAS[&kind]
}

/// Whether any variant declares `key`.
pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(key)
}

const TEXT_ALIGN: &[&str] = &["left", "center", "right", "justify"];
const BORDER_STYLE: &[&str] = &["none", "solid", "dashed", "dotted"];
const LAYOUT: &[&str] = &["column", "row", "grid", "free"];
const STANDALONE_TYPES: &[&str] = &["image", "text"];

fn field(key: &'static str, default: impl Into<PropertyValue>, domain: Domain) -> FieldSpec {
    FieldSpec {
        key,
        default: default.into(),
        domain,
    }
}

fn number(key: &'static str, default: f64, min: Option<f64>, max: Option<f64>) -> FieldSpec {
    field(key, default, Domain::Number { min, max })
}

fn text(key: &'static str, default: &str) -> FieldSpec {
    field(key, default, Domain::Text)
}

fn flag(key: &'static str, default: bool) -> FieldSpec {
    field(key, default, Domain::Bool)
}

fn color(key: &'static str, default: SerializableColor) -> FieldSpec {
    field(key, default, Domain::Color)
}

fn list(key: &'static str) -> FieldSpec {
    field(key, PropertyValue::List(Vec::new()), Domain::List)
}

fn choice(key: &'static str, default: &str, options: &'static [&'static str]) -> FieldSpec {
    field(key, default, Domain::Choice(options))
}

/// Position, size and frame shared by every variant.
fn layout_fields(width: f64, height: f64) -> Vec<FieldSpec> {
    vec![
        number("x", 0.0, None, None),
        number("y", 0.0, None, None),
        number("width", width, Some(0.0), None),
        number("height", height, Some(0.0), None),
        color("backgroundColor", SerializableColor::transparent()),
        number("borderWidth", 0.0, Some(0.0), None),
        color("borderColor", SerializableColor::black()),
        choice("borderStyle", "none", BORDER_STYLE),
        number("borderRadius", 0.0, Some(0.0), None),
    ]
}

/// Attempt and feedback configuration shared by interactive variants.
fn grading_fields() -> Vec<FieldSpec> {
    vec![
        flag("allowRetry", true),
        number("maxAttempts", 0.0, Some(0.0), None),
        flag("instantFeedback", true),
        flag("showFeedback", true),
        text("correctMessage", "Correct!"),
        text("incorrectMessage", "Try again."),
        flag("shakeOnWrong", false),
    ]
}

fn typography_fields() -> Vec<FieldSpec> {
    vec![
        text("text", ""),
        number("fontSize", 16.0, Some(1.0), None),
        color("textColor", SerializableColor::black()),
        choice("textAlign", "left", TEXT_ALIGN),
        flag("bold", false),
        flag("italic", false),
    ]
}

fn text_matching_fields() -> Vec<FieldSpec> {
    vec![
        flag("caseSensitive", false),
        flag("accentSensitive", false),
        flag("trimWhitespace", true),
    ]
}

fn fields_for(kind: ElementKind) -> Vec<FieldSpec> {
    let mut fields = match kind {
        ElementKind::Container => layout_fields(400.0, 300.0),
        ElementKind::SimpleContainer => layout_fields(300.0, 200.0),
        ElementKind::Text => layout_fields(200.0, 40.0),
        ElementKind::Button => layout_fields(120.0, 40.0),
        ElementKind::Image
        | ElementKind::ImageChoice
        | ElementKind::ImageComparison
        | ElementKind::AreaTrueFalse
        | ElementKind::ConnectionImageNode
        | ElementKind::StandaloneImage => layout_fields(200.0, 150.0),
        ElementKind::Audio | ElementKind::AudioComparison | ElementKind::AudioTrueFalse => {
            layout_fields(240.0, 60.0)
        }
        ElementKind::TextStatement
        | ElementKind::SpeechRecognition
        | ElementKind::FillInBlanks
        | ElementKind::SingleChoice
        | ElementKind::MathCalculator
        | ElementKind::ConnectionTextNode
        | ElementKind::StandaloneText => layout_fields(300.0, 80.0),
        ElementKind::ConnectionWidget | ElementKind::DragDropWidget => layout_fields(500.0, 300.0),
    };

    match kind {
        ElementKind::Container => {
            fields.push(choice("layout", "column", LAYOUT));
            fields.push(number("gap", 8.0, Some(0.0), None));
            fields.push(number("padding", 16.0, Some(0.0), None));
        }
        ElementKind::SimpleContainer => {
            fields.push(number("padding", 8.0, Some(0.0), None));
        }
        ElementKind::Text => fields.extend(typography_fields()),
        ElementKind::Button => {
            fields.extend(typography_fields());
            fields.push(text("action", "next"));
            fields.push(color("hoverColor", SerializableColor::new(230, 230, 230, 255)));
        }
        ElementKind::Image => {
            fields.push(text("src", ""));
            fields.push(text("alt", ""));
        }
        ElementKind::TextStatement => {
            fields.extend(typography_fields());
            fields.push(flag("correctAnswer", true));
            fields.extend(grading_fields());
        }
        ElementKind::ImageChoice | ElementKind::SingleChoice => {
            fields.push(text("question", ""));
            fields.push(list("options"));
            fields.push(flag("shuffleOptions", false));
            fields.extend(grading_fields());
        }
        ElementKind::ImageComparison => {
            fields.push(text("leftSrc", ""));
            fields.push(text("leftSrcAlt", ""));
            fields.push(text("rightSrc", ""));
            fields.push(text("rightSrcAlt", ""));
            fields.push(number("correctAnswer", 0.0, Some(0.0), Some(1.0)));
            fields.extend(grading_fields());
        }
        ElementKind::Audio => {
            fields.push(text("src", ""));
            flag_fields(&mut fields, &[("autoplay", false), ("loop", false)]);
        }
        ElementKind::AudioComparison => {
            fields.push(text("firstSrc", ""));
            fields.push(text("secondSrc", ""));
            fields.push(number("correctAnswer", 0.0, Some(0.0), Some(1.0)));
            fields.extend(grading_fields());
        }
        ElementKind::AudioTrueFalse => {
            fields.push(text("src", ""));
            fields.push(flag("correctAnswer", true));
            fields.extend(grading_fields());
        }
        ElementKind::AreaTrueFalse => {
            fields.push(text("src", ""));
            fields.push(text("srcAlt", ""));
            fields.push(list("areas"));
            fields.push(flag("correctAnswer", true));
            fields.extend(grading_fields());
        }
        ElementKind::SpeechRecognition => {
            fields.push(text("expectedText", ""));
            fields.push(text("language", "en-US"));
            fields.extend(text_matching_fields());
            fields.extend(grading_fields());
        }
        ElementKind::ConnectionWidget => {
            fields.push(list("connections"));
            fields.push(color("lineColor", SerializableColor::black()));
            fields.push(number("lineWidth", 2.0, Some(0.0), None));
            fields.extend(grading_fields());
        }
        ElementKind::ConnectionTextNode => {
            fields.extend(typography_fields());
            fields.push(text("nodeKey", ""));
        }
        ElementKind::ConnectionImageNode => {
            fields.push(text("src", ""));
            fields.push(text("srcAlt", ""));
            fields.push(text("nodeKey", ""));
        }
        ElementKind::DragDropWidget => {
            fields.push(number("maxItems", 0.0, Some(0.0), None));
            fields.push(list("allowedTypes"));
            fields.push(list("correctItems"));
            fields.push(color("dropZoneColor", SerializableColor::new(240, 240, 240, 255)));
            fields.extend(grading_fields());
        }
        ElementKind::FillInBlanks => {
            fields.push(text("template", ""));
            fields.push(list("blanks"));
            fields.extend(text_matching_fields());
            fields.extend(grading_fields());
        }
        ElementKind::MathCalculator => {
            fields.push(text("expression", ""));
            fields.push(number("correctAnswer", 0.0, None, None));
            fields.push(number("tolerance", 0.0, Some(0.0), None));
            fields.extend(grading_fields());
        }
        ElementKind::StandaloneImage => {
            fields.push(text("src", ""));
            fields.push(text("srcAlt", ""));
            fields.push(choice("standaloneElementType", "image", STANDALONE_TYPES));
        }
        ElementKind::StandaloneText => {
            fields.extend(typography_fields());
            fields.push(choice("standaloneElementType", "text", STANDALONE_TYPES));
        }
    }
    fields
}

fn flag_fields(fields: &mut Vec<FieldSpec>, flags: &[(&'static str, bool)]) {
    fields.extend(flags.iter().map(|&(key, default)| flag(key, default)));
}
