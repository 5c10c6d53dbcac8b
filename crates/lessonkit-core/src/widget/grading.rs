//! Correctness evaluation for every interactive variant.

use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use crate::properties::PropertyValue;
use crate::registry::ElementKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// An end-user response routed into the grading engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Response {
    /// True/false style answers.
    Boolean(bool),
    /// Index of the picked option or side.
    Choice(usize),
    /// One entry per blank, or a single transcript.
    Texts(Vec<String>),
    Number(f64),
    /// `(from, to)` node keys.
    Connections(Vec<(String, String)>),
    /// Elements dropped into a drag-drop widget.
    Placements(Vec<ElementId>),
}

/// How free-text answers are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatcher {
    pub case_sensitive: bool,
    pub accent_sensitive: bool,
    pub trim_whitespace: bool,
    pub ignore_punctuation: bool,
}

impl Default for TextMatcher {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            accent_sensitive: false,
            trim_whitespace: true,
            ignore_punctuation: false,
        }
    }
}

impl TextMatcher {
    pub fn from_element(element: &Element) -> Self {
        Self {
            case_sensitive: element.bool_prop("caseSensitive").unwrap_or(false),
            accent_sensitive: element.bool_prop("accentSensitive").unwrap_or(false),
            trim_whitespace: element.bool_prop("trimWhitespace").unwrap_or(true),
            ignore_punctuation: element.kind() == ElementKind::SpeechRecognition,
        }
    }

    pub fn normalize(&self, input: &str) -> String {
        let mut s: String = if self.accent_sensitive {
            input.to_string()
        } else {
            input.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
        };
        if self.ignore_punctuation {
            s = s
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .collect();
        }
        if !self.case_sensitive {
            s = s.to_lowercase();
        }
        if self.trim_whitespace {
            s = s.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        s
    }

    pub fn matches(&self, expected: &str, given: &str) -> bool {
        self.normalize(expected) == self.normalize(given)
    }
}

/// Decide whether `response` is correct for `element`.
pub fn evaluate(element: &Element, response: &Response) -> BuilderResult<bool> {
    let kind = element.kind();
    if !kind.is_interactive() {
        return Err(BuilderError::NotInteractive(kind));
    }

    let correct = match (kind, response) {
        (ElementKind::SingleChoice | ElementKind::ImageChoice, Response::Choice(index)) => element
            .list_prop("options")
            .get(*index)
            .and_then(PropertyValue::as_record)
            .and_then(|option| option.get("isCorrect"))
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false),
        (
            ElementKind::TextStatement | ElementKind::AreaTrueFalse | ElementKind::AudioTrueFalse,
            Response::Boolean(answer),
        ) => element.bool_prop("correctAnswer") == Some(*answer),
        (ElementKind::ImageComparison | ElementKind::AudioComparison, Response::Choice(index)) => element
            .number_prop("correctAnswer")
            .is_some_and(|expected| expected >= 0.0 && expected as usize == *index),
        (ElementKind::FillInBlanks, Response::Texts(answers)) => grade_blanks(element, answers),
        (ElementKind::SpeechRecognition, Response::Texts(transcript)) => {
            let expected = element.text_prop("expectedText").unwrap_or("");
            let matcher = TextMatcher::from_element(element);
            !matcher.normalize(expected).is_empty()
                && matcher.matches(expected, &transcript.join(" "))
        }
        (ElementKind::MathCalculator, Response::Number(value)) => {
            let expected = element.number_prop("correctAnswer").unwrap_or(0.0);
            let tolerance = element.number_prop("tolerance").unwrap_or(0.0).abs();
            value.is_finite() && (value - expected).abs() <= tolerance + f64::EPSILON * expected.abs().max(1.0)
        }
        (ElementKind::ConnectionWidget, Response::Connections(pairs)) => {
            let expected = expected_connections(element);
            let given: HashSet<(&str, &str)> = pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
            !expected.is_empty() && expected == given
        }
        (ElementKind::DragDropWidget, Response::Placements(ids)) => {
            let expected: HashSet<ElementId> = element
                .list_prop("correctItems")
                .iter()
                .filter_map(PropertyValue::as_str)
                .filter_map(|id| id.parse().ok())
                .collect();
            let given: HashSet<ElementId> = ids.iter().copied().collect();
            !expected.is_empty() && expected == given
        }
        _ => return Err(BuilderError::ResponseMismatch(kind)),
    };
    Ok(correct)
}

/// Accepted spellings of one blank: a plain string, or a record with an
/// `answer` and optional `alternatives`.
fn blank_answers(blank: &PropertyValue) -> Vec<&str> {
    match blank {
        PropertyValue::Text(answer) => vec![answer.as_str()],
        PropertyValue::Record(fields) => fields
            .get("answer")
            .and_then(PropertyValue::as_str)
            .into_iter()
            .chain(
                fields
                    .get("alternatives")
                    .and_then(PropertyValue::as_list)
                    .unwrap_or(&[])
                    .iter()
                    .filter_map(PropertyValue::as_str),
            )
            .collect(),
        _ => Vec::new(),
    }
}

fn grade_blanks(element: &Element, answers: &[String]) -> bool {
    let blanks = element.list_prop("blanks");
    if blanks.is_empty() || blanks.len() != answers.len() {
        return false;
    }
    let matcher = TextMatcher::from_element(element);
    blanks.iter().zip(answers).all(|(blank, given)| {
        blank_answers(blank)
            .iter()
            .any(|expected| matcher.matches(expected, given))
    })
}

fn expected_connections(element: &Element) -> HashSet<(&str, &str)> {
    element
        .list_prop("connections")
        .iter()
        .filter_map(PropertyValue::as_record)
        .filter_map(|pair| {
            let from = pair.get("from").and_then(PropertyValue::as_str)?;
            let to = pair.get("to").and_then(PropertyValue::as_str)?;
            Some((from, to))
        })
        .collect()
}
