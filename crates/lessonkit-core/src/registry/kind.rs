//! The closed set of element variants.

use crate::error::BuilderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every widget kind an element can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Container,
    SimpleContainer,
    Text,
    Button,
    Image,
    TextStatement,
    ImageChoice,
    ImageComparison,
    Audio,
    AudioComparison,
    AudioTrueFalse,
    AreaTrueFalse,
    SpeechRecognition,
    ConnectionWidget,
    ConnectionTextNode,
    ConnectionImageNode,
    DragDropWidget,
    FillInBlanks,
    SingleChoice,
    MathCalculator,
    StandaloneImage,
    StandaloneText,
}

impl ElementKind {
    pub const ALL: [ElementKind; 22] = [
        ElementKind::Container,
        ElementKind::SimpleContainer,
        ElementKind::Text,
        ElementKind::Button,
        ElementKind::Image,
        ElementKind::TextStatement,
        ElementKind::ImageChoice,
        ElementKind::ImageComparison,
        ElementKind::Audio,
        ElementKind::AudioComparison,
        ElementKind::AudioTrueFalse,
        ElementKind::AreaTrueFalse,
        ElementKind::SpeechRecognition,
        ElementKind::ConnectionWidget,
        ElementKind::ConnectionTextNode,
        ElementKind::ConnectionImageNode,
        ElementKind::DragDropWidget,
        ElementKind::FillInBlanks,
        ElementKind::SingleChoice,
        ElementKind::MathCalculator,
        ElementKind::StandaloneImage,
        ElementKind::StandaloneText,
    ];

    /// Wire name of the variant.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Container => "container",
            ElementKind::SimpleContainer => "simple-container",
            ElementKind::Text => "text",
            ElementKind::Button => "button",
            ElementKind::Image => "image",
            ElementKind::TextStatement => "text-statement",
            ElementKind::ImageChoice => "image-choice",
            ElementKind::ImageComparison => "image-comparison",
            ElementKind::Audio => "audio",
            ElementKind::AudioComparison => "audio-comparison",
            ElementKind::AudioTrueFalse => "audio-true-false",
            ElementKind::AreaTrueFalse => "area-true-false",
            ElementKind::SpeechRecognition => "speech-recognition",
            ElementKind::ConnectionWidget => "connection-widget",
            ElementKind::ConnectionTextNode => "connection-text-node",
            ElementKind::ConnectionImageNode => "connection-image-node",
            ElementKind::DragDropWidget => "drag-drop-widget",
            ElementKind::FillInBlanks => "fill-in-blanks",
            ElementKind::SingleChoice => "single-choice",
            ElementKind::MathCalculator => "math-calculator",
            ElementKind::StandaloneImage => "standalone-image",
            ElementKind::StandaloneText => "standalone-text",
        }
    }

    /// Variants that hold children in the containment tree.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ElementKind::Container | ElementKind::SimpleContainer | ElementKind::ConnectionWidget
        )
    }

    /// Variants that can own standalone elements.
    pub fn can_own(self) -> bool {
        matches!(self, ElementKind::DragDropWidget)
    }

    /// Variants that take an answer and carry a grading state machine.
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            ElementKind::TextStatement
                | ElementKind::ImageChoice
                | ElementKind::ImageComparison
                | ElementKind::AudioComparison
                | ElementKind::AudioTrueFalse
                | ElementKind::AreaTrueFalse
                | ElementKind::SpeechRecognition
                | ElementKind::ConnectionWidget
                | ElementKind::DragDropWidget
                | ElementKind::FillInBlanks
                | ElementKind::SingleChoice
                | ElementKind::MathCalculator
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BuilderError::UnknownVariant(s.to_string()))
    }
}
