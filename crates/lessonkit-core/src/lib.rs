//! LessonKit Core Library
//!
//! Data model and rules of the LessonKit educational page builder: the
//! element registry, the lesson document, drag-and-drop ownership, the
//! editor update pipeline and the grading engine.

pub mod assets;
pub mod config;
pub mod document;
pub mod editor;
pub mod element;
pub mod error;
pub mod ownership;
pub mod properties;
pub mod registry;
pub mod selection;
pub mod storage;
pub mod widget;

pub use assets::{AssetSelection, PickerTicket, RequestId};
pub use config::{BuilderConfig, ConfigError};
pub use document::LessonDocument;
pub use editor::{Editor, EditorSnapshot, FieldCheck, OwnerChange, Placement, StructuralUpdate};
pub use element::{Element, ElementId};
pub use error::{BuilderError, BuilderResult};
pub use ownership::{OwnershipMap, OwnershipRecord};
pub use properties::{PropertyBag, PropertyValue, SerializableColor};
pub use registry::{ElementKind, Schema, schema_for};
pub use selection::Selection;
pub use widget::{Feedback, GradingPhase, Response, RuntimeManager, SubmitOutcome, WidgetRuntimeState};
