//! Elements: the nodes of a lesson page.

use crate::properties::{PropertyBag, PropertyValue};
use crate::registry::{ElementKind, schema_for};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// A node of the authoring document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(rename = "type")]
    pub(crate) kind: ElementKind,
    pub properties: PropertyBag,
    /// Child ids in display order. Only containers ever have children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<ElementId>,
}

impl Element {
    /// Create an element with registry defaults overlaid by `initial`.
    pub fn new(kind: ElementKind, initial: PropertyBag) -> Self {
        Self::with_id(Uuid::new_v4(), kind, initial)
    }

    /// Create an element with a specific id.
    pub fn with_id(id: ElementId, kind: ElementKind, initial: PropertyBag) -> Self {
        let mut properties = schema_for(kind).defaults();
        properties.merge(initial);
        Self {
            id,
            kind,
            properties,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Read a property, falling back to the variant's default.
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .get(key)
            .or_else(|| schema_for(self.kind).default_for(key))
    }

    pub fn bool_prop(&self, key: &str) -> Option<bool> {
        self.property(key).and_then(PropertyValue::as_bool)
    }

    pub fn number_prop(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(PropertyValue::as_number)
    }

    pub fn text_prop(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(PropertyValue::as_str)
    }

    pub fn list_prop(&self, key: &str) -> &[PropertyValue] {
        self.property(key)
            .and_then(PropertyValue::as_list)
            .unwrap_or(&[])
    }

    /// The standalone type if this element can be owned by a composite widget.
    pub fn standalone_type(&self) -> Option<&str> {
        self.text_prop("standaloneElementType")
            .filter(|t| !t.is_empty())
    }
}
