//! Selection and update pipeline: the single mutation surface of a lesson.

use crate::assets::{AssetPickers, AssetSelection, PickerTicket, RequestId};
use crate::config::BuilderConfig;
use crate::document::LessonDocument;
use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use crate::properties::{PropertyBag, PropertyValue};
use crate::registry::{Domain, ElementKind, Schema, is_known_key, schema_for};
use crate::selection::Selection;
use crate::widget::{Feedback, Response, RetryOutcome, RuntimeManager, SubmitOutcome, WidgetRuntimeState};
use kurbo::Point;
use serde::Serialize;
use std::collections::HashMap;

/// How a property write related to the element's schema.
///
/// Writes are stored whatever the outcome; the property bag stays open
/// for widget-specific extensions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCheck {
    /// Declared field, value inside its domain.
    Known,
    /// Declared field, value outside its domain.
    OutOfDomain { expected: Domain },
    /// Declared by another variant's schema but not this one.
    Foreign,
    /// Not declared by any schema.
    Extension,
}

/// Where an element should sit in the containment tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// `None` places the element at the root level.
    pub parent: Option<ElementId>,
    pub index: usize,
}

/// Change to the ownership relation of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OwnerChange {
    Attach {
        owner: ElementId,
        position: Option<Point>,
    },
    Detach,
}

/// Fields to merge into an element in one atomic step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralUpdate {
    pub placement: Option<Placement>,
    pub children: Option<Vec<ElementId>>,
    pub owner: Option<OwnerChange>,
    pub properties: Option<PropertyBag>,
}

impl StructuralUpdate {
    pub fn move_to(mut self, parent: Option<ElementId>, index: usize) -> Self {
        self.placement = Some(Placement { parent, index });
        self
    }

    pub fn children(mut self, children: Vec<ElementId>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn attach_to(mut self, owner: ElementId, position: Option<Point>) -> Self {
        self.owner = Some(OwnerChange::Attach { owner, position });
        self
    }

    pub fn detach(mut self) -> Self {
        self.owner = Some(OwnerChange::Detach);
        self
    }

    pub fn properties(mut self, properties: PropertyBag) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Read-only view for the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot<'a> {
    pub document: &'a LessonDocument,
    pub selected: Option<ElementId>,
    pub runtime: &'a HashMap<ElementId, WidgetRuntimeState>,
}

/// Editor state wrapping a lesson document.
///
/// Callers never mutate elements directly; every change goes through one
/// of these methods and is applied completely or not at all.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    document: LessonDocument,
    selection: Selection,
    runtime: RuntimeManager,
    pickers: AssetPickers,
    config: BuilderConfig,
}

impl Editor {
    /// Create an editor with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor for an existing document.
    pub fn with_document(document: LessonDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(&self) -> &LessonDocument {
        &self.document
    }

    pub fn into_document(self) -> LessonDocument {
        self.document
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn snapshot(&self) -> EditorSnapshot<'_> {
        EditorSnapshot {
            document: &self.document,
            selected: self.selection.get(),
            runtime: self.runtime.states(),
        }
    }

    pub fn create_element(&mut self, kind: ElementKind, initial: PropertyBag) -> ElementId {
        let id = self.document.create_element(kind, initial);
        log::debug!("Created {kind} {id}");
        id
    }

    /// Delete an element subtree and every reference to the removed ids.
    pub fn delete_element(&mut self, id: ElementId) -> BuilderResult<Vec<ElementId>> {
        let removed = self.document.delete_element(id)?;
        for &gone in &removed {
            if self.selection.forget(gone) {
                log::debug!("Cleared selection of deleted {gone}");
            }
            self.runtime.remove(gone);
            self.pickers.forget_element(gone);
        }
        log::debug!("Deleted {id} ({} elements)", removed.len());
        Ok(removed)
    }

    /// Focus an element, or clear focus with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> BuilderResult<()> {
        if let Some(id) = id {
            self.document.get_element(id)?;
        }
        self.selection.set(id);
        Ok(())
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selection.get()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selection
            .get()
            .and_then(|id| self.document.get_element(id).ok())
    }

    /// Variant of the focused element, which picks the property sub-panel.
    pub fn selected_kind(&self) -> Option<ElementKind> {
        self.selected_element().map(Element::kind)
    }

    /// Legal fields of the focused element.
    pub fn selected_schema(&self) -> Option<&'static Schema> {
        self.selected_kind().map(schema_for)
    }

    /// Write one property.
    ///
    /// Ownership records the new value no longer admits (a cleared
    /// `standaloneElementType`, a narrowed `allowedTypes`) are released in
    /// the same step.
    pub fn apply_property_change(
        &mut self,
        id: ElementId,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> BuilderResult<FieldCheck> {
        let couple = self.config.couple_shake_with_retry;
        let element = self.document.get_element_mut(id).inspect_err(|_| {
            log::warn!("Ignoring change of {key} on missing element {id}");
        })?;
        let check = write_property(element, key, value.into(), couple);
        release_stale_ownership(&mut self.document, id);
        Ok(check)
    }

    /// Merge structural and property changes atomically.
    ///
    /// Order: placement, children, properties, ownership, so an attach is
    /// checked against the new properties. The update is staged on a copy of
    /// the document and committed only if every part succeeds.
    pub fn apply_structural_update(&mut self, id: ElementId, update: StructuralUpdate) -> BuilderResult<()> {
        let mut staged = self.document.clone();
        staged.get_element(id)?;

        if let Some(Placement { parent, index }) = update.placement {
            staged.move_element(id, parent, index)?;
        }
        if let Some(children) = update.children {
            staged.set_children(id, children)?;
        }
        if let Some(properties) = update.properties {
            let couple = self.config.couple_shake_with_retry;
            let element = staged.get_element_mut(id)?;
            for (key, value) in properties.iter() {
                write_property(element, key, value.clone(), couple);
            }
            release_stale_ownership(&mut staged, id);
        }
        match update.owner {
            Some(OwnerChange::Attach { owner, position }) => staged.attach(owner, id, position)?,
            Some(OwnerChange::Detach) => {
                staged.detach(id);
            }
            None => {}
        }

        self.document = staged;
        log::debug!("Applied structural update to {id}");
        Ok(())
    }

    /// Release a standalone element from its owner and move it back to the
    /// position recorded when it was first attached.
    pub fn release_standalone(&mut self, id: ElementId) -> BuilderResult<Option<Point>> {
        self.document.get_element(id)?;
        let position = self.document.detach(id);
        if let Some(p) = position {
            let element = self.document.get_element_mut(id)?;
            element.properties.set("x", p.x);
            element.properties.set("y", p.y);
        }
        Ok(position)
    }

    /// Start an asset picker session targeting `element.key`.
    pub fn request_asset(&mut self, id: ElementId, key: &str) -> BuilderResult<PickerTicket> {
        self.document.get_element(id)?;
        Ok(self.pickers.request(id, key))
    }

    /// Route a picker result back into the document.
    ///
    /// Stale requests (already consumed, or whose element was deleted)
    /// resolve to `NotFound` and change nothing.
    pub fn complete_asset_pick(&mut self, request_id: RequestId, selection: AssetSelection) -> BuilderResult<()> {
        let Some(pending) = self.pickers.take(request_id) else {
            log::warn!("Dropping stale asset pick {request_id}");
            return Err(BuilderError::NotFound(request_id));
        };

        let kind = self.document.get_element(pending.element_id)?.kind();
        let alt_key = alt_key_for(kind, &pending.key);
        let mut update = PropertyBag::new().with(pending.key, selection.url);
        if let (Some(alt_key), Some(alt)) = (alt_key, selection.alt) {
            update.set(alt_key, alt);
        }
        self.apply_structural_update(pending.element_id, StructuralUpdate::default().properties(update))
    }

    /// Abandon a picker session.
    pub fn cancel_asset_pick(&mut self, request_id: RequestId) -> bool {
        self.pickers.take(request_id).is_some()
    }

    pub fn pending_asset_picks(&self) -> usize {
        self.pickers.pending_count()
    }

    /// Create runtime state for a rendered interactive element.
    pub fn mount_widget(&mut self, id: ElementId) -> BuilderResult<()> {
        let element = self.document.get_element(id)?;
        self.runtime.mount(element)?;
        Ok(())
    }

    pub fn unmount_widget(&mut self, id: ElementId) {
        self.runtime.unmount(id);
    }

    pub fn submit_answer(&mut self, id: ElementId, response: &Response) -> BuilderResult<SubmitOutcome> {
        let element = self.document.get_element(id)?;
        self.runtime.submit(element, response)
    }

    pub fn retry_widget(&mut self, id: ElementId) -> BuilderResult<RetryOutcome> {
        let element = self.document.get_element(id)?;
        self.runtime.retry(element)
    }

    /// Show the hidden result of an answered widget with deferred feedback.
    pub fn reveal_feedback(&mut self, id: ElementId) -> BuilderResult<bool> {
        let element = self.document.get_element(id)?;
        self.runtime.reveal(element)
    }

    pub fn widget_state(&self, id: ElementId) -> Option<&WidgetRuntimeState> {
        self.runtime.state(id)
    }

    pub fn feedback(&self, id: ElementId) -> BuilderResult<Feedback> {
        let element = self.document.get_element(id)?;
        Ok(self.runtime.feedback(element))
    }
}

/// Store a value and report how it relates to the element's schema.
fn write_property(element: &mut Element, key: &str, value: PropertyValue, couple_shake: bool) -> FieldCheck {
    let check = match schema_for(element.kind()).field(key) {
        Some(field) if field.domain.accepts(&value) => FieldCheck::Known,
        Some(field) => {
            log::debug!("{key}={value} is outside the domain of {}", element.kind());
            FieldCheck::OutOfDomain {
                expected: field.domain.clone(),
            }
        }
        None if is_known_key(key) => FieldCheck::Foreign,
        None => FieldCheck::Extension,
    };

    if couple_shake && key == "shakeOnWrong" && value == PropertyValue::Bool(true) {
        element.properties.set("allowRetry", false);
    }
    element.properties.set(key, value);
    check
}

fn release_stale_ownership(document: &mut LessonDocument, id: ElementId) {
    for record in document.prune_ownership(id) {
        log::debug!(
            "Released {} from {} after property change",
            record.element_id,
            record.owner_id
        );
    }
}

/// Field holding the alt text for an asset written to `key`, if declared.
fn alt_key_for(kind: ElementKind, key: &str) -> Option<String> {
    let schema = schema_for(kind);
    let paired = format!("{key}Alt");
    if schema.field(&paired).is_some() {
        Some(paired)
    } else if schema.field("alt").is_some() {
        Some("alt".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{GradingPhase, RejectReason};
    use uuid::Uuid;

    fn options(correct: &[(&str, bool)]) -> PropertyValue {
        PropertyValue::List(
            correct
                .iter()
                .map(|&(text, ok)| PropertyValue::record([("text", text.into()), ("isCorrect", ok.into())]))
                .collect(),
        )
    }

    #[test]
    fn test_select_and_derived_type_info() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::FillInBlanks, PropertyBag::new());

        editor.select(Some(id)).unwrap();
        assert_eq!(editor.selected(), Some(id));
        assert_eq!(editor.selected_kind(), Some(ElementKind::FillInBlanks));
        assert!(editor.selected_schema().unwrap().field("caseSensitive").is_some());

        editor.select(None).unwrap();
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn test_select_missing_keeps_selection() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::Text, PropertyBag::new());
        editor.select(Some(id)).unwrap();

        let ghost = Uuid::new_v4();
        assert_eq!(editor.select(Some(ghost)).unwrap_err(), BuilderError::NotFound(ghost));
        assert_eq!(editor.selected(), Some(id));
    }

    #[test]
    fn test_delete_clears_selection_and_runtime() {
        let mut editor = Editor::new();
        let c = editor.create_element(ElementKind::Container, PropertyBag::new());
        let quiz = editor.create_element(ElementKind::TextStatement, PropertyBag::new());
        editor
            .apply_structural_update(c, StructuralUpdate::default().children(vec![quiz]))
            .unwrap();
        editor.select(Some(quiz)).unwrap();
        editor.submit_answer(quiz, &Response::Boolean(true)).unwrap();

        editor.delete_element(c).unwrap();

        assert_eq!(editor.selected(), None);
        assert!(editor.widget_state(quiz).is_none());
        assert!(editor.snapshot().runtime.is_empty());
    }

    #[test]
    fn test_property_change_checks() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::Button, PropertyBag::new());

        assert_eq!(editor.apply_property_change(id, "text", "Next").unwrap(), FieldCheck::Known);
        assert!(matches!(
            editor.apply_property_change(id, "fontSize", "huge").unwrap(),
            FieldCheck::OutOfDomain { .. }
        ));
        assert_eq!(
            editor.apply_property_change(id, "x-analytics-tag", "cta").unwrap(),
            FieldCheck::Extension
        );

        let el = editor.document().get_element(id).unwrap();
        assert_eq!(el.text_prop("fontSize"), Some("huge"));
        assert_eq!(el.text_prop("x-analytics-tag"), Some("cta"));
    }

    #[test]
    fn test_key_of_another_variant_is_foreign() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::Button, PropertyBag::new());

        assert_eq!(editor.apply_property_change(id, "maxItems", 3).unwrap(), FieldCheck::Foreign);
        let el = editor.document().get_element(id).unwrap();
        assert_eq!(el.number_prop("maxItems"), Some(3.0));
    }

    #[test]
    fn test_clearing_standalone_type_releases_owner() {
        let mut editor = Editor::new();
        let zone = editor.create_element(ElementKind::DragDropWidget, PropertyBag::new());
        let img = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        editor
            .apply_structural_update(img, StructuralUpdate::default().attach_to(zone, None))
            .unwrap();

        editor.apply_property_change(img, "standaloneElementType", "").unwrap();

        let doc = editor.document();
        assert_eq!(doc.owner_of(img), None);
        assert!(doc.check_integrity().is_ok());
        let reloaded = LessonDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.owner_of(img), None);
    }

    #[test]
    fn test_narrowing_allowed_types_releases_excluded_items() {
        let mut editor = Editor::new();
        let zone = editor.create_element(ElementKind::DragDropWidget, PropertyBag::new());
        let img = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        let caption = editor.create_element(ElementKind::StandaloneText, PropertyBag::new());
        for item in [img, caption] {
            editor
                .apply_structural_update(item, StructuralUpdate::default().attach_to(zone, None))
                .unwrap();
        }

        editor
            .apply_property_change(zone, "allowedTypes", PropertyValue::List(vec!["text".into()]))
            .unwrap();

        let doc = editor.document();
        assert_eq!(doc.items_of(zone), vec![caption]);
        assert_eq!(doc.owner_of(img), None);
        assert!(LessonDocument::from_json(&doc.to_json().unwrap()).is_ok());
    }

    #[test]
    fn test_attach_is_checked_against_new_properties() {
        let mut editor = Editor::new();
        let zone = editor.create_element(ElementKind::DragDropWidget, PropertyBag::new());
        let img = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());

        let err = editor
            .apply_structural_update(
                img,
                StructuralUpdate::default()
                    .attach_to(zone, None)
                    .properties(PropertyBag::new().with("standaloneElementType", "")),
            )
            .unwrap_err();

        assert!(matches!(err, BuilderError::TypeNotAllowed { standalone_type: None, .. }));
        let doc = editor.document();
        assert_eq!(doc.owner_of(img), None);
        assert_eq!(doc.get_element(img).unwrap().standalone_type(), Some("image"));
    }

    #[test]
    fn test_hex_looking_answers_grade_after_reload() {
        let mut editor = Editor::new();
        let id = editor.create_element(
            ElementKind::FillInBlanks,
            PropertyBag::new()
                .with("template", "#facade")
                .with("blanks", PropertyValue::List(vec!["#add".into()])),
        );
        let json = editor.document().to_json().unwrap();

        let mut reloaded = Editor::with_document(LessonDocument::from_json(&json).unwrap());
        let el = reloaded.document().get_element(id).unwrap();
        assert_eq!(el.text_prop("template"), Some("#facade"));

        let outcome = reloaded
            .submit_answer(id, &Response::Texts(vec!["#add".into()]))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Graded { correct: true, locked: false });
    }

    #[test]
    fn test_reveal_deferred_feedback() {
        let mut editor = Editor::new();
        let id = editor.create_element(
            ElementKind::TextStatement,
            PropertyBag::new()
                .with("correctAnswer", true)
                .with("instantFeedback", false),
        );

        editor.submit_answer(id, &Response::Boolean(true)).unwrap();
        assert!(!editor.feedback(id).unwrap().show_result);

        assert!(editor.reveal_feedback(id).unwrap());
        let fb = editor.feedback(id).unwrap();
        assert!(fb.show_result);
        assert_eq!(fb.correct, Some(true));
    }

    #[test]
    fn test_property_change_on_missing_element() {
        let mut editor = Editor::new();
        let ghost = Uuid::new_v4();
        let err = editor.apply_property_change(ghost, "text", "x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_shake_is_independent_by_default() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::SingleChoice, PropertyBag::new());
        editor.apply_property_change(id, "shakeOnWrong", true).unwrap();

        let el = editor.document().get_element(id).unwrap();
        assert_eq!(el.bool_prop("allowRetry"), Some(true));
    }

    #[test]
    fn test_shake_coupling_when_configured() {
        let config = BuilderConfig {
            couple_shake_with_retry: true,
            ..BuilderConfig::default()
        };
        let mut editor = Editor::new().with_config(config);
        let id = editor.create_element(ElementKind::SingleChoice, PropertyBag::new());
        editor.apply_property_change(id, "shakeOnWrong", true).unwrap();

        let el = editor.document().get_element(id).unwrap();
        assert_eq!(el.bool_prop("allowRetry"), Some(false));
    }

    #[test]
    fn test_structural_update_is_all_or_nothing() {
        let mut editor = Editor::new();
        let c1 = editor.create_element(ElementKind::Container, PropertyBag::new());
        let c2 = editor.create_element(ElementKind::Container, PropertyBag::new());
        let zone = editor.create_element(
            ElementKind::DragDropWidget,
            PropertyBag::new().with("maxItems", 1),
        );
        let held = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        let img = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        editor
            .apply_structural_update(c1, StructuralUpdate::default().children(vec![img]))
            .unwrap();
        editor
            .apply_structural_update(held, StructuralUpdate::default().attach_to(zone, None))
            .unwrap();

        // Move succeeds on its own, but the attach fails, so neither applies.
        let err = editor
            .apply_structural_update(
                img,
                StructuralUpdate::default()
                    .move_to(Some(c2), 0)
                    .attach_to(zone, None)
                    .properties(PropertyBag::new().with("width", 10)),
            )
            .unwrap_err();

        assert!(matches!(err, BuilderError::CapacityExceeded { .. }));
        let doc = editor.document();
        assert_eq!(doc.parent_of(img), Some(c1));
        assert_eq!(doc.items_of(zone), vec![held]);
        assert_eq!(doc.get_element(img).unwrap().number_prop("width"), Some(200.0));
    }

    #[test]
    fn test_compound_move_and_attach() {
        let mut editor = Editor::new();
        let c = editor.create_element(ElementKind::Container, PropertyBag::new());
        let zone = editor.create_element(ElementKind::DragDropWidget, PropertyBag::new());
        let img = editor.create_element(
            ElementKind::StandaloneImage,
            PropertyBag::new().with("x", 30).with("y", 40),
        );

        editor
            .apply_structural_update(
                img,
                StructuralUpdate::default()
                    .move_to(Some(c), 0)
                    .attach_to(zone, Some(Point::new(30.0, 40.0)))
                    .properties(PropertyBag::new().with("x", 300).with("y", 10)),
            )
            .unwrap();

        let doc = editor.document();
        assert_eq!(doc.parent_of(img), Some(c));
        assert_eq!(doc.owner_of(img), Some(zone));
        assert!(doc.check_integrity().is_ok());

        let restored = editor.release_standalone(img).unwrap();
        assert_eq!(restored, Some(Point::new(30.0, 40.0)));
        let el = editor.document().get_element(img).unwrap();
        assert_eq!(el.number_prop("x"), Some(30.0));
        assert_eq!(editor.document().owner_of(img), None);
    }

    #[test]
    fn test_single_choice_scenario() {
        let mut editor = Editor::new();
        let id = editor.create_element(
            ElementKind::SingleChoice,
            PropertyBag::new().with("options", options(&[("A", true), ("B", false)])),
        );
        editor.mount_widget(id).unwrap();

        let first = editor.submit_answer(id, &Response::Choice(1)).unwrap();
        assert_eq!(first, SubmitOutcome::Graded { correct: false, locked: false });

        editor.retry_widget(id).unwrap();
        let second = editor.submit_answer(id, &Response::Choice(0)).unwrap();
        assert_eq!(second, SubmitOutcome::Graded { correct: true, locked: false });
        assert_eq!(editor.widget_state(id).unwrap().attempts_used, 1);
        assert_eq!(editor.feedback(id).unwrap().message.as_deref(), Some("Correct!"));
    }

    #[test]
    fn test_retry_budget_scenario() {
        let mut editor = Editor::new();
        let id = editor.create_element(
            ElementKind::FillInBlanks,
            PropertyBag::new()
                .with("allowRetry", true)
                .with("maxAttempts", 2)
                .with("blanks", PropertyValue::List(vec!["Apples".into()])),
        );
        let wrong = Response::Texts(vec!["pears".into()]);

        editor.submit_answer(id, &wrong).unwrap();
        editor.retry_widget(id).unwrap();
        editor.submit_answer(id, &wrong).unwrap();
        editor.retry_widget(id).unwrap();

        assert_eq!(editor.widget_state(id).unwrap().phase(), GradingPhase::Locked);
        let third = editor
            .submit_answer(id, &Response::Texts(vec!["apples".into()]))
            .unwrap();
        assert_eq!(third, SubmitOutcome::Rejected(RejectReason::Locked));
    }

    #[test]
    fn test_capacity_scenario() {
        let mut editor = Editor::new();
        let zone = editor.create_element(
            ElementKind::DragDropWidget,
            PropertyBag::new().with("maxItems", 1),
        );
        let first = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());
        let second = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());

        editor
            .apply_structural_update(first, StructuralUpdate::default().attach_to(zone, None))
            .unwrap();
        let err = editor
            .apply_structural_update(second, StructuralUpdate::default().attach_to(zone, None))
            .unwrap_err();

        assert!(matches!(err, BuilderError::CapacityExceeded { max_items: 1, .. }));
        assert_eq!(editor.document().items_of(zone), vec![first]);
    }

    #[test]
    fn test_asset_pick_round_trip() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::StandaloneImage, PropertyBag::new());

        let ticket = editor.request_asset(id, "src").unwrap();
        editor
            .complete_asset_pick(
                ticket.request_id(),
                AssetSelection::new("https://cdn.example/dog.png").with_alt("A dog"),
            )
            .unwrap();

        let el = editor.document().get_element(id).unwrap();
        assert_eq!(el.text_prop("src"), Some("https://cdn.example/dog.png"));
        assert_eq!(el.text_prop("srcAlt"), Some("A dog"));

        // A second completion of the same session is stale.
        let again = editor.complete_asset_pick(ticket.request_id(), AssetSelection::new("x"));
        assert!(again.unwrap_err().is_not_found());
    }

    #[test]
    fn test_asset_pick_for_deleted_element_is_dropped() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::Image, PropertyBag::new());
        let ticket = editor.request_asset(id, "src").unwrap();

        editor.delete_element(id).unwrap();
        assert_eq!(editor.pending_asset_picks(), 0);

        let result = editor.complete_asset_pick(ticket.request_id(), AssetSelection::new("late.png"));
        assert!(result.unwrap_err().is_not_found());
        assert!(editor.document().is_empty());
    }

    #[test]
    fn test_alt_key_resolution() {
        assert_eq!(alt_key_for(ElementKind::ImageComparison, "leftSrc").as_deref(), Some("leftSrcAlt"));
        assert_eq!(alt_key_for(ElementKind::Image, "src").as_deref(), Some("alt"));
        assert_eq!(alt_key_for(ElementKind::Audio, "src"), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut editor = Editor::new();
        let id = editor.create_element(ElementKind::TextStatement, PropertyBag::new());
        editor.select(Some(id)).unwrap();
        editor.submit_answer(id, &Response::Boolean(false)).unwrap();

        let json = serde_json::to_value(editor.snapshot()).unwrap();
        assert_eq!(json["selected"], serde_json::json!(id.to_string()));
        assert_eq!(json["runtime"][id.to_string()]["lastCorrect"], serde_json::json!(false));
    }
}
