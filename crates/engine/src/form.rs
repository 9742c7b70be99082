//! The form engine: owns per-field state, validates on every change, and
//! reports `(values, is_valid)` to a listener.
//!
//! All work happens synchronously on the caller's thread in response to an
//! edit. Each mutation re-validates only the edited field, then recomputes the
//! aggregate and notifies the listener before returning.
//!
//! Visible errors and aggregate validity are tracked separately: a field's
//! error appears only once it has been edited (or after [`FormEngine::validate_all`]),
//! while [`FormEngine::is_valid`] always evaluates every editable field. A
//! required field left untouched therefore keeps the form invalid without
//! showing an error.

use std::collections::HashSet;
use std::fmt;

use formkit_types::{FieldDescriptor, FieldType, FormField, FormValues};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::control::ControlSpec;
use crate::error::FormError;
use crate::field_state::{FieldInput, FieldState, option_position};
use crate::text_buffer::TextBuffer;
use crate::validation::stringify_value;

/// Receives the consolidated form state after every change.
pub trait FormChangeListener {
    fn on_change(&mut self, values: &FormValues, is_valid: bool);
}

impl<F> FormChangeListener for F
where
    F: FnMut(&FormValues, bool),
{
    fn on_change(&mut self, values: &FormValues, is_valid: bool) {
        self(values, is_valid)
    }
}

pub struct FormEngine {
    states: IndexMap<String, FieldState>,
    values: FormValues,
    errors: IndexMap<String, String>,
    enabled: bool,
    listener: Box<dyn FormChangeListener>,
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("fields", &self.states.keys().collect::<Vec<_>>())
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl FormEngine {
    /// Builds a form over `fields`, seeding values from `initial_values` and
    /// then from each field's default.
    ///
    /// Fails when a field id is empty or repeated. Construction does not
    /// notify the listener.
    pub fn new<L>(fields: Vec<FormField>, initial_values: &FormValues, enabled: bool, listener: L) -> Result<Self, FormError>
    where
        L: FormChangeListener + 'static,
    {
        let states = build_states(fields, initial_values)?;
        let mut engine = Self {
            states,
            values: FormValues::new(),
            errors: IndexMap::new(),
            enabled,
            listener: Box::new(listener),
        };
        engine.refresh_values();
        debug!(fields = engine.states.len(), enabled, "Built form state");
        Ok(engine)
    }

    /// Normalizes raw descriptors of either shape and builds the form.
    pub fn from_descriptors<L>(
        descriptors: &[FieldDescriptor],
        initial_values: &FormValues,
        enabled: bool,
        listener: L,
    ) -> Result<Self, FormError>
    where
        L: FormChangeListener + 'static,
    {
        let fields = descriptors.iter().map(FieldDescriptor::normalize).collect();
        Self::new(fields, initial_values, enabled, listener)
    }

    /// Builds a form whose changes are not observed.
    pub fn without_listener(fields: Vec<FormField>, initial_values: &FormValues) -> Result<Self, FormError> {
        Self::new(fields, initial_values, true, |_: &FormValues, _: bool| {})
    }

    /// Discards all state and rebuilds it for a new field list or new initial values.
    ///
    /// The previous buffers are released before the new state is installed.
    /// On error the existing state is left untouched.
    pub fn rebuild(&mut self, fields: Vec<FormField>, initial_values: &FormValues) -> Result<(), FormError> {
        let states = build_states(fields, initial_values)?;
        self.dispose();
        self.states = states;
        self.errors.clear();
        self.refresh_values();
        debug!(fields = self.states.len(), "Rebuilt form state");
        Ok(())
    }

    /// Releases every edit buffer. Called automatically on drop.
    pub fn dispose(&mut self) {
        for state in self.states.values_mut() {
            state.dispose();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.states.values().map(FieldState::field)
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.states.get(id).map(FieldState::field)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Visible validation errors, keyed by field id.
    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.states.get(id).is_some_and(FieldState::is_touched)
    }

    pub fn buffer(&self, id: &str) -> Option<&TextBuffer> {
        self.states.get(id).and_then(FieldState::buffer)
    }

    /// True when every editable field's current value passes validation,
    /// whether or not it has been edited.
    pub fn is_valid(&self) -> bool {
        self.states
            .values()
            .filter(|state| state.field().field_type.is_supported())
            .all(|state| state.validate().is_none())
    }

    /// Replaces the text of a text-backed field.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), FormError> {
        self.edit_text(id, |buffer| buffer.replace(text))
    }

    pub fn insert_char(&mut self, id: &str, c: char) -> Result<(), FormError> {
        self.edit_text(id, |buffer| buffer.insert_char(c))
    }

    pub fn backspace(&mut self, id: &str) -> Result<(), FormError> {
        self.edit_text(id, |buffer| {
            buffer.backspace();
        })
    }

    /// Applies an arbitrary edit to a text-backed field's buffer, then
    /// converts, validates and publishes the result.
    pub fn edit_text<F: FnOnce(&mut TextBuffer)>(&mut self, id: &str, edit: F) -> Result<(), FormError> {
        let state = self.editable_state(id)?;
        if state.edit_buffer(edit).is_none() {
            return Err(kind_mismatch(state.field(), "text"));
        }
        self.commit(id);
        Ok(())
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), FormError> {
        let state = self.editable_state(id)?;
        if state.field().field_type != FieldType::Boolean {
            return Err(kind_mismatch(state.field(), "boolean"));
        }
        state.set_value(Value::Bool(checked));
        self.commit(id);
        Ok(())
    }

    /// Flips a checkbox; an unset checkbox becomes checked.
    pub fn toggle(&mut self, id: &str) -> Result<(), FormError> {
        let checked = match self.states.get(id) {
            Some(state) => state.checked().unwrap_or(false),
            None => return Err(FormError::unknown_field(id)),
        };
        self.set_checked(id, !checked)
    }

    /// Selects the dropdown option at `index`.
    pub fn select_option(&mut self, id: &str, index: usize) -> Result<(), FormError> {
        let state = self.editable_state(id)?;
        if state.field().field_type != FieldType::Select {
            return Err(kind_mismatch(state.field(), "select"));
        }
        let Some(option) = state.field().options.get(index) else {
            return Err(FormError::invalid_option(id, format!("#{}", index)));
        };
        let value = option.value.clone();
        state.set_value(value);
        self.commit(id);
        Ok(())
    }

    /// Selects the dropdown option whose value (or its text) equals `value`.
    pub fn select_value(&mut self, id: &str, value: &Value) -> Result<(), FormError> {
        let state = self.editable_state(id)?;
        if state.field().field_type != FieldType::Select {
            return Err(kind_mismatch(state.field(), "select"));
        }
        match option_position(&state.field().options, value) {
            Some(index) => self.select_option(id, index),
            None => Err(FormError::invalid_option(id, stringify_value(value))),
        }
    }

    /// Sets a field's value directly, regardless of control kind.
    ///
    /// Select fields only accept one of their options and boolean fields only
    /// accept booleans. `Value::Null` clears any field back to unset.
    pub fn set_value(&mut self, id: &str, value: Value) -> Result<(), FormError> {
        let state = self.editable_state(id)?;
        if value.is_null() {
            state.clear();
            self.commit(id);
            return Ok(());
        }
        let field_type = state.field().field_type.clone();
        match field_type {
            FieldType::Select => self.select_value(id, &value),
            FieldType::Boolean => match value {
                Value::Bool(checked) => self.set_checked(id, checked),
                _ => Err(kind_mismatch(state.field(), "non-boolean")),
            },
            _ => {
                state.set_value(value);
                self.commit(id);
                Ok(())
            }
        }
    }

    /// Validates every field, surfaces all errors and notifies the listener.
    ///
    /// Intended for submit: untouched required fields report their errors here.
    pub fn validate_all(&mut self) -> bool {
        let ids: Vec<String> = self.states.keys().cloned().collect();
        for id in &ids {
            if let Some(state) = self.states.get_mut(id) {
                state.mark_touched();
            }
            self.record_error(id);
        }
        let is_valid = self.is_valid();
        debug!(is_valid, errors = self.errors.len(), "Validated all fields");
        self.listener.on_change(&self.values, is_valid);
        is_valid
    }

    /// Render descriptions for every field in declaration order.
    pub fn controls(&self) -> Vec<ControlSpec> {
        self.states
            .iter()
            .map(|(id, state)| ControlSpec::build(state, self.error(id), self.enabled))
            .collect()
    }

    pub fn control(&self, id: &str) -> Option<ControlSpec> {
        self.states
            .get(id)
            .map(|state| ControlSpec::build(state, self.error(id), self.enabled))
    }

    fn editable_state(&mut self, id: &str) -> Result<&mut FieldState, FormError> {
        if !self.states.contains_key(id) {
            return Err(FormError::unknown_field(id));
        }
        if !self.enabled {
            return Err(FormError::disabled(id));
        }
        let state = self.states.get_mut(id).ok_or_else(|| FormError::unknown_field(id))?;
        if let FieldInput::Inert = state.input() {
            return Err(FormError::NotEditable {
                id: id.to_string(),
                field_type: state.field().field_type.to_string(),
            });
        }
        Ok(state)
    }

    /// Marks the field touched, re-validates it and publishes the new aggregate.
    fn commit(&mut self, id: &str) {
        if let Some(state) = self.states.get_mut(id) {
            state.mark_touched();
        }
        self.record_error(id);
        self.refresh_values();
        let is_valid = self.is_valid();
        trace!(field = id, error = self.error(id), is_valid, "Field changed");
        self.listener.on_change(&self.values, is_valid);
    }

    fn record_error(&mut self, id: &str) {
        let message = self
            .states
            .get(id)
            .filter(|state| state.field().field_type.is_supported())
            .and_then(FieldState::validate);
        match message {
            Some(message) => {
                self.errors.insert(id.to_string(), message);
            }
            None => {
                self.errors.shift_remove(id);
            }
        }
    }

    fn refresh_values(&mut self) {
        self.values = self
            .states
            .iter()
            .filter_map(|(id, state)| state.value().map(|value| (id.clone(), value.clone())))
            .collect();
    }
}

impl Drop for FormEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn build_states(fields: Vec<FormField>, initial_values: &FormValues) -> Result<IndexMap<String, FieldState>, FormError> {
    let mut seen = HashSet::new();
    let mut states = IndexMap::with_capacity(fields.len());
    for (index, field) in fields.into_iter().enumerate() {
        if field.id.trim().is_empty() {
            return Err(FormError::EmptyFieldId { index });
        }
        if !seen.insert(field.id.clone()) {
            return Err(FormError::DuplicateFieldId { id: field.id });
        }
        let initial = initial_values.get(&field.id);
        states.insert(field.id.clone(), FieldState::new(field, initial));
    }
    Ok(states)
}

fn kind_mismatch(field: &FormField, requested: &'static str) -> FormError {
    FormError::KindMismatch {
        id: field.id.clone(),
        actual: field.field_type.to_string(),
        requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_types::{FieldOption, FieldValidation};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<(FormValues, bool)>>>;

    fn recording_engine(fields: Vec<FormField>, initial: FormValues) -> (FormEngine, Events) {
        let events: Events = Rc::default();
        let sink = Rc::clone(&events);
        let engine = FormEngine::new(fields, &initial, true, move |values: &FormValues, is_valid: bool| {
            sink.borrow_mut().push((values.clone(), is_valid));
        })
        .expect("build form");
        (engine, events)
    }

    fn region_field() -> FormField {
        FormField::new("region", FieldType::Select)
            .with_options(vec![FieldOption::new("us", "United States"), FieldOption::new("eu", "Europe")])
            .mark_required()
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        let duplicate = vec![FormField::new("a", FieldType::Text), FormField::new("a", FieldType::Email)];
        assert_eq!(
            FormEngine::without_listener(duplicate, &FormValues::new()).unwrap_err(),
            FormError::DuplicateFieldId { id: "a".into() }
        );

        let empty = vec![FormField::new("a", FieldType::Text), FormField::new(" ", FieldType::Text)];
        assert_eq!(
            FormEngine::without_listener(empty, &FormValues::new()).unwrap_err(),
            FormError::EmptyFieldId { index: 1 }
        );
    }

    #[test]
    fn every_keystroke_notifies_listener() {
        let (mut engine, events) = recording_engine(vec![FormField::new("name", FieldType::Text)], FormValues::new());
        engine.insert_char("name", 'h').unwrap();
        engine.insert_char("name", 'i').unwrap();
        engine.backspace("name").unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].0.get("name"), Some(&json!("hi")));
        assert_eq!(events[2].0.get("name"), Some(&json!("h")));
        assert!(events.iter().all(|(_, valid)| *valid));
    }

    #[test]
    fn required_select_blocks_validity_until_chosen() {
        let (mut engine, events) = recording_engine(vec![region_field()], FormValues::new());
        assert!(!engine.is_valid());
        assert!(engine.errors().is_empty());

        engine.select_option("region", 1).unwrap();
        assert!(engine.is_valid());
        assert_eq!(engine.value("region"), Some(&json!("eu")));
        assert_eq!(events.borrow().last().map(|(_, valid)| *valid), Some(true));
    }

    #[test]
    fn select_rejects_values_outside_options() {
        let (mut engine, events) = recording_engine(vec![region_field()], FormValues::new());
        assert_eq!(
            engine.select_value("region", &json!("ap")).unwrap_err(),
            FormError::invalid_option("region", "ap")
        );
        assert!(engine.select_option("region", 7).is_err());
        assert!(events.borrow().is_empty());

        engine.set_value("region", json!("us")).unwrap();
        assert_eq!(engine.control("region").map(|spec| spec.kind), Some(crate::control::ControlKind::Dropdown {
            options: region_field().options,
            selected: Some(0),
        }));
    }

    #[test]
    fn toggle_flips_checkbox() {
        let (mut engine, _) = recording_engine(vec![FormField::new("debug", FieldType::Boolean)], FormValues::new());
        assert!(engine.value("debug").is_none());
        engine.toggle("debug").unwrap();
        assert_eq!(engine.value("debug"), Some(&json!(true)));
        engine.toggle("debug").unwrap();
        assert_eq!(engine.value("debug"), Some(&json!(false)));
    }

    #[test]
    fn kind_mismatches_are_reported() {
        let (mut engine, _) = recording_engine(
            vec![FormField::new("debug", FieldType::Boolean), FormField::new("name", FieldType::Text)],
            FormValues::new(),
        );
        assert!(matches!(engine.set_text("debug", "yes"), Err(FormError::KindMismatch { .. })));
        assert!(matches!(engine.toggle("name"), Err(FormError::KindMismatch { .. })));
        assert!(matches!(engine.set_value("debug", json!("yes")), Err(FormError::KindMismatch { .. })));
        assert_eq!(engine.set_text("missing", "x").unwrap_err(), FormError::unknown_field("missing"));
    }

    #[test]
    fn disabled_form_rejects_edits() {
        let (mut engine, events) = recording_engine(vec![FormField::new("name", FieldType::Text)], FormValues::new());
        engine.set_enabled(false);
        assert_eq!(engine.set_text("name", "x").unwrap_err(), FormError::disabled("name"));
        assert!(engine.controls().iter().all(|spec| !spec.editable));
        assert!(events.borrow().is_empty());

        engine.set_enabled(true);
        assert!(engine.is_enabled());
    }

    #[test]
    fn unsupported_fields_are_inert_and_ignored_by_validity() {
        let (mut engine, _) = recording_engine(
            vec![FormField::new("tint", FieldType::Unsupported("color".into())).mark_required()],
            FormValues::new(),
        );
        assert!(engine.is_valid());
        assert!(matches!(engine.set_value("tint", json!("#fff")), Err(FormError::NotEditable { .. })));
        assert!(engine.validate_all());
        assert!(engine.errors().is_empty());
    }

    #[test]
    fn validate_all_surfaces_untouched_errors() {
        let fields = vec![
            FormField::new("name", FieldType::Text).mark_required(),
            FormField::new("port", FieldType::Number).with_validation(FieldValidation {
                min: Some(1.0),
                max: Some(65535.0),
                ..Default::default()
            }),
        ];
        let (mut engine, events) = recording_engine(fields, FormValues::from([("port".to_string(), json!(0))]));
        assert!(!engine.validate_all());
        assert_eq!(engine.error("name"), Some("name is required"));
        assert_eq!(engine.error("port"), Some("port must be at least 1"));
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn rebuild_replaces_state() {
        let (mut engine, _) = recording_engine(vec![FormField::new("name", FieldType::Text).mark_required()], FormValues::new());
        engine.set_text("name", "").unwrap();
        assert!(engine.error("name").is_some());

        engine
            .rebuild(
                vec![FormField::new("url", FieldType::Url)],
                &FormValues::from([("url".to_string(), json!("https://example.com"))]),
            )
            .unwrap();
        assert!(engine.errors().is_empty());
        assert!(engine.field("name").is_none());
        assert_eq!(engine.value("url"), Some(&json!("https://example.com")));
        assert!(!engine.is_touched("url"));
    }

    #[test]
    fn failed_rebuild_keeps_previous_state() {
        let (mut engine, _) = recording_engine(vec![FormField::new("name", FieldType::Text)], FormValues::new());
        let duplicate = vec![FormField::new("a", FieldType::Text), FormField::new("a", FieldType::Text)];
        assert!(engine.rebuild(duplicate, &FormValues::new()).is_err());
        assert!(engine.field("name").is_some());
    }

    #[test]
    fn dispose_releases_buffers() {
        let (mut engine, _) = recording_engine(
            vec![FormField::new("token", FieldType::Password)],
            FormValues::from([("token".to_string(), json!("s3cr3t"))]),
        );
        engine.dispose();
        assert_eq!(engine.buffer("token").map(TextBuffer::text), Some(""));
    }

    #[test]
    fn values_keep_declaration_order() {
        let (mut engine, _) = recording_engine(
            vec![FormField::new("first", FieldType::Text), FormField::new("second", FieldType::Text)],
            FormValues::from([("second".to_string(), json!("b"))]),
        );
        engine.set_text("first", "a").unwrap();
        let keys: Vec<&str> = engine.values().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn seeded_select_outside_options_stays_unset() {
        let (mut engine, _) = recording_engine(vec![region_field()], FormValues::from([("region".to_string(), json!("ap"))]));
        assert!(engine.value("region").is_none());
        assert!(!engine.values().contains_key("region"));
        assert!(!engine.is_valid());
        assert_eq!(engine.control("region").map(|spec| spec.kind), Some(crate::control::ControlKind::Dropdown {
            options: region_field().options,
            selected: None,
        }));

        assert!(!engine.validate_all());
        assert_eq!(engine.error("region"), Some("region is required"));
    }

    #[test]
    fn seeded_select_publishes_the_option_value() {
        let field = FormField::new("workers", FieldType::Select)
            .with_options(vec![FieldOption::new(1, "One"), FieldOption::new(2, "Two")]);
        let (engine, _) = recording_engine(vec![field], FormValues::from([("workers".to_string(), json!("2"))]));
        assert_eq!(engine.value("workers"), Some(&json!(2)));
    }

    #[test]
    fn non_boolean_seed_leaves_checkbox_unset() {
        let debug = FormField::new("debug", FieldType::Boolean).mark_required();
        for seed in [json!("yes"), json!(1)] {
            let (engine, _) = recording_engine(vec![debug.clone()], FormValues::from([("debug".to_string(), seed)]));
            assert!(engine.value("debug").is_none());
            assert!(!engine.is_valid());
            assert_eq!(
                engine.control("debug").map(|spec| spec.kind),
                Some(crate::control::ControlKind::Checkbox { checked: false })
            );
        }

        let (engine, _) = recording_engine(vec![debug], FormValues::from([("debug".to_string(), json!("False"))]));
        assert_eq!(engine.value("debug"), Some(&json!(false)));
    }

    #[test]
    fn null_clears_fields_back_to_unset() {
        let (mut engine, events) = recording_engine(
            vec![FormField::new("name", FieldType::Text), region_field(), FormField::new("debug", FieldType::Boolean)],
            FormValues::from([
                ("name".to_string(), json!("x")),
                ("region".to_string(), json!("eu")),
                ("debug".to_string(), json!(true)),
            ]),
        );
        for id in ["name", "region", "debug"] {
            engine.set_value(id, Value::Null).unwrap();
            assert!(!engine.values().contains_key(id), "{} should be absent", id);
        }
        assert_eq!(engine.buffer("name").map(TextBuffer::text), Some(""));
        assert!(matches!(
            engine.control("region").map(|spec| spec.kind),
            Some(crate::control::ControlKind::Dropdown { selected: None, .. })
        ));
        assert!(events.borrow().iter().all(|(values, _)| values.values().all(|value| !value.is_null())));
    }
}
