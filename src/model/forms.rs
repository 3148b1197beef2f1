//! Form state
//!
//! Field values keyed by the same names the validators report errors under,
//! plus the error map and which field has focus. Editing a field clears its
//! error; everything else is left alone until the next submit.

use std::collections::BTreeMap;

use crate::logic::ui::cycle_index;
use crate::logic::validators::FieldErrors;

#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    fields: Vec<&'static str>,
    values: BTreeMap<&'static str, String>,
    pub errors: FieldErrors,
    pub focus: usize,
    pub submitting: bool,
}

impl FormState {
    pub fn new(fields: &[&'static str]) -> Self {
        Self {
            fields: fields.to_vec(),
            values: fields.iter().map(|f| (*f, String::new())).collect(),
            errors: FieldErrors::new(),
            focus: 0,
            submitting: false,
        }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Replace a value and clear that field's error
    pub fn set(&mut self, field: &'static str, value: impl Into<String>) {
        self.values.insert(field, value.into());
        self.errors.remove(field);
    }

    pub fn error(&self, field: &str) -> Option<&'static str> {
        self.errors.get(field).copied()
    }

    pub fn focused(&self) -> &'static str {
        self.fields.get(self.focus).copied().unwrap_or("")
    }

    pub fn focus_next(&mut self) {
        self.focus = cycle_index(self.focus, self.fields.len(), true);
    }

    pub fn focus_prev(&mut self) {
        self.focus = cycle_index(self.focus, self.fields.len(), false);
    }

    pub fn insert_char(&mut self, c: char) {
        let field = self.focused();
        if field.is_empty() {
            return;
        }
        let mut value = self.value(field).to_string();
        value.push(c);
        self.set(field, value);
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        if field.is_empty() {
            return;
        }
        let mut value = self.value(field).to_string();
        value.pop();
        self.set(field, value);
    }

    /// Store validation results; focus moves to the first field with an error
    pub fn set_errors(&mut self, errors: FieldErrors) {
        if let Some(first) = self.fields.iter().position(|f| errors.contains_key(f)) {
            self.focus = first;
        }
        self.errors = errors;
    }

    pub fn reset(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.errors.clear();
        self.focus = 0;
        self.submitting = false;
    }
}
