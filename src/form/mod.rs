//! Generic form generator: field descriptors, current values, schema-gated
//! submission and a text rendering of the widgets.

pub mod schema;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::{ConsoleError, Result};
use schema::Validate;

pub type FormValues = Map<String, Value>;
pub type FieldErrors = BTreeMap<String, String>;

pub const DEFAULT_SUBMIT_LABEL: &str = "Save";
pub const DEFAULT_CANCEL_LABEL: &str = "Cancel";
pub const BUSY_LABEL: &str = "Processing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Email,
    Password,
    Textarea,
    Select,
    Checkbox,
    Switch,
}

impl FieldKind {
    pub fn is_toggle(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Switch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub options: Vec<SelectOption>,
    pub required: bool,
    pub disabled: bool,
    pub hidden: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            placeholder: None,
            options: Vec::new(),
            required: false,
            disabled: false,
            hidden: false,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

#[derive(Clone)]
pub struct Form {
    fields: Vec<FormField>,
    values: FormValues,
    errors: FieldErrors,
    schema: Option<Arc<dyn Validate>>,
    loading: bool,
    submit_label: String,
    cancel_label: Option<String>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            values: FormValues::new(),
            errors: FieldErrors::new(),
            schema: None,
            loading: false,
            submit_label: DEFAULT_SUBMIT_LABEL.to_string(),
            cancel_label: Some(DEFAULT_CANCEL_LABEL.to_string()),
        }
    }

    pub fn with_schema(mut self, schema: impl Validate + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    pub fn with_defaults(mut self, defaults: FormValues) -> Self {
        self.reset(defaults);
        self
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// `None` drops the cancel button
    pub fn cancel_label(mut self, label: Option<String>) -> Self {
        self.cancel_label = label;
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_input_disabled(&self, field: &FormField) -> bool {
        field.disabled || self.loading
    }

    pub fn buttons_disabled(&self) -> bool {
        self.loading
    }

    pub fn submit_button_label(&self) -> &str {
        if self.loading {
            BUSY_LABEL
        } else {
            &self.submit_label
        }
    }

    /// Edit one input. Refused for unknown or disabled fields and while
    /// loading.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let editable = self
            .field(name)
            .is_some_and(|field| !self.is_input_disabled(field));
        if editable {
            self.values.insert(name.to_string(), value);
        }
        editable
    }

    /// Replace every value with `defaults` and clear errors
    pub fn reset(&mut self, defaults: FormValues) {
        self.values = defaults;
        self.errors.clear();
    }

    /// Run the schema over the current values. Errors stay on the form for
    /// rendering.
    pub fn validate(&mut self) -> Result<FormValues> {
        if self.loading {
            return Err(ConsoleError::Refused("form is already submitting".into()));
        }
        let Some(schema) = &self.schema else {
            self.errors.clear();
            return Ok(self.values.clone());
        };
        match schema.validate(&self.values) {
            Ok(values) => {
                self.errors.clear();
                Ok(values)
            }
            Err(errors) => {
                tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "form rejected");
                self.errors = errors.clone();
                Err(ConsoleError::Validation(errors))
            }
        }
    }

    /// Validate, then hand the values to `handler` with the form marked
    /// busy until it finishes.
    pub async fn submit_with<F, Fut, T>(&mut self, handler: F) -> Result<T>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let values = self.validate()?;
        self.loading = true;
        let outcome = handler(values).await;
        self.loading = false;
        outcome
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for field in self.fields.iter().filter(|f| !f.hidden) {
            let marker = if field.required { " *" } else { "" };
            let widget = self.widget(field);
            let disabled = if self.is_input_disabled(field) { " (disabled)" } else { "" };
            out.push_str(&format!("{}{}: {}{}\n", field.label, marker, widget, disabled));
            if let Some(error) = self.error(&field.name) {
                out.push_str(&format!("  ! {}\n", error));
            }
        }

        let mut buttons = Vec::new();
        if let Some(cancel) = &self.cancel_label {
            buttons.push(format!("[{}]", cancel));
        }
        buttons.push(format!("[{}]", self.submit_button_label()));
        out.push_str(&buttons.join(" "));
        if self.buttons_disabled() {
            out.push_str(" (disabled)");
        }
        out.push('\n');
        out
    }

    fn widget(&self, field: &FormField) -> String {
        let value = self.values.get(&field.name).filter(|v| !v.is_null());
        match field.kind {
            FieldKind::Checkbox => {
                let on = value.and_then(Value::as_bool).unwrap_or(false);
                if on { "[x]" } else { "[ ]" }.to_string()
            }
            FieldKind::Switch => {
                let on = value.and_then(Value::as_bool).unwrap_or(false);
                if on { "(on)" } else { "(off)" }.to_string()
            }
            FieldKind::Password => match value {
                Some(Value::String(s)) if !s.is_empty() => "[••••••]".to_string(),
                _ => self.empty_input(field),
            },
            FieldKind::Select => {
                let selected = value.map(value_text);
                let label = selected.as_deref().and_then(|v| {
                    field.options.iter().find(|o| o.value == v).map(|o| o.label.clone())
                });
                let choices: Vec<&str> = field.options.iter().map(|o| o.label.as_str()).collect();
                match label {
                    Some(label) => format!("<{}>", label),
                    None => format!("<{}> ({})", field.placeholder.as_deref().unwrap_or(""), choices.join(" | ")),
                }
            }
            _ => match value {
                Some(v) => format!("[{}]", value_text(v)),
                None => self.empty_input(field),
            },
        }
    }

    fn empty_input(&self, field: &FormField) -> String {
        match &field.placeholder {
            Some(p) => format!("[] ({})", p),
            None => "[]".to_string(),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields.len())
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("loading", &self.loading)
            .finish()
    }
}
