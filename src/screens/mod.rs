//! CRUD screens. One generic [`EntityScreen`] drives the list, the form
//! dialog and the delete confirmation; each resource plugs in through the
//! [`Entity`] trait.

pub mod dashboard;
pub mod entities;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::api::resources::Resource;
use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::form::schema::Schema;
use crate::form::{FieldKind, Form, FormField, FormValues, SelectOption};
use crate::notify::Toast;
use crate::table::pagination::Pagination;
use crate::table::sort::display_value;
use crate::table::{rows_from, Column, ListView, Row, RowActionKind};
use crate::types::Operation;

/// Rows of every resource a form draws select options from
pub type OptionSets = HashMap<Resource, Vec<Row>>;

pub struct FormContext<'a> {
    pub editing: Option<&'a Row>,
    pub options: &'a OptionSets,
}

impl FormContext<'_> {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn rows(&self, resource: Resource) -> &[Row] {
        self.options.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub trait Entity: Send + Sync + 'static {
    /// Wire record, used to check and normalize what the server sends
    type Record: DeserializeOwned + Serialize + Send;

    const RESOURCE: Resource;
    const SINGULAR: &'static str;
    const TITLE: &'static str;
    const ROUTE: &'static str;
    /// Sent as numbers; an empty value goes out as null
    const NUMERIC_FIELDS: &'static [&'static str] = &[];
    const OPTION_SOURCES: &'static [Resource] = &[];

    fn columns() -> Vec<Column>;

    fn fields(ctx: &FormContext<'_>) -> Vec<FormField>;

    fn schema(editing: bool) -> Schema;

    fn row_actions(view: ListView) -> ListView {
        view.with_action(RowActionKind::Edit)
            .with_action(RowActionKind::Delete)
    }

    fn create_defaults() -> FormValues {
        FormValues::new()
    }

    fn adjust_defaults(_values: &mut FormValues, _record: Option<&Row>, _options: &OptionSets) {}

    fn display_name(row: &Row) -> String {
        display_value(row.get("nome"))
    }

    fn view_route(_id: i64) -> Option<String> {
        None
    }

    /// Reason a row may not be deleted
    fn delete_blocked(_row: &Row, _rows: &[Row]) -> Option<String> {
        None
    }

    /// Last edits to the outgoing payload
    fn prepare(_payload: &mut FormValues, _editing: bool) {}

    /// Reason a payload clashes with the loaded rows
    fn conflict(_payload: &FormValues, _editing: Option<i64>, _rows: &[Row]) -> Option<String> {
        None
    }

    /// Fill derived display columns
    fn decorate(_rows: &mut [Row], _options: &OptionSets) {}
}

#[derive(Debug)]
pub struct FormDialog {
    pub title: String,
    pub editing: Option<i64>,
    pub form: Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub id: i64,
    pub name: String,
    pub message: String,
}

/// What a row action led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Navigate(String),
    FormOpened,
    DeleteRequested,
    Ignored,
}

pub struct EntityScreen<E: Entity> {
    api: ApiClient,
    list: ListView,
    loading: bool,
    options: OptionSets,
    form: Option<FormDialog>,
    delete: Option<DeleteDialog>,
    _entity: PhantomData<E>,
}

impl<E: Entity> EntityScreen<E> {
    pub fn new(api: ApiClient) -> Self {
        let list = E::row_actions(ListView::new(E::columns()).with_add());
        Self {
            api,
            list,
            loading: false,
            options: OptionSets::new(),
            form: None,
            delete: None,
            _entity: PhantomData,
        }
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.list.pagination = Pagination::per_page(items_per_page);
        self
    }

    pub fn title(&self) -> &'static str {
        E::TITLE
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn rows(&self) -> &[Row] {
        self.list.rows()
    }

    pub fn options(&self) -> &OptionSets {
        &self.options
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: i64) -> Option<&Row> {
        self.rows().iter().find(|row| row_id(row) == Some(id))
    }

    /// Fetch the list and every option source together. On failure the
    /// current rows stay as they were.
    pub async fn load(&mut self) -> Result<()> {
        self.loading = true;
        let outcome = futures::future::try_join(self.fetch_rows(), self.fetch_options()).await;
        self.loading = false;

        match outcome {
            Ok((mut rows, options)) => {
                E::decorate(&mut rows, &options);
                tracing::info!(resource = %E::RESOURCE, count = rows.len(), "{}", Operation::Select.past_tense());
                self.options = options;
                self.list.set_rows(rows);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching {}: {}", E::RESOURCE, e);
                Err(e)
            }
        }
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        let records: Vec<E::Record> = self.api.list(E::RESOURCE).await?;
        rows_from(&records)
    }

    async fn fetch_options(&self) -> Result<OptionSets> {
        let fetched = try_join_all(E::OPTION_SOURCES.iter().map(|&resource| async move {
            let rows: Vec<Row> = self.api.list(resource).await?;
            Ok::<_, ConsoleError>((resource, rows))
        }))
        .await?;
        Ok(fetched.into_iter().collect())
    }

    pub fn open_create(&mut self) -> &FormDialog {
        let mut defaults = E::create_defaults();
        E::adjust_defaults(&mut defaults, None, &self.options);
        let ctx = FormContext {
            editing: None,
            options: &self.options,
        };
        let form = Form::new(E::fields(&ctx))
            .with_schema(E::schema(false))
            .with_defaults(defaults);
        self.form.insert(FormDialog {
            title: format!("Add {}", E::SINGULAR),
            editing: None,
            form,
        })
    }

    pub fn open_edit(&mut self, id: i64) -> Result<&FormDialog> {
        let record = self
            .find(id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(format!("{} {}", E::SINGULAR, id)))?;
        let ctx = FormContext {
            editing: Some(&record),
            options: &self.options,
        };
        let fields = E::fields(&ctx);
        let mut defaults = edit_defaults(&fields, &record);
        E::adjust_defaults(&mut defaults, Some(&record), &self.options);
        let form = Form::new(fields)
            .with_schema(E::schema(true))
            .with_defaults(defaults);
        Ok(self.form.insert(FormDialog {
            title: format!("Edit {}: {}", E::SINGULAR, E::display_name(&record)),
            editing: Some(id),
            form,
        }))
    }

    pub fn form(&self) -> Option<&FormDialog> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut().map(|dialog| &mut dialog.form)
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validate, send, merge the server's answer into the list and close
    /// the dialog. Any failure leaves the dialog open.
    pub async fn submit(&mut self) -> Result<Row> {
        let (editing, values) = {
            let dialog = self
                .form
                .as_mut()
                .ok_or_else(|| ConsoleError::Refused("no form is open".into()))?;
            (dialog.editing, dialog.form.validate()?)
        };

        let mut payload = to_payload(values, E::NUMERIC_FIELDS);
        E::prepare(&mut payload, editing.is_some());

        if let Some(reason) = E::conflict(&payload, editing, self.rows()) {
            self.api.notifier().notify(Toast::error(reason.clone()));
            return Err(ConsoleError::Refused(reason));
        }

        self.set_form_loading(true);
        let sent = match editing {
            Some(id) => self.api.update::<_, Value>(E::RESOURCE, id, &payload).await,
            None => self.api.create::<_, Value>(E::RESOURCE, &payload).await,
        };
        self.set_form_loading(false);
        let answer = sent?;

        let operation = if editing.is_some() { Operation::Update } else { Operation::Create };
        let row = self.merge(editing, payload, answer)?;
        let name = E::display_name(&row);
        tracing::info!(
            resource = %E::RESOURCE,
            method = %operation.http_method(),
            id = ?row_id(&row),
            "{}",
            operation.past_tense()
        );
        self.api.notifier().notify(Toast::success(
            format!("{} {}", E::SINGULAR, operation.past_tense()),
            format!("{} was {} successfully.", name, operation.past_tense()),
        ));
        self.form = None;
        Ok(row)
    }

    fn set_form_loading(&mut self, loading: bool) {
        if let Some(form) = self.form_mut() {
            form.set_loading(loading);
        }
    }

    fn merge(&mut self, editing: Option<i64>, payload: FormValues, answer: Value) -> Result<Row> {
        let returned = normalize::<E>(answer)?;
        let mut rows = self.list.rows().to_vec();

        let row = match editing {
            Some(id) => {
                let position = rows
                    .iter()
                    .position(|r| row_id(r) == Some(id))
                    .ok_or_else(|| ConsoleError::NotFound(format!("{} {}", E::SINGULAR, id)))?;
                let merged = &mut rows[position];
                merged.extend(payload);
                if let Some(returned) = returned {
                    merged.extend(returned);
                }
                position
            }
            None => {
                let mut created = payload;
                if let Some(returned) = returned {
                    created.extend(returned);
                }
                if !created.contains_key("id") {
                    let next = rows.iter().filter_map(row_id).max().unwrap_or(0) + 1;
                    created.insert("id".into(), Value::from(next));
                }
                rows.push(created);
                rows.len() - 1
            }
        };

        E::decorate(&mut rows, &self.options);
        let merged = rows[row].clone();
        self.list.set_rows(rows);
        Ok(merged)
    }

    /// Opens the confirmation dialog, unless the entity refuses the delete
    pub fn request_delete(&mut self, id: i64) -> Result<&DeleteDialog> {
        let row = self
            .find(id)
            .ok_or_else(|| ConsoleError::NotFound(format!("{} {}", E::SINGULAR, id)))?;
        if let Some(reason) = E::delete_blocked(row, self.rows()) {
            self.api.notifier().notify(Toast {
                title: "Cannot delete".to_string(),
                ..Toast::error(reason.clone())
            });
            return Err(ConsoleError::Refused(reason));
        }
        let name = E::display_name(row);
        Ok(self.delete.insert(DeleteDialog {
            id,
            message: format!(
                "Are you sure you want to delete the {} {}? This action cannot be undone.",
                E::SINGULAR.to_lowercase(),
                name
            ),
            name,
        }))
    }

    pub fn delete_dialog(&self) -> Option<&DeleteDialog> {
        self.delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.delete = None;
    }

    /// The dialog closes whatever the outcome
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let dialog = self
            .delete
            .take()
            .ok_or_else(|| ConsoleError::Refused("no delete is pending".into()))?;
        self.api.remove(E::RESOURCE, dialog.id).await?;

        let rows: Vec<Row> = self
            .rows()
            .iter()
            .filter(|r| row_id(r) != Some(dialog.id))
            .cloned()
            .collect();
        self.list.set_rows(rows);
        tracing::info!(resource = %E::RESOURCE, id = dialog.id, "{}", Operation::Delete.past_tense());
        self.api.notifier().notify(Toast::success(
            format!("{} {}", E::SINGULAR, Operation::Delete.past_tense()),
            format!("{} was deleted successfully.", dialog.name),
        ));
        Ok(())
    }

    /// Row action at `position` on the current page
    pub fn row_action(&mut self, kind: RowActionKind, position: usize) -> Result<RowOutcome> {
        let Some(id) = self.list.activate(kind, position).and_then(row_id) else {
            return Ok(RowOutcome::Ignored);
        };
        match kind {
            RowActionKind::View => Ok(E::view_route(id).map_or(RowOutcome::Ignored, RowOutcome::Navigate)),
            RowActionKind::Edit => self.open_edit(id).map(|_| RowOutcome::FormOpened),
            RowActionKind::Delete => self.request_delete(id).map(|_| RowOutcome::DeleteRequested),
        }
    }
}

pub fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

/// Select options from `{id, nome}` rows
pub fn select_options(rows: &[Row]) -> Vec<SelectOption> {
    rows.iter()
        .filter_map(|row| {
            let id = row_id(row)?;
            Some(SelectOption::new(id.to_string(), display_value(row.get("nome"))))
        })
        .collect()
}

/// Form values for an existing record: numbers become text, a null select
/// becomes the empty choice, passwords start blank.
pub fn edit_defaults(fields: &[FormField], record: &Row) -> FormValues {
    let mut values = FormValues::new();
    for field in fields {
        if field.kind == FieldKind::Password {
            continue;
        }
        let value = match (record.get(&field.name), field.kind) {
            (None, _) => continue,
            (Some(Value::Null), FieldKind::Select) => Value::String(String::new()),
            (Some(Value::Number(n)), _) => Value::String(n.to_string()),
            (Some(other), _) => other.clone(),
        };
        values.insert(field.name.clone(), value);
    }
    values
}

/// Numeric wire fields parsed from their text form
pub fn to_payload(mut values: FormValues, numeric: &[&str]) -> FormValues {
    for name in numeric {
        let Some(Value::String(text)) = values.get(*name) else {
            continue;
        };
        let text = text.trim();
        let parsed = if text.is_empty() {
            Value::Null
        } else if let Ok(n) = text.parse::<i64>() {
            Value::from(n)
        } else if let Ok(f) = text.parse::<f64>() {
            Value::from(f)
        } else {
            continue;
        };
        values.insert((*name).to_string(), parsed);
    }
    values
}

/// Decode the server's answer through the wire record so aliases land on
/// the canonical field names. Empty or partial answers are skipped and the
/// payload stands in for them.
fn normalize<E: Entity>(answer: Value) -> Result<Option<Row>> {
    if !answer.is_object() {
        return Ok(None);
    }
    let record: E::Record = match serde_json::from_value(answer) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!("server answer for {} not a full record: {}", E::RESOURCE, e);
            return Ok(None);
        }
    };
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_numbers() {
        let values = json!({"ordem": "3", "paiId": "", "nome": "Menus", "peso": "1.5"})
            .as_object()
            .cloned()
            .unwrap();
        let payload = to_payload(values, &["ordem", "paiId", "peso"]);
        assert_eq!(payload["ordem"], json!(3));
        assert_eq!(payload["paiId"], Value::Null);
        assert_eq!(payload["peso"], json!(1.5));
        assert_eq!(payload["nome"], json!("Menus"));
    }

    #[test]
    fn defaults_from_record() {
        let fields = vec![
            FormField::new("nome", "Name", FieldKind::Text),
            FormField::new("paiId", "Parent", FieldKind::Select),
            FormField::new("ordem", "Order", FieldKind::Number),
            FormField::new("senha", "Password", FieldKind::Password),
        ];
        let record = json!({"id": 6, "nome": "Menus", "paiId": null, "ordem": 4, "senha": "x"})
            .as_object()
            .cloned()
            .unwrap();
        let values = edit_defaults(&fields, &record);
        assert_eq!(values["paiId"], json!(""));
        assert_eq!(values["ordem"], json!("4"));
        assert!(!values.contains_key("senha"));
        assert!(!values.contains_key("id"));
    }
}
