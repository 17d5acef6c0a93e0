//! Generic list view over JSON rows: column descriptors, row actions,
//! sorting, pagination and CSV export.

pub mod export;
pub mod pagination;
pub mod sort;

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConsoleError, Result};
use crate::notify::{Notifier, Toast};
use export::Cell;
use pagination::Pagination;
use sort::{display_value, sorted_indices, SortConfig};

pub type Row = Map<String, Value>;
pub type CellRender = Arc<dyn Fn(&Value, &Row, usize) -> String + Send + Sync>;
pub type RowPredicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

pub const EMPTY_MESSAGE: &str = "No data found";

#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub header: String,
    /// Display-only; export always uses the raw value
    pub render: Option<CellRender>,
    pub sortable: bool,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            render: None,
            sortable: false,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &Row, usize) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Text for one cell. Absent keys render as empty text.
    pub fn cell(&self, row: &Row, index: usize) -> String {
        match &self.render {
            Some(render) => {
                let value = row.get(&self.key).cloned().unwrap_or(Value::String(String::new()));
                render(&value, row, index)
            }
            None => display_value(row.get(&self.key)),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("custom_render", &self.render.is_some())
            .field("sortable", &self.sortable)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowActionKind {
    View,
    Edit,
    Delete,
}

impl RowActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            RowActionKind::View => "view",
            RowActionKind::Edit => "edit",
            RowActionKind::Delete => "delete",
        }
    }
}

#[derive(Clone)]
pub struct RowAction {
    pub kind: RowActionKind,
    pub visible: Option<RowPredicate>,
}

impl RowAction {
    pub fn is_visible(&self, row: &Row) -> bool {
        self.visible.as_ref().map_or(true, |pred| pred(row))
    }
}

#[derive(Clone)]
pub struct ListView {
    columns: Vec<Column>,
    rows: Vec<Row>,
    actions: Vec<RowAction>,
    has_add: bool,
    exportable: bool,
    sort: Option<SortConfig>,
    pub pagination: Pagination,
}

impl ListView {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            actions: Vec::new(),
            has_add: false,
            exportable: true,
            sort: None,
            pagination: Pagination::default(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_action(mut self, kind: RowActionKind) -> Self {
        self.actions.push(RowAction { kind, visible: None });
        self
    }

    pub fn with_action_when<F>(mut self, kind: RowActionKind, visible: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        self.actions.push(RowAction {
            kind,
            visible: Some(Arc::new(visible)),
        });
        self
    }

    pub fn with_add(mut self) -> Self {
        self.has_add = true;
        self
    }

    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_add(&self) -> bool {
        self.has_add
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    pub fn sort_config(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    /// Header click. Returns false when the column is unknown or not
    /// sortable.
    pub fn handle_sort(&mut self, key: &str) -> bool {
        let sortable = self.columns.iter().any(|c| c.key == key && c.sortable);
        if !sortable {
            return false;
        }
        let next = SortConfig::next(self.sort.as_ref(), key);
        tracing::debug!(key, direction = ?next.direction, "sort");
        self.sort = Some(next);
        true
    }

    /// Every row index in sorted order
    pub fn display_order(&self) -> Vec<usize> {
        sorted_indices(&self.rows, self.sort.as_ref())
    }

    /// Row indices on the current page
    pub fn page_indices(&self) -> Vec<usize> {
        let order = self.display_order();
        let window = self.pagination.window(order.len());
        order[window].to_vec()
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        self.page_indices().into_iter().map(|i| &self.rows[i]).collect()
    }

    pub fn visible_actions(&self, row: &Row) -> Vec<RowActionKind> {
        self.actions
            .iter()
            .filter(|a| a.is_visible(row))
            .map(|a| a.kind)
            .collect()
    }

    /// Trigger an action on the row at `position` of the current page.
    /// Hidden actions and positions off the page yield nothing.
    pub fn activate(&self, kind: RowActionKind, position: usize) -> Option<&Row> {
        let index = *self.page_indices().get(position)?;
        let row = &self.rows[index];
        let action = self.actions.iter().find(|a| a.kind == kind)?;
        action.is_visible(row).then_some(row)
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next(self.rows.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous(self.rows.len())
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.pagination.go_to(page, self.rows.len())
    }

    /// Whole dataset in load order, one quoted text cell per column
    pub fn export_csv(&self) -> Result<String> {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        let rows = self.rows.iter().map(|row| {
            self.columns
                .iter()
                .map(|c| Cell::Text(display_value(row.get(&c.key))))
                .collect::<Vec<_>>()
        });
        export::to_csv(&headers, rows)
    }

    /// Write the export file and announce it
    pub fn export_to(&self, dir: &Path, file_name: &str, notifier: &dyn Notifier) -> Result<PathBuf> {
        if !self.exportable {
            return Err(ConsoleError::Refused("export is disabled for this list".into()));
        }
        let content = self.export_csv()?;
        let path = export::write_file(dir, file_name, &content)?;
        notifier.notify(Toast::success(
            "Export complete",
            "The data was exported successfully.",
        ));
        Ok(path)
    }

    pub fn render(&self) -> String {
        let page = self.page_indices();
        let with_actions = !self.actions.is_empty();

        let mut header: Vec<String> = self
            .columns
            .iter()
            .map(|c| match &self.sort {
                Some(s) if c.sortable && s.key == c.key => format!("{} {}", c.header, s.direction.marker()),
                _ => c.header.clone(),
            })
            .collect();
        if with_actions {
            header.push("Actions".to_string());
        }

        let body: Vec<Vec<String>> = page
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                let row = &self.rows[index];
                let mut cells: Vec<String> = self.columns.iter().map(|c| c.cell(row, position)).collect();
                if with_actions {
                    let actions: Vec<&str> = self.visible_actions(row).iter().map(|a| a.label()).collect();
                    cells.push(actions.join(" "));
                }
                cells
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for cells in &body {
            for (w, cell) in widths.iter_mut().zip(cells) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let mut toolbar = Vec::new();
        if self.has_add {
            toolbar.push("[+ Add]");
        }
        if self.exportable {
            toolbar.push("[Export CSV]");
        }
        if !toolbar.is_empty() {
            out.push_str(&toolbar.join(" "));
            out.push('\n');
        }

        out.push_str(&format_line(&header, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format_line(&rule, &widths));
        if body.is_empty() {
            out.push_str(EMPTY_MESSAGE);
            out.push('\n');
        }
        for cells in &body {
            out.push_str(&format_line(cells, &widths));
        }

        let total_rows = self.rows.len();
        if self.pagination.shows_controls(total_rows) {
            let prev = if self.pagination.has_previous() { "<" } else { " " };
            let next = if self.pagination.has_next(total_rows) { ">" } else { " " };
            out.push_str(&format!(
                "{}  {} {} {}\n",
                self.pagination.summary(body.len(), total_rows),
                prev,
                self.pagination.page_label(total_rows),
                next
            ));
        }
        out
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .finish()
    }
}

/// Rows from any serializable records; non-objects are skipped
pub fn rows_from<T: Serialize>(records: &[T]) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if let Value::Object(map) = serde_json::to_value(record)? {
            rows.push(map);
        }
    }
    Ok(rows)
}
