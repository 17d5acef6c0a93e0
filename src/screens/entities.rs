//! The seven admin resources wired into [`EntityScreen`](super::EntityScreen).

use serde_json::Value;

use super::{row_id, select_options, Entity, FormContext, OptionSets};
use crate::api::models::{AccessLevel, Group, MenuRecord, Permission, PowerBiReport, SqlReport, UserRecord};
use crate::api::resources::Resource;
use crate::form::schema::{FieldRule, Schema};
use crate::form::{FieldKind, FormField, FormValues, SelectOption};
use crate::menu::icon::ICON_CHOICES;
use crate::table::sort::display_value;
use crate::table::{Column, ListView, Row, RowActionKind};
use crate::types::routes;

const NAME_REQUIRED: &str = "Name is required";
const ORDER_REQUIRED: &str = "Order is required";

/// Cell text cut to `max` characters with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn text(row: &Row, key: &str) -> String {
    display_value(row.get(key))
}

fn name_and_description(name_placeholder: &str, description_placeholder: &str) -> Vec<FormField> {
    vec![
        FormField::new("nome", "Name", FieldKind::Text)
            .placeholder(name_placeholder)
            .required(),
        FormField::new("descricao", "Description", FieldKind::Textarea)
            .placeholder(description_placeholder),
    ]
}

fn name_and_description_schema() -> Schema {
    Schema::new()
        .field("nome", FieldRule::string().min(1, NAME_REQUIRED))
        .field("descricao", FieldRule::string().optional())
}

fn id_name_description() -> Vec<Column> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("nome", "Name").sortable(),
        Column::new("descricao", "Description"),
    ]
}

pub struct Users;

impl Entity for Users {
    type Record = UserRecord;

    const RESOURCE: Resource = Resource::Users;
    const SINGULAR: &'static str = "User";
    const TITLE: &'static str = "Users";
    const ROUTE: &'static str = routes::USERS;
    const NUMERIC_FIELDS: &'static [&'static str] = &["grupo_id"];
    const OPTION_SOURCES: &'static [Resource] = &[Resource::Groups];

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("nome", "Name").sortable(),
            Column::new("email", "Email").sortable(),
            Column::new("ativo", "Status").with_render(|value, _, _| {
                if value.as_bool() == Some(true) { "Active" } else { "Inactive" }.to_string()
            }),
            Column::new("grupos", "Groups").with_render(|value, _, _| match value {
                Value::Array(groups) => groups
                    .iter()
                    .map(|g| format!("[{}]", display_value(Some(g))))
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => String::new(),
            }),
        ]
    }

    fn fields(ctx: &FormContext<'_>) -> Vec<FormField> {
        let editing = ctx.is_editing();
        let mut password = FormField::new(
            "senha",
            if editing { "Password (leave blank to keep)" } else { "Password" },
            FieldKind::Password,
        )
        .placeholder("••••••");
        if !editing {
            password = password.required();
        }
        vec![
            FormField::new("nome", "Name", FieldKind::Text)
                .placeholder("Full name")
                .required(),
            FormField::new("email", "Email", FieldKind::Email)
                .placeholder("user@company.com")
                .required(),
            password,
            FormField::new("grupo_id", "Group", FieldKind::Select)
                .placeholder("Select a group")
                .options(select_options(ctx.rows(Resource::Groups)))
                .required(),
            FormField::new("ativo", "Active", FieldKind::Switch),
        ]
    }

    fn schema(editing: bool) -> Schema {
        let password = if editing {
            FieldRule::string().optional()
        } else {
            FieldRule::string().min(6, "Password must have at least 6 characters")
        };
        Schema::new()
            .field("nome", FieldRule::string().min(1, NAME_REQUIRED))
            .field("email", FieldRule::string().email("Invalid email"))
            .field("senha", password)
            .field("ativo", FieldRule::boolean().default(true))
            .field("grupo_id", FieldRule::string().min(1, "Select at least one group"))
    }

    fn create_defaults() -> FormValues {
        let mut values = FormValues::new();
        values.insert("ativo".into(), Value::Bool(true));
        values
    }

    /// Preselect the first group the user already belongs to
    fn adjust_defaults(values: &mut FormValues, record: Option<&Row>, options: &OptionSets) {
        let Some(record) = record else { return };
        if values.contains_key("grupo_id") {
            return;
        }
        let Some(Value::Array(names)) = record.get("grupos") else { return };
        let groups = options.get(&Resource::Groups).map(Vec::as_slice).unwrap_or(&[]);
        let first = names.iter().find_map(|name| {
            groups
                .iter()
                .find(|g| g.get("nome") == Some(name))
                .and_then(row_id)
        });
        if let Some(id) = first {
            values.insert("grupo_id".into(), Value::String(id.to_string()));
        }
    }

    fn prepare(payload: &mut FormValues, editing: bool) {
        let blank = matches!(payload.get("senha"), Some(Value::String(s)) if s.is_empty());
        if editing && blank {
            payload.remove("senha");
        }
    }
}

pub struct Groups;

impl Entity for Groups {
    type Record = Group;

    const RESOURCE: Resource = Resource::Groups;
    const SINGULAR: &'static str = "Group";
    const TITLE: &'static str = "Groups";
    const ROUTE: &'static str = routes::GROUPS;

    fn columns() -> Vec<Column> {
        id_name_description()
    }

    fn fields(_ctx: &FormContext<'_>) -> Vec<FormField> {
        name_and_description("Group name", "Group description")
    }

    fn schema(_editing: bool) -> Schema {
        name_and_description_schema()
    }
}

pub struct AccessLevels;

impl Entity for AccessLevels {
    type Record = AccessLevel;

    const RESOURCE: Resource = Resource::AccessLevels;
    const SINGULAR: &'static str = "Access Level";
    const TITLE: &'static str = "Access Levels";
    const ROUTE: &'static str = routes::ACCESS_LEVELS;

    fn columns() -> Vec<Column> {
        id_name_description()
    }

    fn fields(_ctx: &FormContext<'_>) -> Vec<FormField> {
        name_and_description("Access level name", "Access level description")
    }

    fn schema(_editing: bool) -> Schema {
        name_and_description_schema()
    }
}

pub struct Menus;

/// Entries that only group submenus: no route, or a bare `#`
fn is_grouping_menu(row: &Row) -> bool {
    matches!(row.get("rota"), None | Some(Value::Null))
        || matches!(row.get("rota"), Some(Value::String(r)) if r.is_empty() || r == "#")
}

impl Entity for Menus {
    type Record = MenuRecord;

    const RESOURCE: Resource = Resource::Menus;
    const SINGULAR: &'static str = "Menu";
    const TITLE: &'static str = "Menus";
    const ROUTE: &'static str = routes::MENUS;
    const NUMERIC_FIELDS: &'static [&'static str] = &["paiId", "ordem"];
    const OPTION_SOURCES: &'static [Resource] = &[Resource::Menus];

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("nome", "Name").sortable(),
            Column::new("rota", "Route"),
            Column::new("icone", "Icon"),
            Column::new("paiNome", "Parent Menu").sortable(),
            Column::new("ordem", "Order").sortable(),
        ]
    }

    fn fields(ctx: &FormContext<'_>) -> Vec<FormField> {
        let editing_id = ctx.editing.and_then(row_id);
        let parents: Vec<Row> = ctx
            .rows(Resource::Menus)
            .iter()
            .filter(|m| is_grouping_menu(m) && row_id(m) != editing_id)
            .cloned()
            .collect();
        let mut parent_options = vec![SelectOption::new("", "None")];
        parent_options.extend(select_options(&parents));

        let icons = ICON_CHOICES
            .iter()
            .map(|(value, label)| SelectOption::new(*value, *label))
            .collect();

        vec![
            FormField::new("nome", "Name", FieldKind::Text)
                .placeholder("Menu name")
                .required(),
            FormField::new("rota", "Route", FieldKind::Text)
                .placeholder("Example: /dashboard (leave blank for menus with submenus)"),
            FormField::new("icone", "Icon", FieldKind::Select)
                .options(icons)
                .required(),
            FormField::new("paiId", "Parent Menu", FieldKind::Select).options(parent_options),
            FormField::new("ordem", "Order", FieldKind::Number)
                .placeholder("Display order")
                .required(),
        ]
    }

    fn schema(_editing: bool) -> Schema {
        Schema::new()
            .field("nome", FieldRule::string().min(1, NAME_REQUIRED))
            .field("rota", FieldRule::string().optional())
            .field("icone", FieldRule::string().min(1, "Icon is required"))
            .field("paiId", FieldRule::string().optional())
            .field("ordem", FieldRule::string().min(1, ORDER_REQUIRED))
    }

    fn create_defaults() -> FormValues {
        let mut values = FormValues::new();
        values.insert("ordem".into(), Value::String("1".into()));
        values.insert("icone".into(), Value::String("home".into()));
        values.insert("paiId".into(), Value::String(String::new()));
        values
    }

    fn delete_blocked(row: &Row, rows: &[Row]) -> Option<String> {
        let id = row_id(row)?;
        rows.iter()
            .any(|m| m.get("paiId").and_then(Value::as_i64) == Some(id))
            .then(|| "This menu has submenus. Remove the submenus before deleting it.".to_string())
    }

    /// Parent names come from the list itself
    fn decorate(rows: &mut [Row], _options: &OptionSets) {
        let names: Vec<(i64, String)> = rows
            .iter()
            .filter_map(|r| Some((row_id(r)?, text(r, "nome"))))
            .collect();
        for row in rows.iter_mut() {
            let parent = row
                .get("paiId")
                .and_then(Value::as_i64)
                .and_then(|pid| names.iter().find(|(id, _)| *id == pid))
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "None".to_string());
            row.insert("paiNome".into(), Value::String(parent));
        }
    }
}

pub struct Permissions;

fn name_in(options: &OptionSets, resource: Resource, id: Option<i64>) -> Option<String> {
    let id = id?;
    options
        .get(&resource)?
        .iter()
        .find(|r| row_id(r) == Some(id))
        .map(|r| text(r, "nome"))
}

impl Entity for Permissions {
    type Record = Permission;

    const RESOURCE: Resource = Resource::Permissions;
    const SINGULAR: &'static str = "Permission";
    const TITLE: &'static str = "Permissions";
    const ROUTE: &'static str = routes::PERMISSIONS;
    const NUMERIC_FIELDS: &'static [&'static str] = &["menuId", "grupoId", "nivelAcessoId"];
    const OPTION_SOURCES: &'static [Resource] =
        &[Resource::Menus, Resource::Groups, Resource::AccessLevels];

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("menuNome", "Menu").sortable(),
            Column::new("grupoNome", "Group").sortable(),
            Column::new("nivelAcessoNome", "Access Level")
                .sortable()
                .with_render(|value, _, _| format!("[{}]", display_value(Some(value)))),
        ]
    }

    fn fields(ctx: &FormContext<'_>) -> Vec<FormField> {
        vec![
            FormField::new("menuId", "Menu", FieldKind::Select)
                .options(select_options(ctx.rows(Resource::Menus)))
                .required(),
            FormField::new("grupoId", "Group", FieldKind::Select)
                .options(select_options(ctx.rows(Resource::Groups)))
                .required(),
            FormField::new("nivelAcessoId", "Access Level", FieldKind::Select)
                .options(select_options(ctx.rows(Resource::AccessLevels)))
                .required(),
        ]
    }

    fn schema(_editing: bool) -> Schema {
        Schema::new()
            .field("menuId", FieldRule::string().min(1, "Menu is required"))
            .field("grupoId", FieldRule::string().min(1, "Group is required"))
            .field("nivelAcessoId", FieldRule::string().min(1, "Access level is required"))
    }

    fn display_name(row: &Row) -> String {
        format!("{} / {}", text(row, "menuNome"), text(row, "grupoNome"))
    }

    /// One permission per menu and group
    fn conflict(payload: &FormValues, editing: Option<i64>, rows: &[Row]) -> Option<String> {
        if editing.is_some() {
            return None;
        }
        let menu = payload.get("menuId").and_then(Value::as_i64);
        let group = payload.get("grupoId").and_then(Value::as_i64);
        rows.iter()
            .any(|p| {
                p.get("menuId").and_then(Value::as_i64) == menu
                    && p.get("grupoId").and_then(Value::as_i64) == group
            })
            .then(|| "A permission for this menu and group already exists.".to_string())
    }

    /// Fill missing names from the option lists
    fn decorate(rows: &mut [Row], options: &OptionSets) {
        let pairs = [
            ("menuId", "menuNome", Resource::Menus),
            ("grupoId", "grupoNome", Resource::Groups),
            ("nivelAcessoId", "nivelAcessoNome", Resource::AccessLevels),
        ];
        for row in rows.iter_mut() {
            for (id_key, name_key, resource) in pairs {
                let known = matches!(row.get(name_key), Some(Value::String(s)) if !s.is_empty());
                if known {
                    continue;
                }
                let id = row.get(id_key).and_then(Value::as_i64);
                if let Some(name) = name_in(options, resource, id) {
                    row.insert(name_key.into(), Value::String(name));
                }
            }
        }
    }
}

pub struct PowerBiReports;

impl Entity for PowerBiReports {
    type Record = PowerBiReport;

    const RESOURCE: Resource = Resource::PowerBiReports;
    const SINGULAR: &'static str = "Report";
    const TITLE: &'static str = "Power BI Reports";
    const ROUTE: &'static str = routes::POWERBI_REPORTS;
    const NUMERIC_FIELDS: &'static [&'static str] = &["ordem"];

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("nome", "Name").sortable(),
            Column::new("descricao", "Description"),
            Column::new("url", "URL").with_render(|value, _, _| truncate(&display_value(Some(value)), 40)),
            Column::new("ordem", "Order").sortable(),
        ]
    }

    fn row_actions(view: ListView) -> ListView {
        view.with_action(RowActionKind::View)
            .with_action(RowActionKind::Edit)
            .with_action(RowActionKind::Delete)
    }

    fn fields(_ctx: &FormContext<'_>) -> Vec<FormField> {
        vec![
            FormField::new("nome", "Name", FieldKind::Text)
                .placeholder("Report name")
                .required(),
            FormField::new("url", "URL", FieldKind::Text)
                .placeholder("https://app.powerbi.com/reportEmbed?reportId=123")
                .required(),
            FormField::new("descricao", "Description", FieldKind::Textarea)
                .placeholder("Report description"),
            FormField::new("ordem", "Order", FieldKind::Number)
                .placeholder("Display order")
                .required(),
        ]
    }

    fn schema(_editing: bool) -> Schema {
        Schema::new()
            .field("nome", FieldRule::string().min(1, NAME_REQUIRED))
            .field("url", FieldRule::string().url("Invalid URL").min(1, "URL is required"))
            .field("descricao", FieldRule::string().optional())
            .field("ordem", FieldRule::string().min(1, ORDER_REQUIRED))
    }

    fn create_defaults() -> FormValues {
        let mut values = FormValues::new();
        values.insert("ordem".into(), Value::String("1".into()));
        values
    }

    fn view_route(id: i64) -> Option<String> {
        Some(routes::powerbi_report_view(id))
    }
}

pub struct SqlReports;

impl Entity for SqlReports {
    type Record = SqlReport;

    const RESOURCE: Resource = Resource::SqlReports;
    const SINGULAR: &'static str = "Report";
    const TITLE: &'static str = "SQL Reports";
    const ROUTE: &'static str = routes::SQL_REPORTS;
    const NUMERIC_FIELDS: &'static [&'static str] = &["ordem"];

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", "ID").sortable(),
            Column::new("nome", "Name").sortable(),
            Column::new("descricao", "Description"),
            Column::new("sql", "SQL").with_render(|value, _, _| truncate(&display_value(Some(value)), 40)),
            Column::new("ordem", "Order").sortable(),
        ]
    }

    fn row_actions(view: ListView) -> ListView {
        view.with_action(RowActionKind::View)
            .with_action(RowActionKind::Edit)
            .with_action(RowActionKind::Delete)
    }

    fn fields(_ctx: &FormContext<'_>) -> Vec<FormField> {
        vec![
            FormField::new("nome", "Name", FieldKind::Text)
                .placeholder("Report name")
                .required(),
            FormField::new("descricao", "Description", FieldKind::Textarea)
                .placeholder("Report description"),
            FormField::new("sql", "SQL", FieldKind::Textarea)
                .placeholder("SELECT column1, column2 FROM table WHERE condition")
                .required(),
            FormField::new("ordem", "Order", FieldKind::Number)
                .placeholder("Display order")
                .required(),
        ]
    }

    fn schema(_editing: bool) -> Schema {
        Schema::new()
            .field("nome", FieldRule::string().min(1, NAME_REQUIRED))
            .field("descricao", FieldRule::string().optional())
            .field("sql", FieldRule::string().min(1, "SQL is required"))
            .field("ordem", FieldRule::string().min(1, ORDER_REQUIRED))
    }

    fn create_defaults() -> FormValues {
        let mut values = FormValues::new();
        values.insert("ordem".into(), Value::String("1".into()));
        values
    }

    fn view_route(id: i64) -> Option<String> {
        Some(routes::sql_report_view(id))
    }
}
