use clap::Subcommand;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cli::utils::{output_empty_collection, output_success, output_view, parse_fields, Console};
use crate::cli::OutputFormat;
use crate::error::ConsoleError;
use crate::screens::{Entity, EntityScreen};
use crate::table::sort::display_value;
use crate::table::Row;

/// The same verbs for every admin resource
#[derive(Subcommand)]
pub enum EntityCommands {
    #[command(about = "List records")]
    List {
        #[arg(long, help = "Column key to sort by")]
        sort: Option<String>,
        #[arg(long, help = "Sort descending", requires = "sort")]
        desc: bool,
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: usize,
        #[arg(long, help = "Rows per page")]
        per_page: Option<usize>,
        #[arg(long, help = "Write every record to a CSV file")]
        export: bool,
        #[arg(long, value_name = "FILE", help = "CSV file path (default: export dir / export.csv)")]
        out: Option<PathBuf>,
    },

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Record ID")]
        id: i64,
    },

    #[command(about = "Print the create form, or the edit form for an ID")]
    Form {
        #[arg(help = "Record ID to edit")]
        id: Option<i64>,
    },

    #[command(about = "Create a record")]
    Create {
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", help = "Field value (repeatable)")]
        fields: Vec<String>,
    },

    #[command(about = "Update a record")]
    Update {
        #[arg(help = "Record ID")]
        id: i64,
        #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", help = "Field value (repeatable)")]
        fields: Vec<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID")]
        id: i64,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle<E: Entity>(cmd: EntityCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open(output_format)?;
    console.require_token()?;

    match cmd {
        EntityCommands::List {
            sort,
            desc,
            page,
            per_page,
            export,
            out,
        } => {
            let per_page = per_page.unwrap_or(console.config.list.items_per_page);
            let mut screen = EntityScreen::<E>::new(console.api.clone()).with_items_per_page(per_page);
            screen.load().await?;

            if let Some(key) = sort {
                let list = screen.list_mut();
                if !list.handle_sort(&key) {
                    return Err(anyhow::anyhow!("Column '{}' is not sortable", key));
                }
                if desc {
                    list.handle_sort(&key);
                }
            }

            if page != 1 && !screen.list_mut().go_to_page(page) {
                return Err(anyhow::anyhow!("Page {} does not exist", page));
            }

            if export {
                let (dir, name) = export_target(&console, out);
                let path = screen
                    .list()
                    .export_to(&dir, &name, console.api.notifier().as_ref())?;
                return output_success(
                    &output_format,
                    &format!("Exported {} records to {}", screen.rows().len(), path.display()),
                    Some(json!({ "path": path, "count": screen.rows().len() })),
                );
            }

            if screen.rows().is_empty() {
                return output_empty_collection(&output_format, E::RESOURCE.path(), "No data found");
            }

            let list = screen.list();
            let text = format!("{}\n\n{}", E::TITLE, list.render());
            let data = json!({
                E::RESOURCE.path(): list.page_rows(),
                "page": list.pagination.current_page,
                "total_pages": list.pagination.total_pages(list.rows().len()),
                "total": list.rows().len(),
            });
            output_view(&output_format, &text, &data)
        }
        EntityCommands::Show { id } => {
            let mut screen = EntityScreen::<E>::new(console.api.clone());
            screen.load().await?;
            let row = screen
                .find(id)
                .ok_or_else(|| ConsoleError::NotFound(format!("{} {}", E::SINGULAR, id)))?;
            output_view(&output_format, &describe::<E>(row), &Value::Object(row.clone()))
        }
        EntityCommands::Form { id } => {
            let mut screen = EntityScreen::<E>::new(console.api.clone());
            screen.load().await?;
            let dialog = match id {
                Some(id) => screen.open_edit(id)?,
                None => screen.open_create(),
            };
            let text = format!("{}\n\n{}", dialog.title, dialog.form.render());
            let data = json!({
                "title": dialog.title,
                "fields": dialog.form.fields(),
                "values": dialog.form.values(),
            });
            output_view(&output_format, &text, &data)
        }
        EntityCommands::Create { fields } => {
            let values = parse_fields(&fields)?;
            let mut screen = EntityScreen::<E>::new(console.api.clone());
            screen.load().await?;
            screen.open_create();
            submit_form(&mut screen, values, &output_format).await
        }
        EntityCommands::Update { id, fields } => {
            let values = parse_fields(&fields)?;
            let mut screen = EntityScreen::<E>::new(console.api.clone());
            screen.load().await?;
            screen.open_edit(id)?;
            submit_form(&mut screen, values, &output_format).await
        }
        EntityCommands::Delete { id, yes } => {
            let mut screen = EntityScreen::<E>::new(console.api.clone());
            screen.load().await?;
            let dialog = screen.request_delete(id)?.clone();

            if !yes && !confirm(&dialog.message)? {
                screen.cancel_delete();
                return output_success(&output_format, "Cancelled", Some(json!({ "deleted": false })));
            }

            screen.confirm_delete().await?;
            output_success(
                &output_format,
                &format!("{} '{}' deleted", E::SINGULAR, dialog.name),
                Some(json!({ "deleted": true, "id": id })),
            )
        }
    }
}

async fn submit_form<E: Entity>(
    screen: &mut EntityScreen<E>,
    values: serde_json::Map<String, Value>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let Some(form) = screen.form_mut() else {
        return Err(anyhow::anyhow!("No form is open"));
    };
    for (key, value) in values {
        if !form.set(&key, value) {
            return Err(anyhow::anyhow!("Unknown or read-only field '{}'", key));
        }
    }

    match screen.submit().await {
        Ok(row) => output_success(
            output_format,
            &format!("{} '{}' saved", E::SINGULAR, E::display_name(&row)),
            Some(json!({ "record": row })),
        ),
        Err(ConsoleError::Validation(errors)) => {
            if *output_format == OutputFormat::Text {
                if let Some(dialog) = screen.form() {
                    eprint!("{}\n\n{}", dialog.title, dialog.form.render());
                }
            }
            Err(ConsoleError::Validation(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn describe<E: Entity>(row: &Row) -> String {
    let mut out = format!("{} {}\n", E::SINGULAR, E::display_name(row));
    let columns = E::columns();
    for column in &columns {
        out.push_str(&format!("  {}: {}\n", column.header, column.cell(row, 0)));
    }
    for (key, value) in row {
        if !columns.iter().any(|c| &c.key == key) {
            out.push_str(&format!("  {}: {}\n", key, display_value(Some(value))));
        }
    }
    out
}

fn export_target(console: &Console, out: Option<PathBuf>) -> (PathBuf, String) {
    let defaults = &console.config.export;
    let Some(path) = out else {
        return (defaults.output_dir.clone(), defaults.default_file_name.clone());
    };
    let dir = match path.parent() {
        Some(parent) if parent != Path::new("") => parent.to_path_buf(),
        _ => defaults.output_dir.clone(),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| defaults.default_file_name.clone());
    (dir, name)
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", message);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
