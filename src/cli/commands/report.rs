use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::{output_success, output_view, Console};
use crate::cli::OutputFormat;
use crate::reports::{EmbeddedReportView, SqlReportView};

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Show the embed descriptor of a Power BI report")]
    Embed {
        #[arg(help = "Report ID")]
        id: i64,
    },

    #[command(about = "Run a SQL report")]
    Run {
        #[arg(help = "Report ID")]
        id: i64,
        #[arg(long, default_value_t = 1, help = "Page number")]
        page: usize,
        #[arg(long, help = "Column to sort by")]
        sort: Option<String>,
        #[arg(long, help = "Sort descending", requires = "sort")]
        desc: bool,
        #[arg(long, help = "Write the result to '<report name>.csv'")]
        export: bool,
        #[arg(long, value_name = "DIR", help = "Directory for the CSV (default: export dir)")]
        out_dir: Option<PathBuf>,
    },
}

pub async fn handle(cmd: ReportCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open(output_format)?;
    console.require_token()?;

    match cmd {
        ReportCommands::Embed { id } => {
            let view = EmbeddedReportView::load(&console.api, id).await.into_result()?;
            let data = json!({
                "embed": view.embed(),
                "report": view.report(),
            });
            output_view(&output_format, &view.to_string(), &data)
        }
        ReportCommands::Run {
            id,
            page,
            sort,
            desc,
            export,
            out_dir,
        } => {
            let mut view = SqlReportView::load(&console.api, id).await.into_result()?;
            if view.result().is_none() {
                return Err(anyhow::anyhow!("Report {} could not be run", id));
            }

            if export {
                let dir = out_dir.unwrap_or_else(|| console.config.export.output_dir.clone());
                let path = view.export_to(&dir, console.api.notifier().as_ref())?;
                return output_success(
                    &output_format,
                    &format!("Exported {} to {}", view.report().name, path.display()),
                    Some(json!({ "path": path })),
                );
            }

            let table = view.table_mut();
            if let Some(key) = sort {
                if !table.handle_sort(&key) {
                    return Err(anyhow::anyhow!("Report has no column '{}'", key));
                }
                if desc {
                    table.handle_sort(&key);
                }
            }
            if page != 1 && !table.go_to_page(page) {
                return Err(anyhow::anyhow!("Page {} does not exist", page));
            }

            let table = view.table();
            let data = json!({
                "report": view.report(),
                "columns": view.result().map(|r| &r.columns),
                "rows": table.page_rows(),
                "page": table.pagination.current_page,
                "total": table.rows().len(),
            });
            output_view(&output_format, &view.to_string(), &data)
        }
    }
}
