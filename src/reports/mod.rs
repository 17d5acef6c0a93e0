//! Report viewers: the embedded Power BI page and the SQL report runner.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::models::{PowerBiReport, SqlReport, SqlReportResult};
use crate::api::resources::Resource;
use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::notify::{Notifier, Toast};
use crate::table::export::{self, Cell};
use crate::table::pagination::{Pagination, DEFAULT_ITEMS_PER_PAGE};
use crate::table::{Column, ListView};
use crate::types::routes;

/// A viewer either opens or sends the user back to its list
#[derive(Debug)]
pub enum ReportOutcome<T> {
    Ready(T),
    Redirect { route: &'static str, error: ConsoleError },
}

impl<T> ReportOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ReportOutcome::Ready(view) => Some(view),
            ReportOutcome::Redirect { .. } => None,
        }
    }

    /// Turn a redirect back into its cause
    pub fn into_result(self) -> Result<T> {
        match self {
            ReportOutcome::Ready(view) => Ok(view),
            ReportOutcome::Redirect { error, .. } => Err(error),
        }
    }
}

async fn fetch_or_redirect<T: serde::de::DeserializeOwned>(
    api: &ApiClient,
    resource: Resource,
    id: i64,
    back: &'static str,
) -> ReportOutcome<T> {
    match api.fetch::<T>(resource, id).await {
        Ok(report) => ReportOutcome::Ready(report),
        Err(error) => {
            let message = match &error {
                ConsoleError::NotFound(_) => "Report not found",
                _ => "Could not load the report",
            };
            tracing::warn!(%resource, id, "report unavailable: {}", error);
            api.notifier().notify(Toast::error(message));
            ReportOutcome::Redirect { route: back, error }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedDescriptor {
    pub src: String,
    pub title: String,
    pub fullscreen: bool,
}

#[derive(Debug, Clone)]
pub struct EmbeddedReportView {
    report: PowerBiReport,
}

impl EmbeddedReportView {
    pub async fn load(api: &ApiClient, id: i64) -> ReportOutcome<Self> {
        match fetch_or_redirect(api, Resource::PowerBiReports, id, routes::POWERBI_REPORTS).await {
            ReportOutcome::Ready(report) => ReportOutcome::Ready(Self::new(report)),
            ReportOutcome::Redirect { route, error } => ReportOutcome::Redirect { route, error },
        }
    }

    pub fn new(report: PowerBiReport) -> Self {
        if url::Url::parse(&report.url).is_err() {
            tracing::warn!(id = report.id, url = %report.url, "report url does not parse");
        }
        Self { report }
    }

    pub fn report(&self) -> &PowerBiReport {
        &self.report
    }

    pub fn embed(&self) -> EmbedDescriptor {
        EmbedDescriptor {
            src: self.report.url.clone(),
            title: self.report.name.clone(),
            fullscreen: true,
        }
    }

    pub fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.report.name.clone()),
            ("Description", self.report.description.clone().unwrap_or_default()),
            ("URL", self.report.url.clone()),
            ("Order", self.report.order.to_string()),
        ]
    }

    pub fn back_route(&self) -> &'static str {
        routes::POWERBI_REPORTS
    }
}

impl fmt::Display for EmbeddedReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.report.name)?;
        for (label, value) in self.details() {
            writeln!(f, "  {}: {}", label, value)?;
        }
        writeln!(f, "  Embed: {} (fullscreen)", self.report.url)
    }
}

pub const NO_DATA_MESSAGE: &str = "No data to export";

#[derive(Debug, Clone)]
pub struct SqlReportView {
    report: SqlReport,
    result: Option<SqlReportResult>,
    table: ListView,
}

impl SqlReportView {
    /// Fetch the report, then run it. A failed run keeps the view open
    /// with no result.
    pub async fn load(api: &ApiClient, id: i64) -> ReportOutcome<Self> {
        let report = match fetch_or_redirect(api, Resource::SqlReports, id, routes::SQL_REPORTS).await {
            ReportOutcome::Ready(report) => report,
            ReportOutcome::Redirect { route, error } => return ReportOutcome::Redirect { route, error },
        };
        let mut view = Self::new(report);
        // failure already toasted
        let _ = view.run(api).await;
        ReportOutcome::Ready(view)
    }

    pub fn new(report: SqlReport) -> Self {
        Self {
            report,
            result: None,
            table: ListView::new(Vec::new())
                .exportable(false)
                .with_pagination(Pagination::per_page(DEFAULT_ITEMS_PER_PAGE)),
        }
    }

    pub fn report(&self) -> &SqlReport {
        &self.report
    }

    pub fn result(&self) -> Option<&SqlReportResult> {
        self.result.as_ref()
    }

    pub fn table(&self) -> &ListView {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ListView {
        &mut self.table
    }

    pub async fn run(&mut self, api: &ApiClient) -> Result<()> {
        match api.execute_sql_report(self.report.id).await {
            Ok(result) => {
                tracing::info!(id = self.report.id, rows = result.rows.len(), "sql report executed");
                self.set_result(result);
                Ok(())
            }
            Err(e) => {
                tracing::error!(id = self.report.id, "sql report failed: {}", e);
                api.notifier().notify(Toast::error("Could not run the report"));
                Err(e)
            }
        }
    }

    /// Columns come from the result header, in order
    pub fn set_result(&mut self, result: SqlReportResult) {
        let columns = result
            .columns
            .iter()
            .map(|name| Column::new(name.clone(), name.clone()).sortable())
            .collect();
        let pagination = self.table.pagination.clone();
        self.table = ListView::new(columns)
            .exportable(false)
            .with_pagination(Pagination {
                current_page: 1,
                ..pagination
            })
            .with_rows(result.rows.clone());
        self.result = Some(result);
    }

    pub fn file_name(&self) -> String {
        let name: String = self
            .report
            .name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}.csv", name)
    }

    /// Strings quoted, numbers bare
    pub fn to_csv(&self) -> Result<String> {
        let result = self
            .result
            .as_ref()
            .filter(|r| !r.is_empty())
            .ok_or(ConsoleError::NoData)?;
        let rows = result.rows.iter().map(|row| {
            result
                .columns
                .iter()
                .map(|c| Cell::from_value(row.get(c)))
                .collect::<Vec<_>>()
        });
        export::to_csv(&result.columns, rows)
    }

    pub fn export_to(&self, dir: &Path, notifier: &dyn Notifier) -> Result<PathBuf> {
        let content = match self.to_csv() {
            Ok(content) => content,
            Err(ConsoleError::NoData) => {
                notifier.notify(Toast::error(NO_DATA_MESSAGE));
                return Err(ConsoleError::NoData);
            }
            Err(e) => return Err(e),
        };
        let path = export::write_file(dir, &self.file_name(), &content)?;
        notifier.notify(Toast::success("Export complete", "The data was exported successfully."));
        Ok(path)
    }

    pub fn back_route(&self) -> &'static str {
        routes::SQL_REPORTS
    }
}

impl fmt::Display for SqlReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.report.name)?;
        if let Some(description) = &self.report.description {
            writeln!(f, "{}", description)?;
        }
        writeln!(f)?;
        match &self.result {
            Some(_) => f.write_str(&self.table.render()),
            None => writeln!(f, "Report has not produced a result"),
        }
    }
}
