use crate::cli::utils::{output_view, Console};
use crate::cli::OutputFormat;
use crate::error::ConsoleError;
use crate::screens::dashboard::Dashboard;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open(output_format)?;
    console.require_token()?;

    let user = console
        .auth()
        .verify()
        .await
        .ok_or(ConsoleError::SessionExpired)?;
    let mut dashboard = Dashboard::new(Some(&user.name));
    dashboard.load_counts(&console.api).await;

    output_view(&output_format, &dashboard.to_string(), &serde_json::to_value(&dashboard)?)
}
