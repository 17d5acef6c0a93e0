pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "erp-admin")]
#[command(about = "ERP Admin - command-line console for the ERP administration API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Navigation menu of the signed-in user")]
    Menu {
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },

    #[command(about = "Overview cards with record counts")]
    Dashboard,

    #[command(about = "User accounts")]
    Users {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "User groups")]
    Groups {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Access levels")]
    AccessLevels {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "System menu entries")]
    Menus {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Menu permissions per group")]
    Permissions {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Power BI report registry")]
    PowerbiReports {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "SQL report registry")]
    SqlReports {
        #[command(subcommand)]
        cmd: commands::entity::EntityCommands,
    },

    #[command(about = "Open or run a report")]
    Report {
        #[command(subcommand)]
        cmd: commands::report::ReportCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    use crate::screens::entities::{
        AccessLevels, Groups, Menus, Permissions, PowerBiReports, SqlReports, Users,
    };
    use commands::entity;

    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Menu { cmd } => commands::menu::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Users { cmd } => entity::handle::<Users>(cmd, output_format).await,
        Commands::Groups { cmd } => entity::handle::<Groups>(cmd, output_format).await,
        Commands::AccessLevels { cmd } => entity::handle::<AccessLevels>(cmd, output_format).await,
        Commands::Menus { cmd } => entity::handle::<Menus>(cmd, output_format).await,
        Commands::Permissions { cmd } => entity::handle::<Permissions>(cmd, output_format).await,
        Commands::PowerbiReports { cmd } => entity::handle::<PowerBiReports>(cmd, output_format).await,
        Commands::SqlReports { cmd } => entity::handle::<SqlReports>(cmd, output_format).await,
        Commands::Report { cmd } => commands::report::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_subcommands() {
        let cli = Cli::try_parse_from([
            "erp-admin", "--json", "menus", "list", "--sort", "ordem", "--desc",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Menus { .. }));
    }

    #[test]
    fn command_tree_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
