use clap::Subcommand;
use serde_json::json;
use std::io::{self, BufRead, Write};

use crate::cli::utils::{output_success, Console};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open(output_format)?;
    let auth = console.auth();

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let user = auth.login(&email, &password).await?;
            output_success(
                &output_format,
                &format!("Signed in as {}", user.name),
                Some(json!({ "user": user, "redirect": console.session.snapshot().redirect })),
            )
        }
        AuthCommands::Logout => {
            auth.logout();
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            let user = auth.verify().await;
            let message = match &user {
                Some(user) => format!("Authenticated as {} <{}>", user.name, user.email),
                None => "Not authenticated".to_string(),
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "authenticated": user.is_some(),
                    "user": user,
                    "api_url": console.api.base_url(),
                })),
            )
        }
        AuthCommands::Whoami => {
            let user = auth.whoami().await?;
            output_success(
                &output_format,
                &format!("{} <{}> [{}]", user.name, user.email, user.initials()),
                Some(json!({ "user": user })),
            )
        }
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow::anyhow!("Password is required"));
    }
    Ok(password)
}
