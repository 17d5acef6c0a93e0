use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::api::auth::AuthService;
use crate::api::ApiClient;
use crate::cli::OutputFormat;
use crate::config::{config, AppConfig};
use crate::error::ConsoleError;
use crate::notify::{Notifier, Toast, TracingNotifier};
use crate::session::storage::FileTokenStorage;
use crate::session::SessionStore;

/// Output a success message in the appropriate format. Object `data` is
/// merged into the JSON response; anything else lands under `data`.
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), Value::Bool(true));
            response.insert("message".into(), Value::String(message.to_string()));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".into(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print `text` as is, or `data` as pretty JSON
pub fn output_view(output_format: &OutputFormat, text: &str, data: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => print!("{}", text),
    }
    Ok(())
}

/// Toasts in a terminal: stderr in text mode, the log only in JSON mode
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    output_format: OutputFormat,
}

impl ConsoleNotifier {
    pub fn new(output_format: OutputFormat) -> Self {
        Self { output_format }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        if self.output_format == OutputFormat::Text {
            let mark = if toast.is_destructive() { "✗" } else { "•" };
            match &toast.description {
                Some(description) => eprintln!("{} {}: {}", mark, toast.title, description),
                None => eprintln!("{} {}", mark, toast.title),
            }
        }
        TracingNotifier.notify(toast);
    }
}

/// Everything a command needs to talk to the API with the stored session
pub struct Console {
    pub config: &'static AppConfig,
    pub session: SessionStore,
    pub api: ApiClient,
}

impl Console {
    pub fn open(output_format: OutputFormat) -> anyhow::Result<Self> {
        let config = config();
        let dir = config.config_dir()?;
        let storage = Arc::new(FileTokenStorage::in_dir(dir));
        let session = SessionStore::new(storage);
        let notifier = Arc::new(ConsoleNotifier::new(output_format));
        let api = ApiClient::new(&config.api, session.clone(), notifier)?;
        tracing::debug!(base_url = %api.base_url(), "console ready");
        Ok(Self { config, session, api })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone())
    }

    /// Commands other than login need a stored token
    pub fn require_token(&self) -> anyhow::Result<()> {
        if self.session.token().is_none() {
            return Err(ConsoleError::NotAuthenticated.into());
        }
        Ok(())
    }
}

/// Parse `key=value` pairs. Booleans, null and quoted strings keep their
/// JSON type. Numbers stay text, as form input does; the entity's numeric
/// fields are converted later by `screens::to_payload`.
pub fn parse_fields(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow::anyhow!("Empty field name in '{}'", pair));
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Bool(_) | Value::Null | Value::String(_))) => v,
            _ => Value::String(raw.to_string()),
        };
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_pairs_keep_simple_types() {
        let fields = parse_fields(&[
            "nome=Vendas".to_string(),
            "ativo=false".to_string(),
            "ordem=3".to_string(),
            "paiId=".to_string(),
            "rota=/a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(fields["nome"], json!("Vendas"));
        assert_eq!(fields["ativo"], json!(false));
        assert_eq!(fields["ordem"], json!("3"));
        assert_eq!(fields["paiId"], json!(""));
        assert_eq!(fields["rota"], json!("/a=b"));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_fields(&["nome".to_string()]).is_err());
        assert!(parse_fields(&["=x".to_string()]).is_err());
    }
}
