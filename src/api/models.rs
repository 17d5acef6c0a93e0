//! Wire models for the admin REST API.
//!
//! Field names on the wire are Portuguese (`nome`, `descricao`, ...); the
//! Rust side uses English names and accepts either on input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    pub email: String,
}

impl User {
    /// Up to two upper-case initials ("Maria Santos" -> "MS")
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "senha")]
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario", alias = "user")]
    pub user: User,
}

/// User row on the users screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    pub email: String,
    #[serde(rename = "ativo", alias = "active", default)]
    pub active: bool,
    #[serde(rename = "grupos", alias = "groups", default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLevel {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: Option<String>,
}

/// Menu row on the menus screen. Unlike the navigation feed this carries the
/// parent's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "rota", alias = "route", default)]
    pub route: Option<String>,
    #[serde(rename = "icone", alias = "icon", default)]
    pub icon: Option<String>,
    #[serde(rename = "paiId", alias = "parentId", default)]
    pub parent_id: Option<i64>,
    #[serde(rename = "paiNome", alias = "parentName", default)]
    pub parent_name: Option<String>,
    #[serde(rename = "ordem", alias = "order", default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    #[serde(rename = "menuId")]
    pub menu_id: i64,
    #[serde(rename = "menuNome", default)]
    pub menu_name: Option<String>,
    #[serde(rename = "grupoId")]
    pub group_id: i64,
    #[serde(rename = "grupoNome", default)]
    pub group_name: Option<String>,
    #[serde(rename = "nivelAcessoId")]
    pub access_level_id: i64,
    #[serde(rename = "nivelAcessoNome", default)]
    pub access_level_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerBiReport {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    pub url: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "ordem", alias = "order", default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlReport {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: Option<String>,
    pub sql: String,
    #[serde(rename = "ordem", alias = "order", default)]
    pub order: i64,
}

/// Output of executing a SQL report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlReportResult {
    #[serde(rename = "colunas", alias = "columns", default)]
    pub columns: Vec<String>,
    #[serde(rename = "dados", alias = "rows", default)]
    pub rows: Vec<Map<String, Value>>,
}

impl SqlReportResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `{id, nome}` shape shared by everything that feeds a select
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
}
