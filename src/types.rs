/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Record operations issued by the entity screens
/// Used for request logging and for the success toasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Select,
}

impl Operation {
    /// Past-tense verb for notifications ("User created")
    pub fn past_tense(&self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
            Operation::Select => "loaded",
        }
    }

    pub fn http_method(&self) -> reqwest::Method {
        match self {
            Operation::Create => reqwest::Method::POST,
            Operation::Update => reqwest::Method::PUT,
            Operation::Delete => reqwest::Method::DELETE,
            Operation::Select => reqwest::Method::GET,
        }
    }
}

/// Console routes. Menu records carry these as plain strings; the constants
/// are what the console itself navigates to.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const DASHBOARD: &str = "/dashboard";
    pub const USERS: &str = "/usuarios";
    pub const GROUPS: &str = "/grupos";
    pub const ACCESS_LEVELS: &str = "/niveis-acesso";
    pub const MENUS: &str = "/menus";
    pub const PERMISSIONS: &str = "/permissoes";
    pub const POWERBI_REPORTS: &str = "/relatorios-powerbi";
    pub const SQL_REPORTS: &str = "/relatorios-sql";

    pub fn powerbi_report_view(id: i64) -> String {
        format!("{}/view/{}", POWERBI_REPORTS, id)
    }

    pub fn sql_report_view(id: i64) -> String {
        format!("{}/view/{}", SQL_REPORTS, id)
    }
}
