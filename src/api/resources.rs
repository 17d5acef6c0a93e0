//! Resource endpoints. Collections answer `GET`/`POST` at `/<resource>`,
//! items `GET`/`PUT`/`DELETE` at `/<resource>/<id>`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::SqlReportResult;
use super::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Groups,
    AccessLevels,
    Menus,
    Permissions,
    PowerBiReports,
    SqlReports,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Users,
        Resource::Groups,
        Resource::AccessLevels,
        Resource::Menus,
        Resource::Permissions,
        Resource::PowerBiReports,
        Resource::SqlReports,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "usuarios",
            Resource::Groups => "grupos",
            Resource::AccessLevels => "niveis-acesso",
            Resource::Menus => "menus",
            Resource::Permissions => "permissoes",
            Resource::PowerBiReports => "relatorios-powerbi",
            Resource::SqlReports => "relatorios-sql",
        }
    }

    pub fn collection(&self) -> String {
        format!("/{}", self.path())
    }

    pub fn item(&self, id: i64) -> String {
        format!("/{}/{}", self.path(), id)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

pub fn execute_sql_endpoint(id: i64) -> String {
    format!("{}/executar", Resource::SqlReports.item(id))
}

/// Typed CRUD calls for one resource
impl ApiClient {
    pub async fn list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>> {
        tracing::debug!(%resource, "list");
        self.get(&resource.collection()).await
    }

    pub async fn fetch<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T> {
        self.get(&resource.item(id)).await
    }

    pub async fn create<B: Serialize, T: DeserializeOwned>(&self, resource: Resource, body: &B) -> Result<T> {
        self.post(&resource.collection(), body).await
    }

    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: i64,
        body: &B,
    ) -> Result<T> {
        self.put(&resource.item(id), body).await
    }

    pub async fn remove(&self, resource: Resource, id: i64) -> Result<()> {
        self.delete(&resource.item(id)).await
    }

    pub async fn execute_sql_report(&self, id: i64) -> Result<SqlReportResult> {
        self.post(&execute_sql_endpoint(id), &serde_json::json!({})).await
    }
}
