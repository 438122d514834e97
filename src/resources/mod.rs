use std::str::FromStr;

use serde_json::Value;

use crate::error::ClientError;
use crate::http::{path_segment, ApiClient, ApiRequest, ListShape};

/// REST collections exposed by the workforce backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Client,
    Project,
    Supplier,
    Resource,
    Pm,
    Rm,
    User,
    ProjectBaseline,
    Timesheet,
    Leave,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Client,
        Collection::Project,
        Collection::Supplier,
        Collection::Resource,
        Collection::Pm,
        Collection::Rm,
        Collection::User,
        Collection::ProjectBaseline,
        Collection::Timesheet,
        Collection::Leave,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Collection::Client => "/Client",
            Collection::Project => "/Project",
            Collection::Supplier => "/Supplier",
            Collection::Resource => "/Resource",
            Collection::Pm => "/PM",
            Collection::Rm => "/RM",
            Collection::User => "/User",
            Collection::ProjectBaseline => "/ProjectBaseline",
            Collection::Timesheet => "/Timesheet",
            Collection::Leave => "/Leave",
        }
    }

    /// Paged collections answer with an `items` envelope, the rest with a bare array
    pub fn list_shape(self) -> ListShape {
        match self {
            Collection::Client
            | Collection::Project
            | Collection::Supplier
            | Collection::Resource
            | Collection::Pm
            | Collection::Rm
            | Collection::User => ListShape::Items,
            Collection::ProjectBaseline | Collection::Timesheet | Collection::Leave => ListShape::Bare,
        }
    }

    pub fn name(self) -> &'static str {
        self.path().trim_start_matches('/')
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.name().to_ascii_lowercase() == normalized)
            .or(match normalized.as_str() {
                "clients" => Some(Collection::Client),
                "projects" => Some(Collection::Project),
                "suppliers" => Some(Collection::Supplier),
                "resources" | "employees" => Some(Collection::Resource),
                "users" => Some(Collection::User),
                "baselines" | "baseline" => Some(Collection::ProjectBaseline),
                "timesheets" => Some(Collection::Timesheet),
                "leaves" => Some(Collection::Leave),
                _ => None,
            })
            .ok_or_else(|| format!("unknown collection '{}'", s))
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// CRUD over the backend collections. Errors propagate to the caller untouched.
#[derive(Debug, Clone, Copy)]
pub struct Resources<'a> {
    client: &'a ApiClient,
}

impl<'a> Resources<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, collection: Collection) -> Result<Vec<Value>, ClientError> {
        self.client
            .send(&ApiRequest::get(collection.path()))
            .await?
            .into_list(collection.list_shape())
    }

    pub async fn get(&self, collection: Collection, id: &str) -> Result<Value, ClientError> {
        let response = self.client.send(&ApiRequest::get(record_path(collection, id)?)).await?;
        Ok(response.into_body())
    }

    pub async fn create(&self, collection: Collection, body: &Value) -> Result<Value, ClientError> {
        let response = self
            .client
            .send(&ApiRequest::post(collection.path(), body.clone()))
            .await?;
        Ok(response.into_body())
    }

    pub async fn update(&self, collection: Collection, id: &str, body: &Value) -> Result<Value, ClientError> {
        let response = self
            .client
            .send(&ApiRequest::put(record_path(collection, id)?, body.clone()))
            .await?;
        Ok(response.into_body())
    }

    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), ClientError> {
        self.client.send(&ApiRequest::delete(record_path(collection, id)?)).await?;
        Ok(())
    }
}

fn record_path(collection: Collection, id: &str) -> Result<String, ClientError> {
    Ok(format!("{}/{}", collection.path(), path_segment(id)?))
}
