use std::collections::HashMap;

use async_trait::async_trait;

use super::{active_only, LookupOption, OptionId};
use crate::error::ClientError;
use crate::http::{path_segment, ApiClient, ApiRequest, ListShape};

/// Fetches a dependent field's options for one parent value
#[async_trait]
pub trait LookupSource: Send + Sync {
    async fn fetch(&self, field: &str, parent: &OptionId) -> Result<Vec<LookupOption>, ClientError>;
}

/// Where a field's options live on the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEndpoint {
    /// Path, optionally containing a `{parent}` placeholder
    pub path: String,
    /// Query parameter carrying the parent value, for endpoints that filter by query
    pub parent_param: Option<String>,
    pub shape: ListShape,
}

impl LookupEndpoint {
    /// `/Lookup/roles/{parent}` style
    pub fn path(path: impl Into<String>, shape: ListShape) -> Self {
        Self {
            path: path.into(),
            parent_param: None,
            shape,
        }
    }

    /// `/Lookup/roles?domainId=5` style
    pub fn query(path: impl Into<String>, parent_param: impl Into<String>, shape: ListShape) -> Self {
        Self {
            path: path.into(),
            parent_param: Some(parent_param.into()),
            shape,
        }
    }

    /// The parent goes into the path as one encoded segment, or into the query
    pub fn request(&self, parent: Option<&OptionId>) -> Result<ApiRequest, ClientError> {
        let path = if self.path.contains("{parent}") {
            let segment = path_segment(parent.map(OptionId::as_str).unwrap_or_default())?;
            self.path.replace("{parent}", &segment)
        } else {
            self.path.clone()
        };

        let mut request = ApiRequest::get(path);
        if let (Some(param), Some(parent)) = (&self.parent_param, parent) {
            request = request.with_query(param.clone(), parent.as_str());
        }
        Ok(request)
    }
}

/// Lookup source backed by the REST API, one endpoint per field
#[derive(Debug, Clone)]
pub struct HttpLookupSource {
    client: ApiClient,
    endpoints: HashMap<String, LookupEndpoint>,
}

impl HttpLookupSource {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    pub fn route(mut self, field: impl Into<String>, endpoint: LookupEndpoint) -> Self {
        self.endpoints.insert(field.into(), endpoint);
        self
    }

    /// Lookup fields of the workforce backend's master-data API
    pub fn with_default_routes(client: ApiClient) -> Self {
        Self::new(client)
            .route("clientId", LookupEndpoint::path("/Lookup/clients", ListShape::Bare))
            .route("projectId", LookupEndpoint::query("/Lookup/projects", "clientId", ListShape::Bare))
            .route("domainId", LookupEndpoint::path("/Lookup/domains", ListShape::Bare))
            .route("roleId", LookupEndpoint::query("/Lookup/roles", "domainId", ListShape::Bare))
            .route("levelId", LookupEndpoint::query("/Lookup/levels", "roleId", ListShape::Bare))
            .route("supplierId", LookupEndpoint::path("/Lookup/suppliers", ListShape::Bare))
            .route("pmId", LookupEndpoint::path("/PM", ListShape::Items))
            .route("rmId", LookupEndpoint::path("/RM", ListShape::Items))
    }

    pub fn endpoint(&self, field: &str) -> Option<&LookupEndpoint> {
        self.endpoints.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Active options for `field`, scoped to `parent` when given.
    ///
    /// Root fields (no parent) use this directly; dependent fields go through
    /// [`LookupSource::fetch`].
    pub async fn options(&self, field: &str, parent: Option<&OptionId>) -> Result<Vec<LookupOption>, ClientError> {
        let endpoint = self
            .endpoints
            .get(field)
            .ok_or_else(|| ClientError::UnknownLookup(field.to_string()))?;

        let response = self.client.send(&endpoint.request(parent)?).await?;
        let options: Vec<LookupOption> = response.into_list(endpoint.shape)?;
        tracing::debug!("Loaded {} options for '{}'", options.len(), field);
        Ok(active_only(options))
    }
}

#[async_trait]
impl LookupSource for HttpLookupSource {
    async fn fetch(&self, field: &str, parent: &OptionId) -> Result<Vec<LookupOption>, ClientError> {
        self.options(field, Some(parent)).await
    }
}
