pub mod extract;
pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{Map, Value};

use crate::error::{Failure, Result};
use crate::model::{Collection, Entity, ID_FIELD};

pub use extract::{default_rules, extract_collection, ExtractionRule};
pub use http::HttpTransport;
pub use memory::MemoryBackend;

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RawResponse>;
}

#[derive(Clone)]
pub struct RemoteClient {
    base: Url,
    transport: Arc<dyn Transport>,
    rules: Vec<ExtractionRule>,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base", &self.base.as_str())
            .field("rules", &self.rules)
            .finish()
    }
}

impl RemoteClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| Failure::validation(format!("invalid base URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Failure::validation(format!(
                "invalid base URL '{base_url}': cannot hold a path"
            )));
        }
        Ok(Self {
            base,
            transport,
            rules: default_rules(),
        })
    }

    pub fn with_rules(mut self, rules: Vec<ExtractionRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn resource_url(&self, resource: &str, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    pub async fn list(&self, resource: &str) -> Result<Collection> {
        let url = self.resource_url(resource, None);
        let document = self.execute(Method::GET, url, None).await?;
        let records = extract_collection(&document.unwrap_or(Value::Null), &self.rules)?;
        tracing::debug!(resource, count = records.len(), "listed records");
        Ok(records)
    }

    pub async fn create(&self, resource: &str, entity: &Entity) -> Result<Entity> {
        let url = self.resource_url(resource, None);
        let body = entity.clone().into_value();
        let echoed = self.execute(Method::POST, url, Some(body)).await?;
        Ok(echoed
            .and_then(Entity::from_value)
            .unwrap_or_else(|| entity.clone()))
    }

    pub async fn patch(
        &self,
        resource: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Entity> {
        let url = self.resource_url(resource, Some(id));
        let body = Value::Object(fields.clone());
        let echoed = self.execute(Method::PATCH, url, Some(body)).await?;
        Ok(echoed.and_then(Entity::from_value).unwrap_or_else(|| {
            let mut partial = fields.clone();
            partial.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Entity::from_map(partial)
        }))
    }

    pub async fn fetch_document(&self, url: &str) -> Result<Collection> {
        let url = Url::parse(url.trim())
            .map_err(|e| Failure::validation(format!("invalid document URL '{url}': {e}")))?;
        let document = self.execute(Method::GET, url, None).await?;
        extract_collection(&document.unwrap_or(Value::Null), &self.rules)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<Value>) -> Result<Option<Value>> {
        tracing::debug!(method = %method, url = %url, "sending request");
        let response = self
            .transport
            .send(Request {
                method: method.clone(),
                url: url.clone(),
                body,
            })
            .await
            .map_err(|e| {
                tracing::warn!(method = %method, url = %url, error = %e, "request failed");
                e
            })?;

        if !response.is_success() {
            tracing::warn!(method = %method, url = %url, status = response.status, "non-success status");
            return Err(Failure::HttpStatus {
                code: response.status,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str::<Value>(&response.body)?;
        Ok(Some(value))
    }
}
