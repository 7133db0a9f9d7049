//! In-memory stand-in for a json-server style backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{RawResponse, Request, Transport};
use crate::error::Result;
use crate::model::Entity;

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, Vec<Value>>,
    raw: HashMap<String, (u16, String)>,
    failures: HashMap<String, u16>,
    requests: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, resource: &str, records: Vec<Value>) -> Self {
        self.state
            .get_mut()
            .collections
            .insert(resource.to_string(), records);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn serve_document(&self, url: &str, document: Value) {
        self.serve_raw(url, 200, &document.to_string()).await;
    }

    pub async fn serve_raw(&self, url: &str, status: u16, body: &str) {
        self.state
            .lock()
            .await
            .raw
            .insert(url.to_string(), (status, body.to_string()));
    }

    pub async fn fail_with(&self, resource: &str, status: u16) {
        self.state
            .lock()
            .await
            .failures
            .insert(resource.to_string(), status);
    }

    pub async fn recover(&self, resource: &str) {
        self.state.lock().await.failures.remove(resource);
    }

    pub async fn collection(&self, resource: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .collections
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Request log in arrival order, `"{METHOD} {path}[ {body}]"`.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }
}

fn json_response(status: u16, value: &Value) -> RawResponse {
    RawResponse {
        status,
        body: value.to_string(),
    }
}

fn not_found() -> RawResponse {
    json_response(404, &Value::Object(Default::default()))
}

fn same_id(record: &Value, id: &str) -> bool {
    Entity::from_value(record.clone()).is_some_and(|e| e.id() == id)
}

fn route(state: &mut MemoryState, request: &Request) -> RawResponse {
    if let Some((status, body)) = state.raw.get(request.url.as_str()) {
        return RawResponse {
            status: *status,
            body: body.clone(),
        };
    }

    let segments: Vec<String> = request
        .url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).map(decode_segment).collect())
        .unwrap_or_default();
    let (resource, id) = match segments.as_slice() {
        [resource] => (resource.as_str(), None),
        [resource, id] => (resource.as_str(), Some(id.as_str())),
        _ => return not_found(),
    };

    if let Some(status) = state.failures.get(resource) {
        return json_response(*status, &Value::Object(Default::default()));
    }

    let Some(records) = state.collections.get_mut(resource) else {
        return not_found();
    };

    match (&request.method, id) {
        (&Method::GET, None) => json_response(200, &Value::Array(records.clone())),
        (&Method::GET, Some(id)) => match records.iter().find(|r| same_id(r, id)) {
            Some(record) => json_response(200, record),
            None => not_found(),
        },
        (&Method::POST, None) => match &request.body {
            Some(body @ Value::Object(_)) => {
                records.push(body.clone());
                json_response(201, body)
            }
            _ => json_response(400, &Value::Object(Default::default())),
        },
        (&Method::PATCH, Some(id)) => {
            let Some(Value::Object(patch)) = &request.body else {
                return json_response(400, &Value::Object(Default::default()));
            };
            match records.iter_mut().find(|r| same_id(r, id)) {
                Some(Value::Object(record)) => {
                    for (k, v) in patch {
                        record.insert(k.clone(), v.clone());
                    }
                    json_response(200, &Value::Object(record.clone()))
                }
                _ => not_found(),
            }
        }
        _ => json_response(405, &Value::Object(Default::default())),
    }
}

fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn send(&self, request: Request) -> Result<RawResponse> {
        {
            let mut state = self.state.lock().await;
            let entry = match &request.body {
                Some(body) => format!("{} {} {}", request.method, request.url.path(), body),
                None => format!("{} {}", request.method, request.url.path()),
            };
            state.requests.push(entry);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock().await;
        Ok(route(&mut state, &request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: Method, url: &str, body: Option<Value>) -> Request {
        Request {
            method,
            url: reqwest::Url::parse(url).unwrap(),
            body,
        }
    }

    #[tokio::test]
    async fn post_appends_and_echoes() {
        let backend = MemoryBackend::new().with_collection("posts", vec![]);
        let resp = backend
            .send(request(
                Method::POST,
                "http://mock/posts",
                Some(json!({"id": "1", "title": "t"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(backend.collection("posts").await.len(), 1);
    }

    #[tokio::test]
    async fn patch_on_missing_record_is_404() {
        let backend = MemoryBackend::new().with_collection("posts", vec![json!({"id": "1"})]);
        let resp = backend
            .send(request(
                Method::PATCH,
                "http://mock/posts/9",
                Some(json!({"isDeleted": true})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn injected_failure_clears_on_recover() {
        let backend = MemoryBackend::new().with_collection("posts", vec![]);
        backend.fail_with("posts", 503).await;
        let resp = backend
            .send(request(Method::GET, "http://mock/posts", None))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
        backend.recover("posts").await;
        let resp = backend
            .send(request(Method::GET, "http://mock/posts", None))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn segments_are_percent_decoded() {
        assert_eq!(decode_segment("a%20b"), "a b");
        assert_eq!(decode_segment("%C3%81o"), "Áo");
        assert_eq!(decode_segment("100%"), "100%");
    }
}
