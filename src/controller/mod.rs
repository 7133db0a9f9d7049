pub mod queue;
pub mod resource;

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::{Failure, Result};
use crate::model::{get_next_id, Collection, Entity, DELETED_FIELD, ID_FIELD};
use crate::query::{QueryEngine, SortSpec, ViewState};
use crate::remote::RemoteClient;
use crate::render;
use crate::store::DataStore;

pub use queue::ResourceQueue;
pub use resource::{builtin_resources, ResourceSpec};

#[derive(Debug, Default)]
struct PageState {
    store: DataStore,
    views: HashMap<String, ViewState>,
    errors: HashMap<String, Failure>,
}

/// Owner of the store and of every derived view.
#[derive(Debug)]
pub struct Page {
    client: RemoteClient,
    resources: HashMap<String, ResourceSpec>,
    state: RwLock<PageState>,
    queue: ResourceQueue,
}

impl Page {
    pub fn new(client: RemoteClient) -> Self {
        Self::with_resources(client, builtin_resources())
    }

    pub fn with_resources(client: RemoteClient, resources: HashMap<String, ResourceSpec>) -> Self {
        Self {
            client,
            resources,
            state: RwLock::new(PageState::default()),
            queue: ResourceQueue::new(),
        }
    }

    pub fn spec(&self, resource: &str) -> ResourceSpec {
        self.resources.get(resource).cloned().unwrap_or_default()
    }

    fn engine(&self, resource: &str) -> QueryEngine {
        QueryEngine::new(&self.spec(resource).search_field)
    }

    pub async fn load(&self, resource: &str) -> Result<usize> {
        let _slot = self.queue.acquire(resource).await;
        self.reload(resource).await
    }

    pub async fn load_document(&self, resource: &str, url: &str) -> Result<usize> {
        let _slot = self.queue.acquire(resource).await;
        let fetched = self.client.fetch_document(url).await;
        self.settle(resource, fetched).await
    }

    async fn reload(&self, resource: &str) -> Result<usize> {
        let fetched = self.client.list(resource).await;
        self.settle(resource, fetched).await
    }

    async fn settle(&self, resource: &str, fetched: Result<Collection>) -> Result<usize> {
        let mut state = self.state.write().await;
        match fetched {
            Ok(collection) => {
                let count = collection.len();
                state
                    .views
                    .insert(resource.to_string(), ViewState::full(&collection));
                state.store.replace(resource, collection);
                state.errors.remove(resource);
                Ok(count)
            }
            Err(failure) => {
                tracing::warn!(resource, error = %failure, "load failed, keeping previous snapshot");
                state.errors.insert(resource.to_string(), failure.clone());
                Err(failure)
            }
        }
    }

    pub async fn snapshot(&self, resource: &str) -> Collection {
        self.state.read().await.store.all(resource).to_vec()
    }

    pub async fn get(&self, resource: &str, id: &str) -> Result<Entity> {
        self.state.read().await.store.get(resource, id).cloned()
    }

    pub async fn view(&self, resource: &str) -> ViewState {
        let state = self.state.read().await;
        state
            .views
            .get(resource)
            .cloned()
            .unwrap_or_else(|| ViewState::full(state.store.all(resource)))
    }

    pub async fn last_error(&self, resource: &str) -> Option<Failure> {
        self.state.read().await.errors.get(resource).cloned()
    }

    pub async fn search(&self, resource: &str, keyword: &str) -> usize {
        let engine = self.engine(resource);
        let mut state = self.state.write().await;
        let PageState { store, views, .. } = &mut *state;
        let view = views.entry(resource.to_string()).or_default();
        view.apply_search(&engine, store.all(resource), keyword);
        tracing::debug!(resource, keyword, matches = view.filtered.len(), "search applied");
        view.filtered.len()
    }

    pub async fn sort(&self, resource: &str, spec: SortSpec) {
        let engine = self.engine(resource);
        let mut state = self.state.write().await;
        let PageState { store, views, .. } = &mut *state;
        let view = views
            .entry(resource.to_string())
            .or_insert_with(|| ViewState::full(store.all(resource)));
        tracing::debug!(resource, sort = %spec, "sort applied");
        view.apply_sort(&engine, spec);
    }

    pub async fn render(&self, resource: &str) -> String {
        let policy = self.spec(resource).view;
        if let Some(failure) = self.last_error(resource).await {
            return render::render_error(&failure, &policy);
        }
        let view = self.view(resource).await;
        render::render(&view.filtered, &policy)
    }

    pub async fn create(&self, resource: &str, fields: Map<String, Value>) -> Result<Entity> {
        let spec = self.spec(resource);
        let fields = trim_fields(fields);
        for required in &spec.required {
            let blank = fields
                .get(required)
                .map(|v| matches!(v, Value::String(s) if s.is_empty()) || v.is_null())
                .unwrap_or(true);
            if blank {
                return Err(Failure::validation(format!("'{required}' is required")));
            }
        }

        let _slot = self.queue.acquire(resource).await;
        let next_id = get_next_id(self.state.read().await.store.all(resource));
        let mut entity = Entity::from_map(fields);
        entity.set(ID_FIELD, next_id);
        entity.set(DELETED_FIELD, false);

        let created = self.client.create(resource, &entity).await?;
        tracing::info!(resource, id = %created.id(), "record created");
        self.reload(resource).await?;
        Ok(created)
    }

    pub async fn update(&self, resource: &str, id: &str, fields: Map<String, Value>) -> Result<Entity> {
        let spec = self.spec(resource);
        if fields.is_empty() {
            return Err(Failure::validation("nothing to update"));
        }
        for key in fields.keys() {
            if key == ID_FIELD || key == DELETED_FIELD {
                return Err(Failure::validation(format!("'{key}' cannot be edited")));
            }
            if !spec.editable.is_empty() && !spec.editable.contains(key) {
                return Err(Failure::validation(format!("'{key}' is not editable")));
            }
        }

        let _slot = self.queue.acquire(resource).await;
        self.get(resource, id).await?;
        let updated = self.client.patch(resource, id, &fields).await?;
        tracing::info!(resource, id, "record updated");
        self.reload(resource).await?;
        Ok(updated)
    }

    pub async fn soft_delete(&self, resource: &str, id: &str) -> Result<()> {
        self.set_deleted(resource, id, true).await
    }

    pub async fn restore(&self, resource: &str, id: &str) -> Result<()> {
        self.set_deleted(resource, id, false).await
    }

    async fn set_deleted(&self, resource: &str, id: &str, deleted: bool) -> Result<()> {
        let _slot = self.queue.acquire(resource).await;
        let current = self.get(resource, id).await?;
        if current.is_deleted() == deleted {
            let state = if deleted { "deleted" } else { "active" };
            return Err(Failure::validation(format!(
                "{resource} '{id}' is already {state}"
            )));
        }

        let mut fields = Map::new();
        fields.insert(DELETED_FIELD.to_string(), Value::Bool(deleted));
        self.client.patch(resource, id, &fields).await?;
        tracing::info!(resource, id, deleted, "soft delete flag changed");
        self.reload(resource).await?;
        Ok(())
    }
}

fn trim_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, Value::String(s.trim().to_string())),
            other => (k, other),
        })
        .collect()
}
