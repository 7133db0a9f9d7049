use std::collections::HashMap;

use crate::error::{Failure, Result};
use crate::model::{Collection, Entity};

#[derive(Clone, Debug, Default)]
pub struct DataStore {
    collections: HashMap<String, Collection>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, resource: &str, collection: Collection) {
        tracing::debug!(resource, count = collection.len(), "replacing snapshot");
        self.collections.insert(resource.to_string(), collection);
    }

    pub fn get(&self, resource: &str, id: &str) -> Result<&Entity> {
        self.all(resource)
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| Failure::not_found(resource, id))
    }

    pub fn all(&self, resource: &str) -> &[Entity] {
        self.collections
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
