use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-resource single-flight lock.
#[derive(Debug, Default)]
pub struct ResourceQueue {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ResourceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, resource: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(resource.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_resource_waits_for_the_holder() {
        let queue = Arc::new(ResourceQueue::new());
        let guard = queue.acquire("posts").await;

        let q = queue.clone();
        let waiter = tokio::spawn(async move {
            let _g = q.acquire("posts").await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn other_resources_are_independent() {
        let queue = ResourceQueue::new();
        let _posts = queue.acquire("posts").await;
        let comments = tokio::time::timeout(Duration::from_millis(50), queue.acquire("comments")).await;
        assert!(comments.is_ok());
    }
}
