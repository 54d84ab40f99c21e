use tokio::sync::Mutex;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::Subscription;

use super::SubscriptionStore;

/// Subscription store kept in process memory, used by tests and local runs
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().await;
        if subscriptions.iter().any(|s| s.token == subscription.token) {
            return Err(Error::DuplicateSubscription);
        }
        subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.iter().find(|s| s.token == token).cloned())
    }

    async fn exists(&self, token: &str) -> Result<bool> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.iter().any(|s| s.token == token))
    }

    async fn update(&self, subscription: &Subscription) -> Result<()> {
        let mut subscriptions = self.subscriptions.lock().await;
        let stored = subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
            .ok_or(Error::NotFound)?;
        stored.confirmed = subscription.confirmed;
        stored.updated_at = subscription.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut subscriptions = self.subscriptions.lock().await;
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        Ok(subscriptions.len() != before)
    }

    async fn fetch_all_confirmed(&self) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.iter().filter(|s| s.confirmed).cloned().collect())
    }
}
