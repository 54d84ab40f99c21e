use uuid::Uuid;

use crate::error::Result;
use crate::model::Subscription;

mod inmemory;
mod subscriptions;

pub use inmemory::InMemorySubscriptionStore;
pub use subscriptions::PgSubscriptionStore;

/// Durable collection of subscription records, the source of truth for scheduled jobs.
/// NOTE: Object safe so the service can run against Postgres or the in-memory store
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Persist a new record, failing with `DuplicateSubscription` if its token is taken
    async fn insert(&self, subscription: &Subscription) -> Result<()>;

    /// Look a record up by its external token
    async fn find_by_token(&self, token: &str) -> Result<Option<Subscription>>;

    /// Check whether a record with this token exists
    async fn exists(&self, token: &str) -> Result<bool>;

    /// Persist the mutable state (the confirmation flag) of an existing record
    async fn update(&self, subscription: &Subscription) -> Result<()>;

    /// Delete a record by ID, returning whether anything was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Fetch every record that has been confirmed
    async fn fetch_all_confirmed(&self) -> Result<Vec<Subscription>>;
}
