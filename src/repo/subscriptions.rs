use uuid::Uuid;

use chrono::{DateTime, Utc};

use sqlx::migrate::MigrateError;
use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::model::Subscription;

use super::SubscriptionStore;

/// Postgres Subscription store
#[derive(Debug, Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    #[tracing::instrument(name = "Run subscription migrations", skip(self))]
    pub async fn migrate(&self) -> std::result::Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    email: String,
    city: String,
    frequency: String,
    confirmed: bool,
    token: String,
    migration_version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = Error;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email,
            city: row.city,
            frequency: row.frequency.parse()?,
            confirmed: row.confirmed,
            token: row.token,
            migration_version: row.migration_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_SUBSCRIPTION: &str = "select id, email, city, frequency, confirmed, token, \
     migration_version, created_at, updated_at from subscriptions";

#[async_trait::async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    #[tracing::instrument(name = "Insert subscription", skip(self, subscription), fields(subscription.id = %subscription.id))]
    async fn insert(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            "insert into subscriptions(id, email, city, frequency, confirmed, token, migration_version, created_at, updated_at) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(subscription.id)
        .bind(&subscription.email)
        .bind(&subscription.city)
        .bind(subscription.frequency.as_str())
        .bind(subscription.confirmed)
        .bind(&subscription.token)
        .bind(subscription.migration_version)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::DuplicateSubscription
            }
            other => other.into(),
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Find subscription by token", skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "{} where token=$1",
            SELECT_SUBSCRIPTION
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    #[tracing::instrument(name = "Check subscription exists", skip(self, token))]
    async fn exists(&self, token: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("select exists(select 1 from subscriptions where token=$1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Update subscription", skip(self, subscription), fields(subscription.id = %subscription.id))]
    async fn update(&self, subscription: &Subscription) -> Result<()> {
        let result =
            sqlx::query("update subscriptions set confirmed=$2, updated_at=$3 where id=$1")
                .bind(subscription.id)
                .bind(subscription.confirmed)
                .bind(subscription.updated_at)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Delete subscription", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("delete from subscriptions where id=$1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Fetch all confirmed subscriptions", skip(self))]
    async fn fetch_all_confirmed(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "{} where confirmed order by created_at",
            SELECT_SUBSCRIPTION
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Subscription::try_from).collect()
    }
}
