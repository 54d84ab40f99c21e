use std::sync::Arc;

use chrono::Utc;

use tokio::sync::Mutex;

use crate::client::WeatherLookup;
use crate::crypto::{SigningKey, SubscriptionToken};
use crate::error::{Error, Result};
use crate::model::{NewSubscription, Subscription};
use crate::notifier::Notifier;
use crate::repo::SubscriptionStore;
use crate::scheduler::SubscriptionScheduler;

/// Subscription lifecycle: pending -> confirmed -> removed.
///
/// Each operation is a single attempt; preconditions are checked before any side effect.
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    weather: Arc<dyn WeatherLookup>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<SubscriptionScheduler>,
    signing_key: SigningKey,
    /// Serializes confirm and unsubscribe, so a job exists iff a confirmed record does
    transitions: Mutex<()>,
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        weather: Arc<dyn WeatherLookup>,
        notifier: Arc<dyn Notifier>,
        scheduler: Arc<SubscriptionScheduler>,
        signing_key: SigningKey,
    ) -> Self {
        Self {
            store,
            weather,
            notifier,
            scheduler,
            signing_key,
            transitions: Mutex::new(()),
        }
    }

    /// Store a new unconfirmed subscription and email its confirmation link
    #[tracing::instrument(
        name = "Create a new subscription",
        skip(self, new_subscription),
        fields(email = %new_subscription.email, city = %new_subscription.city)
    )]
    pub async fn create(&self, new_subscription: NewSubscription) -> Result<Subscription> {
        let token = self
            .signing_key
            .subscription_token(new_subscription.email.as_ref(), new_subscription.city.as_ref());

        if self.store.exists(token.as_ref()).await? {
            return Err(Error::DuplicateSubscription);
        }
        if !self
            .weather
            .validate_city(new_subscription.city.as_ref())
            .await?
        {
            return Err(Error::InvalidCity(new_subscription.city.to_string()));
        }

        let subscription = Subscription::new(new_subscription, token);
        self.store.insert(&subscription).await?;

        if let Err(e) = self
            .notifier
            .send_confirmation(&subscription.email, &subscription.city, &subscription.token)
            .await
        {
            // Drop the record so the subscriber can retry instead of hitting a duplicate
            if let Err(cleanup) = self.store.delete(subscription.id).await {
                tracing::error!(
                    error.cause_chain = ?cleanup,
                    subscription.id = %subscription.id,
                    "Failed to remove subscription after confirmation email failure"
                );
            }
            return Err(Error::SendEmailError(e));
        }

        Ok(subscription)
    }

    /// Confirm the subscription addressed by `token` and start its update job
    #[tracing::instrument(name = "Confirm a subscription by token", skip(self, token))]
    pub async fn confirm(&self, token: &str) -> Result<Subscription> {
        let _transition = self.transitions.lock().await;

        let mut subscription = self.find(token).await?;
        if subscription.confirmed {
            return Err(Error::AlreadyConfirmed);
        }

        subscription.confirmed = true;
        subscription.updated_at = Utc::now();
        // Persist before scheduling, a crash in between is repaired by bootstrap
        self.store.update(&subscription).await?;
        self.scheduler.register(&subscription).await?;

        Ok(subscription)
    }

    /// Stop the update job of the subscription addressed by `token` and delete it
    #[tracing::instrument(name = "Unsubscribe by token", skip(self, token))]
    pub async fn unsubscribe(&self, token: &str) -> Result<Subscription> {
        let _transition = self.transitions.lock().await;

        let subscription = self.find(token).await?;

        self.scheduler.cancel(&subscription).await?;
        if !self.store.delete(subscription.id).await? {
            return Err(Error::NotFound);
        }

        Ok(subscription)
    }

    async fn find(&self, token: &str) -> Result<Subscription> {
        // A malformed token cannot address any subscription
        let token: SubscriptionToken = token.parse().map_err(|_| Error::NotFound)?;

        self.store
            .find_by_token(token.as_ref())
            .await?
            .ok_or(Error::NotFound)
    }
}
