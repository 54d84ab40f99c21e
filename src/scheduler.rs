use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;

use tokio::sync::Mutex;

use tokio_cron_scheduler::{Job, JobScheduler};

use uuid::Uuid;

use crate::client::WeatherLookup;
use crate::error::Result;
use crate::model::Subscription;
use crate::notifier::Notifier;
use crate::repo::SubscriptionStore;

/// Owns one recurring update job per confirmed subscription.
///
/// The job set is derived state: it is rebuilt from the store by [`bootstrap`](Self::bootstrap)
/// on start and kept in sync by [`register`](Self::register) and [`cancel`](Self::cancel).
pub struct SubscriptionScheduler {
    scheduler: JobScheduler,
    /// Subscription ID -> cron job ID
    /// NOTE: Held across the scheduler calls so replacing a job is atomic per subscription
    jobs: Mutex<HashMap<Uuid, Uuid>>,

    weather: Arc<dyn WeatherLookup>,
    notifier: Arc<dyn Notifier>,
}

impl SubscriptionScheduler {
    /// Create and start an empty scheduler
    pub async fn new(
        weather: Arc<dyn WeatherLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;
        tracing::info!("started subscription scheduler");

        Ok(Self {
            scheduler,
            jobs: Mutex::new(HashMap::new()),
            weather,
            notifier,
        })
    }

    /// Register every confirmed subscription in the store, returning how many were scheduled
    #[tracing::instrument(name = "Bootstrap subscription jobs", skip(self, store))]
    pub async fn bootstrap(&self, store: &dyn SubscriptionStore) -> Result<usize> {
        let subscriptions = store.fetch_all_confirmed().await?;
        for subscription in &subscriptions {
            self.register(subscription).await?;
        }
        tracing::info!(count = subscriptions.len(), "scheduled confirmed subscriptions");
        Ok(subscriptions.len())
    }

    /// Install the update job for `subscription`, replacing any job it already has
    #[tracing::instrument(
        name = "Register subscription job",
        skip(self, subscription),
        fields(subscription.id = %subscription.id, frequency = %subscription.frequency)
    )]
    pub async fn register(&self, subscription: &Subscription) -> Result<()> {
        let mut jobs = self.jobs.lock().await;

        if let Some(job_id) = jobs.remove(&subscription.id) {
            self.scheduler.remove(&job_id).await?;
            tracing::debug!(%job_id, "replaced existing job");
        }

        let job = self.update_job(subscription)?;
        let job_id = self.scheduler.add(job).await?;
        jobs.insert(subscription.id, job_id);

        Ok(())
    }

    /// Stop the update job of `subscription`. Not having one is not an error.
    #[tracing::instrument(name = "Cancel subscription job", skip(self, subscription), fields(subscription.id = %subscription.id))]
    pub async fn cancel(&self, subscription: &Subscription) -> Result<()> {
        let mut jobs = self.jobs.lock().await;

        if let Some(job_id) = jobs.remove(&subscription.id) {
            self.scheduler.remove(&job_id).await?;
        }
        Ok(())
    }

    /// Whether an update job is active for the subscription ID
    pub async fn is_scheduled(&self, subscription_id: Uuid) -> bool {
        self.jobs.lock().await.contains_key(&subscription_id)
    }

    /// Number of active update jobs
    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Stop all jobs
    pub async fn shutdown(&self) -> Result<()> {
        self.jobs.lock().await.clear();
        let mut scheduler = self.scheduler.clone();
        scheduler.shutdown().await?;
        tracing::info!("stopped subscription scheduler");
        Ok(())
    }

    fn update_job(&self, subscription: &Subscription) -> Result<Job> {
        let subscription = Arc::new(subscription.clone());
        let weather = self.weather.clone();
        let notifier = self.notifier.clone();

        let job = Job::new_async_tz(
            subscription.frequency.cron_pattern(),
            Local,
            move |_uuid, _lock| {
                let subscription = subscription.clone();
                let weather = weather.clone();
                let notifier = notifier.clone();
                Box::pin(async move {
                    fire(&subscription, weather.as_ref(), notifier.as_ref()).await;
                })
            },
        )?;
        Ok(job)
    }
}

/// One firing of a subscription's job. Failures are logged and never escape,
/// so the job keeps its schedule.
pub async fn fire(subscription: &Subscription, weather: &dyn WeatherLookup, notifier: &dyn Notifier) {
    if let Err(err) = deliver_update(subscription, weather, notifier).await {
        tracing::error!(
            error.cause_chain = ?err,
            subscription.id = %subscription.id,
            city = %subscription.city,
            "Failed to deliver weather update"
        );
    }
}

/// Fetch the current weather for the subscription's city and email it to the subscriber
#[tracing::instrument(
    name = "Deliver weather update",
    skip(subscription, weather, notifier),
    fields(subscription.id = %subscription.id)
)]
pub async fn deliver_update(
    subscription: &Subscription,
    weather: &dyn WeatherLookup,
    notifier: &dyn Notifier,
) -> Result<()> {
    let conditions = weather.fetch(&subscription.city).await?;

    notifier
        .send_update(
            &subscription.email,
            &subscription.city,
            &conditions,
            &subscription.token,
        )
        .await
        .map_err(crate::error::Error::SendEmailError)
}
