use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use sqlx::postgres::PgPoolOptions;

use weather_alerts::app;
use weather_alerts::client::{EmailClient, WeatherClient, WeatherLookup};
use weather_alerts::crypto::SigningKey;
use weather_alerts::notifier::{EmailNotifier, Notifier};
use weather_alerts::repo::{PgSubscriptionStore, SubscriptionStore};
use weather_alerts::scheduler::SubscriptionScheduler;
use weather_alerts::service::SubscriptionService;
use weather_alerts::settings::Settings;
use weather_alerts::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    telemetry::set_subscriber(telemetry::create_subscriber(env_filter, std::io::stdout))?;

    let settings = Settings::load()?;

    let pool = PgPoolOptions::new().connect_lazy_with(settings.database.with_db());
    let store = PgSubscriptionStore::new(pool);
    store
        .migrate()
        .await
        .context("Failed to migrate the database")?;
    let store: Arc<dyn SubscriptionStore> = Arc::new(store);

    let signing_key = SigningKey::new(settings.app.secret_key())?;

    let email_client = EmailClient::new(
        settings.email.sender()?,
        settings.email.api_timeout(),
        settings.email.api_base_url()?,
        settings.email.api_auth_token(),
    )?;
    let notifier: Arc<dyn Notifier> =
        Arc::new(EmailNotifier::new(email_client, settings.app.base_url()?));

    let weather: Arc<dyn WeatherLookup> = Arc::new(WeatherClient::new(
        settings.weather.api_base_url()?,
        settings.weather.api_key(),
        settings.weather.api_timeout(),
    )?);

    let scheduler = Arc::new(SubscriptionScheduler::new(weather.clone(), notifier.clone()).await?);
    scheduler
        .bootstrap(store.as_ref())
        .await
        .context("Failed to schedule confirmed subscriptions")?;

    let service = Arc::new(SubscriptionService::new(
        store,
        weather.clone(),
        notifier,
        scheduler.clone(),
        signing_key,
    ));

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, service, weather)?
        .await
        .context("Failed to run app")?;

    scheduler.shutdown().await?;
    Ok(())
}
