use tokio_cron_scheduler::JobSchedulerError;

use crate::client::WeatherError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Parsing errors
    #[error("{0}")]
    ParsingError(String),
    // Subscription lifecycle outcomes
    #[error("Email already subscribed")]
    DuplicateSubscription,
    #[error("Invalid city: {0}")]
    InvalidCity(String),
    #[error("Subscription not found")]
    NotFound,
    #[error("Subscription already confirmed")]
    AlreadyConfirmed,
    // Weather provider errors
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Weather lookup failed")]
    Weather(#[source] WeatherError),
    // Email client errors
    #[error("Failed to send email")]
    SendEmailError(#[source] anyhow::Error),
    // Scheduler errors
    #[error("Failed to manage scheduled job")]
    SchedulerError(#[from] JobSchedulerError),
    // Database errors
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

impl From<WeatherError> for Error {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::CityNotFound(city) => Self::CityNotFound(city),
            other => Self::Weather(other),
        }
    }
}
