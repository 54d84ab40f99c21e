use std::time::Duration;

use reqwest::Client;

use serde::{Deserialize, Serialize};

use secrecy::Secret;

use url::Url;

/// Provider error code for "No matching location found."
const NO_MATCHING_LOCATION: u32 = 1006;

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: u32,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No matching location found for {0}")]
    CityNotFound(String),
    #[error("Weather provider request failed")]
    Request(#[from] reqwest::Error),
    #[error("Weather provider responded with {status}: {message}")]
    Provider { status: u16, message: String },
}

/// Source of current weather conditions
#[async_trait::async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Fetch the current conditions for `city`
    async fn fetch(&self, city: &str) -> Result<Weather, WeatherError>;

    /// Check whether the provider knows `city`.
    /// Resolves to `false` when the city is not found, any other failure is propagated.
    async fn validate_city(&self, city: &str) -> Result<bool, WeatherError> {
        match self.fetch(city).await {
            Ok(_) => Ok(true),
            Err(WeatherError::CityNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Client for the weatherapi.com `current.json` endpoint
#[derive(Debug)]
pub struct WeatherClient {
    client: Client,

    api_current_url: Url,
    api_key: Secret<String>,
}

impl WeatherClient {
    pub fn new(
        api_base_url: Url,
        api_key: Secret<String>,
        api_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(api_timeout).build()?;

        let api_current_url = api_base_url.join("current.json")?;

        Ok(Self {
            client,
            api_current_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl WeatherLookup for WeatherClient {
    #[tracing::instrument(name = "Fetch current weather", skip(self))]
    async fn fetch(&self, city: &str) -> Result<Weather, WeatherError> {
        use secrecy::ExposeSecret;

        let res = self
            .client
            .get(self.api_current_url.clone())
            .query(&[("key", self.api_key.expose_secret().as_str()), ("q", city)])
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            let body: CurrentResponse = res.json().await?;
            return Ok(body.into());
        }

        // Errors come back as `{"error": {"code": .., "message": ..}}`
        match res.json::<ErrorResponse>().await {
            Ok(ErrorResponse { error }) if error.code == NO_MATCHING_LOCATION => {
                Err(WeatherError::CityNotFound(city.to_string()))
            }
            Ok(ErrorResponse { error }) => Err(WeatherError::Provider {
                status: status.as_u16(),
                message: error.message,
            }),
            Err(_) => Err(WeatherError::Provider {
                status: status.as_u16(),
                message: status.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    humidity: u32,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

impl From<CurrentResponse> for Weather {
    fn from(value: CurrentResponse) -> Self {
        let current = value.current;
        Self {
            temperature: current.temp_c,
            humidity: current.humidity,
            description: current.condition.text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: u32,
    message: String,
}
