//! In-process fakes for the weather provider and the mail transport
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::client::{Weather, WeatherError, WeatherLookup};
use crate::notifier::Notifier;

pub struct FakeWeather {
    cities: HashSet<String>,
    outage: bool,
}

impl FakeWeather {
    pub fn with_cities(cities: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            cities: cities.iter().map(|c| c.to_lowercase()).collect(),
            outage: false,
        })
    }

    /// Every lookup fails with a provider error
    pub fn outage() -> Arc<Self> {
        Arc::new(Self {
            cities: HashSet::new(),
            outage: true,
        })
    }

    pub fn conditions() -> Weather {
        Weather {
            temperature: 18.0,
            humidity: 72,
            description: "Light rain".into(),
        }
    }
}

#[async_trait::async_trait]
impl WeatherLookup for FakeWeather {
    async fn fetch(&self, city: &str) -> Result<Weather, WeatherError> {
        if self.outage {
            return Err(WeatherError::Provider {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        if self.cities.contains(&city.to_lowercase()) {
            Ok(Self::conditions())
        } else {
            Err(WeatherError::CityNotFound(city.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentConfirmation {
    pub email: String,
    pub city: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentUpdate {
    pub email: String,
    pub city: String,
    pub weather: Weather,
    pub token: String,
}

#[derive(Default)]
pub struct FakeNotifier {
    failing: bool,
    confirmations: Mutex<Vec<SentConfirmation>>,
    updates: Mutex<Vec<SentUpdate>>,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every send fails as if the mail transport were down
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            ..Self::default()
        })
    }

    pub fn confirmations(&self) -> Vec<SentConfirmation> {
        self.confirmations.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<SentUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for FakeNotifier {
    async fn send_confirmation(&self, email: &str, city: &str, token: &str) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("mail transport unavailable");
        }
        self.confirmations.lock().unwrap().push(SentConfirmation {
            email: email.into(),
            city: city.into(),
            token: token.into(),
        });
        Ok(())
    }

    async fn send_update(
        &self,
        email: &str,
        city: &str,
        weather: &Weather,
        token: &str,
    ) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("mail transport unavailable");
        }
        self.updates.lock().unwrap().push(SentUpdate {
            email: email.into(),
            city: city.into(),
            weather: weather.clone(),
            token: token.into(),
        });
        Ok(())
    }
}
