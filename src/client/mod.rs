mod email_client;
mod weather_client;

pub use email_client::{Email, EmailClient, EmailError, EmailKind};
pub use weather_client::{Weather, WeatherClient, WeatherError, WeatherLookup};
