use anyhow::Context;

use chrono::Local;

use url::Url;

use crate::client::{Email, EmailClient, EmailKind, Weather};
use crate::domain::EmailAddress;

/// Sends subscription emails. Every message is fully described by its arguments.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the subscriber to confirm their subscription to `city`
    async fn send_confirmation(&self, email: &str, city: &str, token: &str) -> anyhow::Result<()>;

    /// Deliver the current conditions for `city` along with an unsubscribe link
    async fn send_update(
        &self,
        email: &str,
        city: &str,
        weather: &Weather,
        token: &str,
    ) -> anyhow::Result<()>;
}

/// Notifier rendering subscription emails and sending them through an [`EmailClient`]
#[derive(Debug)]
pub struct EmailNotifier {
    email_client: EmailClient,
    base_url: Url,
}

impl EmailNotifier {
    /// `base_url` is the externally visible address links are built from
    pub fn new(email_client: EmailClient, mut base_url: Url) -> Self {
        // Url::join replaces the last path segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            email_client,
            base_url,
        }
    }

    pub fn confirmation_url(&self, token: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("confirm/{}", token))
            .context("Failed to build confirmation URL")
    }

    pub fn unsubscribe_url(&self, token: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("unsubscribe/{}", token))
            .context("Failed to build unsubscribe URL")
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    #[tracing::instrument(name = "Send confirmation email", skip(self, token))]
    async fn send_confirmation(&self, email: &str, city: &str, token: &str) -> anyhow::Result<()> {
        let recipient: EmailAddress = email.parse()?;
        let confirmation_url = self.confirmation_url(token)?;

        let email = build_confirmation_email(recipient, city, &confirmation_url);
        self.email_client
            .send(&email)
            .await
            .context("Failed to send confirmation email")
    }

    #[tracing::instrument(name = "Send weather update email", skip(self, weather, token))]
    async fn send_update(
        &self,
        email: &str,
        city: &str,
        weather: &Weather,
        token: &str,
    ) -> anyhow::Result<()> {
        let recipient: EmailAddress = email.parse()?;
        let unsubscribe_url = self.unsubscribe_url(token)?;
        let timestamp = Local::now().format("%Y-%m-%d %H:%M").to_string();

        let email = build_update_email(recipient, city, weather, &timestamp, unsubscribe_url);
        self.email_client
            .send(&email)
            .await
            .context("Failed to send weather update email")
    }
}

/// Escape text for interpolation into an HTML body
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn build_confirmation_email(recipient: EmailAddress, city: &str, confirmation_url: &Url) -> Email {
    let subject = "Please confirm your weather subscription".to_string();
    let html_body = format!(
        "<h1>Weather updates for {city}</h1>\
         <p>Click <a href=\"{url}\">here</a> to confirm your subscription.</p>",
        city = escape_html(city),
        url = confirmation_url
    );
    let text_body = format!(
        "Weather updates for {}\n\nTo confirm your subscription, visit this web page: {}",
        city, confirmation_url
    );

    Email {
        kind: EmailKind::Confirmation,
        recipient,
        subject,
        html_body,
        text_body,
        unsubscribe_url: None,
    }
}

fn build_update_email(
    recipient: EmailAddress,
    city: &str,
    weather: &Weather,
    timestamp: &str,
    unsubscribe_url: Url,
) -> Email {
    let subject = format!("Weather update for {}", city);
    let html_body = format!(
        "<h1>Weather in {city}</h1>\
         <ul>\
         <li>Temperature: {temperature}&deg;C</li>\
         <li>Humidity: {humidity}%</li>\
         <li>Conditions: {description}</li>\
         </ul>\
         <p><small>As of {timestamp}</small></p>\
         <p><a href=\"{url}\">Unsubscribe</a></p>",
        city = escape_html(city),
        temperature = weather.temperature,
        humidity = weather.humidity,
        description = escape_html(&weather.description),
        timestamp = timestamp,
        url = unsubscribe_url,
    );
    let text_body = format!(
        "Weather in {city}\n\n\
         Temperature: {temperature}°C\n\
         Humidity: {humidity}%\n\
         Conditions: {description}\n\n\
         As of {timestamp}\n\n\
         To unsubscribe, visit this web page: {url}",
        city = city,
        temperature = weather.temperature,
        humidity = weather.humidity,
        description = weather.description,
        timestamp = timestamp,
        url = unsubscribe_url,
    );

    Email {
        kind: EmailKind::WeatherUpdate,
        recipient,
        subject,
        html_body,
        text_body,
        unsubscribe_url: Some(unsubscribe_url),
    }
}
