use std::time::Duration;

use reqwest::Client;

use serde::{Deserialize, Serialize};

use secrecy::Secret;

use url::Url;

use crate::domain::EmailAddress;

const POSTMARK_TOKEN_HEADER: &str = "X-Postmark-Server-Token";
/// Transactional stream, subscription mail is never broadcast
const MESSAGE_STREAM: &str = "outbound";

/// The two kinds of mail a subscriber receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Confirmation,
    WeatherUpdate,
}

impl EmailKind {
    /// Postmark tag the message is filed under
    pub fn tag(&self) -> &'static str {
        match self {
            EmailKind::Confirmation => "subscription-confirmation",
            EmailKind::WeatherUpdate => "weather-update",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email provider rejected the message ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Outbound mail transport over the Postmark REST API
#[derive(Debug)]
pub struct EmailClient {
    client: Client,
    sender: EmailAddress,

    api_send_email_url: Url,
    api_auth_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        sender: EmailAddress,
        api_timeout: Duration,
        api_base_url: Url,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(api_timeout).build()?;

        let api_send_email_url = api_base_url.join("email")?;

        Ok(Self {
            client,
            sender,
            api_send_email_url,
            api_auth_token,
        })
    }

    #[tracing::instrument(
        name = "Send an email via API",
        skip(self, email),
        fields(recipient = %email.recipient, tag = email.kind.tag())
    )]
    pub async fn send(&self, email: &Email) -> Result<(), EmailError> {
        use secrecy::ExposeSecret;

        let body = email.as_request(&self.sender);

        let res = self
            .client
            .post(self.api_send_email_url.clone())
            .header(POSTMARK_TOKEN_HEADER, self.api_auth_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status_err = match res.error_for_status_ref() {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };
        // Postmark explains rejections with an error code, anything else is a transport failure
        match res.json::<PostmarkError>().await {
            Ok(err) => Err(EmailError::Rejected {
                code: err.error_code,
                message: err.message,
            }),
            Err(_) => Err(status_err.into()),
        }
    }
}

/// A rendered subscription email
#[derive(Debug, Clone)]
pub struct Email {
    pub kind: EmailKind,
    pub recipient: EmailAddress,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    /// Advertised through the `List-Unsubscribe` header when present
    pub unsubscribe_url: Option<Url>,
}

impl Email {
    fn as_request<'e>(&'e self, sender: &'e EmailAddress) -> SendEmailRequest<'e> {
        let headers = self
            .unsubscribe_url
            .iter()
            .map(|url| MessageHeader {
                name: "List-Unsubscribe",
                value: format!("<{}>", url),
            })
            .collect();

        SendEmailRequest {
            to: self.recipient.as_ref(),
            from: sender.as_ref(),
            subject: &self.subject,
            html_body: &self.html_body,
            text_body: &self.text_body,
            tag: self.kind.tag(),
            message_stream: MESSAGE_STREAM,
            // Token links must reach the subscriber unrewritten
            track_links: "None",
            headers,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    tag: &'a str,
    message_stream: &'a str,
    track_links: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<MessageHeader>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageHeader {
    name: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkError {
    error_code: i64,
    message: String,
}
