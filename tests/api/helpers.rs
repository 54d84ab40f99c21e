use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response};

use secrecy::Secret;

use serde_json::json;

use url::Url;

use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_alerts::app;
use weather_alerts::client::{EmailClient, WeatherClient};
use weather_alerts::crypto::SigningKey;
use weather_alerts::notifier::EmailNotifier;
use weather_alerts::repo::InMemorySubscriptionStore;
use weather_alerts::scheduler::SubscriptionScheduler;
use weather_alerts::service::SubscriptionService;

pub const WEATHER_API_KEY: &str = "test-weather-key";

pub struct TestApp {
    addr: String,

    pub client: Client,
    pub email_server: MockServer,
    pub weather_server: MockServer,
    pub store: Arc<InMemorySubscriptionStore>,
    pub scheduler: Arc<SubscriptionScheduler>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let signing_key = {
            let rand_key: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let rand_key = Secret::new(rand_key);

            SigningKey::new(&rand_key).expect("Failed to create crypto signing key")
        };

        let email_server = MockServer::start().await;
        let weather_server = MockServer::start().await;

        let notifier = {
            let sender = "test@test.com"
                .parse()
                .expect("Failed to parse sender email address");
            let api_base_url =
                Url::parse(&email_server.uri()).expect("Failed to parse mock server uri");
            let api_auth_token = Secret::new("TestAuthorization".into());
            let api_timeout = Duration::from_secs(2);

            let email_client = EmailClient::new(sender, api_timeout, api_base_url, api_auth_token)
                .expect("Failed to create email client");
            let base_url = Url::parse(&addr).expect("Failed to parse app address");

            Arc::new(EmailNotifier::new(email_client, base_url))
        };

        let weather = {
            let api_base_url =
                Url::parse(&weather_server.uri()).expect("Failed to parse mock server uri");
            let api_key = Secret::new(WEATHER_API_KEY.into());

            Arc::new(
                WeatherClient::new(api_base_url, api_key, Duration::from_secs(2))
                    .expect("Failed to create weather client"),
            )
        };

        let store = Arc::new(InMemorySubscriptionStore::new());

        let scheduler = Arc::new(
            SubscriptionScheduler::new(weather.clone(), notifier.clone())
                .await
                .expect("Failed to start scheduler"),
        );

        let service = Arc::new(SubscriptionService::new(
            store.clone(),
            weather.clone(),
            notifier,
            scheduler.clone(),
            signing_key,
        ));

        let server = app::run(listener, service, weather).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            email_server,
            weather_server,
            store,
            scheduler,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn subscribe(&self, body: &serde_json::Value) -> reqwest::Result<Response> {
        self.request(Method::POST, "subscribe")
            .json(body)
            .send()
            .await
    }

    pub async fn subscribe_form(&self, form: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.request(Method::POST, "subscribe")
            .form(form)
            .send()
            .await
    }

    pub async fn confirm(&self, token: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, &format!("confirm/{}", token))
            .send()
            .await
    }

    pub async fn unsubscribe(&self, token: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, &format!("unsubscribe/{}", token))
            .send()
            .await
    }

    pub async fn weather(&self, city: Option<&str>) -> reqwest::Result<Response> {
        let req = self.request(Method::GET, "weather");
        let req = match city {
            Some(city) => req.query(&[("city", city)]),
            None => req,
        };
        req.send().await
    }

    /// Accept every send-email request
    pub async fn mount_email_ok(&self) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.email_server)
            .await;
    }

    /// Make the weather provider know `city`
    pub async fn mount_city(&self, city: &str) {
        Mock::given(path("/current.json"))
            .and(query_param("key", WEATHER_API_KEY))
            .and(query_param("q", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": { "name": city },
                "current": {
                    "temp_c": 22.5,
                    "humidity": 65,
                    "condition": { "text": "Partly cloudy" }
                }
            })))
            .mount(&self.weather_server)
            .await;
    }

    /// Answer lookups of any city not mounted with "No matching location found."
    pub async fn mount_unknown_cities(&self) {
        Mock::given(path("/current.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .with_priority(10)
            .mount(&self.weather_server)
            .await;
    }

    /// Links found in the text body of the `index`th email sent
    pub async fn email_links(&self, index: usize) -> Vec<String> {
        let requests = self.email_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[index].body).unwrap();

        linkify::LinkFinder::new()
            .links(body["TextBody"].as_str().unwrap())
            .filter(|l| *l.kind() == linkify::LinkKind::Url)
            .map(|l| l.as_str().to_string())
            .collect()
    }

    /// Number of emails sent so far
    pub async fn emails_sent(&self) -> usize {
        self.email_server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
