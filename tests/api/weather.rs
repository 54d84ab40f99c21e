use reqwest::StatusCode;

use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

#[tokio::test(flavor = "multi_thread")]
async fn weather_returns_current_conditions() {
    let app = TestApp::spawn().await;
    app.mount_city("London").await;

    let res = app.weather(Some("London")).await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["temperature"], 22.5);
    assert_eq!(body["humidity"], 65);
    assert_eq!(body["description"], "Partly cloudy");
}

#[tokio::test(flavor = "multi_thread")]
async fn weather_for_unknown_city_is_not_found() {
    let app = TestApp::spawn().await;
    app.mount_unknown_cities().await;

    let res = app.weather(Some("Nowhereville")).await.unwrap();

    assert_eq!(StatusCode::NOT_FOUND, res.status());
}

#[tokio::test(flavor = "multi_thread")]
async fn weather_without_city_is_bad_request() {
    let app = TestApp::spawn().await;

    let res = app.weather(None).await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    let res = app.weather(Some("")).await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test(flavor = "multi_thread")]
async fn weather_provider_outage_is_server_error() {
    let app = TestApp::spawn().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.weather_server)
        .await;

    let res = app.weather(Some("London")).await.unwrap();

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
}
