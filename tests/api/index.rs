use reqwest::Method;

use crate::helpers::TestApp;

#[tokio::test(flavor = "multi_thread")]
async fn subscription_page_is_served() {
    let app = TestApp::spawn().await;

    let res = app
        .request(Method::GET, "")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(res.status().is_success());
    assert!(res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("text/html")));

    let body = res.text().await.unwrap();
    assert!(body.contains(r#"action="/subscribe""#));
    assert!(body.contains(r#"name="frequency""#));
}
