use crate::helpers::TestApp;

#[tokio::test(flavor = "multi_thread")]
async fn is_present() {
    let app = TestApp::spawn().await;

    let res = app.health_check().await.expect("Failed to execute request");

    assert!(res.status().is_success());
}
