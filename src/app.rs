use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::client::WeatherLookup;
use crate::controller::{subscriptions, weather};
use crate::service::SubscriptionService;

static INDEX_HTML: &str = include_str!("../static/index.html");

/// Serve the embedded subscription page at `GET /`
#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    service: Arc<SubscriptionService>,
    weather: Arc<dyn WeatherLookup>,
) -> anyhow::Result<Server> {
    // Wrap application data
    let service = web::Data::from(service);
    let weather: web::Data<dyn WeatherLookup> = web::Data::from(weather);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(service.clone())
            .app_data(weather.clone())
            .service(index)
            .service(health_check)
            .configure(subscriptions::configure)
            .service(weather::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
