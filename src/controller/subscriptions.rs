use actix_web::{get, post, web, Either, HttpResponse, Responder};

use serde::Deserialize;

use crate::model::NewSubscription;
use crate::service::SubscriptionService;

use super::error::{RestError, RestResult};

/// Body of a new subscription request, accepted as JSON or as an urlencoded form
#[derive(Debug, Deserialize)]
pub struct NewSubscriptionBody {
    email: Option<String>,
    city: Option<String>,
    frequency: Option<String>,
}

impl TryFrom<NewSubscriptionBody> for NewSubscription {
    type Error = RestError;

    fn try_from(body: NewSubscriptionBody) -> RestResult<Self> {
        let email = required(body.email, "email")?.parse()?;
        let city = required(body.city, "city")?.parse()?;
        let frequency = required(body.frequency, "frequency")?.parse()?;

        Ok(NewSubscription {
            email,
            city,
            frequency,
        })
    }
}

fn required(value: Option<String>, field: &str) -> RestResult<String> {
    value.ok_or_else(|| RestError::ParseError(format!("Missing {}", field)))
}

/// Create endpoint for new subscriptions
#[tracing::instrument(name = "Subscribe to weather updates", skip(service, body))]
#[post("/subscribe")]
async fn create(
    service: web::Data<SubscriptionService>,
    body: Either<web::Json<NewSubscriptionBody>, web::Form<NewSubscriptionBody>>,
) -> RestResult<impl Responder> {
    let body = match body {
        Either::Left(web::Json(body)) => body,
        Either::Right(web::Form(body)) => body,
    };
    let new_subscription: NewSubscription = body.try_into()?;

    let subscription = service.create(new_subscription).await?;

    Ok(HttpResponse::Created().json(subscription))
}

/// Subscription confirmation endpoint
#[tracing::instrument(name = "Confirm a subscription", skip(service, path))]
#[get("/confirm/{token}", name = "confirm_subscription")]
async fn confirm(
    service: web::Data<SubscriptionService>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (token,) = path.into_inner();

    let subscription = service.confirm(&token).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Unsubscribe endpoint, linked from every update email
#[tracing::instrument(name = "Unsubscribe", skip(service, path))]
#[get("/unsubscribe/{token}", name = "unsubscribe")]
async fn unsubscribe(
    service: web::Data<SubscriptionService>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (token,) = path.into_inner();

    let subscription = service.unsubscribe(&token).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Subscription API endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create).service(confirm).service(unsubscribe);
}
