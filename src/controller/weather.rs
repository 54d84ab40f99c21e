use actix_web::dev::HttpServiceFactory;
use actix_web::{get, web, HttpResponse, Responder};

use serde::Deserialize;

use crate::client::WeatherLookup;
use crate::domain::CityName;
use crate::error::Error;

use super::error::RestResult;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

/// Current conditions for a city
#[tracing::instrument(name = "Get current weather", skip(weather))]
#[get("")]
async fn current(
    weather: web::Data<dyn WeatherLookup>,
    query: web::Query<WeatherQuery>,
) -> RestResult<impl Responder> {
    let city: CityName = query
        .into_inner()
        .city
        .ok_or_else(|| Error::ParsingError("Missing city parameter".into()))?
        .parse()?;

    let conditions = weather.fetch(city.as_ref()).await.map_err(Error::from)?;

    Ok(HttpResponse::Ok().json(conditions))
}

/// Weather API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/weather").service(current)
}
