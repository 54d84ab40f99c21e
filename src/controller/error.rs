use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use serde::Serialize;

use thiserror::Error;

pub type RestResult<T> = Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("{0}")]
    ParseError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    InternalError,
}

impl From<crate::error::Error> for RestError {
    fn from(e: crate::error::Error) -> Self {
        use crate::error::Error as E;
        match e {
            E::ParsingError(msg) => Self::ParseError(msg),
            E::InvalidCity(city) => Self::ParseError(format!("Invalid city: {}", city)),
            E::DuplicateSubscription => Self::Conflict(e.to_string()),
            E::AlreadyConfirmed => Self::Conflict(e.to_string()),
            E::NotFound => Self::NotFound(e.to_string()),
            E::CityNotFound(city) => Self::NotFound(format!("City not found: {}", city)),
            E::Weather(_) | E::SendEmailError(_) | E::SchedulerError(_) | E::DatabaseError(_) => {
                tracing::error!(error.cause_chain = ?e, "Request failed on an upstream dependency");
                Self::InternalError
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
        })
    }
}
