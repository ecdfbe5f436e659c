// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request extractors for the server.
//!
//! Callers are identified upstream of this service (a gateway or the mobile
//! backend) and forwarded as two headers:
//!
//! - `X-Caller-Id`: the caller's user ID
//! - `X-Caller-Role`: `admin`, `agent`, or `user`
//!
//! Body and query extractors wrap axum's own so that malformed input is
//! reported as a `ValidationError` in the standard error body.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use reserva_api::{ApiError, AuthError, AuthenticatedCaller, Role};
use tracing::{debug, warn};

use crate::HttpError;

/// Header carrying the caller's user ID.
pub const CALLER_ID_HEADER: &str = "X-Caller-Id";
/// Header carrying the caller's role.
pub const CALLER_ROLE_HEADER: &str = "X-Caller-Role";

/// Extractor for identified callers.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(Caller(caller): Caller) -> Result<Json<Response>, HttpError> {
///     // caller: AuthenticatedCaller
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if either header is missing, the ID is not an
/// integer, or the role is unknown.
pub struct Caller(pub AuthenticatedCaller);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = CallerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id: i64 = header_value(parts, CALLER_ID_HEADER)?
            .trim()
            .parse()
            .map_err(|_| {
                warn!("Caller ID header is not an integer");
                CallerError::InvalidCallerId
            })?;

        let role: Role = header_value(parts, CALLER_ROLE_HEADER)?
            .parse()
            .map_err(|e: AuthError| {
                warn!(error = %e, "Caller role rejected");
                CallerError::InvalidRole(e)
            })?;

        debug!(user_id, role = role.as_str(), "Caller identified");
        Ok(Self(AuthenticatedCaller::new(user_id, role)))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, CallerError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing caller header");
            CallerError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid caller header encoding");
            CallerError::InvalidHeaderEncoding(name)
        })
}

/// Caller identification errors.
#[derive(Debug)]
pub enum CallerError {
    /// A required header is missing.
    MissingHeader(&'static str),
    /// A header is not valid visible ASCII.
    InvalidHeaderEncoding(&'static str),
    /// The caller ID is not an integer.
    InvalidCallerId,
    /// The role is unknown.
    InvalidRole(AuthError),
}

impl From<CallerError> for ApiError {
    fn from(err: CallerError) -> Self {
        let reason: String = match err {
            CallerError::MissingHeader(name) => format!("Missing {name} header"),
            CallerError::InvalidHeaderEncoding(name) => format!("Invalid {name} header encoding"),
            CallerError::InvalidCallerId => format!("{CALLER_ID_HEADER} must be an integer"),
            CallerError::InvalidRole(e) => return Self::from(e),
        };
        Self::Unauthenticated { reason }
    }
}

impl IntoResponse for CallerError {
    fn into_response(self) -> Response {
        HttpError::from(ApiError::from(self)).into_response()
    }
}

/// A JSON body whose decode failures become validation errors.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected request body");
                Err(HttpError::from(ApiError::invalid(
                    "body",
                    rejection.body_text(),
                )))
            }
        }
    }
}

/// Query parameters whose decode failures become validation errors.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected query string");
                Err(HttpError::from(ApiError::invalid(
                    "query",
                    rejection.body_text(),
                )))
            }
        }
    }
}

/// A reservation ID from the request path.
pub struct ReservationId(pub i64);

impl<S> FromRequestParts<S> for ReservationId
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                let rejection: PathRejection = rejection;
                Err(HttpError::from(ApiError::invalid(
                    "id",
                    rejection.body_text(),
                )))
            }
        }
    }
}
