//! Request extractors.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

/// Message returned when a request body cannot be decoded.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

/// JSON body extractor whose every rejection is a `400 {"error": ...}`.
///
/// The body is decoded regardless of `Content-Type`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Failed to read request body");
            AppError::Validation(INVALID_REQUEST_MESSAGE.to_string())
        })?;

        serde_json::from_slice(&bytes)
            .map(ApiJson)
            .map_err(|err| {
                tracing::debug!(error = %err, "Failed to decode request body");
                AppError::Validation(INVALID_REQUEST_MESSAGE.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        a: f64,
        b: f64,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_decodes_without_content_type() {
        let ApiJson(pair) = ApiJson::<Pair>::from_request(request(r#"{"a":1,"b":2.5}"#), &())
            .await
            .unwrap();
        assert_eq!(pair, Pair { a: 1.0, b: 2.5 });
    }

    #[tokio::test]
    async fn test_bad_json_is_validation_error() {
        for body in ["", "{", "[]", r#"{"a":"x","b":1}"#] {
            let err = ApiJson::<Pair>::from_request(request(body), &())
                .await
                .unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref m) if m == INVALID_REQUEST_MESSAGE),
                "body {:?} gave {:?}",
                body,
                err
            );
        }
    }
}
