use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, OptionalFromRequest, Request},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    utils::jwt::Claims,
};

/// JSON body whose rejections render as the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// An empty body yields `None` instead of a rejection.
impl<T, S> OptionalFromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>> {
        let bytes = Bytes::from_request(req, state).await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let axum::Json(value) = axum::Json::<T>::from_bytes(&bytes)?;
        Ok(Some(Self(value)))
    }
}

pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = <Multipart as FromRequest<S>>::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}

pub fn extract_user_id(claims: &Claims) -> Result<Uuid> {
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Promo {
        code: Option<String>,
    }

    fn request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_optional_json_empty_body_is_none() {
        let parsed = <AppJson<Promo> as OptionalFromRequest<()>>::from_request(request(""), &())
            .await
            .unwrap();
        assert!(parsed.is_none());

        let parsed =
            <AppJson<Promo> as OptionalFromRequest<()>>::from_request(request(" \n"), &())
                .await
                .unwrap();
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn test_optional_json_parses_body() {
        let parsed = <AppJson<Promo> as OptionalFromRequest<()>>::from_request(
            request(r#"{"code":"ABCDE"}"#),
            &(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(parsed.0.code.as_deref(), Some("ABCDE"));
    }

    #[tokio::test]
    async fn test_optional_json_malformed_is_validation_error() {
        let err = <AppJson<Promo> as OptionalFromRequest<()>>::from_request(
            request("{not json"),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_extract_user_id() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(extract_user_id(&claims).unwrap(), id);

        let claims = Claims {
            sub: "nope".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            extract_user_id(&claims),
            Err(AppError::Unauthorized(_))
        ));
    }
}
