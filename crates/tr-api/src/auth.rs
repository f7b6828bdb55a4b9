use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

/// Extractor guarding the trigger and feed endpoints behind X-API-Key.
#[derive(Debug, Clone)]
pub struct AuthUser;

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        let expected = config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("missing TR_API_KEY".into()))?;

        let provided = parts
            .headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".into()))?;

        if provided != expected {
            return Err(ApiError::Unauthorized("invalid API key".into()));
        }

        Ok(AuthUser)
    }
}
