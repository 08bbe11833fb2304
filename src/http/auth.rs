use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;

/// Header installed by the upstream authentication layer
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user a request acts on behalf of.
///
/// Authentication itself is an external collaborator: this service trusts the
/// user id header installed upstream and only verifies that it is present and
/// well-formed.
#[derive(Debug, Clone, Copy)]
pub struct RequestUser(pub Uuid);

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::Unauthorized("Missing user identity"))?;

        let value = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Malformed user identity"))?;

        let user_id = Uuid::parse_str(value)
            .map_err(|_| ApiError::Unauthorized("Malformed user identity"))?;

        Ok(RequestUser(user_id))
    }
}
