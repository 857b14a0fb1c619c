use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use commons_error::*;

/// Session id carried by the "sid" header.
///
/// The session system itself is a black box, the sid it delivers wraps
/// the account uuid. The guard only checks the shape and extracts the
/// account, a missing header becomes an empty string and fails the
/// validity check later on.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SessionToken(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token_id = parts
            .headers
            .get("sid")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Ok(SessionToken(token_id.to_string()))
    }
}

impl SessionToken {
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && Uuid::parse_str(&self.0).is_ok()
    }

    /// The account behind the session
    pub fn account_id(&self) -> anyhow::Result<Uuid> {
        let account_id = Uuid::parse_str(&self.0)
            .map_err(err_fwd!("Sid does not carry an account, sid=[{}]", &self.0))?;
        Ok(account_id)
    }

    pub fn take_value(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sid_with_account_uuid_is_valid() {
        let token = SessionToken("47cef2c4-188d-43ed-895d-fe29440633da".to_string());
        assert!(token.is_valid());
        assert_eq!(
            "47cef2c4-188d-43ed-895d-fe29440633da",
            token.account_id().unwrap().to_string()
        );
    }

    #[test]
    fn empty_or_garbage_sid_is_invalid() {
        assert!(!SessionToken("".to_string()).is_valid());
        assert!(!SessionToken("not-a-uuid".to_string()).is_valid());
    }
}
