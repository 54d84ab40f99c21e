use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Length of a hex encoded HMAC-SHA256 digest
const TOKEN_LEN: usize = 64;

/// Errors raised when parsing a token received from the outside
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has an invalid length")]
    InvalidLength,
    #[error("Token contains non-hex characters")]
    InvalidCharacters,
}

/// Opaque external handle of a subscription, the hex encoded HMAC of `email:city`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionToken(String);

impl SubscriptionToken {
    pub(super) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }
}

impl AsRef<str> for SubscriptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SubscriptionToken {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.len() != TOKEN_LEN {
            return Err(TokenError::InvalidLength);
        }
        hex::decode(token).map_err(|_| TokenError::InvalidCharacters)?;
        // Tokens are always issued in lower-case hex
        Ok(Self(token.to_ascii_lowercase()))
    }
}
